use crate::error::{ PanoError, PanoResult };

use image::{ DynamicImage, RgbImage };

/// Width in columns of each edge strip that gets blended.
pub const STRIP_WIDTH: u32 = 150;

/// Builds a raster from tightly packed RGB bytes.
pub fn raster_from_raw(w: u32, h: u32, data: Vec<u8>) -> PanoResult<RgbImage>{
    if w == 0 || h == 0{
        return Err(PanoError::InvalidImageFormat(format!("empty raster {}x{}", w, h)));
    }
    let expected = w as usize * h as usize * 3;
    if data.len() != expected{
        return Err(PanoError::InvalidImageFormat(format!(
            "{}x{} raster needs {} bytes of RGB data, got {}", w, h, expected, data.len()
        )));
    }
    RgbImage::from_raw(w, h, data)
        .ok_or_else(|| PanoError::InvalidImageFormat(format!("cannot view {}x{} buffer as RGB", w, h)))
}

/// Converts whatever was decoded into an 8-bit RGB raster.
pub fn raster_from_dynamic(img: DynamicImage) -> PanoResult<RgbImage>{
    let (w, h) = (img.width(), img.height());
    raster_from_raw(w, h, img.into_rgb8().into_raw())
}

/// Strips never overlap: narrow images get at most half their width per strip.
pub fn effective_strip_width(width: u32, strip_width: u32) -> u32{
    strip_width.min(width / 2)
}

/// Replaces both edge strips with the per-pixel average of the two.
pub fn blend_seam(img: &RgbImage, strip_width: u32) -> RgbImage{
    let (w, h) = img.dimensions();
    let sw = effective_strip_width(w, strip_width);
    let mut out = img.clone();
    for y in 0..h{
        for i in 0..sw{
            let rx = w - sw + i;
            let l = img.get_pixel(i, y);
            let r = img.get_pixel(rx, y);
            let mut avg = *l;
            for c in 0..3{
                avg[c] = ((l[c] as u16 + r[c] as u16 + 1) / 2) as u8;
            }
            out.put_pixel(i, y, avg);
            out.put_pixel(rx, y, avg);
        }
    }
    out
}
