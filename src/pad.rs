use crate::error::{ PanoError, PanoResult };

use image::{ imageops, Rgb, RgbImage };

/// Equirectangular projections are twice as wide as they are tall.
pub const EQUIRECT_ASPECT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding{
    pub target_height: u32,
    pub pad_above: u32,
    pub pad_below: u32,
}

/// Splits the missing rows so that a low horizon gets more padding below and
/// a high horizon more padding above.
pub fn compute_padding(w: u32, h: u32, horizon_y: u32, aspect: f64) -> PanoResult<Padding>{
    let target_height = (w as f64 / aspect).floor() as u32;
    if h > target_height{
        return Err(PanoError::ImageAlreadyTooTall{ target: target_height, height: h });
    }
    if h == 0{
        return Err(PanoError::InvalidImageFormat("cannot pad an empty raster".to_string()));
    }
    let total = target_height - h;
    let horizon_y = horizon_y.min(h - 1);
    // floor(total * horizon_y / h), exact in integers
    let pad_below = (total as u64 * horizon_y as u64 / h as u64) as u32;
    Ok(Padding{
        target_height,
        pad_above: total - pad_below,
        pad_below,
    })
}

pub fn pad_to_equirect(img: &RgbImage, horizon_y: u32, aspect: f64) -> PanoResult<(RgbImage, Padding)>{
    let (w, h) = img.dimensions();
    let padding = compute_padding(w, h, horizon_y, aspect)?;
    let mut canvas = RgbImage::from_pixel(w, padding.target_height, Rgb([0, 0, 0]));
    imageops::replace(&mut canvas, img, 0, padding.pad_above as i64);
    Ok((canvas, padding))
}
