use crate::error::{ PanoError, PanoResult };

use image::RgbImage;

use std::str::FromStr;

/// How many clicks end the collection.
pub const MAX_HORIZON_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonPoint{
    pub x: f32,
    pub y: f32,
}

impl HorizonPoint{
    pub fn new(x: f32, y: f32) -> Self{
        Self{ x, y }
    }
}

impl FromStr for HorizonPoint{
    type Err = PanoError;

    fn from_str(s: &str) -> Result<Self, Self::Err>{
        let bad = || PanoError::InvalidPoint(s.to_string());
        let (x, y) = s.split_once(',').ok_or_else(bad)?;
        let x = x.trim().parse::<f32>().map_err(|_| bad())?;
        let y = y.trim().parse::<f32>().map_err(|_| bad())?;
        if !x.is_finite() || !y.is_finite(){
            return Err(bad());
        }
        Ok(Self{ x, y })
    }
}

/// Anything that can hand back the points a user marked on the raster.
pub trait HorizonSource{
    fn collect(&mut self, img: &RgbImage, max_points: usize) -> PanoResult<Vec<HorizonPoint>>;
}

/// Points known up front, no human involved.
#[derive(Debug, Clone, Default)]
pub struct FixedPoints(pub Vec<HorizonPoint>);

impl HorizonSource for FixedPoints{
    fn collect(&mut self, _img: &RgbImage, max_points: usize) -> PanoResult<Vec<HorizonPoint>>{
        if self.0.len() > max_points{
            log::warn!("Got {} horizon points, only the first {} are used", self.0.len(), max_points);
        }
        Ok(self.0.iter().take(max_points).copied().collect())
    }
}

/// Rounded mean of the point heights, kept inside the raster.
pub fn horizon_y(points: &[HorizonPoint], height: u32) -> PanoResult<u32>{
    if points.is_empty(){
        return Err(PanoError::NoHorizonSelected);
    }
    let mean = points.iter().map(|p| p.y as f64).sum::<f64>() / points.len() as f64;
    let max = height.saturating_sub(1) as f64;
    Ok(mean.round().clamp(0.0, max) as u32)
}
