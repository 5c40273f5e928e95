//! Debinarization and measurement.

mod output;

pub use output::{ImageId, ScaledRaster};

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::raster::{Mask, Region, ScaleInfo};

/// Scale the saturation channel by the mask: `round(mask / 255 * saturation)`.
///
/// Selected pixels carry their saturation, everything else becomes 0.
pub fn debinarize(mask: &Mask, saturation: &GrayImage) -> Result<GrayImage, PipelineError> {
    mask.ensure_same_size(saturation.dimensions())?;
    let (width, height) = mask.dimensions();
    Ok(GrayImage::from_fn(width, height, |x, y| {
        let weight = mask.as_image().get_pixel(x, y).0[0] as f64 / 255.0;
        let value = weight * saturation.get_pixel(x, y).0[0] as f64;
        Luma([value.round() as u8])
    }))
}

/// Intensity statistics of a grayscale raster over a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Sum of pixel values inside the region.
    pub raw_integrated_density: u64,
    /// Region size in pixels.
    pub area_px: u64,
    pub mean: f64,
    /// `area_px` in squared calibration units.
    pub calibrated_area: f64,
    /// `mean * calibrated_area`; equals the raw density when uncalibrated.
    pub integrated_density: f64,
}

impl Measurement {
    /// Number of fully selected pixels a 0/255 raster's density represents.
    pub fn selected_pixels(&self) -> f64 {
        self.raw_integrated_density as f64 / 255.0
    }
}

/// Measure `image` over `roi`, reporting areas in `scale` units.
pub fn measure(
    image: &GrayImage,
    roi: &Region,
    scale: &ScaleInfo,
) -> Result<Measurement, PipelineError> {
    roi.mask().ensure_same_size(image.dimensions())?;
    let mut raw = 0u64;
    let mut area = 0u64;
    for (x, y) in roi.mask().selected_points() {
        raw += image.get_pixel(x, y).0[0] as u64;
        area += 1;
    }
    let mean = if area > 0 { raw as f64 / area as f64 } else { 0.0 };
    let calibrated_area = area as f64 * scale.pixel_area();
    Ok(Measurement {
        raw_integrated_density: raw,
        area_px: area,
        mean,
        calibrated_area,
        integrated_density: mean * calibrated_area,
    })
}
