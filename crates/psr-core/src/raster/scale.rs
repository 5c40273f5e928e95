//! Physical pixel calibration.

use serde::{Deserialize, Serialize};

/// Physical size of one pixel.
///
/// Captured from the source image before processing and reattached to every
/// output raster. Measurements are pixel sums regardless; the scale only
/// affects calibrated areas and what gets persisted alongside the rasters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleInfo {
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub unit: String,
}

impl ScaleInfo {
    pub fn new(pixel_width: f64, pixel_height: f64, unit: impl Into<String>) -> Self {
        Self {
            pixel_width,
            pixel_height,
            unit: unit.into(),
        }
    }

    /// One pixel per pixel.
    pub fn uncalibrated() -> Self {
        Self::new(1.0, 1.0, "pixel")
    }

    pub fn is_calibrated(&self) -> bool {
        unit_in_metres(&self.unit).is_some()
    }

    /// Area of one pixel in squared units.
    pub fn pixel_area(&self) -> f64 {
        self.pixel_width * self.pixel_height
    }

    /// Pixels per metre along x and y, for formats that store resolution
    /// that way. `None` when the unit has no metric equivalent.
    pub fn pixels_per_metre(&self) -> Option<(u32, u32)> {
        let metres = unit_in_metres(&self.unit)?;
        if self.pixel_width <= 0.0 || self.pixel_height <= 0.0 {
            return None;
        }
        let x = (1.0 / (self.pixel_width * metres)).round();
        let y = (1.0 / (self.pixel_height * metres)).round();
        if x < 1.0 || y < 1.0 || x > u32::MAX as f64 || y > u32::MAX as f64 {
            return None;
        }
        Some((x as u32, y as u32))
    }

    /// Calibration in microns from a pixels-per-metre resolution.
    pub fn from_pixels_per_metre(x: u32, y: u32) -> Option<Self> {
        if x == 0 || y == 0 {
            return None;
        }
        Some(Self::new(1e6 / x as f64, 1e6 / y as f64, "micron"))
    }
}

impl Default for ScaleInfo {
    fn default() -> Self {
        Self::uncalibrated()
    }
}

fn unit_in_metres(unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "nm" | "nanometer" | "nanometre" => Some(1e-9),
        "micron" | "microns" | "um" | "µm" | "μm" => Some(1e-6),
        "mm" | "millimeter" | "millimetre" => Some(1e-3),
        "cm" | "centimeter" | "centimetre" => Some(1e-2),
        "m" | "meter" | "metre" => Some(1.0),
        "inch" | "inches" | "in" => Some(0.0254),
        _ => None,
    }
}
