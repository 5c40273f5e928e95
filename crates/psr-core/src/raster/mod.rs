//! Raster primitives: masks, regions, calibration and the morphology helpers
//! the pipeline stages are built from.
//!
//! Color rasters are plain [`image::RgbImage`]s and grayscale outputs plain
//! [`image::GrayImage`]s; this module adds the binary types on top.

mod mask;
pub mod ops;
mod polygon;
mod region;
mod scale;

pub use mask::{Mask, SELECTED, UNSELECTED};
pub use polygon::Polygon;
pub use region::{Point, Region, TissueRois};
pub use scale::ScaleInfo;
