use image::RgbImage;
use serde::Serialize;

use crate::color::HsbImage;
use crate::quantify::{ImageId, Measurement, ScaledRaster};
use crate::raster::{ScaleInfo, TissueRois};

/// One input image with its identifier and calibration.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: ImageId,
    pub rgb: RgbImage,
    pub scale: ScaleInfo,
}

impl SourceImage {
    pub fn new(id: impl Into<ImageId>, rgb: RgbImage, scale: ScaleInfo) -> Self {
        Self {
            id: id.into(),
            rgb,
            scale,
        }
    }
}

/// Working set of one image once its tissue region is known.
///
/// Owned by a single [`PsrPipeline::process`](crate::PsrPipeline::process)
/// call and dropped before it returns.
#[derive(Debug)]
pub struct ProcessingContext {
    pub id: ImageId,
    pub scale: ScaleInfo,
    pub dimensions: (u32, u32),
    pub normalized: RgbImage,
    pub hsb: HsbImage,
    pub rois: TissueRois,
}

impl ProcessingContext {
    pub fn new(id: ImageId, scale: ScaleInfo, normalized: RgbImage, rois: TissueRois) -> Self {
        let hsb = HsbImage::from_rgb(&normalized);
        Self {
            id,
            scale,
            dimensions: normalized.dimensions(),
            normalized,
            hsb,
            rois,
        }
    }

    /// Tag a finished raster with this image's id and calibration.
    pub fn scaled(&self, image: image::GrayImage) -> ScaledRaster {
        ScaledRaster::new(image, self.scale.clone(), self.id.clone())
    }
}

/// Pixel counts gathered along the way, for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    pub signal_px: u64,
    pub tissue_px: u64,
    pub candidate_px: u64,
    pub artifacts_accepted: usize,
    pub artifacts_rejected: usize,
    pub artifact_px: u64,
    pub psr_px: u64,
}

/// Everything the pipeline produces for one image.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub id: ImageId,
    pub psr: ScaledRaster,
    pub tissue: ScaledRaster,
    pub psr_measurement: Measurement,
    pub tissue_measurement: Measurement,
    pub summary: StageSummary,
}

impl PipelineOutput {
    /// PSR signal relative to artifact-free tissue, `None` without tissue.
    pub fn psr_fraction(&self) -> Option<f64> {
        let tissue = self.tissue_measurement.raw_integrated_density;
        (tissue > 0).then(|| self.psr_measurement.raw_integrated_density as f64 / tissue as f64)
    }
}
