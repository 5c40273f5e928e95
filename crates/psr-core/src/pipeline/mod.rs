//! The end-to-end PSR pipeline.
//!
//! [`PsrPipeline`] validates its options once and then processes images one
//! at a time. Every intermediate raster and region lives in a per-image
//! [`ProcessingContext`] that is consumed by [`PsrPipeline::process`], so
//! nothing carries over from one image to the next.

mod context;
mod input;
mod options;

pub use context::{PipelineOutput, ProcessingContext, SourceImage, StageSummary};
pub use input::{CanvasRequest, ManualInput, NoManualInput, SelectionRequest};
pub use options::{PipelineOptions, ThresholdSet};

use crate::artifact::detect_artifacts;
use crate::canvas::{normalize_canvas, CanvasPolicy};
use crate::composite::composite;
use crate::error::PipelineError;
use crate::quantify::{debinarize, measure, ImageId};
use crate::raster::{Mask, Region, TissueRois};
use crate::segment::{select_manually, signal_masks, trace_region, SignalMasks, TraceMode};
use crate::threshold::color_threshold;

/// Reusable pipeline configured for one run.
///
/// # Example
///
/// ```
/// use image::{Rgb, RgbImage};
/// use psr_core::{NoManualInput, PipelineOptions, PsrPipeline, ScaleInfo, SourceImage};
///
/// let pipeline = PsrPipeline::new(PipelineOptions::new()).unwrap();
/// let rgb = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
/// let source = SourceImage::new("blank", rgb, ScaleInfo::uncalibrated());
///
/// let output = pipeline.process(source, &mut NoManualInput).unwrap();
/// assert_eq!(output.psr_measurement.raw_integrated_density, 0);
/// ```
#[derive(Debug, Clone)]
pub struct PsrPipeline {
    options: PipelineOptions,
}

impl PsrPipeline {
    pub fn new(options: PipelineOptions) -> Result<Self, PipelineError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run every stage on `source`.
    ///
    /// `input` is only consulted for the manual canvas policy and manual
    /// tracing.
    pub fn process(
        &self,
        source: SourceImage,
        input: &mut dyn ManualInput,
    ) -> Result<PipelineOutput, PipelineError> {
        let SourceImage { id, rgb, scale } = source;
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::EmptyRaster);
        }

        let clicks = if self.options.canvas == CanvasPolicy::Manual {
            input.canvas_clicks(&CanvasRequest { id: &id, raw: &rgb })?
        } else {
            Vec::new()
        };
        let normalized = normalize_canvas(&rgb, self.options.canvas, &clicks);
        drop(rgb);
        tracing::debug!(image = %id, policy = ?self.options.canvas, clicks = clicks.len(), "Canvas normalized");

        let thresholds = &self.options.thresholds;
        let SignalMasks { raw, smoothed } =
            signal_masks(&normalized, thresholds.tissue_sigma, thresholds.background_min);
        let tissue = self.trace(&id, &smoothed, input)?;
        drop(smoothed);
        tracing::debug!(image = %id, signal = raw.count(), tissue = tissue.area(), "Tissue segmented");

        let ctx = ProcessingContext::new(id, scale, normalized, TissueRois::from_tissue(tissue));
        self.quantify(ctx, raw)
    }

    fn trace(
        &self,
        id: &ImageId,
        smoothed: &Mask,
        input: &mut dyn ManualInput,
    ) -> Result<Region, PipelineError> {
        match self.options.trace {
            TraceMode::Auto => {
                let (width, height) = smoothed.dimensions();
                let seed = self.options.reference.resolve(width, height)?;
                trace_region(smoothed, seed)
            }
            TraceMode::Manual => {
                let policy = self.options.retry;
                select_manually(smoothed, policy, |attempt| {
                    let request = SelectionRequest {
                        id,
                        attempt,
                        max_attempts: policy.max_attempts(),
                        smoothed,
                    };
                    Ok(input.tissue_selection(&request)?)
                })
            }
        }
    }

    fn quantify(
        &self,
        ctx: ProcessingContext,
        signal: Mask,
    ) -> Result<PipelineOutput, PipelineError> {
        let thresholds = &self.options.thresholds;
        let roi = ctx.rois.tissue();

        let candidate = color_threshold(&ctx.hsb, roi, &thresholds.color)?;
        tracing::debug!(image = %ctx.id, candidates = candidate.count(), "Color thresholded");

        let artifacts = detect_artifacts(&ctx.normalized, roi, &thresholds.artifact)?;
        let composites = composite(&candidate, &artifacts.mask, &signal, roi)?;

        let psr_image = debinarize(&composites.psr_signal, ctx.hsb.saturation())?;
        let tissue_image = composites.total_tissue.as_image().clone();
        let psr_measurement = measure(&psr_image, roi, &ctx.scale)?;
        let tissue_measurement = measure(&tissue_image, roi, &ctx.scale)?;

        let summary = StageSummary {
            signal_px: signal.count(),
            tissue_px: roi.area(),
            candidate_px: candidate.count(),
            artifacts_accepted: artifacts.accepted,
            artifacts_rejected: artifacts.rejected,
            artifact_px: artifacts.area,
            psr_px: composites.psr_signal.count(),
        };
        tracing::debug!(
            image = %ctx.id,
            psr_px = summary.psr_px,
            psr_raw = psr_measurement.raw_integrated_density,
            tissue_raw = tissue_measurement.raw_integrated_density,
            "Measured"
        );

        Ok(PipelineOutput {
            psr: ctx.scaled(psr_image),
            tissue: ctx.scaled(tissue_image),
            id: ctx.id,
            psr_measurement,
            tissue_measurement,
            summary,
        })
    }
}
