//! psr-core: Picrosirius Red collagen quantification
//!
//! This library turns a brightfield micrograph of a PSR-stained tissue
//! section into two measured rasters: the artifact-free PSR signal weighted
//! by stain saturation, and the artifact-free total tissue mask used as the
//! normalizing denominator.
//!
//! # Quick Start
//!
//! ```
//! use image::{Rgb, RgbImage};
//! use psr_core::{NoManualInput, PipelineOptions, PsrPipeline, ScaleInfo, SourceImage};
//!
//! // A stained square on a white slide.
//! let rgb = RgbImage::from_fn(64, 64, |x, y| {
//!     if (16..48).contains(&x) && (16..48).contains(&y) {
//!         Rgb([200, 40, 90])
//!     } else {
//!         Rgb([255, 255, 255])
//!     }
//! });
//!
//! let pipeline = PsrPipeline::new(PipelineOptions::new().tissue_sigma(0.0)).unwrap();
//! let output = pipeline
//!     .process(SourceImage::new("slide-01", rgb, ScaleInfo::uncalibrated()), &mut NoManualInput)
//!     .unwrap();
//!
//! assert_eq!(output.tissue_measurement.area_px, 32 * 32);
//! assert!(output.psr_fraction().unwrap() > 0.0);
//! ```
//!
//! # Stages
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Canvas normalization | [`canvas`] | RGB raster with canvas set to white |
//! | Tissue segmentation | [`segment`] | Tissue region and its complement |
//! | Color thresholding | [`threshold`] | PSR candidate mask |
//! | Artifact detection | [`artifact`] | Large bright components |
//! | Compositing | [`composite`] | Signal and total-tissue masks |
//! | Debinarization and measurement | [`quantify`] | Grayscale rasters and sums |
//!
//! Stages are plain functions over immutable inputs; [`PsrPipeline`] chains
//! them and owns the per-image [`ProcessingContext`].
//!
//! # Manual steps
//!
//! The manual canvas policy and manual tracing suspend on the [`ManualInput`]
//! trait. [`NoManualInput`] refuses both, which is what automatic runs use.

pub mod artifact;
pub mod canvas;
pub mod color;
pub mod composite;
mod error;
pub mod pipeline;
pub mod quantify;
pub mod raster;
pub mod segment;
pub mod threshold;


pub use artifact::{ArtifactDetection, ArtifactOptions};
pub use canvas::CanvasPolicy;
pub use color::{Hsb, HsbImage};
pub use error::{InputError, PipelineError};
pub use pipeline::{
    CanvasRequest, ManualInput, NoManualInput, PipelineOptions, PipelineOutput,
    ProcessingContext, PsrPipeline, SelectionRequest, SourceImage, StageSummary, ThresholdSet,
};
pub use quantify::{ImageId, Measurement, ScaledRaster};
pub use raster::{Mask, Point, Polygon, Region, ScaleInfo, TissueRois};
pub use segment::{ReferencePoint, RetryPolicy, TraceMode};
pub use threshold::{BandFilter, ChannelRange, HsbThreshold};
