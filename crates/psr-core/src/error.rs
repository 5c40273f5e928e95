//! Error types for the quantification pipeline.
//!
//! [`PipelineError`] is the single error surfaced by [`PsrPipeline`](crate::PsrPipeline).
//! Every variant is fatal for the image being processed: the pipeline never
//! emits a partial measurement.

use thiserror::Error;

/// Failure reported by a [`ManualInput`](crate::ManualInput) collaborator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InputError {
    /// No interactive collaborator is attached to this run.
    #[error("manual input is not available for {0}")]
    Unavailable(&'static str),

    /// The collaborator could not produce the requested input.
    #[error("manual input failed: {0}")]
    Failed(String),
}

/// Error raised while configuring or running the pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    #[error("invalid {channel} range: lower {lower} > upper {upper}")]
    InvalidRange {
        channel: &'static str,
        lower: u8,
        upper: u8,
    },

    #[error("invalid {name} sigma: {value} (must be finite and >= 0)")]
    InvalidSigma { name: &'static str, value: f32 },

    #[error("reference point ({x}, {y}) lies outside the {width}x{height} raster")]
    SeedOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("no tissue selection after {attempts} attempts")]
    SegmentationFailed { attempts: u32 },

    #[error("raster dimensions differ: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("raster has no pixels")]
    EmptyRaster,

    #[error(transparent)]
    Input(#[from] InputError),
}
