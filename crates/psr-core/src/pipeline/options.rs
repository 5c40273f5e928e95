//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactOptions;
use crate::canvas::CanvasPolicy;
use crate::error::PipelineError;
use crate::segment::{ReferencePoint, RetryPolicy, TraceMode, DEFAULT_BACKGROUND_MIN};
use crate::threshold::HsbThreshold;

/// Numeric thresholds of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdSet {
    pub color: HsbThreshold,
    /// Gaussian sigma (pixels) smoothing the tissue mask; 0 disables the blur.
    pub tissue_sigma: f32,
    /// Pixels with every channel at or above this are background glass.
    pub background_min: u8,
    pub artifact: ArtifactOptions,
}

impl Default for ThresholdSet {
    fn default() -> Self {
        Self {
            color: HsbThreshold::default(),
            tissue_sigma: 2.0,
            background_min: DEFAULT_BACKGROUND_MIN,
            artifact: ArtifactOptions::default(),
        }
    }
}

impl ThresholdSet {
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.color.validate()?;
        self.artifact.green.validate("green")?;
        validate_sigma("tissue", self.tissue_sigma)?;
        validate_sigma("artifact", self.artifact.sigma)?;
        Ok(())
    }
}

fn validate_sigma(name: &'static str, value: f32) -> Result<(), PipelineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(PipelineError::InvalidSigma { name, value });
    }
    Ok(())
}

/// Options for [`PsrPipeline`](crate::PsrPipeline).
///
/// # Example
///
/// ```
/// use psr_core::{CanvasPolicy, PipelineOptions, TraceMode};
///
/// let options = PipelineOptions::new()
///     .canvas(CanvasPolicy::GlobalRecolor)
///     .trace(TraceMode::Auto)
///     .tissue_sigma(3.0);
///
/// assert_eq!(options.thresholds.tissue_sigma, 3.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOptions {
    pub canvas: CanvasPolicy,
    pub trace: TraceMode,
    pub reference: ReferencePoint,
    pub thresholds: ThresholdSet,
    pub retry: RetryPolicy,
}

impl PipelineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn canvas(mut self, policy: CanvasPolicy) -> Self {
        self.canvas = policy;
        self
    }

    #[inline]
    pub fn trace(mut self, mode: TraceMode) -> Self {
        self.trace = mode;
        self
    }

    #[inline]
    pub fn reference(mut self, reference: ReferencePoint) -> Self {
        self.reference = reference;
        self
    }

    #[inline]
    pub fn thresholds(mut self, thresholds: ThresholdSet) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[inline]
    pub fn tissue_sigma(mut self, sigma: f32) -> Self {
        self.thresholds.tissue_sigma = sigma;
        self
    }

    #[inline]
    pub fn background_min(mut self, level: u8) -> Self {
        self.thresholds.background_min = level;
        self
    }

    #[inline]
    pub fn artifact(mut self, artifact: ArtifactOptions) -> Self {
        self.thresholds.artifact = artifact;
        self
    }

    #[inline]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Check ranges and sigmas.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::threshold::ChannelRange;

    #[test]
    fn test_defaults_validate() {
        assert_eq!(PipelineOptions::new().validate(), Ok(()));
    }

    #[test]
    fn test_negative_sigma_is_rejected() {
        let options = PipelineOptions::new().tissue_sigma(-1.0);
        assert_eq!(
            options.validate(),
            Err(PipelineError::InvalidSigma {
                name: "tissue",
                value: -1.0,
            })
        );
    }

    #[test]
    fn test_nan_artifact_sigma_is_rejected() {
        let options = PipelineOptions::new().artifact(ArtifactOptions {
            sigma: f32::NAN,
            ..ArtifactOptions::default()
        });
        assert!(matches!(
            options.validate(),
            Err(PipelineError::InvalidSigma { name: "artifact", .. })
        ));
    }

    #[test]
    fn test_inverted_green_range_is_rejected() {
        let options = PipelineOptions::new().artifact(ArtifactOptions {
            green: ChannelRange::new(250, 10),
            ..ArtifactOptions::default()
        });
        assert!(matches!(
            options.validate(),
            Err(PipelineError::InvalidRange { channel: "green", .. })
        ));
    }
}
