//! HSB bandpass thresholding.
//!
//! A pixel is a PSR candidate when its hue, saturation and brightness each
//! pass their [`BandFilter`]. The three classifications are combined with a
//! logical AND, so violating any single band rejects the pixel.

mod range;

pub use range::{BandFilter, ChannelRange};

use serde::{Deserialize, Serialize};

use crate::color::{Hsb, HsbImage};
use crate::error::PipelineError;
use crate::raster::{Mask, Region};

/// Per-channel bands of the PSR color threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsbThreshold {
    pub hue: BandFilter,
    pub saturation: BandFilter,
    pub brightness: BandFilter,
}

impl Default for HsbThreshold {
    /// Red-magenta hues with moderate saturation, any brightness.
    fn default() -> Self {
        Self {
            hue: BandFilter::pass(200, 255),
            saturation: BandFilter::pass(30, 255),
            brightness: BandFilter::pass(0, 255),
        }
    }
}

impl HsbThreshold {
    /// Hue may wrap around; saturation and brightness must be ordered.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.saturation.validate("saturation")?;
        self.brightness.validate("brightness")?;
        Ok(())
    }

    #[inline]
    pub fn classify(&self, pixel: Hsb) -> bool {
        self.hue.matches_wrapping(pixel.hue)
            && self.saturation.matches(pixel.saturation)
            && self.brightness.matches(pixel.brightness)
    }
}

/// Classify every pixel of `hsb` that lies inside `roi`.
///
/// Pixels outside the region are never candidates.
pub fn color_threshold(
    hsb: &HsbImage,
    roi: &Region,
    threshold: &HsbThreshold,
) -> Result<Mask, PipelineError> {
    let (width, height) = hsb.dimensions();
    roi.mask().ensure_same_size((width, height))?;
    Ok(Mask::from_fn(width, height, |x, y| {
        roi.contains(x, y) && threshold.classify(hsb.get(x, y))
    }))
}
