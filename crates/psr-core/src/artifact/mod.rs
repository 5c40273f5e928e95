//! Artifact detection.
//!
//! Large contiguous over-bright regions (perivascular collagen, folds) are
//! found on the green channel inside the tissue region: the channel is
//! band-thresholded, coalesced with a wide blur, hole-filled, and only
//! components of at least `min_area` pixels are kept.

mod isodata;

pub use isodata::isodata_level;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::raster::ops::{blur_rebinarize, fill_holes, label_components};
use crate::raster::{Mask, Region};
use crate::threshold::ChannelRange;

/// Artifact detector settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtifactOptions {
    pub green: ChannelRange,
    pub sigma: f32,
    pub min_area: u64,
    /// Raise `green.lower` to the dark-background IsoData level of the
    /// in-region histogram when that is stricter.
    #[serde(default)]
    pub auto_baseline: bool,
}

impl Default for ArtifactOptions {
    fn default() -> Self {
        Self {
            green: ChannelRange::new(180, 255),
            sigma: 8.0,
            min_area: 5000,
            auto_baseline: false,
        }
    }
}

/// Accepted artifact mask and component statistics.
#[derive(Debug, Clone)]
pub struct ArtifactDetection {
    pub mask: Mask,
    pub accepted: usize,
    pub rejected: usize,
    /// Selected pixels in `mask`.
    pub area: u64,
}

/// Find artifacts in `rgb` within `roi`.
pub fn detect_artifacts(
    rgb: &RgbImage,
    roi: &Region,
    options: &ArtifactOptions,
) -> Result<ArtifactDetection, PipelineError> {
    let (width, height) = rgb.dimensions();
    roi.mask().ensure_same_size((width, height))?;

    let range = effective_range(rgb, roi, options);
    let bright = Mask::from_fn(width, height, |x, y| {
        roi.contains(x, y) && range.contains(rgb.get_pixel(x, y).0[1])
    });
    let coalesced = fill_holes(&blur_rebinarize(&bright, options.sigma));

    let (labels, components) = label_components(&coalesced);
    let mut keep = vec![false; components.len() + 1];
    let mut accepted = 0;
    for component in &components {
        if component.area >= options.min_area {
            keep[component.label as usize] = true;
            accepted += 1;
        }
    }
    let rejected = components.len() - accepted;
    let mask = Mask::from_fn(width, height, |x, y| {
        keep[labels.get_pixel(x, y).0[0] as usize]
    });
    let area = mask.count();

    tracing::debug!(
        lower = range.lower,
        upper = range.upper,
        accepted,
        rejected,
        area,
        "Artifact detection"
    );
    Ok(ArtifactDetection {
        mask,
        accepted,
        rejected,
        area,
    })
}

fn effective_range(rgb: &RgbImage, roi: &Region, options: &ArtifactOptions) -> ChannelRange {
    if !options.auto_baseline {
        return options.green;
    }
    let mut histogram = [0u64; 256];
    for (x, y) in roi.mask().selected_points() {
        histogram[rgb.get_pixel(x, y).0[1] as usize] += 1;
    }
    match isodata_level(&histogram) {
        Some(level) => {
            let baseline = level.saturating_add(1);
            tracing::debug!(level, "IsoData green baseline");
            ChannelRange::new(options.green.lower.max(baseline), options.green.upper)
        }
        None => options.green,
    }
}
