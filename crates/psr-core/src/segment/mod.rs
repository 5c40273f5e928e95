//! Tissue segmentation.
//!
//! The canvas-normalized raster is binarized (anything darker than the
//! near-white background is signal), smoothed with a blur-then-threshold pass, hole-filled, and the
//! connected component under a reference point is traced as the tissue
//! region. When automatic tracing is disabled the operator supplies the
//! region instead, under a bounded [`RetryPolicy`].

mod retry;

pub use retry::RetryPolicy;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::raster::ops::{blur_rebinarize, connected_class, fill_holes};
use crate::raster::{Mask, Point, Region};

/// How the tissue region is delineated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraceMode {
    /// Trace the component under the reference point.
    #[default]
    Auto,
    /// Ask the [`ManualInput`](crate::ManualInput) collaborator for a selection.
    Manual,
}

/// Seed location for automatic tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePoint {
    /// The geometric centre `(width / 2, height / 2)`.
    #[default]
    Centroid,
    At(Point),
}

impl ReferencePoint {
    /// Resolve to a pixel coordinate in a `width` x `height` raster.
    pub fn resolve(&self, width: u32, height: u32) -> Result<Point, PipelineError> {
        let point = match *self {
            ReferencePoint::Centroid => Point::new(width / 2, height / 2),
            ReferencePoint::At(point) => point,
        };
        point.ensure_within(width, height)?;
        Ok(point)
    }
}

/// Raw and smoothed signal masks of one image.
#[derive(Debug, Clone)]
pub struct SignalMasks {
    /// Every non-background pixel; kept for the total-tissue composite.
    pub raw: Mask,
    /// `raw` after blur, re-binarization and hole filling.
    pub smoothed: Mask,
}

/// Lowest channel value still counted as background glass.
pub const DEFAULT_BACKGROUND_MIN: u8 = 250;

/// Pixels that are not background.
///
/// A pixel is background when every channel is at least `background_min`;
/// 255 only accepts pure white.
pub fn binarize_signal(normalized: &RgbImage, background_min: u8) -> Mask {
    Mask::from_fn(normalized.width(), normalized.height(), |x, y| {
        normalized
            .get_pixel(x, y)
            .0
            .iter()
            .any(|&channel| channel < background_min)
    })
}

/// Build the raw and smoothed signal masks.
pub fn signal_masks(normalized: &RgbImage, sigma: f32, background_min: u8) -> SignalMasks {
    let raw = binarize_signal(normalized, background_min);
    let smoothed = fill_holes(&blur_rebinarize(&raw, sigma));
    SignalMasks { raw, smoothed }
}

/// Wand-style trace of the region containing `seed`.
///
/// The component sharing the seed's class is selected and its enclosed holes
/// are filled, so a traced outline always includes its interior.
pub fn trace_region(smoothed: &Mask, seed: Point) -> Result<Region, PipelineError> {
    let (width, height) = smoothed.dimensions();
    seed.ensure_within(width, height)?;
    let component = connected_class(smoothed, seed.x, seed.y);
    Ok(Region::from_mask(fill_holes(&component)))
}

/// Run the manual selection loop.
///
/// `select` receives the 1-based attempt number; `None` or an empty region
/// counts as a failed attempt. A region of the wrong size is rejected
/// outright.
pub fn select_manually<F>(
    smoothed: &Mask,
    policy: RetryPolicy,
    mut select: F,
) -> Result<Region, PipelineError>
where
    F: FnMut(u32) -> Result<Option<Region>, PipelineError>,
{
    policy.run(|attempt| {
        let Some(region) = select(attempt)? else {
            tracing::warn!(attempt, "No tissue selection supplied");
            return Ok(None);
        };
        smoothed.ensure_same_size(region.dimensions())?;
        if region.is_empty() {
            tracing::warn!(attempt, "Tissue selection is empty");
            return Ok(None);
        }
        Ok(Some(region))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;
    use image::Rgb;

    fn square_on_white(size: u32, side: u32) -> RgbImage {
        let start = (size - side) / 2;
        let range = start..start + side;
        RgbImage::from_fn(size, size, |x, y| {
            if range.contains(&x) && range.contains(&y) {
                Rgb([0, 0, 0])
            } else {
                BACKGROUND
            }
        })
    }

    #[test]
    fn test_binarize_signal() {
        let mask = binarize_signal(&square_on_white(10, 4), 255);
        assert_eq!(mask.count(), 16);
    }

    #[test]
    fn test_near_white_is_background() {
        let image = RgbImage::from_fn(4, 1, |x, _| match x {
            0 => Rgb([252, 251, 254]),
            1 => Rgb([250, 250, 250]),
            2 => Rgb([255, 249, 255]),
            _ => Rgb([200, 40, 90]),
        });
        let mask = binarize_signal(&image, DEFAULT_BACKGROUND_MIN);
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![false, false, true, true]);

        assert_eq!(binarize_signal(&image, 255).count(), 4);
    }

    #[test]
    fn test_reference_point_resolution() {
        assert_eq!(ReferencePoint::Centroid.resolve(100, 60), Ok(Point::new(50, 30)));
        assert!(matches!(
            ReferencePoint::At(Point::new(5, 70)).resolve(100, 60),
            Err(PipelineError::SeedOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_trace_picks_seed_component_only() {
        // Two separate blocks; the seed sits in the right one.
        let mask = Mask::from_fn(20, 10, |x, y| (2..8).contains(&y) && (x < 6 || x > 12));
        let region = trace_region(&mask, Point::new(15, 4)).unwrap();
        assert_eq!(region.area(), 7 * 6);
        assert!(!region.contains(2, 4));
    }

    #[test]
    fn test_trace_fills_enclosed_holes() {
        let mask = Mask::from_fn(12, 12, |x, y| {
            let outer = (2..10).contains(&x) && (2..10).contains(&y);
            let inner = (4..8).contains(&x) && (4..8).contains(&y);
            outer && !inner
        });
        let region = trace_region(&mask, Point::new(2, 2)).unwrap();
        assert_eq!(region.area(), 64);
    }

    #[test]
    fn test_trace_from_background_on_blank_mask_covers_everything() {
        let region = trace_region(&Mask::new(8, 8), Point::new(4, 4)).unwrap();
        assert_eq!(region.area(), 64);
    }

    #[test]
    fn test_manual_selection_retries_then_succeeds() {
        let smoothed = Mask::new(6, 6);
        let mut calls = 0;
        let region = select_manually(&smoothed, RetryPolicy::default(), |attempt| {
            calls += 1;
            Ok((attempt == 3).then(|| Region::whole(6, 6)))
        })
        .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(region.area(), 36);
    }

    #[test]
    fn test_manual_selection_exhausts() {
        let smoothed = Mask::new(6, 6);
        let result = select_manually(&smoothed, RetryPolicy::default(), |_| {
            Ok(Some(Region::from_mask(Mask::new(6, 6))))
        });
        assert_eq!(result, Err(PipelineError::SegmentationFailed { attempts: 3 }));
    }

    #[test]
    fn test_manual_selection_rejects_wrong_size() {
        let smoothed = Mask::new(6, 6);
        let result = select_manually(&smoothed, RetryPolicy::default(), |_| {
            Ok(Some(Region::whole(5, 6)))
        });
        assert!(matches!(result, Err(PipelineError::DimensionMismatch { .. })));
    }
}
