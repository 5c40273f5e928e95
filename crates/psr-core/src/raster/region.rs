//! Regions of interest.
//!
//! A [`Region`] is a set of pixel coordinates backed by a [`Mask`]. The
//! segmenter produces exactly one tissue region per image together with its
//! complement; [`TissueRois`] keeps the two paired so they can only ever be
//! mutually exclusive and jointly exhaustive.

use serde::{Deserialize, Serialize};

use super::mask::Mask;
use crate::error::PipelineError;

/// A pixel coordinate, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    #[inline]
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether the point lies inside a `width` x `height` raster.
    #[inline]
    pub fn is_within(&self, width: u32, height: u32) -> bool {
        self.x < width && self.y < height
    }

    /// Fail with [`PipelineError::SeedOutOfBounds`] unless the point is inside the raster.
    pub fn ensure_within(&self, width: u32, height: u32) -> Result<(), PipelineError> {
        if self.is_within(width, height) {
            Ok(())
        } else {
            Err(PipelineError::SeedOutOfBounds {
                x: self.x,
                y: self.y,
                width,
                height,
            })
        }
    }
}

/// A region of interest within a raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    mask: Mask,
}

impl Region {
    pub fn from_mask(mask: Mask) -> Self {
        Self { mask }
    }

    /// The region covering every pixel.
    pub fn whole(width: u32, height: u32) -> Self {
        Self {
            mask: Mask::full(width, height),
        }
    }

    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn into_mask(self) -> Mask {
        self.mask
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.mask.dimensions()
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.mask.get(x, y)
    }

    /// Number of pixels in the region.
    pub fn area(&self) -> u64 {
        self.mask.count()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    /// The exact pixel-domain complement.
    pub fn complement(&self) -> Region {
        Region {
            mask: self.mask.invert(),
        }
    }

    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.mask.centroid()
    }
}

/// The tissue region of one image paired with its complement.
#[derive(Debug, Clone)]
pub struct TissueRois {
    tissue: Region,
    complement: Region,
}

impl TissueRois {
    pub fn from_tissue(tissue: Region) -> Self {
        let complement = tissue.complement();
        Self { tissue, complement }
    }

    #[inline]
    pub fn tissue(&self) -> &Region {
        &self.tissue
    }

    #[inline]
    pub fn complement(&self) -> &Region {
        &self.complement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complement_is_exclusive_and_exhaustive() {
        let tissue = Region::from_mask(Mask::from_fn(6, 4, |x, y| x + y < 4));
        let rois = TissueRois::from_tissue(tissue);

        let overlap = rois
            .tissue()
            .mask()
            .intersect(rois.complement().mask())
            .unwrap();
        let cover = rois.tissue().mask().union(rois.complement().mask()).unwrap();

        assert!(overlap.is_empty());
        assert_eq!(cover.count(), 24);
    }

    #[test]
    fn test_point_bounds() {
        assert!(Point::new(9, 9).is_within(10, 10));
        assert!(!Point::new(10, 0).is_within(10, 10));
        assert!(Point::new(0, 10).ensure_within(10, 10).is_err());
    }
}
