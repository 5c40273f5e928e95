//! Binary masks.
//!
//! A [`Mask`] is a single-channel 8-bit raster whose pixels are either
//! [`SELECTED`] (255) or [`UNSELECTED`] (0). The invariant is enforced by
//! every constructor, so downstream stages can treat a mask as a boolean grid
//! while still handing the underlying [`GrayImage`] to image filters.

use image::{GrayImage, Luma};

use crate::error::PipelineError;

/// Pixel value of a selected mask pixel.
pub const SELECTED: u8 = 255;

/// Pixel value of an unselected mask pixel.
pub const UNSELECTED: u8 = 0;

/// A binary raster restricted to {0, 255}.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    image: GrayImage,
}

impl Mask {
    /// Create an empty (all unselected) mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Create a mask with every pixel selected.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([SELECTED])),
        }
    }

    /// Build a mask from a per-pixel predicate.
    pub fn from_fn<F>(width: u32, height: u32, mut selected: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        Self {
            image: GrayImage::from_fn(width, height, |x, y| Luma([to_value(selected(x, y))])),
        }
    }

    /// Binarize a grayscale image: any non-zero pixel becomes selected.
    pub fn from_nonzero(image: &GrayImage) -> Self {
        let mut image = image.clone();
        for p in image.pixels_mut() {
            p.0[0] = to_value(p.0[0] != 0);
        }
        Self { image }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Whether the pixel at `(x, y)` is selected.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y).0[0] == SELECTED
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, selected: bool) {
        self.image.put_pixel(x, y, Luma([to_value(selected)]));
    }

    /// Number of selected pixels.
    pub fn count(&self) -> u64 {
        self.image.as_raw().iter().filter(|&&v| v == SELECTED).count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.image.as_raw().iter().all(|&v| v == UNSELECTED)
    }

    /// Row-major selection flags.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.image.as_raw().iter().map(|&v| v == SELECTED)
    }

    /// Coordinates of all selected pixels, row-major.
    pub fn selected_points(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width();
        self.image
            .as_raw()
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == SELECTED)
            .map(move |(i, _)| ((i as u32) % width, (i as u32) / width))
    }

    /// Mean position of the selected pixels, or `None` for an empty mask.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let mut n = 0u64;
        let (mut sx, mut sy) = (0.0f64, 0.0f64);
        for (x, y) in self.selected_points() {
            n += 1;
            sx += x as f64;
            sy += y as f64;
        }
        (n > 0).then(|| (sx / n as f64, sy / n as f64))
    }

    pub fn invert(&self) -> Mask {
        self.map(|v| !v)
    }

    /// Pixels selected in either mask.
    pub fn union(&self, other: &Mask) -> Result<Mask, PipelineError> {
        self.zip_with(other, |a, b| a || b)
    }

    /// Pixels selected in both masks.
    pub fn intersect(&self, other: &Mask) -> Result<Mask, PipelineError> {
        self.zip_with(other, |a, b| a && b)
    }

    /// Pixels selected in `self` and not in `other`.
    pub fn subtract(&self, other: &Mask) -> Result<Mask, PipelineError> {
        self.zip_with(other, |a, b| a && !b)
    }

    /// Fail with [`PipelineError::DimensionMismatch`] unless `other` has the same size.
    pub fn ensure_same_size(&self, other: (u32, u32)) -> Result<(), PipelineError> {
        if self.dimensions() != other {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dimensions(),
                actual: other,
            });
        }
        Ok(())
    }

    /// Borrow the underlying 0/255 image.
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    pub fn into_image(self) -> GrayImage {
        self.image
    }

    fn map<F: Fn(bool) -> bool>(&self, f: F) -> Mask {
        let mut image = self.image.clone();
        for p in image.pixels_mut() {
            p.0[0] = to_value(f(p.0[0] == SELECTED));
        }
        Mask { image }
    }

    fn zip_with<F: Fn(bool, bool) -> bool>(
        &self,
        other: &Mask,
        f: F,
    ) -> Result<Mask, PipelineError> {
        self.ensure_same_size(other.dimensions())?;
        let mut image = self.image.clone();
        for (p, q) in image.pixels_mut().zip(other.image.pixels()) {
            p.0[0] = to_value(f(p.0[0] == SELECTED, q.0[0] == SELECTED));
        }
        Ok(Mask { image })
    }
}

impl std::fmt::Debug for Mask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mask")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("selected", &self.count())
            .finish()
    }
}

#[inline]
fn to_value(selected: bool) -> u8 {
    if selected {
        SELECTED
    } else {
        UNSELECTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stripes(width: u32, height: u32) -> Mask {
        Mask::from_fn(width, height, |x, _| x % 2 == 0)
    }

    #[test]
    fn test_new_is_empty_and_full_is_full() {
        assert!(Mask::new(4, 3).is_empty());
        assert_eq!(Mask::full(4, 3).count(), 12);
    }

    #[test]
    fn test_from_nonzero_enforces_binary_values() {
        let gray = GrayImage::from_raw(3, 1, vec![0, 7, 255]).unwrap();
        let mask = Mask::from_nonzero(&gray);
        assert_eq!(mask.as_image().as_raw(), &vec![0, 255, 255]);
    }

    #[test]
    fn test_set_operations() {
        let a = stripes(4, 2);
        let b = Mask::from_fn(4, 2, |x, _| x < 2);

        assert_eq!(a.union(&b).unwrap().count(), 6);
        assert_eq!(a.intersect(&b).unwrap().count(), 2);
        assert_eq!(a.subtract(&b).unwrap().count(), 2);
        assert_eq!(a.invert().count(), 4);
    }

    #[test]
    fn test_mismatched_dimensions_are_rejected() {
        let a = Mask::new(4, 4);
        let b = Mask::new(4, 5);
        assert_eq!(
            a.union(&b),
            Err(PipelineError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 5),
            })
        );
    }

    #[test]
    fn test_centroid() {
        let mask = Mask::from_fn(5, 5, |x, y| (1..=3).contains(&x) && (1..=3).contains(&y));
        assert_eq!(mask.centroid(), Some((2.0, 2.0)));
        assert_eq!(Mask::new(5, 5).centroid(), None);
    }

    #[test]
    fn test_selected_points_are_row_major() {
        let mask = Mask::from_fn(3, 2, |x, y| (x, y) == (2, 0) || (x, y) == (0, 1));
        let points: Vec<_> = mask.selected_points().collect();
        assert_eq!(points, vec![(2, 0), (0, 1)]);
    }
}
