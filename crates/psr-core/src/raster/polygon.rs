//! Polygon selections.
//!
//! Manual tissue delineation arrives as a polygon in pixel coordinates and is
//! rasterized into a [`Region`] using the even-odd rule at pixel centres.

use serde::{Deserialize, Serialize};

use super::mask::Mask;
use super::region::Region;

/// A closed polygon; the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[(f64, f64)] {
        &self.vertices
    }

    /// Rasterize into a `width` x `height` region.
    ///
    /// Fewer than three vertices produce an empty region.
    pub fn rasterize(&self, width: u32, height: u32) -> Region {
        if self.vertices.len() < 3 {
            return Region::from_mask(Mask::new(width, height));
        }
        let mut mask = Mask::new(width, height);
        let mut crossings = Vec::new();
        for y in 0..height {
            let cy = y as f64 + 0.5;
            crossings.clear();
            let n = self.vertices.len();
            for i in 0..n {
                let (x0, y0) = self.vertices[i];
                let (x1, y1) = self.vertices[(i + 1) % n];
                if (y0 <= cy && y1 > cy) || (y1 <= cy && y0 > cy) {
                    crossings.push(x0 + (cy - y0) / (y1 - y0) * (x1 - x0));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks_exact(2) {
                // Pixel x is inside when its centre x + 0.5 lies in [start, end).
                let start = (span[0] - 0.5).ceil().max(0.0);
                let end = (span[1] - 0.5).ceil().min(width as f64);
                let mut x = start;
                while x < end {
                    mask.set(x as u32, y, true);
                    x += 1.0;
                }
            }
        }
        Region::from_mask(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_square() {
        let square = Polygon::new(vec![(2.0, 2.0), (6.0, 2.0), (6.0, 6.0), (2.0, 6.0)]);
        let region = square.rasterize(10, 10);

        assert_eq!(region.area(), 16);
        assert!(region.contains(2, 2));
        assert!(region.contains(5, 5));
        assert!(!region.contains(6, 6));
    }

    #[test]
    fn test_degenerate_polygon_is_empty() {
        let line = Polygon::new(vec![(0.0, 0.0), (5.0, 5.0)]);
        assert!(line.rasterize(8, 8).is_empty());
    }

    #[test]
    fn test_polygon_is_clipped_to_raster() {
        let big = Polygon::new(vec![(-5.0, -5.0), (50.0, -5.0), (50.0, 50.0), (-5.0, 50.0)]);
        assert_eq!(big.rasterize(4, 3).area(), 12);
    }
}
