//! Canvas normalization.
//!
//! Slide scans are often padded with a black canvas (rotation, stitching).
//! Before segmentation every canvas pixel has to carry the background color,
//! otherwise the canvas would be mistaken for tissue. [`CanvasPolicy`]
//! selects how canvas pixels are found:
//!
//! | Policy | Behavior |
//! |--------|----------|
//! | `None` | Pass-through, the canvas already matches the background |
//! | `CornerFill` | Flood-fill from each corner whose pixel is pure black |
//! | `GlobalRecolor` | Recolor every pure black pixel |
//! | `Manual` | Flood-fill from operator-supplied clicks |
//!
//! `CornerFill` assumes the canvas touches the image corners. `GlobalRecolor`
//! is faster but also recolors genuinely black tissue pixels; choosing it is
//! the operator's responsibility, nothing here detects the mismatch.

use std::collections::VecDeque;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::raster::Point;

/// Background color canvas pixels are rewritten to.
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// How canvas pixels are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasPolicy {
    None,
    #[default]
    CornerFill,
    GlobalRecolor,
    Manual,
}

/// Return a copy of `raw` with its canvas recolored to [`BACKGROUND`].
///
/// `clicks` is only consulted under [`CanvasPolicy::Manual`].
pub fn normalize_canvas(raw: &RgbImage, policy: CanvasPolicy, clicks: &[Point]) -> RgbImage {
    match policy {
        CanvasPolicy::None => raw.clone(),
        CanvasPolicy::CornerFill => corner_fill(raw),
        CanvasPolicy::GlobalRecolor => global_recolor(raw),
        CanvasPolicy::Manual => {
            let mut image = raw.clone();
            for &click in clicks {
                if !click.is_within(image.width(), image.height()) {
                    tracing::warn!(x = click.x, y = click.y, "Ignoring canvas click outside the image");
                    continue;
                }
                let filled = flood_fill(&mut image, click, BACKGROUND);
                tracing::debug!(x = click.x, y = click.y, filled, "Manual canvas fill");
            }
            image
        }
    }
}

/// Flood-fill the black region reachable from each black corner.
pub fn corner_fill(raw: &RgbImage) -> RgbImage {
    let mut image = raw.clone();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image;
    }
    let corners = [
        Point::new(0, 0),
        Point::new(width - 1, 0),
        Point::new(0, height - 1),
        Point::new(width - 1, height - 1),
    ];
    for corner in corners {
        if *image.get_pixel(corner.x, corner.y) == BLACK {
            let filled = flood_fill(&mut image, corner, BACKGROUND);
            tracing::debug!(x = corner.x, y = corner.y, filled, "Corner canvas fill");
        }
    }
    image
}

/// Recolor every pure black pixel, connected or not.
pub fn global_recolor(raw: &RgbImage) -> RgbImage {
    let mut image = raw.clone();
    for pixel in image.pixels_mut() {
        if *pixel == BLACK {
            *pixel = BACKGROUND;
        }
    }
    image
}

/// Replace the 4-connected region of pixels equal to the seed's color.
///
/// Returns the number of pixels changed; a seed already of `color` changes
/// nothing.
pub fn flood_fill(image: &mut RgbImage, seed: Point, color: Rgb<u8>) -> usize {
    let (width, height) = image.dimensions();
    if !seed.is_within(width, height) {
        return 0;
    }
    let target = *image.get_pixel(seed.x, seed.y);
    if target == color {
        return 0;
    }

    let mut filled = 0;
    let mut queue = VecDeque::from([(seed.x, seed.y)]);
    image.put_pixel(seed.x, seed.y, color);
    while let Some((x, y)) = queue.pop_front() {
        filled += 1;
        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < width && ny < height && *image.get_pixel(nx, ny) == target {
                image.put_pixel(nx, ny, color);
                queue.push_back((nx, ny));
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    const TISSUE: Rgb<u8> = Rgb([180, 60, 90]);

    /// 8x8 image with a black canvas in the top-left and bottom-right corners
    /// and tissue elsewhere, plus an isolated black pixel inside the tissue.
    fn padded() -> RgbImage {
        RgbImage::from_fn(8, 8, |x, y| {
            if x + y < 3 || x + y > 11 || (x, y) == (4, 3) {
                BLACK
            } else {
                TISSUE
            }
        })
    }

    #[test]
    fn test_none_is_pass_through() {
        let raw = padded();
        assert_eq!(normalize_canvas(&raw, CanvasPolicy::None, &[]), raw);
    }

    #[test]
    fn test_corner_fill_only_touches_connected_canvas() {
        let out = corner_fill(&padded());
        assert_eq!(*out.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*out.get_pixel(7, 7), BACKGROUND);
        // Isolated black pixel inside tissue is not connected to a corner.
        assert_eq!(*out.get_pixel(4, 3), BLACK);
        // Non-black corners are left alone.
        assert_eq!(*out.get_pixel(7, 0), TISSUE);
    }

    #[test]
    fn test_global_recolor_rewrites_all_black() {
        let out = global_recolor(&padded());
        assert!(out.pixels().all(|p| *p != BLACK));
        assert_eq!(*out.get_pixel(4, 3), BACKGROUND);
    }

    #[test]
    fn test_manual_fills_from_clicks() {
        let raw = padded();
        let out = normalize_canvas(
            &raw,
            CanvasPolicy::Manual,
            &[Point::new(4, 3), Point::new(100, 100)],
        );
        assert_eq!(*out.get_pixel(4, 3), BACKGROUND);
        assert_eq!(*out.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn test_flood_fill_counts_pixels() {
        let mut image = padded();
        // x + y < 3 covers 6 pixels.
        assert_eq!(flood_fill(&mut image, Point::new(0, 0), BACKGROUND), 6);
        assert_eq!(flood_fill(&mut image, Point::new(0, 0), BACKGROUND), 0);
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: CanvasPolicy = serde_yaml_like("global-recolor");
        assert_eq!(policy, CanvasPolicy::GlobalRecolor);
    }

    fn serde_yaml_like(name: &str) -> CanvasPolicy {
        use serde::de::value::{Error, StrDeserializer};
        use serde::de::IntoDeserializer;
        let de: StrDeserializer<'_, Error> = name.into_deserializer();
        CanvasPolicy::deserialize(de).unwrap()
    }
}
