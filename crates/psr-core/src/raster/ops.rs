//! Morphological building blocks shared by the segmenter and the artifact
//! detector: blur-then-threshold smoothing, hole filling and connected
//! component labelling.

use std::collections::HashSet;

use image::{ImageBuffer, Luma};
use imageproc::filter::gaussian_blur_f32;
use imageproc::region_labelling::{connected_components, Connectivity};

use super::mask::{Mask, SELECTED, UNSELECTED};

/// Threshold used to re-binarize a blurred 0/255 mask.
pub const BLUR_MIDPOINT: f32 = 127.5;

/// A labelled connected component of selected pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub label: u32,
    pub area: u64,
}

/// Blur a mask with a Gaussian of the given sigma and re-binarize at the
/// midpoint. A sigma of zero returns the mask unchanged.
pub fn blur_rebinarize(mask: &Mask, sigma: f32) -> Mask {
    if sigma <= 0.0 {
        return mask.clone();
    }
    let (width, height) = mask.dimensions();
    let float: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([mask.as_image().get_pixel(x, y).0[0] as f32]));
    let blurred = gaussian_blur_f32(&float, sigma);
    Mask::from_fn(width, height, |x, y| {
        blurred.get_pixel(x, y).0[0] >= BLUR_MIDPOINT
    })
}

/// Select every unselected pixel that is not 4-connected to the border.
pub fn fill_holes(mask: &Mask) -> Mask {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 {
        return mask.clone();
    }
    let labels = connected_components(mask.as_image(), Connectivity::Four, Luma([SELECTED]));

    let mut outside: HashSet<u32> = HashSet::new();
    for x in 0..width {
        outside.insert(labels.get_pixel(x, 0).0[0]);
        outside.insert(labels.get_pixel(x, height - 1).0[0]);
    }
    for y in 0..height {
        outside.insert(labels.get_pixel(0, y).0[0]);
        outside.insert(labels.get_pixel(width - 1, y).0[0]);
    }

    Mask::from_fn(width, height, |x, y| {
        let label = labels.get_pixel(x, y).0[0];
        label == 0 || !outside.contains(&label)
    })
}

/// Label 8-connected components of selected pixels.
///
/// Returns the label image (0 = unselected) and one [`Component`] per label,
/// ordered by label.
pub fn label_components(mask: &Mask) -> (ImageBuffer<Luma<u32>, Vec<u32>>, Vec<Component>) {
    let labels = connected_components(mask.as_image(), Connectivity::Eight, Luma([UNSELECTED]));
    let mut areas: Vec<u64> = Vec::new();
    for p in labels.pixels() {
        let label = p.0[0] as usize;
        if label == 0 {
            continue;
        }
        if areas.len() < label {
            areas.resize(label, 0);
        }
        areas[label - 1] += 1;
    }
    let components = areas
        .into_iter()
        .enumerate()
        .map(|(i, area)| Component {
            label: i as u32 + 1,
            area,
        })
        .collect();
    (labels, components)
}

/// The connected set of pixels sharing the seed's class.
///
/// Selected seeds grow 8-connected, unselected seeds 4-connected, so a
/// foreground blob and the background around it never leak into each other
/// through diagonal gaps.
pub fn connected_class(mask: &Mask, seed_x: u32, seed_y: u32) -> Mask {
    let (width, height) = mask.dimensions();
    let seed_selected = mask.get(seed_x, seed_y);
    let (connectivity, background) = if seed_selected {
        (Connectivity::Eight, Luma([UNSELECTED]))
    } else {
        (Connectivity::Four, Luma([SELECTED]))
    };
    let labels = connected_components(mask.as_image(), connectivity, background);
    let seed_label = labels.get_pixel(seed_x, seed_y).0[0];
    Mask::from_fn(width, height, |x, y| labels.get_pixel(x, y).0[0] == seed_label)
}
