//! Color-space conversions.
//!
//! The pipeline classifies stain in HSB space; [`HsbImage`] holds the three
//! 8-bit planes derived from an RGB micrograph.

mod hsb;

pub use hsb::{Hsb, HsbImage};
