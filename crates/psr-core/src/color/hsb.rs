//! 8-bit HSB (hue, saturation, brightness) representation.
//!
//! Each channel is computed with the standard RGB→HSB formula into [0, 1)
//! and stored as `trunc(v * 255)`, which is the convention microscopy color
//! thresholders use. Hue 0 and hue 255 are both red.

use image::{GrayImage, Rgb, RgbImage};

use crate::error::PipelineError;

/// One pixel in 8-bit HSB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsb {
    pub hue: u8,
    pub saturation: u8,
    pub brightness: u8,
}

impl Hsb {
    pub fn new(hue: u8, saturation: u8, brightness: u8) -> Self {
        Self {
            hue,
            saturation,
            brightness,
        }
    }
}

impl From<Rgb<u8>> for Hsb {
    fn from(pixel: Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        let cmax = r.max(g).max(b) as f64;
        let cmin = r.min(g).min(b) as f64;
        let (r, g, b) = (r as f64, g as f64, b as f64);

        let brightness = cmax / 255.0;
        let saturation = if cmax != 0.0 {
            (cmax - cmin) / cmax
        } else {
            0.0
        };
        let hue = if saturation == 0.0 {
            0.0
        } else {
            let span = cmax - cmin;
            let redc = (cmax - r) / span;
            let greenc = (cmax - g) / span;
            let bluec = (cmax - b) / span;
            let sector = if r == cmax {
                bluec - greenc
            } else if g == cmax {
                2.0 + redc - bluec
            } else {
                4.0 + greenc - redc
            };
            let h = sector / 6.0;
            if h < 0.0 {
                h + 1.0
            } else {
                h
            }
        };

        Self {
            hue: to_byte(hue),
            saturation: to_byte(saturation),
            brightness: to_byte(brightness),
        }
    }
}

/// Truncate a unit value to 8 bits, absorbing representation error so that
/// `c / 255` maps back to exactly `c`.
#[inline]
fn to_byte(v: f64) -> u8 {
    (v * 255.0 + 1e-9).floor().clamp(0.0, 255.0) as u8
}

/// A three-plane HSB image.
#[derive(Debug, Clone, PartialEq)]
pub struct HsbImage {
    hue: GrayImage,
    saturation: GrayImage,
    brightness: GrayImage,
}

impl HsbImage {
    /// Convert an RGB raster.
    pub fn from_rgb(rgb: &RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let mut hue = GrayImage::new(width, height);
        let mut saturation = GrayImage::new(width, height);
        let mut brightness = GrayImage::new(width, height);
        for (x, y, pixel) in rgb.enumerate_pixels() {
            let hsb = Hsb::from(*pixel);
            hue.put_pixel(x, y, image::Luma([hsb.hue]));
            saturation.put_pixel(x, y, image::Luma([hsb.saturation]));
            brightness.put_pixel(x, y, image::Luma([hsb.brightness]));
        }
        Self {
            hue,
            saturation,
            brightness,
        }
    }

    /// Assemble from three equally sized channel planes.
    pub fn from_channels(
        hue: GrayImage,
        saturation: GrayImage,
        brightness: GrayImage,
    ) -> Result<Self, PipelineError> {
        for plane in [&saturation, &brightness] {
            if plane.dimensions() != hue.dimensions() {
                return Err(PipelineError::DimensionMismatch {
                    expected: hue.dimensions(),
                    actual: plane.dimensions(),
                });
            }
        }
        Ok(Self {
            hue,
            saturation,
            brightness,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.hue.dimensions()
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Hsb {
        Hsb::new(
            self.hue.get_pixel(x, y).0[0],
            self.saturation.get_pixel(x, y).0[0],
            self.brightness.get_pixel(x, y).0[0],
        )
    }

    pub fn hue(&self) -> &GrayImage {
        &self.hue
    }

    pub fn saturation(&self) -> &GrayImage {
        &self.saturation
    }

    pub fn brightness(&self) -> &GrayImage {
        &self.brightness
    }
}
