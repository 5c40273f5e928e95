//! Synthetic slides written into temporary directories.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use psrquant::models::AppConfig;
use tempfile::TempDir;
use tiff::encoder::{colortype, Rational, TiffEncoder};
use tiff::tags::{ResolutionUnit, Tag};

/// Stain colour: hue 241, saturation 204 in 8-bit HSB.
pub const STAIN: Rgb<u8> = Rgb([200, 40, 90]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Side of every synthetic slide.
pub const SIZE: u32 = 64;
/// Stained square occupying `16..48` in both directions.
pub const SQUARE: u32 = 32;

/// Default config with the tissue blur disabled so areas are exact.
pub fn exact_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.tissue.sigma = 0.0;
    config
}

/// A stained square centred on a white slide.
pub fn stained_square() -> RgbImage {
    RgbImage::from_fn(SIZE, SIZE, |x, y| {
        if (16..48).contains(&x) && (16..48).contains(&y) {
            STAIN
        } else {
            WHITE
        }
    })
}

/// Input and output directories of one test run.
pub struct Workspace {
    _dir: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(&input).unwrap();
        Self {
            _dir: dir,
            input,
            output,
        }
    }

    /// Save `image` as `<name>.png` in the input directory.
    pub fn add_png(&self, name: &str, image: &RgbImage) -> PathBuf {
        let path = self.input.join(format!("{name}.png"));
        image.save(&path).unwrap();
        path
    }

    /// Save `image` with a `pHYs` chunk in pixels per metre.
    pub fn add_calibrated_png(&self, name: &str, image: &RgbImage, ppm: u32) -> PathBuf {
        let path = self.input.join(format!("{name}.png"));
        write_png_with_phys(&path, image, ppm);
        path
    }

    /// Save `image` as a TIFF with a resolution in pixels per centimetre.
    pub fn add_calibrated_tiff(&self, name: &str, image: &RgbImage, ppcm: u32) -> PathBuf {
        let path = self.input.join(format!("{name}.tif"));
        let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
        let mut tiff = encoder
            .new_image::<colortype::RGB8>(image.width(), image.height())
            .unwrap();
        tiff.resolution(ResolutionUnit::Centimeter, Rational { n: ppcm, d: 1 });
        tiff.write_data(image.as_raw()).unwrap();
        path
    }

    /// Save `image` as an ImageJ-style TIFF: no resolution unit, the unit
    /// named in the description, resolution in pixels per micron.
    pub fn add_imagej_tiff(&self, name: &str, image: &RgbImage, per_micron: Rational) -> PathBuf {
        let path = self.input.join(format!("{name}.tif"));
        let mut encoder = TiffEncoder::new(File::create(&path).unwrap()).unwrap();
        let mut tiff = encoder
            .new_image::<colortype::RGB8>(image.width(), image.height())
            .unwrap();
        tiff.encoder()
            .write_tag(Tag::ImageDescription, "ImageJ=1.54f\nunit=micron\n")
            .unwrap();
        tiff.resolution(ResolutionUnit::None, per_micron);
        tiff.write_data(image.as_raw()).unwrap();
        path
    }

    pub fn add_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.input.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn results_csv(&self) -> String {
        fs::read_to_string(self.output.join("data").join("results.csv")).unwrap()
    }
}

fn write_png_with_phys(path: &Path, image: &RgbImage, ppm: u32) {
    let file = BufWriter::new(File::create(path).unwrap());
    let mut encoder = png::Encoder::new(file, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(image.as_raw()).unwrap();
}
