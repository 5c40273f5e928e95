//! Output rasters and the directory layout they go to.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use psr_core::{ImageId, ScaledRaster};

use crate::error::BatchError;

/// Destination directories of one run.
///
/// ```text
/// OUT/psr/<id>_psr.png
/// OUT/tissue/<id>_tissue.png
/// OUT/data/results.csv
/// OUT/data/parameters.yaml
/// ```
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn psr_dir(&self) -> PathBuf {
        self.root.join("psr")
    }

    pub fn tissue_dir(&self) -> PathBuf {
        self.root.join("tissue")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn psr_path(&self, id: &ImageId) -> PathBuf {
        self.psr_dir().join(format!("{id}_psr.png"))
    }

    pub fn tissue_path(&self, id: &ImageId) -> PathBuf {
        self.tissue_dir().join(format!("{id}_tissue.png"))
    }

    pub fn results_path(&self) -> PathBuf {
        self.data_dir().join("results.csv")
    }

    pub fn parameters_path(&self) -> PathBuf {
        self.data_dir().join("parameters.yaml")
    }

    pub fn create_dirs(&self) -> Result<(), BatchError> {
        for dir in [self.psr_dir(), self.tissue_dir(), self.data_dir()] {
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// Encode a grayscale raster as an 8-bit PNG, with `pHYs` when the scale
/// converts to metres.
pub fn encode_png(raster: &ScaledRaster) -> Result<Vec<u8>, BatchError> {
    let (width, height) = raster.dimensions();
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);
        if let Some((xppu, yppu)) = raster.scale().pixels_per_metre() {
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu,
                yppu,
                unit: png::Unit::Meter,
            }));
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| BatchError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(raster.image().as_raw())
            .map_err(|e| BatchError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Re-compress with oxipng, keeping every ancillary chunk.
///
/// Falls back to the input when oxipng fails.
pub fn optimize_png(png_bytes: Vec<u8>) -> Vec<u8> {
    oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::None,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes)
}

/// Encode and write `raster` to `path`.
pub fn write_raster(raster: &ScaledRaster, path: &Path, optimize: bool) -> Result<(), BatchError> {
    let mut bytes = encode_png(raster)?;
    if optimize {
        bytes = optimize_png(bytes);
    }
    fs::write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote raster");
    Ok(())
}
