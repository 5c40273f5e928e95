//! Input discovery and decoding.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use psr_core::{ImageId, ScaleInfo, SourceImage};
use tiff::decoder::Decoder as TiffDecoder;
use tiff::decoder::ifd::Value;
use tiff::tags::Tag;

use crate::error::BatchError;
use crate::models::AppConfig;

/// Sorted list of files in `dir` the config accepts.
pub fn list_images(dir: &Path, config: &AppConfig) -> Result<Vec<PathBuf>, BatchError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && config.accepts(&path) {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(BatchError::NoImages {
            dir: dir.to_path_buf(),
            extensions: config.input.extensions.clone(),
        });
    }
    Ok(files)
}

/// Identifier for an image file (its stem).
pub fn image_id(path: &Path) -> ImageId {
    ImageId::new(
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    )
}

/// Decode `path` to RGB and resolve its calibration.
///
/// Calibration comes from the file itself when present (see [`read_scale`]),
/// else from `fallback`, else the image is uncalibrated.
pub fn load_source(path: &Path, fallback: Option<&ScaleInfo>) -> Result<SourceImage, BatchError> {
    let rgb = image::open(path)
        .map_err(|source| BatchError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgb8();

    let scale = read_scale(path)
        .or_else(|| fallback.cloned())
        .unwrap_or_default();
    tracing::debug!(
        path = %path.display(),
        width = rgb.width(),
        height = rgb.height(),
        pixel_width = scale.pixel_width,
        unit = %scale.unit,
        "Loaded image"
    );
    Ok(SourceImage::new(image_id(path), rgb, scale))
}

fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| wanted.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Calibration embedded in `path`, by format.
pub fn read_scale(path: &Path) -> Option<ScaleInfo> {
    if has_extension(path, &["png"]) {
        read_png_scale(path)
    } else if has_extension(path, &["tif", "tiff"]) {
        read_tiff_scale(path)
    } else {
        None
    }
}

/// Calibration stored in a PNG `pHYs` chunk with metre units.
pub fn read_png_scale(path: &Path) -> Option<ScaleInfo> {
    if !has_extension(path, &["png"]) {
        return None;
    }
    let file = File::open(path).ok()?;
    let reader = png::Decoder::new(BufReader::new(file)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => ScaleInfo::from_pixels_per_metre(dims.xppu, dims.yppu),
        png::Unit::Unspecified => None,
    }
}

/// Calibration from the TIFF `XResolution`/`YResolution` tags.
///
/// Inch and centimetre resolutions become microns. Without a resolution
/// unit, a `unit=` line in the ImageJ `ImageDescription` names the unit the
/// resolution is expressed per.
pub fn read_tiff_scale(path: &Path) -> Option<ScaleInfo> {
    let file = File::open(path).ok()?;
    let mut decoder = TiffDecoder::new(BufReader::new(file)).ok()?;
    let x = rational(decoder.find_tag(Tag::XResolution).ok()??)?;
    let y = rational(decoder.find_tag(Tag::YResolution).ok()??)?;

    // 2 (inch) is the TIFF default
    let unit = decoder
        .find_tag_unsigned::<u16>(Tag::ResolutionUnit)
        .ok()
        .flatten()
        .unwrap_or(2);
    match unit {
        2 => Some(ScaleInfo::new(25_400.0 / x, 25_400.0 / y, "micron")),
        3 => Some(ScaleInfo::new(10_000.0 / x, 10_000.0 / y, "micron")),
        _ => {
            let description = match decoder.find_tag(Tag::ImageDescription).ok()?? {
                Value::Ascii(text) => text,
                _ => return None,
            };
            let unit = imagej_unit(&description)?;
            Some(ScaleInfo::new(1.0 / x, 1.0 / y, unit))
        }
    }
}

/// Positive resolution from a TIFF rational.
fn rational(value: Value) -> Option<f64> {
    let (n, d) = match value {
        Value::Rational(n, d) => (f64::from(n), f64::from(d)),
        Value::SRational(n, d) => (f64::from(n), f64::from(d)),
        _ => return None,
    };
    let resolution = n / d;
    (resolution.is_finite() && resolution > 0.0).then_some(resolution)
}

fn imagej_unit(description: &str) -> Option<String> {
    let unit = description
        .lines()
        .find_map(|line| line.trim().strip_prefix("unit="))?
        .trim();
    match unit {
        "" | "pixel" => None,
        "\\u00B5m" | "um" | "µm" => Some("micron".to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_image_id_is_file_stem() {
        assert_eq!(image_id(Path::new("/data/kidney-04.tif")).as_str(), "kidney-04");
    }

    #[test]
    fn test_list_images_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.PNG", "notes.txt", "c.tif"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.png")).unwrap();

        let files = list_images(dir.path(), &AppConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png", "c.tif"]);
    }

    #[test]
    fn test_list_images_empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            list_images(dir.path(), &AppConfig::default()),
            Err(BatchError::NoImages { .. })
        ));
    }

    #[test]
    fn test_list_images_unreadable_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("slide.png");
        fs::write(&file, b"").unwrap();

        for path in [dir.path().join("missing"), file] {
            assert!(
                matches!(list_images(&path, &AppConfig::default()), Err(BatchError::Io(_))),
                "{}",
                path.display()
            );
        }
    }

    #[test]
    fn test_uncalibrated_png_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])).save(&path).unwrap();

        let fallback = ScaleInfo::new(0.25, 0.25, "micron");
        let source = load_source(&path, Some(&fallback)).unwrap();
        assert_eq!(source.scale, fallback);
        assert_eq!(source.id.as_str(), "plain");

        let source = load_source(&path, None).unwrap();
        assert_eq!(source.scale, ScaleInfo::uncalibrated());
    }

    #[test]
    fn test_imagej_unit_line() {
        assert_eq!(
            imagej_unit("ImageJ=1.54f\nunit=micron\nspacing=1\n").as_deref(),
            Some("micron")
        );
        assert_eq!(imagej_unit("ImageJ=1.54f\nunit=\\u00B5m\n").as_deref(), Some("micron"));
        assert_eq!(imagej_unit("ImageJ=1.54f\nunit=pixel\n"), None);
        assert_eq!(imagej_unit("ImageJ=1.54f\n"), None);
    }

    #[test]
    fn test_undecodable_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"not a png").unwrap();
        match load_source(&path, None) {
            Err(BatchError::Decode { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected decode error, got {other:?}"),
        }
    }
}
