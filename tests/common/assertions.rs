//! Assertion helpers for tests.

use std::path::Path;

use image::GrayImage;

/// Parsed `results.csv`: header plus rows keyed by column name.
pub struct ResultsCsv {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultsCsv {
    pub fn parse(text: &str) -> Self {
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let header = reader
            .headers()
            .unwrap()
            .iter()
            .map(str::to_string)
            .collect();
        let rows = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        Self { header, rows }
    }

    pub fn column(&self, name: &str) -> Vec<&str> {
        let index = self
            .header
            .iter()
            .position(|h| h == name)
            .unwrap_or_else(|| panic!("no column {name} in {:?}", self.header));
        self.rows.iter().map(|row| row[index].as_str()).collect()
    }
}

/// Assert `path` decodes to an 8-bit grayscale raster of the given size.
pub fn assert_gray_png(path: &Path, width: u32, height: u32) -> GrayImage {
    assert!(path.exists(), "missing {}", path.display());
    let image = image::open(path).unwrap();
    assert_eq!(image.color(), image::ColorType::L8, "{}", path.display());
    let gray = image.to_luma8();
    assert_eq!(gray.dimensions(), (width, height));
    gray
}

/// Sum of all pixel values.
pub fn pixel_sum(image: &GrayImage) -> u64 {
    image.as_raw().iter().map(|&v| u64::from(v)).sum()
}
