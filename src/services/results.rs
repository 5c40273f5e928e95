//! Results table (`results.csv`).
//!
//! The table is rewritten after every image by writing a temporary sibling
//! and renaming it into place, so an interrupted batch always leaves a
//! complete file behind. A results file left by an earlier run is renamed
//! aside with a timestamp instead of being overwritten.

use std::fs;
use std::path::{Path, PathBuf};

use psr_core::PipelineOutput;
use serde::Serialize;

use crate::error::BatchError;

/// One row per image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub image: String,
    pub psr_raw_int_den: u64,
    pub psr_int_den: f64,
    pub tissue_raw_int_den: u64,
    pub tissue_int_den: f64,
    pub roi_area_px: u64,
    /// Tissue pixels after artifact removal (tissue raw density / 255).
    pub tissue_px: f64,
    /// `psr_raw_int_den / tissue_raw_int_den`, empty without tissue.
    pub psr_fraction: Option<f64>,
    pub pixel_width: f64,
    pub pixel_height: f64,
    pub unit: String,
}

impl ResultRow {
    pub fn from_output(output: &PipelineOutput) -> Self {
        let scale = output.psr.scale();
        Self {
            image: output.id.to_string(),
            psr_raw_int_den: output.psr_measurement.raw_integrated_density,
            psr_int_den: output.psr_measurement.integrated_density,
            tissue_raw_int_den: output.tissue_measurement.raw_integrated_density,
            tissue_int_den: output.tissue_measurement.integrated_density,
            roi_area_px: output.tissue_measurement.area_px,
            tissue_px: output.tissue_measurement.selected_pixels(),
            psr_fraction: output.psr_fraction(),
            pixel_width: scale.pixel_width,
            pixel_height: scale.pixel_height,
            unit: scale.unit.clone(),
        }
    }
}

/// Accumulated rows of a run and the file they persist to.
#[derive(Debug)]
pub struct ResultsTable {
    path: PathBuf,
    rows: Vec<ResultRow>,
}

impl ResultsTable {
    /// Start a table at `path`, moving any existing file out of the way.
    ///
    /// Returns the table and the path the previous file was moved to.
    pub fn create(path: impl Into<PathBuf>) -> Result<(Self, Option<PathBuf>), BatchError> {
        let path = path.into();
        let protected = if path.exists() {
            let aside = protected_path(&path);
            fs::rename(&path, &aside)?;
            tracing::warn!(
                from = %path.display(),
                to = %aside.display(),
                "Existing results file renamed"
            );
            Some(aside)
        } else {
            None
        };
        Ok((
            Self {
                path,
                rows: Vec::new(),
            },
            protected,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Append a row and persist the whole table.
    pub fn push(&mut self, row: ResultRow) -> Result<(), BatchError> {
        self.rows.push(row);
        self.persist()
    }

    /// Write to a temporary sibling, then rename over the table.
    pub fn persist(&self) -> Result<(), BatchError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)?;
            for row in &self.rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), rows = self.rows.len(), "Results persisted");
        Ok(())
    }
}

/// `results_<timestamp>.csv` next to `path`, never an existing file.
fn protected_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let mut candidate = path.with_file_name(format!("{stem}_{stamp}.csv"));
    let mut n = 1;
    while candidate.exists() {
        candidate = path.with_file_name(format!("{stem}_{stamp}_{n}.csv"));
        n += 1;
    }
    candidate
}
