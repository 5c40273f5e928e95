//! Batch driver: input directory in, rasters and results table out.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Local;
use psr_core::{ManualInput, PsrPipeline, ReferencePoint, StageSummary, TraceMode};
use serde::Serialize;

use crate::error::{BatchError, ConfigError};
use crate::models::{AppConfig, ImageSubset};
use crate::services::export::{write_raster, OutputLayout};
use crate::services::image_loader::{image_id, list_images, load_source};
use crate::services::manual_input::SidecarInput;
use crate::services::parameters::RunParameters;
use crate::services::results::{ResultRow, ResultsTable};

/// Outcome of a single image.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedImage {
    #[serde(flatten)]
    pub row: ResultRow,
    pub summary: StageSummary,
    pub psr_path: PathBuf,
    pub tissue_path: PathBuf,
}

/// Summary of a batch run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub images: usize,
    pub elapsed: Duration,
    pub results_path: PathBuf,
    /// Where an earlier results file was moved, if there was one.
    pub protected_results: Option<PathBuf>,
}

impl RunReport {
    pub fn mean_per_image(&self) -> Option<Duration> {
        u32::try_from(self.images)
            .ok()
            .filter(|&n| n > 0)
            .map(|n| self.elapsed / n)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} image(s) in {:.2}s",
            self.images,
            self.elapsed.as_secs_f64()
        )?;
        if let Some(mean) = self.mean_per_image() {
            write!(f, " ({:.2}s per image)", mean.as_secs_f64())?;
        }
        write!(f, "\nResults: {}", self.results_path.display())?;
        if let Some(ref aside) = self.protected_results {
            write!(f, "\nPrevious results kept as {}", aside.display())?;
        }
        Ok(())
    }
}

/// Runs the pipeline over files and writes everything a run produces.
pub struct BatchRunner {
    config: AppConfig,
    pipeline: PsrPipeline,
    layout: OutputLayout,
}

impl BatchRunner {
    /// Validates `config` up front; nothing is written here.
    pub fn new(config: AppConfig, output_dir: impl Into<PathBuf>) -> Result<Self, BatchError> {
        config.validate()?;
        let pipeline =
            PsrPipeline::new(config.pipeline_options()).map_err(ConfigError::Pipeline)?;
        Ok(Self {
            config,
            pipeline,
            layout: OutputLayout::new(output_dir),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Files of `input_dir` this run would process, in order.
    ///
    /// `subset` overrides the configured subset.
    pub fn select_images(
        &self,
        input_dir: &Path,
        subset: Option<&str>,
    ) -> Result<Vec<PathBuf>, BatchError> {
        let files = list_images(input_dir, &self.config)?;
        match subset.or(self.config.input.subset.as_deref()) {
            Some(spec) => Ok(ImageSubset::parse(spec)?.select(files)?),
            None => Ok(files),
        }
    }

    /// Process every selected image of `input_dir` in sorted order.
    ///
    /// The first failing image aborts the run; rows persisted before it stay.
    pub fn run(&self, input_dir: &Path, subset: Option<&str>) -> Result<RunReport, BatchError> {
        let files = self.select_images(input_dir, subset)?;
        let total = files.len();
        self.check_reference(&files)?;

        self.layout.create_dirs()?;
        let started_at = Local::now();
        RunParameters::new(
            &self.config,
            started_at,
            subset.or(self.config.input.subset.as_deref()),
        )
        .write(&self.layout.parameters_path())?;
        let (mut table, protected_results) = ResultsTable::create(self.layout.results_path())?;

        tracing::info!(
            input = %input_dir.display(),
            output = %self.layout.root().display(),
            total,
            "Starting batch"
        );

        let start = Instant::now();
        let mut input = SidecarInput::new(input_dir).wait(self.config.manual.wait());
        for (n, path) in files.iter().enumerate() {
            tracing::info!(n = n + 1, total, image = %path.display(), "Processing image");
            let processed = self.process_file(path, &mut input)?;
            table.push(processed.row)?;
        }

        let report = RunReport {
            images: total,
            elapsed: start.elapsed(),
            results_path: table.path().to_path_buf(),
            protected_results,
        };
        tracing::info!(
            images = report.images,
            elapsed_ms = report.elapsed.as_millis() as u64,
            mean_ms = report.mean_per_image().map(|d| d.as_millis() as u64),
            "Batch finished"
        );
        Ok(report)
    }

    /// Reject an explicit reference point outside any selected image.
    ///
    /// Only image headers are read, so this runs before anything is written.
    fn check_reference(&self, files: &[PathBuf]) -> Result<(), BatchError> {
        let options = self.pipeline.options();
        if options.trace != TraceMode::Auto || options.reference == ReferencePoint::Centroid {
            return Ok(());
        }
        for path in files {
            let (width, height) =
                image::image_dimensions(path).map_err(|source| BatchError::Decode {
                    path: path.to_path_buf(),
                    source,
                })?;
            options
                .reference
                .resolve(width, height)
                .map_err(|source| ConfigError::Reference {
                    image: image_id(path).to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Process one file and write its two rasters.
    pub fn process_file(
        &self,
        path: &Path,
        input: &mut dyn ManualInput,
    ) -> Result<ProcessedImage, BatchError> {
        let source = load_source(path, self.config.scale.as_ref())?;
        let output = self
            .pipeline
            .process(source, input)
            .map_err(|source| BatchError::Pipeline {
                image: image_id(path).to_string(),
                source,
            })?;

        self.layout.create_dirs()?;
        let psr_path = self.layout.psr_path(&output.id);
        let tissue_path = self.layout.tissue_path(&output.id);
        let optimize = self.config.output.optimize_png;
        write_raster(&output.psr, &psr_path, optimize)?;
        write_raster(&output.tissue, &tissue_path, optimize)?;

        let row = ResultRow::from_output(&output);
        tracing::info!(
            image = %output.id,
            psr_px = output.summary.psr_px,
            tissue_px = output.summary.tissue_px,
            psr_fraction = ?row.psr_fraction,
            "Image quantified"
        );
        Ok(ProcessedImage {
            row,
            summary: output.summary,
            psr_path,
            tissue_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_per_image() {
        let report = RunReport {
            images: 4,
            elapsed: Duration::from_secs(2),
            results_path: PathBuf::from("results.csv"),
            protected_results: None,
        };
        assert_eq!(report.mean_per_image(), Some(Duration::from_millis(500)));
        assert!(report.to_string().starts_with("Processed 4 image(s) in 2.00s (0.50s per image)"));
    }

    #[test]
    fn test_empty_report_has_no_mean() {
        let report = RunReport {
            images: 0,
            elapsed: Duration::from_secs(1),
            results_path: PathBuf::from("results.csv"),
            protected_results: None,
        };
        assert_eq!(report.mean_per_image(), None);
    }

    #[test]
    fn test_invalid_config_rejected_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.tissue.sigma = -1.0;
        let out = dir.path().join("out");
        assert!(matches!(
            BatchRunner::new(config, &out),
            Err(BatchError::Config(ConfigError::Pipeline(_)))
        ));
        assert!(!out.exists());
    }
}
