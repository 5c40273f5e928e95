use std::path::PathBuf;

use psr_core::PipelineError;
use thiserror::Error;

/// Problems found before any image is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid image subset '{spec}': {reason}")]
    InvalidSubset { spec: String, reason: String },

    #[error("Image subset index {index} out of range ({count} images found)")]
    SubsetOutOfRange { index: usize, count: usize },

    #[error("Invalid pipeline settings: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Reference point invalid for {image}: {source}")]
    Reference {
        image: String,
        source: PipelineError,
    },
}

/// Fatal errors of a batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("No images with extensions {extensions:?} in {dir}")]
    NoImages { dir: PathBuf, extensions: Vec<String> },

    #[error("Processing {image} failed: {source}")]
    Pipeline {
        image: String,
        source: PipelineError,
    },
}
