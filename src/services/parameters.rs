//! Parameters record (`parameters.yaml`) written once per run.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::BatchError;
use crate::models::AppConfig;

/// Effective settings of a run, so every results table can be reproduced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameters {
    pub tool_version: String,
    pub started_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subset: Option<String>,
    pub config: AppConfig,
}

impl RunParameters {
    pub fn new(config: &AppConfig, started_at: DateTime<Local>, subset: Option<&str>) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            subset: subset.map(str::to_string),
            config: config.clone(),
        }
    }

    pub fn write(&self, path: &Path) -> Result<(), BatchError> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;
        tracing::info!(path = %path.display(), "Wrote run parameters");
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self, BatchError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}
