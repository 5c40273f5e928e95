use crate::assets::AssetLoader;
use crate::error::ConfigError;
use crate::models::ImageSubset;
use psr_core::{
    ArtifactOptions, CanvasPolicy, HsbThreshold, PipelineOptions, Point, ReferencePoint,
    ScaleInfo, ThresholdSet, TraceMode,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Application configuration loaded from config.yaml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub canvas: CanvasPolicy,
    pub trace: TraceMode,
    pub reference: ReferenceConfig,
    pub color: HsbThreshold,
    pub tissue: TissueConfig,
    pub artifact: ArtifactOptions,
    pub manual: ManualConfig,
    /// Calibration for images that carry none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleInfo>,
}

/// Which files of the input directory are processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub extensions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subset: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extensions: ["png", "tif", "tiff", "jpg", "jpeg"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            subset: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Re-compress exported PNGs with oxipng
    pub optimize_png: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TissueConfig {
    pub sigma: f32,
    /// Pixels with every channel at or above this count as glass
    pub background_min: u8,
}

impl Default for TissueConfig {
    fn default() -> Self {
        let defaults = ThresholdSet::default();
        Self {
            sigma: defaults.tissue_sigma,
            background_min: defaults.background_min,
        }
    }
}

/// How long a manual retry waits for the operator to edit the sidecar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualConfig {
    pub wait_secs: u64,
}

impl Default for ManualConfig {
    fn default() -> Self {
        Self { wait_secs: 120 }
    }
}

impl ManualConfig {
    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }
}

/// `centroid` or an explicit `{x, y}` pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReferenceConfig {
    Keyword(ReferenceKeyword),
    At(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKeyword {
    Centroid,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        ReferenceConfig::Keyword(ReferenceKeyword::Centroid)
    }
}

impl From<ReferenceConfig> for ReferencePoint {
    fn from(reference: ReferenceConfig) -> Self {
        match reference {
            ReferenceConfig::Keyword(ReferenceKeyword::Centroid) => ReferencePoint::Centroid,
            ReferenceConfig::At(point) => ReferencePoint::At(point),
        }
    }
}

impl AppConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from AssetLoader (embedded or external)
    ///
    /// Unlike a missing file, a malformed or invalid config is fatal.
    pub fn load_from_assets(loader: &AssetLoader) -> Result<Self, ConfigError> {
        let content = loader.read_config_string()?;
        let config = Self::from_yaml(&content)?;
        tracing::info!(
            source = %loader.config_source(),
            canvas = ?config.canvas,
            trace = ?config.trace,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Reject settings the pipeline would refuse, plus malformed subsets.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline_options().validate()?;
        if let Some(ref subset) = self.input.subset {
            ImageSubset::parse(subset)?;
        }
        Ok(())
    }

    pub fn thresholds(&self) -> ThresholdSet {
        ThresholdSet {
            color: self.color,
            tissue_sigma: self.tissue.sigma,
            background_min: self.tissue.background_min,
            artifact: self.artifact,
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions::new()
            .canvas(self.canvas)
            .trace(self.trace)
            .reference(self.reference.into())
            .thresholds(self.thresholds())
    }

    /// Whether `path` has one of the configured extensions.
    pub fn accepts(&self, path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.input
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use psr_core::{BandFilter, PipelineError};
    use std::path::Path;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.canvas, CanvasPolicy::CornerFill);
        assert_eq!(config.trace, TraceMode::Auto);
        assert_eq!(config.reference, ReferenceConfig::default());
        assert_eq!(config.scale, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_embedded_config_matches_defaults() {
        let loader = AssetLoader::new(None);
        let config = AppConfig::load_from_assets(&loader).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
canvas: global-recolor
trace: manual
reference: { x: 10, y: 20 }
color:
  hue: { lower: 240, upper: 10 }
  saturation: { lower: 50, upper: 255, pass: true }
  brightness: { lower: 0, upper: 250 }
tissue:
  sigma: 0
  background_min: 235
manual:
  wait_secs: 5
artifact:
  green: { lower: 200, upper: 255 }
  sigma: 4.5
  min_area: 1200
scale:
  pixel_width: 0.5
  pixel_height: 0.5
  unit: micron
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.canvas, CanvasPolicy::GlobalRecolor);
        assert_eq!(config.trace, TraceMode::Manual);
        assert_eq!(config.reference, ReferenceConfig::At(Point::new(10, 20)));
        assert_eq!(config.color.hue, BandFilter::pass(240, 10));
        assert_eq!(config.artifact.min_area, 1200);
        assert!(!config.artifact.auto_baseline);
        assert_eq!(config.scale, Some(ScaleInfo::new(0.5, 0.5, "micron")));

        let options = config.pipeline_options();
        assert_eq!(options.reference, ReferencePoint::At(Point::new(10, 20)));
        assert_eq!(options.thresholds.tissue_sigma, 0.0);
        assert_eq!(options.thresholds.background_min, 235);
        assert_eq!(config.manual.wait(), Duration::from_secs(5));
    }

    #[test]
    fn test_reference_keyword() {
        let config = AppConfig::from_yaml("reference: centroid").unwrap();
        assert_eq!(ReferencePoint::from(config.reference), ReferencePoint::Centroid);
    }

    #[test]
    fn test_invalid_range_is_fatal() {
        let yaml = "color:\n  hue: { lower: 0, upper: 255 }\n  saturation: { lower: 200, upper: 10 }\n  brightness: { lower: 0, upper: 255 }\n";
        let error = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(
            error,
            ConfigError::Pipeline(PipelineError::InvalidRange {
                channel: "saturation",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_yaml_is_fatal() {
        let error = AppConfig::from_yaml("canvas: [not, a, policy]").unwrap_err();
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_subset_is_fatal() {
        let error = AppConfig::from_yaml("input:\n  subset: \"4-2\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::InvalidSubset { .. }));
    }

    #[test]
    fn test_accepts_extensions_case_insensitively() {
        let config = AppConfig::default();
        assert!(config.accepts(Path::new("slide.TIF")));
        assert!(config.accepts(Path::new("dir/slide.png")));
        assert!(!config.accepts(Path::new("notes.txt")));
        assert!(!config.accepts(Path::new("README")));
    }
}
