pub mod config;
pub mod subset;

pub use config::{
    AppConfig, InputConfig, ManualConfig, OutputConfig, ReferenceConfig, TissueConfig,
};
pub use subset::ImageSubset;
