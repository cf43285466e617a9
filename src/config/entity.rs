// file: src/config/entity.rs
// description: typed configuration objects handed to pipeline stages

use crate::constants::DEFAULT_DOWNLOAD_TIMEOUT_SECS;
use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top level of `config/config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    pub artifacts_root: PathBuf,
    pub data_ingestion: DataIngestionConfig,
}

/// Settings for the data ingestion stage.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DataIngestionConfig {
    pub root_dir: PathBuf,
    #[serde(rename = "source_URL", alias = "source_url")]
    pub source_url: String,
    pub local_data_file: PathBuf,
    pub unzip_dir: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Reuse an already downloaded, non-empty archive instead of fetching it again.
    #[serde(default)]
    pub skip_existing: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

/// Training hyper-parameters from `params.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Params {
    pub augmentation: bool,
    pub image_size: [u32; 3],
    pub batch_size: u32,
    pub include_top: bool,
    pub epochs: u32,
    pub classes: u32,
    pub weights: String,
    pub learning_rate: f64,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.data_ingestion.validate()
    }
}

impl DataIngestionConfig {
    pub fn validate(&self) -> Result<()> {
        Validator::validate_url(&self.source_url)
            .map_err(|e| PipelineError::Config(format!("data_ingestion.source_URL: {}", e)))?;

        Validator::validate_archive_extension(&self.local_data_file).map_err(|e| {
            PipelineError::Config(format!("data_ingestion.local_data_file: {}", e))
        })?;

        if self.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "data_ingestion.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Params {
    pub fn validate(&self) -> Result<()> {
        if self.image_size.contains(&0) {
            return Err(PipelineError::Config(format!(
                "IMAGE_SIZE dimensions must be non-zero, got {:?}",
                self.image_size
            )));
        }

        for (name, value) in [
            ("BATCH_SIZE", self.batch_size),
            ("EPOCHS", self.epochs),
            ("CLASSES", self.classes),
        ] {
            if value == 0 {
                return Err(PipelineError::Config(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        if !(self.learning_rate > 0.0) {
            return Err(PipelineError::Config(format!(
                "LEARNING_RATE must be positive, got {}",
                self.learning_rate
            )));
        }

        Ok(())
    }
}
