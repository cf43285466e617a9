// file: src/config/configuration.rs
// description: configuration manager backed by yaml files with environment overrides
// reference: https://docs.rs/config

use crate::config::entity::{AppConfig, DataIngestionConfig, Params};
use crate::constants::{CONFIG_FILE_PATH, ENV_PREFIX, PARAMS_FILE_PATH};
use crate::error::{PipelineError, Result};
use crate::utils::{create_directories, read_yaml};
use dotenvy::dotenv;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Loads `config.yaml` and `params.yaml` once and hands out per-stage configs.
#[derive(Debug, Clone)]
pub struct ConfigurationManager {
    config: AppConfig,
    params: Params,
}

impl ConfigurationManager {
    pub fn new(config_path: &Path, params_path: &Path) -> Result<Self> {
        dotenv().ok();

        let config = load_app_config(config_path)?;
        let params: Params = read_yaml(params_path)?;
        params.validate()?;

        create_directories(&[&config.artifacts_root], true)?;

        Ok(Self { config, params })
    }

    pub fn from_default_paths() -> Result<Self> {
        Self::new(Path::new(CONFIG_FILE_PATH), Path::new(PARAMS_FILE_PATH))
    }

    pub fn get_data_ingestion_config(&self) -> Result<DataIngestionConfig> {
        let config = &self.config.data_ingestion;
        create_directories(&[&config.root_dir], true)?;
        Ok(config.clone())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn params(&self) -> &Params {
        &self.params
    }
}

fn load_app_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        PipelineError::Config(format!("Cannot read config file {}: {}", path.display(), e))
    })?;

    if content.trim().is_empty() {
        return Err(PipelineError::EmptyYaml(path.to_path_buf()));
    }

    // Environment keys arrive lowercased, so file keys are lowercased too
    // before both are merged.
    let document: Value =
        serde_yaml::from_str(&content).map_err(|source| PipelineError::YamlParse {
            path: path.to_path_buf(),
            source,
        })?;
    let normalized = serde_yaml::to_string(&lowercase_keys(document)).map_err(|source| {
        PipelineError::YamlParse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let settings = ::config::Config::builder()
        .add_source(::config::File::from_str(&normalized, ::config::FileFormat::Yaml))
        .add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;

    let config: AppConfig = settings
        .try_deserialize()
        .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;

    config.validate()?;
    debug!("Loaded configuration from {}: {:?}", path.display(), config);
    Ok(config)
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Mapping(mapping) => Value::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| {
                    let key = match key {
                        Value::String(s) => Value::String(s.to_lowercase()),
                        other => other,
                    };
                    (key, lowercase_keys(value))
                })
                .collect(),
        ),
        Value::Sequence(items) => Value::Sequence(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}
