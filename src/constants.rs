// file: src/constants.rs
// description: default file locations and names shared across stages

pub const CONFIG_FILE_PATH: &str = "config/config.yaml";
pub const PARAMS_FILE_PATH: &str = "params.yaml";

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE_NAME: &str = "running_logs.log";

/// Prefix for environment overrides, e.g. `CNN_CLASSIFIER__DATA_INGESTION__SOURCE_URL`.
pub const ENV_PREFIX: &str = "CNN_CLASSIFIER";

pub const MANIFEST_FILE_NAME: &str = "ingestion_manifest.json";

pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
