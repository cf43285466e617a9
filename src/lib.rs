// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod components;
pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod utils;

pub use components::{
    DataIngestion, DownloadOutcome, DownloadSource, ExtractionSummary, IngestionManifest,
    read_manifest, resolve_download_url,
};
pub use config::{AppConfig, ConfigurationManager, DataIngestionConfig, Params};
pub use error::{PipelineError, Result};
pub use pipeline::{DataIngestionTrainingPipeline, IngestionReport, TransferProgress, run_stage};
pub use utils::{StageTimer, Validator};
