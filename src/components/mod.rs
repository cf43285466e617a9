// file: src/components/mod.rs
// description: pipeline stage components
// reference: internal module structure

pub mod data_ingestion;
pub mod source;

pub use data_ingestion::{
    DataIngestion, DownloadOutcome, ExtractionSummary, IngestionManifest, read_manifest,
};
pub use source::{DownloadSource, resolve_download_url};
