// file: src/pipeline/stage_01_data_ingestion.rs
// description: data ingestion stage: download the dataset archive, then unzip it

use crate::components::{DataIngestion, DownloadOutcome, ExtractionSummary};
use crate::config::ConfigurationManager;
use crate::error::Result;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub const STAGE_NAME: &str = "Data Ingestion stage";

#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub download: DownloadOutcome,
    pub extraction: ExtractionSummary,
    pub manifest_path: PathBuf,
}

pub struct DataIngestionTrainingPipeline {
    manager: ConfigurationManager,
    show_progress: bool,
}

impl DataIngestionTrainingPipeline {
    pub fn new(manager: ConfigurationManager) -> Self {
        Self {
            manager,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn main(&self) -> Result<IngestionReport> {
        let ingestion = self.component()?;

        let download = ingestion.download_file().await?;
        let extraction = ingestion.extract_zip_file().await?;
        let manifest_path = ingestion.write_manifest(&download, &extraction)?;

        Ok(IngestionReport {
            download,
            extraction,
            manifest_path,
        })
    }

    /// Re-extracts the archive already on disk.
    pub async fn run_extract_only(&self) -> Result<IngestionReport> {
        let ingestion = self.component()?;
        info!(
            "Reusing archive at {}",
            ingestion.config().local_data_file.display()
        );

        let download = ingestion.existing_archive().await?;
        let extraction = ingestion.extract_zip_file().await?;
        let manifest_path = ingestion.write_manifest(&download, &extraction)?;

        Ok(IngestionReport {
            download,
            extraction,
            manifest_path,
        })
    }

    fn component(&self) -> Result<DataIngestion> {
        let config = self.manager.get_data_ingestion_config()?;
        Ok(DataIngestion::new(config)?.with_progress(self.show_progress))
    }
}
