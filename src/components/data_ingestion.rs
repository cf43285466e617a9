// file: src/components/data_ingestion.rs
// description: downloads the dataset archive and extracts it into the unzip directory
// reference: https://docs.rs/reqwest, https://docs.rs/zip

use crate::components::source::{DownloadSource, confirm_url_from_html, resolve_download_url};
use crate::config::DataIngestionConfig;
use crate::constants::MANIFEST_FILE_NAME;
use crate::error::{PipelineError, Result};
use crate::pipeline::progress::TransferProgress;
use crate::utils::{StageTimer, Validator, create_directories, load_json, save_json};
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use zip::ZipArchive;

const CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadOutcome {
    pub source: DownloadSource,
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
    /// True when an existing archive was reused instead of fetched.
    pub skipped: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub unzip_dir: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
    pub skipped_entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionManifest {
    pub source_url: String,
    pub resolved_url: String,
    pub local_data_file: PathBuf,
    pub sha256: String,
    pub download_bytes: u64,
    pub download_skipped: bool,
    pub extraction: ExtractionSummary,
    pub ingested_at: String,
}

pub struct DataIngestion {
    config: DataIngestionConfig,
    client: Client,
    show_progress: bool,
}

impl DataIngestion {
    pub fn new(config: DataIngestionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(concat!("cnn_classifier/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            client,
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    pub async fn download_file(&self) -> Result<DownloadOutcome> {
        let source = resolve_download_url(&self.config.source_url)?;
        let dest = self.config.local_data_file.clone();

        if self.config.skip_existing && is_non_empty_file(&dest) {
            info!(
                "File already exists at {}, skipping download",
                dest.display()
            );
            return self.existing_archive().await;
        }

        if let Some(parent) = dest.parent()
            && !parent.as_os_str().is_empty()
        {
            create_directories(&[parent], false)?;
        }

        info!(
            "Downloading data from {} into file {}",
            source.original,
            dest.display()
        );
        if source.is_drive() {
            debug!("Resolved Google Drive link to {}", source.resolved);
        }

        let response = self.fetch(&source).await?;
        let part = part_path(&dest);

        let (bytes, sha256) = match self.write_body(response, &source.resolved, &part).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&part).await
                    && remove_err.kind() != io::ErrorKind::NotFound
                {
                    warn!(
                        "Failed to remove partial download {}: {}",
                        part.display(),
                        remove_err
                    );
                }
                return Err(e);
            }
        };

        tokio::fs::rename(&part, &dest)
            .await
            .map_err(|e| PipelineError::file_op(&dest, e))?;

        info!(
            "Downloaded data from {} into file {}",
            source.original,
            dest.display()
        );

        Ok(DownloadOutcome {
            source,
            path: dest,
            bytes,
            sha256,
            skipped: false,
        })
    }

    /// Describes the archive already at `local_data_file` without fetching it.
    pub async fn existing_archive(&self) -> Result<DownloadOutcome> {
        let source = resolve_download_url(&self.config.source_url)?;
        let path = self.config.local_data_file.clone();
        Validator::validate_file_path(&path)?;

        let (bytes, sha256) = hash_existing_file(path.clone()).await?;
        Ok(DownloadOutcome {
            source,
            path,
            bytes,
            sha256,
            skipped: true,
        })
    }

    pub async fn extract_zip_file(&self) -> Result<ExtractionSummary> {
        let archive_path = self.config.local_data_file.clone();
        let unzip_dir = self.config.unzip_dir.clone();
        let show_progress = self.show_progress;

        Validator::validate_file_path(&archive_path)?;
        create_directories(&[&unzip_dir], false)?;

        info!(
            "Extracting {} into {}",
            archive_path.display(),
            unzip_dir.display()
        );

        let timer = StageTimer::new("zip extraction");
        let summary = tokio::task::spawn_blocking(move || {
            extract_archive(&archive_path, &unzip_dir, show_progress)
        })
        .await
        .map_err(|e| PipelineError::Task(format!("Extraction task failed: {}", e)))??;
        timer.finish_with_count(summary.files);

        if summary.skipped_entries > 0 {
            warn!(
                "{} archive entries were skipped because they point outside {}",
                summary.skipped_entries,
                summary.unzip_dir.display()
            );
        }

        Ok(summary)
    }

    pub fn write_manifest(
        &self,
        download: &DownloadOutcome,
        extraction: &ExtractionSummary,
    ) -> Result<PathBuf> {
        let manifest = IngestionManifest {
            source_url: download.source.original.clone(),
            resolved_url: download.source.resolved.clone(),
            local_data_file: download.path.clone(),
            sha256: download.sha256.clone(),
            download_bytes: download.bytes,
            download_skipped: download.skipped,
            extraction: extraction.clone(),
            ingested_at: Utc::now().to_rfc3339(),
        };

        let path = manifest_path(&self.config);
        save_json(&path, &manifest)?;
        Ok(path)
    }

    async fn fetch(&self, source: &DownloadSource) -> Result<Response> {
        let response = self.get(&source.resolved).await?;

        // Large Drive files answer with an HTML warning page instead of the
        // archive; the page links to the real download.
        if let Some(file_id) = &source.drive_file_id
            && is_html(&response)
        {
            debug!("Google Drive returned an HTML page, looking for a confirm token");
            let html = response.text().await?;
            let confirm_url =
                confirm_url_from_html(file_id, &html).ok_or_else(|| PipelineError::Download {
                    url: source.resolved.clone(),
                    message: "Google Drive returned an HTML page without a download link; \
                              check that the file is shared publicly"
                        .to_string(),
                })?;
            return self.get(&confirm_url).await;
        }

        Ok(response)
    }

    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::Download {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Download {
                url: url.to_string(),
                message: format!("server responded with status {}", status),
            });
        }

        Ok(response)
    }

    async fn write_body(
        &self,
        mut response: Response,
        url: &str,
        part: &Path,
    ) -> Result<(u64, String)> {
        let expected = response.content_length();
        let progress = TransferProgress::download(expected, self.show_progress);

        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| PipelineError::file_op(part, e))?;
        let mut hasher = Sha256::new();
        let mut written = 0u64;

        while let Some(chunk) = response.chunk().await.map_err(|e| PipelineError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })? {
            hasher.update(&chunk);
            file.write_all(&chunk)
                .await
                .map_err(|e| PipelineError::file_op(part, e))?;
            written += chunk.len() as u64;
            progress.advance(chunk.len() as u64);
        }

        file.flush()
            .await
            .map_err(|e| PipelineError::file_op(part, e))?;
        progress.finish("Download complete");

        if written == 0 {
            return Err(PipelineError::Download {
                url: url.to_string(),
                message: "response body was empty".to_string(),
            });
        }

        if let Some(expected) = expected
            && expected != written
        {
            return Err(PipelineError::Download {
                url: url.to_string(),
                message: format!("expected {} bytes but received {}", expected, written),
            });
        }

        Ok((written, format!("{:x}", hasher.finalize())))
    }
}

pub fn manifest_path(config: &DataIngestionConfig) -> PathBuf {
    config.root_dir.join(MANIFEST_FILE_NAME)
}

/// Loads the manifest left by the last successful ingestion, if any.
pub fn read_manifest(config: &DataIngestionConfig) -> Result<Option<IngestionManifest>> {
    let path = manifest_path(config);
    if !path.is_file() {
        return Ok(None);
    }
    load_json(&path).map(Some)
}

fn is_non_empty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("text/html"))
        .unwrap_or(false)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}

async fn hash_existing_file(path: PathBuf) -> Result<(u64, String)> {
    tokio::task::spawn_blocking(move || -> Result<(u64, String)> {
        let mut file = File::open(&path).map_err(|e| PipelineError::file_op(&path, e))?;
        let mut hasher = Sha256::new();
        let bytes = io::copy(&mut file, &mut hasher).map_err(|e| PipelineError::file_op(&path, e))?;
        Ok((bytes, format!("{:x}", hasher.finalize())))
    })
    .await
    .map_err(|e| PipelineError::Task(format!("Hashing task failed: {}", e)))?
}

fn extract_archive(
    archive_path: &Path,
    unzip_dir: &Path,
    show_progress: bool,
) -> Result<ExtractionSummary> {
    let file = File::open(archive_path).map_err(|e| PipelineError::file_op(archive_path, e))?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut summary = ExtractionSummary {
        unzip_dir: unzip_dir.to_path_buf(),
        ..Default::default()
    };

    if archive.len() == 0 {
        warn!("Archive {} contains no entries", archive_path.display());
        return Ok(summary);
    }

    let progress = TransferProgress::extraction(archive.len() as u64, show_progress);

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        progress.advance(1);

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping archive entry with unsafe path: {}", entry.name());
            summary.skipped_entries += 1;
            continue;
        };
        let target = unzip_dir.join(&relative);
        progress.set_message(relative.display().to_string());

        if entry.is_dir() {
            create_dir_within(&target, unzip_dir)?;
            summary.directories += 1;
            continue;
        }

        if let Some(parent) = target.parent() {
            create_dir_within(parent, unzip_dir)?;
        }

        let mut out = File::create(&target).map_err(|e| PipelineError::file_op(&target, e))?;
        let written =
            io::copy(&mut entry, &mut out).map_err(|e| PipelineError::file_op(&target, e))?;

        summary.files += 1;
        summary.bytes += written;
        debug!("Extracted {} ({} bytes)", target.display(), written);
    }

    progress.finish("Extraction complete");
    Ok(summary)
}

/// Creates `dir` only after its closest existing ancestor has been checked to
/// resolve inside `base_dir`, so a symlinked entry never creates anything
/// outside it.
fn create_dir_within(dir: &Path, base_dir: &Path) -> Result<()> {
    let existing = dir
        .ancestors()
        .find(|ancestor| ancestor.exists())
        .unwrap_or(base_dir);
    Validator::validate_within_base_dir(existing, base_dir)?;

    if existing != dir {
        fs::create_dir_all(dir).map_err(|e| PipelineError::file_op(dir, e))?;
    }
    Ok(())
}
