// file: src/utils/common.rs
// description: yaml/json persistence and filesystem helpers shared by stages
// reference: https://docs.rs/serde_yaml, https://docs.rs/walkdir

use crate::error::{PipelineError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Reads a YAML file and deserializes it into `T`.
///
/// A file with no content (or only whitespace) is rejected with
/// [`PipelineError::EmptyYaml`] instead of being deserialized into defaults.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::file_op(path, e))?;

    if content.trim().is_empty() {
        return Err(PipelineError::EmptyYaml(path.to_path_buf()));
    }

    let value = serde_yaml::from_str(&content).map_err(|source| PipelineError::YamlParse {
        path: path.to_path_buf(),
        source,
    })?;

    info!("yaml file: {} loaded successfully", path.display());
    Ok(value)
}

pub fn create_directories<P: AsRef<Path>>(paths: &[P], verbose: bool) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|e| PipelineError::file_op(path, e))?;
        if verbose {
            info!("created directory at: {}", path.display());
        }
    }
    Ok(())
}

pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|e| PipelineError::file_op(path, e))?;
    info!("json file saved at: {}", path.display());
    Ok(())
}

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::file_op(path, e))?;
    let value = serde_json::from_str(&content)?;
    info!("json file loaded successfully from: {}", path.display());
    Ok(value)
}

/// Returns the size of a file, or the total size of all files under a
/// directory, as `~ N KB`.
pub fn get_size(path: &Path) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| PipelineError::file_op(path, e))?;

    let bytes = if metadata.is_dir() {
        let mut total = 0u64;
        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry.map_err(|e| {
                PipelineError::Validation(format!("Cannot walk {}: {}", path.display(), e))
            })?;
            if entry.file_type().is_file() {
                total += entry
                    .metadata()
                    .map_err(|e| {
                        PipelineError::Validation(format!(
                            "Cannot stat {}: {}",
                            entry.path().display(),
                            e
                        ))
                    })?
                    .len();
            }
        }
        total
    } else {
        metadata.len()
    };

    debug!("{} occupies {} bytes", path.display(), bytes);
    Ok(format!("~ {} KB", (bytes as f64 / 1024.0).round() as u64))
}
