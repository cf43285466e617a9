// file: src/utils/logging.rs
// description: Tracing subscriber initialization with optional ANSI coloring and a running log file

use crate::constants::LOG_FILE_NAME;
use crate::error::{PipelineError, Result};
use colored::*;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_logger(colored_output: bool, verbose: bool, log_dir: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::new(level);

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_ansi(colored_output);

    let file_layer = match log_dir {
        Some(dir) => {
            let path = open_log_file_path(dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| PipelineError::file_op(&path, e))?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(file_layer)
        .init();

    Ok(())
}

fn open_log_file_path(dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::file_op(dir, e))?;
    Ok(dir.join(LOG_FILE_NAME))
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_step(step: usize, total: usize, msg: &str) -> String {
    format!("{} {}", format!("[{}/{}]", step, total).cyan().bold(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_path_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("logs");

        let path = open_log_file_path(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(path, dir.join("running_logs.log"));
    }

    #[test]
    fn test_format_step_contains_counts() {
        colored::control::set_override(false);
        assert_eq!(format_step(1, 3, "ingest"), "[1/3] ingest");
        assert_eq!(format_success("done"), "✓ done");
        assert_eq!(format_error("boom"), "✗ boom");
    }
}
