// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use cnn_classifier::constants::{CONFIG_FILE_PATH, LOG_DIR, PARAMS_FILE_PATH};
use cnn_classifier::pipeline::stage_01_data_ingestion::STAGE_NAME as DATA_INGESTION_STAGE;
use cnn_classifier::utils::get_size;
use cnn_classifier::utils::logging::{format_error, format_step, format_success};
use cnn_classifier::{
    ConfigurationManager, DataIngestionTrainingPipeline, IngestionReport, read_manifest, run_stage,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "cnn_classifier")]
#[command(version)]
#[command(about = "Data pipeline for the chest cancer CNN classifier", long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE", default_value = CONFIG_FILE_PATH)]
    config: PathBuf,

    #[arg(short, long, value_name = "FILE", default_value = PARAMS_FILE_PATH)]
    params: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Directory that receives running_logs.log
    #[arg(long, value_name = "DIR", default_value = LOG_DIR)]
    log_dir: PathBuf,

    /// Log to stdout only
    #[arg(long, action = ArgAction::SetTrue)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every pipeline stage in order
    Run,

    /// Run the data ingestion stage alone
    Ingest {
        /// Re-extract the archive already on disk instead of downloading it
        #[arg(long)]
        extract_only: bool,
    },

    /// Show the resolved data ingestion config and what is on disk
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = (!cli.no_log_file).then_some(cli.log_dir.as_path());
    cnn_classifier::utils::logging::init_logger(cli.color, cli.verbose, log_dir)
        .context("Failed to initialize logging")?;

    info!("Loading configuration from: {}", cli.config.display());
    let manager = ConfigurationManager::new(&cli.config, &cli.params)
        .context("Failed to load configuration")?;

    let show_progress = std::io::stderr().is_terminal();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => cmd_run(manager, show_progress).await,
        Commands::Ingest { extract_only } => {
            cmd_ingest(manager, extract_only, show_progress).await?;
            Ok(())
        }
        Commands::Inspect => cmd_inspect(&manager),
    }
}

async fn cmd_run(manager: ConfigurationManager, show_progress: bool) -> Result<()> {
    const TOTAL_STAGES: usize = 1;

    println!("{}", format_step(1, TOTAL_STAGES, DATA_INGESTION_STAGE));
    cmd_ingest(manager, false, show_progress).await?;

    println!("{}", format_success("All stages completed"));
    Ok(())
}

async fn cmd_ingest(
    manager: ConfigurationManager,
    extract_only: bool,
    show_progress: bool,
) -> Result<IngestionReport> {
    let pipeline = DataIngestionTrainingPipeline::new(manager).with_progress(show_progress);

    let result = run_stage(DATA_INGESTION_STAGE, async {
        if extract_only {
            pipeline.run_extract_only().await
        } else {
            pipeline.main().await
        }
    })
    .await;

    match result {
        Ok(report) => {
            info!(
                "Extracted {} files ({} directories) into {}",
                report.extraction.files,
                report.extraction.directories,
                report.extraction.unzip_dir.display()
            );
            info!("Manifest written to {}", report.manifest_path.display());
            Ok(report)
        }
        Err(e) => {
            eprintln!(
                "{}",
                format_error(&format!("{} failed: {}", DATA_INGESTION_STAGE, e))
            );
            Err(e).with_context(|| format!("stage {} failed", DATA_INGESTION_STAGE))
        }
    }
}

fn cmd_inspect(manager: &ConfigurationManager) -> Result<()> {
    let config = manager
        .get_data_ingestion_config()
        .context("Failed to read data ingestion config")?;

    println!("Data ingestion");
    println!("  source_URL:      {}", config.source_url);
    println!("  local_data_file: {}", config.local_data_file.display());
    println!("  unzip_dir:       {}", config.unzip_dir.display());
    println!("  timeout_secs:    {}", config.timeout_secs);
    println!("  skip_existing:   {}", config.skip_existing);

    println!(
        "  archive size:    {}",
        size_or(&config.local_data_file, "(not downloaded)")?
    );
    println!(
        "  unzip_dir size:  {}",
        size_or(&config.unzip_dir, "(not created)")?
    );

    match read_manifest(&config) {
        Ok(Some(manifest)) => {
            println!();
            println!("Last ingestion ({})", manifest.ingested_at);
            println!("  resolved url:    {}", manifest.resolved_url);
            println!("  sha256:          {}", manifest.sha256);
            println!("  bytes:           {}", manifest.download_bytes);
            println!(
                "  extracted:       {} files, {} directories, {} skipped",
                manifest.extraction.files,
                manifest.extraction.directories,
                manifest.extraction.skipped_entries
            );
        }
        Ok(None) => println!("\nNo ingestion manifest found"),
        Err(e) => warn!("Could not read ingestion manifest: {}", e),
    }

    Ok(())
}

/// Size of `path`, or `missing` when nothing exists there yet.
fn size_or(path: &Path, missing: &str) -> Result<String> {
    if !path.exists() {
        return Ok(missing.to_string());
    }
    get_size(path).with_context(|| format!("Failed to measure {}", path.display()))
}
