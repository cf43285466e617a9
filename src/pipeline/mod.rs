// file: src/pipeline/mod.rs
// description: pipeline stages and the runner that wraps each of them
// reference: pipeline orchestration

pub mod progress;
pub mod stage_01_data_ingestion;

pub use progress::TransferProgress;
pub use stage_01_data_ingestion::{DataIngestionTrainingPipeline, IngestionReport};

use crate::error::Result;
use crate::utils::StageTimer;
use std::future::Future;
use tracing::{error, info};

/// Runs one stage between the start and completion banners.
///
/// A failing stage is logged and its error returned untouched, so the caller
/// decides whether the remaining stages still run.
pub async fn run_stage<T, F>(name: &str, stage: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    info!(">>>>>> stage {} started <<<<<<", name);
    let timer = StageTimer::new(name);

    match stage.await {
        Ok(output) => {
            timer.finish();
            info!(">>>>>> stage {} completed <<<<<<\n\nx==========x", name);
            Ok(output)
        }
        Err(e) => {
            error!("stage {} failed: {}", name, e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[tokio::test]
    async fn test_run_stage_passes_output_through() {
        let value = run_stage("noop", async { Ok::<_, PipelineError>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_run_stage_returns_error_unchanged() {
        let err = run_stage("failing", async {
            Err::<(), _>(PipelineError::Validation("bad archive".to_string()))
        })
        .await
        .unwrap_err();

        match err {
            PipelineError::Validation(msg) => assert_eq!(msg, "bad archive"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
