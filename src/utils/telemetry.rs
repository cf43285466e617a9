// file: src/utils/telemetry.rs
// description: timing helpers for pipeline stages and their operations

use std::time::{Duration, Instant};
use tracing::info;

/// Logs when an operation starts and how long it took once finished.
pub struct StageTimer {
    operation: String,
    start: Instant,
}

impl StageTimer {
    pub fn new(operation: &str) -> Self {
        info!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} in {:.2}s",
            self.operation,
            elapsed.as_secs_f64()
        );
        elapsed
    }

    pub fn finish_with_count(self, count: usize) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} - {} items in {:.2}s ({:.2} items/sec)",
            self.operation,
            count,
            elapsed.as_secs_f64(),
            rate(count, elapsed)
        );
        elapsed
    }
}

fn rate(count: usize, elapsed: Duration) -> f64 {
    if elapsed.as_secs_f64() > 0.0 {
        count as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_elapsed() {
        assert_eq!(rate(10, Duration::ZERO), 0.0);
        assert_eq!(rate(10, Duration::from_secs(2)), 5.0);
    }

    #[test]
    fn test_timer_elapsed_monotonic() {
        let timer = StageTimer::new("unzip");
        let first = timer.elapsed();
        let finished = timer.finish();
        assert!(finished >= first);
    }
}
