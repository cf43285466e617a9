// file: src/pipeline/progress.rs
// description: progress reporting for dataset download and archive extraction
// reference: uses indicatif for progress bars

use indicatif::{ProgressBar, ProgressStyle};

const BYTES_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bytes} ({bytes_per_sec}) {msg}";
const ENTRIES_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entries {msg}";

/// Wraps a single bar that is either drawn to the terminal or kept hidden
/// while still counting.
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Byte counter for a download; a spinner when the length is unknown.
    pub fn download(total_bytes: Option<u64>, visible: bool) -> Self {
        let (bar, template) = match total_bytes {
            Some(total) => (new_bar(total, visible), BYTES_TEMPLATE),
            None => (new_spinner(visible), SPINNER_TEMPLATE),
        };
        bar.set_style(style(template));
        Self { bar }
    }

    /// Entry counter for archive extraction.
    pub fn extraction(total_entries: u64, visible: bool) -> Self {
        let bar = new_bar(total_entries, visible);
        bar.set_style(style(ENTRIES_TEMPLATE));
        Self { bar }
    }

    pub fn advance(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn set_message(&self, message: String) {
        self.bar.set_message(message);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self, message: &'static str) {
        self.bar.finish_with_message(message);
    }
}

impl Drop for TransferProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

fn new_bar(total: u64, visible: bool) -> ProgressBar {
    if visible {
        ProgressBar::new(total)
    } else {
        let bar = ProgressBar::hidden();
        bar.set_length(total);
        bar
    }
}

fn new_spinner(visible: bool) -> ProgressBar {
    if visible {
        ProgressBar::new_spinner()
    } else {
        ProgressBar::hidden()
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}
