use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;
use std::time::Duration;

static SPINNER_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
});

/// Live "found / processed" counter drawn on stderr while the tree is walked
///
/// Fed from the walker's progress callback, which runs on the walker thread;
/// indicatif throttles redraws itself so every call can update the message.
#[derive(Debug, Clone)]
pub struct DiscoveryProgress {
    bar: ProgressBar,
}

impl DiscoveryProgress {
    /// Spinner on stderr, or a hidden bar when `enabled` is false
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
            bar.set_style(SPINNER_STYLE.clone());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(format_counts(0, 0));
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self::new(false)
    }

    pub fn update(&self, found: usize, processed: usize) {
        self.bar.set_position(found as u64);
        self.bar.set_message(format_counts(found, processed));
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Remove the spinner so the summary lines start on a clean line
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn format_counts(found: usize, processed: usize) -> String {
    format!("Files found: {found}, Processed: {processed}")
}
