use indicatif::{ProgressBar, ProgressStyle};
use smart_purge_core::ProgressReporter;
use std::sync::Mutex;
use std::time::Duration;

const TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Progress bars for the scan (one step per category) and purge (one step per item) phases.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn start_bar(&self, total: usize, template: &str) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(template) {
            pb.set_style(style.progress_chars("━╸─").tick_chars(TICKS));
        }
        pb.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn update(&self, done: usize, message: &str) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_position(done as u64);
                pb.set_message(message.to_string());
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_scan_start(&self, total_categories: usize) {
        self.start_bar(
            total_categories,
            "  {spinner:.cyan} Scanning [{bar:30.cyan/dim}] {pos}/{len} {msg}",
        );
    }

    fn on_category_scanned(&self, done: usize, _total: usize, message: &str) {
        self.update(done, message);
    }

    fn on_scan_complete(&self, unused_items: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Scan complete: {} unused items in {:.2}s",
            unused_items, duration_secs
        );
    }

    fn on_purge_start(&self, total_items: usize, dry_run: bool) {
        let template = if dry_run {
            "  {spinner:.yellow} Simulating [{bar:30.yellow/dim}] {pos}/{len} {msg}"
        } else {
            "  {spinner:.red} Purging [{bar:30.red/dim}] {pos}/{len} {msg}"
        };
        self.start_bar(total_items, template);
    }

    fn on_purge_progress(&self, done: usize, _total: usize, message: &str) {
        self.update(done, message);
    }

    fn on_purge_complete(&self, deleted: usize, failed: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Purge pass complete: {} ok, {} failed in {:.2}s",
            deleted, failed, duration_secs
        );
    }
}
