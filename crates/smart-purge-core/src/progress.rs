/// Trait for reporting scan and purge progress.
///
/// The CLI implements it with indicatif bars; embedding UIs can yield to their
/// render loop from these callbacks. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_scan_start(&self, _total_categories: usize) {}
    fn on_category_scanned(&self, _done: usize, _total: usize, _message: &str) {}
    fn on_scan_complete(&self, _unused_items: usize, _duration_secs: f64) {}
    fn on_purge_start(&self, _total_items: usize, _dry_run: bool) {}
    fn on_purge_progress(&self, _done: usize, _total: usize, _message: &str) {}
    fn on_purge_complete(&self, _deleted: usize, _failed: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
