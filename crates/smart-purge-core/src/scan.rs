use crate::config::PurgeConfig;
use crate::document::Document;
use crate::oracle::ScanContext;
use crate::progress::ProgressReporter;
use crate::protection::ProtectionPolicy;
use crate::registry::Category;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of one scan pass.
#[derive(Debug, Default, Clone)]
pub struct ScanSummary {
    pub categories_scanned: usize,
    pub categories_failed: usize,
    pub unused_items: usize,
    /// True when the pass stopped before reaching every category.
    pub cancelled: bool,
    pub duration: Duration,
}

/// Runs category oracles against one document, in caller order.
pub struct ScanCoordinator<'d> {
    doc: &'d dyn Document,
    policy: ProtectionPolicy,
    temp_view_patterns: Vec<String>,
}

impl<'d> ScanCoordinator<'d> {
    pub fn new(doc: &'d dyn Document, config: &PurgeConfig) -> Self {
        Self {
            doc,
            policy: ProtectionPolicy::from_config(config),
            temp_view_patterns: config.temp_view_patterns.clone(),
        }
    }

    pub fn policy(&self) -> &ProtectionPolicy {
        &self.policy
    }

    /// Scan every category, updating each in place.
    ///
    /// `is_cancelled` is polled before each category; categories already
    /// scanned keep their results when the pass stops early.
    pub fn scan(
        &self,
        categories: &mut [&mut Category],
        reporter: &dyn ProgressReporter,
        is_cancelled: &dyn Fn() -> bool,
    ) -> ScanSummary {
        let start = Instant::now();
        let total = categories.len();
        let ctx = ScanContext::new(self.doc, &self.policy, &self.temp_view_patterns);
        let mut summary = ScanSummary::default();

        reporter.on_scan_start(total);

        for (index, category) in categories.iter_mut().enumerate() {
            if is_cancelled() {
                info!("Scan cancelled after {} of {} categories", index, total);
                summary.cancelled = true;
                break;
            }

            match category.oracle().scan(&ctx) {
                Ok(items) => {
                    info!("{}: {} unused", category.id, items.len());
                    summary.unused_items += items.len();
                    category.record_items(items);
                }
                Err(e) => {
                    warn!("{}: scan failed: {}", category.id, e);
                    summary.categories_failed += 1;
                    category.record_error(e.to_string());
                }
            }
            summary.categories_scanned += 1;

            reporter.on_category_scanned(
                index + 1,
                total,
                &format!("{}: {}", category.name, category.status_text()),
            );
        }

        summary.duration = start.elapsed();
        reporter.on_scan_complete(summary.unused_items, summary.duration.as_secs_f64());
        summary
    }

    /// Scan without progress reporting or cancellation.
    pub fn scan_all(&self, categories: &mut [&mut Category]) -> ScanSummary {
        self.scan(categories, &crate::progress::SilentReporter, &|| false)
    }
}
