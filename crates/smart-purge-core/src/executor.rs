//! Transactional deletion of selected scan items.
//!
//! Each selected item moves `Pending -> Reverified -> Skipped | Deleted | DeleteFailed`.
//! The whole batch runs in one transaction. Cross-item ordering is left to the
//! store's cascade rules: an item removed by an earlier cascade reverifies as
//! a stale reference and is recorded, not treated as an error.

use crate::config::PurgeConfig;
use crate::document::{DocumentStore, Element};
use crate::error::Error;
use crate::model::{ElementId, EntityHandle, PurgeOutcome, ScanItem};
use crate::progress::ProgressReporter;
use crate::protection::ProtectionPolicy;
use crate::registry::Category;
use ahash::AHashSet;
use std::fmt::Write as _;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, trace, warn};

pub const TRANSACTION_NAME: &str = "Smart Purge";

/// Per-item failure reasons. Their `Display` text becomes the outcome reason.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PurgeFailure {
    #[error("stale reference")]
    StaleReference,

    #[error("protected: {0}")]
    Protected(String),

    #[error("{0}")]
    Blocked(String),

    #[error("{0}")]
    DeleteFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemState {
    Pending,
    Reverified,
    Skipped(PurgeFailure),
    Deleted,
    DeleteFailed(PurgeFailure),
}

/// One selected entity, detached from any scan result or widget.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedItem {
    pub entity: EntityHandle,
    pub name: String,
    pub category_id: String,
}

/// Ordered, de-duplicated set of entities to purge.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    items: Vec<SelectedItem>,
    seen: AHashSet<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one item; returns false if the entity is already selected.
    pub fn add(&mut self, category_id: &str, item: &ScanItem) -> bool {
        if !self.seen.insert(item.entity.id) {
            return false;
        }
        self.items.push(SelectedItem {
            entity: item.entity,
            name: item.metadata.name.clone(),
            category_id: category_id.to_string(),
        });
        true
    }

    /// Add every deletable item of a scanned category.
    pub fn add_category(&mut self, category: &Category) -> usize {
        let mut added = 0;
        for item in category.items().iter().filter(|item| item.can_delete) {
            if self.add(category.id, item) {
                added += 1;
            }
        }
        added
    }

    pub fn from_categories<'c>(categories: impl IntoIterator<Item = &'c Category>) -> Self {
        let mut selection = Self::new();
        for category in categories {
            selection.add_category(category);
        }
        selection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.seen.contains(&id)
    }
}

/// Deleted and failed outcomes of one `execute` call.
#[derive(Debug, Clone, Default)]
pub struct PurgeReport {
    pub dry_run: bool,
    pub deleted: Vec<PurgeOutcome>,
    pub failed: Vec<PurgeOutcome>,
}

impl PurgeReport {
    pub fn total(&self) -> usize {
        self.deleted.len() + self.failed.len()
    }

    /// Short user-facing summary listing at most `limit` failure reasons.
    pub fn summary(&self, limit: usize) -> String {
        let mut text = if self.dry_run {
            format!(
                "Dry run: {} items would be deleted, {} would fail. No changes were made.",
                self.deleted.len(),
                self.failed.len()
            )
        } else if self.failed.is_empty() {
            format!("Successfully deleted {} items.", self.deleted.len())
        } else {
            format!(
                "Deleted: {}, Failed: {} items.",
                self.deleted.len(),
                self.failed.len()
            )
        };

        for outcome in self.failed.iter().take(limit) {
            let _ = write!(
                text,
                "\n  - {} (ID: {}): {}",
                outcome.name,
                outcome.entity.id,
                outcome.reason.as_deref().unwrap_or("unknown")
            );
        }
        if self.failed.len() > limit {
            let _ = write!(text, "\n  ... and {} more", self.failed.len() - limit);
        }
        text
    }

    /// Sectioned plain-text report of every outcome.
    pub fn detailed_report(&self) -> String {
        let rule = "=".repeat(50);
        let thin = "-".repeat(50);
        let mut lines = vec![
            rule.clone(),
            if self.dry_run {
                "PURGE PREVIEW (DRY RUN)".to_string()
            } else {
                "PURGE RESULTS".to_string()
            },
            rule.clone(),
            String::new(),
            format!("Total items processed: {}", self.total()),
            format!(
                "{}: {}",
                if self.dry_run { "Would delete" } else { "Successfully deleted" },
                self.deleted.len()
            ),
            format!("Failed to delete: {}", self.failed.len()),
            String::new(),
        ];

        if !self.deleted.is_empty() {
            lines.push(if self.dry_run { "WOULD DELETE:" } else { "DELETED ITEMS:" }.to_string());
            lines.push(thin.clone());
            for outcome in &self.deleted {
                lines.push(format!("  - {} (ID: {})", outcome.name, outcome.entity.id));
            }
            lines.push(String::new());
        }

        if !self.failed.is_empty() {
            lines.push("FAILED ITEMS:".to_string());
            lines.push(thin);
            for outcome in &self.failed {
                lines.push(format!(
                    "  - {} (ID: {}): {}",
                    outcome.name,
                    outcome.entity.id,
                    outcome.reason.as_deref().unwrap_or("unknown")
                ));
            }
            lines.push(String::new());
        }

        if self.dry_run {
            lines.push("No changes were made.".to_string());
        }
        lines.push(rule);
        lines.join("\n")
    }
}

/// Deletes a [`Selection`] inside one transaction on an injected store.
pub struct PurgeExecutor<'d> {
    store: &'d dyn DocumentStore,
    policy: ProtectionPolicy,
}

impl<'d> PurgeExecutor<'d> {
    pub fn new(store: &'d dyn DocumentStore, config: &PurgeConfig) -> Self {
        Self {
            store,
            policy: ProtectionPolicy::from_config(config),
        }
    }

    pub fn with_policy(store: &'d dyn DocumentStore, policy: ProtectionPolicy) -> Self {
        Self { store, policy }
    }

    /// Run the batch. Per-item problems land in `failed`; only a transaction
    /// that cannot start or commit is returned as an error.
    pub fn execute(
        &self,
        selection: &Selection,
        dry_run: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<PurgeReport, Error> {
        let start = Instant::now();
        let total = selection.len();
        let mut report = PurgeReport {
            dry_run,
            ..PurgeReport::default()
        };

        reporter.on_purge_start(total, dry_run);
        if selection.is_empty() {
            reporter.on_purge_complete(0, 0, 0.0);
            return Ok(report);
        }

        let active_view = self.store.active_view().unwrap_or_else(|e| {
            warn!("Active view unavailable: {}", e);
            None
        });

        self.store
            .begin(TRANSACTION_NAME)
            .map_err(|e| Error::Transaction(format!("could not start transaction: {}", e)))?;

        // Ids a dry run has already accounted for, cascades included.
        let mut simulated: AHashSet<ElementId> = AHashSet::new();

        for (index, item) in selection.items().iter().enumerate() {
            let state = self.process(item, dry_run, active_view, &mut simulated);
            match state {
                ItemState::Deleted => {
                    report.deleted.push(PurgeOutcome::succeeded(item.entity, &item.name));
                }
                ItemState::Skipped(failure) | ItemState::DeleteFailed(failure) => {
                    report
                        .failed
                        .push(PurgeOutcome::failed(item.entity, &item.name, failure.to_string()));
                }
                ItemState::Pending | ItemState::Reverified => {
                    // process() always reaches a terminal state
                }
            }
            reporter.on_purge_progress(index + 1, total, &item.name);
        }

        self.finish(dry_run, !report.deleted.is_empty())?;

        let elapsed = start.elapsed().as_secs_f64();
        info!(
            "{}: {} deleted, {} failed in {:.2}s",
            if dry_run { "Dry run" } else { "Purge" },
            report.deleted.len(),
            report.failed.len(),
            elapsed
        );
        reporter.on_purge_complete(report.deleted.len(), report.failed.len(), elapsed);
        Ok(report)
    }

    fn process(
        &self,
        item: &SelectedItem,
        dry_run: bool,
        active_view: Option<ElementId>,
        simulated: &mut AHashSet<ElementId>,
    ) -> ItemState {
        let mut state = ItemState::Pending;
        trace!("{} {:?}", item.entity, state);

        let element = match self.reverify(item, active_view, simulated) {
            Ok(element) => element,
            Err(failure @ PurgeFailure::StaleReference) => {
                debug!("{} no longer resolves", item.entity);
                return ItemState::DeleteFailed(failure);
            }
            Err(failure) => return ItemState::Skipped(failure),
        };
        state = ItemState::Reverified;
        trace!("{} {:?}", item.entity, state);

        if dry_run {
            return match self.store.dependents(element.id) {
                Ok(ids) => {
                    simulated.extend(ids);
                    ItemState::Deleted
                }
                Err(e) => ItemState::DeleteFailed(PurgeFailure::DeleteFailed(e.to_string())),
            };
        }

        match self.store.delete(element.id) {
            Ok(removed) => {
                trace!("{} removed {} elements", item.entity, removed.len());
                ItemState::Deleted
            }
            Err(e) => {
                warn!("Failed to delete {} ({}): {}", item.name, item.entity, e);
                ItemState::DeleteFailed(PurgeFailure::DeleteFailed(e.to_string()))
            }
        }
    }

    /// Re-check an item immediately before deletion.
    fn reverify(
        &self,
        item: &SelectedItem,
        active_view: Option<ElementId>,
        simulated: &AHashSet<ElementId>,
    ) -> Result<Element, PurgeFailure> {
        if simulated.contains(&item.entity.id) {
            return Err(PurgeFailure::StaleReference);
        }
        let element = match self.store.element(item.entity.id) {
            Ok(Some(element)) if element.kind == item.entity.kind => element,
            Ok(_) => return Err(PurgeFailure::StaleReference),
            Err(e) => return Err(PurgeFailure::DeleteFailed(e.to_string())),
        };
        if let Some(protection) = self.policy.classify(&element) {
            return Err(PurgeFailure::Protected(protection.to_string()));
        }
        if active_view == Some(element.id) {
            return Err(PurgeFailure::Blocked("Active view".to_string()));
        }
        if element.pinned {
            return Err(PurgeFailure::Blocked("Element is pinned".to_string()));
        }
        Ok(element)
    }

    fn finish(&self, dry_run: bool, any_deleted: bool) -> Result<(), Error> {
        if dry_run || !any_deleted {
            return self
                .store
                .rollback()
                .map_err(|e| Error::Transaction(format!("rollback failed: {}", e)));
        }

        if let Err(e) = self.store.commit() {
            error!("Commit failed, rolling back: {}", e);
            if let Err(rollback_err) = self.store.rollback() {
                error!("Rollback after failed commit also failed: {}", rollback_err);
            }
            return Err(Error::Transaction(e.to_string()));
        }
        Ok(())
    }
}
