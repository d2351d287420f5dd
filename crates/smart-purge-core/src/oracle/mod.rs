//! Per-kind usage analysis.
//!
//! The database has no "find referrers" query, so each oracle rebuilds an
//! approximate usage set for its kind and reports the elements outside it.
//! Protection is applied before anything is emitted, and one bad element
//! never aborts a scan: per-element problems become a [`SkipReason`].

pub mod datums;
pub mod element_types;
pub mod families;
pub mod heuristics;
pub mod system;
pub mod views;

use crate::document::{Document, DocumentError, Element};
use crate::model::{ElementId, EntityKind, ScanItem};
use crate::naming::resolve_metadata;
use crate::protection::{Protection, ProtectionPolicy};
use ahash::AHashSet;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, warn};

pub type UsageSet = AHashSet<ElementId>;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Failed(String),
}

/// Why a candidate element did not make it into the results.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Protected(Protection),
    InUse,
    NotApplicable,
    Malformed(String),
}

/// What an oracle sees of the world during one scan.
pub struct ScanContext<'a> {
    pub doc: &'a dyn Document,
    pub policy: &'a ProtectionPolicy,
    pub temp_view_patterns: &'a [String],
    active_view: Option<ElementId>,
}

impl<'a> ScanContext<'a> {
    pub fn new(
        doc: &'a dyn Document,
        policy: &'a ProtectionPolicy,
        temp_view_patterns: &'a [String],
    ) -> Self {
        let active_view = doc.active_view().unwrap_or_else(|e| {
            warn!("Active view unavailable: {}", e);
            None
        });
        Self {
            doc,
            policy,
            temp_view_patterns,
            active_view,
        }
    }

    /// Elements of several kinds; a kind the document has no data for is skipped.
    pub fn elements_of(&self, kinds: &[EntityKind]) -> Result<Vec<Element>, DocumentError> {
        let mut all = Vec::new();
        for &kind in kinds {
            match self.doc.elements(kind) {
                Ok(mut elements) => all.append(&mut elements),
                Err(DocumentError::Unsupported(kind)) => {
                    debug!("No {} data in document, skipping", kind)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(all)
    }

    pub fn check_protection(&self, element: &Element) -> Result<(), SkipReason> {
        match self.policy.classify(element) {
            Some(protection) => Err(SkipReason::Protected(protection)),
            None => Ok(()),
        }
    }

    /// Build the reported item, blocking deletion of pinned elements and the active view.
    pub fn item(
        &self,
        element: &Element,
        item_type: &str,
        attributes: BTreeMap<String, String>,
    ) -> ScanItem {
        let metadata = resolve_metadata(self.doc, element, attributes);
        if self.active_view == Some(element.id) {
            ScanItem::blocked(element.handle(), metadata, item_type, "Active view")
        } else if element.pinned {
            ScanItem::blocked(element.handle(), metadata, item_type, "Element is pinned")
        } else {
            ScanItem::deletable(element.handle(), metadata, item_type)
        }
    }

    /// Protection check, then usage check, then the item.
    pub fn unused(
        &self,
        element: &Element,
        usage: &UsageSet,
        item_type: &str,
        attributes: BTreeMap<String, String>,
    ) -> Result<ScanItem, SkipReason> {
        self.check_protection(element)?;
        if usage.contains(&element.id) {
            return Err(SkipReason::InUse);
        }
        Ok(self.item(element, item_type, attributes))
    }
}

/// Contract shared by every per-kind scanner.
pub trait ReachabilityOracle {
    /// Read-only; repeated calls on an unchanged document give the same ids.
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError>;
}

/// Fold per-element results into the final list, logging what was dropped.
pub fn collect_items(
    label: &str,
    results: impl IntoIterator<Item = Result<ScanItem, SkipReason>>,
) -> Vec<ScanItem> {
    let mut items = Vec::new();
    let mut protected = 0usize;
    let mut in_use = 0usize;

    for result in results {
        match result {
            Ok(item) => items.push(item),
            Err(SkipReason::Protected(_)) => protected += 1,
            Err(SkipReason::InUse) => in_use += 1,
            Err(SkipReason::NotApplicable) => {}
            Err(SkipReason::Malformed(reason)) => warn!("{}: skipped element: {}", label, reason),
        }
    }

    debug!(
        "{}: {} unused, {} in use, {} protected",
        label,
        items.len(),
        in_use,
        protected
    );
    items
}

/// Attribute map from `(key, value)` pairs.
pub fn attrs<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

/// Number rendered without a trailing `.0` for whole values.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
