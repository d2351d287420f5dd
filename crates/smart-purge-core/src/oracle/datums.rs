//! Scope boxes, elevation markers and reference planes.

use super::{attrs, collect_items, ReachabilityOracle, ScanContext, ScanError, SkipReason, UsageSet};
use crate::document::{Param, Relation};
use crate::model::{EntityKind, ScanItem};
use std::collections::BTreeMap;
use tracing::debug;

/// Scope boxes no non-template view is cropped by.
pub struct ScopeBoxOracle;

impl ReachabilityOracle for ScopeBoxOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let views = ctx.doc.elements(EntityKind::View)?;
        let usage: UsageSet = views
            .iter()
            .filter(|view| !view.is(Param::IsTemplate))
            .filter_map(|view| view.id_param(Param::ScopeBoxId))
            .collect();
        debug!("unused_scope_boxes: {} scope boxes crop a view", usage.len());

        let scope_boxes = ctx.doc.elements(EntityKind::ScopeBox)?;
        Ok(collect_items(
            "unused_scope_boxes",
            scope_boxes.iter().map(|scope_box| {
                ctx.unused(
                    scope_box,
                    &usage,
                    "Scope Box",
                    attrs([("views", "0".to_string())]),
                )
            }),
        ))
    }
}

/// Elevation markers none of whose hosted views still exist.
pub struct ElevationMarkerOracle;

impl ReachabilityOracle for ElevationMarkerOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let views: UsageSet = ctx
            .doc
            .elements(EntityKind::View)?
            .iter()
            .map(|view| view.id)
            .collect();

        let markers = ctx.doc.elements(EntityKind::ElevationMarker)?;
        Ok(collect_items(
            "orphaned_elevation_markers",
            markers.iter().map(|marker| {
                let hosted = marker
                    .relation(Relation::HostedViews)
                    .iter()
                    .filter(|id| views.contains(*id))
                    .count();
                if hosted > 0 {
                    return Err(SkipReason::InUse);
                }
                ctx.check_protection(marker)?;
                Ok(ctx.item(
                    marker,
                    "Elevation Marker",
                    attrs([("views", "0".to_string())]),
                ))
            }),
        ))
    }
}

/// Reference planes left with a blank name.
pub struct UnnamedReferencePlaneOracle;

impl ReachabilityOracle for UnnamedReferencePlaneOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let planes = ctx.doc.elements(EntityKind::ReferencePlane)?;
        Ok(collect_items(
            "unnamed_reference_planes",
            planes.iter().map(|plane| {
                if plane.display_name().is_some() {
                    return Err(SkipReason::NotApplicable);
                }
                ctx.check_protection(plane)?;
                Ok(ctx.item(plane, "Reference Plane", BTreeMap::new()))
            }),
        ))
    }
}
