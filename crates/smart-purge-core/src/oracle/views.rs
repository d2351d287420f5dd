use super::heuristics::match_temp_pattern;
use super::{attrs, collect_items, ReachabilityOracle, ScanContext, ScanError, SkipReason, UsageSet};
use crate::document::{Element, Param, Relation, ViewType};
use crate::model::{EntityKind, ScanItem};
use std::collections::BTreeMap;
use tracing::debug;

/// Every view or schedule placed on at least one sheet.
fn placed_on_sheets(ctx: &ScanContext<'_>) -> Result<UsageSet, ScanError> {
    let sheets = ctx.doc.elements(EntityKind::Sheet)?;
    let placed: UsageSet = sheets
        .iter()
        .flat_map(|sheet| sheet.relation(Relation::PlacedViews).iter().copied())
        .collect();
    debug!("{} views placed on {} sheets", placed.len(), sheets.len());
    Ok(placed)
}

fn view_type_of(view: &Element) -> Result<Option<ViewType>, SkipReason> {
    view.view_type()
        .map_err(|e| SkipReason::Malformed(e.to_string()))
}

/// View templates no view points at. Unused templates may still be wanted later.
pub struct ViewTemplateOracle;

impl ReachabilityOracle for ViewTemplateOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let views = ctx.doc.elements(EntityKind::View)?;
        let usage: UsageSet = views
            .iter()
            .filter(|view| !view.is(Param::IsTemplate))
            .filter_map(|view| view.id_param(Param::ViewTemplateId))
            .collect();

        Ok(collect_items(
            "view_templates",
            views.iter().filter(|view| view.is(Param::IsTemplate)).map(|template| {
                let view_type = view_type_of(template)?
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "View".to_string());
                ctx.unused(
                    template,
                    &usage,
                    "View Template",
                    attrs([
                        ("view_type", view_type),
                        ("note", "May be used for future views".to_string()),
                    ]),
                )
            }),
        ))
    }
}

/// Filters applied to no view or template.
pub struct FilterOracle;

impl ReachabilityOracle for FilterOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let views = ctx.doc.elements(EntityKind::View)?;
        let usage: UsageSet = views
            .iter()
            .flat_map(|view| view.relation(Relation::Filters).iter().copied())
            .collect();

        let filters = ctx.doc.elements(EntityKind::ParameterFilter)?;
        Ok(collect_items(
            "filters",
            filters
                .iter()
                .map(|filter| ctx.unused(filter, &usage, "View Filter", BTreeMap::new())),
        ))
    }
}

/// Sheets with no placed views or schedules.
pub struct EmptySheetOracle;

impl ReachabilityOracle for EmptySheetOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let sheets = ctx.doc.elements(EntityKind::Sheet)?;
        Ok(collect_items(
            "empty_sheets",
            sheets.iter().map(|sheet| {
                ctx.check_protection(sheet)?;
                if !sheet.relation(Relation::PlacedViews).is_empty() {
                    return Err(SkipReason::InUse);
                }
                let number = sheet.text(Param::SheetNumber).unwrap_or("N/A");
                Ok(ctx.item(sheet, "Empty Sheet", attrs([("number", number.to_string())])))
            }),
        ))
    }
}

/// Schedules not placed on any sheet. Revision schedules live inside title blocks and are skipped.
pub struct ScheduleOracle;

impl ReachabilityOracle for ScheduleOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let placed = placed_on_sheets(ctx)?;
        let schedules = ctx.doc.elements(EntityKind::Schedule)?;

        Ok(collect_items(
            "unused_schedules",
            schedules.iter().map(|schedule| {
                let category = schedule.text(Param::ScheduleCategory).unwrap_or("Schedule");
                if category.eq_ignore_ascii_case("revisions") {
                    return Err(SkipReason::NotApplicable);
                }
                ctx.unused(
                    schedule,
                    &placed,
                    "Schedule",
                    attrs([
                        ("schedule_category", category.to_string()),
                        ("status", "Not on any sheet".to_string()),
                    ]),
                )
            }),
        ))
    }
}

/// Non-template views of one type that no sheet places.
///
/// Backs both the legend category and the per-type unreferenced view categories.
pub struct UnplacedViewOracle {
    label: &'static str,
    view_type: ViewType,
    item_type: &'static str,
}

impl UnplacedViewOracle {
    pub fn new(label: &'static str, view_type: ViewType, item_type: &'static str) -> Self {
        Self {
            label,
            view_type,
            item_type,
        }
    }

    pub fn legends() -> Self {
        Self::new("legend_views", ViewType::Legend, "Legend View")
    }

    fn candidate(&self, view: &Element) -> Result<(), SkipReason> {
        if view.is(Param::IsTemplate) {
            return Err(SkipReason::NotApplicable);
        }
        if view_type_of(view)? != Some(self.view_type) {
            return Err(SkipReason::NotApplicable);
        }
        // Browser-organisation views such as "{3D}" belong to the application.
        let name = view.display_name().unwrap_or("");
        if name.starts_with('{') && name.ends_with('}') {
            return Err(SkipReason::NotApplicable);
        }
        Ok(())
    }
}

impl ReachabilityOracle for UnplacedViewOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let placed = placed_on_sheets(ctx)?;
        let views = ctx.doc.elements(EntityKind::View)?;

        Ok(collect_items(
            self.label,
            views.iter().map(|view| {
                self.candidate(view)?;
                ctx.unused(
                    view,
                    &placed,
                    self.item_type,
                    attrs([("status", "Not on any sheet".to_string())]),
                )
            }),
        ))
    }
}

/// Views whose names look temporary ("temp", "copy", "wip", ...).
pub struct TempViewOracle;

impl TempViewOracle {
    fn candidate(view: &Element) -> Result<ViewType, SkipReason> {
        if view.is(Param::IsTemplate) {
            return Err(SkipReason::NotApplicable);
        }
        match view_type_of(view)? {
            None | Some(ViewType::DrawingSheet) | Some(ViewType::Schedule) => {
                Err(SkipReason::NotApplicable)
            }
            Some(ViewType::ThreeD) if view.is(Param::IsDefaultView) => {
                Err(SkipReason::NotApplicable)
            }
            Some(view_type) => Ok(view_type),
        }
    }
}

impl ReachabilityOracle for TempViewOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let views = ctx.doc.elements(EntityKind::View)?;

        Ok(collect_items(
            "temp_working_views",
            views.iter().map(|view| {
                let view_type = Self::candidate(view)?;
                ctx.check_protection(view)?;
                let name = view.display_name().unwrap_or("");
                let pattern = match_temp_pattern(name, ctx.temp_view_patterns)
                    .ok_or(SkipReason::NotApplicable)?;
                Ok(ctx.item(
                    view,
                    view_type.as_str(),
                    attrs([
                        ("pattern", pattern.to_string()),
                        ("reason", "Temp/working view pattern".to_string()),
                    ]),
                ))
            }),
        ))
    }
}
