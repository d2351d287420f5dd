use super::{attrs, collect_items, format_number, ReachabilityOracle, ScanContext, ScanError, SkipReason, UsageSet};
use crate::document::{DocumentError, Element, Param};
use crate::model::{EntityKind, ScanItem};
use tracing::debug;

/// Every CAD import, for review. Imports are content, not references, so all are listed.
pub struct ImportInstanceOracle;

impl ImportInstanceOracle {
    fn placement(ctx: &ScanContext<'_>, import: &Element) -> String {
        let Some(view_id) = import.id_param(Param::OwnerViewId) else {
            return "3D (Model Space)".to_string();
        };
        let view_name = match ctx.doc.element(view_id) {
            Ok(Some(view)) => view.display_name().map(str::to_string),
            _ => None,
        };
        format!(
            "In view: {}",
            view_name.unwrap_or_else(|| view_id.to_string())
        )
    }
}

impl ReachabilityOracle for ImportInstanceOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let imports = ctx.doc.elements(EntityKind::ImportInstance)?;
        Ok(collect_items(
            "import_symbols",
            imports.iter().map(|import| {
                ctx.check_protection(import)?;
                let flavour = if import.is(Param::IsLinked) {
                    "CAD Link"
                } else {
                    "Import Instance"
                };
                Ok(ctx.item(
                    import,
                    flavour,
                    attrs([
                        ("placement", Self::placement(ctx, import)),
                        ("import_type", "DWG/DXF Import".to_string()),
                    ]),
                ))
            }),
        ))
    }
}

/// Group types with no placed group.
pub struct GroupTypeOracle;

impl ReachabilityOracle for GroupTypeOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let groups = ctx.doc.elements(EntityKind::Group)?;
        let usage: UsageSet = groups.iter().filter_map(|g| g.type_id).collect();

        let group_types = ctx.doc.elements(EntityKind::GroupType)?;
        Ok(collect_items(
            "unused_groups",
            group_types.iter().map(|group_type| {
                let detail = group_type
                    .category
                    .as_deref()
                    .is_some_and(|c| c.contains("Detail"));
                let item_type = if detail { "Detail Group" } else { "Model Group" };
                ctx.unused(
                    group_type,
                    &usage,
                    item_type,
                    attrs([("instances", "0".to_string())]),
                )
            }),
        ))
    }
}

/// Secondary design options that contain no elements.
pub struct DesignOptionOracle;

impl ReachabilityOracle for DesignOptionOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let mut usage = UsageSet::default();
        for kind in EntityKind::ALL {
            if kind == EntityKind::DesignOption {
                continue;
            }
            match ctx.doc.elements(kind) {
                Ok(elements) => usage.extend(elements.iter().filter_map(|e| e.design_option_id)),
                Err(DocumentError::Unsupported(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!("{} design options contain elements", usage.len());

        let options = ctx.doc.elements(EntityKind::DesignOption)?;
        Ok(collect_items(
            "design_options",
            options.iter().map(|option| {
                if option.is(Param::IsPrimary) {
                    return Err(SkipReason::NotApplicable);
                }
                let option_set = option.text(Param::OptionSet).unwrap_or("Unknown Set");
                ctx.unused(
                    option,
                    &usage,
                    "Design Option",
                    attrs([
                        ("option_set", option_set.to_string()),
                        ("elements", "0".to_string()),
                    ]),
                )
            }),
        ))
    }
}

/// Room and space separation lines without geometry or location.
pub struct SeparatorOracle;

impl SeparatorOracle {
    fn issue(line: &Element) -> Option<&'static str> {
        if !line.is(Param::HasGeometry) {
            Some("No geometry")
        } else if !line.is(Param::HasLocation) {
            Some("No location")
        } else {
            None
        }
    }
}

impl ReachabilityOracle for SeparatorOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        // Space separators only exist in models with MEP data; elements_of skips them otherwise.
        let lines = ctx.elements_of(&[EntityKind::RoomSeparator, EntityKind::SpaceSeparator])?;
        Ok(collect_items(
            "unplaced_separators",
            lines.iter().map(|line| {
                ctx.check_protection(line)?;
                let issue = Self::issue(line).ok_or(SkipReason::InUse)?;
                Ok(ctx.item(
                    line,
                    line.kind.label(),
                    attrs([("status", "Unplaced".to_string()), ("issue", issue.to_string())]),
                ))
            }),
        ))
    }
}

/// Rooms and areas that are unplaced or not enclosed.
pub struct OrphanedRoomOracle;

impl OrphanedRoomOracle {
    fn room_issue(room: &Element) -> Option<&'static str> {
        if !room.is(Param::HasLocation) {
            return Some("Not placed");
        }
        if room.number(Param::Area).map_or(true, |a| a <= 0.0) {
            return Some("Not enclosed (no area)");
        }
        if room.number(Param::UnboundedHeight).map_or(true, |h| h <= 0.0) {
            return Some("Invalid height");
        }
        None
    }

    fn area_issue(area: &Element) -> Option<&'static str> {
        if !area.is(Param::HasLocation) {
            return Some("Not placed");
        }
        if area.number(Param::Area).map_or(true, |a| a <= 0.0) {
            return Some("Not enclosed (no area)");
        }
        None
    }
}

impl ReachabilityOracle for OrphanedRoomOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let spaces = ctx.elements_of(&[EntityKind::Room, EntityKind::Area])?;
        Ok(collect_items(
            "orphaned_rooms",
            spaces.iter().map(|space| {
                ctx.check_protection(space)?;
                let issue = match space.kind {
                    EntityKind::Room => Self::room_issue(space),
                    _ => Self::area_issue(space),
                }
                .ok_or(SkipReason::InUse)?;

                let mut attributes = attrs([
                    ("status", issue.to_string()),
                    (
                        "number",
                        space.text(Param::Number).unwrap_or("N/A").to_string(),
                    ),
                ]);
                if let Some(area) = space.number(Param::Area) {
                    attributes.insert("area".to_string(), format_number(area));
                }
                Ok(ctx.item(space, space.kind.label(), attributes))
            }),
        ))
    }
}
