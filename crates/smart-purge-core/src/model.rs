use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Raw identifier of an element in the design database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl ElementId {
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Every kind of element the scanners read or report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Material,
    FillPattern,
    LinePattern,
    LineStyle,
    CurveElement,
    TextNoteType,
    TextNote,
    DimensionType,
    Dimension,
    WallType,
    Wall,
    FloorType,
    Floor,
    RoofType,
    Roof,
    Family,
    FamilySymbol,
    FamilyInstance,
    ImportInstance,
    CadLinkType,
    GroupType,
    Group,
    DesignOption,
    View,
    Sheet,
    Schedule,
    ParameterFilter,
    FilledRegionType,
    FilledRegion,
    WallSweep,
    Reveal,
    RoomSeparator,
    SpaceSeparator,
    Room,
    Area,
    ScopeBox,
    ElevationMarker,
    ReferencePlane,
}

impl EntityKind {
    pub const ALL: [EntityKind; 38] = [
        EntityKind::Material,
        EntityKind::FillPattern,
        EntityKind::LinePattern,
        EntityKind::LineStyle,
        EntityKind::CurveElement,
        EntityKind::TextNoteType,
        EntityKind::TextNote,
        EntityKind::DimensionType,
        EntityKind::Dimension,
        EntityKind::WallType,
        EntityKind::Wall,
        EntityKind::FloorType,
        EntityKind::Floor,
        EntityKind::RoofType,
        EntityKind::Roof,
        EntityKind::Family,
        EntityKind::FamilySymbol,
        EntityKind::FamilyInstance,
        EntityKind::ImportInstance,
        EntityKind::CadLinkType,
        EntityKind::GroupType,
        EntityKind::Group,
        EntityKind::DesignOption,
        EntityKind::View,
        EntityKind::Sheet,
        EntityKind::Schedule,
        EntityKind::ParameterFilter,
        EntityKind::FilledRegionType,
        EntityKind::FilledRegion,
        EntityKind::WallSweep,
        EntityKind::Reveal,
        EntityKind::RoomSeparator,
        EntityKind::SpaceSeparator,
        EntityKind::Room,
        EntityKind::Area,
        EntityKind::ScopeBox,
        EntityKind::ElevationMarker,
        EntityKind::ReferencePlane,
    ];

    /// Stable snake_case tag, used as the storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Material => "material",
            EntityKind::FillPattern => "fill_pattern",
            EntityKind::LinePattern => "line_pattern",
            EntityKind::LineStyle => "line_style",
            EntityKind::CurveElement => "curve_element",
            EntityKind::TextNoteType => "text_note_type",
            EntityKind::TextNote => "text_note",
            EntityKind::DimensionType => "dimension_type",
            EntityKind::Dimension => "dimension",
            EntityKind::WallType => "wall_type",
            EntityKind::Wall => "wall",
            EntityKind::FloorType => "floor_type",
            EntityKind::Floor => "floor",
            EntityKind::RoofType => "roof_type",
            EntityKind::Roof => "roof",
            EntityKind::Family => "family",
            EntityKind::FamilySymbol => "family_symbol",
            EntityKind::FamilyInstance => "family_instance",
            EntityKind::ImportInstance => "import_instance",
            EntityKind::CadLinkType => "cad_link_type",
            EntityKind::GroupType => "group_type",
            EntityKind::Group => "group",
            EntityKind::DesignOption => "design_option",
            EntityKind::View => "view",
            EntityKind::Sheet => "sheet",
            EntityKind::Schedule => "schedule",
            EntityKind::ParameterFilter => "parameter_filter",
            EntityKind::FilledRegionType => "filled_region_type",
            EntityKind::FilledRegion => "filled_region",
            EntityKind::WallSweep => "wall_sweep",
            EntityKind::Reveal => "reveal",
            EntityKind::RoomSeparator => "room_separator",
            EntityKind::SpaceSeparator => "space_separator",
            EntityKind::Room => "room",
            EntityKind::Area => "area",
            EntityKind::ScopeBox => "scope_box",
            EntityKind::ElevationMarker => "elevation_marker",
            EntityKind::ReferencePlane => "reference_plane",
        }
    }

    /// Human readable label, also the category fallback for uncategorized elements.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Material => "Material",
            EntityKind::FillPattern => "Fill Pattern",
            EntityKind::LinePattern => "Line Pattern",
            EntityKind::LineStyle => "Line Style",
            EntityKind::CurveElement => "Line",
            EntityKind::TextNoteType => "Text Note Type",
            EntityKind::TextNote => "Text Note",
            EntityKind::DimensionType => "Dimension Type",
            EntityKind::Dimension => "Dimension",
            EntityKind::WallType => "Wall Type",
            EntityKind::Wall => "Wall",
            EntityKind::FloorType => "Floor Type",
            EntityKind::Floor => "Floor",
            EntityKind::RoofType => "Roof Type",
            EntityKind::Roof => "Roof",
            EntityKind::Family => "Family",
            EntityKind::FamilySymbol => "Family Type",
            EntityKind::FamilyInstance => "Family Instance",
            EntityKind::ImportInstance => "Import Instance",
            EntityKind::CadLinkType => "CAD Link Type",
            EntityKind::GroupType => "Group Type",
            EntityKind::Group => "Group",
            EntityKind::DesignOption => "Design Option",
            EntityKind::View => "View",
            EntityKind::Sheet => "Sheet",
            EntityKind::Schedule => "Schedule",
            EntityKind::ParameterFilter => "Filter",
            EntityKind::FilledRegionType => "Filled Region Type",
            EntityKind::FilledRegion => "Filled Region",
            EntityKind::WallSweep => "Wall Sweep",
            EntityKind::Reveal => "Reveal",
            EntityKind::RoomSeparator => "Room Separator",
            EntityKind::SpaceSeparator => "Space Separator",
            EntityKind::Room => "Room",
            EntityKind::Area => "Area",
            EntityKind::ScopeBox => "Scope Box",
            EntityKind::ElevationMarker => "Elevation Marker",
            EntityKind::ReferencePlane => "Reference Plane",
        }
    }

    /// True for kinds that describe a type other elements are instances of.
    pub fn is_type(self) -> bool {
        matches!(
            self,
            EntityKind::TextNoteType
                | EntityKind::DimensionType
                | EntityKind::WallType
                | EntityKind::FloorType
                | EntityKind::RoofType
                | EntityKind::FamilySymbol
                | EntityKind::CadLinkType
                | EntityKind::GroupType
                | EntityKind::FilledRegionType
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown entity kind '{}'", s))
    }
}

/// An element id carrying its kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    pub id: ElementId,
    pub kind: EntityKind,
}

impl EntityHandle {
    pub fn new(id: ElementId, kind: EntityKind) -> Self {
        Self { id, kind }
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Display metadata resolved for an emitted candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub name: String,
    pub category: String,
    /// Kind-specific attributes (thickness, pattern target, family name, ...).
    pub attributes: BTreeMap<String, String>,
}

/// One candidate reported by a scanner.
///
/// `can_delete == false` always comes with a `block_reason`; construct through
/// [`ScanItem::deletable`] or [`ScanItem::blocked`] to keep that true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanItem {
    pub entity: EntityHandle,
    pub metadata: EntityMetadata,
    pub can_delete: bool,
    pub block_reason: Option<String>,
    /// Short type description shown next to the name ("Basic Wall", "Legend View", ...).
    pub item_type: String,
}

impl ScanItem {
    pub fn deletable(entity: EntityHandle, metadata: EntityMetadata, item_type: &str) -> Self {
        Self {
            entity,
            metadata,
            can_delete: true,
            block_reason: None,
            item_type: item_type.to_string(),
        }
    }

    pub fn blocked(
        entity: EntityHandle,
        metadata: EntityMetadata,
        item_type: &str,
        reason: &str,
    ) -> Self {
        let reason = if reason.trim().is_empty() {
            "Cannot delete"
        } else {
            reason
        };
        Self {
            entity,
            metadata,
            can_delete: false,
            block_reason: Some(reason.to_string()),
            item_type: item_type.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.metadata.attributes.get(key).map(|v| v.as_str())
    }
}

/// Result of one attempted deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurgeOutcome {
    pub entity: EntityHandle,
    pub name: String,
    pub success: bool,
    pub reason: Option<String>,
}

impl PurgeOutcome {
    pub fn succeeded(entity: EntityHandle, name: &str) -> Self {
        Self {
            entity,
            name: name.to_string(),
            success: true,
            reason: None,
        }
    }

    pub fn failed(entity: EntityHandle, name: &str, reason: String) -> Self {
        Self {
            entity,
            name: name.to_string(),
            success: false,
            reason: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags_round_trip_through_from_str() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert!("spaceship".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_blocked_item_always_has_reason() {
        let handle = EntityHandle::new(ElementId(500), EntityKind::View);
        let metadata = EntityMetadata {
            name: "Level 1".to_string(),
            category: "Views".to_string(),
            attributes: BTreeMap::new(),
        };
        let item = ScanItem::blocked(handle, metadata, "Floor Plan", "   ");
        assert!(!item.can_delete);
        assert_eq!(item.block_reason.as_deref(), Some("Cannot delete"));
    }
}
