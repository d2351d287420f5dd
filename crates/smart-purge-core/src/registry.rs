//! Static catalogue of purge categories and the groups that organise them.
//!
//! Topology is fixed for a session; [`build_groups`] creates fresh state each time.

use crate::document::ViewType;
use crate::model::ScanItem;
use crate::oracle::datums::{ElevationMarkerOracle, ScopeBoxOracle, UnnamedReferencePlaneOracle};
use crate::oracle::element_types::{
    FillPatternOracle, InstanceTypeOracle, LinePatternOracle, LineStyleOracle, MaterialOracle,
};
use crate::oracle::families::{FamilyOracle, FamilyScope, FamilyTypeOracle, ProfileFamilyOracle};
use crate::oracle::system::{
    DesignOptionOracle, GroupTypeOracle, ImportInstanceOracle, OrphanedRoomOracle, SeparatorOracle,
};
use crate::oracle::views::{
    EmptySheetOracle, FilterOracle, ScheduleOracle, TempViewOracle, UnplacedViewOracle,
    ViewTemplateOracle,
};
use crate::oracle::ReachabilityOracle;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    /// Results deserve a second look before purging.
    Warning,
}

impl fmt::Display for Safety {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Safety::Safe => f.write_str("SAFE"),
            Safety::Warning => f.write_str("WARNING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => f.write_str("HIGH"),
            Priority::Medium => f.write_str("MEDIUM"),
            Priority::Low => f.write_str("LOW"),
        }
    }
}

/// One purgeable kind of content: an oracle plus its display metadata and last scan result.
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub safety: Safety,
    pub priority: Priority,
    pub default_selected: bool,
    oracle: Box<dyn ReachabilityOracle>,
    scanned: bool,
    items: Vec<ScanItem>,
    scan_error: Option<String>,
}

impl fmt::Debug for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.id)
            .field("scanned", &self.scanned)
            .field("items", &self.items.len())
            .field("scan_error", &self.scan_error)
            .finish()
    }
}

impl Category {
    pub fn oracle(&self) -> &dyn ReachabilityOracle {
        self.oracle.as_ref()
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    pub fn items(&self) -> &[ScanItem] {
        &self.items
    }

    pub fn scan_error(&self) -> Option<&str> {
        self.scan_error.as_deref()
    }

    pub fn is_dangerous(&self) -> bool {
        self.safety == Safety::Warning
    }

    pub fn unused_count(&self) -> usize {
        self.items.len()
    }

    pub fn status_text(&self) -> String {
        if !self.scanned {
            "Not scanned".to_string()
        } else if let Some(err) = &self.scan_error {
            format!("Error: {}", err)
        } else if self.items.is_empty() {
            "All in use".to_string()
        } else {
            format!("{} unused", self.items.len())
        }
    }

    pub fn display_text(&self) -> String {
        if self.scanned {
            format!("{} {} ({})", self.icon, self.name, self.unused_count())
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }

    pub fn reset(&mut self) {
        self.scanned = false;
        self.items.clear();
        self.scan_error = None;
    }

    pub(crate) fn record_items(&mut self, items: Vec<ScanItem>) {
        self.scanned = true;
        self.items = items;
        self.scan_error = None;
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.scanned = true;
        self.items.clear();
        self.scan_error = Some(message);
    }
}

/// Named collection of categories. Owns no state beyond its members.
#[derive(Debug)]
pub struct Group {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub categories: Vec<Category>,
}

impl Group {
    pub fn scanned_count(&self) -> usize {
        self.categories.iter().filter(|c| c.is_scanned()).count()
    }

    pub fn unused_count(&self) -> usize {
        self.categories.iter().map(Category::unused_count).sum()
    }

    pub fn status_text(&self) -> String {
        let scanned = self.scanned_count();
        if scanned == 0 {
            "Not scanned".to_string()
        } else if scanned == self.categories.len() {
            "All scanned".to_string()
        } else {
            format!("{}/{} scanned", scanned, self.categories.len())
        }
    }

    pub fn display_text(&self) -> String {
        if self.scanned_count() > 0 {
            format!("{} {} ({})", self.icon, self.name, self.unused_count())
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

struct CategoryDef {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    description: &'static str,
    default_selected: bool,
    safety: Safety,
    priority: Priority,
    oracle: fn() -> Box<dyn ReachabilityOracle>,
}

struct GroupDef {
    id: &'static str,
    name: &'static str,
    icon: &'static str,
    description: &'static str,
    categories: &'static [CategoryDef],
}

macro_rules! category {
    ($id:literal, $name:literal, $icon:literal, $desc:literal, $default:expr, $safety:ident, $priority:ident, $oracle:expr) => {
        CategoryDef {
            id: $id,
            name: $name,
            icon: $icon,
            description: $desc,
            default_selected: $default,
            safety: Safety::$safety,
            priority: Priority::$priority,
            oracle: || -> Box<dyn ReachabilityOracle> { Box::new($oracle) },
        }
    };
}

const ELEMENT_TYPES: &[CategoryDef] = &[
    category!("materials", "Materials", "🎨", "Materials not used by any elements or types", true, Safe, High, MaterialOracle),
    category!("line_patterns", "Line Patterns", "━━", "Line patterns not used by any line style", true, Safe, High, LinePatternOracle),
    category!("fill_patterns", "Fill Patterns", "▓▓", "Fill patterns not used by materials or filled regions", true, Safe, High, FillPatternOracle),
    category!("text_note_types", "Text Note Types", "📝", "Text note types not used by any text notes", true, Safe, High, InstanceTypeOracle::text_note_types()),
    category!("dimension_types", "Dimension Types", "📏", "Dimension types not used by any dimensions", true, Safe, High, InstanceTypeOracle::dimension_types()),
    category!("line_styles", "Line Styles", "─", "Line styles not used by model or detail lines", true, Safe, High, LineStyleOracle),
    category!("wall_types", "Wall Types", "🧱", "Wall types with no instances in the model", false, Safe, Medium, InstanceTypeOracle::wall_types()),
    category!("floor_types", "Floor Types", "▢", "Floor types with no instances in the model", false, Safe, Medium, InstanceTypeOracle::floor_types()),
    category!("roof_types", "Roof Types", "⌂", "Roof types with no instances in the model", false, Safe, Medium, InstanceTypeOracle::roof_types()),
];

const VIEWS_SHEETS: &[CategoryDef] = &[
    category!("view_templates", "View Templates", "📋", "View templates not applied to any views", false, Warning, Medium, ViewTemplateOracle),
    category!("filters", "Filters", "🔍", "Filters not applied to any views or templates", false, Warning, Medium, FilterOracle),
    category!("empty_sheets", "Empty Sheets", "📄", "Sheets with no views placed on them", true, Safe, Medium, EmptySheetOracle),
    category!("unused_schedules", "Unused Schedules", "📊", "Schedules not placed on any sheets", false, Safe, Medium, ScheduleOracle),
    category!("legend_views", "Legend Views", "🗺", "Legend views not placed on any sheets", false, Safe, Low, UnplacedViewOracle::legends()),
    category!("temp_working_views", "Temp/Working Views", "🔧", "Views with temporary naming patterns (temp, copy, wip, old)", false, Warning, Low, TempViewOracle),
];

const FAMILIES: &[CategoryDef] = &[
    category!("detail_components", "Detail Components", "🔩", "Detail component families with no instances placed", true, Safe, Medium, FamilyOracle::new(FamilyScope::DetailComponents)),
    category!("unused_families", "Unused Families", "👥", "Families with no instances placed in the model", false, Safe, Medium, FamilyOracle::new(FamilyScope::Model)),
    category!("unused_family_types", "Unused Family Types", "📐", "Family types with no instances placed", false, Safe, Medium, FamilyTypeOracle),
    category!("annotation_families", "Annotation Families", "📝", "Annotation families (tags, symbols) not used in views", false, Warning, Low, FamilyOracle::new(FamilyScope::Annotation)),
    category!("profile_families", "Profile Families", "〰", "Profile families not used by wall sweeps or reveals", false, Safe, Low, ProfileFamilyOracle),
];

const SYSTEM_CLEANUP: &[CategoryDef] = &[
    category!("import_symbols", "Import Symbols", "📥", "CAD imports placed in the model, for review", true, Safe, Medium, ImportInstanceOracle),
    category!("cad_links", "CAD Links", "🔗", "CAD link types with no instances placed", true, Safe, Medium, InstanceTypeOracle::cad_links()),
    category!("unused_groups", "Unused Groups", "👥", "Model and detail groups with no instances placed", true, Safe, Medium, GroupTypeOracle),
    category!("design_options", "Design Options", "🎨", "Design options with no elements", false, Safe, Low, DesignOptionOracle),
    category!("unplaced_separators", "Unplaced Separators", "🚪", "Room and space separation lines that are unplaced or invalid", true, Safe, Medium, SeparatorOracle),
    category!("orphaned_rooms", "Orphaned Rooms/Areas", "🏚", "Rooms and areas that are not enclosed or not placed", true, Warning, High, OrphanedRoomOracle),
];

const MODEL_CLEANUP: &[CategoryDef] = &[
    category!("orphaned_elevation_markers", "Orphaned Elevation Markers", "🎯", "Elevation markers with no views", false, Safe, Low, ElevationMarkerOracle),
    category!("unused_scope_boxes", "Unused Scope Boxes", "⬚", "Scope boxes not used by any view", false, Safe, Low, ScopeBoxOracle),
    category!("unnamed_reference_planes", "Unnamed Reference Planes", "┆", "Reference planes without names", false, Warning, Low, UnnamedReferencePlaneOracle),
];

const UNREFERENCED_VIEWS: &[CategoryDef] = &[
    category!("unreferenced_3d_views", "3D Views", "🧊", "3D views not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_3d_views", ViewType::ThreeD, "3D View")),
    category!("unreferenced_area_plans", "Area Plans", "📐", "Area plans not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_area_plans", ViewType::AreaPlan, "Area Plan")),
    category!("unreferenced_detail_views", "Detail Views", "🔎", "Detail views not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_detail_views", ViewType::Detail, "Detail View")),
    category!("unreferenced_drafting_views", "Drafting Views", "✏", "Drafting views not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_drafting_views", ViewType::DraftingView, "Drafting View")),
    category!("unreferenced_elevations", "Elevations", "⬆", "Elevations not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_elevations", ViewType::Elevation, "Elevation")),
    category!("unreferenced_engineering_plans", "Engineering Plans", "🏗", "Structural plans not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_engineering_plans", ViewType::EngineeringPlan, "Engineering Plan")),
    category!("unreferenced_floor_plans", "Floor Plans", "🗺", "Floor plans not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_floor_plans", ViewType::FloorPlan, "Floor Plan")),
    category!("unreferenced_ceiling_plans", "Ceiling Plans", "💡", "Reflected ceiling plans not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_ceiling_plans", ViewType::CeilingPlan, "Ceiling Plan")),
    category!("unreferenced_sections", "Sections", "✂", "Sections not placed on any sheet", false, Warning, Low, UnplacedViewOracle::new("unreferenced_sections", ViewType::Section, "Section")),
];

const GROUPS: &[GroupDef] = &[
    GroupDef {
        id: "element_types",
        name: "Element Types",
        icon: "📦",
        description: "Materials, patterns, text styles, dimension styles, and system types",
        categories: ELEMENT_TYPES,
    },
    GroupDef {
        id: "views_sheets",
        name: "Views & Sheets",
        icon: "👁",
        description: "View templates, filters, empty sheets, schedules, and legend views",
        categories: VIEWS_SHEETS,
    },
    GroupDef {
        id: "families",
        name: "Families & Types",
        icon: "🏛",
        description: "Detail components, unused families, family types, annotations, and profiles",
        categories: FAMILIES,
    },
    GroupDef {
        id: "system_cleanup",
        name: "System Cleanup",
        icon: "🧹",
        description: "Import symbols, CAD links, unused groups, design options, separators, orphaned rooms",
        categories: SYSTEM_CLEANUP,
    },
    GroupDef {
        id: "model_cleanup",
        name: "Model Deep Cleanup",
        icon: "🔬",
        description: "Orphaned elevation markers, unused scope boxes, unnamed reference planes",
        categories: MODEL_CLEANUP,
    },
    GroupDef {
        id: "unreferenced_views",
        name: "Unreferenced Views",
        icon: "🗂",
        description: "Views of each type that are not placed on any sheet",
        categories: UNREFERENCED_VIEWS,
    },
];

/// Build every group with unscanned categories, in display order.
pub fn build_groups() -> Vec<Group> {
    GROUPS
        .iter()
        .map(|def| Group {
            id: def.id,
            name: def.name,
            icon: def.icon,
            description: def.description,
            categories: def
                .categories
                .iter()
                .map(|c| Category {
                    id: c.id,
                    name: c.name,
                    icon: c.icon,
                    description: c.description,
                    safety: c.safety,
                    priority: c.priority,
                    default_selected: c.default_selected,
                    oracle: (c.oracle)(),
                    scanned: false,
                    items: Vec::new(),
                    scan_error: None,
                })
                .collect(),
        })
        .collect()
}

pub fn find_category<'g>(groups: &'g [Group], id: &str) -> Option<&'g Category> {
    groups
        .iter()
        .flat_map(|g| g.categories.iter())
        .find(|c| c.id == id)
}

pub fn find_group<'g>(groups: &'g [Group], id: &str) -> Option<&'g Group> {
    groups.iter().find(|g| g.id == id)
}

/// Mutable references to the categories whose ids are listed, in registry order.
pub fn select_categories<'g>(groups: &'g mut [Group], ids: &[&str]) -> Vec<&'g mut Category> {
    groups
        .iter_mut()
        .flat_map(|g| g.categories.iter_mut())
        .filter(|c| ids.contains(&c.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_layout() {
        let groups = build_groups();
        let counts: Vec<usize> = groups.iter().map(|g| g.categories.len()).collect();
        assert_eq!(counts, vec![9, 6, 5, 6, 3, 9]);

        let ids: HashSet<&str> = groups
            .iter()
            .flat_map(|g| g.categories.iter().map(|c| c.id))
            .collect();
        assert_eq!(ids.len(), 38, "category ids must be unique");
    }

    #[test]
    fn test_fresh_categories_are_unscanned() {
        let groups = build_groups();
        let materials = find_category(&groups, "materials").unwrap();
        assert!(!materials.is_scanned());
        assert_eq!(materials.status_text(), "Not scanned");
        assert_eq!(find_group(&groups, "families").unwrap().status_text(), "Not scanned");
        assert!(find_category(&groups, "orphaned_rooms").unwrap().is_dangerous());
    }

    #[test]
    fn test_status_text_follows_scan_state() {
        let mut groups = build_groups();
        {
            let mut selected = select_categories(&mut groups, &["line_styles", "filters"]);
            selected[0].record_items(Vec::new());
            selected[1].record_error("no views".to_string());
        }
        let line_styles = find_category(&groups, "line_styles").unwrap();
        assert_eq!(line_styles.status_text(), "All in use");
        assert_eq!(line_styles.display_text(), "─ Line Styles (0)");
        let filters = find_category(&groups, "filters").unwrap();
        assert_eq!(filters.status_text(), "Error: no views");
        assert!(filters.is_scanned());
        assert_eq!(
            find_group(&groups, "element_types").unwrap().status_text(),
            "1/9 scanned"
        );
    }
}
