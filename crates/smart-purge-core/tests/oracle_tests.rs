use smart_purge_core::config::DEFAULT_TEMP_VIEW_PATTERNS;
use smart_purge_core::document::{Param, Relation, ViewType};
use smart_purge_core::oracle::datums::{
    ElevationMarkerOracle, ScopeBoxOracle, UnnamedReferencePlaneOracle,
};
use smart_purge_core::oracle::element_types::{
    FillPatternOracle, InstanceTypeOracle, LinePatternOracle, LineStyleOracle, MaterialOracle,
};
use smart_purge_core::oracle::families::{
    FamilyOracle, FamilyScope, FamilyTypeOracle, ProfileFamilyOracle,
};
use smart_purge_core::oracle::system::{
    DesignOptionOracle, GroupTypeOracle, ImportInstanceOracle, OrphanedRoomOracle,
    SeparatorOracle,
};
use smart_purge_core::oracle::views::{
    EmptySheetOracle, FilterOracle, ScheduleOracle, TempViewOracle, UnplacedViewOracle,
    ViewTemplateOracle,
};
use smart_purge_core::oracle::{ReachabilityOracle, ScanContext};
use smart_purge_core::{Document, Element, EntityKind, MemoryDocument, ProtectionPolicy, ScanItem};

fn patterns() -> Vec<String> {
    DEFAULT_TEMP_VIEW_PATTERNS.iter().map(|p| p.to_string()).collect()
}

fn scan_with(
    doc: &dyn Document,
    policy: &ProtectionPolicy,
    oracle: &dyn ReachabilityOracle,
) -> Vec<ScanItem> {
    let patterns = patterns();
    let ctx = ScanContext::new(doc, policy, &patterns);
    oracle.scan(&ctx).unwrap()
}

fn scan(doc: &dyn Document, oracle: &dyn ReachabilityOracle) -> Vec<ScanItem> {
    scan_with(doc, &ProtectionPolicy::default(), oracle)
}

fn ids(items: &[ScanItem]) -> Vec<i64> {
    items.iter().map(|item| item.entity.id.value()).collect()
}

fn view(id: i64, name: &str, view_type: &str) -> Element {
    Element::new(id, EntityKind::View)
        .named(name)
        .in_category("Views")
        .with_text(Param::ViewType, view_type)
}

// ── Element types ───────────────────────────────────────────────

#[test]
fn test_material_used_only_by_compound_layer_is_not_reported() {
    let doc = MemoryDocument::from_elements([
        Element::new(1001, EntityKind::Material)
            .named("Concrete")
            .with_text(Param::MaterialClass, "Concrete"),
        Element::new(1002, EntityKind::Material)
            .named("Unused Glass")
            .with_text(Param::MaterialClass, "Glass"),
        Element::new(2000, EntityKind::WallType)
            .named("Ext 300")
            .with_relation(Relation::CompoundLayers, &[1001]),
    ]);

    let items = scan(&doc, &MaterialOracle);
    assert_eq!(ids(&items), vec![1002]);
    assert_eq!(items[0].name(), "Unused Glass");
    assert_eq!(items[0].attribute("class"), Some("Glass"));
    assert!(items[0].can_delete);
}

#[test]
fn test_material_parameter_on_instance_counts_as_use() {
    let doc = MemoryDocument::from_elements([
        Element::new(1001, EntityKind::Material).named("Oak"),
        Element::new(2000, EntityKind::FamilyInstance).with_id(Param::MaterialId, 1001),
    ]);
    assert!(scan(&doc, &MaterialOracle).is_empty());
}

#[test]
fn test_wall_type_reported_until_placed() {
    let doc = MemoryDocument::from_elements([Element::new(3000, EntityKind::WallType)
        .named("Exterior 300")
        .with_text(Param::WallKind, "Basic")
        .with_number(Param::Thickness, 300.0)]);

    let items = scan(&doc, &InstanceTypeOracle::wall_types());
    assert_eq!(ids(&items), vec![3000]);
    assert_eq!(items[0].attribute("wall_kind"), Some("Basic Wall"));
    assert_eq!(items[0].attribute("thickness"), Some("300"));

    doc.insert(Element::new(3100, EntityKind::Wall).of_type(3000));
    assert!(scan(&doc, &InstanceTypeOracle::wall_types()).is_empty());
}

#[test]
fn test_in_place_instances_do_not_use_a_wall_type() {
    let doc = MemoryDocument::from_elements([
        Element::new(3000, EntityKind::WallType).named("Exterior 300"),
        Element::new(3101, EntityKind::Wall)
            .of_type(3000)
            .with_flag(Param::IsInPlace, true),
    ]);
    assert_eq!(ids(&scan(&doc, &InstanceTypeOracle::wall_types())), vec![3000]);
}

#[test]
fn test_default_types_are_protected_unless_disabled() {
    let doc = MemoryDocument::from_elements([
        Element::new(3000, EntityKind::WallType).named("Generic - 200mm"),
        Element::new(3001, EntityKind::FloorType).named("Generic 150"),
        Element::new(3002, EntityKind::FloorType).named("Timber Deck"),
    ]);

    assert!(scan(&doc, &InstanceTypeOracle::wall_types()).is_empty());
    assert_eq!(ids(&scan(&doc, &InstanceTypeOracle::floor_types())), vec![3002]);

    let lenient = ProtectionPolicy::new(100, false);
    assert_eq!(
        ids(&scan_with(&doc, &lenient, &InstanceTypeOracle::wall_types())),
        vec![3000]
    );
}

#[test]
fn test_reserved_and_placeholder_elements_never_reported() {
    let doc = MemoryDocument::from_elements([
        Element::new(42, EntityKind::TextNoteType).named("2.5mm Arial"),
        Element::new(1000, EntityKind::TextNoteType).named("<By Category>"),
        Element::new(1001, EntityKind::TextNoteType),
        Element::new(1002, EntityKind::TextNoteType).named("Locked").read_only(),
        Element::new(1003, EntityKind::TextNoteType).named("3.5mm Arial"),
    ]);
    assert_eq!(ids(&scan(&doc, &InstanceTypeOracle::text_note_types())), vec![1003]);
}

#[test]
fn test_line_and_fill_patterns() {
    let doc = MemoryDocument::from_elements([
        Element::new(1500, EntityKind::LineStyle)
            .named("Hidden Lines")
            .with_id(Param::ProjectionLinePatternId, 1600),
        Element::new(1600, EntityKind::LinePattern).named("Hidden"),
        Element::new(1601, EntityKind::LinePattern)
            .named("Dash Dot Dot")
            .with_text(Param::PatternKind, "Custom"),
        Element::new(1650, EntityKind::Material)
            .named("Brick")
            .with_id(Param::SurfacePatternId, 1700),
        Element::new(1660, EntityKind::FilledRegionType)
            .named("Solid Black")
            .with_id(Param::ForegroundPatternId, 1701),
        Element::new(1700, EntityKind::FillPattern).named("Running Bond"),
        Element::new(1701, EntityKind::FillPattern).named("Solid fill"),
        Element::new(1702, EntityKind::FillPattern)
            .named("Diagonal Up")
            .with_text(Param::PatternTarget, "Model"),
    ]);

    let lines = scan(&doc, &LinePatternOracle);
    assert_eq!(ids(&lines), vec![1601]);
    assert_eq!(lines[0].attribute("pattern_type"), Some("Custom"));

    let fills = scan(&doc, &FillPatternOracle);
    assert_eq!(ids(&fills), vec![1702]);
    assert_eq!(fills[0].attribute("target"), Some("Model"));

    // Hidden Lines is referenced by no curve.
    assert_eq!(ids(&scan(&doc, &LineStyleOracle)), vec![1500]);
    doc.insert(Element::new(1800, EntityKind::CurveElement).with_id(Param::LineStyleId, 1500));
    assert!(scan(&doc, &LineStyleOracle).is_empty());
}

#[test]
fn test_cad_link_types_need_an_import_instance() {
    let doc = MemoryDocument::from_elements([
        Element::new(7000, EntityKind::CadLinkType)
            .named("site.dwg")
            .with_text(Param::SourcePath, "C:/cad/site.dwg"),
        Element::new(7001, EntityKind::CadLinkType).named("survey.dwg"),
        Element::new(7100, EntityKind::ImportInstance)
            .named("survey.dwg")
            .of_type(7001),
    ]);
    let items = scan(&doc, &InstanceTypeOracle::cad_links());
    assert_eq!(ids(&items), vec![7000]);
    assert_eq!(items[0].attribute("source"), Some("C:/cad/site.dwg"));
}

// ── Views and sheets ────────────────────────────────────────────

#[test]
fn test_view_templates_and_filters() {
    let doc = MemoryDocument::from_elements([
        view(4000, "Arch Plan", "FloorPlan").with_flag(Param::IsTemplate, true),
        view(4001, "Level 1", "FloorPlan")
            .with_id(Param::ViewTemplateId, 4000)
            .with_relation(Relation::Filters, &[4500]),
        view(4002, "Old Section Template", "Section").with_flag(Param::IsTemplate, true),
        Element::new(4500, EntityKind::ParameterFilter).named("Fire Rated"),
        Element::new(4501, EntityKind::ParameterFilter).named("Demolished"),
    ]);

    let templates = scan(&doc, &ViewTemplateOracle);
    assert_eq!(ids(&templates), vec![4002]);
    assert_eq!(templates[0].attribute("view_type"), Some("Section"));
    assert_eq!(templates[0].attribute("note"), Some("May be used for future views"));

    let filters = scan(&doc, &FilterOracle);
    assert_eq!(ids(&filters), vec![4501]);
    assert_eq!(filters[0].item_type, "View Filter");
}

#[test]
fn test_sheets_schedules_and_legends() {
    let doc = MemoryDocument::from_elements([
        Element::new(5000, EntityKind::Sheet)
            .named("Plans")
            .with_text(Param::SheetNumber, "A101")
            .with_relation(Relation::PlacedViews, &[4001, 5200]),
        Element::new(5001, EntityKind::Sheet)
            .named("Spare")
            .with_text(Param::SheetNumber, "A999"),
        view(4001, "Level 1", "FloorPlan"),
        view(4002, "Level 2", "FloorPlan"),
        view(4003, "{3D}", "ThreeD"),
        view(4004, "Key Legend", "Legend"),
        Element::new(5200, EntityKind::Schedule).named("Door Schedule"),
        Element::new(5201, EntityKind::Schedule)
            .named("Window Schedule")
            .with_text(Param::ScheduleCategory, "Windows"),
        Element::new(5202, EntityKind::Schedule)
            .named("Revision Schedule")
            .with_text(Param::ScheduleCategory, "Revisions"),
    ]);

    let sheets = scan(&doc, &EmptySheetOracle);
    assert_eq!(ids(&sheets), vec![5001]);
    assert_eq!(sheets[0].attribute("number"), Some("A999"));

    let schedules = scan(&doc, &ScheduleOracle);
    assert_eq!(ids(&schedules), vec![5201]);
    assert_eq!(schedules[0].attribute("schedule_category"), Some("Windows"));

    assert_eq!(ids(&scan(&doc, &UnplacedViewOracle::legends())), vec![4004]);

    let plans = UnplacedViewOracle::new("unreferenced_floor_plans", ViewType::FloorPlan, "Floor Plan");
    assert_eq!(ids(&scan(&doc, &plans)), vec![4002]);

    let three_d = UnplacedViewOracle::new("unreferenced_3d_views", ViewType::ThreeD, "3D View");
    assert!(scan(&doc, &three_d).is_empty(), "browser views are not candidates");
}

#[test]
fn test_temp_views_match_by_name() {
    let doc = MemoryDocument::from_elements([
        view(4100, "Copy of Level 1", "FloorPlan"),
        view(4101, "Contemporary Lobby", "FloorPlan"),
        view(4102, "Section - WIP", "Section"),
        view(4103, "temp template", "FloorPlan").with_flag(Param::IsTemplate, true),
        view(4104, "test 3D", "ThreeD").with_flag(Param::IsDefaultView, true),
        Element::new(4105, EntityKind::View).named("temp no type"),
    ]);

    let items = scan(&doc, &TempViewOracle);
    assert_eq!(ids(&items), vec![4100, 4102]);
    assert_eq!(items[0].attribute("pattern"), Some("copy"));
    assert_eq!(items[0].item_type, "FloorPlan");
    assert_eq!(items[1].attribute("pattern"), Some("wip"));
    assert_eq!(items[1].attribute("reason"), Some("Temp/working view pattern"));
}

#[test]
fn test_active_view_and_pinned_elements_are_blocked() {
    let doc = MemoryDocument::from_elements([
        view(4100, "Copy of Level 1", "FloorPlan"),
        view(4101, "Working Elevation", "Elevation").pinned(),
    ])
    .with_active_view(4100);

    let items = scan(&doc, &TempViewOracle);
    assert_eq!(ids(&items), vec![4100, 4101]);
    assert!(!items[0].can_delete);
    assert_eq!(items[0].block_reason.as_deref(), Some("Active view"));
    assert!(!items[1].can_delete);
    assert_eq!(items[1].block_reason.as_deref(), Some("Element is pinned"));
}

#[test]
fn test_malformed_view_is_skipped_without_aborting() {
    let doc = MemoryDocument::from_elements([
        view(4100, "Copy of Level 1", "Hologram"),
        view(4101, "Copy of Level 2", "FloorPlan"),
    ]);
    assert_eq!(ids(&scan(&doc, &TempViewOracle)), vec![4101]);
}

// ── Families ────────────────────────────────────────────────────

fn family_model() -> MemoryDocument {
    MemoryDocument::from_elements([
        Element::new(6000, EntityKind::Family)
            .named("Detail Break")
            .in_category("Detail Items"),
        Element::new(6001, EntityKind::FamilySymbol)
            .named("Standard")
            .in_category("Detail Items")
            .in_family(6000),
        Element::new(6100, EntityKind::Family).named("Desk").in_category("Furniture"),
        Element::new(6101, EntityKind::FamilySymbol)
            .named("1200")
            .in_category("Furniture")
            .in_family(6100),
        Element::new(6102, EntityKind::FamilySymbol)
            .named("1500")
            .in_category("Furniture")
            .in_family(6100),
        Element::new(6103, EntityKind::FamilyInstance).of_type(6102),
        Element::new(6200, EntityKind::Family).named("Door Tag").in_category("Door Tags"),
        Element::new(6201, EntityKind::FamilySymbol)
            .named("Standard")
            .in_category("Door Tags")
            .in_family(6200),
        Element::new(6300, EntityKind::Family).named("Empty Family").in_category("Furniture"),
        Element::new(6400, EntityKind::Family)
            .named("Custom Stair")
            .in_category("Stairs")
            .with_flag(Param::IsInPlace, true),
        Element::new(6401, EntityKind::FamilySymbol)
            .named("Custom Stair")
            .in_family(6400),
        Element::new(6500, EntityKind::Family).named("Sill Profile").in_category("Profiles"),
        Element::new(6501, EntityKind::FamilySymbol).named("50x20").in_family(6500),
        Element::new(6502, EntityKind::WallSweep).with_id(Param::SweepProfileId, 6501),
        Element::new(6600, EntityKind::Family).named("Old Profile").in_category("Profiles"),
        Element::new(6601, EntityKind::FamilySymbol).named("Default").in_family(6600),
    ])
}

#[test]
fn test_family_scopes() {
    let doc = family_model();

    let details = scan(&doc, &FamilyOracle::new(FamilyScope::DetailComponents));
    assert_eq!(ids(&details), vec![6000]);
    assert_eq!(details[0].attribute("type_count"), Some("1"));

    // Desk is placed, the empty family has no types, profiles and tags are other scopes.
    let model = scan(&doc, &FamilyOracle::new(FamilyScope::Model));
    assert_eq!(ids(&model), vec![6000, 6400]);

    let annotations = scan(&doc, &FamilyOracle::new(FamilyScope::Annotation));
    assert_eq!(ids(&annotations), vec![6200]);
    assert_eq!(annotations[0].item_type, "Annotation");
}

#[test]
fn test_family_types_name_and_in_place_exclusion() {
    let doc = family_model();
    let items = scan(&doc, &FamilyTypeOracle);

    // 6102 is placed; 6401 belongs to an in-place family; 6501 is the sweep's profile.
    assert_eq!(ids(&items), vec![6001, 6101, 6201, 6601]);
    let desk = items.iter().find(|i| i.entity.id.value() == 6101).unwrap();
    assert_eq!(desk.name(), "Desk: 1200");
    assert_eq!(desk.attribute("family"), Some("Desk"));
    assert_eq!(desk.attribute("family_category"), Some("Furniture"));
}

#[test]
fn test_profile_families_used_by_sweeps() {
    let doc = family_model().without_kind(EntityKind::Reveal);
    let items = scan(&doc, &ProfileFamilyOracle);
    assert_eq!(ids(&items), vec![6600]);
    assert_eq!(items[0].item_type, "Profile");
}

#[test]
fn test_profile_types_used_by_sweeps_and_reveals_are_in_use() {
    let doc = MemoryDocument::from_elements([
        Element::new(6600, EntityKind::Family).named("Cornice").in_category("Profiles"),
        Element::new(6601, EntityKind::FamilySymbol).named("150mm").in_family(6600),
        Element::new(6602, EntityKind::FamilySymbol).named("200mm").in_family(6600),
        Element::new(6603, EntityKind::FamilySymbol).named("250mm").in_family(6600),
        Element::new(6700, EntityKind::WallSweep).with_id(Param::SweepProfileId, 6601),
        Element::new(6701, EntityKind::Reveal).with_id(Param::RevealProfileId, 6602),
    ]);

    assert!(scan(&doc, &ProfileFamilyOracle).is_empty());
    assert_eq!(ids(&scan(&doc, &FamilyTypeOracle)), vec![6603]);
}

// ── Model cleanup ───────────────────────────────────────────────

#[test]
fn test_scope_boxes_used_by_views_only() {
    let doc = MemoryDocument::from_elements([
        Element::new(9000, EntityKind::ScopeBox).named("Tower"),
        Element::new(9001, EntityKind::ScopeBox).named("Podium"),
        Element::new(9002, EntityKind::ScopeBox).named("Site"),
        view(4000, "Level 1 - Tower", "FloorPlan").with_id(Param::ScopeBoxId, 9000),
        // A template's scope box does not keep it alive.
        view(4001, "Podium Template", "FloorPlan")
            .with_flag(Param::IsTemplate, true)
            .with_id(Param::ScopeBoxId, 9001),
    ]);
    let items = scan(&doc, &ScopeBoxOracle);
    assert_eq!(ids(&items), vec![9001, 9002]);
    assert_eq!(items[0].item_type, "Scope Box");
    assert_eq!(items[0].name(), "Podium");
}

#[test]
fn test_elevation_markers_without_live_views() {
    let doc = MemoryDocument::from_elements([
        view(4200, "North", "Elevation"),
        Element::new(9100, EntityKind::ElevationMarker).with_relation(Relation::HostedViews, &[4200]),
        // 4201 was deleted; the marker is left behind.
        Element::new(9101, EntityKind::ElevationMarker).with_relation(Relation::HostedViews, &[4201]),
        Element::new(9102, EntityKind::ElevationMarker),
        Element::new(9103, EntityKind::ElevationMarker).pinned(),
    ]);
    let items = scan(&doc, &ElevationMarkerOracle);
    assert_eq!(ids(&items), vec![9101, 9102, 9103]);
    assert_eq!(items[0].name(), "Elevation Marker (9101)");
    assert!(items[0].can_delete);
    assert_eq!(items[2].block_reason.as_deref(), Some("Element is pinned"));
}

#[test]
fn test_only_unnamed_reference_planes_are_reported() {
    let doc = MemoryDocument::from_elements([
        Element::new(9200, EntityKind::ReferencePlane).named("Grid A Offset"),
        Element::new(9201, EntityKind::ReferencePlane),
        Element::new(9202, EntityKind::ReferencePlane).named("   "),
        Element::new(9203, EntityKind::ReferencePlane).read_only(),
    ]);
    let items = scan(&doc, &UnnamedReferencePlaneOracle);
    assert_eq!(ids(&items), vec![9201, 9202]);
    assert_eq!(items[0].name(), "Reference Plane (9201)");
    assert_eq!(items[0].item_type, "Reference Plane");
}

// ── System cleanup ──────────────────────────────────────────────

#[test]
fn test_imports_are_listed_with_placement() {
    let doc = MemoryDocument::from_elements([
        view(4001, "Level 1", "FloorPlan"),
        Element::new(7100, EntityKind::ImportInstance)
            .named("site.dwg")
            .with_id(Param::OwnerViewId, 4001),
        Element::new(7101, EntityKind::ImportInstance)
            .named("massing.dwg")
            .with_flag(Param::IsLinked, true),
    ]);
    let items = scan(&doc, &ImportInstanceOracle);
    assert_eq!(ids(&items), vec![7100, 7101]);
    assert_eq!(items[0].attribute("placement"), Some("In view: Level 1"));
    assert_eq!(items[0].item_type, "Import Instance");
    assert_eq!(items[1].attribute("placement"), Some("3D (Model Space)"));
    assert_eq!(items[1].item_type, "CAD Link");
}

#[test]
fn test_group_types_and_design_options() {
    let doc = MemoryDocument::from_elements([
        Element::new(8000, EntityKind::GroupType)
            .named("Bathroom Layout")
            .in_category("Model Groups"),
        Element::new(8001, EntityKind::GroupType)
            .named("Door Detail")
            .in_category("Detail Groups"),
        Element::new(8002, EntityKind::GroupType)
            .named("Kitchen")
            .in_category("Model Groups"),
        Element::new(8100, EntityKind::Group).of_type(8002),
        Element::new(8500, EntityKind::DesignOption)
            .named("Option A")
            .with_flag(Param::IsPrimary, true),
        Element::new(8501, EntityKind::DesignOption)
            .named("Option B")
            .with_text(Param::OptionSet, "Entrance"),
        Element::new(8502, EntityKind::DesignOption).named("Option C"),
        Element::new(8600, EntityKind::Wall).in_design_option(8502),
    ]);

    let groups = scan(&doc, &GroupTypeOracle);
    assert_eq!(ids(&groups), vec![8000, 8001]);
    assert_eq!(groups[0].item_type, "Model Group");
    assert_eq!(groups[1].item_type, "Detail Group");

    let options = scan(&doc, &DesignOptionOracle);
    assert_eq!(ids(&options), vec![8501]);
    assert_eq!(options[0].attribute("option_set"), Some("Entrance"));
}

#[test]
fn test_separators_degrade_without_space_data() {
    let doc = MemoryDocument::from_elements([
        Element::new(9000, EntityKind::RoomSeparator)
            .with_flag(Param::HasGeometry, true)
            .with_flag(Param::HasLocation, true),
        Element::new(9001, EntityKind::RoomSeparator).named("Room Separation"),
        Element::new(9002, EntityKind::RoomSeparator)
            .named("Room Separation")
            .with_flag(Param::HasGeometry, true),
    ])
    .without_kind(EntityKind::SpaceSeparator);

    let items = scan(&doc, &SeparatorOracle);
    assert_eq!(ids(&items), vec![9001, 9002]);
    assert_eq!(items[0].attribute("issue"), Some("No geometry"));
    assert_eq!(items[1].attribute("issue"), Some("No location"));
    assert_eq!(items[0].item_type, "Room Separator");
}

#[test]
fn test_orphaned_rooms_and_areas() {
    let doc = MemoryDocument::from_elements([
        Element::new(9500, EntityKind::Room)
            .named("Office")
            .with_text(Param::Number, "101")
            .with_flag(Param::HasLocation, true)
            .with_number(Param::Area, 12.5)
            .with_number(Param::UnboundedHeight, 2.7),
        Element::new(9501, EntityKind::Room)
            .named("Store")
            .with_text(Param::Number, "102"),
        Element::new(9502, EntityKind::Room)
            .named("Lobby")
            .with_flag(Param::HasLocation, true)
            .with_number(Param::Area, 0.0),
        Element::new(9503, EntityKind::Room)
            .named("Void")
            .with_flag(Param::HasLocation, true)
            .with_number(Param::Area, 4.0),
        Element::new(9600, EntityKind::Area)
            .named("Gross")
            .with_flag(Param::HasLocation, true),
    ]);

    let items = scan(&doc, &OrphanedRoomOracle);
    assert_eq!(ids(&items), vec![9501, 9502, 9503, 9600]);
    let status: Vec<_> = items.iter().map(|i| i.attribute("status").unwrap()).collect();
    assert_eq!(
        status,
        vec![
            "Not placed",
            "Not enclosed (no area)",
            "Invalid height",
            "Not enclosed (no area)"
        ]
    );
    assert_eq!(items[0].attribute("number"), Some("102"));
}

// ── Contract ────────────────────────────────────────────────────

#[test]
fn test_reported_materials_are_never_referenced() {
    let doc = MemoryDocument::from_elements([
        Element::new(1001, EntityKind::Material).named("A"),
        Element::new(1002, EntityKind::Material).named("B"),
        Element::new(1003, EntityKind::Material).named("C"),
        Element::new(1004, EntityKind::Material).named("D"),
        Element::new(2000, EntityKind::WallType)
            .named("W1")
            .with_id(Param::MaterialId, 1001)
            .with_relation(Relation::CompoundLayers, &[1002]),
        Element::new(2001, EntityKind::Roof).with_id(Param::MaterialId, 1003),
    ]);

    let items = scan(&doc, &MaterialOracle);
    for item in &items {
        for kind in EntityKind::ALL {
            for holder in doc.elements(kind).unwrap() {
                assert_ne!(holder.id_param(Param::MaterialId), Some(item.entity.id));
                assert!(!holder.relation(Relation::CompoundLayers).contains(&item.entity.id));
            }
        }
    }
    assert_eq!(ids(&items), vec![1004]);
}

#[test]
fn test_repeated_scans_are_identical() {
    let doc = family_model();
    let oracle = FamilyTypeOracle;
    let first = scan(&doc, &oracle);
    let second = scan(&doc, &oracle);
    assert_eq!(first, second);
}
