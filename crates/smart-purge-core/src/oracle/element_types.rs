use super::{attrs, collect_items, format_number, ReachabilityOracle, ScanContext, ScanError, UsageSet};
use crate::document::{Element, Param, Relation};
use crate::model::{EntityKind, ScanItem};
use std::collections::BTreeMap;
use tracing::debug;

/// Kinds whose instances or types can carry a material.
const MATERIAL_HOLDERS: [EntityKind; 13] = [
    EntityKind::WallType,
    EntityKind::FloorType,
    EntityKind::RoofType,
    EntityKind::FamilySymbol,
    EntityKind::TextNoteType,
    EntityKind::DimensionType,
    EntityKind::CadLinkType,
    EntityKind::GroupType,
    EntityKind::FilledRegionType,
    EntityKind::Wall,
    EntityKind::Floor,
    EntityKind::Roof,
    EntityKind::FamilyInstance,
];

fn collect_ids(elements: &[Element], params: &[Param]) -> UsageSet {
    elements
        .iter()
        .flat_map(|element| params.iter().filter_map(|&p| element.id_param(p)))
        .collect()
}

/// Materials: `MaterialId` parameters plus compound-structure layers.
pub struct MaterialOracle;

impl ReachabilityOracle for MaterialOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let holders = ctx.elements_of(&MATERIAL_HOLDERS)?;
        let mut usage = collect_ids(&holders, &[Param::MaterialId]);
        for holder in &holders {
            usage.extend(
                holder
                    .relation(Relation::CompoundLayers)
                    .iter()
                    .copied()
                    .filter(|id| id.0 > 0),
            );
        }
        debug!("{} materials referenced", usage.len());

        let materials = ctx.doc.elements(EntityKind::Material)?;
        Ok(collect_items(
            "materials",
            materials.iter().map(|material| {
                let class = material.text(Param::MaterialClass).unwrap_or("Unknown");
                ctx.unused(material, &usage, "Material", attrs([("class", class.to_string())]))
            }),
        ))
    }
}

/// Line patterns referenced by line styles (projection or cut).
pub struct LinePatternOracle;

impl ReachabilityOracle for LinePatternOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let styles = ctx.doc.elements(EntityKind::LineStyle)?;
        let usage = collect_ids(
            &styles,
            &[Param::ProjectionLinePatternId, Param::CutLinePatternId],
        );

        let patterns = ctx.doc.elements(EntityKind::LinePattern)?;
        Ok(collect_items(
            "line_patterns",
            patterns.iter().map(|pattern| {
                let kind = pattern.text(Param::PatternKind).unwrap_or("Simple");
                ctx.unused(
                    pattern,
                    &usage,
                    "Line Pattern",
                    attrs([("pattern_type", kind.to_string())]),
                )
            }),
        ))
    }
}

/// Fill patterns referenced by material surface/cut patterns and filled region types.
pub struct FillPatternOracle;

impl ReachabilityOracle for FillPatternOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let materials = ctx.doc.elements(EntityKind::Material)?;
        let mut usage = collect_ids(&materials, &[Param::SurfacePatternId, Param::CutPatternId]);
        let region_types = ctx.elements_of(&[EntityKind::FilledRegionType])?;
        usage.extend(collect_ids(&region_types, &[Param::ForegroundPatternId]));

        let patterns = ctx.doc.elements(EntityKind::FillPattern)?;
        Ok(collect_items(
            "fill_patterns",
            patterns.iter().map(|pattern| {
                let target = pattern.text(Param::PatternTarget).unwrap_or("Drafting");
                ctx.unused(
                    pattern,
                    &usage,
                    "Fill Pattern",
                    attrs([("target", target.to_string())]),
                )
            }),
        ))
    }
}

/// Line styles referenced by detail and model curves.
pub struct LineStyleOracle;

impl ReachabilityOracle for LineStyleOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let curves = ctx.doc.elements(EntityKind::CurveElement)?;
        let usage = collect_ids(&curves, &[Param::LineStyleId]);

        let styles = ctx.doc.elements(EntityKind::LineStyle)?;
        Ok(collect_items(
            "line_styles",
            styles
                .iter()
                .map(|style| ctx.unused(style, &usage, "Line Style", BTreeMap::new())),
        ))
    }
}

/// A type kind is used when at least one placed instance points at it.
pub struct InstanceTypeOracle {
    label: &'static str,
    type_kind: EntityKind,
    instance_kinds: &'static [EntityKind],
    item_type: &'static str,
    ignore_in_place: bool,
    describe: fn(&Element) -> BTreeMap<String, String>,
}

impl InstanceTypeOracle {
    pub fn new(
        label: &'static str,
        type_kind: EntityKind,
        instance_kinds: &'static [EntityKind],
        item_type: &'static str,
    ) -> Self {
        Self {
            label,
            type_kind,
            instance_kinds,
            item_type,
            ignore_in_place: false,
            describe: |_| BTreeMap::new(),
        }
    }

    /// In-place family instances do not count as placements of a system type.
    pub fn ignoring_in_place(mut self) -> Self {
        self.ignore_in_place = true;
        self
    }

    pub fn describing(mut self, describe: fn(&Element) -> BTreeMap<String, String>) -> Self {
        self.describe = describe;
        self
    }

    pub fn text_note_types() -> Self {
        Self::new(
            "text_note_types",
            EntityKind::TextNoteType,
            &[EntityKind::TextNote],
            "Text Note Type",
        )
    }

    pub fn dimension_types() -> Self {
        Self::new(
            "dimension_types",
            EntityKind::DimensionType,
            &[EntityKind::Dimension],
            "Dimension Type",
        )
    }

    pub fn wall_types() -> Self {
        Self::new("wall_types", EntityKind::WallType, &[EntityKind::Wall], "Wall Type")
            .ignoring_in_place()
            .describing(|wall_type| {
                let kind = wall_type.text(Param::WallKind).unwrap_or("Basic");
                let mut out = attrs([("wall_kind", format!("{} Wall", kind))]);
                if let Some(thickness) = wall_type.number(Param::Thickness) {
                    out.insert("thickness".to_string(), format_number(thickness));
                }
                out
            })
    }

    pub fn floor_types() -> Self {
        Self::new("floor_types", EntityKind::FloorType, &[EntityKind::Floor], "Floor Type")
            .ignoring_in_place()
            .describing(thickness_only)
    }

    pub fn roof_types() -> Self {
        Self::new("roof_types", EntityKind::RoofType, &[EntityKind::Roof], "Roof Type")
            .ignoring_in_place()
            .describing(thickness_only)
    }

    pub fn cad_links() -> Self {
        Self::new(
            "cad_links",
            EntityKind::CadLinkType,
            &[EntityKind::ImportInstance],
            "CAD Link Type",
        )
        .describing(|link| {
            let path = link.text(Param::SourcePath).unwrap_or("DWG/DXF/DGN");
            attrs([("source", path.to_string())])
        })
    }

    /// Ids of every type referenced by a placed instance.
    fn usage(&self, ctx: &ScanContext<'_>) -> Result<UsageSet, ScanError> {
        let instances = ctx.elements_of(self.instance_kinds)?;
        Ok(instances
            .iter()
            .filter(|instance| !(self.ignore_in_place && instance.is(Param::IsInPlace)))
            .filter_map(|instance| instance.type_id)
            .collect())
    }
}

fn thickness_only(element: &Element) -> BTreeMap<String, String> {
    element
        .number(Param::Thickness)
        .map(|t| attrs([("thickness", format_number(t))]))
        .unwrap_or_default()
}

impl ReachabilityOracle for InstanceTypeOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let usage = self.usage(ctx)?;
        debug!("{}: {} types placed", self.label, usage.len());

        let types = ctx.doc.elements(self.type_kind)?;
        Ok(collect_items(
            self.label,
            types
                .iter()
                .map(|t| ctx.unused(t, &usage, self.item_type, (self.describe)(t))),
        ))
    }
}
