//! Read and write access to the design database.
//!
//! The database exposes no generic "who references this" query, so scanners
//! work from [`Element`] snapshots and the capability accessors on them.
//! Every accessor returns `Option`; a missing parameter is data, not an error.

pub mod memory;

use crate::model::{ElementId, EntityHandle, EntityKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document has no {0} data")]
    Unsupported(EntityKind),

    #[error("element {0} not found")]
    NotFound(ElementId),

    #[error("element {id} cannot be deleted: {reason}")]
    Refused { id: ElementId, reason: String },

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("malformed element {id}: {reason}")]
    Malformed { id: ElementId, reason: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Fixed-identifier parameters the scanners know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Param {
    MaterialId,
    ViewTemplateId,
    LineStyleId,
    ProjectionLinePatternId,
    CutLinePatternId,
    SurfacePatternId,
    CutPatternId,
    ForegroundPatternId,
    SweepProfileId,
    RevealProfileId,
    OwnerViewId,
    /// Scope box cropping a view.
    ScopeBoxId,
    FamilyName,
    WallKind,
    ViewType,
    Thickness,
    Area,
    UnboundedHeight,
    HasGeometry,
    HasLocation,
    IsTemplate,
    IsInPlace,
    IsLinked,
    IsPrimary,
    IsDefaultView,
    SheetNumber,
    Number,
    OptionSet,
    ScheduleCategory,
    MaterialClass,
    PatternTarget,
    PatternKind,
    StyleType,
    SourcePath,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Id(ElementId),
    Number(f64),
    Text(String),
    Flag(bool),
}

/// Multi-valued edges stored on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Material ids of the layers of a compound structure.
    CompoundLayers,
    /// Views placed on a sheet through viewports or schedule instances.
    PlacedViews,
    /// Filters applied to a view or view template.
    Filters,
    /// Views an elevation marker hosts.
    HostedViews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    FloorPlan,
    CeilingPlan,
    EngineeringPlan,
    AreaPlan,
    Section,
    Elevation,
    Detail,
    DraftingView,
    ThreeD,
    Legend,
    Schedule,
    DrawingSheet,
}

impl ViewType {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewType::FloorPlan => "FloorPlan",
            ViewType::CeilingPlan => "CeilingPlan",
            ViewType::EngineeringPlan => "EngineeringPlan",
            ViewType::AreaPlan => "AreaPlan",
            ViewType::Section => "Section",
            ViewType::Elevation => "Elevation",
            ViewType::Detail => "Detail",
            ViewType::DraftingView => "DraftingView",
            ViewType::ThreeD => "ThreeD",
            ViewType::Legend => "Legend",
            ViewType::Schedule => "Schedule",
            ViewType::DrawingSheet => "DrawingSheet",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let view_type = match s {
            "FloorPlan" => ViewType::FloorPlan,
            "CeilingPlan" => ViewType::CeilingPlan,
            "EngineeringPlan" => ViewType::EngineeringPlan,
            "AreaPlan" => ViewType::AreaPlan,
            "Section" => ViewType::Section,
            "Elevation" => ViewType::Elevation,
            "Detail" => ViewType::Detail,
            "DraftingView" => ViewType::DraftingView,
            "ThreeD" => ViewType::ThreeD,
            "Legend" => ViewType::Legend,
            "Schedule" => ViewType::Schedule,
            "DrawingSheet" => ViewType::DrawingSheet,
            other => return Err(format!("unknown view type '{}'", other)),
        };
        Ok(view_type)
    }
}

/// Snapshot of one element as the document reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub kind: EntityKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub type_id: Option<ElementId>,
    #[serde(default)]
    pub family_id: Option<ElementId>,
    #[serde(default)]
    pub design_option_id: Option<ElementId>,
    #[serde(default)]
    pub params: BTreeMap<Param, ParamValue>,
    #[serde(default)]
    pub relations: BTreeMap<Relation, Vec<ElementId>>,
}

impl Element {
    pub fn new(id: i64, kind: EntityKind) -> Self {
        Self {
            id: ElementId(id),
            kind,
            name: None,
            category: None,
            read_only: false,
            pinned: false,
            type_id: None,
            family_id: None,
            design_option_id: None,
            params: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    pub fn of_type(mut self, type_id: i64) -> Self {
        self.type_id = Some(ElementId(type_id));
        self
    }

    pub fn in_family(mut self, family_id: i64) -> Self {
        self.family_id = Some(ElementId(family_id));
        self
    }

    pub fn in_design_option(mut self, option_id: i64) -> Self {
        self.design_option_id = Some(ElementId(option_id));
        self
    }

    pub fn with_id(mut self, param: Param, id: i64) -> Self {
        self.params.insert(param, ParamValue::Id(ElementId(id)));
        self
    }

    pub fn with_number(mut self, param: Param, value: f64) -> Self {
        self.params.insert(param, ParamValue::Number(value));
        self
    }

    pub fn with_text(mut self, param: Param, value: &str) -> Self {
        self.params.insert(param, ParamValue::Text(value.to_string()));
        self
    }

    pub fn with_flag(mut self, param: Param, value: bool) -> Self {
        self.params.insert(param, ParamValue::Flag(value));
        self
    }

    pub fn with_relation(mut self, relation: Relation, ids: &[i64]) -> Self {
        self.relations
            .insert(relation, ids.iter().copied().map(ElementId).collect());
        self
    }

    pub fn handle(&self) -> EntityHandle {
        EntityHandle::new(self.id, self.kind)
    }

    /// The element's own name, `None` when missing or blank.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// An id-valued parameter. Ids `<= 0` are the database's "invalid id" and read as absent.
    pub fn id_param(&self, param: Param) -> Option<ElementId> {
        match self.params.get(&param) {
            Some(ParamValue::Id(id)) if id.0 > 0 => Some(*id),
            _ => None,
        }
    }

    pub fn number(&self, param: Param) -> Option<f64> {
        match self.params.get(&param) {
            Some(ParamValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, param: Param) -> Option<&str> {
        match self.params.get(&param) {
            Some(ParamValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, param: Param) -> Option<bool> {
        match self.params.get(&param) {
            Some(ParamValue::Flag(value)) => Some(*value),
            _ => None,
        }
    }

    /// Convenience for boolean parameters that default to false.
    pub fn is(&self, param: Param) -> bool {
        self.flag(param).unwrap_or(false)
    }

    pub fn relation(&self, relation: Relation) -> &[ElementId] {
        self.relations
            .get(&relation)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Parsed view type; an unknown string is reported as malformed.
    pub fn view_type(&self) -> Result<Option<ViewType>, DocumentError> {
        match self.text(Param::ViewType) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|reason| DocumentError::Malformed {
                id: self.id,
                reason,
            }),
        }
    }
}

/// Read-only access to the design database.
pub trait Document {
    /// All elements of a kind, in ascending id order.
    fn elements(&self, kind: EntityKind) -> Result<Vec<Element>, DocumentError>;

    /// Resolve one element; `Ok(None)` when it no longer exists.
    fn element(&self, id: ElementId) -> Result<Option<Element>, DocumentError>;

    /// Ids the store would remove if `id` were deleted, `id` included.
    fn dependents(&self, id: ElementId) -> Result<Vec<ElementId>, DocumentError>;

    fn active_view(&self) -> Result<Option<ElementId>, DocumentError>;
}

/// Transactional mutation on top of [`Document`].
///
/// One transaction at a time; `delete` returns every id it removed,
/// cascade included.
pub trait DocumentStore: Document {
    fn begin(&self, name: &str) -> Result<(), DocumentError>;
    fn delete(&self, id: ElementId) -> Result<Vec<ElementId>, DocumentError>;
    fn commit(&self) -> Result<(), DocumentError>;
    fn rollback(&self) -> Result<(), DocumentError>;
}
