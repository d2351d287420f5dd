use crate::config::PurgeConfig;
use crate::document::{Element, Param};
use crate::model::EntityKind;
use std::fmt;

const DEFAULT_WALL_TYPES: &[&str] = &[
    "Basic Wall",
    "Generic - 200mm",
    "Generic - 300mm",
    "Generic",
    "Exterior - Brick on CMU",
    "Exterior - Brick on Mtl. Stud",
    "Interior - Partition",
];

const DEFAULT_FLOOR_TYPES: &[&str] = &[
    "Generic - 200mm",
    "Generic - 300mm",
    "Generic - 125mm",
    "Generic",
    "Floor",
];

const DEFAULT_ROOF_TYPES: &[&str] = &["Generic - 300mm", "Generic - 400mm", "Generic", "Basic Roof"];

/// Why an element is kept out of the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    ReservedId,
    PlaceholderName,
    ReadOnly,
    DefaultName,
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Protection::ReservedId => "System element",
            Protection::PlaceholderName => "Built-in placeholder",
            Protection::ReadOnly => "Read-only element",
            Protection::DefaultName => "Default type",
        };
        f.write_str(text)
    }
}

/// Classifies system and default elements that are never purge candidates.
#[derive(Debug, Clone)]
pub struct ProtectionPolicy {
    reserved_id_threshold: i64,
    protect_defaults: bool,
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self::from_config(&PurgeConfig::default())
    }
}

impl ProtectionPolicy {
    pub fn new(reserved_id_threshold: i64, protect_defaults: bool) -> Self {
        Self {
            reserved_id_threshold,
            protect_defaults,
        }
    }

    pub fn from_config(config: &PurgeConfig) -> Self {
        Self::new(config.reserved_id_threshold, config.protect_defaults)
    }

    pub fn protects_defaults(&self) -> bool {
        self.protect_defaults
    }

    /// First matching protection rule, if any.
    pub fn classify(&self, element: &Element) -> Option<Protection> {
        if element.id.0 < self.reserved_id_threshold {
            return Some(Protection::ReservedId);
        }
        match element.name.as_deref().map(str::trim) {
            None | Some("") if !name_optional(element.kind) => {
                return Some(Protection::PlaceholderName)
            }
            Some(name) if name.starts_with('<') && name.ends_with('>') => {
                return Some(Protection::PlaceholderName)
            }
            _ => {}
        }
        if element.read_only {
            return Some(Protection::ReadOnly);
        }
        if self.protect_defaults && is_default_type(element) {
            return Some(Protection::DefaultName);
        }
        None
    }

    pub fn is_protected(&self, element: &Element) -> bool {
        self.classify(element).is_some()
    }

    /// The system checks alone, without the default-name allowlist.
    pub fn is_system(&self, element: &Element) -> bool {
        matches!(
            self.classify(element),
            Some(Protection::ReservedId | Protection::PlaceholderName | Protection::ReadOnly)
        )
    }
}

/// Kinds that are routinely left unnamed, so a blank name is not a placeholder.
fn name_optional(kind: EntityKind) -> bool {
    matches!(kind, EntityKind::ElevationMarker | EntityKind::ReferencePlane)
}

fn default_names(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::WallType => DEFAULT_WALL_TYPES,
        EntityKind::FloorType => DEFAULT_FLOOR_TYPES,
        EntityKind::RoofType => DEFAULT_ROOF_TYPES,
        _ => &[],
    }
}

fn is_default_type(element: &Element) -> bool {
    let Some(name) = element.display_name() else {
        return false;
    };
    let name = name.to_lowercase();

    if default_names(element.kind)
        .iter()
        .any(|default| name.contains(&default.to_lowercase()))
    {
        return true;
    }

    element.kind == EntityKind::WallType
        && element.text(Param::WallKind) == Some("Basic")
        && (name.contains("generic") || name.contains("basic"))
}
