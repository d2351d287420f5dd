use super::{attrs, collect_items, ReachabilityOracle, ScanContext, ScanError, SkipReason, UsageSet};
use crate::document::{DocumentError, Element, Param};
use crate::model::{ElementId, EntityKind, ScanItem};
use ahash::AHashMap;
use tracing::debug;

const DETAIL_ITEMS: &str = "Detail Items";
const PROFILES: &str = "Profiles";

/// Categories whose families are annotation symbols rather than model content.
const ANNOTATION_CATEGORIES: [&str; 4] = [
    "Generic Annotations",
    "Callouts",
    "Text Notes",
    "Dimensions",
];

pub fn is_annotation_category(category: &str) -> bool {
    ANNOTATION_CATEGORIES.contains(&category) || category.ends_with("Tags")
}

/// Which loadable families a [`FamilyOracle`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FamilyScope {
    DetailComponents,
    /// Every categorized family except annotation symbols and profiles.
    Model,
    Annotation,
}

impl FamilyScope {
    fn label(self) -> &'static str {
        match self {
            FamilyScope::DetailComponents => "detail_components",
            FamilyScope::Model => "unused_families",
            FamilyScope::Annotation => "annotation_families",
        }
    }

    fn item_type(self) -> &'static str {
        match self {
            FamilyScope::DetailComponents => "Detail Component",
            FamilyScope::Model => "Family",
            FamilyScope::Annotation => "Annotation",
        }
    }

    fn includes(self, category: &str) -> bool {
        match self {
            FamilyScope::DetailComponents => category == DETAIL_ITEMS,
            FamilyScope::Model => category != PROFILES && !is_annotation_category(category),
            FamilyScope::Annotation => is_annotation_category(category),
        }
    }
}

/// Symbol id to owning family id.
fn symbol_families(symbols: &[Element]) -> AHashMap<ElementId, ElementId> {
    symbols
        .iter()
        .filter_map(|symbol| symbol.family_id.map(|family| (symbol.id, family)))
        .collect()
}

/// Profile types referenced by wall sweeps and reveals.
fn profile_symbols_in_use(ctx: &ScanContext<'_>) -> Result<UsageSet, DocumentError> {
    let mut usage = UsageSet::default();
    for (kind, param) in [
        (EntityKind::WallSweep, Param::SweepProfileId),
        (EntityKind::Reveal, Param::RevealProfileId),
    ] {
        usage.extend(
            ctx.elements_of(&[kind])?
                .iter()
                .filter_map(|host| host.id_param(param)),
        );
    }
    Ok(usage)
}

fn type_counts(symbols: &[Element]) -> AHashMap<ElementId, usize> {
    let mut counts = AHashMap::new();
    for family in symbols.iter().filter_map(|s| s.family_id) {
        *counts.entry(family).or_insert(0) += 1;
    }
    counts
}

/// A family is used when any placed instance's type belongs to it.
pub struct FamilyOracle {
    scope: FamilyScope,
}

impl FamilyOracle {
    pub fn new(scope: FamilyScope) -> Self {
        Self { scope }
    }
}

impl ReachabilityOracle for FamilyOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let symbols = ctx.doc.elements(EntityKind::FamilySymbol)?;
        let owners = symbol_families(&symbols);
        let counts = type_counts(&symbols);

        let instances = ctx.doc.elements(EntityKind::FamilyInstance)?;
        let usage: UsageSet = instances
            .iter()
            .filter_map(|instance| instance.type_id)
            .filter_map(|symbol| owners.get(&symbol).copied())
            .collect();
        debug!("{}: {} families placed", self.scope.label(), usage.len());

        let families = ctx.doc.elements(EntityKind::Family)?;
        Ok(collect_items(
            self.scope.label(),
            families.iter().map(|family| {
                // System families have no category and are never loadable content.
                let category = family.category.as_deref().ok_or(SkipReason::NotApplicable)?;
                if !self.scope.includes(category) {
                    return Err(SkipReason::NotApplicable);
                }
                let type_count = counts.get(&family.id).copied().unwrap_or(0);
                if type_count == 0 {
                    return Err(SkipReason::NotApplicable);
                }
                ctx.unused(
                    family,
                    &usage,
                    self.scope.item_type(),
                    attrs([
                        ("family_category", category.to_string()),
                        ("type_count", type_count.to_string()),
                        ("instance_count", "0".to_string()),
                    ]),
                )
            }),
        ))
    }
}

/// Family types with no placed instance. Profile types count as used by their sweeps and reveals.
pub struct FamilyTypeOracle;

impl ReachabilityOracle for FamilyTypeOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let instances = ctx.doc.elements(EntityKind::FamilyInstance)?;
        let mut usage: UsageSet = instances.iter().filter_map(|i| i.type_id).collect();
        usage.extend(profile_symbols_in_use(ctx)?);

        let families: AHashMap<ElementId, Element> = ctx
            .doc
            .elements(EntityKind::Family)?
            .into_iter()
            .map(|family| (family.id, family))
            .collect();

        let symbols = ctx.doc.elements(EntityKind::FamilySymbol)?;
        Ok(collect_items(
            "unused_family_types",
            symbols.iter().map(|symbol| {
                let family = symbol
                    .family_id
                    .and_then(|id| families.get(&id))
                    .ok_or(SkipReason::NotApplicable)?;
                if family.category.is_none() || family.is(Param::IsInPlace) {
                    return Err(SkipReason::NotApplicable);
                }
                let family_name = family.display_name().unwrap_or("Unknown");
                let category = family.category.as_deref().unwrap_or("Unknown");
                ctx.unused(
                    symbol,
                    &usage,
                    "Family Type",
                    attrs([
                        ("family", family_name.to_string()),
                        ("family_category", category.to_string()),
                    ]),
                )
            }),
        ))
    }
}

/// Profile families referenced by wall sweeps and reveals through their types.
pub struct ProfileFamilyOracle;

impl ReachabilityOracle for ProfileFamilyOracle {
    fn scan(&self, ctx: &ScanContext<'_>) -> Result<Vec<ScanItem>, ScanError> {
        let symbols = ctx.doc.elements(EntityKind::FamilySymbol)?;
        let owners = symbol_families(&symbols);
        let counts = type_counts(&symbols);

        let usage: UsageSet = profile_symbols_in_use(ctx)?
            .iter()
            .filter_map(|symbol| owners.get(symbol).copied())
            .collect();
        debug!("profile_families: {} profiles in use", usage.len());

        let families = ctx.doc.elements(EntityKind::Family)?;
        Ok(collect_items(
            "profile_families",
            families.iter().map(|family| {
                if family.category.as_deref() != Some(PROFILES) {
                    return Err(SkipReason::NotApplicable);
                }
                let type_count = counts.get(&family.id).copied().unwrap_or(0);
                ctx.unused(
                    family,
                    &usage,
                    "Profile",
                    attrs([("type_count", type_count.to_string())]),
                )
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_categories() {
        assert!(is_annotation_category("Door Tags"));
        assert!(is_annotation_category("Generic Annotations"));
        assert!(!is_annotation_category("Furniture"));
        assert!(!is_annotation_category(DETAIL_ITEMS));
    }

    #[test]
    fn test_scope_membership() {
        assert!(FamilyScope::DetailComponents.includes("Detail Items"));
        assert!(FamilyScope::Model.includes("Detail Items"));
        assert!(!FamilyScope::Model.includes("Room Tags"));
        assert!(!FamilyScope::Model.includes(PROFILES));
        assert!(FamilyScope::Annotation.includes("Room Tags"));
    }
}
