//! Display names for reported elements.
//!
//! Names are resolved in priority order and the first non-blank result wins:
//! 1. loadable types render as `"{family}: {type}"`
//! 2. the element's own name; a type whose name repeats its family name gets
//!    an `[ID:n]` suffix so rows stay distinguishable
//! 3. a kind-specific number (sheet number, room number)
//! 4. `"{kind} ({id})"`, which cannot fail

use crate::document::{Document, Element, Param};
use crate::model::{EntityKind, EntityMetadata};
use std::collections::BTreeMap;
use tracing::trace;

pub fn resolve_name(doc: &dyn Document, element: &Element) -> String {
    if let Some(name) = loadable_type_name(doc, element) {
        return name;
    }

    if let Some(name) = element.display_name() {
        if element.kind.is_type() && element.text(Param::FamilyName).map(str::trim) == Some(name) {
            return format!("{} [ID:{}]", name, element.id);
        }
        return name.to_string();
    }

    if let Some(number) = kind_number(element) {
        return number;
    }

    format!("{} ({})", element.kind.label(), element.id)
}

/// Category label, falling back to the kind label for uncategorized elements.
pub fn resolve_category(element: &Element) -> String {
    element
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| element.kind.label())
        .to_string()
}

pub fn resolve_metadata(
    doc: &dyn Document,
    element: &Element,
    attributes: BTreeMap<String, String>,
) -> EntityMetadata {
    EntityMetadata {
        name: resolve_name(doc, element),
        category: resolve_category(element),
        attributes,
    }
}

fn loadable_type_name(doc: &dyn Document, element: &Element) -> Option<String> {
    let family_id = element.family_id?;
    let type_name = element.display_name();

    // An unresolvable family is not fatal; fall through to the FamilyName parameter.
    let family_name = match doc.element(family_id) {
        Ok(Some(family)) => family.display_name().map(str::to_string),
        Ok(None) => None,
        Err(e) => {
            trace!("Family {} of {} unreadable: {}", family_id, element.id, e);
            None
        }
    }
    .or_else(|| {
        element
            .text(Param::FamilyName)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    });

    match (family_name, type_name) {
        (Some(family), Some(type_name)) => Some(format!("{}: {}", family, type_name)),
        (Some(family), None) => Some(family),
        (None, Some(type_name)) => Some(type_name.to_string()),
        (None, None) => None,
    }
}

fn kind_number(element: &Element) -> Option<String> {
    let param = match element.kind {
        EntityKind::Sheet => Param::SheetNumber,
        EntityKind::Room | EntityKind::Area => Param::Number,
        _ => return None,
    };
    element
        .text(param)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| format!("{} {}", element.kind.label(), n))
}
