use super::{Document, DocumentError, DocumentStore, Element};
use crate::model::{ElementId, EntityKind};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// In-memory design database.
///
/// Elements are kept in id order so every listing is deterministic. Deleting
/// an element cascades to everything whose type, family or design option is
/// being removed, the same way the real store behaves.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RefCell<BTreeMap<ElementId, Element>>,
    snapshot: RefCell<Option<BTreeMap<ElementId, Element>>>,
    unsupported: BTreeSet<EntityKind>,
    active_view: Option<ElementId>,
    deletes_issued: Cell<usize>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        let doc = Self::new();
        for element in elements {
            doc.insert(element);
        }
        doc
    }

    /// Load a JSON snapshot (an array of elements).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let elements: Vec<Element> = serde_json::from_str(json)?;
        Ok(Self::from_elements(elements))
    }

    /// Mark a discipline as absent, e.g. MEP spaces in an architectural model.
    pub fn without_kind(mut self, kind: EntityKind) -> Self {
        self.unsupported.insert(kind);
        self
    }

    pub fn with_active_view(mut self, view_id: i64) -> Self {
        self.active_view = Some(ElementId(view_id));
        self
    }

    /// Insert or replace an element.
    pub fn insert(&self, element: Element) {
        self.elements.borrow_mut().insert(element.id, element);
    }

    pub fn contains(&self, id: i64) -> bool {
        self.elements.borrow().contains_key(&ElementId(id))
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }

    /// Number of `delete` calls received, successful or not.
    pub fn deletes_issued(&self) -> usize {
        self.deletes_issued.get()
    }

    pub fn in_transaction(&self) -> bool {
        self.snapshot.borrow().is_some()
    }

    fn cascade_set(elements: &BTreeMap<ElementId, Element>, root: ElementId) -> Vec<ElementId> {
        let mut doomed = vec![root];
        let mut seen: BTreeSet<ElementId> = BTreeSet::from([root]);

        loop {
            let before = doomed.len();
            for element in elements.values() {
                if seen.contains(&element.id) {
                    continue;
                }
                let depends = [element.type_id, element.family_id, element.design_option_id]
                    .into_iter()
                    .flatten()
                    .any(|parent| seen.contains(&parent));
                if depends {
                    seen.insert(element.id);
                    doomed.push(element.id);
                }
            }
            if doomed.len() == before {
                break;
            }
        }

        doomed
    }
}

impl Document for MemoryDocument {
    fn elements(&self, kind: EntityKind) -> Result<Vec<Element>, DocumentError> {
        if self.unsupported.contains(&kind) {
            return Err(DocumentError::Unsupported(kind));
        }
        Ok(self
            .elements
            .borrow()
            .values()
            .filter(|element| element.kind == kind)
            .cloned()
            .collect())
    }

    fn element(&self, id: ElementId) -> Result<Option<Element>, DocumentError> {
        Ok(self.elements.borrow().get(&id).cloned())
    }

    fn dependents(&self, id: ElementId) -> Result<Vec<ElementId>, DocumentError> {
        let elements = self.elements.borrow();
        if !elements.contains_key(&id) {
            return Err(DocumentError::NotFound(id));
        }
        Ok(Self::cascade_set(&elements, id))
    }

    fn active_view(&self) -> Result<Option<ElementId>, DocumentError> {
        Ok(self.active_view)
    }
}

impl DocumentStore for MemoryDocument {
    fn begin(&self, name: &str) -> Result<(), DocumentError> {
        let mut snapshot = self.snapshot.borrow_mut();
        if snapshot.is_some() {
            return Err(DocumentError::Transaction(format!(
                "cannot start '{}': a transaction is already open",
                name
            )));
        }
        *snapshot = Some(self.elements.borrow().clone());
        debug!("Transaction '{}' started", name);
        Ok(())
    }

    fn delete(&self, id: ElementId) -> Result<Vec<ElementId>, DocumentError> {
        self.deletes_issued.set(self.deletes_issued.get() + 1);
        if !self.in_transaction() {
            return Err(DocumentError::Transaction(
                "delete outside of a transaction".to_string(),
            ));
        }

        let mut elements = self.elements.borrow_mut();
        let element = elements.get(&id).ok_or(DocumentError::NotFound(id))?;
        if element.read_only {
            return Err(DocumentError::Refused {
                id,
                reason: "element is read-only".to_string(),
            });
        }

        let doomed = Self::cascade_set(&elements, id);
        for doomed_id in &doomed {
            elements.remove(doomed_id);
        }
        trace!("Deleted {} ({} elements with cascade)", id, doomed.len());
        Ok(doomed)
    }

    fn commit(&self) -> Result<(), DocumentError> {
        match self.snapshot.borrow_mut().take() {
            Some(_) => Ok(()),
            None => Err(DocumentError::Transaction(
                "commit without an open transaction".to_string(),
            )),
        }
    }

    fn rollback(&self) -> Result<(), DocumentError> {
        match self.snapshot.borrow_mut().take() {
            Some(saved) => {
                *self.elements.borrow_mut() = saved;
                Ok(())
            }
            None => Err(DocumentError::Transaction(
                "rollback without an open transaction".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Param;

    fn family_with_types() -> MemoryDocument {
        MemoryDocument::from_elements([
            Element::new(1000, EntityKind::Family).named("Desk"),
            Element::new(1001, EntityKind::FamilySymbol).named("1200").in_family(1000),
            Element::new(1002, EntityKind::FamilySymbol).named("1500").in_family(1000),
            Element::new(1003, EntityKind::FamilyInstance).of_type(1002),
            Element::new(2000, EntityKind::Material).named("Oak"),
        ])
    }

    #[test]
    fn test_delete_cascades_through_family_and_type_edges() {
        let doc = family_with_types();
        doc.begin("test").unwrap();
        let removed = doc.delete(ElementId(1000)).unwrap();
        doc.commit().unwrap();

        assert_eq!(removed.len(), 4);
        assert!(!doc.contains(1003));
        assert!(doc.contains(2000));
    }

    #[test]
    fn test_rollback_restores_model() {
        let doc = family_with_types();
        doc.begin("test").unwrap();
        doc.delete(ElementId(1001)).unwrap();
        doc.rollback().unwrap();
        assert!(doc.contains(1001));
        assert_eq!(doc.len(), 5);
    }

    #[test]
    fn test_delete_requires_transaction_and_refuses_read_only() {
        let doc = MemoryDocument::from_elements([Element::new(500, EntityKind::Material)
            .named("Locked")
            .read_only()
            .with_text(Param::MaterialClass, "Generic")]);
        assert!(matches!(
            doc.delete(ElementId(500)),
            Err(DocumentError::Transaction(_))
        ));
        doc.begin("test").unwrap();
        assert!(matches!(
            doc.delete(ElementId(500)),
            Err(DocumentError::Refused { .. })
        ));
        assert!(doc.begin("nested").is_err());
    }

    #[test]
    fn test_unsupported_kind_is_reported() {
        let doc = MemoryDocument::new().without_kind(EntityKind::SpaceSeparator);
        assert!(matches!(
            doc.elements(EntityKind::SpaceSeparator),
            Err(DocumentError::Unsupported(EntityKind::SpaceSeparator))
        ));
        assert!(doc.elements(EntityKind::RoomSeparator).unwrap().is_empty());
    }
}
