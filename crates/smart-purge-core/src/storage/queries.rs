use super::sqlite::SqliteDocument;
use crate::document::{Document, DocumentError, DocumentStore, Element};
use crate::model::{ElementId, EntityKind};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info, trace};

const ELEMENT_COLUMNS: &str = "id, kind, name, category, read_only, pinned, \
     type_id, family_id, design_option_id, params, relations";

const CASCADE_QUERY: &str = "WITH RECURSIVE doomed(id) AS ( \
         SELECT id FROM element WHERE id = ?1 \
         UNION \
         SELECT e.id FROM element e JOIN doomed d \
           ON e.type_id = d.id OR e.family_id = d.id OR e.design_option_id = d.id \
     ) \
     SELECT id FROM doomed";

/// Column values as stored, before JSON and kind decoding.
struct ElementRow {
    id: i64,
    kind: String,
    name: Option<String>,
    category: Option<String>,
    read_only: bool,
    pinned: bool,
    type_id: Option<i64>,
    family_id: Option<i64>,
    design_option_id: Option<i64>,
    params: String,
    relations: String,
}

impl ElementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ElementRow {
            id: row.get(0)?,
            kind: row.get(1)?,
            name: row.get(2)?,
            category: row.get(3)?,
            read_only: row.get(4)?,
            pinned: row.get(5)?,
            type_id: row.get(6)?,
            family_id: row.get(7)?,
            design_option_id: row.get(8)?,
            params: row.get(9)?,
            relations: row.get(10)?,
        })
    }

    fn into_element(self) -> Result<Element, DocumentError> {
        let id = ElementId(self.id);
        let malformed = |reason: String| DocumentError::Malformed { id, reason };

        let kind: EntityKind = self.kind.parse().map_err(malformed)?;
        let params = serde_json::from_str(&self.params)
            .map_err(|e| malformed(format!("params: {}", e)))?;
        let relations = serde_json::from_str(&self.relations)
            .map_err(|e| malformed(format!("relations: {}", e)))?;

        Ok(Element {
            id,
            kind,
            name: self.name,
            category: self.category,
            read_only: self.read_only,
            pinned: self.pinned,
            type_id: self.type_id.map(ElementId),
            family_id: self.family_id.map(ElementId),
            design_option_id: self.design_option_id.map(ElementId),
            params,
            relations,
        })
    }
}

impl SqliteDocument {
    // ── Snapshot import ──────────────────────────────────────────

    /// Insert or update a batch of elements in one transaction.
    /// An update never deletes the row, so re-importing does not trigger cascades.
    /// Foreign keys are checked at commit, so order within the batch is free.
    pub fn import_elements(&self, elements: &[Element]) -> Result<usize, crate::Error> {
        let tx = self.connection().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO element ({}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11) \
                 ON CONFLICT(id) DO UPDATE SET \
                   kind = excluded.kind, name = excluded.name, category = excluded.category, \
                   read_only = excluded.read_only, pinned = excluded.pinned, \
                   type_id = excluded.type_id, family_id = excluded.family_id, \
                   design_option_id = excluded.design_option_id, \
                   params = excluded.params, relations = excluded.relations",
                ELEMENT_COLUMNS
            ))?;
            for element in elements {
                stmt.execute(params![
                    element.id.0,
                    element.kind.as_str(),
                    element.name,
                    element.category,
                    element.read_only,
                    element.pinned,
                    element.type_id.map(|id| id.0),
                    element.family_id.map(|id| id.0),
                    element.design_option_id.map(|id| id.0),
                    serde_json::to_string(&element.params)?,
                    serde_json::to_string(&element.relations)?,
                ])?;
            }
        }
        tx.commit()?;
        info!("Imported {} elements", elements.len());
        Ok(elements.len())
    }

    /// Import a JSON snapshot (an array of elements).
    pub fn import_json(&self, json: &str) -> Result<usize, crate::Error> {
        let elements: Vec<Element> = serde_json::from_str(json)?;
        self.import_elements(&elements)
    }

    pub fn element_count(&self) -> rusqlite::Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM element", [], |row| row.get(0))
    }

    // ── Document metadata ────────────────────────────────────────

    pub fn set_active_view(&self, view_id: Option<ElementId>) -> rusqlite::Result<()> {
        match view_id {
            Some(id) => self.connection().execute(
                "INSERT OR REPLACE INTO document_meta (key, value) VALUES ('active_view', ?1)",
                params![id.0.to_string()],
            )?,
            None => self
                .connection()
                .execute("DELETE FROM document_meta WHERE key = 'active_view'", [])?,
        };
        Ok(())
    }

    /// Record disciplines the model has no data for (e.g. MEP space separators).
    pub fn set_disabled_kinds(&self, kinds: &[EntityKind]) -> Result<(), crate::Error> {
        let tags: Vec<&str> = kinds.iter().map(|kind| kind.as_str()).collect();
        self.connection().execute(
            "INSERT OR REPLACE INTO document_meta (key, value) VALUES ('disabled_kinds', ?1)",
            params![serde_json::to_string(&tags)?],
        )?;
        Ok(())
    }

    fn meta_value(&self, key: &str) -> rusqlite::Result<Option<String>> {
        self.connection()
            .query_row(
                "SELECT value FROM document_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
    }

    fn is_disabled(&self, kind: EntityKind) -> Result<bool, DocumentError> {
        let Some(raw) = self.meta_value("disabled_kinds")? else {
            return Ok(false);
        };
        let tags: Vec<String> =
            serde_json::from_str(&raw).map_err(|e| DocumentError::Transaction(format!(
                "unreadable disabled_kinds metadata: {}",
                e
            )))?;
        Ok(tags.iter().any(|tag| tag == kind.as_str()))
    }
}

impl Document for SqliteDocument {
    fn elements(&self, kind: EntityKind) -> Result<Vec<Element>, DocumentError> {
        if self.is_disabled(kind)? {
            return Err(DocumentError::Unsupported(kind));
        }

        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM element WHERE kind = ?1 ORDER BY id",
            ELEMENT_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![kind.as_str()], ElementRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let elements = rows
            .into_iter()
            .map(ElementRow::into_element)
            .collect::<Result<Vec<_>, _>>()?;
        trace!("Loaded {} {} elements", elements.len(), kind);
        Ok(elements)
    }

    fn element(&self, id: ElementId) -> Result<Option<Element>, DocumentError> {
        let row = self
            .connection()
            .query_row(
                &format!("SELECT {} FROM element WHERE id = ?1", ELEMENT_COLUMNS),
                params![id.0],
                ElementRow::from_row,
            )
            .optional()?;
        row.map(ElementRow::into_element).transpose()
    }

    fn dependents(&self, id: ElementId) -> Result<Vec<ElementId>, DocumentError> {
        let mut stmt = self.connection().prepare(CASCADE_QUERY)?;
        let ids = stmt
            .query_map(params![id.0], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        if ids.is_empty() {
            return Err(DocumentError::NotFound(id));
        }
        Ok(ids.into_iter().map(ElementId).collect())
    }

    fn active_view(&self) -> Result<Option<ElementId>, DocumentError> {
        let Some(raw) = self.meta_value("active_view")? else {
            return Ok(None);
        };
        raw.parse::<i64>()
            .map(|id| Some(ElementId(id)))
            .map_err(|e| DocumentError::Transaction(format!("unreadable active_view: {}", e)))
    }
}

impl DocumentStore for SqliteDocument {
    fn begin(&self, name: &str) -> Result<(), DocumentError> {
        if self.in_transaction.get() {
            return Err(DocumentError::Transaction(format!(
                "cannot start '{}': a transaction is already open",
                name
            )));
        }
        self.connection().execute_batch("BEGIN IMMEDIATE")?;
        self.in_transaction.set(true);
        debug!("Transaction '{}' started", name);
        Ok(())
    }

    fn delete(&self, id: ElementId) -> Result<Vec<ElementId>, DocumentError> {
        if !self.in_transaction.get() {
            return Err(DocumentError::Transaction(
                "delete outside of a transaction".to_string(),
            ));
        }

        let read_only: Option<bool> = self
            .connection()
            .query_row(
                "SELECT read_only FROM element WHERE id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;
        match read_only {
            None => return Err(DocumentError::NotFound(id)),
            Some(true) => {
                return Err(DocumentError::Refused {
                    id,
                    reason: "element is read-only".to_string(),
                })
            }
            Some(false) => {}
        }

        let doomed = self.dependents(id)?;
        self.connection()
            .execute("DELETE FROM element WHERE id = ?1", params![id.0])?;
        trace!("Deleted {} ({} elements with cascade)", id, doomed.len());
        Ok(doomed)
    }

    fn commit(&self) -> Result<(), DocumentError> {
        if !self.in_transaction.get() {
            return Err(DocumentError::Transaction(
                "commit without an open transaction".to_string(),
            ));
        }
        // A failed COMMIT leaves the transaction open; the caller rolls back.
        self.connection().execute_batch("COMMIT")?;
        self.in_transaction.set(false);
        Ok(())
    }

    fn rollback(&self) -> Result<(), DocumentError> {
        if !self.in_transaction.get() {
            return Err(DocumentError::Transaction(
                "rollback without an open transaction".to_string(),
            ));
        }
        self.in_transaction.set(false);
        self.connection().execute_batch("ROLLBACK")?;
        Ok(())
    }
}
