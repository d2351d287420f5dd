use rusqlite::{Connection, Result};
use std::cell::Cell;
use tracing::debug;

const SCHEMA_VERSION: i64 = 1;

/// Design database persisted in SQLite.
///
/// Cascade deletion is delegated to the `ON DELETE CASCADE` foreign keys on
/// `type_id`, `family_id` and `design_option_id`.
pub struct SqliteDocument {
    conn: Connection,
    pub(crate) in_transaction: Cell<bool>,
}

impl SqliteDocument {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let doc = SqliteDocument {
            conn,
            in_transaction: Cell::new(false),
        };
        doc.configure_pragmas()?;
        doc.migrate_schema()?;
        Ok(doc)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let doc = SqliteDocument {
            conn,
            in_transaction: Cell::new(false),
        };
        doc.configure_pragmas()?;
        doc.migrate_schema()?;
        Ok(doc)
    }

    fn configure_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("SQLite pragmas configured (WAL mode, foreign keys on)");
        Ok(())
    }

    /// Check schema version and migrate if needed.
    /// Older layouts are dropped; the model is re-imported from its snapshot.
    fn migrate_schema(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version < SCHEMA_VERSION {
            debug!(
                "Schema version {} < {}, dropping all tables and recreating",
                version, SCHEMA_VERSION
            );
            self.conn.execute_batch(
                "DROP TABLE IF EXISTS document_meta;
                 DROP TABLE IF EXISTS element;",
            )?;
        }

        self.conn.execute_batch(include_str!("schema.sql"))?;
        debug!("SQLite schema initialized (version {})", SCHEMA_VERSION);
        Ok(())
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn truncate_all(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM document_meta;
             DELETE FROM element;",
        )?;
        debug!("All tables truncated");
        Ok(())
    }
}
