//! SQLite persistence backend
//!
//! Manages the progress database (`~/.mindgym/progress.db` unless configured
//! otherwise) with automatic schema migration. Each namespace is one row
//! holding a JSON document.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;

use super::backend::{BackendError, ProgressBackend};

/// Database wrapper, shareable across threads
#[derive(Clone)]
pub struct SqliteBackend {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBackend {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progress db: {}", path.display()))?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory db")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to create progress schema")?;
        drop(conn);
        self.run_migrations()
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn();

        let version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);

        // Migration 2: write counter per namespace
        if version < 2 {
            let has_revision: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('documents') WHERE name = 'revision'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_revision {
                conn.execute_batch("ALTER TABLE documents ADD COLUMN revision INTEGER NOT NULL DEFAULT 0;")?;
            }

            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    /// How many times a namespace has been written
    pub fn revision(&self, namespace: &str) -> Result<u64> {
        let revision: Option<i64> = self
            .conn()
            .query_row(
                "SELECT revision FROM documents WHERE namespace = ?1",
                [namespace],
                |r| r.get(0),
            )
            .optional()?;
        Ok(revision.unwrap_or(0).max(0) as u64)
    }
}

impl ProgressBackend for SqliteBackend {
    fn read(&self, namespace: &str) -> Result<Option<Value>, BackendError> {
        let raw: Option<String> = self
            .conn()
            .query_row(
                "SELECT data FROM documents WHERE namespace = ?1",
                [namespace],
                |r| r.get(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, namespace: &str, data: &Value) -> Result<(), BackendError> {
        let raw = serde_json::to_string(data)?;
        let now = Utc::now().timestamp_millis();

        self.conn().execute(
            r#"
            INSERT INTO documents (namespace, data, updated_at, revision)
            VALUES (?1, ?2, ?3, 1)
            ON CONFLICT(namespace) DO UPDATE SET
                data = ?2, updated_at = ?3, revision = revision + 1
            "#,
            rusqlite::params![namespace, raw, now],
        )?;
        Ok(())
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
INSERT OR IGNORE INTO schema_version VALUES (1);

-- One JSON document per namespace ("user", "settings")
CREATE TABLE IF NOT EXISTS documents (
    namespace TEXT PRIMARY KEY,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
"#;
