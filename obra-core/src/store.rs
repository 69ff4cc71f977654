//! SQLite persistence for projects and daily reports.
//!
//! All access goes through an explicitly constructed [`Database`] handle;
//! the process entry point owns its lifecycle and passes it to the stores.

use rusqlite::Connection;
use std::path::Path;

use crate::error::StoreError;

pub mod project;
pub mod report;

pub use project::ProjectStore;
pub use report::ReportStore;

/// Process-wide storage handle wrapping a single SQLite connection.
///
/// Dropping the handle closes the connection.
#[derive(Debug)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file, creating parent directories as
    /// needed, and bring the schema up to date.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// In-memory database, used by tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;

            CREATE TABLE IF NOT EXISTS projects (
              id INTEGER PRIMARY KEY,
              name TEXT NOT NULL,
              address TEXT,
              start_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS reports (
              id INTEGER PRIMARY KEY,
              project_id INTEGER NOT NULL REFERENCES projects(id),
              date TEXT NOT NULL,
              weather TEXT NOT NULL,
              period TEXT NOT NULL,
              activities TEXT NOT NULL,
              notes TEXT NOT NULL,
              UNIQUE(project_id, date)
            );

            CREATE TABLE IF NOT EXISTS report_crew (
              report_id INTEGER NOT NULL REFERENCES reports(id),
              role TEXT NOT NULL,
              count INTEGER NOT NULL CHECK (count > 0)
            );

            CREATE TABLE IF NOT EXISTS report_photos (
              report_id INTEGER NOT NULL REFERENCES reports(id),
              file_name TEXT NOT NULL,
              description TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}
