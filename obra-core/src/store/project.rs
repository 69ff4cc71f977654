//! CRUD for the `projects` table.

use chrono::Local;
use rusqlite::{OptionalExtension, params};
use tracing::debug;

use super::Database;
use crate::error::StoreError;
use crate::model::{NewProject, Project};

const COLUMNS: &str = "id, name, address, start_date";

/// Store for construction projects. Stateless; every call takes the handle.
pub struct ProjectStore;

impl ProjectStore {
    /// Register a new project. The start date is recorded as today.
    pub fn create(db: &Database, input: &NewProject) -> Result<Project, StoreError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreError::InvalidInput("project name must not be empty"));
        }
        let address = input
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_owned);

        let start_date = Local::now().date_naive();
        db.conn.execute(
            "INSERT INTO projects (name, address, start_date) VALUES (?1, ?2, ?3)",
            params![name, address, start_date],
        )?;
        let id = db.conn.last_insert_rowid();
        debug!(id, name, "project created");

        Ok(Project {
            id,
            name: name.to_owned(),
            address,
            start_date,
        })
    }

    pub fn get(db: &Database, id: i64) -> Result<Project, StoreError> {
        db.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM projects WHERE id = ?1"),
                [id],
                row_to_project,
            )
            .optional()?
            .ok_or(StoreError::UnknownProject(id))
    }

    /// All projects in insertion order. An empty list is a valid state.
    pub fn list(db: &Database) -> Result<Vec<Project>, StoreError> {
        let mut stmt = db
            .conn
            .prepare(&format!("SELECT {COLUMNS} FROM projects ORDER BY id"))?;
        let rows = stmt.query_map([], row_to_project)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Delete a project. Refused while daily reports still reference it, so
    /// no report can be orphaned.
    pub fn delete(db: &Database, id: i64) -> Result<(), StoreError> {
        let reports: i64 = db.conn.query_row(
            "SELECT COUNT(*) FROM reports WHERE project_id = ?1",
            [id],
            |row| row.get(0),
        )?;
        if reports > 0 {
            return Err(StoreError::ProjectHasReports { id, reports });
        }

        let affected = db.conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        if affected == 0 {
            return Err(StoreError::UnknownProject(id));
        }
        debug!(id, "project deleted");
        Ok(())
    }
}

fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        start_date: row.get(3)?,
    })
}
