//! Upsert-by-(project, date) for the daily-report aggregate.
//!
//! A report is saved as one unit: the header row is updated in place (or
//! inserted) and both child sets are replaced wholesale. The whole sequence
//! runs inside a single transaction, so a failure partway leaves the
//! previously stored aggregate untouched.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::Database;
use crate::error::StoreError;
use crate::model::{CrewEntry, CrewRole, DailyReport, PhotoRef, ReportDraft};

/// Store for daily reports. Stateless; every call takes the handle.
pub struct ReportStore;

impl ReportStore {
    /// Load the full aggregate for one (project, date), if present.
    ///
    /// Read-only: loading twice returns identical data.
    pub fn find_by_project_and_date(
        db: &Database,
        project_id: i64,
        date: NaiveDate,
    ) -> Result<Option<DailyReport>, StoreError> {
        let header = db
            .conn
            .query_row(
                "SELECT id, weather, period, activities, notes
                 FROM reports WHERE project_id = ?1 AND date = ?2",
                params![project_id, date],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((id, weather, period, activities, notes)) = header else {
            return Ok(None);
        };

        Ok(Some(DailyReport {
            id,
            project_id,
            date,
            weather,
            period,
            activities,
            notes,
            crew: load_crew(&db.conn, id)?,
            photos: load_photos(&db.conn, id)?,
        }))
    }

    /// Insert or update the aggregate for `(draft.project_id, draft.date)`.
    ///
    /// Whether a report already exists for the pair is the sole branch
    /// condition: found means the header is updated under its existing id,
    /// not found means a fresh insert. Crew lines with a zero count are
    /// dropped. Returns the report id.
    pub fn save(db: &mut Database, draft: &ReportDraft) -> Result<i64, StoreError> {
        let tx = db.conn.transaction()?;

        let project_exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ?1)",
            [draft.project_id],
            |row| row.get(0),
        )?;
        if !project_exists {
            return Err(StoreError::UnknownProject(draft.project_id));
        }

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM reports WHERE project_id = ?1 AND date = ?2",
                params![draft.project_id, draft.date],
                |row| row.get(0),
            )
            .optional()?;

        let report_id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE reports SET weather = ?1, period = ?2, activities = ?3, notes = ?4
                     WHERE id = ?5",
                    params![draft.weather, draft.period, draft.activities, draft.notes, id],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO reports (project_id, date, weather, period, activities, notes)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        draft.project_id,
                        draft.date,
                        draft.weather,
                        draft.period,
                        draft.activities,
                        draft.notes
                    ],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.execute("DELETE FROM report_crew WHERE report_id = ?1", [report_id])?;
        for (role, count) in &draft.crew {
            if *count == 0 {
                continue;
            }
            tx.execute(
                "INSERT INTO report_crew (report_id, role, count) VALUES (?1, ?2, ?3)",
                params![report_id, role.as_str(), count],
            )?;
        }

        tx.execute(
            "DELETE FROM report_photos WHERE report_id = ?1",
            [report_id],
        )?;
        for photo in &draft.photos {
            tx.execute(
                "INSERT INTO report_photos (report_id, file_name, description) VALUES (?1, ?2, ?3)",
                params![report_id, photo.file_name, photo.description],
            )?;
        }

        tx.commit()?;
        debug!(
            report_id,
            project_id = draft.project_id,
            date = %draft.date,
            updated = existing.is_some(),
            "report saved"
        );
        Ok(report_id)
    }
}

fn load_crew(conn: &Connection, report_id: i64) -> Result<Vec<CrewEntry>, StoreError> {
    let mut stmt = conn.prepare("SELECT role, count FROM report_crew WHERE report_id = ?1")?;
    let rows = stmt.query_map([report_id], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
    })?;

    let mut crew = Vec::new();
    for row in rows {
        let (role, count) = row?;
        let role = CrewRole::try_from(role.as_str())
            .map_err(|_| StoreError::InvalidInput("unrecognized crew role in report_crew"))?;
        crew.push(CrewEntry { role, count });
    }
    Ok(crew)
}

fn load_photos(conn: &Connection, report_id: i64) -> Result<Vec<PhotoRef>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT file_name, description FROM report_photos WHERE report_id = ?1")?;
    let rows = stmt.query_map([report_id], |row| {
        Ok(PhotoRef {
            file_name: row.get(0)?,
            description: row.get(1)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewProject;
    use crate::store::ProjectStore;
    use std::collections::HashSet;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn seed_project(db: &Database, name: &str) -> i64 {
        ProjectStore::create(
            db,
            &NewProject {
                name: name.to_owned(),
                address: None,
            },
        )
        .unwrap()
        .id
    }

    fn march_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn draft(project_id: i64, date: NaiveDate) -> ReportDraft {
        ReportDraft {
            project_id,
            date,
            weather: "Sol".into(),
            period: "Dia inteiro".into(),
            activities: "Fundação".into(),
            notes: "Sem intercorrências".into(),
            crew: vec![(CrewRole::Pedreiro, 3), (CrewRole::Servente, 2)],
            photos: vec![PhotoRef {
                file_name: "fundacao.jpg".into(),
                description: "Formas da fundação".into(),
            }],
        }
    }

    fn crew_set(report: &DailyReport) -> HashSet<(CrewRole, u32)> {
        report.crew.iter().map(|c| (c.role, c.count)).collect()
    }

    fn report_row_count(db: &Database, project_id: i64, date: NaiveDate) -> i64 {
        db.conn
            .query_row(
                "SELECT COUNT(*) FROM reports WHERE project_id = ?1 AND date = ?2",
                params![project_id, date],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn save_then_find_round_trips_the_aggregate() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");
        let draft = draft(project_id, march_10());

        ReportStore::save(&mut db, &draft).unwrap();
        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .expect("report must exist after save");

        assert_eq!(stored.weather, "Sol");
        assert_eq!(stored.period, "Dia inteiro");
        assert_eq!(stored.activities, "Fundação");
        assert_eq!(stored.notes, "Sem intercorrências");
        assert_eq!(
            crew_set(&stored),
            HashSet::from([(CrewRole::Pedreiro, 3), (CrewRole::Servente, 2)])
        );
        assert_eq!(stored.photos, draft.photos);
    }

    #[test]
    fn find_returns_none_for_missing_report() {
        let db = test_db();
        assert!(
            ReportStore::find_by_project_and_date(&db, 1, march_10())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn saving_twice_with_identical_arguments_is_idempotent() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");
        let draft = draft(project_id, march_10());

        let first_id = ReportStore::save(&mut db, &draft).unwrap();
        let second_id = ReportStore::save(&mut db, &draft).unwrap();

        assert_eq!(first_id, second_id);
        assert_eq!(report_row_count(&db, project_id, march_10()), 1);

        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert_eq!(
            crew_set(&stored),
            HashSet::from([(CrewRole::Pedreiro, 3), (CrewRole::Servente, 2)])
        );
        assert_eq!(stored.photos.len(), 1);
    }

    #[test]
    fn resaving_the_same_key_updates_in_place() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");

        let first_id = ReportStore::save(&mut db, &draft(project_id, march_10())).unwrap();

        let mut second = draft(project_id, march_10());
        second.weather = "Chuva".into();
        second.crew = vec![(CrewRole::Armador, 4)];
        second.photos = vec![];
        let second_id = ReportStore::save(&mut db, &second).unwrap();

        assert_eq!(first_id, second_id);
        assert_eq!(report_row_count(&db, project_id, march_10()), 1);

        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert_eq!(stored.weather, "Chuva");
        assert_eq!(crew_set(&stored), HashSet::from([(CrewRole::Armador, 4)]));
        assert!(stored.photos.is_empty());
    }

    #[test]
    fn zero_count_roles_are_dropped_and_children_fully_replaced() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");

        let mut first = draft(project_id, march_10());
        first.crew = vec![
            (CrewRole::Pedreiro, 2),
            (CrewRole::Servente, 0),
            (CrewRole::Carpinteiro, 5),
        ];
        ReportStore::save(&mut db, &first).unwrap();

        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert_eq!(
            crew_set(&stored),
            HashSet::from([(CrewRole::Pedreiro, 2), (CrewRole::Carpinteiro, 5)])
        );

        let mut second = draft(project_id, march_10());
        second.crew = vec![(CrewRole::Pedreiro, 0)];
        ReportStore::save(&mut db, &second).unwrap();

        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert!(stored.crew.is_empty());
    }

    #[test]
    fn reports_for_different_dates_or_projects_are_independent() {
        let mut db = test_db();
        let south = seed_project(&db, "Residencial Sul");
        let north = seed_project(&db, "Residencial Norte");
        let march_11 = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();

        ReportStore::save(&mut db, &draft(south, march_10())).unwrap();
        ReportStore::save(&mut db, &draft(south, march_11)).unwrap();
        ReportStore::save(&mut db, &draft(north, march_10())).unwrap();

        assert_eq!(report_row_count(&db, south, march_10()), 1);
        assert_eq!(report_row_count(&db, south, march_11), 1);
        assert_eq!(report_row_count(&db, north, march_10()), 1);
    }

    #[test]
    fn save_rejects_unknown_project() {
        let mut db = test_db();
        let err = ReportStore::save(&mut db, &draft(99, march_10())).unwrap_err();
        assert!(matches!(err, StoreError::UnknownProject(99)));
        assert!(
            ReportStore::find_by_project_and_date(&db, 99, march_10())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn failed_child_insert_rolls_back_the_whole_save() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");
        ReportStore::save(&mut db, &draft(project_id, march_10())).unwrap();

        db.conn
            .execute_batch(
                "CREATE TRIGGER photos_disabled BEFORE INSERT ON report_photos
                 BEGIN SELECT RAISE(ABORT, 'photo insert disabled'); END;",
            )
            .unwrap();

        let mut second = draft(project_id, march_10());
        second.weather = "Chuva".into();
        second.crew = vec![(CrewRole::Eletricista, 1)];
        assert!(ReportStore::save(&mut db, &second).is_err());

        db.conn.execute_batch("DROP TRIGGER photos_disabled").unwrap();

        // The whole aggregate must still read as before the failed save.
        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert_eq!(stored.weather, "Sol");
        assert_eq!(
            crew_set(&stored),
            HashSet::from([(CrewRole::Pedreiro, 3), (CrewRole::Servente, 2)])
        );
        assert_eq!(stored.photos.len(), 1);
    }

    #[test]
    fn failed_fresh_insert_leaves_no_report_behind() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");

        db.conn
            .execute_batch(
                "CREATE TRIGGER photos_disabled BEFORE INSERT ON report_photos
                 BEGIN SELECT RAISE(ABORT, 'photo insert disabled'); END;",
            )
            .unwrap();

        assert!(ReportStore::save(&mut db, &draft(project_id, march_10())).is_err());

        db.conn.execute_batch("DROP TRIGGER photos_disabled").unwrap();
        assert!(
            ReportStore::find_by_project_and_date(&db, project_id, march_10())
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn residencial_sul_scenario() {
        let mut db = test_db();
        let project_id = seed_project(&db, "Residencial Sul");

        let mut first = draft(project_id, march_10());
        first.weather = "Sol".into();
        first.activities = "Fundação".into();
        first.crew = vec![(CrewRole::Pedreiro, 3), (CrewRole::Servente, 2)];
        first.photos = vec![];
        ReportStore::save(&mut db, &first).unwrap();

        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert_eq!(stored.weather, "Sol");
        assert_eq!(stored.activities, "Fundação");
        assert_eq!(
            crew_set(&stored),
            HashSet::from([(CrewRole::Pedreiro, 3), (CrewRole::Servente, 2)])
        );

        let mut second = first.clone();
        second.crew = vec![(CrewRole::Pedreiro, 0)];
        ReportStore::save(&mut db, &second).unwrap();

        let stored = ReportStore::find_by_project_and_date(&db, project_id, march_10())
            .unwrap()
            .unwrap();
        assert!(stored.crew.is_empty());
        assert_eq!(stored.weather, "Sol");
        assert_eq!(stored.activities, "Fundação");
    }
}
