//! Analytical reports over the loaded tables.
//!
//! Both queries return an empty list when any of the three tables has not
//! been loaded yet.

use crate::Result;
use crate::models::{EntityKind, FieldValue};
use crate::storage::sqlite::SqliteStore;
use crate::storage::sqlite::store::field_value;
use rusqlite::{Connection, params};
use serde::Serialize;
use tracing::instrument;

/// Year used when a caller does not name one.
pub const DEFAULT_REPORT_YEAR: i32 = 2021;

const HIRES_BY_QUARTER_SQL: &str = "
    SELECT d.department, j.job,
           SUM(CASE WHEN h.month BETWEEN 1 AND 3 THEN 1 ELSE 0 END),
           SUM(CASE WHEN h.month BETWEEN 4 AND 6 THEN 1 ELSE 0 END),
           SUM(CASE WHEN h.month BETWEEN 7 AND 9 THEN 1 ELSE 0 END),
           SUM(CASE WHEN h.month BETWEEN 10 AND 12 THEN 1 ELSE 0 END)
    FROM (
        SELECT department_id, job_id,
               CAST(strftime('%m', datetime) AS INTEGER) AS month
        FROM hired_employees
        WHERE strftime('%Y', datetime) = ?1
    ) h
    JOIN departments d ON d.id = h.department_id
    JOIN jobs j ON j.id = h.job_id
    GROUP BY d.department, j.job
    ORDER BY d.department, j.job";

const ABOVE_AVERAGE_SQL: &str = "
    WITH hires AS (
        SELECT department_id, COUNT(*) AS hired
        FROM hired_employees
        WHERE strftime('%Y', datetime) = ?1
        GROUP BY department_id
    )
    SELECT d.id, d.department, h.hired
    FROM hires h
    JOIN departments d ON d.id = h.department_id
    WHERE h.hired > (SELECT AVG(hired) FROM hires)
    ORDER BY h.hired DESC, d.id";

/// Hires of one (department, job) pair, per calendar quarter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuarterlyHires {
    /// Department name.
    pub department: String,
    /// Job name.
    pub job: String,
    /// January to March.
    #[serde(rename = "Q1")]
    pub q1: i64,
    /// April to June.
    #[serde(rename = "Q2")]
    pub q2: i64,
    /// July to September.
    #[serde(rename = "Q3")]
    pub q3: i64,
    /// October to December.
    #[serde(rename = "Q4")]
    pub q4: i64,
}

/// A department and its hire count for the year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentHires {
    /// Department identifier.
    pub id: FieldValue,
    /// Department name.
    pub department: String,
    /// Number of hires.
    pub hired: i64,
}

fn tables_loaded(conn: &Connection) -> rusqlite::Result<bool> {
    let mut stmt =
        conn.prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    for kind in EntityKind::all() {
        let count: i64 = stmt.query_row([kind.table_name()], |row| row.get(0))?;
        if count == 0 {
            return Ok(false);
        }
    }
    Ok(true)
}

fn year_param(year: i32) -> String {
    format!("{year:04}")
}

impl SqliteStore {
    /// Counts hires per department and job in each quarter of `year`.
    ///
    /// Rows are ordered by department, then job.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub fn hires_by_quarter(&self, year: i32) -> Result<Vec<QuarterlyHires>> {
        self.with_connection("hires_by_quarter", |conn| {
            if !tables_loaded(conn)? {
                return Ok(Vec::new());
            }

            let mut stmt = conn.prepare(HIRES_BY_QUARTER_SQL)?;
            let rows = stmt
                .query_map(params![year_param(year)], |row| {
                    Ok(QuarterlyHires {
                        department: field_value(row.get_ref(0)?).to_backup_text(),
                        job: field_value(row.get_ref(1)?).to_backup_text(),
                        q1: row.get(2)?,
                        q2: row.get(3)?,
                        q3: row.get(4)?,
                        q4: row.get(5)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    /// Lists departments that hired more than the mean number of employees
    /// in `year`, most hires first.
    ///
    /// The mean is taken over departments with at least one hire that year.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    #[instrument(skip(self))]
    pub fn departments_above_average(&self, year: i32) -> Result<Vec<DepartmentHires>> {
        self.with_connection("departments_above_average", |conn| {
            if !tables_loaded(conn)? {
                return Ok(Vec::new());
            }

            let mut stmt = conn.prepare(ABOVE_AVERAGE_SQL)?;
            let rows = stmt
                .query_map(params![year_param(year)], |row| {
                    Ok(DepartmentHires {
                        id: field_value(row.get_ref(0)?),
                        department: field_value(row.get_ref(1)?).to_backup_text(),
                        hired: row.get(2)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::storage::{TableSchema, TableStore};

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        for kind in EntityKind::all() {
            store
                .create_table(kind.table_name(), TableSchema::for_kind(*kind).columns())
                .unwrap();
        }

        store
            .bulk_insert(
                "departments",
                &[
                    Record::new().with("id", 1).with("department", "Staff"),
                    Record::new().with("id", 2).with("department", "Sales"),
                    Record::new().with("id", 3).with("department", "Legal"),
                ],
            )
            .unwrap();
        store
            .bulk_insert(
                "jobs",
                &[
                    Record::new().with("id", 1).with("job", "Analyst"),
                    Record::new().with("id", 2).with("job", "Engineer"),
                ],
            )
            .unwrap();

        let hires = [
            (1, "2021-01-15T10:00:00Z", 1, 1),
            (2, "2021-02-01T10:00:00Z", 1, 1),
            (3, "2021-05-20T10:00:00Z", 1, 2),
            (4, "2021-11-30T10:00:00Z", 1, 1),
            (5, "2021-07-04T10:00:00Z", 2, 2),
            (6, "2020-03-01T10:00:00Z", 3, 1),
            (7, "2020-03-02T10:00:00Z", 3, 1),
        ];
        let rows: Vec<Record> = hires
            .iter()
            .map(|(id, datetime, department_id, job_id)| {
                Record::new()
                    .with("id", *id)
                    .with("name", format!("Person {id}"))
                    .with("datetime", *datetime)
                    .with("department_id", *department_id)
                    .with("job_id", *job_id)
            })
            .collect();
        store.bulk_insert("hired_employees", &rows).unwrap();
        store
    }

    #[test]
    fn test_reports_empty_when_tables_missing() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.hires_by_quarter(2021).unwrap().is_empty());
        assert!(store.departments_above_average(2021).unwrap().is_empty());
    }

    #[test]
    fn test_hires_by_quarter() {
        let store = seeded_store();
        let report = store.hires_by_quarter(2021).unwrap();

        assert_eq!(report.len(), 3);
        assert_eq!(
            report[0],
            QuarterlyHires {
                department: "Sales".to_string(),
                job: "Engineer".to_string(),
                q1: 0,
                q2: 0,
                q3: 1,
                q4: 0,
            }
        );
        assert_eq!(report[1].department, "Staff");
        assert_eq!(report[1].job, "Analyst");
        assert_eq!((report[1].q1, report[1].q2, report[1].q3, report[1].q4), (2, 0, 0, 1));
        assert_eq!(report[2].job, "Engineer");
        assert_eq!(report[2].q2, 1);
    }

    #[test]
    fn test_hires_by_quarter_other_year() {
        let store = seeded_store();
        let report = store.hires_by_quarter(2020).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].department, "Legal");
        assert_eq!(report[0].q1, 2);
    }

    #[test]
    fn test_departments_above_average() {
        let store = seeded_store();
        let report = store.departments_above_average(2021).unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].id, FieldValue::Integer(1));
        assert_eq!(report[0].department, "Staff");
        assert_eq!(report[0].hired, 4);
    }

    #[test]
    fn test_quarter_serialization() {
        let row = QuarterlyHires {
            department: "Staff".to_string(),
            job: "Analyst".to_string(),
            q1: 1,
            q2: 2,
            q3: 3,
            q4: 4,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["Q1"], 1);
        assert_eq!(json["Q4"], 4);
    }
}
