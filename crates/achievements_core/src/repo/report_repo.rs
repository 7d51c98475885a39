//! Read-side repository for per-student participation reports.
//!
//! # Invariants
//! - Report rows are filtered by event `start_date` within an inclusive range.
//! - Rows are ordered by `start_date ASC`, then event name, then event uuid.

use super::activity_repo::{parse_event_row, parse_student_row};
use super::{ensure_connection_ready, RepoResult};
use crate::model::event::Event;
use crate::model::student::{Student, StudentId};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Participation joined with its event, as consumed by report renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipationWithEvent {
    pub event: Event,
    pub role: String,
    pub hours: u32,
}

/// Repository interface for report queries.
pub trait ReportRepository {
    fn find_student_by_name(&self, full_name: &str) -> RepoResult<Option<Student>>;
    fn list_student_participations(
        &self,
        student_id: StudentId,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> RepoResult<Vec<ParticipationWithEvent>>;
}

/// SQLite-backed report repository. Read-only, so it borrows shared.
pub struct SqliteReportRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReportRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ReportRepository for SqliteReportRepository<'_> {
    fn find_student_by_name(&self, full_name: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, full_name, group_name
             FROM students
             WHERE full_name = ?1;",
        )?;
        let mut rows = stmt.query([full_name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn list_student_participations(
        &self,
        student_id: StudentId,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> RepoResult<Vec<ParticipationWithEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                e.uuid AS uuid,
                e.name AS name,
                e.level AS level,
                e.start_date AS start_date,
                e.end_date AS end_date,
                e.is_first_time AS is_first_time,
                p.role AS role,
                p.hours AS hours
             FROM participations p
             INNER JOIN events e ON e.uuid = p.event_uuid
             WHERE p.student_uuid = ?1
               AND e.start_date BETWEEN ?2 AND ?3
             ORDER BY e.start_date ASC, e.name ASC, e.uuid ASC;",
        )?;

        let mut rows = stmt.query(params![student_id.to_string(), date_from, date_to])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(ParticipationWithEvent {
                event: parse_event_row(row)?,
                role: row.get("role")?,
                hours: row.get("hours")?,
            });
        }
        Ok(items)
    }
}
