//! Natural-key upsert repository for students, events and participations.
//!
//! # Responsibility
//! - Provide idempotent create-or-update APIs used by workbook import.
//! - Provide keyed lookups used by tests and callers that inspect results.
//!
//! # Invariants
//! - Events are looked up by `(name, start_date, end_date)` and only
//!   `level`/`is_first_time` are ever overwritten.
//! - Students are looked up by exact `full_name`; a differing group is
//!   overwritten in place and still reported as an existing row.
//! - Participations are looked up by `(student, event)`; `role` and `hours`
//!   are overwritten unconditionally.
//! - Atomicity holds per key for a single writer; concurrent importers
//!   racing on the same key rely on the `UNIQUE` constraints to fail loudly.

use super::{
    bool_to_int, ensure_connection_ready, int_to_bool, parse_uuid, RepoError, RepoResult, Upserted,
};
use crate::model::event::{Event, EventDetails, EventId, EventLevel};
use crate::model::participation::{Participation, ParticipationId};
use crate::model::student::{Student, StudentId};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    level,
    start_date,
    end_date,
    is_first_time
FROM events";

const STUDENT_SELECT_SQL: &str = "SELECT
    uuid,
    full_name,
    group_name
FROM students";

const PARTICIPATION_SELECT_SQL: &str = "SELECT
    uuid,
    student_uuid,
    event_uuid,
    role,
    hours
FROM participations";

/// Repository interface for the import write path.
pub trait ActivityRepository {
    /// Creates the event or overwrites `level`/`is_first_time` of the existing one.
    fn upsert_event(&mut self, details: &EventDetails) -> RepoResult<Upserted<EventId>>;
    /// Creates the student or syncs its group when it differs.
    fn upsert_student(&mut self, full_name: &str, group: &str) -> RepoResult<Upserted<StudentId>>;
    /// Creates the participation or overwrites its role and hours.
    fn upsert_participation(
        &mut self,
        student_id: StudentId,
        event_id: EventId,
        role: &str,
        hours: u32,
    ) -> RepoResult<Upserted<ParticipationId>>;
    fn find_event(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepoResult<Option<Event>>;
    fn find_student(&self, full_name: &str) -> RepoResult<Option<Student>>;
    fn find_participation(
        &self,
        student_id: StudentId,
        event_id: EventId,
    ) -> RepoResult<Option<Participation>>;
}

/// SQLite-backed activity repository.
pub struct SqliteActivityRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteActivityRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ActivityRepository for SqliteActivityRepository<'_> {
    fn upsert_event(&mut self, details: &EventDetails) -> RepoResult<Upserted<EventId>> {
        details.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT uuid
                 FROM events
                 WHERE name = ?1
                   AND start_date = ?2
                   AND end_date = ?3;",
                params![details.name, details.start_date, details.end_date],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(uuid_text) => {
                tx.execute(
                    "UPDATE events
                     SET
                        level = ?1,
                        is_first_time = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE uuid = ?3;",
                    params![
                        details.level.code(),
                        bool_to_int(details.is_first_time),
                        uuid_text,
                    ],
                )?;
                Upserted::existing(parse_uuid(&uuid_text, "events.uuid")?)
            }
            None => {
                let id = Uuid::new_v4();
                tx.execute(
                    "INSERT INTO events (
                        uuid,
                        name,
                        level,
                        start_date,
                        end_date,
                        is_first_time
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                    params![
                        id.to_string(),
                        details.name,
                        details.level.code(),
                        details.start_date,
                        details.end_date,
                        bool_to_int(details.is_first_time),
                    ],
                )?;
                Upserted::created(id)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn upsert_student(&mut self, full_name: &str, group: &str) -> RepoResult<Upserted<StudentId>> {
        let candidate = Student::new(full_name, group);
        candidate.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: Option<(String, String)> = tx
            .query_row(
                "SELECT uuid, group_name FROM students WHERE full_name = ?1;",
                [candidate.full_name.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let outcome = match existing {
            Some((uuid_text, stored_group)) => {
                if stored_group != candidate.group {
                    tx.execute(
                        "UPDATE students
                         SET
                            group_name = ?1,
                            updated_at = (strftime('%s', 'now') * 1000)
                         WHERE uuid = ?2;",
                        params![candidate.group, uuid_text],
                    )?;
                }
                Upserted::existing(parse_uuid(&uuid_text, "students.uuid")?)
            }
            None => {
                tx.execute(
                    "INSERT INTO students (uuid, full_name, group_name) VALUES (?1, ?2, ?3);",
                    params![
                        candidate.uuid.to_string(),
                        candidate.full_name,
                        candidate.group,
                    ],
                )?;
                Upserted::created(candidate.uuid)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn upsert_participation(
        &mut self,
        student_id: StudentId,
        event_id: EventId,
        role: &str,
        hours: u32,
    ) -> RepoResult<Upserted<ParticipationId>> {
        let candidate = Participation::new(student_id, event_id, role, hours);
        candidate.validate()?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: Option<String> = tx
            .query_row(
                "SELECT uuid
                 FROM participations
                 WHERE student_uuid = ?1
                   AND event_uuid = ?2;",
                params![student_id.to_string(), event_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match existing {
            Some(uuid_text) => {
                tx.execute(
                    "UPDATE participations
                     SET
                        role = ?1,
                        hours = ?2,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE uuid = ?3;",
                    params![candidate.role, candidate.hours, uuid_text],
                )?;
                Upserted::existing(parse_uuid(&uuid_text, "participations.uuid")?)
            }
            None => {
                tx.execute(
                    "INSERT INTO participations (
                        uuid,
                        student_uuid,
                        event_uuid,
                        role,
                        hours
                    ) VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        candidate.uuid.to_string(),
                        student_id.to_string(),
                        event_id.to_string(),
                        candidate.role,
                        candidate.hours,
                    ],
                )?;
                Upserted::created(candidate.uuid)
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    fn find_event(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepoResult<Option<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EVENT_SELECT_SQL}
             WHERE name = ?1
               AND start_date = ?2
               AND end_date = ?3;"
        ))?;
        let mut rows = stmt.query(params![name, start_date, end_date])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_event_row(row)?));
        }
        Ok(None)
    }

    fn find_student(&self, full_name: &str) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE full_name = ?1;"))?;
        let mut rows = stmt.query([full_name])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }
        Ok(None)
    }

    fn find_participation(
        &self,
        student_id: StudentId,
        event_id: EventId,
    ) -> RepoResult<Option<Participation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PARTICIPATION_SELECT_SQL}
             WHERE student_uuid = ?1
               AND event_uuid = ?2;"
        ))?;
        let mut rows = stmt.query(params![student_id.to_string(), event_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_participation_row(row)?));
        }
        Ok(None)
    }
}

pub(crate) fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let uuid_text: String = row.get("uuid")?;
    let level_text: String = row.get("level")?;
    let level = EventLevel::from_code(&level_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid event level `{level_text}` in events.level"))
    })?;

    Ok(Event {
        uuid: parse_uuid(&uuid_text, "events.uuid")?,
        name: row.get("name")?,
        level,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        is_first_time: int_to_bool(row.get("is_first_time")?, "events.is_first_time")?,
    })
}

pub(crate) fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Student {
        uuid: parse_uuid(&uuid_text, "students.uuid")?,
        full_name: row.get("full_name")?,
        group: row.get("group_name")?,
    })
}

fn parse_participation_row(row: &Row<'_>) -> RepoResult<Participation> {
    let uuid_text: String = row.get("uuid")?;
    let student_text: String = row.get("student_uuid")?;
    let event_text: String = row.get("event_uuid")?;
    let participation = Participation {
        uuid: parse_uuid(&uuid_text, "participations.uuid")?,
        student_uuid: parse_uuid(&student_text, "participations.student_uuid")?,
        event_uuid: parse_uuid(&event_text, "participations.event_uuid")?,
        role: row.get("role")?,
        hours: row.get("hours")?,
    };
    participation.validate()?;
    Ok(participation)
}
