//! Per-student participation report use-case.
//!
//! # Responsibility
//! - Select a student's participations whose event starts within a range.
//! - Provide display-ready rows and the running hours total for renderers.
//!
//! # Invariants
//! - Rows are ordered by event start date.
//! - Role text is tidied for display only; stored values are untouched.

use crate::model::event::EventLevel;
use crate::model::student::Student;
use crate::repo::report_repo::ReportRepository;
use crate::repo::RepoError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

static PERIOD_BEFORE_LETTER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.([а-яa-z])").expect("valid period regex"));

/// Known glued spellings in hand-typed role cells.
const ROLE_REPLACEMENTS: &[(&str, &str)] = &[
    ("главныйорганизатор", "главный организатор"),
    ("главныйорган", "главный организатор"),
    ("организатор(отв.", "организатор (отв."),
    ("отв.за", "отв. за"),
    ("отдельныйблок", "отдельный блок"),
    ("тех.части", "тех. части"),
    ("и.т.п.", "и т.п."),
];

#[derive(Debug)]
pub enum ReportError {
    StudentNotFound(String),
    InvalidRange {
        date_from: NaiveDate,
        date_to: NaiveDate,
    },
    Repo(RepoError),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StudentNotFound(name) => write!(f, "student not found: `{name}`"),
            Self::InvalidRange { date_from, date_to } => {
                write!(f, "invalid report range: {date_from} is after {date_to}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ReportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// One report line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub event_name: String,
    pub level: EventLevel,
    pub level_label: &'static str,
    pub role: String,
    pub hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentReport {
    pub student: Student,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub rows: Vec<ReportRow>,
    pub total_hours: u64,
}

/// Report service facade over a report repository.
pub struct ReportService<R: ReportRepository> {
    repo: R,
}

impl<R: ReportRepository> ReportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Builds the report for `full_name` over `[date_from, date_to]`.
    pub fn student_report(
        &self,
        full_name: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<StudentReport, ReportError> {
        if date_from > date_to {
            return Err(ReportError::InvalidRange { date_from, date_to });
        }

        let student = self
            .repo
            .find_student_by_name(full_name.trim())?
            .ok_or_else(|| ReportError::StudentNotFound(full_name.to_string()))?;
        let items = self
            .repo
            .list_student_participations(student.uuid, date_from, date_to)?;

        let rows: Vec<ReportRow> = items
            .into_iter()
            .map(|item| ReportRow {
                start_date: item.event.start_date,
                end_date: item.event.end_date,
                event_name: item.event.name,
                level: item.event.level,
                level_label: item.event.level.label(),
                role: tidy_role_text(&item.role),
                hours: item.hours,
            })
            .collect();
        let total_hours = rows.iter().map(|row| u64::from(row.hours)).sum();

        Ok(StudentReport {
            student,
            date_from,
            date_to,
            rows,
            total_hours,
        })
    }
}

/// Tidies hand-typed role text for display.
pub fn tidy_role_text(role: &str) -> String {
    let mut text = role.trim().to_string();
    for (glued, spaced) in ROLE_REPLACEMENTS {
        text = text.replace(glued, spaced);
    }
    let spaced = PERIOD_BEFORE_LETTER_RE.replace_all(&text, ". $1");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
