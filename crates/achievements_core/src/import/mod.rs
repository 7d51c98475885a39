//! Heuristic sheet parsing for event workbooks.
//!
//! # Responsibility
//! - Derive event metadata from the two leading rows of a sheet.
//! - Locate the participant table by its `ФИО` header row.
//! - Normalize participant rows into validated records.
//!
//! # Invariants
//! - Parsing never touches storage.
//! - Matching is driven by ordered rule tables; table order is the tie-break.
//! - Row-level problems are skipped silently; only sheet-level problems
//!   surface as `SheetError`.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod locator;
pub mod metadata;
pub mod normalizer;

pub use locator::{locate_participant_table, PARTICIPANT_TABLE_MARKER};
pub use metadata::{
    extract_event_metadata, map_header_columns, match_level, parse_event_dates, HeaderColumns,
    HeaderField, HEADER_RULES, LEVEL_RULES,
};
pub use normalizer::{normalize_participants, parse_hours, ParticipantRecord};

/// Event metadata fields that must be present on every sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventField {
    Name,
    Level,
    Dates,
}

impl EventField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Level => "level",
            Self::Dates => "dates",
        }
    }
}

/// Failure confined to one sheet.
#[derive(Debug)]
pub enum SheetError {
    MissingField(EventField),
    MissingParticipantTable,
    Repo(RepoError),
}

impl Display for SheetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(EventField::Name) => {
                write!(f, "Не найдено название мероприятия")
            }
            Self::MissingField(EventField::Level) => {
                write!(f, "Не определён уровень мероприятия")
            }
            Self::MissingField(EventField::Dates) => {
                write!(f, "Не определены даты проведения")
            }
            Self::MissingParticipantTable => write!(
                f,
                "Не найдена таблица с участниками (нет колонки \"{PARTICIPANT_TABLE_MARKER}\")"
            ),
            Self::Repo(err) => write!(f, "Ошибка сохранения: {err}"),
        }
    }
}

impl Error for SheetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SheetError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
