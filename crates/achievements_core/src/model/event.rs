//! Event domain model and level enumeration.
//!
//! # Invariants
//! - `(name, start_date, end_date)` is the identity of an event and never
//!   changes after creation.
//! - `level` is always one of the closed `EventLevel` variants.

use super::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type EventId = Uuid;

/// Organisational level of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventLevel {
    Faculty,
    Course,
    University,
    Interuniversity,
    AllRussian,
    ChemistryDay,
    Cabbage,
    Dedication,
}

impl EventLevel {
    pub const ALL: [EventLevel; 8] = [
        Self::Faculty,
        Self::Course,
        Self::University,
        Self::Interuniversity,
        Self::AllRussian,
        Self::ChemistryDay,
        Self::Cabbage,
        Self::Dedication,
    ];

    /// Stable storage code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Faculty => "faculty",
            Self::Course => "course",
            Self::University => "university",
            Self::Interuniversity => "interuniversity",
            Self::AllRussian => "all_russian",
            Self::ChemistryDay => "chemistry_day",
            Self::Cabbage => "cabbage",
            Self::Dedication => "dedication",
        }
    }

    /// Human-readable label used by reports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Faculty => "Факультетский",
            Self::Course => "Курсовой",
            Self::University => "Университетский/межфакультетский",
            Self::Interuniversity => "Межуниверситетский/региональный",
            Self::AllRussian => "Всероссийский/межрегиональный",
            Self::ChemistryDay => "День химика",
            Self::Cabbage => "Капустник",
            Self::Dedication => "Посвящение в химики",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.code() == code)
    }
}

impl Display for EventLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Event attributes as extracted from a sheet, before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetails {
    pub name: String,
    pub level: EventLevel,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_first_time: bool,
}

impl EventDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyEventName);
        }
        Ok(())
    }
}

/// Persisted event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub uuid: EventId,
    pub name: String,
    pub level: EventLevel,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_first_time: bool,
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {} - {})",
            self.name, self.level, self.start_date, self.end_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::EventLevel;

    #[test]
    fn level_codes_roundtrip_for_every_variant() {
        for level in EventLevel::ALL {
            assert_eq!(EventLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(EventLevel::from_code("galactic"), None);
    }

    #[test]
    fn level_serializes_as_storage_code() {
        let json = serde_json::to_string(&EventLevel::AllRussian).unwrap();
        assert_eq!(json, "\"all_russian\"");
    }
}
