//! Domain model for students, events and their participations.
//!
//! # Responsibility
//! - Define canonical records written by import and read by reports.
//! - Own the closed `EventLevel` enumeration and its labels.
//!
//! # Invariants
//! - Students are identified by exact `full_name`.
//! - Events are identified by `(name, start_date, end_date)`.
//! - A participation links one student to one event and has `hours >= 1`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod event;
pub mod participation;
pub mod student;

/// Validation failure for records about to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyStudentName,
    EmptyEventName,
    ZeroHours,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyStudentName => write!(f, "student full name must not be empty"),
            Self::EmptyEventName => write!(f, "event name must not be empty"),
            Self::ZeroHours => write!(f, "participation hours must be at least 1"),
        }
    }
}

impl Error for ValidationError {}
