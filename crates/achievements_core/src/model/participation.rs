//! Participation association between a student and an event.

use super::event::EventId;
use super::student::StudentId;
use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ParticipationId = Uuid;

/// One student's involvement in one event.
///
/// At most one participation exists per `(student_uuid, event_uuid)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    pub uuid: ParticipationId,
    pub student_uuid: StudentId,
    pub event_uuid: EventId,
    /// Free-text role, empty when not given.
    pub role: String,
    /// Always `>= 1` once persisted.
    pub hours: u32,
}

impl Participation {
    pub fn new(
        student_uuid: StudentId,
        event_uuid: EventId,
        role: impl Into<String>,
        hours: u32,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            student_uuid,
            event_uuid,
            role: role.into(),
            hours,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hours == 0 {
            return Err(ValidationError::ZeroHours);
        }
        Ok(())
    }
}
