//! Student domain model.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type StudentId = Uuid;

/// Student or volunteer, keyed by exact full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub uuid: StudentId,
    pub full_name: String,
    /// Free-text study group, empty when unknown. Last import wins.
    pub group: String,
}

impl Student {
    pub fn new(full_name: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            full_name: full_name.into(),
            group: group.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.full_name.trim().is_empty() {
            return Err(ValidationError::EmptyStudentName);
        }
        Ok(())
    }
}

impl Display for Student {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.full_name)
        } else {
            write!(f, "{} ({})", self.full_name, self.group)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Student;

    #[test]
    fn display_omits_empty_group() {
        assert_eq!(Student::new("Иванов И.И.", "").to_string(), "Иванов И.И.");
        assert_eq!(
            Student::new("Иванов И.И.", "101").to_string(),
            "Иванов И.И. (101)"
        );
    }
}
