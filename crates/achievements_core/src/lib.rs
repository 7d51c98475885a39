//! Core domain logic for importing student achievement workbooks.
//!
//! Workbooks describe one event per sheet together with its participants;
//! this crate turns them into normalized students, events and
//! participations with idempotent create-or-update semantics, and answers
//! per-student report queries over the stored records.

pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod workbook;

pub use import::{EventField, ParticipantRecord, SheetError};
pub use logging::{
    default_log_level, init_logging, init_logging_with, logging_status, LoggingConfig,
};
pub use model::event::{Event, EventDetails, EventId, EventLevel};
pub use model::participation::{Participation, ParticipationId};
pub use model::student::{Student, StudentId};
pub use model::ValidationError;
pub use repo::activity_repo::{ActivityRepository, SqliteActivityRepository};
pub use repo::report_repo::{ParticipationWithEvent, ReportRepository, SqliteReportRepository};
pub use repo::{RepoError, RepoResult, Upserted};
pub use service::import_service::{
    ImportError, ImportService, ImportSummary, SheetOutcome, DEFAULT_MESSAGE_LIMIT,
};
pub use service::report_service::{
    tidy_role_text, ReportError, ReportRow, ReportService, StudentReport,
};
pub use workbook::{read_workbook, read_workbook_file, Cell, SheetGrid, Workbook, WorkbookError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
