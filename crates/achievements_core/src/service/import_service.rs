//! Workbook import use-case service.
//!
//! # Responsibility
//! - Decode a workbook and import each sheet as one event with participants.
//! - Isolate sheet-level failures and keep importing the remaining sheets.
//! - Merge per-sheet outcomes into one summary for the caller.
//!
//! # Invariants
//! - A workbook that cannot be decoded aborts the import before any write.
//! - Sheets are processed strictly in workbook order, rows in grid order.
//! - Writes of a failed sheet (and of earlier sheets) are never rolled back;
//!   rows it committed before failing still count in the summary totals.
//! - The event is only written after metadata and the participant table
//!   were both found.

use crate::import::{
    extract_event_metadata, locate_participant_table, normalize_participants, SheetError,
};
use crate::repo::activity_repo::ActivityRepository;
use crate::workbook::{read_workbook, SheetGrid, Workbook, WorkbookError};
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Number of success/error lines shown by `ImportSummary::display_text` by default.
pub const DEFAULT_MESSAGE_LIMIT: usize = 5;

/// Fatal import failure; nothing was written.
#[derive(Debug)]
pub enum ImportError {
    FileParse(WorkbookError),
}

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileParse(err) => write!(f, "Ошибка чтения файла: {err}"),
        }
    }
}

impl Error for ImportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FileParse(err) => Some(err),
        }
    }
}

impl From<WorkbookError> for ImportError {
    fn from(value: WorkbookError) -> Self {
        Self::FileParse(value)
    }
}

/// Counters produced by one successfully imported sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetOutcome {
    pub sheet_name: String,
    pub event_name: String,
    pub event_created: bool,
    pub students_created: usize,
    pub participations_created: usize,
    pub participations_updated: usize,
}

impl SheetOutcome {
    /// Human-readable one-line result for this sheet.
    pub fn message(&self) -> String {
        format!(
            "Лист \"{}\": {} — добавлено {}, обновлено {}",
            self.sheet_name,
            self.event_name,
            self.participations_created,
            self.participations_updated
        )
    }
}

/// Aggregate result of one workbook import.
///
/// Message lists are kept in full; truncation only happens in `display_text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub sheets_total: usize,
    pub sheets_succeeded: usize,
    pub events_created: usize,
    pub students_created: usize,
    pub participations_created: usize,
    pub participations_updated: usize,
    pub success_messages: Vec<String>,
    pub error_messages: Vec<String>,
}

impl ImportSummary {
    /// Folds one successful sheet into the totals.
    pub fn record_success(&mut self, outcome: &SheetOutcome) {
        self.sheets_succeeded += 1;
        self.record_writes(outcome);
        self.success_messages.push(outcome.message());
    }

    /// Adds the row counters of `outcome` without counting the sheet itself.
    ///
    /// Used for sheets that failed after some rows were already committed.
    pub fn record_writes(&mut self, outcome: &SheetOutcome) {
        if outcome.event_created {
            self.events_created += 1;
        }
        self.students_created += outcome.students_created;
        self.participations_created += outcome.participations_created;
        self.participations_updated += outcome.participations_updated;
    }

    /// Records a sheet-level failure as `"<sheet>: <reason>"`.
    pub fn record_failure(&mut self, sheet_name: &str, err: &SheetError) {
        self.error_messages.push(format!("{sheet_name}: {err}"));
    }

    pub fn sheets_failed(&self) -> usize {
        self.error_messages.len()
    }

    /// Renders the user-facing summary, showing at most `limit` lines per list.
    pub fn display_text(&self, limit: usize) -> String {
        let mut blocks = Vec::new();

        if self.sheets_succeeded > 0 {
            let mut lines = vec![
                format!(
                    "Успешно обработано листов: {} из {}",
                    self.sheets_succeeded, self.sheets_total
                ),
                format!("Создано мероприятий: {}", self.events_created),
                format!(
                    "Добавлено участий: {}, обновлено: {}",
                    self.participations_created, self.participations_updated
                ),
                String::new(),
            ];
            lines.extend(self.success_messages.iter().take(limit).cloned());
            blocks.push(lines.join("\n"));
        }

        if !self.error_messages.is_empty() {
            let mut lines = vec!["Ошибки на листах:".to_string()];
            lines.extend(self.error_messages.iter().take(limit).cloned());
            blocks.push(lines.join("\n"));
        }

        blocks.join("\n\n")
    }
}

/// Import service facade over an activity repository.
pub struct ImportService<R: ActivityRepository> {
    repo: R,
}

impl<R: ActivityRepository> ImportService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Read access to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Decodes `bytes` and imports every sheet.
    ///
    /// # Errors
    /// - `ImportError::FileParse` when the bytes are not a workbook.
    ///   Sheet-level problems never surface here; they are listed in
    ///   `ImportSummary::error_messages`.
    pub fn import_workbook(&mut self, bytes: &[u8]) -> Result<ImportSummary, ImportError> {
        let workbook = read_workbook(bytes)?;
        Ok(self.import_parsed(&workbook))
    }

    /// Imports an already decoded workbook.
    pub fn import_parsed(&mut self, workbook: &Workbook) -> ImportSummary {
        let started_at = Instant::now();
        info!(
            "event=workbook_import module=import status=start sheets={}",
            workbook.sheets.len()
        );

        let mut summary = ImportSummary {
            sheets_total: workbook.sheets.len(),
            ..ImportSummary::default()
        };

        for (index, sheet) in workbook.sheets.iter().enumerate() {
            let mut outcome = SheetOutcome::default();
            match self.write_sheet(sheet, &mut outcome) {
                Ok(()) => {
                    info!(
                        "event=sheet_import module=import status=ok sheet_index={} event_created={} participations_created={} participations_updated={}",
                        index,
                        outcome.event_created,
                        outcome.participations_created,
                        outcome.participations_updated
                    );
                    summary.record_success(&outcome);
                }
                Err(err) => {
                    warn!(
                        "event=sheet_import module=import status=error sheet_index={} error_code={} event_created={} participations_written={}",
                        index,
                        sheet_error_code(&err),
                        outcome.event_created,
                        outcome.participations_created + outcome.participations_updated
                    );
                    summary.record_writes(&outcome);
                    summary.record_failure(&sheet.name, &err);
                }
            }
        }

        info!(
            "event=workbook_import module=import status=ok sheets={} succeeded={} events_created={} duration_ms={}",
            summary.sheets_total,
            summary.sheets_succeeded,
            summary.events_created,
            started_at.elapsed().as_millis()
        );
        summary
    }

    /// Imports one sheet: metadata, table location, event, then participants.
    ///
    /// # Errors
    /// - `SheetError::MissingField` / `MissingParticipantTable` before any write.
    /// - `SheetError::Repo` on persistence failure; rows already written stay.
    pub fn import_sheet(&mut self, sheet: &SheetGrid) -> Result<SheetOutcome, SheetError> {
        let mut outcome = SheetOutcome::default();
        self.write_sheet(sheet, &mut outcome)?;
        Ok(outcome)
    }

    /// Fills `outcome` as rows are committed, so it stays accurate when a
    /// later write fails.
    fn write_sheet(
        &mut self,
        sheet: &SheetGrid,
        outcome: &mut SheetOutcome,
    ) -> Result<(), SheetError> {
        let details = extract_event_metadata(sheet)?;
        let table_start = locate_participant_table(sheet)?;

        let event = self.repo.upsert_event(&details)?;
        outcome.sheet_name = sheet.name.clone();
        outcome.event_name = details.name.clone();
        outcome.event_created = event.created;

        for record in normalize_participants(sheet, table_start) {
            let student = self
                .repo
                .upsert_student(&record.full_name, &record.group)?;
            if student.created {
                outcome.students_created += 1;
            }

            let participation = self.repo.upsert_participation(
                student.id,
                event.id,
                &record.role,
                record.hours,
            )?;
            if participation.created {
                outcome.participations_created += 1;
            } else {
                outcome.participations_updated += 1;
            }
        }

        Ok(())
    }
}

fn sheet_error_code(err: &SheetError) -> String {
    match err {
        SheetError::MissingField(field) => format!("missing_field_{}", field.as_str()),
        SheetError::MissingParticipantTable => "missing_participant_table".to_string(),
        SheetError::Repo(_) => "sheet_persist_failed".to_string(),
    }
}
