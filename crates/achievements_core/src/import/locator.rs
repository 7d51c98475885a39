//! Participant table location.

use super::SheetError;
use crate::workbook::SheetGrid;

/// Substring of the first-column header cell that opens the participant table.
pub const PARTICIPANT_TABLE_MARKER: &str = "ФИО";

/// Returns the index of the first participant row.
///
/// Every row is scanned, metadata rows included; the table starts right after
/// the first row whose first cell contains `ФИО`.
pub fn locate_participant_table(sheet: &SheetGrid) -> Result<usize, SheetError> {
    sheet
        .rows
        .iter()
        .position(|row| {
            row.first()
                .is_some_and(|cell| cell.as_text().contains(PARTICIPANT_TABLE_MARKER))
        })
        .map(|header_index| header_index + 1)
        .ok_or(SheetError::MissingParticipantTable)
}

#[cfg(test)]
mod tests {
    use super::locate_participant_table;
    use crate::import::SheetError;
    use crate::workbook::SheetGrid;

    #[test]
    fn table_starts_after_marker_row() {
        let sheet = SheetGrid::from_text_rows(
            "s",
            &[
                &["Название мероприятия"],
                &["Событие"],
                &[""],
                &["ФИО участника", "Группа"],
                &["Иванов И.И.", "101"],
            ],
        );
        assert_eq!(locate_participant_table(&sheet).unwrap(), 4);
    }

    #[test]
    fn marker_outside_first_column_is_ignored() {
        let sheet = SheetGrid::from_text_rows("s", &[&["", "ФИО"], &["Иванов И.И."]]);
        assert!(matches!(
            locate_participant_table(&sheet),
            Err(SheetError::MissingParticipantTable)
        ));
    }

    #[test]
    fn marker_on_last_row_gives_empty_table() {
        let sheet = SheetGrid::from_text_rows("s", &[&["x"], &["ФИО"]]);
        assert_eq!(locate_participant_table(&sheet).unwrap(), 2);
    }
}
