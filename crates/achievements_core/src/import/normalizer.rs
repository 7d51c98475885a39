//! Participant row normalization.
//!
//! # Invariants
//! - Column order is fixed: name, group, role, hours; trailing columns optional.
//! - Rows with a blank name or non-positive hours are skipped silently.
//! - Normalization never fails.

use crate::workbook::{Cell, SheetGrid};

const NAME_COLUMN: usize = 0;
const GROUP_COLUMN: usize = 1;
const ROLE_COLUMN: usize = 2;
const HOURS_COLUMN: usize = 3;

/// One validated participant row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub full_name: String,
    pub group: String,
    pub role: String,
    /// Always `>= 1`.
    pub hours: u32,
}

/// Normalizes every row from `start_row` to the end of the grid.
pub fn normalize_participants(sheet: &SheetGrid, start_row: usize) -> Vec<ParticipantRecord> {
    sheet
        .rows
        .iter()
        .skip(start_row)
        .filter_map(|row| normalize_row(row))
        .collect()
}

fn normalize_row(row: &[Cell]) -> Option<ParticipantRecord> {
    let full_name = row.get(NAME_COLUMN).and_then(Cell::trimmed_text)?;
    let hours = row
        .get(HOURS_COLUMN)
        .map_or(0, |cell| parse_hours(&cell.as_text()));
    if hours == 0 {
        return None;
    }

    Some(ParticipantRecord {
        full_name,
        group: text_or_empty(row.get(GROUP_COLUMN)),
        role: text_or_empty(row.get(ROLE_COLUMN)),
        hours,
    })
}

fn text_or_empty(cell: Option<&Cell>) -> String {
    cell.and_then(Cell::trimmed_text).unwrap_or_default()
}

/// Lenient hour count: keeps only ASCII digits and parses what is left.
///
/// `"3+"` -> 3, `"  7 ч."` -> 7, `"abc"` -> 0, `""` -> 0. Digit strings that
/// overflow also give 0.
pub fn parse_hours(text: &str) -> u32 {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
