//! In-memory workbook grid shared by the reader and the import pipeline.
//!
//! # Responsibility
//! - Represent sheets as ordered, nullable, loosely typed cell grids.
//! - Provide the text view of a cell that all heuristics operate on.
//!
//! # Invariants
//! - Sheets keep workbook order.
//! - Grid coordinates are absolute: row 0 / column 0 is the sheet's `A1`.
//! - Out-of-range access yields `Cell::Empty`, never a panic.

use chrono::NaiveDate;
use std::borrow::Cow;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod reader;

pub use reader::{read_workbook, read_workbook_file};

pub type WorkbookResult<T> = Result<T, WorkbookError>;

static EMPTY_CELL: Cell = Cell::Empty;

/// Failure to turn raw input into a workbook grid.
#[derive(Debug)]
pub enum WorkbookError {
    /// Input bytes are not a readable workbook.
    Parse(calamine::Error),
    /// Workbook file could not be read from disk.
    Io(std::io::Error),
}

impl Display for WorkbookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "failed to parse workbook: {err}"),
            Self::Io(err) => write!(f, "failed to read workbook file: {err}"),
        }
    }
}

impl Error for WorkbookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<calamine::Error> for WorkbookError {
    fn from(value: calamine::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<std::io::Error> for WorkbookError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// One raw spreadsheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Text representation used by all heuristics.
    ///
    /// Integral numbers render without a fractional part (`5.0` -> `"5"`), so
    /// numeric groups and hour counts read the same as typed text.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(value) => Cow::Borrowed(value.as_str()),
            Self::Number(value) => Cow::Owned(format_number(*value)),
            Self::Date(value) => Cow::Owned(value.format("%Y-%m-%d").to_string()),
        }
    }

    /// Trimmed text, or `None` for empty and whitespace-only cells.
    pub fn trimmed_text(&self) -> Option<String> {
        let text = self.as_text();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().trim().is_empty()
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// One named sheet as a grid of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Builds a text-only grid; blank strings become `Cell::Empty`.
    pub fn from_text_rows(name: impl Into<String>, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|value| {
                        if value.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text((*value).to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self::new(name, rows)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> &[Cell] {
        self.rows.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.row(row).get(col).unwrap_or(&EMPTY_CELL)
    }
}

/// Ordered collection of sheets from one workbook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<SheetGrid>,
}

#[cfg(test)]
mod tests {
    use super::{Cell, SheetGrid};
    use chrono::NaiveDate;

    #[test]
    fn integral_numbers_render_without_fraction() {
        assert_eq!(Cell::Number(5.0).as_text(), "5");
        assert_eq!(Cell::Number(2.5).as_text(), "2.5");
        assert_eq!(Cell::Number(101.0).as_text(), "101");
    }

    #[test]
    fn dates_render_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Cell::Date(date).as_text(), "2024-03-01");
    }

    #[test]
    fn whitespace_text_is_blank() {
        assert!(Cell::Text("   ".to_string()).is_blank());
        assert!(Cell::Empty.is_blank());
        assert_eq!(Cell::Text("  x ".to_string()).trimmed_text().as_deref(), Some("x"));
    }

    #[test]
    fn out_of_range_access_yields_empty_cell() {
        let sheet = SheetGrid::from_text_rows("s", &[&["a"]]);
        assert_eq!(sheet.cell(0, 5), &Cell::Empty);
        assert_eq!(sheet.cell(7, 0), &Cell::Empty);
        assert!(sheet.row(9).is_empty());
    }
}
