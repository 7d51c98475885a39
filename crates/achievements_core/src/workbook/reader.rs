//! Workbook decoding on top of `calamine`.
//!
//! Accepts any format `calamine` autodetects (xlsx, xlsm, xlsb, xls, ods).
//! Decoding failures are fatal for the caller; nothing is written before
//! the whole workbook has been turned into grids.

use super::{Cell, SheetGrid, Workbook, WorkbookResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::NaiveDate;
use log::{error, info};
use std::io::Cursor;
use std::path::Path;
use std::time::Instant;

/// Decodes raw workbook bytes into ordered sheet grids.
///
/// # Errors
/// - `WorkbookError::Parse` when the bytes are not a workbook or a sheet
///   cannot be decoded.
pub fn read_workbook(bytes: &[u8]) -> WorkbookResult<Workbook> {
    let started_at = Instant::now();
    info!(
        "event=workbook_read module=workbook status=start bytes={}",
        bytes.len()
    );

    match decode(bytes) {
        Ok(workbook) => {
            info!(
                "event=workbook_read module=workbook status=ok sheets={} duration_ms={}",
                workbook.sheets.len(),
                started_at.elapsed().as_millis()
            );
            Ok(workbook)
        }
        Err(err) => {
            error!(
                "event=workbook_read module=workbook status=error duration_ms={} error_code=workbook_parse_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

/// Reads a workbook file from disk and decodes it.
pub fn read_workbook_file(path: impl AsRef<Path>) -> WorkbookResult<Workbook> {
    let bytes = std::fs::read(path)?;
    read_workbook(&bytes)
}

fn decode(bytes: &[u8]) -> WorkbookResult<Workbook> {
    let mut source = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let mut sheets = Vec::new();
    for name in source.sheet_names() {
        let range = source.worksheet_range(&name)?;
        let rows = range_to_rows(&range);
        sheets.push(SheetGrid::new(name, rows));
    }
    Ok(Workbook { sheets })
}

/// `calamine` ranges start at the first used cell; pad back to `A1`.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let Some((start_row, start_col)) = range.start() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col as usize];
        cells.extend(row.iter().map(convert_cell));
        rows.push(cells);
    }
    rows
}

fn convert_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) => Cell::Text(text.clone()),
        Data::Float(number) => Cell::Number(*number),
        Data::Int(number) => Cell::Number(*number as f64),
        Data::Bool(flag) => Cell::Text(flag.to_string()),
        Data::DateTime(datetime) => {
            if datetime.is_datetime() {
                datetime
                    .as_datetime()
                    .map(|value| Cell::Date(value.date()))
                    .unwrap_or(Cell::Number(datetime.as_f64()))
            } else {
                Cell::Number(datetime.as_f64())
            }
        }
        Data::DateTimeIso(text) => text
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .map_or_else(|| Cell::Text(text.clone()), Cell::Date),
        Data::DurationIso(text) => Cell::Text(text.clone()),
    }
}
