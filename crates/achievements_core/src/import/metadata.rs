//! Event metadata extraction from the two leading rows of a sheet.
//!
//! # Responsibility
//! - Map free-text header labels (row 0) to columns by substring markers.
//! - Read event name, level, dates and first-time flag from row 1.
//!
//! # Invariants
//! - Header markers may appear in any column order.
//! - For each field the first matching column wins.
//! - Level resolution scans `LEVEL_RULES` in table order, not the cell text.
//! - A level pattern hit is ignored when that spot of the text is covered by
//!   a longer `LEVEL_RULES` pattern, so `межфакультетский` never resolves
//!   through the shorter `факультетский` rule while `общефакультетский` does.

use super::{EventField, SheetError};
use crate::model::event::{EventDetails, EventLevel};
use crate::workbook::{Cell, SheetGrid};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;

static DOTTED_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]{1,2}\.[0-9]{1,2}\.[0-9]{4}").expect("valid dotted date regex")
});

const FIRST_TIME_TRUTHY: &[&str] = &["да", "yes", "1", "true"];

/// Metadata column kinds recognised in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Name,
    Level,
    Dates,
    FirstTime,
}

/// Ordered header markers; the first marker contained in a lower-cased
/// header cell claims that cell.
pub const HEADER_RULES: &[(&str, HeaderField)] = &[
    ("название мероприятия", HeaderField::Name),
    ("уровень", HeaderField::Level),
    ("даты проведения", HeaderField::Dates),
    ("впервые", HeaderField::FirstTime),
    ("организовано", HeaderField::FirstTime),
];

/// Ordered level patterns; the first pattern found in the cell text wins.
pub const LEVEL_RULES: &[(&str, EventLevel)] = &[
    ("факультетский", EventLevel::Faculty),
    ("курсовой", EventLevel::Course),
    ("университетский", EventLevel::University),
    ("межфакультетский", EventLevel::University),
    ("межуниверситетский", EventLevel::Interuniversity),
    ("региональный", EventLevel::Interuniversity),
    ("всероссийский", EventLevel::AllRussian),
    ("межрегиональный", EventLevel::AllRussian),
    ("день химика", EventLevel::ChemistryDay),
    ("капустник", EventLevel::Cabbage),
    ("посвящение в химики", EventLevel::Dedication),
];

/// Column indexes detected in a header row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderColumns {
    pub name: Option<usize>,
    pub level: Option<usize>,
    pub dates: Option<usize>,
    pub first_time: Option<usize>,
}

impl HeaderColumns {
    fn slot_mut(&mut self, field: HeaderField) -> &mut Option<usize> {
        match field {
            HeaderField::Name => &mut self.name,
            HeaderField::Level => &mut self.level,
            HeaderField::Dates => &mut self.dates,
            HeaderField::FirstTime => &mut self.first_time,
        }
    }
}

/// Detects metadata columns in a header row.
pub fn map_header_columns(header: &[Cell]) -> HeaderColumns {
    let mut columns = HeaderColumns::default();
    for (index, cell) in header.iter().enumerate() {
        let Some(label) = cell.trimmed_text() else {
            continue;
        };
        let label = label.to_lowercase();
        let Some(field) = classify_header(&label) else {
            continue;
        };
        let slot = columns.slot_mut(field);
        if slot.is_none() {
            *slot = Some(index);
        }
    }
    columns
}

fn classify_header(label: &str) -> Option<HeaderField> {
    HEADER_RULES
        .iter()
        .find(|(marker, _)| label.contains(marker))
        .map(|&(_, field)| field)
}

/// Extracts event metadata from rows 0 and 1 of `sheet`.
///
/// # Errors
/// - `MissingField(Name)` when the name cell is absent or blank, including
///   sheets with fewer than two rows.
/// - `MissingField(Level)` when no level rule matches.
/// - `MissingField(Dates)` when no date can be derived.
pub fn extract_event_metadata(sheet: &SheetGrid) -> Result<EventDetails, SheetError> {
    let columns = map_header_columns(sheet.row(0));
    let data = sheet.row(1);
    let value_at = |column: Option<usize>| {
        column
            .and_then(|index| data.get(index))
            .filter(|cell| !cell.is_blank())
    };

    let name = value_at(columns.name)
        .and_then(Cell::trimmed_text)
        .ok_or(SheetError::MissingField(EventField::Name))?;
    let level = value_at(columns.level)
        .and_then(|cell| match_level(&cell.as_text()))
        .ok_or(SheetError::MissingField(EventField::Level))?;
    let (start_date, end_date) = value_at(columns.dates)
        .and_then(parse_event_dates)
        .ok_or(SheetError::MissingField(EventField::Dates))?;
    let is_first_time = value_at(columns.first_time)
        .is_some_and(|cell| is_truthy_first_time(&cell.as_text()));

    Ok(EventDetails {
        name,
        level,
        start_date,
        end_date,
        is_first_time,
    })
}

/// Resolves free-text level description using `LEVEL_RULES`.
pub fn match_level(text: &str) -> Option<EventLevel> {
    let normalized = text.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    LEVEL_RULES
        .iter()
        .find(|(pattern, _)| contains_unshadowed(&normalized, pattern))
        .map(|&(_, level)| level)
}

fn contains_unshadowed(haystack: &str, pattern: &str) -> bool {
    haystack
        .match_indices(pattern)
        .any(|(index, _)| !is_shadowed(haystack, index, pattern))
}

/// `true` when the hit of `pattern` at `index` sits inside an occurrence of a
/// longer level pattern.
fn is_shadowed(haystack: &str, index: usize, pattern: &str) -> bool {
    LEVEL_RULES
        .iter()
        .map(|&(longer, _)| longer)
        .filter(|longer| longer.len() > pattern.len())
        .any(|longer| {
            longer.match_indices(pattern).any(|(offset, _)| {
                index
                    .checked_sub(offset)
                    .and_then(|start| haystack.get(start..))
                    .is_some_and(|rest| rest.starts_with(longer))
            })
        })
}

/// Derives `(start, end)` from a dates cell.
///
/// Native dates give a one-day range. Text is scanned for `D.M.YYYY`
/// tokens first; if there are none, a single hyphen-separated pair is tried.
pub fn parse_event_dates(cell: &Cell) -> Option<(NaiveDate, NaiveDate)> {
    if let Cell::Date(date) = cell {
        return Some((*date, *date));
    }

    let text = cell.as_text();
    let text = text.trim();
    let found: Vec<&str> = DOTTED_DATE_RE
        .find_iter(text)
        .map(|token| token.as_str())
        .collect();

    match found.as_slice() {
        [] => parse_hyphen_range(text),
        [single] => parse_dotted_date(single).map(|date| (date, date)),
        [first, second, ..] => Some((parse_dotted_date(first)?, parse_dotted_date(second)?)),
    }
}

fn parse_hyphen_range(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    if !text.contains('-') {
        return None;
    }
    let parts: Vec<&str> = text.split('-').collect();
    let [start, end] = parts.as_slice() else {
        return None;
    };
    Some((parse_dotted_date(start.trim())?, parse_dotted_date(end.trim())?))
}

/// Parses `D.M.YYYY` field by field; calendar-invalid values yield `None`.
fn parse_dotted_date(text: &str) -> Option<NaiveDate> {
    let mut fields = text.split('.');
    let day = parse_digits(fields.next()?, 1..=2)?;
    let month = parse_digits(fields.next()?, 1..=2)?;
    let year = parse_digits(fields.next()?, 4..=4)?;
    if fields.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn parse_digits(field: &str, width: RangeInclusive<usize>) -> Option<u32> {
    if !width.contains(&field.len()) || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

fn is_truthy_first_time(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    FIRST_TIME_TRUTHY.contains(&normalized.as_str())
}
