// 📅 Normalizer / Sorter
// Human dates → NaiveDate, id text → u32, stable chronological order

use crate::accumulator::SealedRecord;
use crate::model::{Diagnostic, DiagnosticKind, Record};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("date {0:?} is not in 'Mon D, YYYY' form")]
    Shape(String),

    #[error("unknown month name {0:?}")]
    UnknownMonth(String),

    #[error("no such calendar day: {year}-{month:02}-{day:02}")]
    OutOfRange { year: i32, month: u32, day: u32 },
}

const MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

/// 1-based month number for an abbreviation or full month name
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.trim_end_matches('.').to_lowercase();
    MONTHS
        .iter()
        .position(|(abbr, full)| lower == *abbr || lower == *full)
        .map(|i| i as u32 + 1)
}

/// Parse `Jul 31, 2025` into a calendar date
pub fn parse_human_date(text: &str) -> Result<NaiveDate, DateError> {
    let shape = || DateError::Shape(text.to_string());

    let (month_day, year) = text.split_once(',').ok_or_else(shape)?;
    let mut parts = month_day.split_whitespace();
    let month_name = parts.next().ok_or_else(shape)?;
    let day_text = parts.next().ok_or_else(shape)?;
    if parts.next().is_some() {
        return Err(shape());
    }

    let month = month_number(month_name)
        .ok_or_else(|| DateError::UnknownMonth(month_name.to_string()))?;
    let day: u32 = day_text.parse().map_err(|_| shape())?;
    let year: i32 = year.trim().parse().map_err(|_| shape())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(DateError::OutOfRange { year, month, day })
}

/// Canonical YYYY-MM-DD form of a human date
pub fn normalize_date(text: &str) -> Result<String, DateError> {
    parse_human_date(text).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Convert one validated record; failures become diagnostics
pub fn normalize_record(record: SealedRecord) -> Result<Record, Diagnostic> {
    let date = parse_human_date(&record.date_text).map_err(|e| {
        Diagnostic::new(
            DiagnosticKind::InvalidDate,
            format!("record #{} dropped: {}", record.id_text, e),
        )
        .at_line(record.line)
    })?;

    let id: u32 = record.id_text.parse().map_err(|_| {
        Diagnostic::new(
            DiagnosticKind::InvalidId,
            format!(
                "record {} dropped: puzzle number {:?} is not a valid id",
                record.date_text, record.id_text
            ),
        )
        .at_line(record.line)
    })?;

    Ok(Record::new(date, id, record.categories))
}

/// Normalise every record, then sort by date (stable: equal dates keep input order)
pub fn normalize_records(
    validated: Vec<SealedRecord>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Record> {
    let mut records: Vec<Record> = validated
        .into_iter()
        .filter_map(|sealed| match normalize_record(sealed) {
            Ok(record) => Some(record),
            Err(diagnostic) => {
                warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
                None
            }
        })
        .collect();

    records.sort_by_key(|r| r.record_date);
    records
}
