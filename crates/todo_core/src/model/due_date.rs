//! Lenient calendar-date parsing for client-supplied due dates.
//!
//! # Invariants
//! - Output is a plain calendar date; any time or offset component is dropped.
//! - Formatting always yields `yyyy-MM-dd`.

use super::todo::TodoValidationError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Canonical storage and wire format.
pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

// chrono accepts unpadded numeric fields, so `%Y-%m-%d` also covers `2021-9-2`.
const DATE_FORMATS: &[&str] = &[
    DUE_DATE_FORMAT,
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
];

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses a client date string into a calendar date.
///
/// # Errors
/// - Returns `TodoValidationError::InvalidDueDate` when no known shape matches.
pub fn parse_due_date(raw: &str) -> Result<NaiveDate, TodoValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(TodoValidationError::InvalidDueDate);
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Ok(date);
    }

    if let Ok(date_time) = DateTime::parse_from_rfc3339(value) {
        return Ok(date_time.date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|date_time| date_time.date())
        .ok_or(TodoValidationError::InvalidDueDate)
}

/// Formats a date in the canonical `yyyy-MM-dd` form.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}
