//! Input validation for proposal documents.

use chrono::{DateTime, NaiveDate};
use thiserror::Error;

use crate::models::ProposalDocument;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A timeline date in neither `YYYY-MM-DD` nor RFC 3339 form.
    #[error("Invalid date format for {field}: {value:?}")]
    InvalidDate { field: &'static str, value: String },

    #[error("End date must be after start date ({start} to {end})")]
    TimelineReversed { start: NaiveDate, end: NaiveDate },

    #[error("{field} is too long ({actual} chars, max {max})")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{0} cannot be empty")]
    Empty(&'static str),
}

/// Maximum allowed length for a proposal name.
pub const MAX_NAME_LENGTH: usize = 200;

fn validate_name(field: &'static str, name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len == 0 {
        return Err(ValidationError::Empty(field));
    }
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_NAME_LENGTH,
            actual: len,
        });
    }
    Ok(())
}

/// Parse an optional timeline date, either `YYYY-MM-DD` or RFC 3339.
/// Blank values count as unset.
fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

/// Validate a document before it is stored.
///
/// Only enforced on writes. Stored documents are read through the
/// normalizer, which accepts anything.
pub fn validate_document(document: &ProposalDocument) -> Result<(), ValidationError> {
    validate_name("name", &document.name)?;

    let start = parse_date("timelineStart", document.timeline_start.as_deref())?;
    let end = parse_date("timelineEnd", document.timeline_end.as_deref())?;
    if let (Some(start), Some(end)) = (start, end) {
        if end <= start {
            return Err(ValidationError::TimelineReversed { start, end });
        }
    }

    Ok(())
}
