// Instant parsing and time range validation
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RangeError {
    #[error("Invalid time format")]
    InvalidFormat,
    #[error("Start time must be earlier than end time")]
    Inverted,
    #[error("Invalid date format (YYYY-MM-DD)")]
    InvalidDate,
}

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse an instant. Strings carrying an offset are taken as-is; naive
/// strings are civil time in `local`.
pub fn parse_instant(input: &str, local: &FixedOffset) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Both ends must parse and `start < end`. Runs before any store access.
pub fn validate_range(
    start: Option<&str>,
    end: Option<&str>,
    local: &FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>), RangeError> {
    let start = start
        .and_then(|s| parse_instant(s, local))
        .ok_or(RangeError::InvalidFormat)?;
    let end = end
        .and_then(|s| parse_instant(s, local))
        .ok_or(RangeError::InvalidFormat)?;

    if start >= end {
        return Err(RangeError::Inverted);
    }
    Ok((start, end))
}

/// Shape check for `YYYY-MM-DD`; calendar validity is left to range parsing.
pub fn is_date_shaped(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
