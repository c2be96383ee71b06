//! Post date resolution: relative day offsets to calendar dates.

use chrono::{Days, NaiveDate};
use thiserror::Error;

/// Failure to turn an offset into a date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostDateError {
    #[error("offset {0:?} is not an integer")]
    NotAnInteger(String),

    #[error("offset {0} leaves the supported calendar range")]
    OutOfRange(i64),
}

/// Add a signed day offset (given as text) to the reference date.
pub fn resolve_post_date(reference: NaiveDate, offset: &str) -> Result<NaiveDate, PostDateError> {
    let trimmed = offset.trim();
    let days: i64 = trimmed
        .parse()
        .map_err(|_| PostDateError::NotAnInteger(trimmed.to_string()))?;

    let shifted = if days >= 0 {
        reference.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        reference.checked_sub_days(Days::new(days.unsigned_abs()))
    };

    shifted.ok_or(PostDateError::OutOfRange(days))
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}
