//! Salary range resolution.
//!
//! A salary is either a single decimal number or two numbers separated by the
//! literal `" - "`. Bounds keep the order in which they were given.

use crate::types::SalaryRange;
use crate::utils::parse_finite_f64;
use thiserror::Error;

/// Separator between the bounds of a salary range.
pub const RANGE_SEPARATOR: &str = " - ";

/// Failure to read a salary text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalaryParseError {
    #[error("salary is empty")]
    Empty,

    #[error("salary {0:?} is not a decimal number")]
    InvalidNumber(String),

    #[error("salary range bound {bound:?} in {text:?} is not a decimal number")]
    InvalidBound { text: String, bound: String },
}

/// Resolve an already scrubbed salary text into `(low, avg, high)`.
pub fn resolve_salary(text: &str) -> Result<SalaryRange, SalaryParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SalaryParseError::Empty);
    }

    match text.split_once(RANGE_SEPARATOR) {
        Some((low, high)) => {
            let parse_bound = |bound: &str| {
                parse_finite_f64(bound).ok_or_else(|| SalaryParseError::InvalidBound {
                    text: text.to_string(),
                    bound: bound.trim().to_string(),
                })
            };
            Ok(SalaryRange::between(parse_bound(low)?, parse_bound(high)?))
        }
        None => parse_finite_f64(text)
            .map(SalaryRange::single)
            .ok_or_else(|| SalaryParseError::InvalidNumber(text.to_string())),
    }
}
