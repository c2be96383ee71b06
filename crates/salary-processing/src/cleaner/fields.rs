//! Repair of currency/number-like text fields (revenue, company size).

use crate::types::Revenue;
use crate::utils::{contains_currency_glyph, parse_finite_f64, strip_numeric_noise};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Digits, one placeholder character, digits, magnitude letter.
static REVENUE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+.\d+[MBT]$").expect("revenue pattern is valid"));

/// Multiplier for a magnitude suffix letter.
///
/// Unrecognized letters fall back to 1 (the mantissa is taken as absolute).
/// The revenue pattern only admits M, B and T, so the fallback is reached only
/// by callers using this function directly.
pub fn magnitude_multiplier(suffix: char) -> f64 {
    match suffix {
        'M' => 1e6,
        'B' => 1e9,
        'T' => 1e12,
        _ => 1.0,
    }
}

/// Check whether a magnitude letter is one of the known suffixes.
pub fn is_known_magnitude(suffix: char) -> bool {
    matches!(suffix, 'M' | 'B' | 'T')
}

/// Resolve a raw revenue field.
///
/// Separators and the currency glyph are stripped first. Values matching the
/// magnitude pattern are expanded into absolute amounts; anything else is kept
/// as a category descriptor.
pub fn parse_revenue(raw: Option<&str>) -> Revenue {
    let Some(raw) = raw else {
        return Revenue::Missing;
    };

    let cleaned = strip_numeric_noise(raw);
    if cleaned.is_empty() {
        return Revenue::Missing;
    }

    if !REVENUE_PATTERN.is_match(&cleaned) {
        return Revenue::Category(cleaned);
    }

    expand_magnitude(&cleaned).map_or(Revenue::Category(cleaned), Revenue::Amount)
}

/// Expand `"<mantissa><letter>"` into an absolute amount.
///
/// Returns `None` when the mantissa is not a number (the pattern accepts any
/// placeholder character between the digit runs).
pub fn expand_magnitude(value: &str) -> Option<f64> {
    let suffix = value.chars().last()?;
    let mantissa = &value[..value.len() - suffix.len_utf8()];
    let mantissa = parse_finite_f64(mantissa)?;

    if !is_known_magnitude(suffix) {
        warn!(
            "Unknown revenue magnitude '{}' in {:?}, treating mantissa as absolute",
            suffix, value
        );
    }

    Some(mantissa * magnitude_multiplier(suffix))
}

/// Outcome of resolving a raw company size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompanySize {
    Value(f64),
    /// Value carried the currency glyph and cannot be trusted.
    Corrupted,
    /// Value missing or not numeric.
    Missing,
}

impl CompanySize {
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }
}

/// Resolve a raw company size field.
pub fn parse_company_size(raw: Option<&str>) -> CompanySize {
    let Some(raw) = raw else {
        return CompanySize::Missing;
    };

    if contains_currency_glyph(raw) {
        return CompanySize::Corrupted;
    }

    let cleaned = strip_numeric_noise(raw);
    parse_finite_f64(&cleaned).map_or(CompanySize::Missing, CompanySize::Value)
}
