//! Shared utilities for the salary processing pipeline.
//!
//! Column access helpers and the text scrubbing used by several resolvers.

use crate::error::{PipelineError, Result};
use polars::prelude::*;

// =============================================================================
// String Scrubbing Utilities
// =============================================================================

/// Currency glyph that leaks into scraped numeric fields.
pub const CURRENCY_GLYPH: char = '€';

/// Thousands separator used by the source data.
pub const THOUSANDS_SEPARATOR: char = ',';

/// Remove thousands separators and the currency glyph, then trim.
///
/// # Example
///
/// ```rust,ignore
/// use salary_processing::utils::strip_numeric_noise;
///
/// assert_eq!(strip_numeric_noise("€85,000"), "85000");
/// ```
pub fn strip_numeric_noise(s: &str) -> String {
    s.chars()
        .filter(|c| *c != THOUSANDS_SEPARATOR && *c != CURRENCY_GLYPH)
        .collect::<String>()
        .trim()
        .to_string()
}

/// Check whether a value still carries the currency glyph.
#[inline]
pub fn contains_currency_glyph(s: &str) -> bool {
    s.contains(CURRENCY_GLYPH)
}

/// Parse a finite floating point number, rejecting `inf`/`NaN` spellings.
pub fn parse_finite_f64(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Column Access Utilities
// =============================================================================

/// Fail with [`PipelineError::ColumnNotFound`] for the first missing column.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for name in names {
        if !present.iter().any(|p| p == name) {
            return Err(PipelineError::ColumnNotFound((*name).to_string()));
        }
    }
    Ok(())
}

/// Check if the table has a column with the given name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Collect a column as owned optional strings, casting if needed.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?;
    let casted = column.cast(&DataType::String)?;
    let values = casted
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();
    Ok(values)
}

/// Collect a column as optional floats, casting if needed.
///
/// NaN values are reported as missing.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::ColumnNotFound(name.to_string()))?;
    let casted = column.cast(&DataType::Float64)?;
    let values = casted
        .as_materialized_series()
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Count the null entries in a column of optional values.
pub fn count_missing<T>(values: &[Option<T>]) -> usize {
    values.iter().filter(|v| v.is_none()).count()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_numeric_noise() {
        assert_eq!(strip_numeric_noise("85,000"), "85000");
        assert_eq!(strip_numeric_noise("€1,234.5"), "1234.5");
        assert_eq!(strip_numeric_noise("  70,000 - 90,000 "), "70000 - 90000");
        assert_eq!(strip_numeric_noise("N/A"), "N/A");
    }

    #[test]
    fn test_contains_currency_glyph() {
        assert!(contains_currency_glyph("€ 50"));
        assert!(!contains_currency_glyph("50"));
    }

    #[test]
    fn test_parse_finite_f64() {
        assert_eq!(parse_finite_f64("42"), Some(42.0));
        assert_eq!(parse_finite_f64(" -1.5 "), Some(-1.5));
        assert_eq!(parse_finite_f64("inf"), None);
        assert_eq!(parse_finite_f64("NaN"), None);
        assert_eq!(parse_finite_f64("abc"), None);
    }

    #[test]
    fn test_require_columns() {
        let df = df!["salary" => ["1"], "status" => ["onsite"]].unwrap();
        assert!(require_columns(&df, &["salary", "status"]).is_ok());

        let err = require_columns(&df, &["salary", "skills"]).unwrap_err();
        assert!(matches!(err, PipelineError::ColumnNotFound(ref c) if c == "skills"));
    }

    #[test]
    fn test_string_values_casts_numbers() {
        let df = df!["size" => [Some(10i64), None]].unwrap();
        let values = string_values(&df, "size").unwrap();
        assert_eq!(values, vec![Some("10".to_string()), None]);
    }

    #[test]
    fn test_f64_values() {
        let df = df!["x" => [Some(1.5f64), None, Some(f64::NAN)]].unwrap();
        let values = f64_values(&df, "x").unwrap();
        assert_eq!(values, vec![Some(1.5), None, None]);
    }

    #[test]
    fn test_missing_column() {
        let df = df!["x" => [1.0f64]].unwrap();
        assert!(matches!(
            f64_values(&df, "y").unwrap_err(),
            PipelineError::ColumnNotFound(_)
        ));
    }

    #[test]
    fn test_count_missing() {
        assert_eq!(count_missing(&[Some(1), None, None]), 2);
    }
}
