//! Normalized salary per category value (seniority, industry, work status).

use super::descriptive::{mean, median};
use crate::error::Result;
use crate::types::{CategoryBreakdown, columns};
use crate::utils::{f64_values, require_columns, string_values};
use polars::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Categories summarized in the run report.
pub const BREAKDOWN_COLUMNS: [&str; 3] = [
    columns::SENIORITY_LEVEL,
    columns::INDUSTRY,
    columns::STATUS,
];

/// Summarize `measure` for every distinct value of `category`.
///
/// `count` counts rows; mean and median skip rows without a measure. Results
/// are ordered by median, highest first; categories without a median come last.
pub fn category_breakdown(
    df: &DataFrame,
    category: &str,
    measure: &str,
) -> Result<Vec<CategoryBreakdown>> {
    require_columns(df, &[category, measure])?;

    let keys = string_values(df, category)?;
    let values = f64_values(df, measure)?;

    let mut buckets: BTreeMap<Option<String>, (usize, Vec<f64>)> = BTreeMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        let bucket = buckets.entry(key).or_default();
        bucket.0 += 1;
        bucket.1.extend(value);
    }

    let mut breakdown: Vec<CategoryBreakdown> = buckets
        .into_iter()
        .map(|(category, (count, measures))| CategoryBreakdown {
            category,
            count,
            mean: mean(&measures),
            median: median(&measures),
        })
        .collect();

    breakdown.sort_by(|a, b| match (a.median, b.median) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    Ok(breakdown)
}
