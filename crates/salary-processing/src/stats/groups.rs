//! Per-country outlier filtering and salary normalization.
//!
//! Rows are partitioned by `country_code`; rows without a code form their own
//! group. Every group is filtered and normalized independently, and rows keep
//! their original relative order in every produced table.

use super::descriptive::{IqrFences, mean, sample_std};
use crate::config::{DEFAULT_IQR_MULTIPLIER, DEFAULT_MIN_GROUP_SIZE};
use crate::error::Result;
use crate::types::{GroupSummary, columns};
use crate::utils::{f64_values, require_columns, string_values};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Row indices of each country group, ordered by country code (unknown first).
pub type CountryGroups = BTreeMap<Option<String>, Vec<usize>>;

/// Group-wise statistics engine over a cleaned table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupStatistics {
    iqr_multiplier: f64,
    min_group_size: usize,
}

impl Default for GroupStatistics {
    fn default() -> Self {
        Self::new(DEFAULT_IQR_MULTIPLIER, DEFAULT_MIN_GROUP_SIZE)
    }
}

impl GroupStatistics {
    pub fn new(iqr_multiplier: f64, min_group_size: usize) -> Self {
        Self {
            iqr_multiplier,
            min_group_size,
        }
    }

    /// Partition row indices by country code.
    pub fn partition(df: &DataFrame) -> Result<CountryGroups> {
        let codes = string_values(df, columns::COUNTRY_CODE)?;
        let mut groups = CountryGroups::new();
        for (row, code) in codes.into_iter().enumerate() {
            groups.entry(code).or_default().push(row);
        }
        Ok(groups)
    }

    /// Drop salary outliers within each country group.
    ///
    /// Groups with fewer than `min_group_size` rows are kept whole. In larger
    /// groups a row survives only if its `salary_avg` lies inside the inclusive
    /// IQR fences; rows without a salary cannot be compared and are dropped.
    pub fn iqr_filter(&self, df: &DataFrame) -> Result<DataFrame> {
        require_columns(df, &[columns::COUNTRY_CODE, columns::SALARY_AVG])?;

        let salaries = f64_values(df, columns::SALARY_AVG)?;
        let mut keep = vec![false; df.height()];

        for (code, rows) in Self::partition(df)? {
            if rows.len() < self.min_group_size {
                debug!(
                    "Group {:?} has {} rows, skipping outlier filter",
                    code,
                    rows.len()
                );
                rows.iter().for_each(|&row| keep[row] = true);
                continue;
            }

            let values = group_salaries(&salaries, &rows);
            let Some(fences) = IqrFences::from_values(&values, self.iqr_multiplier) else {
                debug!("Group {:?} has no salaries, dropping all rows", code);
                continue;
            };

            let mut dropped = 0;
            for &row in &rows {
                keep[row] = salaries[row].is_some_and(|s| fences.contains(s));
                if !keep[row] {
                    dropped += 1;
                }
            }
            debug!(
                "Group {:?}: fences [{}, {}], dropped {} of {} rows",
                code,
                fences.lower,
                fences.upper,
                dropped,
                rows.len()
            );
        }

        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    /// Append `salary_avg_normalized`: the z-score of `salary_avg` within its
    /// country group, using the group's sample mean and standard deviation.
    ///
    /// When the standard deviation is zero or undefined every row of the group
    /// gets 0, including rows without a salary. Otherwise rows without a
    /// salary get null.
    pub fn normalize(&self, df: &DataFrame) -> Result<DataFrame> {
        require_columns(df, &[columns::COUNTRY_CODE, columns::SALARY_AVG])?;

        let salaries = f64_values(df, columns::SALARY_AVG)?;
        let mut normalized: Vec<Option<f64>> = vec![None; df.height()];

        for (code, rows) in Self::partition(df)? {
            let values = group_salaries(&salaries, &rows);
            let center = mean(&values);
            let spread = sample_std(&values).filter(|s| *s > 0.0);

            if spread.is_none() {
                debug!("Group {:?} has no salary spread, z-scores set to 0", code);
            }

            for &row in &rows {
                normalized[row] = match (salaries[row], center, spread) {
                    (_, _, None) => Some(0.0),
                    (Some(s), Some(m), Some(sd)) => Some((s - m) / sd),
                    _ => None,
                };
            }
        }

        let mut result = df.clone();
        result.with_column(Series::new(
            columns::SALARY_AVG_NORMALIZED.into(),
            normalized,
        ))?;
        Ok(result)
    }

    /// Filter then normalize, the view used for outlier-free comparisons.
    pub fn filter_and_normalize(&self, df: &DataFrame) -> Result<DataFrame> {
        let filtered = self.iqr_filter(df)?;
        self.normalize(&filtered)
    }

    /// Summarize every country group of `df`.
    pub fn summarize(&self, df: &DataFrame) -> Result<Vec<GroupSummary>> {
        require_columns(df, &[columns::COUNTRY_CODE, columns::SALARY_AVG])?;

        let salaries = f64_values(df, columns::SALARY_AVG)?;
        let summaries = Self::partition(df)?
            .into_iter()
            .map(|(country_code, rows)| {
                let values = group_salaries(&salaries, &rows);
                let fences = IqrFences::from_values(&values, self.iqr_multiplier);
                let filtered = rows.len() >= self.min_group_size;
                GroupSummary {
                    country_code,
                    rows: rows.len(),
                    salaries: values.len(),
                    mean: mean(&values),
                    std_dev: sample_std(&values),
                    q1: fences.map(|f| f.q1),
                    q3: fences.map(|f| f.q3),
                    lower_fence: fences.filter(|_| filtered).map(|f| f.lower),
                    upper_fence: fences.filter(|_| filtered).map(|f| f.upper),
                }
            })
            .collect();
        Ok(summaries)
    }
}

fn group_salaries(salaries: &[Option<f64>], rows: &[usize]) -> Vec<f64> {
    rows.iter().filter_map(|&row| salaries[row]).collect()
}
