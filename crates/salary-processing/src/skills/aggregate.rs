//! Per-skill salary aggregation.

use super::parser::{normalize_skill, parse_skill_list};
use crate::error::Result;
use crate::stats::descriptive::{mean, population_std};
use crate::types::{SkillStat, columns};
use crate::utils::{f64_values, require_columns, string_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Salary measure accumulated per skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryMeasure {
    /// `salary_avg` in currency units.
    Raw,
    /// `salary_avg_normalized`, the per-country z-score.
    Normalized,
}

impl SalaryMeasure {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Raw => columns::SALARY_AVG,
            Self::Normalized => columns::SALARY_AVG_NORMALIZED,
        }
    }
}

/// Column names of an exported skill table.
pub mod table_columns {
    pub const SKILL: &str = "skill";
    pub const AVERAGE_SALARY: &str = "average_salary";
    pub const COUNT: &str = "count";
    pub const MIN_SALARY: &str = "min_salary";
    pub const MAX_SALARY: &str = "max_salary";
    pub const STD_DEVIATION: &str = "std_deviation";
}

/// Aggregated skill statistics, ordered by average descending then by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPriceTable {
    pub measure: SalaryMeasure,
    pub stats: Vec<SkillStat>,
    /// Rows whose skill list could not be read.
    pub rows_malformed: usize,
    /// Rows with skills but no value for the measure.
    pub rows_without_measure: usize,
}

impl SkillPriceTable {
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, skill: &str) -> Option<&SkillStat> {
        self.stats.iter().find(|s| s.skill == skill)
    }

    pub fn top(&self, n: usize) -> &[SkillStat] {
        &self.stats[..n.min(self.stats.len())]
    }

    pub fn bottom(&self, n: usize) -> &[SkillStat] {
        &self.stats[self.stats.len().saturating_sub(n)..]
    }

    /// Unweighted mean of the per-skill averages, `None` for an empty table.
    pub fn overall_average(&self) -> Option<f64> {
        let averages: Vec<f64> = self.stats.iter().map(|s| s.mean).collect();
        mean(&averages)
    }

    /// Export as a table with the skill-price columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let skill: Vec<&str> = self.stats.iter().map(|s| s.skill.as_str()).collect();
        let average: Vec<f64> = self.stats.iter().map(|s| s.mean).collect();
        let count: Vec<u64> = self.stats.iter().map(|s| s.count as u64).collect();
        let min: Vec<f64> = self.stats.iter().map(|s| s.min).collect();
        let max: Vec<f64> = self.stats.iter().map(|s| s.max).collect();
        let std_dev: Vec<f64> = self.stats.iter().map(|s| s.std_dev).collect();

        Ok(DataFrame::new(vec![
            Series::new(table_columns::SKILL.into(), skill).into_column(),
            Series::new(table_columns::AVERAGE_SALARY.into(), average).into_column(),
            Series::new(table_columns::COUNT.into(), count).into_column(),
            Series::new(table_columns::MIN_SALARY.into(), min).into_column(),
            Series::new(table_columns::MAX_SALARY.into(), max).into_column(),
            Series::new(table_columns::STD_DEVIATION.into(), std_dev).into_column(),
        ])?)
    }
}

/// Builds skill price tables from cleaned (and optionally normalized) tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillPriceAggregator;

impl SkillPriceAggregator {
    /// Accumulate `measure` for every skill listed in each row.
    ///
    /// A row listing the same skill twice contributes to it twice. Rows with an
    /// unreadable skill list or no measure value contribute nothing.
    pub fn aggregate(&self, df: &DataFrame, measure: SalaryMeasure) -> Result<SkillPriceTable> {
        require_columns(df, &[columns::SKILLS, measure.column()])?;

        let skills = string_values(df, columns::SKILLS)?;
        let values = f64_values(df, measure.column())?;

        let mut per_skill: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut rows_malformed = 0;
        let mut rows_without_measure = 0;

        for (row, (list, value)) in skills.iter().zip(values).enumerate() {
            let items = match list.as_deref().map(parse_skill_list) {
                Some(Ok(items)) => items,
                Some(Err(e)) => {
                    warn!("Row {}: skipping unreadable skill list: {}", row, e);
                    rows_malformed += 1;
                    continue;
                }
                None => {
                    rows_malformed += 1;
                    continue;
                }
            };
            if items.is_empty() {
                continue;
            }

            let Some(value) = value else {
                rows_without_measure += 1;
                continue;
            };

            for skill in items.iter().filter_map(|s| normalize_skill(s)) {
                per_skill.entry(skill).or_default().push(value);
            }
        }

        let mut stats: Vec<SkillStat> = per_skill
            .into_iter()
            .filter_map(|(skill, values)| {
                Some(SkillStat {
                    count: values.len(),
                    mean: mean(&values)?,
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    std_dev: population_std(&values)?,
                    skill,
                })
            })
            .collect();

        stats.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.skill.cmp(&b.skill)));

        debug!(
            "Aggregated {} skills over {:?} ({} malformed rows)",
            stats.len(),
            measure,
            rows_malformed
        );

        Ok(SkillPriceTable {
            measure,
            stats,
            rows_malformed,
            rows_without_measure,
        })
    }
}
