use crate::skills::SkillPriceTable;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column names of the raw and cleaned job-posting tables.
pub mod columns {
    pub const JOB_TITLE: &str = "job_title";
    pub const SENIORITY_LEVEL: &str = "seniority_level";
    pub const SENIORITY_LEVEL_NUM: &str = "seniority_level_num";
    pub const STATUS: &str = "status";
    pub const COMPANY: &str = "company";
    pub const LOCATION: &str = "location";
    pub const COUNTRY_CODE: &str = "country_code";
    pub const POST_DATE: &str = "post_date";
    pub const HEADQUARTER: &str = "headquarter";
    pub const INDUSTRY: &str = "industry";
    pub const OWNERSHIP: &str = "ownership";
    pub const COMPANY_SIZE: &str = "company_size";
    pub const REVENUE: &str = "revenue";
    pub const REVENUE_CATEGORY: &str = "revenue_category";
    pub const SALARY: &str = "salary";
    pub const SALARY_LOW: &str = "salary_low";
    pub const SALARY_AVG: &str = "salary_avg";
    pub const SALARY_HIGH: &str = "salary_high";
    pub const SALARY_AVG_NORMALIZED: &str = "salary_avg_normalized";
    pub const SKILLS: &str = "skills";

    /// Columns every raw input must provide.
    pub const REQUIRED_RAW: [&str; 7] = [
        SALARY,
        REVENUE,
        COMPANY_SIZE,
        LOCATION,
        STATUS,
        POST_DATE,
        SKILLS,
    ];

    /// Free-text columns that are lower-cased and trimmed when present.
    pub const PASSTHROUGH_TEXT: [&str; 6] = [
        JOB_TITLE,
        SENIORITY_LEVEL,
        COMPANY,
        HEADQUARTER,
        INDUSTRY,
        OWNERSHIP,
    ];
}

/// A salary resolved into its low, average and high components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub low: f64,
    pub avg: f64,
    pub high: f64,
}

impl SalaryRange {
    /// A single salary value: all three components are equal.
    pub fn single(value: f64) -> Self {
        Self {
            low: value,
            avg: value,
            high: value,
        }
    }

    /// A range given as two bounds; the average is their midpoint.
    pub fn between(low: f64, high: f64) -> Self {
        Self {
            low,
            avg: (low + high) / 2.0,
            high,
        }
    }
}

/// Outcome of resolving a raw revenue field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Revenue {
    /// Absolute amount in currency units.
    Amount(f64),
    /// Descriptor that is not a magnitude (kept verbatim in `revenue_category`).
    Category(String),
    /// No value present.
    Missing,
}

impl Revenue {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(v) => Some(*v),
            _ => None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Category(c) => Some(c.as_str()),
            _ => None,
        }
    }
}

/// Per-field counts gathered while cleaning a raw table.
///
/// Every counter refers to rows of the input; no row is ever dropped by
/// cleaning, so `rows_out == rows_in`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    /// Salary fields nulled because the text was not a value or range.
    pub salary_unparsed: usize,
    /// Rows with no salary text at all.
    pub salary_missing: usize,
    /// Revenue values routed to `revenue_category`.
    pub revenue_categorized: usize,
    /// Rows whose numeric revenue is null.
    pub revenue_null: usize,
    /// Company sizes nulled because they carried the currency glyph.
    pub company_size_currency: usize,
    /// Rows whose numeric company size is null.
    pub company_size_null: usize,
    /// Locations discarded because they repeated the remote status.
    pub location_status_collisions: usize,
    /// Rows left without a country code.
    pub country_unresolved: usize,
    /// Rows whose seniority level has no known rank.
    pub seniority_unranked: usize,
}

/// Statistics of one country partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Country code, `None` for the unknown group.
    pub country_code: Option<String>,
    pub rows: usize,
    /// Rows with a usable `salary_avg`.
    pub salaries: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std_dev: Option<f64>,
    pub q1: Option<f64>,
    pub q3: Option<f64>,
    /// Inclusive outlier fences, present when the group is large enough to filter.
    pub lower_fence: Option<f64>,
    pub upper_fence: Option<f64>,
}

/// Aggregate salary statistics of one skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillStat {
    pub skill: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Normalized-salary summary of one category value (industry, status, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Option<String>,
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Everything a pipeline run computes.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Cleaned table, one row per input row.
    pub cleaned: DataFrame,
    pub cleaning: CleaningSummary,
    /// Cleaned table plus per-country z-scores, no rows dropped.
    pub normalized_unfiltered: DataFrame,
    /// Outlier-filtered table plus per-country z-scores.
    pub normalized_filtered: DataFrame,
    /// Per-country statistics of the cleaned table.
    pub groups: Vec<GroupSummary>,
    /// Skill prices over raw `salary_avg`.
    pub raw_skills: SkillPriceTable,
    /// Skill prices over z-scores of the unfiltered view.
    pub normalized_skills: SkillPriceTable,
    /// Skill prices over z-scores of the filtered view.
    pub filtered_skills: SkillPriceTable,
    /// Category column name to its breakdown over the unfiltered z-scores.
    pub breakdowns: BTreeMap<String, Vec<CategoryBreakdown>>,
    pub duration_ms: u64,
}
