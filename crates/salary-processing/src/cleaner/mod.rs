//! Cleaning of raw job-posting tables.
//!
//! This module turns the scraped, all-text table into a typed one:
//! - Salary text resolved into low/average/high
//! - Revenue expanded from magnitude notation, with descriptors kept aside
//! - Company size repaired or nulled
//! - Location resolved into a country code
//! - Relative post dates resolved against the reference date
//! - Passthrough text lower-cased and trimmed
//!
//! Cleaning never drops a row. Per-field failures become nulls and are counted
//! in a [`CleaningSummary`]; only an unreadable post date aborts the run.

mod dates;
mod fields;
mod location;
mod salary;
mod text;

pub use dates::{PostDateError, days_since_epoch, resolve_post_date};
pub use fields::{CompanySize, expand_magnitude, magnitude_multiplier, parse_company_size, parse_revenue};
pub use location::{CountryPattern, FULLY_REMOTE, LocationOutcome, Matcher, country_patterns, resolve_location};
pub use salary::{RANGE_SEPARATOR, SalaryParseError, resolve_salary};
pub use text::{normalize_text, seniority_rank};

use crate::error::{PipelineError, Result};
use crate::types::{CleaningSummary, Revenue, columns};
use crate::utils::{count_missing, has_column, require_columns, string_values, strip_numeric_noise};
use chrono::NaiveDate;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Column order of the cleaned table. Input columns not listed here follow in
/// their original order.
pub const CLEANED_COLUMN_ORDER: [&str; 19] = [
    columns::JOB_TITLE,
    columns::SENIORITY_LEVEL,
    columns::SENIORITY_LEVEL_NUM,
    columns::STATUS,
    columns::COMPANY,
    columns::LOCATION,
    columns::COUNTRY_CODE,
    columns::POST_DATE,
    columns::HEADQUARTER,
    columns::INDUSTRY,
    columns::OWNERSHIP,
    columns::COMPANY_SIZE,
    columns::REVENUE,
    columns::REVENUE_CATEGORY,
    columns::SALARY,
    columns::SALARY_LOW,
    columns::SALARY_AVG,
    columns::SALARY_HIGH,
    columns::SKILLS,
];

/// Cleaner for raw job-posting tables.
#[derive(Debug, Clone)]
pub struct JobPostingCleaner {
    reference_date: NaiveDate,
}

impl JobPostingCleaner {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Clean a raw table.
    ///
    /// Returns the cleaned table (same row count, same row order) and the
    /// per-field counters.
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningSummary)> {
        require_columns(df, &columns::REQUIRED_RAW)?;

        let height = df.height();
        let mut summary = CleaningSummary {
            rows_in: height,
            ..Default::default()
        };

        info!("Cleaning {} job postings...", height);

        let mut cleaned: Vec<(&'static str, Column)> = Vec::with_capacity(CLEANED_COLUMN_ORDER.len());

        // Post dates first: an unreadable offset aborts before any other work.
        cleaned.push((columns::POST_DATE, self.clean_post_dates(df)?));

        for name in columns::PASSTHROUGH_TEXT {
            if has_column(df, name) {
                let values = normalized_text_values(df, name)?;
                cleaned.push((name, Series::new(name.into(), values).into_column()));
            }
        }

        let seniority = if has_column(df, columns::SENIORITY_LEVEL) {
            normalized_text_values(df, columns::SENIORITY_LEVEL)?
        } else {
            vec![None; height]
        };
        let ranks: Vec<Option<i32>> = seniority
            .iter()
            .map(|level| level.as_deref().and_then(seniority_rank))
            .collect();
        summary.seniority_unranked = seniority
            .iter()
            .zip(&ranks)
            .filter(|(level, rank)| level.is_some() && rank.is_none())
            .count();
        cleaned.push((
            columns::SENIORITY_LEVEL_NUM,
            Series::new(columns::SENIORITY_LEVEL_NUM.into(), ranks).into_column(),
        ));

        cleaned.extend(self.clean_location(df, &mut summary)?);
        cleaned.push((columns::COMPANY_SIZE, clean_company_size(df, &mut summary)?));
        cleaned.extend(clean_revenue(df, &mut summary)?);
        cleaned.extend(clean_salary(df, &mut summary)?);
        cleaned.push((columns::SKILLS, df.column(columns::SKILLS)?.clone()));

        let mut ordered: Vec<Column> = Vec::with_capacity(df.width() + 4);
        for name in CLEANED_COLUMN_ORDER {
            if let Some(position) = cleaned.iter().position(|(n, _)| *n == name) {
                ordered.push(cleaned.swap_remove(position).1);
            }
        }
        for column in df.get_columns() {
            let name = column.name().as_str();
            if !CLEANED_COLUMN_ORDER.contains(&name) {
                debug!("Passing through unrecognized column '{}'", name);
                ordered.push(column.clone());
            }
        }

        let result = DataFrame::new(ordered)?;
        summary.rows_out = result.height();

        info!(
            "Cleaning complete: {} rows, {} unparsed salaries, {} unresolved countries",
            summary.rows_out, summary.salary_unparsed, summary.country_unresolved
        );

        Ok((result, summary))
    }

    fn clean_post_dates(&self, df: &DataFrame) -> Result<Column> {
        let raw = string_values(df, columns::POST_DATE)?;
        let mut days = Vec::with_capacity(raw.len());

        for (row, value) in raw.iter().enumerate() {
            let text = value.as_deref().unwrap_or_default();
            let date = resolve_post_date(self.reference_date, text).map_err(|e| match e {
                PostDateError::NotAnInteger(value) => PipelineError::InvalidPostDate { row, value },
                PostDateError::OutOfRange(offset) => PipelineError::PostDateOutOfRange { row, offset },
            })?;
            days.push(days_since_epoch(date));
        }

        debug!(
            "Resolved {} post dates against {}",
            days.len(),
            self.reference_date
        );

        let dates = Series::new(columns::POST_DATE.into(), days).cast(&DataType::Date)?;
        Ok(dates.into_column())
    }

    fn clean_location(
        &self,
        df: &DataFrame,
        summary: &mut CleaningSummary,
    ) -> Result<Vec<(&'static str, Column)>> {
        let status = normalized_text_values(df, columns::STATUS)?;
        let location = normalized_text_values(df, columns::LOCATION)?;

        let mut kept_location = Vec::with_capacity(location.len());
        let mut country_code = Vec::with_capacity(location.len());

        for (loc, stat) in location.into_iter().zip(&status) {
            let outcome = resolve_location(loc.as_deref(), stat.as_deref());
            match outcome {
                LocationOutcome::StatusCollision => summary.location_status_collisions += 1,
                LocationOutcome::Unresolved => {
                    debug!("No country pattern matches location {:?}", loc);
                }
                _ => {}
            }
            country_code.push(outcome.country_code());
            kept_location.push(if outcome.keeps_location() { loc } else { None });
        }

        summary.country_unresolved = count_missing(&country_code);

        Ok(vec![
            (columns::STATUS, Series::new(columns::STATUS.into(), status).into_column()),
            (
                columns::LOCATION,
                Series::new(columns::LOCATION.into(), kept_location).into_column(),
            ),
            (
                columns::COUNTRY_CODE,
                Series::new(columns::COUNTRY_CODE.into(), country_code).into_column(),
            ),
        ])
    }
}

fn normalized_text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(string_values(df, name)?
        .iter()
        .map(|v| normalize_text(v.as_deref()))
        .collect())
}

fn clean_company_size(df: &DataFrame, summary: &mut CleaningSummary) -> Result<Column> {
    let values: Vec<Option<f64>> = string_values(df, columns::COMPANY_SIZE)?
        .iter()
        .map(|raw| {
            let size = parse_company_size(raw.as_deref());
            if size == CompanySize::Corrupted {
                summary.company_size_currency += 1;
            }
            size.value()
        })
        .collect();

    summary.company_size_null = count_missing(&values);
    Ok(Series::new(columns::COMPANY_SIZE.into(), values).into_column())
}

fn clean_revenue(
    df: &DataFrame,
    summary: &mut CleaningSummary,
) -> Result<Vec<(&'static str, Column)>> {
    let parsed: Vec<Revenue> = string_values(df, columns::REVENUE)?
        .iter()
        .map(|raw| parse_revenue(raw.as_deref()))
        .collect();

    let amounts: Vec<Option<f64>> = parsed.iter().map(Revenue::amount).collect();
    let categories: Vec<Option<&str>> = parsed.iter().map(Revenue::category).collect();

    summary.revenue_categorized = categories.iter().filter(|c| c.is_some()).count();
    summary.revenue_null = count_missing(&amounts);

    Ok(vec![
        (columns::REVENUE, Series::new(columns::REVENUE.into(), amounts).into_column()),
        (
            columns::REVENUE_CATEGORY,
            Series::new(columns::REVENUE_CATEGORY.into(), categories).into_column(),
        ),
    ])
}

fn clean_salary(
    df: &DataFrame,
    summary: &mut CleaningSummary,
) -> Result<Vec<(&'static str, Column)>> {
    let raw = string_values(df, columns::SALARY)?;
    let height = raw.len();

    let mut text = Vec::with_capacity(height);
    let mut low = Vec::with_capacity(height);
    let mut avg = Vec::with_capacity(height);
    let mut high = Vec::with_capacity(height);

    for (row, value) in raw.iter().enumerate() {
        let scrubbed = value
            .as_deref()
            .map(strip_numeric_noise)
            .filter(|s| !s.is_empty());

        let range = match scrubbed.as_deref() {
            None => {
                summary.salary_missing += 1;
                None
            }
            Some(s) => match resolve_salary(s) {
                Ok(range) => Some(range),
                Err(e) => {
                    warn!("Row {}: {}", row, e);
                    summary.salary_unparsed += 1;
                    None
                }
            },
        };

        low.push(range.map(|r| r.low));
        avg.push(range.map(|r| r.avg));
        high.push(range.map(|r| r.high));
        text.push(scrubbed);
    }

    Ok(vec![
        (columns::SALARY, Series::new(columns::SALARY.into(), text).into_column()),
        (columns::SALARY_LOW, Series::new(columns::SALARY_LOW.into(), low).into_column()),
        (columns::SALARY_AVG, Series::new(columns::SALARY_AVG.into(), avg).into_column()),
        (columns::SALARY_HIGH, Series::new(columns::SALARY_HIGH.into(), high).into_column()),
    ])
}
