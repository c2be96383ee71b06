//! Configuration types for the salary processing pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Reference date that post date offsets are counted from (2025-06-01).
pub const DEFAULT_REFERENCE_DATE: (i32, u32, u32) = (2025, 6, 1);

/// Default IQR multiplier for outlier fences.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;

/// Groups smaller than this are left untouched by the outlier filter.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 4;

/// Default name of the cleaned dataset (without extension).
pub const DEFAULT_CLEANED_NAME: &str = "cleaned_job_posts";

fn default_reference_date() -> NaiveDate {
    let (year, month, day) = DEFAULT_REFERENCE_DATE;
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Configuration for the salary processing pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use salary_processing::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .iqr_multiplier(1.5)
///     .output_dir("results")
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Date that `post_date` offsets are added to.
    /// Default: 2025-06-01
    pub reference_date: NaiveDate,

    /// Multiplier applied to the IQR to build the outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Country groups with fewer rows than this skip outlier filtering.
    /// Default: 4
    pub min_group_size: usize,

    /// Output directory for the cleaned table, skill tables and report.
    /// Default: "output"
    pub output_dir: PathBuf,

    /// File name (without extension) of the cleaned table.
    /// Default: "cleaned_job_posts"
    pub cleaned_name: String,

    /// Whether to write the output tables to disk.
    /// When false, results are kept in memory only.
    /// Default: true
    pub save_to_disk: bool,

    /// Whether to write the JSON run report next to the tables.
    /// Ignored when `save_to_disk` is false.
    /// Default: true
    pub generate_report: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_date: default_reference_date(),
            iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            output_dir: PathBuf::from("output"),
            cleaned_name: DEFAULT_CLEANED_NAME.to_string(),
            save_to_disk: true,
            generate_report: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        if self.min_group_size < 2 {
            return Err(ConfigValidationError::InvalidMinGroupSize(
                self.min_group_size,
            ));
        }

        if self.cleaned_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyOutputName);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid IQR multiplier: {0} (must be a finite, non-negative number)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid minimum group size: {0} (must be at least 2)")]
    InvalidMinGroupSize(usize),

    #[error("Invalid reference date: {0} (expected YYYY-MM-DD)")]
    InvalidReferenceDate(String),

    #[error("Output name must not be empty")]
    EmptyOutputName,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    reference_date: Option<NaiveDate>,
    reference_date_text: Option<String>,
    iqr_multiplier: Option<f64>,
    min_group_size: Option<usize>,
    output_dir: Option<PathBuf>,
    cleaned_name: Option<String>,
    save_to_disk: Option<bool>,
    generate_report: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the date that post date offsets are counted from.
    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Set the reference date from `YYYY-MM-DD` text.
    ///
    /// Parsing is deferred to [`build`](Self::build) so the error surfaces
    /// together with the other validation errors.
    pub fn reference_date_str(mut self, date: impl Into<String>) -> Self {
        self.reference_date_text = Some(date.into());
        self
    }

    /// Set the IQR multiplier used for the outlier fences.
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the minimum group size for outlier filtering.
    pub fn min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = Some(size);
        self
    }

    /// Set the output directory.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the cleaned table file name (without extension).
    pub fn cleaned_name(mut self, name: impl Into<String>) -> Self {
        self.cleaned_name = Some(name.into());
        self
    }

    /// Enable or disable writing outputs to disk.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Enable or disable the JSON run report.
    pub fn generate_report(mut self, generate: bool) -> Self {
        self.generate_report = Some(generate);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let reference_date = match (self.reference_date, self.reference_date_text) {
            (Some(date), _) => date,
            (None, Some(text)) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
                .map_err(|_| ConfigValidationError::InvalidReferenceDate(text))?,
            (None, None) => default_reference_date(),
        };

        let config = PipelineConfig {
            reference_date,
            iqr_multiplier: self.iqr_multiplier.unwrap_or(DEFAULT_IQR_MULTIPLIER),
            min_group_size: self.min_group_size.unwrap_or(DEFAULT_MIN_GROUP_SIZE),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from("output")),
            cleaned_name: self
                .cleaned_name
                .unwrap_or_else(|| DEFAULT_CLEANED_NAME.to_string()),
            save_to_disk: self.save_to_disk.unwrap_or(true),
            generate_report: self.generate_report.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.reference_date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.min_group_size, 4);
        assert_eq!(config.cleaned_name, "cleaned_job_posts");
        assert!(config.save_to_disk);
        assert!(config.generate_report);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = PipelineConfig::builder().build().unwrap();
        let default = PipelineConfig::default();
        assert_eq!(built.reference_date, default.reference_date);
        assert_eq!(built.iqr_multiplier, default.iqr_multiplier);
        assert_eq!(built.min_group_size, default.min_group_size);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .reference_date_str("2024-12-31")
            .iqr_multiplier(3.0)
            .min_group_size(10)
            .output_dir("results")
            .cleaned_name("jobs")
            .save_to_disk(false)
            .generate_report(false)
            .build()
            .unwrap();

        assert_eq!(
            config.reference_date,
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
        );
        assert_eq!(config.iqr_multiplier, 3.0);
        assert_eq!(config.min_group_size, 10);
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.cleaned_name, "jobs");
        assert!(!config.save_to_disk);
        assert!(!config.generate_report);
    }

    #[test]
    fn test_validation_invalid_reference_date() {
        let result = PipelineConfig::builder()
            .reference_date_str("first of june")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidReferenceDate(_)
        ));
    }

    #[test]
    fn test_validation_negative_multiplier() {
        let result = PipelineConfig::builder().iqr_multiplier(-1.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));
    }

    #[test]
    fn test_validation_min_group_size() {
        let result = PipelineConfig::builder().min_group_size(1).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidMinGroupSize(1)
        ));
    }

    #[test]
    fn test_validation_empty_name() {
        let result = PipelineConfig::builder().cleaned_name("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyOutputName
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("2025-06-01"));
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.reference_date, deserialized.reference_date);
        assert_eq!(config.min_group_size, deserialized.min_group_size);
    }
}
