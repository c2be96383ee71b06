//! Job-Posting Salary Processing Library
//!
//! Cleans scraped job-posting tables and derives salary statistics from them,
//! built with Rust and Polars.
//!
//! # Overview
//!
//! - **Field Cleaning**: salary ranges, revenue magnitudes, company sizes,
//!   relative post dates and free text resolved into typed columns
//! - **Country Resolution**: free-text locations mapped to country codes
//!   through an ordered pattern table
//! - **Group Statistics**: per-country IQR outlier filtering and z-score
//!   normalization of salaries
//! - **Skill Pricing**: per-skill salary statistics over raw and normalized
//!   salaries
//! - **Reporting**: CSV output tables and a JSON run report
//! - **Progress Reporting**: stage-by-stage progress callbacks
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use salary_processing::{Pipeline, PipelineConfig, load_job_postings};
//!
//! let df = load_job_postings("data/job_posts.csv")?;
//!
//! let output = Pipeline::builder()
//!     .config(PipelineConfig::builder().reference_date_str("2025-06-01").build()?)
//!     .build()?
//!     .process(df)?;
//!
//! for stat in output.raw_skills.top(10) {
//!     println!("{:<20} {:>10.0} ({} postings)", stat.skill, stat.mean, stat.count);
//! }
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use salary_processing::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .reference_date_str("2025-06-01")  // Day 0 of relative post dates
//!     .iqr_multiplier(1.5)               // Fence width in IQRs
//!     .min_group_size(4)                 // Smaller countries are not filtered
//!     .output_dir("output")
//!     .generate_report(true)
//!     .build()?;
//! ```
//!
//! # Progress Reporting
//!
//! ```rust,ignore
//! use salary_processing::Pipeline;
//!
//! let run = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .run_file("data/job_posts.csv")?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reporting;
pub mod skills;
pub mod stats;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{JobPostingCleaner, SalaryParseError};
pub use config::{ConfigValidationError, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineError, Result as PipelineResult, ResultExt};
pub use pipeline::{
    ClosureProgressReporter, FileRun, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate, load_job_postings, write_csv,
};
pub use reporting::{ReportGenerator, RunReport, SkillTableSummary};
pub use skills::{SalaryMeasure, SkillListError, SkillPriceAggregator, SkillPriceTable};
pub use stats::{GroupStatistics, category_breakdown};
pub use types::{
    CategoryBreakdown, CleaningSummary, GroupSummary, PipelineOutput, Revenue, SalaryRange,
    SkillStat,
};
