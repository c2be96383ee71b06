//! Output tables and run reports.
//!
//! # Example
//!
//! ```rust,ignore
//! use salary_processing::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new("output", "cleaned_job_posts");
//! let written = generator.write_outputs(&output)?;
//! let report = ReportGenerator::build_report(Some("posts.csv"), reference_date, &output, &written);
//! generator.write_report(&report, "posts")?;
//! ```

mod generator;

pub use generator::{
    FILTERED_SKILLS_FILE, NORMALIZED_SKILLS_FILE, RAW_SKILLS_FILE, REPORT_EXTREMES,
    ReportGenerator, RunReport, SkillTableSummary,
};
