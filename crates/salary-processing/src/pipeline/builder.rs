//! Main salary pipeline module.
//!
//! [`Pipeline`] runs the stages in order: cleaning, per-country outlier
//! filtering and normalization, skill aggregation, and category breakdowns.

use crate::cleaner::JobPostingCleaner;
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::pipeline::io::load_job_postings;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{ReportGenerator, RunReport};
use crate::skills::{SalaryMeasure, SkillPriceAggregator};
use crate::stats::{BREAKDOWN_COLUMNS, GroupStatistics, category_breakdown};
use crate::types::{PipelineOutput, columns};
use crate::utils::has_column;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Result of [`Pipeline::run_file`].
#[derive(Debug, Clone)]
pub struct FileRun {
    pub output: PipelineOutput,
    pub report: RunReport,
    /// Tables written to disk, empty when saving is disabled.
    pub written: Vec<PathBuf>,
    /// Location of the JSON report when one was written.
    pub report_path: Option<PathBuf>,
}

/// The salary analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use salary_processing::{Pipeline, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .reference_date_str("2025-06-01")
///     .output_dir("output")
///     .build()?;
///
/// let output = Pipeline::builder()
///     .config(config)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .process(df)?;
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: JobPostingCleaner,
    groups: GroupStatistics,
    skills: SkillPriceAggregator,
    reporter: ReportGenerator,
}

// The pipeline may be handed to a worker thread.
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over an in-memory raw table.
    ///
    /// Nothing is written to disk.
    pub fn process(&self, df: DataFrame) -> Result<PipelineOutput> {
        match self.process_internal(df) {
            Ok(output) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(output)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Load a raw file, process it, and write outputs as configured.
    ///
    /// Tables are written when `save_to_disk` is set. The JSON report is
    /// written as `<input_stem>_report.json` when `generate_report` is set as
    /// well; with saving disabled nothing touches the disk. `Complete` is
    /// reported only after every file is written.
    pub fn run_file(&self, input: impl AsRef<Path>) -> Result<FileRun> {
        match self.run_file_internal(input.as_ref()) {
            Ok(run) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(run)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn run_file_internal(&self, input: &Path) -> Result<FileRun> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}", input.display()),
        ));
        let df = load_job_postings(input)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows", df.height()),
        ));

        let output = self.process_internal(df)?;

        if !self.config.save_to_disk {
            debug!("Saving disabled, no tables or report written");
            let report = ReportGenerator::build_report(
                Some(&input.display().to_string()),
                self.config.reference_date,
                &output,
                &[],
            );
            return Ok(FileRun {
                output,
                report,
                written: Vec::new(),
                report_path: None,
            });
        }

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            0.0,
            "Writing output tables...",
        ));
        let written = self.reporter.write_outputs(&output)?;

        let report = ReportGenerator::build_report(
            Some(&input.display().to_string()),
            self.config.reference_date,
            &output,
            &written,
        );

        let report_path = if self.config.generate_report {
            let stem = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "run".to_string());
            Some(self.reporter.write_report(&report, &stem)?)
        } else {
            None
        };

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            1.0,
            "Outputs written",
        ));

        Ok(FileRun {
            output,
            report,
            written,
            report_path,
        })
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        info!("Starting salary pipeline on {} rows...", df.height());

        // Step 1: Clean
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning fields...",
        ));
        let (cleaned, cleaning) = self.cleaner.clean(&df)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!("Cleaned {} rows", cleaned.height()),
        ));

        // Step 2: Outlier filter
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierFiltering,
            0.0,
            "Filtering salary outliers per country...",
        ));
        let groups = self.groups.summarize(&cleaned)?;
        let filtered = self.groups.iqr_filter(&cleaned)?;
        info!(
            "Outlier filter kept {} of {} rows across {} countries",
            filtered.height(),
            cleaned.height(),
            groups.len()
        );
        self.report_progress(ProgressUpdate::new(
            PipelineStage::OutlierFiltering,
            1.0,
            format!("{} rows after filtering", filtered.height()),
        ));

        // Step 3: Normalize both views
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Normalization,
            "Unfiltered",
            0,
            2,
            "Normalizing salaries...",
        ));
        let normalized_unfiltered = self.groups.normalize(&cleaned)?;
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Normalization,
            "Filtered",
            1,
            2,
            "Normalizing filtered salaries...",
        ));
        let normalized_filtered = self.groups.normalize(&filtered)?;
        self.report_progress(ProgressUpdate::with_items(
            PipelineStage::Normalization,
            "Filtered",
            2,
            2,
            "Normalization complete",
        ));

        // Step 4: Skills and breakdowns
        self.report_progress(ProgressUpdate::new(
            PipelineStage::SkillAnalysis,
            0.0,
            "Aggregating skill prices...",
        ));
        let raw_skills = self.skills.aggregate(&cleaned, SalaryMeasure::Raw)?;
        let normalized_skills = self
            .skills
            .aggregate(&normalized_unfiltered, SalaryMeasure::Normalized)?;
        let filtered_skills = self
            .skills
            .aggregate(&normalized_filtered, SalaryMeasure::Normalized)?;
        info!("Priced {} distinct skills", raw_skills.len());

        let mut breakdowns = BTreeMap::new();
        for category in BREAKDOWN_COLUMNS {
            if has_column(&normalized_unfiltered, category) {
                let breakdown = category_breakdown(
                    &normalized_unfiltered,
                    category,
                    columns::SALARY_AVG_NORMALIZED,
                )?;
                breakdowns.insert(category.to_string(), breakdown);
            }
        }
        self.report_progress(ProgressUpdate::new(
            PipelineStage::SkillAnalysis,
            1.0,
            "Skill analysis complete",
        ));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Pipeline finished in {} ms", duration_ms);

        Ok(PipelineOutput {
            cleaned,
            cleaning,
            normalized_unfiltered,
            normalized_filtered,
            groups,
            raw_skills,
            normalized_skills,
            filtered_skills,
            breakdowns,
            duration_ms,
        })
    }
}

/// Builder for a [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a custom progress reporter.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline, failing on an invalid configuration.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let reporter = ReportGenerator::new(config.output_dir.clone(), config.cleaned_name.clone());

        Ok(Pipeline {
            cleaner: JobPostingCleaner::new(config.reference_date),
            groups: GroupStatistics::new(config.iqr_multiplier, config.min_group_size),
            skills: SkillPriceAggregator,
            reporter,
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
