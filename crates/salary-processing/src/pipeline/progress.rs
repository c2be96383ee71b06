//! Progress reporting for the salary pipeline.
//!
//! # Example
//!
//! ```rust,ignore
//! use salary_processing::Pipeline;
//!
//! let output = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the raw table
    Loading,
    /// Resolving salary, revenue, size, location, dates and text
    Cleaning,
    /// Dropping per-country salary outliers
    OutlierFiltering,
    /// Computing per-country z-scores
    Normalization,
    /// Aggregating skill price tables and category breakdowns
    SkillAnalysis,
    /// Writing tables and the run report
    Writing,
    Complete,
    Failed,
}

impl PipelineStage {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Cleaning => "Cleaning Fields",
            Self::OutlierFiltering => "Filtering Outliers",
            Self::Normalization => "Normalizing Salaries",
            Self::SkillAnalysis => "Analyzing Skills",
            Self::Writing => "Writing Outputs",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Share of the whole run taken by this stage.
    ///
    /// Working stages sum to 1.0; terminal stages weigh nothing.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.10,
            Self::Cleaning => 0.25,
            Self::OutlierFiltering => 0.15,
            Self::Normalization => 0.15,
            Self::SkillAnalysis => 0.20,
            Self::Writing => 0.15,
            Self::Complete | Self::Failed => 0.0,
        }
    }

    /// Overall progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Cleaning => 0.10,
            Self::OutlierFiltering => 0.35,
            Self::Normalization => 0.50,
            Self::SkillAnalysis => 0.65,
            Self::Writing => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

/// A progress notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Finer-grained step within the stage (e.g. "Country: DE")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within the current stage (0.0 - 1.0)
    pub stage_progress: f32,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_processed: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_total: Option<usize>,
}

impl ProgressUpdate {
    fn at(stage: PipelineStage, stage_progress: f32, message: String) -> Self {
        let stage_progress = stage_progress.clamp(0.0, 1.0);
        let progress = stage.base_progress() + stage.weight() * stage_progress;
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            stage_progress,
            message,
            items_processed: None,
            items_total: None,
        }
    }

    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        Self::at(stage, stage_progress, message.into())
    }

    pub fn with_sub_stage(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        stage_progress: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sub_stage: Some(sub_stage.into()),
            ..Self::at(stage, stage_progress, message.into())
        }
    }

    /// Progress expressed as `current` of `total` items.
    pub fn with_items(
        stage: PipelineStage,
        sub_stage: impl Into<String>,
        current: usize,
        total: usize,
        message: impl Into<String>,
    ) -> Self {
        let stage_progress = if total > 0 {
            current as f32 / total as f32
        } else {
            0.0
        };
        Self {
            sub_stage: Some(sub_stage.into()),
            items_processed: Some(current),
            items_total: Some(total),
            ..Self::at(stage, stage_progress, message.into())
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::at(PipelineStage::Complete, 1.0, message.into())
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::at(PipelineStage::Failed, 0.0, message.into())
    }
}

/// Receiver of progress updates.
///
/// Implementations must be `Send + Sync` so a pipeline can run on a worker
/// thread while its host listens elsewhere.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// [`ProgressReporter`] backed by a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const WORKING_STAGES: [PipelineStage; 6] = [
        PipelineStage::Loading,
        PipelineStage::Cleaning,
        PipelineStage::OutlierFiltering,
        PipelineStage::Normalization,
        PipelineStage::SkillAnalysis,
        PipelineStage::Writing,
    ];

    #[test]
    fn test_stage_weights_sum_to_one() {
        let total: f32 = WORKING_STAGES.iter().map(|s| s.weight()).sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_base_progress_is_cumulative() {
        let mut expected = 0.0;
        for stage in WORKING_STAGES {
            assert!((stage.base_progress() - expected).abs() < 1e-6, "{:?}", stage);
            expected += stage.weight();
        }
    }

    #[test]
    fn test_progress_update_new() {
        let update = ProgressUpdate::new(PipelineStage::Cleaning, 0.5, "halfway");
        assert!((update.progress - 0.225).abs() < 1e-6);
        assert_eq!(update.stage_progress, 0.5);
        assert!(update.sub_stage.is_none());
    }

    #[test]
    fn test_progress_update_clamps() {
        let update = ProgressUpdate::new(PipelineStage::Writing, 3.0, "overshoot");
        assert_eq!(update.stage_progress, 1.0);
        assert!(update.progress <= 1.0);
    }

    #[test]
    fn test_progress_update_with_items() {
        let update =
            ProgressUpdate::with_items(PipelineStage::Normalization, "Country: DE", 1, 4, "z");
        assert_eq!(update.items_processed, Some(1));
        assert_eq!(update.items_total, Some(4));
        assert_eq!(update.stage_progress, 0.25);
        assert_eq!(update.sub_stage.as_deref(), Some("Country: DE"));
    }

    #[test]
    fn test_terminal_updates() {
        assert_eq!(ProgressUpdate::complete("done").progress, 1.0);
        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, PipelineStage::Failed);
        assert_eq!(failed.progress, 0.0);
    }

    #[test]
    fn test_closure_reporter() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |u: ProgressUpdate| {
            sink.lock().unwrap().push(u.stage);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Loading, 0.0, "start"));
        reporter.report(ProgressUpdate::complete("end"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PipelineStage::Loading, PipelineStage::Complete]
        );
    }

    #[test]
    fn test_update_serialization_skips_empty_fields() {
        let json =
            serde_json::to_string(&ProgressUpdate::new(PipelineStage::Loading, 0.0, "x")).unwrap();
        assert!(json.contains("\"stage\":\"loading\""));
        assert!(!json.contains("sub_stage"));
    }
}
