//! Pipeline module.
//!
//! The [`Pipeline`] orchestrator, its progress reporting, and file I/O.

mod builder;
pub mod io;
pub mod progress;

pub use builder::{FileRun, Pipeline, PipelineBuilder};
pub use io::{load_job_postings, write_csv};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
