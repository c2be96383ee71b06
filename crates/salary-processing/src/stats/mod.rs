//! Salary statistics over cleaned tables.
//!
//! - [`GroupStatistics`]: per-country IQR filtering and z-score normalization
//! - [`category_breakdown`]: normalized salary per category value
//! - [`descriptive`]: slice-level mean, deviation and quantile helpers

mod breakdown;
pub mod descriptive;
mod groups;

pub use breakdown::{BREAKDOWN_COLUMNS, category_breakdown};
pub use descriptive::IqrFences;
pub use groups::{CountryGroups, GroupStatistics};
