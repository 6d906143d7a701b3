//! Pipeline module.
//!
//! This module provides the two cleaning workflows, the builder that selects
//! one of them, and the outlier and progress components they share.

mod builder;
mod employee;
mod listings;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder, PipelineOutput};
pub use outliers::{IqrBounds, OutlierHandler};
pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
