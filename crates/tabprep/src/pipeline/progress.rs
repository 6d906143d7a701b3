//! Progress reporting for the cleaning pipelines.
//!
//! Each pipeline announces every stage it enters through a
//! [`ProgressReporter`], and stages that walk a column list report each
//! column as a sub-stage. Overall progress is the fraction of the
//! pipeline's stages completed so far.
//!
//! # Example
//!
//! ```rust,ignore
//! use tabprep::{EmployeeConfig, Pipeline};
//!
//! let output = Pipeline::builder()
//!     .employee(EmployeeConfig::default())
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

/// Stages of the cleaning pipelines.
///
/// The employee pipeline uses pruning through bucketing; the listings
/// pipeline uses pruning, imputation, encoding and scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Loading,
    Profiling,
    Pruning,
    Normalizing,
    Imputation,
    Recoding,
    Validation,
    OutlierRemoval,
    Bucketing,
    Encoding,
    Scaling,
    Writing,
    Complete,
    Failed,
}

impl PipelineStage {
    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Profiling => "Profiling Dataset",
            Self::Pruning => "Dropping Columns",
            Self::Normalizing => "Normalizing Text",
            Self::Imputation => "Imputing Values",
            Self::Recoding => "Recoding Values",
            Self::Validation => "Validating Rows",
            Self::OutlierRemoval => "Removing Outliers",
            Self::Bucketing => "Deriving Buckets",
            Self::Encoding => "Encoding Categories",
            Self::Scaling => "Scaling Features",
            Self::Writing => "Writing Output",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }
}

/// Progress update emitted when a stage starts or moves to another column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,

    /// Optional detail such as the column being processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<String>,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    pub message: String,
}

impl ProgressUpdate {
    /// Update for step `step` (zero-based) of `total`.
    pub fn new(stage: PipelineStage, step: usize, total: usize, message: impl Into<String>) -> Self {
        let progress = if total > 0 {
            step as f32 / total as f32
        } else {
            0.0
        };
        Self {
            stage,
            sub_stage: None,
            progress: progress.clamp(0.0, 1.0),
            message: message.into(),
        }
    }

    /// Attach a sub-stage description.
    pub fn with_sub_stage(mut self, sub_stage: impl Into<String>) -> Self {
        self.sub_stage = Some(sub_stage.into());
        self
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            sub_stage: None,
            progress: 1.0,
            message: message.into(),
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            sub_stage: None,
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be `Send + Sync` so a pipeline can run on a worker
/// thread while reporting to another.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
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

/// Counts stages as a run enters them and forwards updates to a reporter.
pub(crate) struct StageTracker<'a> {
    reporter: Option<&'a dyn ProgressReporter>,
    current: Option<PipelineStage>,
    step: usize,
    total: usize,
}

impl<'a> StageTracker<'a> {
    pub(crate) fn new(reporter: Option<&'a dyn ProgressReporter>, total: usize) -> Self {
        Self {
            reporter,
            current: None,
            step: 0,
            total,
        }
    }

    /// Log and report the start of a stage.
    pub(crate) fn enter(&mut self, stage: PipelineStage, message: impl Into<String>) {
        let message = message.into();
        self.step += 1;
        self.current = Some(stage);
        info!("Step {}: {}", self.step, message);
        if let Some(reporter) = self.reporter {
            reporter.report(ProgressUpdate::new(stage, self.step - 1, self.total, message));
        }
    }

    /// Report work on one column within the current stage.
    pub(crate) fn column(&self, column: &str, message: impl Into<String>) {
        let (Some(reporter), Some(stage)) = (self.reporter, self.current) else {
            return;
        };
        let update = ProgressUpdate::new(stage, self.step - 1, self.total, message)
            .with_sub_stage(format!("Column: {column}"));
        reporter.report(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_progress_fraction() {
        let update = ProgressUpdate::new(PipelineStage::Imputation, 3, 12, "Imputing");
        assert!((update.progress - 0.25).abs() < 1e-6);
        assert!(update.sub_stage.is_none());

        let empty = ProgressUpdate::new(PipelineStage::Loading, 0, 0, "Loading");
        assert_eq!(empty.progress, 0.0);
    }

    #[test]
    fn test_with_sub_stage() {
        let update = ProgressUpdate::new(PipelineStage::Scaling, 5, 6, "Scaling")
            .with_sub_stage("Column: price");
        assert_eq!(update.sub_stage.as_deref(), Some("Column: price"));
    }

    #[test]
    fn test_complete_and_failed() {
        assert_eq!(ProgressUpdate::complete("done").progress, 1.0);
        let failed = ProgressUpdate::failed("boom");
        assert_eq!(failed.stage, PipelineStage::Failed);
        assert_eq!(failed.message, "boom");
    }

    #[test]
    fn test_closure_reporter_receives_updates() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.stage);
        });

        reporter.report(ProgressUpdate::new(PipelineStage::Profiling, 0, 2, "a"));
        reporter.report(ProgressUpdate::complete("b"));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![PipelineStage::Profiling, PipelineStage::Complete]
        );
    }

    #[test]
    fn test_stage_tracker_counts_steps() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update.progress);
        });

        let mut tracker = StageTracker::new(Some(&reporter as &dyn ProgressReporter), 4);
        tracker.enter(PipelineStage::Profiling, "Profiling dataset...");
        tracker.enter(PipelineStage::Pruning, "Dropping columns...");

        assert_eq!(*seen.lock().unwrap(), vec![0.0, 0.25]);
    }

    #[test]
    fn test_stage_tracker_column_updates_keep_stage_progress() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reporter = ClosureProgressReporter::new(move |update: ProgressUpdate| {
            sink.lock().unwrap().push(update);
        });

        let mut tracker = StageTracker::new(Some(&reporter as &dyn ProgressReporter), 4);
        tracker.column("price", "ignored before any stage");
        tracker.enter(PipelineStage::Profiling, "Profiling dataset...");
        tracker.enter(PipelineStage::Encoding, "Encoding categorical columns...");
        tracker.column("room_type", "Ordinal encoding");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2].stage, PipelineStage::Encoding);
        assert_eq!(seen[2].sub_stage.as_deref(), Some("Column: room_type"));
        assert!((seen[2].progress - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&PipelineStage::OutlierRemoval).unwrap();
        assert_eq!(json, "\"outlier_removal\"");
        assert_eq!(PipelineStage::Encoding.display_name(), "Encoding Categories");
    }
}
