//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running one of the cleaning workflows over a table.

use crate::config::{ConfigValidationError, EmployeeConfig, ListingsConfig, PipelineConfig};
use crate::error::Result;
use crate::io::{load_csv, write_csv};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate, StageTracker,
};
use crate::pipeline::{employee, listings};
use crate::types::{CleaningReport, PipelineKind};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Cleaned table together with the report of the run that produced it.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub data: DataFrame,
    pub report: CleaningReport,
}

/// The cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to select a workflow and attach a progress
/// reporter.
///
/// # Example
///
/// ```rust,ignore
/// use tabprep::{ListingsConfig, Pipeline};
///
/// let output = Pipeline::builder()
///     .listings(ListingsConfig::default())
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run("AB_NYC_2019.csv", "Final_Cleaned_AB_NYC_2019.csv")?;
///
/// println!("{} rows written", output.report.rows_after);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn kind(&self) -> PipelineKind {
        self.config.kind()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean an in-memory table.
    ///
    /// Any failing stage aborts the run and its error is returned unchanged.
    pub fn process(&self, df: DataFrame) -> Result<PipelineOutput> {
        let mut tracker = StageTracker::new(self.progress_reporter.as_deref(), self.stage_count());
        let result = self.process_internal(df, &mut tracker);
        self.finish(result)
    }

    /// Load `input`, clean it and write the result to `output`.
    ///
    /// Nothing is written when loading or any stage fails.
    pub fn run(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<PipelineOutput> {
        let mut tracker =
            StageTracker::new(self.progress_reporter.as_deref(), self.stage_count() + 2);
        let result = self.run_internal(input.as_ref(), output.as_ref(), &mut tracker);
        self.finish(result)
    }

    fn stage_count(&self) -> usize {
        match self.config {
            PipelineConfig::Employee(_) => employee::STAGES,
            PipelineConfig::Listings(_) => listings::STAGES,
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn finish(&self, result: Result<PipelineOutput>) -> Result<PipelineOutput> {
        match result {
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

    fn run_internal(
        &self,
        input: &Path,
        output: &Path,
        tracker: &mut StageTracker<'_>,
    ) -> Result<PipelineOutput> {
        let start_time = Instant::now();

        tracker.enter(
            PipelineStage::Loading,
            format!("Loading {}...", input.display()),
        );
        let df = load_csv(input)?;

        let mut result = self.process_internal(df, tracker)?;

        tracker.enter(
            PipelineStage::Writing,
            format!("Writing {}...", output.display()),
        );
        write_csv(&mut result.data, output)?;

        result.report.input_file = Some(input.display().to_string());
        result.report.output_file = Some(output.display().to_string());
        result.report.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(result)
    }

    fn process_internal(
        &self,
        df: DataFrame,
        tracker: &mut StageTracker<'_>,
    ) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        info!("Starting {} pipeline...", self.kind().display_name());

        let mut report = CleaningReport::new(self.kind());
        report.rows_before = df.height();
        report.columns_before = df.width();

        let data = match &self.config {
            PipelineConfig::Employee(config) => {
                employee::clean(config, df, &mut report, tracker)?
            }
            PipelineConfig::Listings(config) => {
                listings::clean(config, df, &mut report, tracker)?
            }
        };

        report.rows_after = data.height();
        report.columns_after = data.width();
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "{} finished: {} -> {} rows, {} -> {} columns, {} warnings",
            self.kind().display_name(),
            report.rows_before,
            report.rows_after,
            report.columns_before,
            report.columns_after,
            report.warnings.len()
        );

        Ok(PipelineOutput { data, report })
    }
}

/// Builder for creating a [`Pipeline`] instance.
///
/// Exactly one workflow must be selected, either with [`employee`](Self::employee),
/// [`listings`](Self::listings) or [`config`](Self::config).
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Select the employee cleaning workflow.
    pub fn employee(self, config: EmployeeConfig) -> Self {
        self.config(PipelineConfig::Employee(config))
    }

    /// Select the listings preprocessing workflow.
    pub fn listings(self, config: ListingsConfig) -> Self {
        self.config(PipelineConfig::Listings(config))
    }

    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use tabprep::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct StderrReporter;
    ///
    /// impl ProgressReporter for StderrReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         eprintln!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .employee(EmployeeConfig::default())
    ///     .progress_reporter(Arc::new(StderrReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if no workflow was selected or its configuration is
    /// invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.ok_or(ConfigValidationError::NoPipelineSelected)?;
        config.validate()?;

        Ok(Pipeline {
            config,
            progress_reporter: self.progress_reporter,
        })
    }
}
