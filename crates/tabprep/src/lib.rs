//! Tabular Cleaning Pipelines
//!
//! Two fixed batch workflows built on Polars that turn raw CSV tables into
//! cleaned, analysis-ready or model-ready CSV files.
//!
//! # Overview
//!
//! - **Employee cleaning**: constant-column pruning, text normalization,
//!   global and group-wise imputation, binary recoding, row validation,
//!   IQR outlier removal and age bucketing
//! - **Listings preprocessing**: identifier pruning, mode imputation,
//!   ordinal and one-hot encoding, min-max scaling
//!
//! Every run returns the cleaned table together with a [`CleaningReport`]
//! recording what each stage did, the fitted encoders and scaler, and any
//! recoverable conditions met on the way.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tabprep::{EmployeeConfig, Pipeline};
//!
//! let output = Pipeline::builder()
//!     .employee(EmployeeConfig::default())
//!     .build()?
//!     .run("Employee.csv", "outputs/Cleaned_Employee.csv")?;
//!
//! println!("{} -> {} rows", output.report.rows_before, output.report.rows_after);
//! for warning in &output.report.warnings {
//!     println!("warning: {warning}");
//! }
//! ```
//!
//! # Configuration
//!
//! Both pipelines default to the constants of the datasets they were written
//! for. Use the builders, or a JSON file, to change them:
//!
//! ```rust,ignore
//! use tabprep::config::*;
//!
//! let config = EmployeeConfig::builder()
//!     .range_rules(vec![RangeRule::new("Age", Some(21.0), Some(60.0))])
//!     .iqr_multiplier(3.0)
//!     .build()?;
//!
//! let listings = ListingsConfig::from_json_file("listings.json")?;
//! ```
//!
//! # Fitted transformers
//!
//! Encoders and the scaler can be used on their own. `fit` returns an
//! explicit state which `transform` applies, so a state learned on one table
//! can be reused on another:
//!
//! ```rust,ignore
//! use tabprep::transform::{HandleUnknown, OneHotEncoder};
//!
//! let encoder = OneHotEncoder::new()
//!     .with_handle_unknown(HandleUnknown::Ignore)
//!     .fit(&train, "neighbourhood_group")?;
//! let unseen = encoder.append(&mut test)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod transform;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{BinaryRecoder, ColumnPruner, RowValidator, TextNormalizer};
pub use config::{
    ConfigValidationError, EmployeeConfig, EmployeeConfigBuilder, GroupFill, GroupStatistic,
    ListingsConfig, ListingsConfigBuilder, PipelineConfig, RangeRule,
};
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::{GroupedImputer, StatisticalImputer};
pub use io::{load_csv, write_csv};
pub use pipeline::{
    ClosureProgressReporter, IqrBounds, OutlierHandler, Pipeline, PipelineBuilder, PipelineOutput,
    PipelineStage, ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reporting::ReportGenerator;
pub use transform::{
    Bucketizer, FittedMinMaxScaler, FittedOneHotEncoder, FittedOrdinalEncoder, HandleUnknown,
    MinMaxScaler, OneHotEncoder, OrdinalEncoder,
};
pub use types::{
    ActionType, CleaningAction, CleaningReport, ColumnKind, ColumnProfile, PipelineKind,
    PipelineWarning, TableProfile,
};
