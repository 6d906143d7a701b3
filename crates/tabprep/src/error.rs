//! Error types for the cleaning pipelines.
//!
//! Every stage reports failures through [`PreprocessingError`]. Conditions the
//! pipelines can recover from (empty groups, degenerate scaling, ignored
//! unseen categories) never surface here; they are logged and recorded as
//! warnings in the run report instead.
//!
//! Errors serialize as `{ "code", "message" }` so the CLI can print them as
//! JSON next to a report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for the cleaning pipelines.
#[derive(Error, Debug)]
pub enum PreprocessingError {
    /// Input file is absent or is not a regular file.
    #[error("Input file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No non-missing values to compute a statistic from.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Column has the wrong logical type for the requested operation.
    #[error("Column '{column}' must be {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// A category not seen when the encoder was fitted.
    #[error("Unseen category '{value}' in column '{column}'")]
    UnseenCategory { column: String, value: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PreprocessingError>,
    },
}

impl PreprocessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PreprocessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingInputFile(_) => "MISSING_INPUT_FILE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::UnseenCategory { .. } => "UNSEEN_CATEGORY",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The innermost error, with all context layers removed.
    pub fn root(&self) -> &PreprocessingError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<crate::config::ConfigValidationError> for PreprocessingError {
    fn from(err: crate::config::ConfigValidationError) -> Self {
        PreprocessingError::InvalidConfig(err.to_string())
    }
}

impl Serialize for PreprocessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PreprocessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PreprocessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PreprocessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            PreprocessingError::MissingInputFile(PathBuf::from("a.csv")).error_code(),
            "MISSING_INPUT_FILE"
        );
        assert_eq!(
            PreprocessingError::ColumnNotFound("Age".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            PreprocessingError::UnseenCategory {
                column: "room_type".to_string(),
                value: "Hotel".to_string(),
            }
            .error_code(),
            "UNSEEN_CATEGORY"
        );
    }

    #[test]
    fn test_missing_input_message_names_path() {
        let error = PreprocessingError::MissingInputFile(PathBuf::from("data/Employee.csv"));
        assert!(error.to_string().contains("data/Employee.csv"));
    }

    #[test]
    fn test_error_serialization() {
        let error = PreprocessingError::ColumnNotFound("Salary".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Salary"));
    }

    #[test]
    fn test_with_context_preserves_code_and_root() {
        let error = PreprocessingError::ColumnNotFound("Place".to_string())
            .with_context("While imputing")
            .with_context("Employee pipeline");
        assert!(error.to_string().contains("Employee pipeline"));
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(matches!(
            error.root(),
            PreprocessingError::ColumnNotFound(name) if name == "Place"
        ));
    }

    #[test]
    fn test_config_validation_error_converts() {
        let err: PreprocessingError =
            crate::config::ConfigValidationError::InvalidIqrMultiplier(-1.0).into();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
