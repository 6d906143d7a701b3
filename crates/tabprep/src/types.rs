use crate::pipeline::outliers::IqrBounds;
use crate::transform::{FittedMinMaxScaler, FittedOneHotEncoder, FittedOrdinalEncoder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical kind of a column, derived from its polars dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Temporal,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub null_count: usize,
    pub null_percentage: f64,
    /// Distinct non-missing values.
    pub distinct_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric: Option<NumericSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: usize,
    pub column_profiles: Vec<ColumnProfile>,
}

impl TableProfile {
    /// Profile of a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.column_profiles.iter().find(|c| c.name == name)
    }

    /// Missing cells across the whole table.
    pub fn total_nulls(&self) -> usize {
        self.column_profiles.iter().map(|c| c.null_count).sum()
    }
}

/// A text column and its number of distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name: String,
    pub distinct_count: usize,
}

/// Which pipeline produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    Employee,
    Listings,
}

impl PipelineKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Employee => "Employee cleaning",
            Self::Listings => "Listings preprocessing",
        }
    }
}

// ============================================================================
// Run report
// ============================================================================

/// Summary of one pipeline run.
///
/// Built up stage by stage and returned next to the cleaned table. It is the
/// payload of `--json` and of the `<stem>_report.json` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    pub pipeline: PipelineKind,
    /// Local time the run started.
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Profile of the table as loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_before: Option<TableProfile>,
    /// Text columns found before encoding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categorical_columns: Vec<CategoricalColumn>,

    /// Ordered audit trail of what each stage did.
    pub actions: Vec<CleaningAction>,
    /// Recoverable conditions met during the run.
    pub warnings: Vec<PipelineWarning>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ordinal_encodings: Vec<FittedOrdinalEncoder>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_hot_encodings: Vec<FittedOneHotEncoder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling: Option<FittedMinMaxScaler>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outlier_bounds: Vec<IqrBounds>,
}

impl CleaningReport {
    /// Create an empty report stamped with the current local time.
    pub fn new(pipeline: PipelineKind) -> Self {
        Self {
            pipeline,
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: None,
            output_file: None,
            duration_ms: 0,
            rows_before: 0,
            rows_after: 0,
            columns_before: 0,
            columns_after: 0,
            profile_before: None,
            categorical_columns: Vec::new(),
            actions: Vec::new(),
            warnings: Vec::new(),
            ordinal_encodings: Vec::new(),
            one_hot_encodings: Vec::new(),
            scaling: None,
            outlier_bounds: Vec::new(),
        }
    }

    pub fn add_action(&mut self, action: CleaningAction) {
        self.actions.push(action);
    }

    pub fn add_warning(&mut self, warning: PipelineWarning) {
        self.warnings.push(warning);
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f32 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed() as f32 / self.rows_before as f32) * 100.0
        }
    }

    /// Actions of one type, in the order they happened.
    pub fn actions_of(&self, action_type: ActionType) -> impl Iterator<Item = &CleaningAction> {
        self.actions
            .iter()
            .filter(move |a| a.action_type == action_type)
    }
}

/// A single action taken during cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningAction {
    pub action_type: ActionType,
    /// Column name, or "dataset" for table-wide actions.
    pub target: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl CleaningAction {
    pub fn new(
        action_type: ActionType,
        target: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            action_type,
            target: target.into(),
            description: description.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    ColumnRemoved,
    RowsRemoved,
    DuplicatesRemoved,
    ValueCleaned,
    ValueImputed,
    ValueRecoded,
    OutlierHandled,
    ColumnDerived,
    CategoriesEncoded,
    DataNormalized,
}

impl ActionType {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ColumnRemoved => "Column Removed",
            Self::RowsRemoved => "Rows Removed",
            Self::DuplicatesRemoved => "Duplicates Removed",
            Self::ValueCleaned => "Value Cleaned",
            Self::ValueImputed => "Value Imputed",
            Self::ValueRecoded => "Value Recoded",
            Self::OutlierHandled => "Outlier Handled",
            Self::ColumnDerived => "Column Derived",
            Self::CategoriesEncoded => "Categories Encoded",
            Self::DataNormalized => "Data Normalized",
        }
    }
}

/// Recoverable condition recorded during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    /// A group had no values to compute a statistic from.
    EmptyGroup {
        group_column: String,
        group: String,
        target: String,
    },
    /// Codes other than 0/1 in a binary column, turned into missing values.
    UnmappedCodes { column: String, count: usize },
    /// Minimum equals maximum; the column was scaled to 0.
    DegenerateScale { column: String, value: f64 },
    /// Categories not seen at fit time, encoded as missing.
    UnseenCategory { column: String, values: Vec<String> },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGroup {
                group_column,
                group,
                target,
            } => write!(
                f,
                "Group '{group}' of '{group_column}' has no values for '{target}'"
            ),
            Self::UnmappedCodes { column, count } => {
                write!(f, "{count} unmapped codes in '{column}' set to missing")
            }
            Self::DegenerateScale { column, value } => {
                write!(f, "Column '{column}' is constant ({value}); scaled to 0")
            }
            Self::UnseenCategory { column, values } => write!(
                f,
                "Unseen categories in '{column}' ignored: {}",
                values.join(", ")
            ),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
