//! Configuration types for the two cleaning pipelines.
//!
//! Defaults reproduce the constants of the employee and listings datasets.
//! Every field can be overridden through the builders or a JSON file; missing
//! JSON fields fall back to their defaults.

use crate::error::{PreprocessingError, Result};
use crate::transform::HandleUnknown;
use crate::types::PipelineKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Statistic used to fill a target column within each group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupStatistic {
    /// Most frequent value; `fallback` fills groups with no values at all.
    Mode { fallback: String },
    /// Median of the group's non-missing values.
    Median,
    /// Mean of the group's non-missing values.
    Mean,
}

impl GroupStatistic {
    /// Short name used in log lines and report steps.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mode { .. } => "mode",
            Self::Median => "median",
            Self::Mean => "mean",
        }
    }
}

/// One group-wise fill: `column` gets `statistic` computed per group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFill {
    pub column: String,
    pub statistic: GroupStatistic,
}

impl GroupFill {
    pub fn new(column: impl Into<String>, statistic: GroupStatistic) -> Self {
        Self {
            column: column.into(),
            statistic,
        }
    }
}

/// Inclusive numeric bounds for one column. `None` leaves that side open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeRule {
    pub column: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeRule {
    pub fn new(column: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            column: column.into(),
            min,
            max,
        }
    }

    /// Whether a value satisfies the rule. Missing values never do.
    pub fn contains(&self, value: Option<f64>) -> bool {
        match value {
            Some(v) => {
                self.min.is_none_or(|lo| v >= lo) && self.max.is_none_or(|hi| v <= hi)
            }
            None => false,
        }
    }
}

/// Configuration for the employee cleaning pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeeConfig {
    /// Column filled with its global mode before grouping.
    /// Default: "Company"
    pub mode_fill_column: String,

    /// Column whose values partition rows for group-wise fills.
    /// Default: "Company"
    pub group_column: String,

    /// Group-wise fills, applied in order.
    /// Default: Place → mode ("Unknown"), Age → median, Salary → mean
    pub group_fills: Vec<GroupFill>,

    /// Numeric 0/1 column recoded to labels.
    /// Default: "Gender"
    pub binary_column: String,

    /// Labels for codes 0 and 1.
    /// Default: ["Male", "Female"]
    pub binary_labels: [String; 2],

    /// Inclusive range filters.
    /// Default: Age in [18, 65], Salary >= 1000
    pub range_rules: Vec<RangeRule>,

    /// Rows missing any of these columns are dropped after imputation.
    /// Default: Company, Place, Gender
    pub required_columns: Vec<String>,

    /// Columns filtered with the IQR rule, in this order.
    /// Default: Age, Salary
    pub outlier_columns: Vec<String>,

    /// IQR multiplier for outlier bounds.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Numeric column that drives the derived bucket.
    /// Default: "Age"
    pub bucket_source: String,

    /// Name of the derived bucket column.
    /// Default: "Seniority"
    pub bucket_column: String,

    /// Bin edges, right-closed intervals.
    /// Default: [17, 25, 35, 50, 65]
    pub bucket_edges: Vec<f64>,

    /// One label per interval.
    /// Default: Junior, Mid, Senior, Executive
    pub bucket_labels: Vec<String>,

    /// Output file name used when the CLI is not given one.
    /// Default: "Cleaned_Employee.csv"
    pub output_name: String,
}

impl Default for EmployeeConfig {
    fn default() -> Self {
        Self {
            mode_fill_column: "Company".to_string(),
            group_column: "Company".to_string(),
            group_fills: vec![
                GroupFill::new(
                    "Place",
                    GroupStatistic::Mode {
                        fallback: "Unknown".to_string(),
                    },
                ),
                GroupFill::new("Age", GroupStatistic::Median),
                GroupFill::new("Salary", GroupStatistic::Mean),
            ],
            binary_column: "Gender".to_string(),
            binary_labels: ["Male".to_string(), "Female".to_string()],
            range_rules: vec![
                RangeRule::new("Age", Some(18.0), Some(65.0)),
                RangeRule::new("Salary", Some(1000.0), None),
            ],
            required_columns: vec![
                "Company".to_string(),
                "Place".to_string(),
                "Gender".to_string(),
            ],
            outlier_columns: vec!["Age".to_string(), "Salary".to_string()],
            iqr_multiplier: 1.5,
            bucket_source: "Age".to_string(),
            bucket_column: "Seniority".to_string(),
            bucket_edges: vec![17.0, 25.0, 35.0, 50.0, 65.0],
            bucket_labels: vec![
                "Junior".to_string(),
                "Mid".to_string(),
                "Senior".to_string(),
                "Executive".to_string(),
            ],
            output_name: "Cleaned_Employee.csv".to_string(),
        }
    }
}

impl EmployeeConfig {
    /// Create a new configuration builder.
    pub fn builder() -> EmployeeConfigBuilder {
        EmployeeConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Columns the pipeline cannot run without, deduplicated, in first-use order.
    pub fn critical_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        let candidates = std::iter::once(&self.mode_fill_column)
            .chain(std::iter::once(&self.group_column))
            .chain(self.group_fills.iter().map(|f| &f.column))
            .chain(std::iter::once(&self.binary_column))
            .chain(self.range_rules.iter().map(|r| &r.column))
            .chain(self.required_columns.iter())
            .chain(self.outlier_columns.iter())
            .chain(std::iter::once(&self.bucket_source));
        for name in candidates {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
        columns
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        for (field, value) in [
            ("mode_fill_column", &self.mode_fill_column),
            ("group_column", &self.group_column),
            ("binary_column", &self.binary_column),
            ("bucket_source", &self.bucket_source),
            ("bucket_column", &self.bucket_column),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        if !self.iqr_multiplier.is_finite() || self.iqr_multiplier < 0.0 {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.iqr_multiplier,
            ));
        }

        for rule in &self.range_rules {
            if let (Some(lo), Some(hi)) = (rule.min, rule.max)
                && lo > hi
            {
                return Err(ConfigValidationError::InvalidRange {
                    column: rule.column.clone(),
                    min: lo,
                    max: hi,
                });
            }
        }

        validate_bins(&self.bucket_edges, &self.bucket_labels)
    }
}

/// Configuration for the listings preprocessing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingsConfig {
    /// Identifier and free-text columns removed up front.
    /// Default: id, name, host_id, host_name, last_review
    pub drop_columns: Vec<String>,

    /// Numeric columns filled with their most frequent value.
    /// Default: reviews_per_month
    pub mode_fill_columns: Vec<String>,

    /// Columns replaced in place by integer codes.
    /// Default: room_type
    pub ordinal_columns: Vec<String>,

    /// Columns expanded into indicator columns and then dropped.
    /// Default: neighbourhood, neighbourhood_group
    pub one_hot_columns: Vec<String>,

    /// Numeric columns min-max scaled to [0, 1].
    /// Default: price, minimum_nights, number_of_reviews, reviews_per_month,
    /// calculated_host_listings_count, availability_365
    pub scale_columns: Vec<String>,

    /// Policy for categories unseen at fit time.
    /// Default: Error
    pub handle_unknown: HandleUnknown,

    /// Output file name used when the CLI is not given one.
    /// Default: "Final_Cleaned_AB_NYC_2019.csv"
    pub output_name: String,
}

impl Default for ListingsConfig {
    fn default() -> Self {
        Self {
            drop_columns: strings(&["id", "name", "host_id", "host_name", "last_review"]),
            mode_fill_columns: strings(&["reviews_per_month"]),
            ordinal_columns: strings(&["room_type"]),
            one_hot_columns: strings(&["neighbourhood", "neighbourhood_group"]),
            scale_columns: strings(&[
                "price",
                "minimum_nights",
                "number_of_reviews",
                "reviews_per_month",
                "calculated_host_listings_count",
                "availability_365",
            ]),
            handle_unknown: HandleUnknown::default(),
            output_name: "Final_Cleaned_AB_NYC_2019.csv".to_string(),
        }
    }
}

impl ListingsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ListingsConfigBuilder {
        ListingsConfigBuilder::default()
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        for column in &self.ordinal_columns {
            if self.one_hot_columns.contains(column) {
                return Err(ConfigValidationError::ConflictingEncoding(column.clone()));
            }
        }

        for column in self
            .mode_fill_columns
            .iter()
            .chain(&self.ordinal_columns)
            .chain(&self.one_hot_columns)
            .chain(&self.scale_columns)
        {
            if self.drop_columns.contains(column) {
                return Err(ConfigValidationError::DroppedColumnInUse(column.clone()));
            }
        }

        Ok(())
    }
}

/// Configuration of one pipeline run; the variant selects the pipeline.
#[derive(Debug, Clone)]
pub enum PipelineConfig {
    Employee(EmployeeConfig),
    Listings(ListingsConfig),
}

impl PipelineConfig {
    pub fn kind(&self) -> PipelineKind {
        match self {
            Self::Employee(_) => PipelineKind::Employee,
            Self::Listings(_) => PipelineKind::Listings,
        }
    }

    /// Default output file name of the selected pipeline.
    pub fn output_name(&self) -> &str {
        match self {
            Self::Employee(config) => &config.output_name,
            Self::Listings(config) => &config.output_name,
        }
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        match self {
            Self::Employee(config) => config.validate(),
            Self::Listings(config) => config.validate(),
        }
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Invalid IQR multiplier: {0} (must be finite and non-negative)")]
    InvalidIqrMultiplier(f64),

    #[error("Invalid range for '{column}': min {min} is greater than max {max}")]
    InvalidRange { column: String, min: f64, max: f64 },

    #[error("Bin edges must be strictly increasing and contain at least two values")]
    InvalidBinEdges,

    #[error("Expected {expected} bucket labels for the given edges, got {got}")]
    LabelCountMismatch { expected: usize, got: usize },

    #[error("Column '{0}' cannot be both ordinal and one-hot encoded")]
    ConflictingEncoding(String),

    #[error("Column '{0}' is dropped but used by a later stage")]
    DroppedColumnInUse(String),

    #[error("No pipeline selected")]
    NoPipelineSelected,
}

/// Edges strictly increasing, at least two, one label per interval.
pub(crate) fn validate_bins(
    edges: &[f64],
    labels: &[String],
) -> std::result::Result<(), ConfigValidationError> {
    if edges.len() < 2
        || edges.iter().any(|e| !e.is_finite())
        || edges.windows(2).any(|w| w[0] >= w[1])
    {
        return Err(ConfigValidationError::InvalidBinEdges);
    }
    if labels.len() != edges.len() - 1 {
        return Err(ConfigValidationError::LabelCountMismatch {
            expected: edges.len() - 1,
            got: labels.len(),
        });
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.is_file() {
        return Err(PreprocessingError::MissingInputFile(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Builder for [`EmployeeConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct EmployeeConfigBuilder {
    group_column: Option<String>,
    group_fills: Option<Vec<GroupFill>>,
    range_rules: Option<Vec<RangeRule>>,
    required_columns: Option<Vec<String>>,
    outlier_columns: Option<Vec<String>>,
    iqr_multiplier: Option<f64>,
    bucket_edges: Option<Vec<f64>>,
    bucket_labels: Option<Vec<String>>,
    output_name: Option<String>,
}

impl EmployeeConfigBuilder {
    /// Set the column used both for the global mode fill and for grouping.
    pub fn group_column(mut self, column: impl Into<String>) -> Self {
        self.group_column = Some(column.into());
        self
    }

    /// Replace the group-wise fills.
    pub fn group_fills(mut self, fills: Vec<GroupFill>) -> Self {
        self.group_fills = Some(fills);
        self
    }

    /// Replace the range filters.
    pub fn range_rules(mut self, rules: Vec<RangeRule>) -> Self {
        self.range_rules = Some(rules);
        self
    }

    /// Replace the columns that must be present after imputation.
    pub fn required_columns(mut self, columns: Vec<String>) -> Self {
        self.required_columns = Some(columns);
        self
    }

    /// Replace the IQR outlier columns (applied in order).
    pub fn outlier_columns(mut self, columns: Vec<String>) -> Self {
        self.outlier_columns = Some(columns);
        self
    }

    /// Set the IQR multiplier.
    pub fn iqr_multiplier(mut self, k: f64) -> Self {
        self.iqr_multiplier = Some(k);
        self
    }

    /// Set bucket edges and their labels together.
    pub fn buckets(mut self, edges: Vec<f64>, labels: Vec<String>) -> Self {
        self.bucket_edges = Some(edges);
        self.bucket_labels = Some(labels);
        self
    }

    /// Set the default output file name.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> std::result::Result<EmployeeConfig, ConfigValidationError> {
        let defaults = EmployeeConfig::default();
        let group_column = self.group_column.unwrap_or(defaults.group_column);
        let config = EmployeeConfig {
            mode_fill_column: group_column.clone(),
            group_column,
            group_fills: self.group_fills.unwrap_or(defaults.group_fills),
            range_rules: self.range_rules.unwrap_or(defaults.range_rules),
            required_columns: self.required_columns.unwrap_or(defaults.required_columns),
            outlier_columns: self.outlier_columns.unwrap_or(defaults.outlier_columns),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            bucket_edges: self.bucket_edges.unwrap_or(defaults.bucket_edges),
            bucket_labels: self.bucket_labels.unwrap_or(defaults.bucket_labels),
            output_name: self.output_name.unwrap_or(defaults.output_name),
            ..defaults
        };

        config.validate()?;
        Ok(config)
    }
}

/// Builder for [`ListingsConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ListingsConfigBuilder {
    drop_columns: Option<Vec<String>>,
    mode_fill_columns: Option<Vec<String>>,
    ordinal_columns: Option<Vec<String>>,
    one_hot_columns: Option<Vec<String>>,
    scale_columns: Option<Vec<String>>,
    handle_unknown: Option<HandleUnknown>,
    output_name: Option<String>,
}

impl ListingsConfigBuilder {
    pub fn drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = Some(columns);
        self
    }

    pub fn mode_fill_columns(mut self, columns: Vec<String>) -> Self {
        self.mode_fill_columns = Some(columns);
        self
    }

    pub fn ordinal_columns(mut self, columns: Vec<String>) -> Self {
        self.ordinal_columns = Some(columns);
        self
    }

    pub fn one_hot_columns(mut self, columns: Vec<String>) -> Self {
        self.one_hot_columns = Some(columns);
        self
    }

    pub fn scale_columns(mut self, columns: Vec<String>) -> Self {
        self.scale_columns = Some(columns);
        self
    }

    /// Set the policy for categories unseen at fit time.
    pub fn handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = Some(strategy);
        self
    }

    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> std::result::Result<ListingsConfig, ConfigValidationError> {
        let defaults = ListingsConfig::default();
        let config = ListingsConfig {
            drop_columns: self.drop_columns.unwrap_or(defaults.drop_columns),
            mode_fill_columns: self.mode_fill_columns.unwrap_or(defaults.mode_fill_columns),
            ordinal_columns: self.ordinal_columns.unwrap_or(defaults.ordinal_columns),
            one_hot_columns: self.one_hot_columns.unwrap_or(defaults.one_hot_columns),
            scale_columns: self.scale_columns.unwrap_or(defaults.scale_columns),
            handle_unknown: self.handle_unknown.unwrap_or(defaults.handle_unknown),
            output_name: self.output_name.unwrap_or(defaults.output_name),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_employee_config() {
        let config = EmployeeConfig::default();
        assert_eq!(config.group_column, "Company");
        assert_eq!(config.iqr_multiplier, 1.5);
        assert_eq!(config.bucket_edges, vec![17.0, 25.0, 35.0, 50.0, 65.0]);
        assert_eq!(config.bucket_labels.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_critical_columns_are_deduplicated() {
        let config = EmployeeConfig::default();
        assert_eq!(
            config.critical_columns(),
            vec!["Company", "Place", "Age", "Salary", "Gender"]
        );
    }

    #[test]
    fn test_range_rule_contains() {
        let rule = RangeRule::new("Age", Some(18.0), Some(65.0));
        assert!(rule.contains(Some(18.0)));
        assert!(rule.contains(Some(65.0)));
        assert!(!rule.contains(Some(70.0)));
        assert!(!rule.contains(None));

        let open = RangeRule::new("Salary", Some(1000.0), None);
        assert!(open.contains(Some(1_000_000.0)));
        assert!(!open.contains(Some(999.0)));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = EmployeeConfig::builder()
            .group_column("Employer")
            .iqr_multiplier(3.0)
            .build()
            .unwrap();

        assert_eq!(config.group_column, "Employer");
        assert_eq!(config.mode_fill_column, "Employer");
        assert_eq!(config.iqr_multiplier, 3.0);
    }

    #[test]
    fn test_validation_rejects_negative_iqr_multiplier() {
        let result = EmployeeConfig::builder().iqr_multiplier(-0.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrMultiplier(_)
        ));
    }

    #[test]
    fn test_validation_rejects_unsorted_edges() {
        let result = EmployeeConfig::builder()
            .buckets(vec![17.0, 35.0, 25.0], vec!["a".into(), "b".into()])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidBinEdges
        ));
    }

    #[test]
    fn test_validation_rejects_label_count_mismatch() {
        let result = EmployeeConfig::builder()
            .buckets(vec![0.0, 10.0, 20.0], vec!["low".into()])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::LabelCountMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn test_validation_rejects_inverted_range() {
        let result = EmployeeConfig::builder()
            .range_rules(vec![RangeRule::new("Age", Some(65.0), Some(18.0))])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidRange { .. }
        ));
    }

    #[test]
    fn test_listings_validation_conflicting_encoding() {
        let result = ListingsConfig::builder()
            .ordinal_columns(vec!["room_type".into()])
            .one_hot_columns(vec!["room_type".into()])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::ConflictingEncoding(c) if c == "room_type"
        ));
    }

    #[test]
    fn test_listings_validation_dropped_column_in_use() {
        let result = ListingsConfig::builder()
            .drop_columns(vec!["price".into()])
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::DroppedColumnInUse(c) if c == "price"
        ));
    }

    #[test]
    fn test_employee_config_from_partial_json() {
        let json = r#"{
            "iqr_multiplier": 2.0,
            "group_fills": [
                { "column": "Place", "statistic": { "kind": "mode", "fallback": "Remote" } },
                { "column": "Age", "statistic": { "kind": "mean" } }
            ]
        }"#;

        let config: EmployeeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.iqr_multiplier, 2.0);
        assert_eq!(config.group_column, "Company");
        assert_eq!(
            config.group_fills[0].statistic,
            GroupStatistic::Mode {
                fallback: "Remote".to_string()
            }
        );
        assert_eq!(config.group_fills[1].statistic, GroupStatistic::Mean);
    }

    #[test]
    fn test_listings_config_serialization() {
        let config = ListingsConfig::builder()
            .handle_unknown(HandleUnknown::Ignore)
            .build()
            .unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"ignore\""));
        let back: ListingsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.handle_unknown, HandleUnknown::Ignore);
        assert_eq!(back.scale_columns.len(), 6);
    }

    #[test]
    fn test_pipeline_config_kind_and_output() {
        let config = PipelineConfig::Listings(ListingsConfig::default());
        assert_eq!(config.kind(), PipelineKind::Listings);
        assert_eq!(config.output_name(), "Final_Cleaned_AB_NYC_2019.csv");
        assert!(config.validate().is_ok());

        let config = PipelineConfig::Employee(EmployeeConfig::default());
        assert_eq!(config.output_name(), "Cleaned_Employee.csv");
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = EmployeeConfig::from_json_file("does/not/exist.json").unwrap_err();
        assert_eq!(err.error_code(), "MISSING_INPUT_FILE");
    }
}
