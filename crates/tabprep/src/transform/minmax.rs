//! Min-max scaling of numeric columns to [0, 1].
//!
//! ```text
//! x_scaled = (x - min) / (max - min)
//! ```
//!
//! A column whose minimum equals its maximum maps every value to 0.

use crate::error::{PreprocessingError, Result};
use crate::utils::{column_series, numeric_values, require_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Observed range of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    pub fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}

/// MinMaxScaler (unfitted).
#[derive(Debug, Clone, Default)]
pub struct MinMaxScaler;

impl MinMaxScaler {
    pub fn new() -> Self {
        Self
    }

    /// Learn min and max of each column over its non-missing values.
    pub fn fit<S: AsRef<str>>(&self, df: &DataFrame, columns: &[S]) -> Result<FittedMinMaxScaler> {
        require_columns(df, columns)?;
        let mut ranges = Vec::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();
            let values = numeric_values(column_series(df, column)?)?;
            let mut present = values.into_iter().flatten();
            let first = present
                .next()
                .ok_or_else(|| PreprocessingError::NoValidValues(column.to_string()))?;
            let (min, max) = present.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
            debug!("Column '{}': min={}, max={}", column, min, max);
            ranges.push(ColumnRange {
                column: column.to_string(),
                min,
                max,
            });
        }
        Ok(FittedMinMaxScaler { ranges })
    }
}

/// Fitted MinMaxScaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMinMaxScaler {
    ranges: Vec<ColumnRange>,
}

impl FittedMinMaxScaler {
    pub fn ranges(&self) -> &[ColumnRange] {
        &self.ranges
    }

    pub fn range(&self, column: &str) -> Option<&ColumnRange> {
        self.ranges.iter().find(|r| r.column == column)
    }

    /// Replace each fitted column with its scaled `Float64` values.
    ///
    /// Returns the ranges of degenerate columns.
    pub fn transform(&self, df: &mut DataFrame) -> Result<Vec<ColumnRange>> {
        let mut degenerate = Vec::new();
        for range in &self.ranges {
            let values = numeric_values(column_series(df, &range.column)?)?;
            let scaled: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| v.map(|x| range.scale(x)))
                .collect();
            df.replace(&range.column, Series::new(range.column.as_str().into(), scaled))?;

            if range.is_degenerate() {
                warn!(
                    "Column '{}' is constant ({}); scaled to 0",
                    range.column, range.min
                );
                degenerate.push(range.clone());
            }
        }
        info!("Scaled {} columns to [0, 1]", self.ranges.len());
        Ok(degenerate)
    }
}
