//! Outlier handling module.
//!
//! IQR filtering for numeric columns. Quartiles use linear interpolation
//! between order statistics at position `(n - 1) * q`.

use crate::error::{PreprocessingError, Result};
use crate::utils::{column_series, numeric_values, quantile_linear, require_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Quartiles and the bounds derived from them for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    /// Rows dropped by these bounds.
    pub rows_removed: usize,
}

impl IqrBounds {
    /// Whether a value lies inside the inclusive bounds. Missing never does.
    pub fn contains(&self, value: Option<f64>) -> bool {
        value.is_some_and(|v| v >= self.lower && v <= self.upper)
    }
}

/// Handles outlier detection and removal.
pub struct OutlierHandler;

impl OutlierHandler {
    /// Compute IQR bounds from a column's non-missing values.
    pub fn iqr_bounds(column: &str, values: &[f64], k: f64) -> Result<IqrBounds> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);

        let (Some(q1), Some(q3)) = (quantile_linear(&sorted, 0.25), quantile_linear(&sorted, 0.75))
        else {
            return Err(PreprocessingError::NoValidValues(column.to_string()));
        };
        let iqr = q3 - q1;

        Ok(IqrBounds {
            column: column.to_string(),
            q1,
            q3,
            iqr,
            lower: q1 - k * iqr,
            upper: q3 + k * iqr,
            rows_removed: 0,
        })
    }

    /// Keep rows whose value in `column` lies inside the IQR bounds.
    /// Rows with a missing value are dropped.
    ///
    /// A column with no values has no quartiles: no bounds are returned and
    /// no row survives, so an empty table passes through unchanged.
    pub fn remove_iqr_outliers(
        df: DataFrame,
        column: &str,
        k: f64,
    ) -> Result<(DataFrame, Option<IqrBounds>)> {
        let values = numeric_values(column_series(&df, column)?)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            debug!("IQR on '{}': no values, dropping {} rows", column, df.height());
            return Ok((df.clear(), None));
        }
        let mut bounds = Self::iqr_bounds(column, &present, k)?;

        let mask: Vec<bool> = values.iter().map(|v| bounds.contains(*v)).collect();
        let before = df.height();
        let df = df.filter(&BooleanChunked::from_slice("mask".into(), &mask))?;
        bounds.rows_removed = before - df.height();

        debug!(
            "IQR on '{}': q1={}, q3={}, bounds=[{}, {}], removed {}",
            column, bounds.q1, bounds.q3, bounds.lower, bounds.upper, bounds.rows_removed
        );
        Ok((df, Some(bounds)))
    }

    /// Apply IQR removal column by column; each column's bounds are
    /// computed on the table already filtered by the previous ones.
    pub fn remove_iqr_outliers_sequential<S: AsRef<str>>(
        df: DataFrame,
        columns: &[S],
        k: f64,
    ) -> Result<(DataFrame, Vec<IqrBounds>)> {
        require_columns(&df, columns)?;
        let before = df.height();

        let mut df = df;
        let mut all_bounds = Vec::with_capacity(columns.len());
        for column in columns {
            let (filtered, bounds) = Self::remove_iqr_outliers(df, column.as_ref(), k)?;
            df = filtered;
            all_bounds.extend(bounds);
        }

        info!("Removed {} outlier rows", before - df.height());
        Ok((df, all_bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iqr_bounds_linear_quartiles() {
        let bounds = OutlierHandler::iqr_bounds("Age", &[1.0, 2.0, 3.0, 4.0], 1.5).unwrap();
        assert_eq!(bounds.q1, 1.75);
        assert_eq!(bounds.q3, 3.25);
        assert_eq!(bounds.iqr, 1.5);
        assert_eq!(bounds.lower, -0.5);
        assert_eq!(bounds.upper, 5.5);
    }

    #[test]
    fn test_iqr_bounds_unsorted_input() {
        let bounds = OutlierHandler::iqr_bounds("x", &[9.0, 1.0, 5.0, 3.0, 7.0], 1.5).unwrap();
        assert_eq!(bounds.q1, 3.0);
        assert_eq!(bounds.q3, 7.0);
    }

    #[test]
    fn test_iqr_bounds_empty() {
        let err = OutlierHandler::iqr_bounds("Salary", &[], 1.5).unwrap_err();
        assert!(matches!(err, PreprocessingError::NoValidValues(c) if c == "Salary"));
    }

    #[test]
    fn test_remove_iqr_outliers() {
        let df = df![
            "Salary" => [Some(10.0), Some(12.0), Some(11.0), Some(13.0), Some(100.0), None],
        ]
        .unwrap();

        let (df, bounds) = OutlierHandler::remove_iqr_outliers(df, "Salary", 1.5).unwrap();
        let bounds = bounds.unwrap();
        // q1 = 11, q3 = 13 over [10, 11, 12, 13, 100]
        assert_eq!(bounds.q1, 11.0);
        assert_eq!(bounds.q3, 13.0);
        assert_eq!(bounds.upper, 16.0);
        assert_eq!(bounds.rows_removed, 2);
        assert_eq!(df.height(), 4);
    }

    #[test]
    fn test_kept_rows_respect_pre_removal_bounds() {
        let df = df!["Age" => [20.0, 22.0, 25.0, 27.0, 30.0, 31.0, 80.0, 2.0]].unwrap();
        let (df, bounds) = OutlierHandler::remove_iqr_outliers(df, "Age", 1.5).unwrap();
        let bounds = bounds.unwrap();

        let ages = df.column("Age").unwrap().as_materialized_series().f64().unwrap().clone();
        for age in ages.into_iter().flatten() {
            assert!(age >= bounds.lower && age <= bounds.upper);
        }
        assert_eq!(bounds.rows_removed, 2);
    }

    #[test]
    fn test_sequential_order_uses_filtered_table() {
        let df = df![
            "Age" => [20.0, 21.0, 22.0, 23.0, 90.0],
            "Salary" => [1000.0, 1100.0, 1200.0, 1300.0, 50000.0],
        ]
        .unwrap();

        let (df, bounds) =
            OutlierHandler::remove_iqr_outliers_sequential(df, &["Age", "Salary"], 1.5).unwrap();

        assert_eq!(df.height(), 4);
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0].rows_removed, 1);
        // Salary quartiles come from the four rows left after the Age pass
        assert_eq!(bounds[1].q1, 1075.0);
        assert_eq!(bounds[1].q3, 1225.0);
        assert_eq!(bounds[1].rows_removed, 0);
    }

    #[test]
    fn test_empty_table_passes_through() {
        let df = df![
            "Age" => Vec::<f64>::new(),
            "Salary" => Vec::<f64>::new(),
        ]
        .unwrap();

        let (df, bounds) =
            OutlierHandler::remove_iqr_outliers_sequential(df, &["Age", "Salary"], 1.5).unwrap();

        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
        assert!(bounds.is_empty());
    }

    #[test]
    fn test_all_missing_column_drops_every_row() {
        let df = df!["Age" => [None::<f64>, None]].unwrap();
        let (df, bounds) = OutlierHandler::remove_iqr_outliers(df, "Age", 1.5).unwrap();

        assert_eq!(df.height(), 0);
        assert!(bounds.is_none());
    }

    #[test]
    fn test_sequential_missing_column() {
        let df = df!["Age" => [20.0]].unwrap();
        let err = OutlierHandler::remove_iqr_outliers_sequential(df, &["Age", "Salary"], 1.5)
            .unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
    }
}
