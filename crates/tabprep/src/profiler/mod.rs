//! Table inspection.
//!
//! Produces the column list, dtypes, missing counts, distinct counts and a
//! numeric summary for every numeric column. Pipelines log the profile and
//! keep it in the run report.

use crate::error::Result;
use crate::types::{CategoricalColumn, ColumnKind, ColumnProfile, NumericSummary, TableProfile};
use crate::utils::column_kind;
use polars::prelude::*;
use tracing::{debug, info};

/// Data profiler for inspecting a loaded table.
pub struct DataProfiler;

impl DataProfiler {
    /// Profile every column of the table.
    pub fn profile(df: &DataFrame) -> Result<TableProfile> {
        let mut column_profiles = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let profile = Self::profile_column(column.as_materialized_series(), df.height())?;
            debug!(
                "Column '{}': {} ({} nulls, {} distinct)",
                profile.name, profile.dtype, profile.null_count, profile.distinct_count
            );
            column_profiles.push(profile);
        }

        let profile = TableProfile {
            rows: df.height(),
            columns: df.width(),
            column_profiles,
        };
        info!(
            "Profiled {} rows x {} columns ({} missing cells)",
            profile.rows,
            profile.columns,
            profile.total_nulls()
        );
        Ok(profile)
    }

    /// Text columns with their distinct non-missing counts, in column order.
    pub fn categorical_columns(df: &DataFrame) -> Result<Vec<CategoricalColumn>> {
        let mut found = Vec::new();
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            if column_kind(series.dtype()) == ColumnKind::Text {
                found.push(CategoricalColumn {
                    name: series.name().to_string(),
                    distinct_count: series.drop_nulls().n_unique()?,
                });
            }
        }
        Ok(found)
    }

    fn profile_column(series: &Series, rows: usize) -> Result<ColumnProfile> {
        let kind = column_kind(series.dtype());
        let null_count = series.null_count();
        let null_percentage = if rows > 0 {
            (null_count as f64 / rows as f64) * 100.0
        } else {
            0.0
        };

        let numeric = if kind == ColumnKind::Numeric {
            Self::numeric_summary(&series.drop_nulls().cast(&DataType::Float64)?)?
        } else {
            None
        };

        Ok(ColumnProfile {
            name: series.name().to_string(),
            dtype: series.dtype().to_string(),
            kind,
            null_count,
            null_percentage,
            distinct_count: series.drop_nulls().n_unique()?,
            numeric,
        })
    }

    fn numeric_summary(values: &Series) -> Result<Option<NumericSummary>> {
        let (Some(min), Some(max)) = (values.min::<f64>()?, values.max::<f64>()?) else {
            return Ok(None);
        };
        Ok(Some(NumericSummary {
            min,
            max,
            mean: values.mean().unwrap_or(min),
            median: values.median().unwrap_or(min),
        }))
    }
}
