//! Global statistical imputation.

use crate::error::{PreprocessingError, Result};
use crate::utils::{column_series, is_numeric_dtype, numeric_mode, numeric_values, text_mode};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// A value used to fill missing cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for FillValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Result of a global mode fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeFill {
    pub value: FillValue,
    pub filled: usize,
}

/// Statistical imputation over a whole column.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill missing cells with the most frequent value.
    ///
    /// Ties go to the smallest value. Returns `None` without touching the
    /// column when nothing is missing. Numeric columns come back as `Float64`.
    pub fn fill_mode(df: &mut DataFrame, column: &str) -> Result<Option<ModeFill>> {
        let series = column_series(df, column)?;
        let missing = series.null_count();
        if missing == 0 {
            debug!("Column '{}' has no missing values", column);
            return Ok(None);
        }
        if missing == series.len() {
            return Err(PreprocessingError::NoValidValues(column.to_string()));
        }

        let (filled, value) = if is_numeric_dtype(series.dtype()) {
            Self::fill_numeric_mode(series)?
        } else {
            Self::fill_text_mode(series)?
        };

        df.replace(column, filled)?;
        info!("Filled {} missing values in '{}' with mode '{}'", missing, column, value);
        Ok(Some(ModeFill {
            value,
            filled: missing,
        }))
    }

    fn fill_numeric_mode(series: &Series) -> Result<(Series, FillValue)> {
        let values = numeric_values(series)?;
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        let mode = numeric_mode(&present)
            .ok_or_else(|| PreprocessingError::NoValidValues(series.name().to_string()))?;

        let filled: Vec<Option<f64>> = values.into_iter().map(|v| v.or(Some(mode))).collect();
        Ok((Series::new(series.name().clone(), filled), FillValue::Number(mode)))
    }

    fn fill_text_mode(series: &Series) -> Result<(Series, FillValue)> {
        let casted = series.cast(&DataType::String)?;
        let text = casted.str()?;
        let mode = text_mode(text.into_iter().flatten())
            .ok_or_else(|| PreprocessingError::NoValidValues(series.name().to_string()))?;

        let filled: Vec<Option<&str>> = text
            .into_iter()
            .map(|v| v.or(Some(mode.as_str())))
            .collect();
        Ok((
            Series::new(series.name().clone(), filled),
            FillValue::Text(mode.clone()),
        ))
    }
}
