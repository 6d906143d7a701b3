//! Recoding of numeric binary codes to labels.

use crate::error::Result;
use crate::utils::{column_series, is_numeric_dtype, numeric_values};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// What a recode call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecodeOutcome {
    /// Column was not numeric and was left untouched.
    Skipped,
    /// Column was replaced by labels.
    Recoded { mapped: usize, unmapped: usize },
}

/// Maps `0` and `1` to two labels; anything else becomes missing.
#[derive(Debug, Clone)]
pub struct BinaryRecoder {
    zero_label: String,
    one_label: String,
}

impl BinaryRecoder {
    pub fn new(zero_label: impl Into<String>, one_label: impl Into<String>) -> Self {
        Self {
            zero_label: zero_label.into(),
            one_label: one_label.into(),
        }
    }

    /// Replace a numeric code column with a `String` label column.
    pub fn recode(&self, df: &mut DataFrame, column: &str) -> Result<RecodeOutcome> {
        let series = column_series(df, column)?;
        if !is_numeric_dtype(series.dtype()) {
            debug!(
                "Column '{}' is {}, not recoding",
                column,
                series.dtype()
            );
            return Ok(RecodeOutcome::Skipped);
        }

        let mut mapped = 0;
        let mut unmapped = 0;
        let labels: Vec<Option<&str>> = numeric_values(series)?
            .into_iter()
            .map(|code| match code {
                Some(c) if c == 0.0 => {
                    mapped += 1;
                    Some(self.zero_label.as_str())
                }
                Some(c) if c == 1.0 => {
                    mapped += 1;
                    Some(self.one_label.as_str())
                }
                Some(_) => {
                    unmapped += 1;
                    None
                }
                None => None,
            })
            .collect();

        df.replace(column, Series::new(column.into(), labels))?;

        if unmapped > 0 {
            warn!(
                "{} values in '{}' are not 0/1 codes and were set to missing",
                unmapped, column
            );
        }
        info!(
            "Recoded '{}' to {}/{} ({} values)",
            column, self.zero_label, self.one_label, mapped
        );
        Ok(RecodeOutcome::Recoded { mapped, unmapped })
    }
}
