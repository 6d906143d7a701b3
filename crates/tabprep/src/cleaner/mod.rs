//! Column and row cleaning stages.
//!
//! - [`ColumnPruner`] drops constant and explicitly named columns
//! - [`TextNormalizer`] trims and title-cases text columns
//! - [`BinaryRecoder`] maps numeric 0/1 codes to labels
//! - [`RowValidator`] removes duplicates and rows failing range or
//!   completeness rules

mod recode;
mod text;
mod validator;

pub use recode::{BinaryRecoder, RecodeOutcome};
pub use text::TextNormalizer;
pub use validator::{RowValidator, ValidationOutcome};

use crate::error::{PreprocessingError, Result};
use crate::utils::has_column;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Removes columns from a table.
pub struct ColumnPruner;

impl ColumnPruner {
    /// Drop every column with at most one distinct non-missing value.
    ///
    /// Columns named in `keep` are never dropped. Returns the table and the
    /// dropped names in their original order.
    pub fn drop_constant_columns<S: AsRef<str>>(
        df: DataFrame,
        keep: &[S],
    ) -> Result<(DataFrame, Vec<String>)> {
        let mut constant = Vec::new();
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let distinct = series.drop_nulls().n_unique()?;
            if distinct > 1 {
                continue;
            }
            if keep.iter().any(|k| k.as_ref() == series.name().as_str()) {
                warn!("Keeping constant column '{}'", series.name());
                continue;
            }
            debug!("Column '{}' has {} distinct values", series.name(), distinct);
            constant.push(series.name().to_string());
        }

        if constant.is_empty() {
            debug!("No constant columns found");
            return Ok((df, constant));
        }

        let names: Vec<PlSmallStr> = constant.iter().map(|s| s.as_str().into()).collect();
        let df = df.drop_many(names);
        info!("Dropped {} constant columns: {:?}", constant.len(), constant);
        Ok((df, constant))
    }

    /// Drop the listed columns. Fails without dropping anything if one is absent.
    pub fn drop_named_columns<S: AsRef<str>>(df: DataFrame, names: &[S]) -> Result<DataFrame> {
        for name in names {
            if !has_column(&df, name.as_ref()) {
                return Err(PreprocessingError::ColumnNotFound(name.as_ref().to_string()));
            }
        }

        let to_drop: Vec<PlSmallStr> = names.iter().map(|s| s.as_ref().into()).collect();
        let df = df.drop_many(to_drop);
        info!("Dropped {} columns", names.len());
        Ok(df)
    }
}
