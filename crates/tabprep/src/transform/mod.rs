//! Column transformers.
//!
//! - [`Bucketizer`] derives a label column from numeric bin edges
//! - [`OrdinalEncoder`] replaces categories with integer codes
//! - [`OneHotEncoder`] expands categories into indicator columns
//! - [`MinMaxScaler`] rescales numeric columns to [0, 1]
//!
//! Encoders and the scaler are split into an unfitted configuration and a
//! fitted, serializable state: `fit` learns from a table and returns the
//! fitted value, whose `transform` applies it.

mod bucketizer;
mod minmax;
mod one_hot;
mod ordinal;

pub use bucketizer::Bucketizer;
pub use minmax::{ColumnRange, FittedMinMaxScaler, MinMaxScaler};
pub use one_hot::{FittedOneHotEncoder, OneHotEncoder};
pub use ordinal::{FittedOrdinalEncoder, OrdinalEncoder};

use crate::error::{PreprocessingError, Result};
use crate::utils::text_values;
use polars::prelude::Series;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Strategy for handling unknown categories during transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Fail with `UnseenCategory`.
    #[default]
    Error,
    /// Encode as missing (ordinal) or an all-zero row (one-hot).
    Ignore,
}

/// Sorted distinct non-missing values of a column's text rendering.
pub(crate) fn sorted_categories(series: &Series) -> Result<Vec<String>> {
    let categories: BTreeSet<String> = text_values(series)?.into_iter().flatten().collect();
    if categories.is_empty() {
        return Err(PreprocessingError::NoValidValues(series.name().to_string()));
    }
    Ok(categories.into_iter().collect())
}
