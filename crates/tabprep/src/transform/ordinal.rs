//! Ordinal encoding for categorical columns.
//!
//! Categories are sorted lexicographically and coded by their index.

use super::{HandleUnknown, sorted_categories};
use crate::error::{PreprocessingError, Result};
use crate::utils::{column_series, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Ordinal encoder (unfitted).
#[derive(Debug, Clone, Default)]
pub struct OrdinalEncoder {
    handle_unknown: HandleUnknown,
}

impl OrdinalEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    /// Learn the sorted categories of `column`.
    pub fn fit(&self, df: &DataFrame, column: &str) -> Result<FittedOrdinalEncoder> {
        let categories = sorted_categories(column_series(df, column)?)?;
        Ok(FittedOrdinalEncoder {
            column: column.to_string(),
            categories,
            handle_unknown: self.handle_unknown,
        })
    }
}

/// Fitted ordinal encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOrdinalEncoder {
    column: String,
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl FittedOrdinalEncoder {
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Learned categories; a category's code is its index.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Code of one category.
    pub fn code(&self, category: &str) -> Option<i64> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(category))
            .ok()
            .map(|i| i as i64)
    }

    /// `(category, code)` pairs in code order.
    pub fn mapping(&self) -> Vec<(String, i64)> {
        self.categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i as i64))
            .collect()
    }

    /// Replace the column in place with `Int64` codes.
    ///
    /// Returns the distinct unseen categories that were encoded as missing
    /// under [`HandleUnknown::Ignore`].
    pub fn transform(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let values = text_values(column_series(df, &self.column)?)?;
        let mut unseen: Vec<String> = Vec::new();
        let mut codes: Vec<Option<i64>> = Vec::with_capacity(values.len());

        for value in values {
            let Some(value) = value else {
                codes.push(None);
                continue;
            };
            match (self.code(&value), self.handle_unknown) {
                (Some(code), _) => codes.push(Some(code)),
                (None, HandleUnknown::Error) => {
                    return Err(PreprocessingError::UnseenCategory {
                        column: self.column.clone(),
                        value,
                    });
                }
                (None, HandleUnknown::Ignore) => {
                    if !unseen.contains(&value) {
                        unseen.push(value);
                    }
                    codes.push(None);
                }
            }
        }

        df.replace(&self.column, Series::new(self.column.as_str().into(), codes))?;

        if !unseen.is_empty() {
            warn!("Unseen categories in '{}' encoded as missing: {:?}", self.column, unseen);
        }
        info!(
            "Ordinal encoded '{}' ({} categories)",
            self.column,
            self.categories.len()
        );
        Ok(unseen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn listings() -> DataFrame {
        df![
            "room_type" => [
                Some("Private room"),
                Some("Entire home/apt"),
                Some("Shared room"),
                None,
                Some("Private room"),
            ],
        ]
        .unwrap()
    }

    fn codes(df: &DataFrame) -> Vec<Option<i64>> {
        df.column("room_type")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_fit_sorted_categories() {
        let fitted = OrdinalEncoder::new().fit(&listings(), "room_type").unwrap();
        assert_eq!(
            fitted.mapping(),
            vec![
                ("Entire home/apt".to_string(), 0),
                ("Private room".to_string(), 1),
                ("Shared room".to_string(), 2),
            ]
        );
        assert_eq!(fitted.code("Shared room"), Some(2));
        assert_eq!(fitted.code("Hotel room"), None);
    }

    #[test]
    fn test_transform_replaces_in_place() {
        let mut df = listings();
        let fitted = OrdinalEncoder::new().fit(&df, "room_type").unwrap();
        let unseen = fitted.transform(&mut df).unwrap();

        assert!(unseen.is_empty());
        assert_eq!(df.width(), 1);
        assert_eq!(codes(&df), vec![Some(1), Some(0), Some(2), None, Some(1)]);
    }

    #[test]
    fn test_unseen_category_errors_by_default() {
        let fitted = OrdinalEncoder::new().fit(&listings(), "room_type").unwrap();
        let mut other = df!["room_type" => ["Hotel room"]].unwrap();

        let err = fitted.transform(&mut other).unwrap_err();
        assert!(matches!(
            err,
            PreprocessingError::UnseenCategory { column, value }
                if column == "room_type" && value == "Hotel room"
        ));
    }

    #[test]
    fn test_unseen_category_ignored() {
        let fitted = OrdinalEncoder::new()
            .with_handle_unknown(HandleUnknown::Ignore)
            .fit(&listings(), "room_type")
            .unwrap();
        let mut other = df!["room_type" => ["Hotel room", "Shared room", "Hotel room"]].unwrap();

        let unseen = fitted.transform(&mut other).unwrap();
        assert_eq!(unseen, vec!["Hotel room".to_string()]);
        assert_eq!(codes(&other), vec![None, Some(2), None]);
    }

    #[test]
    fn test_fit_all_missing_fails() {
        let df = df!["room_type" => [None::<&str>, None]].unwrap();
        let err = OrdinalEncoder::new().fit(&df, "room_type").unwrap_err();
        assert_eq!(err.error_code(), "NO_VALID_VALUES");
    }
}
