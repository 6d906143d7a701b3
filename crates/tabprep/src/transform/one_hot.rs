//! One-hot encoding for categorical columns.

use super::{HandleUnknown, sorted_categories};
use crate::error::{PreprocessingError, Result};
use crate::utils::{column_series, text_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One-hot encoder (unfitted).
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy for handling unknown categories.
    pub fn with_handle_unknown(mut self, strategy: HandleUnknown) -> Self {
        self.handle_unknown = strategy;
        self
    }

    /// Learn the sorted categories of `column`.
    pub fn fit(&self, df: &DataFrame, column: &str) -> Result<FittedOneHotEncoder> {
        let categories = sorted_categories(column_series(df, column)?)?;
        Ok(FittedOneHotEncoder {
            column: column.to_string(),
            categories,
            handle_unknown: self.handle_unknown,
        })
    }
}

/// Fitted one-hot encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    column: String,
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl FittedOneHotEncoder {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Output column names, `{column}_{category}`, in category order.
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }

    /// Build one `Float64` indicator column per category.
    ///
    /// The source column is left in place. Missing source values, and unseen
    /// ones under [`HandleUnknown::Ignore`], produce an all-zero row. Returns
    /// the indicator columns and the distinct unseen categories.
    pub fn transform(&self, df: &DataFrame) -> Result<(Vec<Series>, Vec<String>)> {
        let values = text_values(column_series(df, &self.column)?)?;
        let mut indicators: Vec<Vec<f64>> = vec![vec![0.0; values.len()]; self.categories.len()];
        let mut unseen: Vec<String> = Vec::new();

        for (row, value) in values.into_iter().enumerate() {
            let Some(value) = value else { continue };
            match self.categories.binary_search(&value) {
                Ok(i) => indicators[i][row] = 1.0,
                Err(_) if self.handle_unknown == HandleUnknown::Error => {
                    return Err(PreprocessingError::UnseenCategory {
                        column: self.column.clone(),
                        value,
                    });
                }
                Err(_) => {
                    if !unseen.contains(&value) {
                        unseen.push(value);
                    }
                }
            }
        }

        if !unseen.is_empty() {
            warn!("Unseen categories in '{}' encoded as zeros: {:?}", self.column, unseen);
        }

        let columns = self
            .feature_names()
            .into_iter()
            .zip(indicators)
            .map(|(name, values)| Series::new(name.into(), values))
            .collect();
        Ok((columns, unseen))
    }

    /// Append the indicator columns to the table. The source column stays.
    pub fn append(&self, df: &mut DataFrame) -> Result<Vec<String>> {
        let (columns, unseen) = self.transform(df)?;
        for column in columns {
            df.with_column(column)?;
        }
        info!(
            "One-hot encoded '{}' into {} columns",
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

    fn boroughs() -> DataFrame {
        df![
            "neighbourhood_group" => [
                Some("Brooklyn"),
                Some("Manhattan"),
                Some("Queens"),
                Some("Staten Island"),
                Some("Bronx"),
                Some("Manhattan"),
                None,
            ],
        ]
        .unwrap()
    }

    #[test]
    fn test_feature_names() {
        let fitted = OneHotEncoder::new().fit(&boroughs(), "neighbourhood_group").unwrap();
        assert_eq!(
            fitted.feature_names(),
            vec![
                "neighbourhood_group_Bronx",
                "neighbourhood_group_Brooklyn",
                "neighbourhood_group_Manhattan",
                "neighbourhood_group_Queens",
                "neighbourhood_group_Staten Island",
            ]
        );
    }

    #[test]
    fn test_rows_sum_to_one() {
        let df = boroughs();
        let fitted = OneHotEncoder::new().fit(&df, "neighbourhood_group").unwrap();
        let (columns, unseen) = fitted.transform(&df).unwrap();

        assert!(unseen.is_empty());
        assert_eq!(columns.len(), 5);
        for row in 0..df.height() {
            let sum: f64 = columns
                .iter()
                .map(|c| c.f64().unwrap().get(row).unwrap())
                .sum();
            let expected = if row == 6 { 0.0 } else { 1.0 };
            assert_eq!(sum, expected, "row {row}");
        }
        // Manhattan is the third category
        assert_eq!(columns[2].f64().unwrap().get(1), Some(1.0));
    }

    #[test]
    fn test_append_keeps_source() {
        let mut df = boroughs();
        let fitted = OneHotEncoder::new().fit(&df, "neighbourhood_group").unwrap();
        fitted.append(&mut df).unwrap();
        assert_eq!(df.width(), 6);
        assert_eq!(
            df.get_column_names()[0].as_str(),
            "neighbourhood_group"
        );
    }

    #[test]
    fn test_unseen_category() {
        let fitted = OneHotEncoder::new().fit(&boroughs(), "neighbourhood_group").unwrap();
        let other = df!["neighbourhood_group" => ["Hoboken"]].unwrap();
        let err = fitted.transform(&other).unwrap_err();
        assert_eq!(err.error_code(), "UNSEEN_CATEGORY");

        let lenient = OneHotEncoder::new()
            .with_handle_unknown(HandleUnknown::Ignore)
            .fit(&boroughs(), "neighbourhood_group")
            .unwrap();
        let (columns, unseen) = lenient.transform(&other).unwrap();
        assert_eq!(unseen, vec!["Hoboken".to_string()]);
        assert!(columns.iter().all(|c| c.f64().unwrap().get(0) == Some(0.0)));
    }
}
