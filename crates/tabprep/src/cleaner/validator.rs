//! Row-level validation: duplicates, numeric ranges and required fields.

use crate::config::RangeRule;
use crate::error::Result;
use crate::utils::{column_series, numeric_values, require_columns};
use polars::prelude::*;
use tracing::{debug, info};

/// Rows removed by each predicate of [`RowValidator::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub duplicates_removed: usize,
    /// `(column, rows removed)` per range rule, in rule order.
    pub out_of_range: Vec<(String, usize)>,
    pub missing_removed: usize,
}

impl ValidationOutcome {
    pub fn total_removed(&self) -> usize {
        self.duplicates_removed
            + self.out_of_range.iter().map(|(_, n)| n).sum::<usize>()
            + self.missing_removed
    }
}

/// Removes rows that fail validation rules.
pub struct RowValidator;

impl RowValidator {
    /// Drop exact duplicate rows, keeping the first occurrence in order.
    pub fn drop_duplicates(df: DataFrame) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
        let removed = before - df.height();
        debug!("Removed {} duplicate rows", removed);
        Ok((df, removed))
    }

    /// Keep rows whose value lies inside the rule's inclusive bounds.
    /// Missing values fail the rule.
    pub fn filter_range(df: DataFrame, rule: &RangeRule) -> Result<(DataFrame, usize)> {
        let values = numeric_values(column_series(&df, &rule.column)?)?;
        let mask: Vec<bool> = values.into_iter().map(|v| rule.contains(v)).collect();
        Self::keep(df, &mask)
    }

    /// Drop rows missing a value in any of the listed columns.
    pub fn drop_missing<S: AsRef<str>>(df: DataFrame, columns: &[S]) -> Result<(DataFrame, usize)> {
        require_columns(&df, columns)?;
        let mut mask = vec![true; df.height()];
        for name in columns {
            let nulls = column_series(&df, name.as_ref())?.is_null();
            for (keep, is_null) in mask.iter_mut().zip(nulls.into_iter()) {
                if is_null.unwrap_or(false) {
                    *keep = false;
                }
            }
        }
        Self::keep(df, &mask)
    }

    /// Deduplicate, apply every range rule, then drop rows missing a
    /// required column.
    ///
    /// Every row of the result satisfies all rules, so running it again on
    /// its own output removes nothing.
    pub fn apply(
        df: DataFrame,
        range_rules: &[RangeRule],
        required: &[String],
    ) -> Result<(DataFrame, ValidationOutcome)> {
        let rule_columns: Vec<&str> = range_rules.iter().map(|r| r.column.as_str()).collect();
        require_columns(&df, &rule_columns)?;
        require_columns(&df, required)?;

        let mut outcome = ValidationOutcome::default();
        let (mut df, removed) = Self::drop_duplicates(df)?;
        outcome.duplicates_removed = removed;

        for rule in range_rules {
            let (filtered, removed) = Self::filter_range(df, rule)?;
            debug!(
                "Range rule on '{}' [{:?}, {:?}] removed {} rows",
                rule.column, rule.min, rule.max, removed
            );
            outcome.out_of_range.push((rule.column.clone(), removed));
            df = filtered;
        }

        let (df, removed) = Self::drop_missing(df, required)?;
        outcome.missing_removed = removed;

        info!(
            "Validation removed {} rows ({} duplicates, {} missing required values)",
            outcome.total_removed(),
            outcome.duplicates_removed,
            outcome.missing_removed
        );
        Ok((df, outcome))
    }

    fn keep(df: DataFrame, mask: &[bool]) -> Result<(DataFrame, usize)> {
        let before = df.height();
        let df = df.filter(&BooleanChunked::from_slice("mask".into(), mask))?;
        let removed = before - df.height();
        Ok((df, removed))
    }
}
