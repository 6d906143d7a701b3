//! Group-wise imputation.
//!
//! Rows are partitioned by the value of a group column (key to row indices,
//! in first-seen order). A statistic is computed per partition over the
//! target's non-missing values and written back into that partition's
//! missing cells. Rows whose group key is missing belong to no partition and
//! keep their missing targets.

use crate::config::{GroupFill, GroupStatistic};
use crate::error::Result;
use crate::utils::{
    column_series, is_numeric_dtype, numeric_mode, numeric_values, text_mode, text_values,
};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of one group-wise fill.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupFillOutcome {
    pub column: String,
    pub statistic: &'static str,
    /// Cells that received a value.
    pub filled: usize,
    /// Groups with no non-missing target value that also had missing cells.
    pub empty_groups: Vec<String>,
}

/// Fills missing values per group.
pub struct GroupedImputer;

impl GroupedImputer {
    /// Partition row indices by group key, in first-seen key order.
    pub fn group_indices(df: &DataFrame, group_column: &str) -> Result<Vec<(String, Vec<usize>)>> {
        let keys = text_values(column_series(df, group_column)?)?;
        let mut position: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

        for (row, key) in keys.into_iter().enumerate() {
            let Some(key) = key else { continue };
            match position.get(&key) {
                Some(&i) => groups[i].1.push(row),
                None => {
                    position.insert(key.clone(), groups.len());
                    groups.push((key, vec![row]));
                }
            }
        }
        Ok(groups)
    }

    /// Apply one fill. Numeric targets are returned as `Float64`.
    pub fn fill(df: &mut DataFrame, group_column: &str, fill: &GroupFill) -> Result<GroupFillOutcome> {
        let groups = Self::group_indices(df, group_column)?;
        let target = column_series(df, &fill.column)?;

        let (series, filled, empty_groups) = match &fill.statistic {
            GroupStatistic::Mode { fallback } if !is_numeric_dtype(target.dtype()) => {
                Self::fill_text_mode(target, &groups, fallback)?
            }
            statistic => Self::fill_numeric(target, &groups, statistic)?,
        };
        df.replace(&fill.column, series)?;

        for group in &empty_groups {
            warn!(
                "Group '{}' of '{}' has no values for '{}'",
                group, group_column, fill.column
            );
        }
        info!(
            "Filled {} missing values in '{}' with group {} by '{}'",
            filled,
            fill.column,
            fill.statistic.name(),
            group_column
        );

        Ok(GroupFillOutcome {
            column: fill.column.clone(),
            statistic: fill.statistic.name(),
            filled,
            empty_groups,
        })
    }

    fn fill_text_mode(
        target: &Series,
        groups: &[(String, Vec<usize>)],
        fallback: &str,
    ) -> Result<(Series, usize, Vec<String>)> {
        let mut values = text_values(target)?;
        let mut filled = 0;
        let mut empty_groups = Vec::new();

        for (key, rows) in groups {
            let missing: Vec<usize> = rows.iter().copied().filter(|&r| values[r].is_none()).collect();
            if missing.is_empty() {
                continue;
            }
            let mode = text_mode(rows.iter().filter_map(|&r| values[r].as_deref()));
            let value = match mode {
                Some(mode) => mode,
                None => {
                    empty_groups.push(key.clone());
                    fallback.to_string()
                }
            };
            debug!("Group '{}': filling {} cells with '{}'", key, missing.len(), value);
            for r in missing {
                values[r] = Some(value.clone());
                filled += 1;
            }
        }

        Ok((Series::new(target.name().clone(), values), filled, empty_groups))
    }

    fn fill_numeric(
        target: &Series,
        groups: &[(String, Vec<usize>)],
        statistic: &GroupStatistic,
    ) -> Result<(Series, usize, Vec<String>)> {
        let mut values = numeric_values(target)?;
        let floats = target.cast(&DataType::Float64)?;
        let mut filled = 0;
        let mut empty_groups = Vec::new();

        for (key, rows) in groups {
            let missing: Vec<usize> = rows.iter().copied().filter(|&r| values[r].is_none()).collect();
            if missing.is_empty() {
                continue;
            }
            let value = match statistic {
                GroupStatistic::Mode { .. } => {
                    let present: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
                    numeric_mode(&present)
                }
                GroupStatistic::Median => Self::take_rows(&floats, rows)?.median(),
                GroupStatistic::Mean => Self::take_rows(&floats, rows)?.mean(),
            };
            let Some(value) = value else {
                empty_groups.push(key.clone());
                continue;
            };
            debug!("Group '{}': filling {} cells with {}", key, missing.len(), value);
            for r in missing {
                values[r] = Some(value);
                filled += 1;
            }
        }

        Ok((Series::new(target.name().clone(), values), filled, empty_groups))
    }

    /// The rows of one partition as their own Series.
    fn take_rows(series: &Series, rows: &[usize]) -> Result<Series> {
        let idx = IdxCa::from_vec(
            "rows".into(),
            rows.iter().map(|&r| r as IdxSize).collect(),
        );
        Ok(series.take(&idx)?)
    }
}
