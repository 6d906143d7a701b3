//! Numeric binning into labelled, right-closed intervals.

use crate::config::validate_bins;
use crate::error::{PreprocessingError, Result};
use crate::utils::{column_series, has_column, numeric_values};
use polars::prelude::*;
use tracing::{info, warn};

/// Maps values into `(edges[i], edges[i + 1]]` labelled `labels[i]`.
#[derive(Debug, Clone)]
pub struct Bucketizer {
    edges: Vec<f64>,
    labels: Vec<String>,
}

impl Bucketizer {
    /// Edges must be strictly increasing with one label per interval.
    pub fn new(edges: Vec<f64>, labels: Vec<String>) -> Result<Self> {
        validate_bins(&edges, &labels)?;
        Ok(Self { edges, labels })
    }

    /// Label for one value, or `None` outside every interval.
    pub fn bucket(&self, value: f64) -> Option<&str> {
        self.edges
            .windows(2)
            .position(|w| value > w[0] && value <= w[1])
            .map(|i| self.labels[i].as_str())
    }

    /// Append a `String` column `target` bucketing `source`.
    ///
    /// Returns the number of non-missing values that fell outside every bin.
    pub fn apply(&self, df: &mut DataFrame, source: &str, target: &str) -> Result<usize> {
        if has_column(df, target) {
            return Err(PreprocessingError::InvalidConfig(format!(
                "bucket column '{target}' already exists"
            )));
        }

        let values = numeric_values(column_series(df, source)?)?;
        let mut out_of_range = 0;
        let labels: Vec<Option<&str>> = values
            .into_iter()
            .map(|v| {
                let label = v.and_then(|v| self.bucket(v));
                if v.is_some() && label.is_none() {
                    out_of_range += 1;
                }
                label
            })
            .collect();

        df.with_column(Series::new(target.into(), labels))?;

        if out_of_range > 0 {
            warn!("{} values in '{}' fall outside every bin", out_of_range, source);
        }
        info!("Derived '{}' from '{}' with {} bins", target, source, self.labels.len());
        Ok(out_of_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seniority() -> Bucketizer {
        Bucketizer::new(
            vec![17.0, 25.0, 35.0, 50.0, 65.0],
            vec![
                "Junior".to_string(),
                "Mid".to_string(),
                "Senior".to_string(),
                "Executive".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bucket_right_closed() {
        let b = seniority();
        assert_eq!(b.bucket(18.0), Some("Junior"));
        assert_eq!(b.bucket(25.0), Some("Junior"));
        assert_eq!(b.bucket(25.5), Some("Mid"));
        assert_eq!(b.bucket(35.0), Some("Mid"));
        assert_eq!(b.bucket(50.0), Some("Senior"));
        assert_eq!(b.bucket(65.0), Some("Executive"));
        assert_eq!(b.bucket(17.0), None);
        assert_eq!(b.bucket(66.0), None);
    }

    #[test]
    fn test_apply_appends_label_column() {
        let mut df = df!["Age" => [Some(22.0), Some(40.0), None, Some(70.0)]].unwrap();
        let out_of_range = seniority().apply(&mut df, "Age", "Seniority").unwrap();

        assert_eq!(out_of_range, 1);
        assert_eq!(df.width(), 2);
        let labels = df.column("Seniority").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(labels.get(0), Some("Junior"));
        assert_eq!(labels.get(1), Some("Senior"));
        assert_eq!(labels.get(2), None);
        assert_eq!(labels.get(3), None);
    }

    #[test]
    fn test_new_rejects_bad_edges() {
        let err = Bucketizer::new(vec![10.0, 10.0], vec!["x".into()]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");

        let err = Bucketizer::new(vec![0.0, 1.0, 2.0], vec!["x".into()]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_apply_rejects_existing_target() {
        let mut df = df!["Age" => [30.0], "Seniority" => ["Mid"]].unwrap();
        let err = seniority().apply(&mut df, "Age", "Seniority").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
