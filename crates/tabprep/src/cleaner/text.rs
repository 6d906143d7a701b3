//! Text normalization for string columns.

use crate::error::Result;
use crate::utils::{is_text_dtype, title_case};
use polars::prelude::*;
use tracing::{debug, info};

/// Trims and title-cases every text column.
pub struct TextNormalizer;

impl TextNormalizer {
    /// Normalize all `String` columns in place. Returns their names.
    ///
    /// Missing values stay missing; values empty after trimming become missing.
    pub fn normalize(df: &mut DataFrame) -> Result<Vec<String>> {
        let text_columns: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|c| is_text_dtype(c.dtype()))
            .map(|c| c.name().to_string())
            .collect();

        for name in &text_columns {
            let normalized = Self::normalize_column(df.column(name)?.as_materialized_series())?;
            df.replace(name, normalized)?;
            debug!("Normalized text column '{}'", name);
        }

        info!("Normalized {} text columns", text_columns.len());
        Ok(text_columns)
    }

    fn normalize_column(series: &Series) -> Result<Series> {
        let values: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|v| v.and_then(Self::normalize_value))
            .collect();
        Ok(Series::new(series.name().clone(), values))
    }

    fn normalize_value(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(title_case(trimmed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_title_cases() {
        let mut df = df![
            "Company" => [Some("  tcs "), Some("INFOSYS"), None, Some("   ")],
            "Place" => [Some("new delhi"), Some("o'neil town"), Some("pune"), Some("Mumbai")],
            "Age" => [20i64, 30, 40, 50],
        ]
        .unwrap();

        let columns = TextNormalizer::normalize(&mut df).unwrap();
        assert_eq!(columns, vec!["Company".to_string(), "Place".to_string()]);

        let company = df.column("Company").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(company.get(0), Some("Tcs"));
        assert_eq!(company.get(1), Some("Infosys"));
        assert_eq!(company.get(2), None);
        assert_eq!(company.get(3), None);

        let place = df.column("Place").unwrap().as_materialized_series().str().unwrap().clone();
        assert_eq!(place.get(0), Some("New Delhi"));
        assert_eq!(place.get(1), Some("O'Neil Town"));
    }

    #[test]
    fn test_normalize_leaves_numeric_columns() {
        let mut df = df!["Age" => [20i64, 30]].unwrap();
        let columns = TextNormalizer::normalize(&mut df).unwrap();
        assert!(columns.is_empty());
        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::Int64);
    }
}
