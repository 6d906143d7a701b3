//! Employee roster cleaning.

use crate::cleaner::{BinaryRecoder, ColumnPruner, RecodeOutcome, RowValidator, TextNormalizer};
use crate::config::EmployeeConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::{GroupedImputer, StatisticalImputer};
use crate::pipeline::outliers::OutlierHandler;
use crate::pipeline::progress::{PipelineStage, StageTracker};
use crate::profiler::DataProfiler;
use crate::transform::Bucketizer;
use crate::types::{ActionType, CleaningAction, CleaningReport, PipelineWarning};
use crate::utils::require_columns;
use polars::prelude::*;
use tracing::debug;

/// Stages entered by [`clean`].
pub(crate) const STAGES: usize = 8;

/// Run every employee cleaning stage on `df`.
pub(crate) fn clean(
    config: &EmployeeConfig,
    df: DataFrame,
    report: &mut CleaningReport,
    tracker: &mut StageTracker<'_>,
) -> Result<DataFrame> {
    let critical = config.critical_columns();
    require_columns(&df, &critical).context("Employee table is missing a required column")?;

    tracker.enter(PipelineStage::Profiling, "Profiling dataset...");
    report.profile_before = Some(DataProfiler::profile(&df)?);

    tracker.enter(PipelineStage::Pruning, "Dropping constant columns...");
    let (mut df, dropped) = ColumnPruner::drop_constant_columns(df, &critical)?;
    for name in &dropped {
        report.add_action(CleaningAction::new(
            ActionType::ColumnRemoved,
            name,
            "Dropped constant column",
        ));
    }

    tracker.enter(PipelineStage::Normalizing, "Normalizing text columns...");
    let normalized = TextNormalizer::normalize(&mut df)?;
    if !normalized.is_empty() {
        report.add_action(
            CleaningAction::new(
                ActionType::ValueCleaned,
                "dataset",
                format!("Trimmed and title-cased {} text columns", normalized.len()),
            )
            .with_details(normalized.join(", ")),
        );
    }

    tracker.enter(PipelineStage::Imputation, "Imputing missing values...");
    impute(config, &mut df, report)?;

    tracker.enter(PipelineStage::Recoding, "Recoding binary codes...");
    let [zero, one] = &config.binary_labels;
    match BinaryRecoder::new(zero, one).recode(&mut df, &config.binary_column)? {
        RecodeOutcome::Recoded { mapped, unmapped } => {
            report.add_action(CleaningAction::new(
                ActionType::ValueRecoded,
                &config.binary_column,
                format!("Mapped {mapped} codes to {zero}/{one}"),
            ));
            if unmapped > 0 {
                report.add_warning(PipelineWarning::UnmappedCodes {
                    column: config.binary_column.clone(),
                    count: unmapped,
                });
            }
        }
        RecodeOutcome::Skipped => debug!("'{}' already holds labels", config.binary_column),
    }

    tracker.enter(PipelineStage::Validation, "Validating rows...");
    let (df, outcome) = RowValidator::apply(df, &config.range_rules, &config.required_columns)?;
    if outcome.duplicates_removed > 0 {
        report.add_action(CleaningAction::new(
            ActionType::DuplicatesRemoved,
            "dataset",
            format!("Removed {} duplicate rows", outcome.duplicates_removed),
        ));
    }
    for (column, removed) in &outcome.out_of_range {
        if *removed > 0 {
            report.add_action(CleaningAction::new(
                ActionType::RowsRemoved,
                column,
                format!("Removed {removed} rows outside the allowed range"),
            ));
        }
    }
    if outcome.missing_removed > 0 {
        report.add_action(
            CleaningAction::new(
                ActionType::RowsRemoved,
                "dataset",
                format!(
                    "Removed {} rows missing required values",
                    outcome.missing_removed
                ),
            )
            .with_details(config.required_columns.join(", ")),
        );
    }

    tracker.enter(PipelineStage::OutlierRemoval, "Removing outliers...");
    let (mut df, bounds) = OutlierHandler::remove_iqr_outliers_sequential(
        df,
        &config.outlier_columns,
        config.iqr_multiplier,
    )?;
    for b in &bounds {
        report.add_action(
            CleaningAction::new(
                ActionType::OutlierHandled,
                &b.column,
                format!("Removed {} rows outside IQR bounds", b.rows_removed),
            )
            .with_details(format!("[{}, {}]", b.lower, b.upper)),
        );
    }
    report.outlier_bounds = bounds;

    tracker.enter(PipelineStage::Bucketing, "Deriving buckets...");
    let bucketizer = Bucketizer::new(config.bucket_edges.clone(), config.bucket_labels.clone())?;
    let outside = bucketizer.apply(&mut df, &config.bucket_source, &config.bucket_column)?;
    let mut action = CleaningAction::new(
        ActionType::ColumnDerived,
        &config.bucket_column,
        format!(
            "Derived from '{}' with {} bins",
            config.bucket_source,
            config.bucket_labels.len()
        ),
    );
    if outside > 0 {
        action = action.with_details(format!("{outside} values outside every bin left missing"));
    }
    report.add_action(action);

    Ok(df)
}

fn impute(config: &EmployeeConfig, df: &mut DataFrame, report: &mut CleaningReport) -> Result<()> {
    if let Some(fill) = StatisticalImputer::fill_mode(df, &config.mode_fill_column)? {
        report.add_action(
            CleaningAction::new(
                ActionType::ValueImputed,
                &config.mode_fill_column,
                format!("Filled {} missing values with the mode", fill.filled),
            )
            .with_details(fill.value.to_string()),
        );
    }

    for fill in &config.group_fills {
        let outcome = GroupedImputer::fill(df, &config.group_column, fill)?;
        if outcome.filled > 0 {
            report.add_action(CleaningAction::new(
                ActionType::ValueImputed,
                &outcome.column,
                format!(
                    "Filled {} missing values with the {} per '{}'",
                    outcome.filled, outcome.statistic, config.group_column
                ),
            ));
        }
        for group in outcome.empty_groups {
            report.add_warning(PipelineWarning::EmptyGroup {
                group_column: config.group_column.clone(),
                group,
                target: outcome.column.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PreprocessingError;
    use crate::types::PipelineKind;

    fn run(df: DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport::new(PipelineKind::Employee);
        let mut tracker = StageTracker::new(None, STAGES);
        let df = clean(&EmployeeConfig::default(), df, &mut report, &mut tracker)?;
        Ok((df, report))
    }

    fn str_col(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_three_row_scenario() {
        let df = df![
            "Company" => [Some("tcs"), Some(" Tcs "), Some("Tcs")],
            "Place" => [Some("Mumbai"), None, Some("Mumbai")],
            "Age" => [Some(24i64), None, Some(70)],
            "Salary" => [30000i64, 32000, 31000],
            "Gender" => [0i64, 1, 0],
        ]
        .unwrap();

        let (df, report) = run(df).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(
            str_col(&df, "Company"),
            vec![Some("Tcs".into()), Some("Tcs".into())]
        );
        assert_eq!(
            str_col(&df, "Place"),
            vec![Some("Mumbai".into()), Some("Mumbai".into())]
        );
        assert_eq!(
            str_col(&df, "Gender"),
            vec![Some("Male".into()), Some("Female".into())]
        );

        // Median of the Tcs group (24, 70) before the range filter.
        let ages: Vec<Option<f64>> = df
            .column("Age")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ages, vec![Some(24.0), Some(47.0)]);

        assert_eq!(
            str_col(&df, "Seniority"),
            vec![Some("Junior".into()), Some("Senior".into())]
        );
        assert!(report.warnings.is_empty());
        assert_eq!(report.outlier_bounds.len(), 2);
        assert_eq!(report.actions_of(ActionType::RowsRemoved).count(), 1);
    }

    #[test]
    fn test_missing_critical_column_is_fatal() {
        let df = df![
            "Company" => ["Tcs"],
            "Age" => [30i64],
            "Salary" => [5000i64],
            "Place" => ["Pune"],
        ]
        .unwrap();

        let err = run(df).unwrap_err();
        assert!(matches!(err.root(), PreprocessingError::ColumnNotFound(c) if c == "Gender"));
    }

    #[test]
    fn test_constant_non_critical_column_is_dropped() {
        let df = df![
            "Company" => ["Tcs", "Infosys"],
            "Country" => ["India", "India"],
            "Age" => [30i64, 40],
            "Salary" => [5000i64, 6000],
            "Place" => ["Pune", "Pune"],
            "Gender" => [0i64, 1],
        ]
        .unwrap();

        let (df, report) = run(df).unwrap();
        assert!(df.column("Country").is_err());
        assert!(df.column("Place").is_ok());
        let removed: Vec<_> = report.actions_of(ActionType::ColumnRemoved).collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].target, "Country");
    }

    #[test]
    fn test_unmapped_gender_code_is_warned_and_dropped() {
        let df = df![
            "Company" => ["Tcs", "Tcs", "Infosys", "Infosys"],
            "Age" => [30i64, 32, 40, 41],
            "Salary" => [5000i64, 5200, 6000, 6100],
            "Place" => ["Pune", "Chennai", "Pune", "Delhi"],
            "Gender" => [0i64, 1, 2, 0],
        ]
        .unwrap();

        let (df, report) = run(df).unwrap();
        assert_eq!(df.height(), 3);
        assert!(report.warnings.contains(&PipelineWarning::UnmappedCodes {
            column: "Gender".to_string(),
            count: 1
        }));
    }

    #[test]
    fn test_every_row_out_of_range_yields_empty_table() {
        let df = df![
            "Company" => ["Tcs", "Infosys"],
            "Age" => [70i64, 80],
            "Salary" => [5000i64, 6000],
            "Place" => ["Pune", "Delhi"],
            "Gender" => [0i64, 1],
        ]
        .unwrap();

        let (df, report) = run(df).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column("Seniority").is_ok());
        assert!(df.column("Age").is_ok());
        assert!(report.outlier_bounds.is_empty());
        assert_eq!(report.actions_of(ActionType::OutlierHandled).count(), 0);
    }
}
