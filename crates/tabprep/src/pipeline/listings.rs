//! Listings preprocessing for model input.

use crate::cleaner::ColumnPruner;
use crate::config::ListingsConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::pipeline::progress::{PipelineStage, StageTracker};
use crate::profiler::DataProfiler;
use crate::transform::{MinMaxScaler, OneHotEncoder, OrdinalEncoder};
use crate::types::{ActionType, CleaningAction, CleaningReport, PipelineWarning};
use crate::utils::require_columns;
use polars::prelude::*;
use tracing::info;

/// Stages entered by [`clean`].
pub(crate) const STAGES: usize = 5;

/// Run every listings stage on `df`.
pub(crate) fn clean(
    config: &ListingsConfig,
    df: DataFrame,
    report: &mut CleaningReport,
    tracker: &mut StageTracker<'_>,
) -> Result<DataFrame> {
    let referenced: Vec<&String> = config
        .drop_columns
        .iter()
        .chain(&config.mode_fill_columns)
        .chain(&config.ordinal_columns)
        .chain(&config.one_hot_columns)
        .chain(&config.scale_columns)
        .collect();
    require_columns(&df, &referenced).context("Listings table is missing a required column")?;

    tracker.enter(PipelineStage::Profiling, "Profiling dataset...");
    report.profile_before = Some(DataProfiler::profile(&df)?);

    tracker.enter(PipelineStage::Pruning, "Dropping identifier columns...");
    let mut df = ColumnPruner::drop_named_columns(df, &config.drop_columns)?;
    for name in &config.drop_columns {
        report.add_action(CleaningAction::new(
            ActionType::ColumnRemoved,
            name,
            "Dropped identifier or free-text column",
        ));
    }

    tracker.enter(PipelineStage::Imputation, "Imputing missing values...");
    for column in &config.mode_fill_columns {
        tracker.column(column, format!("Filling '{column}' with its mode"));
        if let Some(fill) = StatisticalImputer::fill_mode(&mut df, column)? {
            report.add_action(
                CleaningAction::new(
                    ActionType::ValueImputed,
                    column,
                    format!("Filled {} missing values with the most frequent value", fill.filled),
                )
                .with_details(fill.value.to_string()),
            );
        }
    }

    tracker.enter(PipelineStage::Encoding, "Encoding categorical columns...");
    let df = encode(config, df, report, tracker)?;

    tracker.enter(PipelineStage::Scaling, "Scaling numeric columns...");
    let mut df = df;
    let scaler = MinMaxScaler::new().fit(&df, &config.scale_columns)?;
    let degenerate = scaler.transform(&mut df)?;
    report.add_action(
        CleaningAction::new(
            ActionType::DataNormalized,
            "dataset",
            format!("Min-max scaled {} columns", config.scale_columns.len()),
        )
        .with_details(config.scale_columns.join(", ")),
    );
    for range in degenerate {
        report.add_warning(PipelineWarning::DegenerateScale {
            column: range.column,
            value: range.min,
        });
    }
    report.scaling = Some(scaler);

    Ok(df)
}

fn encode(
    config: &ListingsConfig,
    mut df: DataFrame,
    report: &mut CleaningReport,
    tracker: &StageTracker<'_>,
) -> Result<DataFrame> {
    let categorical = DataProfiler::categorical_columns(&df)?;
    info!(
        "Categorical columns: {:?}",
        categorical.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );
    report.categorical_columns = categorical;

    let ordinal = OrdinalEncoder::new().with_handle_unknown(config.handle_unknown);
    for column in &config.ordinal_columns {
        tracker.column(column, format!("Ordinal encoding '{column}'"));
        let fitted = ordinal.fit(&df, column)?;
        let unseen = fitted.transform(&mut df)?;
        report.add_action(
            CleaningAction::new(
                ActionType::CategoriesEncoded,
                column,
                format!("Ordinal encoded {} categories", fitted.categories().len()),
            )
            .with_details(
                fitted
                    .mapping()
                    .iter()
                    .map(|(category, code)| format!("{category}={code}"))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        );
        if !unseen.is_empty() {
            report.add_warning(PipelineWarning::UnseenCategory {
                column: column.clone(),
                values: unseen,
            });
        }
        report.ordinal_encodings.push(fitted);
    }

    let one_hot = OneHotEncoder::new().with_handle_unknown(config.handle_unknown);
    for column in &config.one_hot_columns {
        tracker.column(column, format!("One-hot encoding '{column}'"));
        let fitted = one_hot.fit(&df, column)?;
        let unseen = fitted.append(&mut df)?;
        report.add_action(CleaningAction::new(
            ActionType::CategoriesEncoded,
            column,
            format!("One-hot encoded into {} columns", fitted.categories().len()),
        ));
        if !unseen.is_empty() {
            report.add_warning(PipelineWarning::UnseenCategory {
                column: column.clone(),
                values: unseen,
            });
        }
        report.one_hot_encodings.push(fitted);
    }

    ColumnPruner::drop_named_columns(df, &config.one_hot_columns)
}
