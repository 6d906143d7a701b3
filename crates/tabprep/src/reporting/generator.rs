//! JSON report files and terminal summaries for finished runs.

use crate::types::CleaningReport;
use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Writes run reports to an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Write a report to a JSON file.
    ///
    /// The report is written to the output directory with the specified base name.
    /// For example, if `report_base_name` is "Cleaned_Employee", the file will be
    /// "Cleaned_Employee_report.json".
    pub fn write_report(&self, report: &CleaningReport, report_base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Plain-text summary of a run for terminal output.
    pub fn summary_text(report: &CleaningReport) -> String {
        let mut out = format!(
            "{} ({})\n",
            report.pipeline.display_name(),
            report.generated_at
        );
        if let Some(input) = &report.input_file {
            out.push_str(&format!("  Input:    {input}\n"));
        }
        if let Some(output) = &report.output_file {
            out.push_str(&format!("  Output:   {output}\n"));
        }
        out.push_str(&format!(
            "  Rows:     {} -> {} ({:.1}% removed)\n",
            report.rows_before,
            report.rows_after,
            report.rows_removed_percentage()
        ));
        out.push_str(&format!(
            "  Columns:  {} -> {}\n",
            report.columns_before, report.columns_after
        ));
        out.push_str(&format!("  Duration: {} ms\n", report.duration_ms));

        if !report.actions.is_empty() {
            out.push_str("\nActions:\n");
            for action in &report.actions {
                out.push_str(&format!(
                    "  [{}] {}: {}\n",
                    action.action_type.display_name(),
                    action.target,
                    action.description
                ));
            }
        }

        if !report.warnings.is_empty() {
            out.push_str("\nWarnings:\n");
            for warning in &report.warnings {
                out.push_str(&format!("  - {warning}\n"));
            }
        }
        out
    }
}
