//! CLI entry point for the tabular cleaning pipelines.

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tabprep::{
    CleaningReport, EmployeeConfig, ListingsConfig, Pipeline, PipelineConfig, ReportGenerator,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Cleaning pipelines for employee rosters and Airbnb listings",
    long_about = "Runs one of two fixed cleaning pipelines over a CSV file and writes the \
                  cleaned table as CSV.\n\n\
                  EXAMPLES:\n  \
                  # Clean an employee roster\n  \
                  tabprep employee -i Employee.csv\n\n  \
                  # Prepare listings with a custom output path and a JSON report\n  \
                  tabprep listings -i AB_NYC_2019.csv -o out/listings.csv --emit-report\n\n  \
                  # Override pipeline settings from a JSON file\n  \
                  tabprep employee -i Employee.csv --config employee.json"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output the JSON report to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout carries only JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean an employee roster (Company, Place, Age, Salary, Gender)
    Employee(RunArgs),
    /// Prepare Airbnb listings for modelling (encode and scale)
    Listings(RunArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: PathBuf,

    /// Path of the cleaned CSV file
    ///
    /// Defaults to ./outputs/<pipeline output name>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file overriding the pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON report next to the cleaned CSV
    ///
    /// The report will be saved as <output_stem>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables (RUST_LOG) from .env file
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    let (config, run_args) = match &args.command {
        Command::Employee(run_args) => {
            let config = match &run_args.config {
                Some(path) => EmployeeConfig::from_json_file(path)?,
                None => EmployeeConfig::default(),
            };
            (PipelineConfig::Employee(config), run_args)
        }
        Command::Listings(run_args) => {
            let config = match &run_args.config {
                Some(path) => ListingsConfig::from_json_file(path)?,
                None => ListingsConfig::default(),
            };
            (PipelineConfig::Listings(config), run_args)
        }
    };

    let output = run_args
        .output
        .clone()
        .unwrap_or_else(|| Path::new("outputs").join(config.output_name()));

    let pipeline = build_pipeline(&args, config)?;

    info!("{}", "=".repeat(80));
    info!("Starting {}...", pipeline.kind().display_name());
    info!("{}", "=".repeat(80));

    let result = match pipeline.run(&run_args.input, &output) {
        Ok(result) => result,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed [{}]: {}", e.error_code(), e));
        }
    };

    handle_pipeline_output(&result.report, run_args, &output, args.json)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Handle pipeline output based on CLI flags.
///
/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report next to the output CSV
fn handle_pipeline_output(
    report: &CleaningReport,
    run_args: &RunArgs,
    output: &Path,
    json: bool,
) -> Result<()> {
    if run_args.emit_report {
        let output_dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        let report_path = ReportGenerator::new(output_dir).write_report(report, stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    print!("{}", ReportGenerator::summary_text(report));
    println!("{}", "=".repeat(80));

    Ok(())
}
