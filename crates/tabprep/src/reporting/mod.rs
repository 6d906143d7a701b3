//! Report output.
//!
//! A [`CleaningReport`](crate::types::CleaningReport) is produced by every
//! pipeline run. This module turns it into:
//! - a JSON file next to the cleaned CSV (`--emit-report` CLI flag)
//! - a plain-text summary for the terminal
//!
//! # Example
//!
//! ```rust,ignore
//! use tabprep::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! let path = generator.write_report(&output.report, "Cleaned_Employee")?;
//! println!("{}", ReportGenerator::summary_text(&output.report));
//! ```

mod generator;

pub use generator::ReportGenerator;
