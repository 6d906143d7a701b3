//! CSV input and output.

use crate::error::{PreprocessingError, Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file with a header row.
///
/// Schema is inferred from every row; empty fields become nulls.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PreprocessingError::MissingInputFile(path.to_path_buf()));
    }

    debug!("Reading CSV: {}", path.display());
    let df = CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
        .context(format!("Failed to parse {}", path.display()))?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Write a table as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Failed to write {}", path.display()))?;

    info!("Dataset saved: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("tabprep_io_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_csv("no/such/Employee.csv").unwrap_err();
        assert!(matches!(err, PreprocessingError::MissingInputFile(_)));
    }

    #[test]
    fn test_load_directory_is_missing_input() {
        let err = load_csv(std::env::temp_dir()).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_INPUT_FILE");
    }

    #[test]
    fn test_schema_inference_scans_every_row() {
        let path = temp_path("late_float/listings.csv");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut body = String::from("id,price\n");
        for i in 0..150 {
            body.push_str(&format!("{i},{}\n", 100 + i));
        }
        body.push_str("150,99.5\n");
        fs::write(&path, body).unwrap();

        let df = load_csv(&path).unwrap();
        assert_eq!(df.height(), 151);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_write_then_load() {
        let path = temp_path("nested/out.csv");
        let mut df = df![
            "Company" => ["Tcs", "Infosys"],
            "Age" => [Some(30i64), None],
        ]
        .unwrap();

        write_csv(&mut df, &path).unwrap();
        let loaded = load_csv(&path).unwrap();

        assert_eq!(loaded.shape(), (2, 2));
        assert_eq!(loaded.column("Age").unwrap().null_count(), 1);
        assert_eq!(
            loaded
                .column("Company")
                .unwrap()
                .as_materialized_series()
                .str()
                .unwrap()
                .get(1),
            Some("Infosys")
        );

        let _ = fs::remove_dir_all(path.parent().unwrap().parent().unwrap());
    }
}
