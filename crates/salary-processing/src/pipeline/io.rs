//! Delimited-file input and output.

use crate::error::{PipelineError, Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, info};

/// Load a raw job-posting file.
///
/// Every column is read as text; typing is the cleaner's job, and inference
/// would otherwise turn values like `"85,000"` into nulls before they are seen.
pub fn load_job_postings(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PipelineError::InputNotFound(path.display().to_string()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
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

/// Write a table as comma-separated text with a header row.
///
/// Parent directories are created as needed.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)
        .map_err(|e| PipelineError::OutputFailed(format!("{}: {}", path.display(), e)))?;

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(df)
        .context(format!("Failed to write {}", path.display()))?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_reads_everything_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "salary,post_date,company_size").unwrap();
        writeln!(file, "\"85,000\",-3,120").unwrap();
        writeln!(file, "90000,5,").unwrap();
        drop(file);

        let df = load_job_postings(&path).unwrap();
        assert_eq!(df.height(), 2);
        for column in df.get_columns() {
            assert_eq!(column.dtype(), &DataType::String, "{}", column.name());
        }
        let salary = crate::utils::string_values(&df, "salary").unwrap();
        assert_eq!(salary[0].as_deref(), Some("85,000"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_job_postings("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let mut df = df![
            "skill" => ["python", "sql, advanced"],
            "count" => [2u32, 1],
        ]
        .unwrap();

        write_csv(&mut df, &path).unwrap();
        let back = load_job_postings(&path).unwrap();
        let skills = crate::utils::string_values(&back, "skill").unwrap();
        assert_eq!(skills[1].as_deref(), Some("sql, advanced"));
        assert_eq!(back.height(), 2);
    }
}
