//! Integration tests for the salary pipeline.
//!
//! These tests drive the pipeline end to end, from a raw CSV on disk to the
//! written tables and run report.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use pretty_assertions::assert_eq;
use salary_processing::reporting::{FILTERED_SKILLS_FILE, NORMALIZED_SKILLS_FILE, RAW_SKILLS_FILE};
use salary_processing::types::columns;
use salary_processing::{Pipeline, PipelineConfig, PipelineError, PipelineStage};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn sample_input() -> PathBuf {
    fixtures_path().join("job_posts_sample.csv")
}

fn read_csv(path: &Path) -> DataFrame {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .expect("Failed to create CSV reader")
        .finish()
        .expect("Failed to read CSV file")
}

fn pipeline_writing_to(dir: &Path) -> Pipeline {
    Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .reference_date_str("2025-06-01")
                .output_dir(dir)
                .generate_report(true)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

fn string_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(String::from))
        .collect()
}

fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

// ============================================================================
// File Runs
// ============================================================================

#[test]
fn test_run_file_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let run = pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap();

    assert_eq!(run.written.len(), 4);
    assert!(dir.path().join("cleaned_job_posts.csv").is_file());
    assert!(dir.path().join(RAW_SKILLS_FILE).is_file());
    assert!(dir.path().join(NORMALIZED_SKILLS_FILE).is_file());
    assert!(dir.path().join(FILTERED_SKILLS_FILE).is_file());

    let report_path = run.report_path.expect("report should be written");
    assert_eq!(report_path, dir.path().join("job_posts_sample_report.json"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["rows_in"], 9);
    assert_eq!(report["rows_cleaned"], 9);
    assert_eq!(report["rows_filtered"], 8);
    assert_eq!(report["reference_date"], "2025-06-01");
    assert_eq!(report["skill_tables"].as_array().unwrap().len(), 3);
    assert_eq!(report["output_files"].as_array().unwrap().len(), 4);
}

#[test]
fn test_cleaned_table_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap();

    let cleaned = read_csv(&dir.path().join("cleaned_job_posts.csv"));
    assert_eq!(cleaned.height(), 9);

    let names: Vec<&str> = cleaned
        .get_column_names()
        .iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(names.first(), Some(&columns::JOB_TITLE));
    assert!(names.contains(&columns::COUNTRY_CODE));
    assert!(names.contains(&columns::SALARY_AVG));

    let dates = string_column(&cleaned, columns::POST_DATE);
    assert_eq!(dates[0].as_deref(), Some("2025-05-29"));
    assert_eq!(dates[2].as_deref(), Some("2025-06-01"));

    let countries = string_column(&cleaned, columns::COUNTRY_CODE);
    assert_eq!(countries[0].as_deref(), Some("DE"));
    assert_eq!(countries[5].as_deref(), Some("US"));
    assert_eq!(countries[7], None);
    assert_eq!(countries[8].as_deref(), Some("FR"));

    let avg = f64_column(&cleaned, columns::SALARY_AVG);
    assert_eq!(avg[0], Some(80000.0));
    assert_eq!(avg[7], None);
    assert_eq!(avg[8], Some(60000.0));
}

#[test]
fn test_skill_table_on_disk_is_sorted() {
    let dir = tempfile::tempdir().unwrap();
    pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap();

    let table = read_csv(&dir.path().join(RAW_SKILLS_FILE));
    let skills = string_column(&table, "skill");
    assert_eq!(skills.first().cloned().flatten().as_deref(), Some("aws"));
    assert_eq!(skills.last().cloned().flatten().as_deref(), Some("excel"));

    let means = f64_column(&table, "average_salary");
    assert!(means.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn test_run_file_is_deterministic() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    pipeline_writing_to(first.path())
        .run_file(sample_input())
        .unwrap();
    pipeline_writing_to(second.path())
        .run_file(sample_input())
        .unwrap();

    for file in [
        "cleaned_job_posts.csv",
        RAW_SKILLS_FILE,
        NORMALIZED_SKILLS_FILE,
        FILTERED_SKILLS_FILE,
    ] {
        let a = fs::read(first.path().join(file)).unwrap();
        let b = fs::read(second.path().join(file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}

#[test]
fn test_run_file_without_saving() {
    let dir = tempfile::tempdir().unwrap();
    let run = Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .output_dir(dir.path())
                .save_to_disk(false)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
        .run_file(sample_input())
        .unwrap();

    assert!(run.written.is_empty());
    assert!(run.report_path.is_none());
    assert!(run.report.output_files.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

// ============================================================================
// Analysis Results
// ============================================================================

#[test]
fn test_sample_cleaning_summary() {
    let dir = tempfile::tempdir().unwrap();
    let run = pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap();

    let summary = &run.output.cleaning;
    assert_eq!(summary.rows_in, 9);
    assert_eq!(summary.salary_unparsed, 1);
    assert_eq!(summary.location_status_collisions, 1);
    assert_eq!(summary.company_size_currency, 1);
}

#[test]
fn test_sample_outlier_filtered_per_country() {
    let dir = tempfile::tempdir().unwrap();
    let output = pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap()
        .output;

    // the 140,000 posting sits outside the German fences
    let filtered = f64_column(&output.normalized_filtered, columns::SALARY_AVG);
    assert_eq!(filtered.len(), 8);
    assert!(!filtered.contains(&Some(140000.0)));

    let de = output
        .groups
        .iter()
        .find(|g| g.country_code.as_deref() == Some("DE"))
        .unwrap();
    assert_eq!(de.rows, 5);

    // groups below the minimum size keep every row, including missing salaries
    let countries = string_column(&output.normalized_filtered, columns::COUNTRY_CODE);
    assert!(countries.contains(&None));
    assert!(countries.contains(&Some("FR".to_string())));
}

#[test]
fn test_sample_normalization_inverts() {
    let dir = tempfile::tempdir().unwrap();
    let output = pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap()
        .output;

    let df = &output.normalized_unfiltered;
    let countries = string_column(df, columns::COUNTRY_CODE);
    let salaries = f64_column(df, columns::SALARY_AVG);
    let z = f64_column(df, columns::SALARY_AVG_NORMALIZED);

    let de: Vec<(f64, f64)> = countries
        .iter()
        .zip(salaries.iter().zip(z.iter()))
        .filter(|(c, _)| c.as_deref() == Some("DE"))
        .map(|(_, (s, z))| (s.unwrap(), z.unwrap()))
        .collect();
    assert_eq!(de.len(), 5);

    let n = de.len() as f64;
    let mean = de.iter().map(|(s, _)| s).sum::<f64>() / n;
    let std = (de.iter().map(|(s, _)| (s - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
    for (salary, score) in de {
        assert!((score * std + mean - salary).abs() < 1e-6);
    }

    // the single-row French group has no spread
    let fr = countries
        .iter()
        .position(|c| c.as_deref() == Some("FR"))
        .unwrap();
    assert_eq!(z[fr], Some(0.0));
}

#[test]
fn test_sample_skill_tables() {
    let dir = tempfile::tempdir().unwrap();
    let output = pipeline_writing_to(dir.path())
        .run_file(sample_input())
        .unwrap()
        .output;

    let python = output.raw_skills.get("python").unwrap();
    assert_eq!(python.count, 6);
    assert!((python.mean - 117500.0).abs() < 1e-6);
    assert_eq!(python.max, 170000.0);

    let excel = output.raw_skills.get("excel").unwrap();
    assert_eq!(excel.count, 1);
    assert_eq!(output.raw_skills.rows_malformed, 1);
    assert_eq!(output.raw_skills.rows_without_measure, 1);

    assert_eq!(output.normalized_skills.get("python").unwrap().count, 6);
    // the unknown-country posting has no salary spread, so it scores 0
    assert_eq!(output.normalized_skills.get("excel").unwrap().count, 2);
    assert_eq!(output.normalized_skills.rows_without_measure, 0);
    assert_eq!(output.filtered_skills.get("python").unwrap().count, 5);
    assert!(output.filtered_skills.get("leadership").is_none());
}

#[test]
fn test_in_memory_outlier_group() {
    let raw = df![
        "salary" => ["40,000", "42,000", "41,000", "100,000", "43,000", "55000 - 65000"],
        "revenue" => ["1.0B", "2.5M", "N/A", "3.0T", "", "7.5M"],
        "company_size" => ["10", "20", "€30", "40", "50", "60"],
        "location" => ["berlin", "munich", "hamburg, germany", "köln", "frankfurt", "paris"],
        "status" => ["onsite", "onsite", "hybrid", "onsite", "remote", "onsite"],
        "post_date" => ["0", "-1", "-2", "-3", "-4", "-5"],
        "skills" => ["['python']", "['python', 'sql']", "['sql']", "['python']", "['rust']", "['excel']"],
    ]
    .unwrap();

    let output = Pipeline::builder().build().unwrap().process(raw).unwrap();

    assert_eq!(output.cleaned.height(), 6);
    assert_eq!(output.normalized_unfiltered.height(), 6);
    assert_eq!(output.normalized_filtered.height(), 5);

    let de = output
        .groups
        .iter()
        .find(|g| g.country_code.as_deref() == Some("DE"))
        .unwrap();
    assert_eq!(de.q1, Some(41000.0));
    assert_eq!(de.q3, Some(43000.0));
    assert_eq!(de.lower_fence, Some(38000.0));
    assert_eq!(de.upper_fence, Some(46000.0));

    let countries = string_column(&output.normalized_filtered, columns::COUNTRY_CODE);
    let z: Vec<f64> = f64_column(&output.normalized_filtered, columns::SALARY_AVG_NORMALIZED)
        .into_iter()
        .zip(countries)
        .filter(|(_, c)| c.as_deref() == Some("DE"))
        .map(|(z, _)| z.unwrap())
        .collect();
    assert_eq!(z.len(), 4);

    let mean = z.iter().sum::<f64>() / 4.0;
    let std = (z.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0).sqrt();
    assert!(mean.abs() < 1e-9);
    assert!((std - 1.0).abs() < 1e-9);
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_invalid_post_date_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad_dates.csv");
    fs::write(
        &input,
        "salary,revenue,company_size,location,post_date,status,skills\n\
         50000,1.0B,100,berlin,-1,onsite,['python']\n\
         60000,2.0B,200,munich,yesterday,onsite,['sql']\n",
    )
    .unwrap();

    let out = dir.path().join("out");
    let err = pipeline_writing_to(&out).run_file(&input).unwrap_err();

    match err {
        PipelineError::InvalidPostDate { row, value } => {
            assert_eq!(row, 1);
            assert_eq!(value, "yesterday");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(!out.exists(), "nothing should be written on failure");
}

#[test]
fn test_missing_column_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("no_skills.csv");
    fs::write(
        &input,
        "salary,revenue,company_size,location,post_date,status\n\
         50000,1.0B,100,berlin,-1,onsite\n",
    )
    .unwrap();

    let failures = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&failures);

    let err = Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .output_dir(dir.path().join("out"))
                .build()
                .unwrap(),
        )
        .on_progress(move |update| {
            if update.stage == PipelineStage::Failed {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build()
        .unwrap()
        .run_file(&input)
        .unwrap_err();

    assert!(matches!(err, PipelineError::ColumnNotFound(ref c) if c.contains("skills")));
    assert!(err.is_data_error());
    assert_eq!(failures.load(Ordering::SeqCst), 1);
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = pipeline_writing_to(dir.path())
        .run_file(dir.path().join("absent.csv"))
        .unwrap_err();

    assert!(matches!(err, PipelineError::InputNotFound(_)));
    assert_eq!(err.error_code(), "INPUT_NOT_FOUND");
}
