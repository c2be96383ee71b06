use crate::error::Result;
use crate::pipeline::io::write_csv;
use crate::skills::{SalaryMeasure, SkillPriceTable};
use crate::types::{CategoryBreakdown, CleaningSummary, GroupSummary, PipelineOutput, SkillStat};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Skill table over raw salaries.
pub const RAW_SKILLS_FILE: &str = "skill_price_analysis.csv";
/// Skill table over z-scores of all rows.
pub const NORMALIZED_SKILLS_FILE: &str = "skill_price_analysis_normalized_unfiltered.csv";
/// Skill table over z-scores after outlier filtering.
pub const FILTERED_SKILLS_FILE: &str = "skill_price_analysis_normalized_filtered.csv";

/// Number of skills listed at each end of a table in the run report.
pub const REPORT_EXTREMES: usize = 10;

// ============================================================================
// Run Report Types
// ============================================================================

/// JSON report of one pipeline run.
///
/// Used both for `--json` on stdout and for `--emit-report` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: String,
    pub input_file: Option<String>,
    pub reference_date: NaiveDate,
    pub duration_ms: u64,

    pub rows_in: usize,
    pub rows_cleaned: usize,
    /// Rows left after per-country outlier filtering.
    pub rows_filtered: usize,

    pub cleaning: CleaningSummary,
    /// Null count of every column in the cleaned table.
    pub null_counts: BTreeMap<String, usize>,

    pub groups: Vec<GroupSummary>,
    pub skill_tables: Vec<SkillTableSummary>,
    pub breakdowns: BTreeMap<String, Vec<CategoryBreakdown>>,

    /// Files written by the run, empty when nothing was saved.
    pub output_files: Vec<String>,
}

/// Size and extremes of one skill table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillTableSummary {
    pub file_name: String,
    pub measure: SalaryMeasure,
    pub skills: usize,
    pub rows_malformed: usize,
    pub rows_without_measure: usize,
    /// Mean of the per-skill averages.
    pub overall_average: Option<f64>,
    pub highest: Vec<SkillStat>,
    pub lowest: Vec<SkillStat>,
}

impl SkillTableSummary {
    fn new(file_name: &str, table: &SkillPriceTable) -> Self {
        Self {
            file_name: file_name.to_string(),
            measure: table.measure,
            skills: table.len(),
            rows_malformed: table.rows_malformed,
            rows_without_measure: table.rows_without_measure,
            overall_average: table.overall_average(),
            highest: table.top(REPORT_EXTREMES).to_vec(),
            lowest: table.bottom(REPORT_EXTREMES).to_vec(),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Writes output tables and run reports into one directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    cleaned_name: String,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, cleaned_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            cleaned_name: cleaned_name.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn cleaned_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.cleaned_name))
    }

    /// Write the cleaned table and the three skill tables.
    ///
    /// Returns the written paths in that order.
    pub fn write_outputs(&self, output: &PipelineOutput) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.output_dir)?;

        let mut written = Vec::with_capacity(4);

        let cleaned_path = self.cleaned_path();
        write_csv(&mut output.cleaned.clone(), &cleaned_path)?;
        info!("Cleaned dataset saved: {}", cleaned_path.display());
        written.push(cleaned_path);

        for (file_name, table) in skill_tables(output) {
            let path = self.output_dir.join(file_name);
            write_csv(&mut table.to_dataframe()?, &path)?;
            info!("Skill table saved: {}", path.display());
            written.push(path);
        }

        Ok(written)
    }

    /// Assemble the run report.
    pub fn build_report(
        input_file: Option<&str>,
        reference_date: NaiveDate,
        output: &PipelineOutput,
        written: &[PathBuf],
    ) -> RunReport {
        let null_counts = output
            .cleaned
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count()))
            .collect();

        RunReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.map(String::from),
            reference_date,
            duration_ms: output.duration_ms,
            rows_in: output.cleaning.rows_in,
            rows_cleaned: output.cleaned.height(),
            rows_filtered: output.normalized_filtered.height(),
            cleaning: output.cleaning.clone(),
            null_counts,
            groups: output.groups.clone(),
            skill_tables: skill_tables(output)
                .into_iter()
                .map(|(name, table)| SkillTableSummary::new(name, table))
                .collect(),
            breakdowns: output.breakdowns.clone(),
            output_files: written.iter().map(|p| p.display().to_string()).collect(),
        }
    }

    /// Write a report as `<base_name>_report.json` in the output directory.
    pub fn write_report(&self, report: &RunReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}

fn skill_tables(output: &PipelineOutput) -> [(&'static str, &SkillPriceTable); 3] {
    [
        (RAW_SKILLS_FILE, &output.raw_skills),
        (NORMALIZED_SKILLS_FILE, &output.normalized_skills),
        (FILTERED_SKILLS_FILE, &output.filtered_skills),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pipeline;
    use polars::prelude::*;

    fn sample_output() -> PipelineOutput {
        let raw = df![
            "salary" => ["50000", "60000 - 70000", "55000"],
            "revenue" => ["1.0B", "N/A", "3.5M"],
            "company_size" => ["100", "€5", "20"],
            "location" => ["paris, france", "paris", "remote"],
            "status" => ["onsite", "hybrid", "remote"],
            "post_date" => ["-1", "-2", "-3"],
            "skills" => ["['python']", "['python', 'sql']", "['excel']"],
        ]
        .unwrap();
        Pipeline::builder().build().unwrap().process(raw).unwrap()
    }

    #[test]
    fn test_build_report() {
        let output = sample_output();
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let report = ReportGenerator::build_report(Some("posts.csv"), date, &output, &[]);

        assert_eq!(report.rows_in, 3);
        assert_eq!(report.rows_cleaned, 3);
        assert_eq!(report.null_counts.get("country_code"), Some(&1));
        assert_eq!(report.null_counts.get("company_size"), Some(&1));
        assert_eq!(report.skill_tables.len(), 3);
        assert_eq!(report.skill_tables[0].file_name, RAW_SKILLS_FILE);
        assert_eq!(report.skill_tables[0].skills, 3);
        // python 57500, excel 55000, sql 65000
        let overall = report.skill_tables[0].overall_average.unwrap();
        assert!((overall - 59166.666_666_666_7).abs() < 1e-6);
        assert!(report.output_files.is_empty());
    }

    #[test]
    fn test_write_outputs_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let generator = ReportGenerator::new(dir.path(), "cleaned");
        let output = sample_output();

        let written = generator.write_outputs(&output).unwrap();
        assert_eq!(written.len(), 4);
        assert!(dir.path().join("cleaned.csv").is_file());
        assert!(dir.path().join(RAW_SKILLS_FILE).is_file());
        assert!(dir.path().join(NORMALIZED_SKILLS_FILE).is_file());
        assert!(dir.path().join(FILTERED_SKILLS_FILE).is_file());

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let report = ReportGenerator::build_report(None, date, &output, &written);
        let path = generator.write_report(&report, "posts").unwrap();
        assert_eq!(path, dir.path().join("posts_report.json"));

        let text = fs::read_to_string(path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["rows_in"], 3);
        assert_eq!(parsed["output_files"].as_array().unwrap().len(), 4);
    }
}
