//! CLI entry point for the salary processing pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use salary_processing::types::columns;
use salary_processing::{
    FileRun, JobPostingCleaner, Pipeline, PipelineConfig, RunReport, SkillTableSummary,
    load_job_postings,
};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Job-posting salary cleaning and skill price analysis",
    long_about = "Cleans a scraped job-posting table, normalizes salaries per country and \
                  prices skills.\n\n\
                  EXAMPLES:\n  \
                  # Clean and analyze with defaults\n  \
                  salary-processing -i job_posts.csv\n\n  \
                  # Custom output directory and reference date\n  \
                  salary-processing -i job_posts.csv -o results/ --reference-date 2025-06-01\n\n  \
                  # Preview cleaning without writing anything\n  \
                  salary-processing -i job_posts.csv --dry-run"
)]
struct Args {
    /// Path to the raw job-posting CSV file
    #[arg(short, long)]
    input: String,

    /// Output directory for cleaned data and skill tables
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// File name (without extension) of the cleaned table
    #[arg(long, default_value = salary_processing::config::DEFAULT_CLEANED_NAME)]
    output_name: String,

    /// Reference date that relative post dates count from (YYYY-MM-DD)
    #[arg(long, default_value = "2025-06-01")]
    reference_date: String,

    /// Width of the outlier fences in interquartile ranges
    #[arg(long, default_value = "1.5")]
    iqr_multiplier: f64,

    /// Countries with fewer postings than this are not outlier-filtered
    #[arg(long, default_value = "4")]
    min_group_size: usize,

    /// Preview cleaning results without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the JSON run report to stdout instead of a human-readable summary
    ///
    /// Disables all logs so stdout can be piped: `... --json | jq .skill_tables`
    #[arg(long)]
    json: bool,

    /// Write the JSON run report to the output directory as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber.
///
/// Nothing is initialized under `--json` so stdout carries only the report.
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

    init_logging(&args.log_level, args.quiet, args.json);

    let config = PipelineConfig::builder()
        .reference_date_str(&args.reference_date)
        .iqr_multiplier(args.iqr_multiplier)
        .min_group_size(args.min_group_size)
        .output_dir(&args.output)
        .cleaned_name(&args.output_name)
        .save_to_disk(!args.dry_run)
        .generate_report(args.emit_report && !args.dry_run)
        .build()?;

    if args.dry_run {
        return run_dry_run(&args, &config);
    }

    let pipeline = build_pipeline(&args, config)?;

    info!("{}", "=".repeat(80));
    info!("Starting salary pipeline...");
    info!("{}", "=".repeat(80));

    match pipeline.run_file(&args.input) {
        Ok(run) => handle_pipeline_output(&run, &args),
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
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

/// Preview the cleaning stage without writing any output.
///
/// Uses `println!` on purpose: the preview is the command's result, not a log.
fn run_dry_run(args: &Args, config: &PipelineConfig) -> Result<()> {
    let data = load_job_postings(&args.input)?;

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of cleaning results");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!("  Reference date: {}", config.reference_date);
    println!();

    println!("REQUIRED COLUMNS");
    println!("{}", "-".repeat(40));
    let present: Vec<String> = data
        .get_column_names()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let mut missing = Vec::new();
    for name in columns::REQUIRED_RAW {
        let found = present.iter().any(|c| c == name);
        println!("  {:<16} {}", name, if found { "ok" } else { "MISSING" });
        if !found {
            missing.push(name);
        }
    }
    println!();

    if !missing.is_empty() {
        return Err(anyhow!("Missing required columns: {}", missing.join(", ")));
    }

    let (cleaned, summary) = JobPostingCleaner::new(config.reference_date).clean(&data)?;

    println!("CLEANING PREVIEW");
    println!("{}", "-".repeat(40));
    println!("  Salaries unparsed:        {}", summary.salary_unparsed);
    println!("  Salaries missing:         {}", summary.salary_missing);
    println!("  Revenue categorized:      {}", summary.revenue_categorized);
    println!("  Company sizes with glyph: {}", summary.company_size_currency);
    println!("  Remote/location overlaps: {}", summary.location_status_collisions);
    println!("  Countries unresolved:     {}", summary.country_unresolved);
    println!();

    print_null_counts(
        cleaned
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), c.null_count())),
        cleaned.height(),
    );

    println!("{}", "=".repeat(80));
    println!("No files written. Run without --dry-run to process.");
    println!("{}", "=".repeat(80));

    Ok(())
}

/// Print the report as JSON or as a human-readable summary.
fn handle_pipeline_output(run: &FileRun, args: &Args) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.report)?);
        return Ok(());
    }

    if let Some(ref path) = run.report_path {
        info!("Report written to: {}", path.display());
    }

    print_human_readable_summary(&run.report);
    Ok(())
}

fn print_null_counts(counts: impl Iterator<Item = (String, usize)>, rows: usize) {
    println!("NULL VALUES PER FIELD");
    println!("{}", "-".repeat(40));
    for (name, nulls) in counts {
        let pct = if rows > 0 {
            nulls as f64 / rows as f64 * 100.0
        } else {
            0.0
        };
        println!("  {:<24} {:>8} ({:>5.1}%)", name, nulls, pct);
    }
    println!();
}

fn print_skill_extremes(table: &SkillTableSummary) {
    println!("{} ({} skills)", table.file_name, table.skills);
    if let Some(overall) = table.overall_average {
        println!("  Overall average: {:.2}", overall);
    }
    println!("  Highest paying:");
    for stat in table.highest.iter().take(5) {
        println!(
            "    {:<24} {:>12.2}  n={}",
            truncate_str(&stat.skill, 24),
            stat.mean,
            stat.count
        );
    }
    println!("  Lowest paying:");
    for stat in table.lowest.iter().rev().take(5) {
        println!(
            "    {:<24} {:>12.2}  n={}",
            truncate_str(&stat.skill, 24),
            stat.mean,
            stat.count
        );
    }
}

/// Print a human-readable summary of the run.
fn print_human_readable_summary(report: &RunReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("SALARY PIPELINE COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows)",
        report.input_file.as_deref().unwrap_or("-"),
        report.rows_in
    );
    for file in &report.output_files {
        println!("Output: {}", file);
    }
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", report.duration_ms);
    println!("  Rows cleaned: {}", report.rows_cleaned);
    println!(
        "  Rows after outlier filter: {} ({} removed)",
        report.rows_filtered,
        report.rows_cleaned.saturating_sub(report.rows_filtered)
    );
    println!("  Countries: {}", report.groups.len());
    println!();

    print_null_counts(
        report.null_counts.iter().map(|(k, v)| (k.clone(), *v)),
        report.rows_cleaned,
    );

    println!("SKILL PRICES");
    println!("{}", "-".repeat(40));
    for table in &report.skill_tables {
        print_skill_extremes(table);
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("Use --emit-report to save the detailed JSON report");
    println!("{}", "=".repeat(80));
}

fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}
