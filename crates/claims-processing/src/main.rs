//! CLI entry point for the claims processing pipeline.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use claims_processing::{
    ClaimsConfig, ClaimsPipeline, IndexedFrame, PipelineResult, ProcessingSummary,
    cleaner::parse_datetime, create_preprocessing_pipeline,
};
use clap::Parser;
use dotenv::dotenv;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Third-party claims cleaning and feature engineering",
    long_about = "Cleans a raw third-party motor claims extract and derives model features.\n\n\
                  EXAMPLES:\n  \
                  # Clean and engineer features\n  \
                  claims-processing -i claims.csv\n\n  \
                  # Fixed reference date for reproducible days_since_loss\n  \
                  claims-processing -i claims.csv --reference-date 2024-01-31\n\n  \
                  # Also fit and apply the model preprocessing transform\n  \
                  claims-processing -i claims.csv --num-cols Incurred,days_since_loss \\\n    \
                  --ohe-cols Weather_conditions,Location_of_incident\n\n  \
                  # JSON summary for scripting\n  \
                  claims-processing -i claims.csv --json | jq .summary.rows_after"
)]
struct Args {
    /// Path to the raw claims CSV file
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// JSON file with a claims configuration
    ///
    /// Fields left out keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Date days_since_loss is measured from (defaults to now)
    #[arg(long)]
    reference_date: Option<String>,

    /// Numeric columns for the model preprocessing transform
    #[arg(long, value_delimiter = ',')]
    num_cols: Vec<String>,

    /// Categorical columns to one-hot encode in the model preprocessing transform
    #[arg(long, value_delimiter = ',')]
    ohe_cols: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output the run summary as JSON on stdout
    ///
    /// Disables all logs so stdout only carries the JSON document.
    #[arg(long)]
    json: bool,
}

/// What the CLI reports after a run.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    input: &'a str,
    features_path: String,
    transformed_path: Option<String>,
    feature_columns: Vec<String>,
    summary: &'a ProcessingSummary,
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

    dotenv().ok();
    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    if !Path::new(&args.output).exists() {
        std::fs::create_dir_all(&args.output)?;
        info!("Created output directory: {}", args.output);
    }

    let config = match &args.config {
        Some(path) => ClaimsConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClaimsConfig::default(),
    };

    let mut builder = ClaimsPipeline::builder().config(config.clone());
    if let Some(ref raw) = args.reference_date {
        builder = builder.reference_time(parse_reference_date(raw, &config)?);
    }
    let pipeline = builder.build()?;

    info!("Loading dataset from: {}", args.input);
    let data = load_csv(&args.input)?;
    info!("Dataset loaded successfully: {:?}", data.shape());

    let result = pipeline.process(data)?;
    handle_pipeline_output(&result, &args)
}

fn parse_reference_date(raw: &str, config: &ClaimsConfig) -> Result<NaiveDateTime> {
    parse_datetime(raw, &config.date_formats)
        .ok_or_else(|| anyhow!("Could not parse reference date '{}'", raw))
}

/// Write the feature table (and the transformed table if requested), then report.
fn handle_pipeline_output(result: &PipelineResult, args: &Args) -> Result<()> {
    let stem = extract_file_stem(&args.input);
    let output_dir = Path::new(&args.output);

    let features_path = output_dir.join(format!("{}_features.csv", stem));
    write_csv(&result.features, &features_path)?;
    info!("Features written to: {}", features_path.display());

    let transformed_path = if args.num_cols.is_empty() && args.ohe_cols.is_empty() {
        None
    } else {
        let mut transform = create_preprocessing_pipeline(&args.num_cols, &args.ohe_cols)?;
        let transformed = transform.fit_transform(&result.features)?;
        let path = output_dir.join(format!("{}_transformed.csv", stem));
        write_csv(&transformed, &path)?;
        info!(
            "Transformed features ({} columns) written to: {}",
            transformed.width(),
            path.display()
        );
        Some(path)
    };

    let report = RunReport {
        input: &args.input,
        features_path: features_path.display().to_string(),
        transformed_path: transformed_path.map(|p| p.display().to_string()),
        feature_columns: result.features.feature_names(),
        summary: &result.summary,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report);
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

fn write_csv(data: &IndexedFrame, path: &Path) -> Result<()> {
    let mut df = data.frame().clone();
    let mut file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)?;
    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

fn load_csv(path: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
        .with_context(|| format!("Failed to read CSV from {}", path))
}

/// Print a human-readable summary of the run.
fn print_human_readable_summary(report: &RunReport<'_>) {
    let summary = report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLAIMS PROCESSING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Rows:      {} -> {} ({:.1}% removed)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed_percentage()
    );
    println!(
        "Columns:   {} -> {}",
        summary.columns_before, summary.columns_after
    );
    println!("Duration:  {}ms", summary.duration_ms);
    println!();

    println!("ACTIONS ({})", summary.actions.len());
    println!("{}", "-".repeat(80));
    for action in &summary.actions {
        println!(
            "  [{:<18}] {:<30} {}",
            action.action_type.display_name(),
            action.target,
            action.description
        );
    }

    if !summary.warnings.is_empty() {
        println!();
        println!("WARNINGS ({})", summary.warnings.len());
        println!("{}", "-".repeat(80));
        for warning in &summary.warnings {
            println!("  ! {}", warning);
        }
    }

    println!();
    println!("Features:    {}", report.features_path);
    if let Some(ref path) = report.transformed_path {
        println!("Transformed: {}", path);
    }
    println!("{}", "=".repeat(80));
}
