//! Check one spreadsheet from the command line
//!
//! Prints the previews and the shipments whose dropoff lies farther than the
//! minimum distance from the planned delivery point, then writes them as CSV.
//!
//! Usage:
//!   cargo run --bin validate_dropoffs -- shipments.xlsx --min-km 1.5

use anyhow::Result;
use clap::Parser;
use dropoff_validator::{
    validate_threshold, AliasTable, DropoffValidator, TablePreview, ValidationError,
    ValidatorConfig, DEFAULT_MIN_DISTANCE_KM, RESULT_FILE_NAME,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "validate_dropoffs", about = "Find shipments dropped off far from the delivery point")]
struct Args {
    /// Spreadsheet to check (.xlsx, .xls, .xlsm, .xlsb or .csv)
    input: PathBuf,

    /// Minimum distance (km) for a shipment to be reported, 0.1 to 100
    #[arg(long, default_value_t = DEFAULT_MIN_DISTANCE_KM, value_parser = parse_threshold)]
    min_km: f64,

    /// JSON file with extra header aliases per canonical column
    #[arg(long)]
    aliases: Option<PathBuf>,

    /// Use only the aliases from --aliases, not the built-in ones
    #[arg(long, requires = "aliases")]
    replace_default_aliases: bool,

    /// Where to write the result CSV
    #[arg(long, short, default_value = RESULT_FILE_NAME)]
    output: PathBuf,
}

fn parse_threshold(value: &str) -> Result<f64, String> {
    let km: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    validate_threshold(km).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dropoff_validator=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = ValidatorConfig::with_alias_file(args.aliases.as_deref(), args.replace_default_aliases)?;
    let validator = DropoffValidator::new(config);

    println!("\n{}", "=".repeat(70));
    println!("Delivery vs Actual Dropoff Check");
    println!("{}", "=".repeat(70));
    println!("Input:     {}", args.input.display());
    println!("Threshold: > {:.2} km\n", args.min_km);

    let report = match validator.validate_path(&args.input, args.min_km) {
        Ok(report) => report,
        Err(e @ ValidationError::MissingColumns { .. }) => {
            println!("Accepted headers (case-insensitive):");
            for line in alias_help_lines(&validator.config().aliases) {
                println!("{}", line);
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Uploaded data ({} rows):", report.raw_preview.total_rows);
    print_table(&report.raw_preview);

    println!("\nAfter column normalization:");
    print_table(&report.normalized_preview);

    if !report.excluded.is_empty() {
        println!(
            "\nSkipped {} rows with a missing or non-numeric coordinate:",
            report.excluded.len()
        );
        for row in &report.excluded {
            println!("  {}", row.label());
        }
    }

    println!("\nResult: shipments with distance > {:.2} km", report.threshold_km);
    println!("Total rows: {}", report.result_count());

    if report.has_results() {
        print_table(&report.result_preview()?);
        dropoff_validator::export::write_result_csv_to_path(&report.result, &args.output)?;
        println!("\nWritten: {}", args.output.display());
    } else {
        println!("No shipment exceeds the selected distance threshold.");
    }

    Ok(())
}

/// One line per canonical column listing the headers that map onto it
fn alias_help_lines(aliases: &AliasTable) -> Vec<String> {
    aliases
        .grouped()
        .into_iter()
        .map(|(canonical, names)| format!("  {:<20} {}", canonical.as_str(), names.join(", ")))
        .collect()
}

/// Fixed-width text table
fn print_table(preview: &TablePreview) {
    let mut widths: Vec<usize> = preview.headers.iter().map(|h| h.chars().count()).collect();
    for row in &preview.rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("  {}", line(preview.headers.as_slice()));
    println!(
        "  {}",
        widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("-+-")
    );
    for row in &preview.rows {
        println!("  {}", line(row.as_slice()));
    }
}
