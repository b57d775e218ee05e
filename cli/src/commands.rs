//! Subcommand implementations.
//!
//! Pipeline failures are logged and swallowed here: each command is a single
//! batch step, so a failed step ends the command without failing the process.

use std::path::Path;

use skirmish_core::analysis::{AnalysisOptions, analyze_with_names};
use skirmish_core::catalog::load_catalog;
use skirmish_core::convert::{ConversionReport, convert_csv_to_parquet, parquet_path_for};
use skirmish_core::report::Report;
use skirmish_types::formatting::{
    fit_width, format_bytes, format_elapsed, format_ratio_pct, format_thousands,
};
use skirmish_types::{AggregateRow, ReportRow};

const RULE_WIDTH: usize = 100;
const NAME_WIDTH: usize = 25;

pub async fn convert(csv_path: &Path) {
    println!("CSV -> Parquet");
    println!("{}", "=".repeat(50));
    println!("Input:  {}", csv_path.display());
    println!("Output: {}", parquet_path_for(csv_path).display());

    match convert_csv_to_parquet(csv_path).await {
        Ok(report) => print_conversion(&report),
        Err(e) => tracing::error!(error = %e, "Conversion failed"),
    }
}

fn print_conversion(report: &ConversionReport) {
    println!("{}", "=".repeat(50));
    println!("Time:     {}", format_elapsed(report.elapsed.as_secs_f64()));
    println!("Rows:     {}", format_thousands(report.rows as i64));
    println!("CSV:      {}", format_bytes(report.input_bytes));
    println!("Parquet:  {}", format_bytes(report.output_bytes));
    println!("Saved:    {}", format_ratio_pct(report.compression_ratio()));
}

pub async fn analyze(parquet_path: &Path, catalog_path: &Path, options: &AnalysisOptions) {
    let outcome = match analyze_with_names(parquet_path, catalog_path, options).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Analysis failed");
            return;
        }
    };

    println!("Analysis finished: {} units", outcome.report.len());
    print_summary(&outcome.report.top(options.top_n));

    if let Some(path) = outcome.written_to {
        println!();
        println!("Full results saved: {}", path.display());
    }
}

/// Convert then analyze the resulting Parquet file.
pub async fn run(csv_path: &Path, catalog_path: &Path, options: &AnalysisOptions) {
    let parquet_path = match convert_csv_to_parquet(csv_path).await {
        Ok(report) => {
            print_conversion(&report);
            report.output_path
        }
        Err(e) => {
            tracing::error!(error = %e, "Conversion failed, skipping analysis");
            return;
        }
    };
    println!();
    analyze(&parquet_path, catalog_path, options).await;
}

pub fn catalog(catalog_path: &Path, preview: usize) {
    match load_catalog(catalog_path) {
        Ok(load) => {
            println!("{} units loaded", load.catalog.len());
            if !load.skipped.is_empty() {
                println!("{} entries skipped", load.skipped.len());
            }
            for (id, name) in load.catalog.preview(preview) {
                println!("   ID {id:>3} -> {name}");
            }
        }
        Err(e) => tracing::error!(error = %e, "Failed to load catalog"),
    }
}

/// Heading for the summary; counts the rows actually shown.
fn summary_heading(report: &Report) -> String {
    let shown = report.len();
    if report.has_names() {
        format!("TOP {shown} UNITS")
    } else {
        format!("TOP {shown} UNITS (ids only)")
    }
}

fn print_summary(report: &Report) {
    println!();
    println!("{}", summary_heading(report));
    match report {
        Report::Named(rows) => {
            println!("{}", "=".repeat(RULE_WIDTH));
            for (i, row) in rows.iter().enumerate() {
                println!("{}", named_line(i + 1, row));
            }
        }
        Report::IdOnly(rows) => {
            println!(
                "{:>8} {:>8} {:>10} {:>14} {:>13} {:>11}",
                "unit_id", "count", "efficiency", "average_rating", "median_rating", "total_kills"
            );
            for row in rows {
                println!("{}", id_line(row));
            }
        }
    }
}

fn named_line(rank: usize, row: &ReportRow) -> String {
    format!(
        "{rank:2}. {} (ID:{:>3}) | {:4} uses | {:.3} eff | {:4.0} avg rating | {:4} kills",
        fit_width(&row.unit_name, NAME_WIDTH),
        id_cell(row.unit_id),
        row.count,
        row.efficiency,
        row.average_rating,
        row.total_kills,
    )
}

fn id_line(row: &AggregateRow) -> String {
    format!(
        "{:>8} {:>8} {:>10.4} {:>14.2} {:>13.2} {:>11}",
        id_cell(row.unit_id),
        row.count,
        row.efficiency,
        row.average_rating,
        row.median_rating,
        row.total_kills,
    )
}

/// Id column text; `-` for records that carried no id.
fn id_cell(unit_id: Option<i64>) -> String {
    unit_id.map_or_else(|| "-".to_string(), |id| id.to_string())
}
