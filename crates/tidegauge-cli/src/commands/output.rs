//! Shared terminal rendering for series and diagnostics.

use std::io;

use colored::Colorize;
use tidegauge::{Diagnostics, LoadedSeries, SeriesOrigin, Severity, TimeSeriesTable, YearSource};

use crate::cli::OutputFormat;

/// Column names used when writing a series out.
pub const YEAR_COLUMN: &str = "year";
pub const VALUE_COLUMN: &str = "value";

/// Print a loaded series in the requested format.
pub fn print_loaded(
    loaded: &LoadedSeries,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(loaded)?);
        }
        OutputFormat::Csv => {
            loaded.table.write_csv(io::stdout().lock(), YEAR_COLUMN, VALUE_COLUMN)?;
        }
        OutputFormat::Table => {
            print_origin(loaded);
            print_diagnostics(&loaded.diagnostics);
            println!();
            print_series(&loaded.table);
        }
    }
    Ok(())
}

/// Print a bare series in the requested format.
pub fn print_table(
    table: &TimeSeriesTable,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(table)?),
        OutputFormat::Csv => table.write_csv(io::stdout().lock(), YEAR_COLUMN, VALUE_COLUMN)?,
        OutputFormat::Table => print_series(table),
    }
    Ok(())
}

fn print_origin(loaded: &LoadedSeries) {
    let origin = match loaded.origin {
        SeriesOrigin::Uploaded => "uploaded file".green(),
        SeriesOrigin::Remote => "remote dataset".green(),
        SeriesOrigin::Spliced => "remote dataset spliced onto estimate".green(),
        SeriesOrigin::Synthetic if loaded.is_fallback() => "synthetic estimate (fallback)".yellow(),
        SeriesOrigin::Synthetic => "synthetic estimate".cyan(),
    };
    println!("{} {}", "Source:".bold(), origin);

    if let Some(ref source) = loaded.source {
        println!(
            "  {} ({}, {}, {} rows)",
            source.origin.white(),
            source.format,
            source.encoding,
            source.row_count
        );
    }

    if let Some(ref mapping) = loaded.mapping {
        let year = match &mapping.year {
            YearSource::Named(name) => format!("'{}' (by name)", name),
            YearSource::Range(name) => format!("'{}' (by value range)", name),
            YearSource::RowIndex => "row index (no calendar years)".to_string(),
        };
        println!("  {} {}", "Year:".yellow(), year);
        println!(
            "  {} '{}' (x{})",
            "Measurement:".yellow(),
            mapping.measurement,
            mapping.scale
        );
    }
}

/// Print each diagnostic on one line, colored by severity.
pub fn print_diagnostics(diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!();
    println!("{}", "Diagnostics:".yellow().bold());
    for d in diagnostics {
        let tag = match d.severity {
            Severity::Error => d.severity.label().red(),
            Severity::Warning => d.severity.label().yellow(),
            Severity::Info => d.severity.label().blue(),
        };
        println!("  [{}] {:28} {}", tag, d.kind.label(), d.message);
    }
}

fn print_series(table: &TimeSeriesTable) {
    println!("{:>6}  {:>12}", YEAR_COLUMN.bold(), VALUE_COLUMN.bold());
    for row in table.rows() {
        println!("{:>6}  {:>12.3}", row.year, row.value);
    }
    println!();
    println!("{} rows", table.len().to_string().white().bold());
}
