//! Summary command - descriptive statistics of a loaded series.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use tidegauge::series::NumericStatistics;
use tidegauge::{LoaderConfig, SeriesLoader, SeriesRequest};

use super::output::print_diagnostics;

pub fn run(
    config: LoaderConfig,
    file: PathBuf,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let bytes = fs::read(&file)?;
    let mut loader = SeriesLoader::with_config(config);
    let loaded = loader.load(SeriesRequest::Upload {
        bytes,
        name: file.display().to_string(),
    });
    let summary = loaded.table.summary();

    if json_output {
        let status = serde_json::json!({
            "file": file.display().to_string(),
            "origin": loaded.origin,
            "degraded": loaded.is_degraded(),
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Summary of".cyan().bold(),
        file.display().to_string().white()
    );
    if loaded.is_fallback() {
        print_diagnostics(&loaded.diagnostics);
    }
    println!();
    println!("  {:8} {:>12} {:>12}", "", "year", "value");
    let rows: [(&str, fn(&NumericStatistics) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q1),
        ("50%", |s| s.median),
        ("75%", |s| s.q3),
        ("max", |s| s.max),
    ];
    for (label, stat) in rows {
        println!(
            "  {:8} {:>12.3} {:>12.3}",
            label,
            stat(&summary.year),
            stat(&summary.value)
        );
    }

    Ok(())
}
