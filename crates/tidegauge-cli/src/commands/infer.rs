//! Infer command - map a delimited file onto a year/value series.

use std::fs;
use std::path::PathBuf;

use tidegauge::{LoaderConfig, Parser, Rebase, SchemaInferrer, SeriesLoader, SeriesRequest};

use super::output::{print_diagnostics, print_loaded, print_table};
use crate::cli::{OutputFormat, YearRange};

pub fn run(
    mut config: LoaderConfig,
    file: PathBuf,
    clip: Option<YearRange>,
    rebase: bool,
    anchor: Option<i32>,
    strict: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    if let Some(range) = clip {
        config.inference.year_range = Some((range.start, range.end));
    }
    if let Some(year) = anchor {
        config.inference.rebase = Some(Rebase::Anchor(year));
    } else if rebase {
        config.inference.rebase = Some(Rebase::FirstRow);
    }

    if strict {
        let parsed = Parser::with_config(config.parser.clone()).parse_file(&file)?;
        let inference = SchemaInferrer::with_config(config.inference.clone()).infer(&parsed.table)?;
        if let OutputFormat::Table = format {
            print_diagnostics(&inference.diagnostics);
            println!();
        }
        return print_table(&inference.table, &format);
    }

    let bytes = fs::read(&file)?;
    let name = file.display().to_string();
    let mut loader = SeriesLoader::with_config(config);
    let loaded = loader.load(SeriesRequest::Upload { bytes, name });
    print_loaded(&loaded, &format)
}
