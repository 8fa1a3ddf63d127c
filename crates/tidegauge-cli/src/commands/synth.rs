//! Synth command - print the synthetic estimate.

use colored::Colorize;
use tidegauge::series::demo_series;
use tidegauge::{LoaderConfig, NoiseDecorator, synthesize_with};

use super::output::print_table;
use crate::cli::{OutputFormat, SynthArgs};

pub fn run(
    config: LoaderConfig,
    args: SynthArgs,
    noise: Option<f64>,
    seed: u64,
    demo: bool,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if demo {
        if let OutputFormat::Table = format {
            println!("{} seed={}", "Demo series".cyan().bold(), seed);
            println!();
        }
        return print_table(&demo_series(seed)?, &format);
    }

    let params = args.apply(config.synthesis);
    let mut table = synthesize_with(&params)?;

    if let Some(sigma) = noise {
        table = NoiseDecorator::new(sigma, seed).apply(&table)?;
    }

    if let OutputFormat::Table = format {
        println!(
            "{} {}..={} (breakpoint {}, {} then {} per year)",
            "Estimate".cyan().bold(),
            params.start_year,
            params.end_year,
            params.breakpoint_year,
            params.rate_before,
            params.rate_after
        );
        if let Some(sigma) = noise {
            println!("  {} sigma={} seed={}", "Noise:".yellow(), sigma, seed);
        }
        println!();
    }

    print_table(&table, &format)
}
