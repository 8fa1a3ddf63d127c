//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use tidegauge::SynthesisParams;

/// Tidegauge: sea-level series from uploads, remote data, or a synthetic estimate
#[derive(Parser)]
#[command(name = "tidegauge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Loader configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the synthetic two-regime estimate
    Synth {
        #[command(flatten)]
        params: SynthArgs,

        /// Add Gaussian noise with this standard deviation
        #[arg(long, value_name = "SIGMA")]
        noise: Option<f64>,

        /// Seed for the noise generator
        #[arg(long, default_value_t = tidegauge::series::DEFAULT_SEED)]
        seed: u64,

        /// Print the noisy 1993-2050 demo series instead
        #[arg(long, conflicts_with = "noise")]
        demo: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Infer the year and measurement columns of a delimited file
    Infer {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Keep only years in START:END (inclusive)
        #[arg(long, value_name = "START:END")]
        clip: Option<YearRange>,

        /// Shift values so the first row reads zero
        #[arg(long, conflicts_with = "anchor")]
        rebase: bool,

        /// Shift values so this year reads zero
        #[arg(long, value_name = "YEAR")]
        anchor: Option<i32>,

        /// Fail instead of falling back to the estimate
        #[arg(long)]
        strict: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Load the remote dataset, falling back to the estimate
    Fetch {
        /// Candidate URL, tried in order (repeatable; overrides the config)
        #[arg(long = "url", value_name = "URL")]
        urls: Vec<String>,

        /// Splice the remote series onto the synthetic baseline
        #[arg(long)]
        splice: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show which sample coastal sites fall below a sea-level rise
    Exposure {
        /// Sea-level rise in metres (clamped to 0-5)
        #[arg(long, default_value = "1.0")]
        rise: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summary statistics of the series loaded from a file
    Summary {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the JSON API for a dashboard front end
    Serve {
        /// Port for web server
        #[arg(short, long, default_value = "3141")]
        port: u16,
    },
}

/// Overrides for the synthesis parameters.
#[derive(Args, Clone, Debug, Default)]
pub struct SynthArgs {
    /// First year of the series
    #[arg(long)]
    pub start: Option<i32>,

    /// Last year of the series
    #[arg(long)]
    pub end: Option<i32>,

    /// Year the growth rate changes
    #[arg(long)]
    pub breakpoint: Option<i32>,

    /// Rise per year up to the breakpoint
    #[arg(long)]
    pub rate_before: Option<f64>,

    /// Rise per year after the breakpoint
    #[arg(long)]
    pub rate_after: Option<f64>,
}

impl SynthArgs {
    /// Apply the given overrides on top of `params`.
    pub fn apply(&self, mut params: SynthesisParams) -> SynthesisParams {
        if let Some(v) = self.start {
            params.start_year = v;
        }
        if let Some(v) = self.end {
            params.end_year = v;
        }
        if let Some(v) = self.breakpoint {
            params.breakpoint_year = v;
        }
        if let Some(v) = self.rate_before {
            params.rate_before = v;
        }
        if let Some(v) = self.rate_after {
            params.rate_after = v;
        }
        params
    }
}

/// Inclusive year range written as `START:END`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl std::str::FromStr for YearRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once(':')
            .ok_or_else(|| format!("Invalid range: {}. Use START:END, e.g. 1900:2025.", s))?;
        let start: i32 = start
            .trim()
            .parse()
            .map_err(|_| format!("Invalid start year: {}", start))?;
        let end: i32 = end
            .trim()
            .parse()
            .map_err(|_| format!("Invalid end year: {}", end))?;
        if start > end {
            return Err(format!("Start year {} is after end year {}", start, end));
        }
        Ok(YearRange { start, end })
    }
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table, csv, or json.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
