//! Canonical year/value series: synthesis, operations, and statistics.

mod noise;
mod stats;
mod synth;
mod table;

pub use noise::{DEFAULT_SEED, NoiseDecorator, demo_series};
pub use stats::{NumericStatistics, SeriesSummary};
pub use synth::{
    DEFAULT_BREAKPOINT_YEAR, DEFAULT_END_YEAR, DEFAULT_RATE_AFTER, DEFAULT_RATE_BEFORE,
    DEFAULT_START_YEAR, SynthesisParams, default_series, synthesize, synthesize_with,
};
pub use table::{Rebase, SeriesRow, SpliceReport, TimeSeriesTable};
