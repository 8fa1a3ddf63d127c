//! Seeded Gaussian noise for demo-flavoured series.
//!
//! Kept apart from the synthesizer so the deterministic baseline stays
//! reproducible; the same seed always yields the same perturbation.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::table::{SeriesRow, TimeSeriesTable};
use crate::error::{Result, TideError};

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Adds N(0, sigma²) noise to every value of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseDecorator {
    pub sigma: f64,
    pub seed: u64,
}

impl NoiseDecorator {
    pub fn new(sigma: f64, seed: u64) -> Self {
        Self { sigma, seed }
    }

    /// Return a perturbed copy of `table`.
    pub fn apply(&self, table: &TimeSeriesTable) -> Result<TimeSeriesTable> {
        let normal = Normal::new(0.0, self.sigma).map_err(|e| {
            TideError::InvalidParameters(format!("noise sigma {}: {}", self.sigma, e))
        })?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let rows = table
            .rows()
            .iter()
            .map(|r| SeriesRow::new(r.year, r.value + normal.sample(&mut rng)))
            .collect();
        Ok(TimeSeriesTable::from_sorted(rows))
    }
}

/// Demo series: 10 mm in 1993 rising 2 mm/year through 2050, with unit noise.
pub fn demo_series(seed: u64) -> Result<TimeSeriesTable> {
    let rows = (1993..=2050)
        .map(|year| SeriesRow::new(year, 10.0 + 2.0 * f64::from(year - 1993)))
        .collect();
    NoiseDecorator::new(1.0, seed).apply(&TimeSeriesTable::from_sorted(rows))
}
