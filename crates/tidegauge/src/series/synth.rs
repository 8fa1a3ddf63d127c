//! Deterministic two-regime baseline series.
//!
//! The estimate grows linearly at `rate_before` per year up to and including
//! the breakpoint year, then at `rate_after`. It starts at zero and has no
//! jump at the breakpoint.

use serde::{Deserialize, Serialize};

use super::table::{SeriesRow, TimeSeriesTable};
use crate::error::{Result, TideError};

pub const DEFAULT_START_YEAR: i32 = 1900;
pub const DEFAULT_END_YEAR: i32 = 2025;
/// First year of the satellite altimetry era.
pub const DEFAULT_BREAKPOINT_YEAR: i32 = 1992;
/// Tide-gauge era rise, mm/year.
pub const DEFAULT_RATE_BEFORE: f64 = 1.75;
/// Satellite era rise, mm/year.
pub const DEFAULT_RATE_AFTER: f64 = 3.3;

/// Largest span the synthesizer will produce.
const MAX_SPAN_YEARS: i64 = 10_000;

/// Parameters of the synthetic series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    pub start_year: i32,
    pub end_year: i32,
    pub breakpoint_year: i32,
    pub rate_before: f64,
    pub rate_after: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
            breakpoint_year: DEFAULT_BREAKPOINT_YEAR,
            rate_before: DEFAULT_RATE_BEFORE,
            rate_after: DEFAULT_RATE_AFTER,
        }
    }
}

impl SynthesisParams {
    /// Check `start < breakpoint <= end`, finite rates, and finite values.
    pub fn validate(&self) -> Result<()> {
        if self.start_year >= self.breakpoint_year {
            return Err(TideError::InvalidParameters(format!(
                "start year {} must precede breakpoint year {}",
                self.start_year, self.breakpoint_year
            )));
        }
        if self.breakpoint_year > self.end_year {
            return Err(TideError::InvalidParameters(format!(
                "breakpoint year {} is after end year {}",
                self.breakpoint_year, self.end_year
            )));
        }
        if i64::from(self.end_year) - i64::from(self.start_year) >= MAX_SPAN_YEARS {
            return Err(TideError::InvalidParameters(format!(
                "span {}..={} exceeds {} years",
                self.start_year, self.end_year, MAX_SPAN_YEARS
            )));
        }
        if !self.rate_before.is_finite() || !self.rate_after.is_finite() {
            return Err(TideError::InvalidParameters(
                "growth rates must be finite".to_string(),
            ));
        }
        // Piecewise linear: every value lies between these two and zero
        for year in [self.breakpoint_year, self.end_year] {
            let value = self.value_at(year);
            if !value.is_finite() {
                return Err(TideError::InvalidParameters(format!(
                    "rates {} and {} overflow to {} in year {}",
                    self.rate_before, self.rate_after, value, year
                )));
            }
        }
        Ok(())
    }

    /// Value of the series in `year`.
    pub fn value_at(&self, year: i32) -> f64 {
        let years_since = |from: i32, to: i32| (i64::from(to) - i64::from(from)) as f64;
        if year <= self.breakpoint_year {
            years_since(self.start_year, year) * self.rate_before
        } else {
            years_since(self.start_year, self.breakpoint_year) * self.rate_before
                + years_since(self.breakpoint_year, year) * self.rate_after
        }
    }
}

/// Produce the synthetic series for `params`.
pub fn synthesize_with(params: &SynthesisParams) -> Result<TimeSeriesTable> {
    params.validate()?;
    let rows = (params.start_year..=params.end_year)
        .map(|year| SeriesRow::new(year, params.value_at(year)))
        .collect();
    tracing::debug!(
        start = params.start_year,
        end = params.end_year,
        breakpoint = params.breakpoint_year,
        "synthesized baseline series"
    );
    Ok(TimeSeriesTable::from_sorted(rows))
}

/// Produce the synthetic series from its five parameters.
pub fn synthesize(
    start_year: i32,
    end_year: i32,
    breakpoint_year: i32,
    rate_before: f64,
    rate_after: f64,
) -> Result<TimeSeriesTable> {
    synthesize_with(&SynthesisParams {
        start_year,
        end_year,
        breakpoint_year,
        rate_before,
        rate_after,
    })
}

/// The series with default parameters; the fallback of last resort.
pub fn default_series() -> TimeSeriesTable {
    let params = SynthesisParams::default();
    let rows = (params.start_year..=params.end_year)
        .map(|year| SeriesRow::new(year, params.value_at(year)))
        .collect();
    TimeSeriesTable::from_sorted(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero_with_full_span() {
        let t = synthesize(1900, 2025, 1992, 1.75, 3.3).unwrap();
        assert_eq!(t.len(), 126);
        assert_eq!(t.first().unwrap().value, 0.0);
        assert_eq!(t.first().unwrap().year, 1900);
        assert_eq!(t.last().unwrap().year, 2025);
    }

    #[test]
    fn test_continuous_at_breakpoint() {
        let t = synthesize(1900, 2025, 1992, 1.75, 3.3).unwrap();
        assert_eq!(t.value_at(1992), Some(161.0));
        let step = t.value_at(1993).unwrap() - t.value_at(1992).unwrap();
        assert!((step - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_breakpoint_at_end() {
        let t = synthesize(2000, 2010, 2010, 2.0, 100.0).unwrap();
        assert_eq!(t.value_at(2010), Some(20.0));
    }

    #[test]
    fn test_monotone_for_non_negative_rates() {
        let t = synthesize(1900, 2025, 1950, 0.0, 2.5).unwrap();
        let values: Vec<f64> = t.values().collect();
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(synthesize(1992, 2025, 1992, 1.0, 1.0).is_err());
        assert!(synthesize(1900, 1950, 1992, 1.0, 1.0).is_err());
        assert!(synthesize(1900, 2025, 1992, f64::NAN, 1.0).is_err());
        assert!(synthesize(-20_000, 2025, 1992, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_overflowing_rates_rejected() {
        let err = synthesize(1900, 2025, 1992, -1e308, 1e308).unwrap_err();
        assert!(matches!(err, TideError::InvalidParameters(_)));
        assert!(synthesize(1900, 2025, 1992, 1.0, f64::MAX).is_err());

        let extreme = synthesize(1900, 2025, 1992, 1e300, 1e300).unwrap();
        assert!(extreme.values().all(f64::is_finite));
    }

    #[test]
    fn test_default_series_matches_defaults() {
        let params = SynthesisParams::default();
        assert_eq!(default_series(), synthesize_with(&params).unwrap());
    }
}
