//! The canonical year/value series and the operations callers compose over it.

use std::io::Write;

use serde::{Deserialize, Serialize};

use super::stats::{NumericStatistics, SeriesSummary};
use crate::error::{Result, TideError};

/// One year of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesRow {
    pub year: i32,
    pub value: f64,
}

impl SeriesRow {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Which row a rebase treats as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "year", rename_all = "snake_case")]
pub enum Rebase {
    /// The earliest year in the table.
    FirstRow,
    /// A specific year; falls back to the first row when the year is absent.
    Anchor(i32),
}

/// Outcome of splicing a remote series onto a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpliceReport {
    /// Shift applied to every remote value, if the baseline covered the remote start.
    pub offset: Option<f64>,
    /// Baseline years superseded by remote values.
    pub replaced: usize,
    /// Remote years the baseline did not have.
    pub appended: usize,
}

/// A series of unique, ascending years with finite values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeriesRow>", into = "Vec<SeriesRow>")]
pub struct TimeSeriesTable {
    rows: Vec<SeriesRow>,
}

impl TimeSeriesTable {
    /// Build a table, sorting by year.
    ///
    /// Fails on duplicate years or non-finite values.
    pub fn new(mut rows: Vec<SeriesRow>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| !r.value.is_finite()) {
            return Err(TideError::InvalidParameters(format!(
                "non-finite value for year {}",
                bad.year
            )));
        }
        rows.sort_by_key(|r| r.year);
        if let Some(pair) = rows.windows(2).find(|w| w[0].year == w[1].year) {
            return Err(TideError::InvalidParameters(format!(
                "duplicate year {}",
                pair[0].year
            )));
        }
        Ok(Self { rows })
    }

    /// Wrap rows already known to be sorted, unique, and finite.
    pub(crate) fn from_sorted(rows: Vec<SeriesRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].year < w[1].year));
        Self { rows }
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&SeriesRow> {
        self.rows.first()
    }

    pub fn last(&self) -> Option<&SeriesRow> {
        self.rows.last()
    }

    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.iter().map(|r| r.year)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.value)
    }

    /// Value recorded for `year`, if any.
    pub fn value_at(&self, year: i32) -> Option<f64> {
        self.rows
            .binary_search_by_key(&year, |r| r.year)
            .ok()
            .map(|idx| self.rows[idx].value)
    }

    pub fn contains_year(&self, year: i32) -> bool {
        self.value_at(year).is_some()
    }

    /// Keep only rows with `start <= year <= end`.
    pub fn clip(&self, start: i32, end: i32) -> Self {
        Self::from_sorted(
            self.rows
                .iter()
                .filter(|r| r.year >= start && r.year <= end)
                .copied()
                .collect(),
        )
    }

    /// Shift every value so the reference row reads zero.
    pub fn rebase(&self, mode: Rebase) -> Self {
        let reference = match mode {
            Rebase::FirstRow => self.first().map(|r| r.value),
            Rebase::Anchor(year) => self.value_at(year).or_else(|| self.first().map(|r| r.value)),
        };
        let Some(reference) = reference else {
            return self.clone();
        };
        Self::from_sorted(
            self.rows
                .iter()
                .map(|r| SeriesRow::new(r.year, r.value - reference))
                .collect(),
        )
    }

    /// Splice a shorter, more precise series onto a long baseline.
    ///
    /// The remote series is shifted so its first value equals the baseline's
    /// value in the same year, then replaces the baseline wherever both have a
    /// year.
    pub fn splice(baseline: &Self, remote: &Self) -> (Self, SpliceReport) {
        let offset = remote
            .first()
            .and_then(|first| baseline.value_at(first.year).map(|b| b - first.value));
        let shift = offset.unwrap_or(0.0);

        let mut rows: Vec<SeriesRow> = baseline
            .rows
            .iter()
            .filter(|r| !remote.contains_year(r.year))
            .copied()
            .collect();
        let kept = rows.len();
        rows.extend(remote.rows.iter().map(|r| SeriesRow::new(r.year, r.value + shift)));
        rows.sort_by_key(|r| r.year);

        let replaced = baseline.len() - kept;
        let report = SpliceReport {
            offset,
            replaced,
            appended: remote.len() - replaced,
        };
        (Self::from_sorted(rows), report)
    }

    /// Describe both columns the way a dataframe summary would.
    pub fn summary(&self) -> SeriesSummary {
        let years: Vec<f64> = self.years().map(f64::from).collect();
        let values: Vec<f64> = self.values().collect();
        SeriesSummary {
            year: NumericStatistics::from_values(&years),
            value: NumericStatistics::from_values(&values),
        }
    }

    /// Write the series as CSV with the given header names.
    pub fn write_csv<W: Write>(&self, writer: W, year_name: &str, value_name: &str) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([year_name, value_name])?;
        for row in &self.rows {
            csv.write_record([row.year.to_string(), row.value.to_string()])?;
        }
        csv.flush().map_err(|e| TideError::Csv(e.into()))?;
        Ok(())
    }
}

impl TryFrom<Vec<SeriesRow>> for TimeSeriesTable {
    type Error = TideError;

    fn try_from(rows: Vec<SeriesRow>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<TimeSeriesTable> for Vec<SeriesRow> {
    fn from(table: TimeSeriesTable) -> Self {
        table.rows
    }
}
