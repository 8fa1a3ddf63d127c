//! Raw table representation and source metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::series::TimeSeriesTable;

/// Metadata about where a raw table came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File path, URL, or upload name.
    pub origin: String,
    /// SHA-256 hash of the raw bytes.
    pub hash: String,
    /// Size of the raw bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Encoding the bytes decoded under.
    pub encoding: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the table was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(
        origin: impl Into<String>,
        hash: String,
        size_bytes: u64,
        format: String,
        encoding: impl Into<String>,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        Self {
            origin: origin.into(),
            hash,
            size_bytes,
            format,
            encoding: encoding.into(),
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// An arbitrary table of untyped cells, as parsed.
///
/// Columns keep their declaration order; cells stay strings until the
/// inferrer decides what each column means.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a new raw table.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Build a table from named columns. Shorter columns are padded with empty cells.
    pub fn from_columns(columns: Vec<(String, Vec<String>)>) -> Self {
        let height = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let headers = columns.iter().map(|(name, _)| name.clone()).collect();
        let rows = (0..height)
            .map(|r| {
                columns
                    .iter()
                    .map(|(_, values)| values.get(r).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();
        Self { headers, rows }
    }

    /// Re-encode a series as a two-column raw table.
    pub fn from_series(series: &TimeSeriesTable, year_name: &str, value_name: &str) -> Self {
        let rows = series
            .rows()
            .iter()
            .map(|r| vec![r.year.to_string(), r.value.to_string()])
            .collect();
        Self {
            headers: vec![year_name.to_string(), value_name.to_string()],
            rows,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Position of the first column with this exact name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.position(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Check if a value represents a missing/null value.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("nan")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}
