//! Per-column numeric profiling and cell parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::RawTable;

// Compiled once on first use.
static GROUPED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d{1,3}(,\d{3})+(\.\d+)?$").unwrap());

/// A four-digit year followed by a non-digit suffix: "2001년", "2001-06", "2001/06/30".
static YEAR_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})(?:\D.*)?$").unwrap());

/// Parse a measurement cell. Missing and non-finite values yield `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if RawTable::is_null_value(trimmed) {
        return None;
    }
    let parsed = if GROUPED_NUMBER.is_match(trimmed) {
        trimmed.replace(',', "").parse::<f64>().ok()
    } else {
        trimmed.parse::<f64>().ok()
    };
    parsed.filter(|v| v.is_finite())
}

/// Parse a year cell. Fractional years are floored.
pub fn parse_year(cell: &str) -> Option<i32> {
    if let Some(value) = parse_number(cell) {
        let floored = value.floor();
        if floored >= f64::from(i32::MIN) && floored <= f64::from(i32::MAX) {
            return Some(floored as i32);
        }
        return None;
    }
    YEAR_PREFIX
        .captures(cell.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok())
}

/// Numeric summary of one raw column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    pub index: usize,
    pub name: String,
    /// Cells that parse as finite numbers.
    pub numeric_count: usize,
    /// Missing cells.
    pub null_count: usize,
    /// Present cells that are not numbers.
    pub text_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnProfile {
    /// Profile column `index` of `table`.
    pub fn analyze(table: &RawTable, index: usize) -> Self {
        let mut profile = Self {
            index,
            name: table.headers.get(index).cloned().unwrap_or_default(),
            numeric_count: 0,
            null_count: 0,
            text_count: 0,
            min: None,
            max: None,
        };

        for cell in table.column_values(index) {
            if RawTable::is_null_value(cell) {
                profile.null_count += 1;
                continue;
            }
            match parse_number(cell) {
                Some(v) => {
                    profile.numeric_count += 1;
                    profile.min = Some(profile.min.map_or(v, |m| m.min(v)));
                    profile.max = Some(profile.max.map_or(v, |m| m.max(v)));
                }
                None => profile.text_count += 1,
            }
        }

        profile
    }

    /// Profile every column of `table`.
    pub fn analyze_all(table: &RawTable) -> Vec<Self> {
        (0..table.column_count())
            .map(|idx| Self::analyze(table, idx))
            .collect()
    }

    /// At least one number and nothing but numbers among present cells.
    pub fn is_numeric(&self) -> bool {
        self.numeric_count > 0 && self.text_count == 0
    }

    /// Numeric with every value inside `[lo, hi]`.
    pub fn within(&self, lo: f64, hi: f64) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => self.is_numeric() && min >= lo && max <= hi,
            _ => false,
        }
    }
}
