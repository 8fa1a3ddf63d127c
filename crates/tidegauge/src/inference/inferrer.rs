//! Schema inference: which raw column is the year, which is the measurement.
//!
//! Resolution is strictly ordered and the first match wins:
//!
//! 1. Year column: first column whose name carries a year token; otherwise
//!    the first numeric column whose values all lie in the plausible
//!    calendar range; otherwise row positions `0, 1, 2, …`.
//! 2. Measurement column (never the year column): first column whose name
//!    carries a measurement token; otherwise the first numeric column;
//!    otherwise [`TideError::NoMeasurementColumn`].
//! 3. Unit hints rescale the measurement (centimetres to millimetres).
//! 4. Rows without a year or a numeric measurement are dropped, duplicate
//!    years are resolved, rows are sorted and optionally clipped.
//! 5. Optional rebasing to a reference row.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::profile::{ColumnProfile, parse_number, parse_year};
use super::rules::{
    ColumnRole, MEASUREMENT_TOKENS, RoleRule, RuleSet, UnitHint, YEAR_TOKENS, default_unit_hints,
    unit_for,
};
use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{Result, TideError};
use crate::input::RawTable;
use crate::series::{Rebase, SeriesRow, TimeSeriesTable};

/// How rows sharing a year are collapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the earliest row in source order.
    #[default]
    KeepFirst,
    /// Average all rows of the year.
    Mean,
}

/// Configuration for schema inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub year_tokens: Vec<String>,
    pub measurement_tokens: Vec<String>,
    pub unit_hints: Vec<UnitHint>,
    /// Values a nameless numeric column must stay within to be taken as years.
    pub plausible_years: (f64, f64),
    /// Inclusive year range to keep.
    pub year_range: Option<(i32, i32)>,
    pub rebase: Option<Rebase>,
    pub duplicate_years: DuplicatePolicy,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            year_tokens: YEAR_TOKENS.iter().map(|t| t.to_string()).collect(),
            measurement_tokens: MEASUREMENT_TOKENS.iter().map(|t| t.to_string()).collect(),
            unit_hints: default_unit_hints(),
            plausible_years: (1800.0, 2100.0),
            year_range: None,
            rebase: None,
            duplicate_years: DuplicatePolicy::KeepFirst,
        }
    }
}

/// Where the year axis came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "column", rename_all = "snake_case")]
pub enum YearSource {
    /// Column whose name carries a year token.
    Named(String),
    /// Unnamed numeric column whose values look like calendar years.
    Range(String),
    /// No temporal column; years are row positions with no calendar meaning.
    RowIndex,
}

/// The columns chosen for each role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub year: YearSource,
    pub measurement: String,
    /// Multiplier applied to the measurement values.
    pub scale: f64,
}

impl ColumnMapping {
    /// True when the year axis has no calendar meaning.
    pub fn is_degraded(&self) -> bool {
        matches!(self.year, YearSource::RowIndex)
    }
}

/// Successful inference.
#[derive(Debug, Clone)]
pub struct Inference {
    pub table: TimeSeriesTable,
    pub mapping: ColumnMapping,
    pub diagnostics: Diagnostics,
}

/// Maps arbitrary tables onto the canonical year/value series.
pub struct SchemaInferrer {
    rules: RuleSet,
    config: InferenceConfig,
}

impl SchemaInferrer {
    /// Create an inferrer with default rules.
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        let year: Vec<&str> = config.year_tokens.iter().map(String::as_str).collect();
        let measurement: Vec<&str> = config
            .measurement_tokens
            .iter()
            .map(String::as_str)
            .collect();
        let rules = RuleSet::new(vec![
            RoleRule::new(ColumnRole::Year, &year),
            RoleRule::new(ColumnRole::Measurement, &measurement),
        ]);
        Self { rules, config }
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Infer the series held in `raw`.
    pub fn infer(&self, raw: &RawTable) -> Result<Inference> {
        let mut diagnostics = Diagnostics::new();
        let profiles = ColumnProfile::analyze_all(raw);
        let matches = self.rules.resolve(&raw.headers);

        let year = self.resolve_year(raw, &profiles, &matches.year, &mut diagnostics);
        let year_index = match &year {
            YearColumn::Column { index, .. } => Some(*index),
            YearColumn::RowIndex => None,
        };

        let measurement = self
            .resolve_measurement(&profiles, &matches.measurement, year_index, &mut diagnostics)
            .ok_or_else(|| TideError::NoMeasurementColumn {
                columns: raw.headers.clone(),
            })?;
        let measurement_name = raw.headers[measurement].clone();

        let scale = match unit_for(&self.config.unit_hints, &measurement_name) {
            Some(hint) => {
                diagnostics.push(
                    Diagnostic::info(
                        DiagnosticKind::UnitScaled,
                        format!(
                            "'{}' matched unit '{}', values x{}",
                            measurement_name, hint.token, hint.multiplier
                        ),
                    )
                    .with_column(&measurement_name),
                );
                hint.multiplier
            }
            None => 1.0,
        };

        let rows = self.collect_rows(raw, &year, measurement, scale, &mut diagnostics);
        let mut table = TimeSeriesTable::from_sorted(rows);

        if let Some((start, end)) = self.config.year_range {
            let before = table.len();
            table = table.clip(start, end);
            if table.len() < before {
                diagnostics.push(Diagnostic::info(
                    DiagnosticKind::RangeClipped,
                    format!("{} rows outside {}..={} removed", before - table.len(), start, end),
                ));
            }
        }

        if table.is_empty() {
            return Err(TideError::EmptySeries(format!(
                "no usable rows for measurement column '{}'",
                measurement_name
            )));
        }

        if let Some(mode) = self.config.rebase {
            table = table.rebase(mode);
            diagnostics.push(Diagnostic::info(
                DiagnosticKind::Rebased,
                format!("values rebased ({:?})", mode),
            ));
        }

        let year = match year {
            YearColumn::Column { index, by_name: true } => {
                YearSource::Named(raw.headers[index].clone())
            }
            YearColumn::Column { index, by_name: false } => {
                YearSource::Range(raw.headers[index].clone())
            }
            YearColumn::RowIndex => YearSource::RowIndex,
        };

        Ok(Inference {
            table,
            mapping: ColumnMapping {
                year,
                measurement: measurement_name,
                scale,
            },
            diagnostics,
        })
    }

    /// Step 1: name token, then plausible numeric range, then row index.
    fn resolve_year(
        &self,
        raw: &RawTable,
        profiles: &[ColumnProfile],
        named: &[usize],
        diagnostics: &mut Diagnostics,
    ) -> YearColumn {
        for &idx in named {
            let usable = raw.column_values(idx).any(|cell| parse_year(cell).is_some());
            if usable {
                diagnostics.push(
                    Diagnostic::info(
                        DiagnosticKind::YearColumnByName,
                        format!("year column '{}' matched by name", raw.headers[idx]),
                    )
                    .with_column(&raw.headers[idx]),
                );
                return YearColumn::Column { index: idx, by_name: true };
            }
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::ColumnRejected,
                    format!("'{}' looks like a year column but holds no years", raw.headers[idx]),
                )
                .with_column(&raw.headers[idx]),
            );
        }

        let (lo, hi) = self.config.plausible_years;
        if let Some(profile) = profiles.iter().find(|p| p.within(lo, hi)) {
            diagnostics.push(
                Diagnostic::info(
                    DiagnosticKind::YearColumnByRange,
                    format!("'{}' values lie within {}..={}, used as years", profile.name, lo, hi),
                )
                .with_column(&profile.name),
            );
            return YearColumn::Column {
                index: profile.index,
                by_name: false,
            };
        }

        diagnostics.push(Diagnostic::warning(
            DiagnosticKind::YearFromRowIndex,
            "no temporal column found; row positions used as years",
        ));
        YearColumn::RowIndex
    }

    /// Step 2: name token, then first numeric column.
    fn resolve_measurement(
        &self,
        profiles: &[ColumnProfile],
        named: &[usize],
        year_index: Option<usize>,
        diagnostics: &mut Diagnostics,
    ) -> Option<usize> {
        for &idx in named.iter().filter(|&&idx| Some(idx) != year_index) {
            let profile = &profiles[idx];
            if profile.numeric_count > 0 {
                diagnostics.push(
                    Diagnostic::info(
                        DiagnosticKind::MeasurementByName,
                        format!("measurement column '{}' matched by name", profile.name),
                    )
                    .with_column(&profile.name),
                );
                return Some(idx);
            }
            diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::ColumnRejected,
                    format!("'{}' matched by name but holds no numbers", profile.name),
                )
                .with_column(&profile.name),
            );
        }

        let profile = profiles
            .iter()
            .find(|p| Some(p.index) != year_index && p.is_numeric())?;
        diagnostics.push(
            Diagnostic::info(
                DiagnosticKind::MeasurementByPosition,
                format!("first numeric column '{}' used as measurement", profile.name),
            )
            .with_column(&profile.name),
        );
        Some(profile.index)
    }

    /// Steps 3 and 4: parse, scale, filter, and de-duplicate rows.
    fn collect_rows(
        &self,
        raw: &RawTable,
        year: &YearColumn,
        measurement: usize,
        scale: f64,
        diagnostics: &mut Diagnostics,
    ) -> Vec<SeriesRow> {
        let mut missing_year: Vec<usize> = Vec::new();
        let mut missing_value: Vec<usize> = Vec::new();
        let mut by_year: HashMap<i32, (f64, usize)> = HashMap::new();
        let mut order: Vec<i32> = Vec::new();
        let mut duplicates = 0usize;

        for (row_idx, row) in raw.rows.iter().enumerate() {
            let year_value = match year {
                YearColumn::Column { index, .. } => {
                    row.get(*index).and_then(|cell| parse_year(cell))
                }
                YearColumn::RowIndex => i32::try_from(row_idx).ok(),
            };
            let Some(year_value) = year_value else {
                missing_year.push(row_idx);
                continue;
            };
            let Some(value) = row.get(measurement).and_then(|cell| parse_number(cell)) else {
                missing_value.push(row_idx);
                continue;
            };
            let value = value * scale;

            match by_year.get_mut(&year_value) {
                Some((sum, count)) => {
                    duplicates += 1;
                    if self.config.duplicate_years == DuplicatePolicy::Mean {
                        *sum += value;
                        *count += 1;
                    }
                }
                None => {
                    by_year.insert(year_value, (value, 1));
                    order.push(year_value);
                }
            }
        }

        report_dropped(diagnostics, &missing_year, "no parseable year");
        report_dropped(diagnostics, &missing_value, "non-numeric or missing measurement");
        if duplicates > 0 {
            diagnostics.push(Diagnostic::warning(
                DiagnosticKind::DuplicateYear,
                format!(
                    "{} rows repeated an earlier year ({:?} applied)",
                    duplicates, self.config.duplicate_years
                ),
            ));
        }

        let mut rows: Vec<SeriesRow> = order
            .into_iter()
            .map(|y| {
                let (sum, count) = by_year[&y];
                SeriesRow::new(y, sum / count as f64)
            })
            .collect();
        rows.sort_by_key(|r| r.year);
        rows
    }
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved year axis before names are attached.
#[derive(Debug, Clone, Copy)]
enum YearColumn {
    Column { index: usize, by_name: bool },
    RowIndex,
}

fn report_dropped(diagnostics: &mut Diagnostics, rows: &[usize], reason: &str) {
    if let Some(&first) = rows.first() {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticKind::RowDropped,
                format!("{} rows dropped: {}", rows.len(), reason),
            )
            .with_row(first),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{default_series, synthesize};

    fn raw(columns: &[(&str, &[&str])]) -> RawTable {
        RawTable::from_columns(
            columns
                .iter()
                .map(|(name, values)| {
                    (name.to_string(), values.iter().map(|v| v.to_string()).collect())
                })
                .collect(),
        )
    }

    #[test]
    fn test_first_name_match_wins() {
        let table = raw(&[
            ("id", &["1", "2", "3"]),
            ("Year", &["2001", "2002", "2003"]),
            ("연도", &["1991", "1992", "1993"]),
            ("msl_mm", &["1.0", "2.0", "3.0"]),
        ]);
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.mapping.year, YearSource::Named("Year".into()));
        assert_eq!(inference.mapping.measurement, "msl_mm");
        assert_eq!(inference.table.value_at(2002), Some(2.0));
    }

    #[test]
    fn test_numeric_range_year_fallback() {
        let years: Vec<String> = (1950..=2020).map(|y| y.to_string()).collect();
        let values: Vec<String> = (0..years.len()).map(|i| format!("{}.5", i)).collect();
        let table = RawTable::from_columns(vec![("t".into(), years), ("v".into(), values)]);

        let inference = SchemaInferrer::new().infer(&table).unwrap();
        assert_eq!(inference.mapping.year, YearSource::Range("t".into()));
        assert_eq!(inference.mapping.measurement, "v");
        assert_eq!(inference.table.len(), 71);
        assert_eq!(inference.table.value_at(1950), Some(0.5));
        assert!(inference.diagnostics.contains(DiagnosticKind::MeasurementByPosition));
    }

    #[test]
    fn test_row_index_fallback() {
        let table = raw(&[("station", &["a", "b", "c"]), ("reading", &["5", "6", "7"])]);
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.mapping.year, YearSource::RowIndex);
        assert!(inference.mapping.is_degraded());
        assert_eq!(inference.table.years().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(inference.table.values().collect::<Vec<_>>(), vec![5.0, 6.0, 7.0]);
        assert!(inference.diagnostics.contains(DiagnosticKind::YearFromRowIndex));
    }

    #[test]
    fn test_no_measurement_column() {
        let table = raw(&[("name", &["a", "b"]), ("note", &["x", "y"])]);
        let err = SchemaInferrer::new().infer(&table).unwrap_err();
        assert!(matches!(err, TideError::NoMeasurementColumn { .. }));
    }

    #[test]
    fn test_year_only_table_has_no_measurement() {
        let table = raw(&[("year", &["2000", "2001"]), ("comment", &["ok", "ok"])]);
        let err = SchemaInferrer::new().infer(&table).unwrap_err();
        assert!(matches!(err, TideError::NoMeasurementColumn { .. }));
    }

    #[test]
    fn test_centimetres_normalized() {
        let table = raw(&[("연도", &["2001", "2002"]), ("연평균(cm)", &["5.0", "5.5"])]);
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.mapping.scale, 10.0);
        assert_eq!(inference.table.value_at(2001), Some(50.0));
        assert_eq!(inference.table.value_at(2002), Some(55.0));
        assert!(inference.diagnostics.contains(DiagnosticKind::UnitScaled));
    }

    #[test]
    fn test_rows_filtered_and_sorted() {
        let table = raw(&[
            ("year", &["2003", "2001", "bad", "2002"]),
            ("sea_level", &["3", "1", "9", "n/a"]),
        ]);
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.table.years().collect::<Vec<_>>(), vec![2001, 2003]);
        let dropped: Vec<_> = inference
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::RowDropped)
            .collect();
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].row, Some(2));
        assert_eq!(dropped[1].row, Some(3));
    }

    #[test]
    fn test_text_measurement_column_rejected() {
        let table = raw(&[
            ("year", &["2001", "2002"]),
            ("sea_note", &["calm", "storm"]),
            ("reading", &["1.5", "2.5"]),
        ]);
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.mapping.measurement, "reading");
        assert!(inference.diagnostics.contains(DiagnosticKind::ColumnRejected));
    }

    #[test]
    fn test_yearless_year_column_rejected() {
        let table = raw(&[
            ("year", &["n/a", "?"]),
            ("t", &["1950", "1960"]),
            ("msl", &["1.0", "2.0"]),
        ]);
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.mapping.year, YearSource::Range("t".into()));
        assert_eq!(inference.table.value_at(1960), Some(2.0));
        let rejected = inference
            .diagnostics
            .iter()
            .find(|d| d.kind == DiagnosticKind::ColumnRejected)
            .unwrap();
        assert_eq!(rejected.column.as_deref(), Some("year"));
    }

    #[test]
    fn test_duplicate_years() {
        let table = raw(&[("year", &["2001", "2001", "2002"]), ("msl", &["1", "3", "5"])]);

        let first = SchemaInferrer::new().infer(&table).unwrap();
        assert_eq!(first.table.value_at(2001), Some(1.0));
        assert!(first.diagnostics.contains(DiagnosticKind::DuplicateYear));

        let mean = SchemaInferrer::with_config(InferenceConfig {
            duplicate_years: DuplicatePolicy::Mean,
            ..InferenceConfig::default()
        })
        .infer(&table)
        .unwrap();
        assert_eq!(mean.table.value_at(2001), Some(2.0));
    }

    #[test]
    fn test_clip_and_rebase() {
        let table = raw(&[
            ("year", &["1899", "1900", "1901", "2030"]),
            ("gmsl", &["1", "10", "12", "99"]),
        ]);
        let inference = SchemaInferrer::with_config(InferenceConfig {
            year_range: Some((1900, 2025)),
            rebase: Some(Rebase::FirstRow),
            ..InferenceConfig::default()
        })
        .infer(&table)
        .unwrap();

        assert_eq!(inference.table.years().collect::<Vec<_>>(), vec![1900, 1901]);
        assert_eq!(inference.table.values().collect::<Vec<_>>(), vec![0.0, 2.0]);
        assert!(inference.diagnostics.contains(DiagnosticKind::RangeClipped));
    }

    #[test]
    fn test_all_rows_clipped_is_empty_series() {
        let table = raw(&[("year", &["1700", "1701"]), ("msl", &["1", "2"])]);
        let err = SchemaInferrer::with_config(InferenceConfig {
            year_range: Some((1900, 2025)),
            ..InferenceConfig::default()
        })
        .infer(&table)
        .unwrap_err();
        assert!(matches!(err, TideError::EmptySeries(_)));
    }

    #[test]
    fn test_round_trip_of_synthesized_series() {
        let series = synthesize(1900, 2025, 1992, 1.75, 3.3).unwrap();
        let table = RawTable::from_series(&series, "year", "gmsl_mm");
        let inference = SchemaInferrer::new().infer(&table).unwrap();

        assert_eq!(inference.mapping.year, YearSource::Named("year".into()));
        assert_eq!(inference.mapping.measurement, "gmsl_mm");
        assert_eq!(inference.table, series);
        assert_eq!(default_series(), series);
    }
}
