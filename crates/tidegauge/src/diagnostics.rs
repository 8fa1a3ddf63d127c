//! Leveled diagnostic events returned alongside results.
//!
//! Every decision the inferrer or loader takes (a rule matching, a row being
//! dropped, a fallback being used) is recorded as a [`Diagnostic`] and handed
//! back to the caller together with the result, and is mirrored to `tracing`.

use serde::{Deserialize, Serialize};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Year column selected by a name token.
    YearColumnByName,
    /// Year column selected because its values look like calendar years.
    YearColumnByRange,
    /// No temporal column; row positions stand in for years.
    YearFromRowIndex,
    /// Measurement column selected by a name token.
    MeasurementByName,
    /// Measurement column selected as the first remaining numeric column.
    MeasurementByPosition,
    /// A name-matched column was skipped because it holds no numbers.
    ColumnRejected,
    /// Measurement values were rescaled by a unit hint.
    UnitScaled,
    /// A row was dropped during filtering.
    RowDropped,
    /// Two or more rows carried the same year.
    DuplicateYear,
    /// Rows outside the requested year range were removed.
    RangeClipped,
    /// Values were shifted so the reference row reads zero.
    Rebased,
    /// The input decoded only under a fallback encoding.
    DecodeFallback,
    /// The input could not be decoded at all.
    DecodeFailed,
    /// No remote candidate produced a usable table.
    RemoteUnavailable,
    /// One remote candidate failed; others may still succeed.
    CandidateFailed,
    /// The synthetic estimate is being used in place of real data.
    SyntheticFallback,
    /// A cached result was reused.
    CacheHit,
    /// A remote series was spliced onto the baseline.
    Spliced,
}

impl DiagnosticKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::YearColumnByName => "Year Column",
            DiagnosticKind::YearColumnByRange => "Year Column (range)",
            DiagnosticKind::YearFromRowIndex => "Row Index Years",
            DiagnosticKind::MeasurementByName => "Measurement Column",
            DiagnosticKind::MeasurementByPosition => "Measurement Column (position)",
            DiagnosticKind::ColumnRejected => "Column Rejected",
            DiagnosticKind::UnitScaled => "Unit Scaled",
            DiagnosticKind::RowDropped => "Row Dropped",
            DiagnosticKind::DuplicateYear => "Duplicate Year",
            DiagnosticKind::RangeClipped => "Range Clipped",
            DiagnosticKind::Rebased => "Rebased",
            DiagnosticKind::DecodeFallback => "Decode Fallback",
            DiagnosticKind::DecodeFailed => "Decode Failed",
            DiagnosticKind::RemoteUnavailable => "Remote Unavailable",
            DiagnosticKind::CandidateFailed => "Candidate Failed",
            DiagnosticKind::SyntheticFallback => "Synthetic Fallback",
            DiagnosticKind::CacheHit => "Cache Hit",
            DiagnosticKind::Spliced => "Spliced",
        }
    }
}

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only.
    Info,
    /// Degraded but usable result.
    Warning,
    /// A stage failed and was recovered from.
    Error,
}

impl Severity {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A single diagnostic event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub message: String,
    /// Column the event concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Zero-based source row, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            column: None,
            row: None,
        }
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Info, message)
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Warning, message)
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(kind, Severity::Error, message)
    }

    /// Set the column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// Set the row.
    pub fn with_row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }
}

/// Ordered collection of diagnostics that mirrors each event to `tracing`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        let (kind, column, message) = (diagnostic.kind, &diagnostic.column, &diagnostic.message);
        match diagnostic.severity {
            Severity::Info => tracing::debug!(?kind, ?column, "{}", message),
            Severity::Warning => tracing::warn!(?kind, ?column, "{}", message),
            Severity::Error => tracing::error!(?kind, ?column, "{}", message),
        }
        self.0.push(diagnostic);
    }

    /// Append already-recorded diagnostics without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any diagnostic of the given kind was recorded.
    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.0.iter().any(|d| d.kind == kind)
    }

    /// Count diagnostics at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.0.iter().filter(|d| d.severity == severity).count()
    }

    /// Highest severity present.
    pub fn max_severity(&self) -> Option<Severity> {
        self.0.iter().map(|d| d.severity).max()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
