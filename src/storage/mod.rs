// src/storage/mod.rs
pub mod csv_report;

use crate::error::ReportError;
use crate::types::ReportRecord;
use std::fmt;
use std::str::FromStr;

pub use csv_report::CsvReporter;

/// Write-only sink for per-iteration rows.
pub trait Reporter: Send {
    fn record(&mut self, record: &ReportRecord) -> Result<(), ReportError>;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn record(&mut self, _record: &ReportRecord) -> Result<(), ReportError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Csv,
    #[default]
    Null,
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportKind::Csv),
            "null" => Ok(ReportKind::Null),
            other => Err(format!("unknown report '{other}' (available: csv, null)")),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Csv => f.write_str("csv"),
            ReportKind::Null => f.write_str("null"),
        }
    }
}
