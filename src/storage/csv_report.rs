// src/storage/csv_report.rs
use crate::error::ReportError;
use crate::storage::Reporter;
use crate::types::ReportRecord;
use crate::utils::precision::round_money;
use chrono::Utc;
use rust_decimal::Decimal;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 9] = [
    "timestamp",
    "symbol",
    "price",
    "position_side",
    "position_quantity",
    "position_entry_price",
    "unrealized_pnl",
    "realized_pnl",
    "signal",
];

/// Appends one CSV row per iteration. Monetary columns are rounded to
/// cents here and nowhere else.
pub struct CsvReporter {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvReporter {
    /// Creates `<dir>/trading_data_<SYMBOL>_<unix_ts>.csv`.
    pub fn create(dir: impl AsRef<Path>, symbol: &str) -> Result<Self, ReportError> {
        fs::create_dir_all(dir.as_ref())?;
        let filename = format!(
            "trading_data_{}_{}.csv",
            symbol.replace('-', "_"),
            Utc::now().timestamp()
        );
        Self::open(dir.as_ref().join(filename))
    }

    /// Opens `path` for appending, writing the header if the file is new.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let path = path.into();
        let is_new = !path.exists();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if is_new {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Column values in [`HEADER`] order.
pub fn format_row(record: &ReportRecord) -> [String; 9] {
    [
        record.timestamp.to_rfc3339(),
        record.symbol.clone(),
        money(record.price),
        record.position_side.label().to_string(),
        record.position_quantity.to_string(),
        money(record.position_entry_price),
        money(record.unrealized_pnl),
        money(record.realized_pnl),
        record.signal.map(|a| a.as_str().to_string()).unwrap_or_default(),
    ]
}

impl Reporter for CsvReporter {
    fn record(&mut self, record: &ReportRecord) -> Result<(), ReportError> {
        self.writer.write_record(format_row(record))?;
        self.writer.flush()?;
        Ok(())
    }
}
