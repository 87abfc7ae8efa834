// src/connectors/replay.rs
use crate::connectors::traits::MarketSource;
use crate::error::{MarketError, ReportError};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves a fixed price sequence, one price per call, for deterministic
/// dry runs. Reports the market as unavailable once exhausted.
#[derive(Debug)]
pub struct ReplayMarket {
    prices: Vec<Decimal>,
    cursor: AtomicUsize,
}

impl ReplayMarket {
    pub fn new(prices: Vec<Decimal>) -> Self {
        Self {
            prices,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Loads the `price` column of a CSV file, such as a report written by
    /// a previous session.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let mut reader = csv::Reader::from_path(path)?;
        let column = reader
            .headers()?
            .iter()
            .position(|h| h.trim() == "price")
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "missing 'price' column")
            })?;

        let mut prices = Vec::new();
        for row in reader.records() {
            let row = row?;
            let raw = row.get(column).unwrap_or_default().trim();
            let price = Decimal::from_str(raw).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("bad price '{}': {}", raw, e),
                )
            })?;
            prices.push(price);
        }
        Ok(Self::new(prices))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl MarketSource for ReplayMarket {
    async fn get_price(&self, symbol: &str) -> Result<Decimal, MarketError> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.prices
            .get(index)
            .copied()
            .ok_or_else(|| MarketError::Unavailable {
                symbol: symbol.to_string(),
                reason: format!("replay exhausted after {} prices", self.prices.len()),
            })
    }
}
