#![allow(dead_code)]

use async_trait::async_trait;
use price_trader::connectors::{ExecutionGateway, MarketSource};
use price_trader::core::EngineSettings;
use price_trader::error::{ExecutionError, MarketError, NotifyError, ReportError};
use price_trader::notification::Notifier;
use price_trader::storage::Reporter;
use price_trader::types::{Action, Fill, ReportRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SYMBOL: &str = "BTC-USDT";

/// Zero interval, 100 quote per entry, so a price of 100 opens exactly 1.
pub fn settings(max_iterations: Option<u64>) -> EngineSettings {
    EngineSettings {
        symbol: SYMBOL.to_string(),
        interval: Duration::ZERO,
        order_size: dec!(100),
        step_size: dec!(0.001),
        min_notional: dec!(5),
        max_iterations,
    }
}

/// Keeps every row so tests can inspect them after the engine owns the reporter.
#[derive(Clone, Default)]
pub struct MemoryReporter {
    rows: Arc<Mutex<Vec<ReportRecord>>>,
}

impl MemoryReporter {
    pub fn rows(&self) -> Vec<ReportRecord> {
        self.rows.lock().unwrap().clone()
    }
}

impl Reporter for MemoryReporter {
    fn record(&mut self, record: &ReportRecord) -> Result<(), ReportError> {
        self.rows.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Serves a scripted sequence; `None` entries simulate a failed quote.
pub struct ScriptedMarket {
    quotes: Mutex<VecDeque<Option<Decimal>>>,
}

impl ScriptedMarket {
    pub fn new(quotes: impl IntoIterator<Item = Option<Decimal>>) -> Self {
        Self {
            quotes: Mutex::new(quotes.into_iter().collect()),
        }
    }
}

#[async_trait]
impl MarketSource for ScriptedMarket {
    async fn get_price(&self, symbol: &str) -> Result<Decimal, MarketError> {
        self.quotes
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
            .ok_or_else(|| MarketError::Unavailable {
                symbol: symbol.to_string(),
                reason: "scripted outage".to_string(),
            })
    }
}

/// Refuses every order.
#[derive(Clone, Default)]
pub struct FailingGateway {
    calls: Arc<AtomicUsize>,
}

impl FailingGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionGateway for FailingGateway {
    async fn execute(
        &self,
        symbol: &str,
        _action: Action,
        _quantity: Decimal,
        _reference_price: Decimal,
    ) -> Result<Fill, ExecutionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ExecutionError::Failed {
            symbol: symbol.to_string(),
            reason: "insufficient balance".to_string(),
        })
    }
}

/// Rejects every row, as a full disk would.
#[derive(Clone, Default)]
pub struct FailingReporter {
    attempts: Arc<AtomicUsize>,
}

impl FailingReporter {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Reporter for FailingReporter {
    fn record(&mut self, _record: &ReportRecord) -> Result<(), ReportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no space left on device",
        )))
    }
}

/// Captures messages; when `failing`, also reports each send as failed.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push(message.to_string());
        if self.failing {
            // An unparseable URL fails in the request builder, offline.
            let err = reqwest::Client::new()
                .post("http://[::1")
                .send()
                .await
                .expect_err("malformed url must not send");
            return Err(NotifyError::Http(err));
        }
        Ok(())
    }
}
