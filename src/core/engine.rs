// src/core/engine.rs
use crate::connectors::traits::{ExecutionGateway, MarketSource};
use crate::core::summary::{SessionStats, SessionSummary};
use crate::core::tracker::PositionTracker;
use crate::error::TrackerError;
use crate::notification::{Notifier, NullNotifier};
use crate::storage::Reporter;
use crate::strategies::traits::BoxedStrategy;
use crate::types::{Action, Fill, Position, ReportRecord, Snapshot};
use crate::utils::precision::{normalize_quantity, round_money};
use chrono::Utc;
use rust_decimal::Decimal;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub symbol: String,
    pub interval: Duration,
    /// Quote-currency notional committed when opening a position.
    pub order_size: Decimal,
    pub step_size: Decimal,
    pub min_notional: Decimal,
    /// Stop after this many ticks; `None` runs until shutdown.
    pub max_iterations: Option<u64>,
}

/// What one tick ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// No snapshot: nothing decided, nothing reported.
    Skipped,
    /// Hold, an action with no valid transition, or an unsizable order.
    Held(ReportRecord),
    Executed {
        action: Action,
        fill: Fill,
        record: ReportRecord,
    },
    /// The gateway refused or failed; state is exactly as before.
    ExecutionFailed {
        action: Action,
        record: ReportRecord,
    },
}

impl StepOutcome {
    pub fn record(&self) -> Option<&ReportRecord> {
        match self {
            StepOutcome::Skipped => None,
            StepOutcome::Held(record)
            | StepOutcome::Executed { record, .. }
            | StepOutcome::ExecutionFailed { record, .. } => Some(record),
        }
    }
}

pub struct TradingEngine {
    settings: EngineSettings,
    strategy: BoxedStrategy,
    market: Box<dyn MarketSource>,
    execution_handler: Box<dyn ExecutionGateway>,
    reporter: Box<dyn Reporter>,
    notifier: Box<dyn Notifier>,
    tracker: PositionTracker,
    stats: SessionStats,
}

impl TradingEngine {
    pub fn new(
        settings: EngineSettings,
        strategy: BoxedStrategy,
        market: Box<dyn MarketSource>,
        execution_handler: Box<dyn ExecutionGateway>,
        reporter: Box<dyn Reporter>,
    ) -> Self {
        Self {
            settings,
            strategy,
            market,
            execution_handler,
            reporter,
            notifier: Box::new(NullNotifier),
            tracker: PositionTracker::new(),
            stats: SessionStats::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary::build(&self.stats, &self.tracker)
    }

    /// Runs ticks until shutdown is signalled, the sender is dropped, or the
    /// iteration limit is hit. Shutdown is only observed between ticks, so an
    /// order call is never abandoned half-way.
    pub async fn run(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<SessionSummary, TrackerError> {
        info!(
            symbol = %self.settings.symbol,
            strategy = self.strategy.name(),
            interval_secs = self.settings.interval.as_secs(),
            "Engine loop running"
        );
        self.notify(format!(
            "Trader started for {} ({})",
            self.settings.symbol,
            self.strategy.name()
        ))
        .await;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.step().await?;

            if let Some(limit) = self.settings.max_iterations {
                if self.stats.iterations >= limit {
                    info!(limit, "Iteration limit reached");
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.settings.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested");
                        break;
                    }
                }
            }
        }

        let summary = self.summary();
        summary.log();
        self.notify(format!(
            "Trader stopped for {} after {} iterations. Realized PnL {}, unrealized {}",
            self.settings.symbol,
            summary.iterations,
            round_money(summary.realized_pnl),
            round_money(summary.unrealized_pnl)
        ))
        .await;
        Ok(summary)
    }

    /// One full iteration: fetch, mark, decide, execute, report.
    pub async fn step(&mut self) -> Result<StepOutcome, TrackerError> {
        self.stats.iterations += 1;
        let symbol = self.settings.symbol.clone();

        let price = match self.market.get_price(&symbol).await {
            Ok(price) if price > Decimal::ZERO => price,
            Ok(price) => {
                warn!(%symbol, %price, "Ignoring non-positive quote, skipping iteration");
                self.stats.skipped += 1;
                return Ok(StepOutcome::Skipped);
            }
            Err(e) => {
                warn!("{}, skipping iteration", e);
                self.stats.skipped += 1;
                return Ok(StepOutcome::Skipped);
            }
        };
        let snapshot = Snapshot::new(symbol, price, Utc::now());
        self.stats.observe(price);

        let unrealized = self.tracker.mark(price);
        debug!(price = %snapshot.price, unrealized = %unrealized, "Marked position");

        let position = *self.tracker.position();
        let signal = self.strategy.decide(&snapshot, &position);
        debug!(action = %signal.action, metadata = ?signal.metadata, "Strategy decided");

        let action = signal.action;
        if action == Action::Hold {
            return Ok(self.finish(StepOutcome::Held, &snapshot, None));
        }
        if !position.accepts(action) {
            debug!(%action, side = ?position.side(), "No valid transition, holding");
            return Ok(self.finish(StepOutcome::Held, &snapshot, None));
        }
        let Some(quantity) = self.order_quantity(&position, price) else {
            return Ok(self.finish(StepOutcome::Held, &snapshot, None));
        };

        info!(%action, %quantity, price = %snapshot.price, "Signal detected");

        match self
            .execution_handler
            .execute(&snapshot.symbol, action, quantity, price)
            .await
        {
            Ok(fill) => {
                let closed = self.tracker.apply(action, fill, snapshot.observed_at)?;
                self.tracker.mark(price);
                if position.is_flat() {
                    self.stats.opened(*self.tracker.position());
                    info!(side = ?self.tracker.position().side(), quantity = %fill.quantity, entry = %fill.price, "Position opened");
                    self.notify(format!(
                        "Opened {} {} {} @ {}",
                        self.tracker.position().side().label(),
                        fill.quantity.normalize(),
                        snapshot.symbol,
                        fill.price.normalize()
                    ))
                    .await;
                }
                if let Some(trade) = closed {
                    let pnl = round_money(trade.realized_pnl);
                    if trade.realized_pnl > Decimal::ZERO {
                        info!(pnl = %pnl, exit = %trade.exit_price, "Position closed with profit");
                    } else {
                        info!(pnl = %pnl, exit = %trade.exit_price, "Position closed with loss");
                    }
                    self.notify(format!(
                        "Closed {} {} {} @ {}, PnL {}",
                        trade.side.label(),
                        trade.quantity.normalize(),
                        snapshot.symbol,
                        trade.exit_price.normalize(),
                        pnl
                    ))
                    .await;
                }
                Ok(self.finish(
                    |record| StepOutcome::Executed {
                        action,
                        fill,
                        record,
                    },
                    &snapshot,
                    Some(action),
                ))
            }
            Err(e) => {
                // Not retried: the order may have reached the exchange.
                error!("{}", e);
                self.stats.failed_executions += 1;
                Ok(self.finish(
                    |record| StepOutcome::ExecutionFailed { action, record },
                    &snapshot,
                    None,
                ))
            }
        }
    }

    /// Opening size from the configured notional; closing is always the
    /// whole open quantity.
    fn order_quantity(&self, position: &Position, price: Decimal) -> Option<Decimal> {
        if !position.is_flat() {
            return Some(position.quantity());
        }

        let Some(raw_qty) = self.settings.order_size.checked_div(price) else {
            warn!(order_size = %self.settings.order_size, %price, "Order size overflows at this price. Not entering position.");
            return None;
        };
        let quantity = normalize_quantity(raw_qty, self.settings.step_size);
        if quantity.is_zero() {
            warn!(%raw_qty, "Quantity is zero after normalization. Not entering position.");
            return None;
        }

        let notional = quantity * price;
        if notional < self.settings.min_notional {
            warn!(
                notional = %round_money(notional),
                min_notional = %self.settings.min_notional,
                "Order skipped: notional below minimum"
            );
            return None;
        }
        Some(quantity)
    }

    async fn notify(&self, message: String) {
        if let Err(e) = self.notifier.send(&message).await {
            warn!("Failed to send notification: {}", e);
        }
    }

    fn finish(
        &mut self,
        outcome: impl FnOnce(ReportRecord) -> StepOutcome,
        snapshot: &Snapshot,
        signal: Option<Action>,
    ) -> StepOutcome {
        let record = ReportRecord::new(snapshot, self.tracker.position(), self.tracker.pnl(), signal);
        if let Err(e) = self.reporter.record(&record) {
            error!("Failed to record iteration: {}", e);
        }
        debug!(
            realized = %round_money(record.realized_pnl),
            unrealized = %round_money(record.unrealized_pnl),
            "Iteration recorded"
        );
        outcome(record)
    }
}
