// src/core/summary.rs
use crate::core::tracker::{unrealized_pnl, PositionTracker};
use crate::types::{ClosedTrade, Position};
use crate::utils::precision::round_money;
use rust_decimal::{Decimal, MathematicalOps};
use tracing::info;

/// Counters the engine keeps while running.
#[derive(Debug, Default, Clone)]
pub struct SessionStats {
    pub iterations: u64,
    pub skipped: u64,
    pub failed_executions: u64,
    pub first_price: Option<Decimal>,
    pub last_price: Option<Decimal>,
    /// The first position opened this session; its size drives the
    /// buy-and-hold comparison.
    pub first_entry: Option<Position>,
}

impl SessionStats {
    pub fn observe(&mut self, price: Decimal) {
        self.first_price.get_or_insert(price);
        self.last_price = Some(price);
    }

    pub fn opened(&mut self, position: Position) {
        self.first_entry.get_or_insert(position);
    }
}

fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

/// Sample standard deviation (n - 1); zero below two values.
fn sample_std_dev(values: &[Decimal]) -> Decimal {
    if values.len() < 2 {
        return Decimal::ZERO;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (*v - m) * (*v - m)).sum::<Decimal>()
        / Decimal::from(values.len() - 1);
    variance.sqrt().unwrap_or(Decimal::ZERO)
}

/// Per-trade profitability over closed trades.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeStats {
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
    /// `|avg_win| / |avg_loss|`, zero without losses.
    pub payoff: Decimal,
    /// Mean PnL over winning and losing trades.
    pub expectancy: Decimal,
    pub greatest_gain: Decimal,
    pub greatest_loss: Decimal,
}

impl TradeStats {
    pub fn from_trades(trades: &[ClosedTrade]) -> Self {
        let wins: Vec<Decimal> = trades
            .iter()
            .map(|t| t.realized_pnl)
            .filter(|pnl| *pnl > Decimal::ZERO)
            .collect();
        let losses: Vec<Decimal> = trades
            .iter()
            .map(|t| t.realized_pnl)
            .filter(|pnl| *pnl < Decimal::ZERO)
            .collect();

        let avg_win = mean(&wins);
        let avg_loss = mean(&losses);
        let payoff = if avg_loss.is_zero() {
            Decimal::ZERO
        } else {
            avg_win.abs() / avg_loss.abs()
        };
        let decided: Vec<Decimal> = wins.iter().chain(losses.iter()).copied().collect();

        Self {
            avg_win,
            avg_loss,
            payoff,
            expectancy: mean(&decided),
            greatest_gain: wins.iter().copied().max().unwrap_or(Decimal::ZERO),
            greatest_loss: losses.iter().copied().min().unwrap_or(Decimal::ZERO),
        }
    }
}

/// Risk figures over the realized-PnL capital curve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskStats {
    /// Cumulative realized PnL after each closed trade.
    pub capital_curve: Vec<Decimal>,
    pub max_drawdown: Decimal,
    pub volatility: Decimal,
    /// `mean / volatility * sqrt(n)`; zero when volatility is zero.
    pub sharpe: Decimal,
}

impl RiskStats {
    pub fn from_trades(trades: &[ClosedTrade]) -> Self {
        let pnls: Vec<Decimal> = trades.iter().map(|t| t.realized_pnl).collect();

        let capital_curve: Vec<Decimal> = pnls
            .iter()
            .scan(Decimal::ZERO, |capital, pnl| {
                *capital += *pnl;
                Some(*capital)
            })
            .collect();

        let mut max_drawdown = Decimal::ZERO;
        if let Some(&first) = capital_curve.first() {
            let mut peak = first;
            for &value in &capital_curve {
                peak = peak.max(value);
                max_drawdown = max_drawdown.max(peak - value);
            }
        }

        let volatility = sample_std_dev(&pnls);
        let sharpe = if volatility.is_zero() || pnls.is_empty() {
            Decimal::ZERO
        } else {
            let scale = Decimal::from(pnls.len()).sqrt().unwrap_or(Decimal::ZERO);
            mean(&pnls) / volatility * scale
        };

        Self {
            capital_curve,
            max_drawdown,
            volatility,
            sharpe,
        }
    }

    pub fn final_capital(&self) -> Decimal {
        self.capital_curve.last().copied().unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub iterations: u64,
    pub skipped: u64,
    pub failed_executions: u64,
    pub trades_closed: usize,
    pub profitable_trades: usize,
    pub first_price: Option<Decimal>,
    pub last_price: Option<Decimal>,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    /// PnL of buying the first trade's quantity at the first observed price
    /// and holding it to the last one.
    pub hold_pnl: Option<Decimal>,
    pub trade_stats: TradeStats,
    pub risk: RiskStats,
}

impl SessionSummary {
    pub fn build(stats: &SessionStats, tracker: &PositionTracker) -> Self {
        let history = tracker.history();
        let unrealized = match stats.last_price {
            Some(price) => unrealized_pnl(tracker.position(), price),
            None => Decimal::ZERO,
        };
        let hold_pnl = match (stats.first_entry, stats.first_price, stats.last_price) {
            (Some(entry), Some(first), Some(last)) => Some((last - first) * entry.quantity()),
            _ => None,
        };

        Self {
            iterations: stats.iterations,
            skipped: stats.skipped,
            failed_executions: stats.failed_executions,
            trades_closed: history.len(),
            profitable_trades: history.iter().filter(|t| t.realized_pnl > Decimal::ZERO).count(),
            first_price: stats.first_price,
            last_price: stats.last_price,
            realized_pnl: tracker.pnl().realized,
            unrealized_pnl: unrealized,
            hold_pnl,
            trade_stats: TradeStats::from_trades(history),
            risk: RiskStats::from_trades(history),
        }
    }

    pub fn total_pnl(&self) -> Decimal {
        self.realized_pnl + self.unrealized_pnl
    }

    pub fn price_variation(&self) -> Option<Decimal> {
        Some(self.last_price? - self.first_price?)
    }

    pub fn log(&self) {
        info!(
            iterations = self.iterations,
            skipped = self.skipped,
            failed_executions = self.failed_executions,
            "Session finished"
        );
        if let Some(variation) = self.price_variation() {
            info!(variation = %round_money(variation), "Price variation");
        }
        info!(
            closed = self.trades_closed,
            profitable = self.profitable_trades,
            realized = %round_money(self.realized_pnl),
            unrealized = %round_money(self.unrealized_pnl),
            "Trading result"
        );

        let trades = &self.trade_stats;
        info!(
            avg_win = %round_money(trades.avg_win),
            avg_loss = %round_money(trades.avg_loss),
            payoff = %trades.payoff.round_dp(2),
            expectancy = %round_money(trades.expectancy),
            greatest_gain = %round_money(trades.greatest_gain),
            greatest_loss = %round_money(trades.greatest_loss),
            "Trade stats"
        );
        info!(
            final_capital = %round_money(self.risk.final_capital()),
            max_drawdown = %round_money(self.risk.max_drawdown),
            volatility = %round_money(self.risk.volatility),
            sharpe = %self.risk.sharpe.round_dp(2),
            "Risk stats"
        );

        match self.hold_pnl {
            Some(hold) => {
                let difference = hold - self.total_pnl();
                info!(
                    hold = %round_money(hold),
                    trading = %round_money(self.total_pnl()),
                    "Buy-and-hold comparison"
                );
                if difference > Decimal::ZERO {
                    info!("Holding would have been better by {}", round_money(difference));
                } else if difference < Decimal::ZERO {
                    info!("Trading beat holding by {}", round_money(difference.abs()));
                } else {
                    info!("Trading and holding ended even");
                }
            }
            None => info!("Buy-and-hold comparison: no position was opened"),
        }
    }
}
