// src/core/tracker.rs
use crate::error::TrackerError;
use crate::types::{Action, ClosedTrade, Fill, PnlState, Position, PositionSide};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Mark-to-market PnL of `position` at `price`. Zero while flat.
pub fn unrealized_pnl(position: &Position, price: Decimal) -> Decimal {
    match position.side() {
        PositionSide::Flat => Decimal::ZERO,
        PositionSide::Long => (price - position.entry_price()) * position.quantity(),
        PositionSide::Short => (position.entry_price() - price) * position.quantity(),
    }
}

/// Applies one action to the position/PnL pair.
///
/// The table is total: `hold` and actions with no matching row (adding to an
/// open side) return the inputs unchanged. Errors are reserved for fills that
/// break the single-lot contract.
pub fn apply_signal(
    position: Position,
    pnl: PnlState,
    action: Action,
    fill: Fill,
) -> Result<(Position, PnlState), TrackerError> {
    if !position.accepts(action) {
        return Ok((position, pnl));
    }

    match position.side() {
        PositionSide::Flat => {
            let side = match action {
                Action::Buy => PositionSide::Long,
                _ => PositionSide::Short,
            };
            let opened = Position::open(side, fill.quantity, fill.price)?;
            let pnl = PnlState {
                realized: pnl.realized,
                unrealized: unrealized_pnl(&opened, fill.price),
            };
            Ok((opened, pnl))
        }
        PositionSide::Long | PositionSide::Short => {
            if fill.price <= Decimal::ZERO {
                return Err(TrackerError::NonPositivePrice(fill.price));
            }
            if fill.quantity != position.quantity() {
                return Err(TrackerError::PartialClose {
                    open: position.quantity(),
                    fill: fill.quantity,
                });
            }
            let pnl = PnlState {
                realized: pnl.realized + unrealized_pnl(&position, fill.price),
                unrealized: Decimal::ZERO,
            };
            Ok((Position::flat(), pnl))
        }
    }
}

/// Owns the live position, the PnL accumulator and the closed-trade log.
#[derive(Debug, Default)]
pub struct PositionTracker {
    position: Position,
    pnl: PnlState,
    history: Vec<ClosedTrade>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn pnl(&self) -> &PnlState {
        &self.pnl
    }

    pub fn history(&self) -> &[ClosedTrade] {
        &self.history
    }

    /// Recomputes unrealized PnL at the latest observed price.
    pub fn mark(&mut self, price: Decimal) -> Decimal {
        self.pnl.unrealized = unrealized_pnl(&self.position, price);
        self.pnl.unrealized
    }

    /// Applies a filled action. Returns the trade it closed, if any.
    pub fn apply(
        &mut self,
        action: Action,
        fill: Fill,
        at: DateTime<Utc>,
    ) -> Result<Option<ClosedTrade>, TrackerError> {
        let before = self.position;
        let (position, pnl) = apply_signal(before, self.pnl, action, fill)?;

        let closed = if !before.is_flat() && position.is_flat() {
            let trade = ClosedTrade {
                side: before.side(),
                quantity: before.quantity(),
                entry_price: before.entry_price(),
                exit_price: fill.price,
                realized_pnl: pnl.realized - self.pnl.realized,
                closed_at: at,
            };
            self.history.push(trade.clone());
            Some(trade)
        } else {
            None
        };

        self.position = position;
        self.pnl = pnl;
        Ok(closed)
    }
}
