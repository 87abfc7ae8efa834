// src/types.rs
use crate::error::TrackerError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What a strategy wants to do on the current iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "buy",
            Action::Sell => "sell",
            Action::Hold => "hold",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSide {
    Flat,
    Long,
    Short,
}

impl PositionSide {
    /// Label used in report rows; flat is written as an empty field.
    pub fn label(&self) -> &'static str {
        match self {
            PositionSide::Flat => "",
            PositionSide::Long => "long",
            PositionSide::Short => "short",
        }
    }
}

/// One price observation. Produced once per iteration and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    pub price: Decimal,
    pub observed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(symbol: impl Into<String>, price: Decimal, observed_at: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            observed_at,
        }
    }
}

/// Current exposure on the traded symbol.
///
/// Fields are private so the `quantity == 0 <=> side == Flat` invariant can
/// only be established through [`Position::flat`] and [`Position::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    side: PositionSide,
    quantity: Decimal,
    entry_price: Decimal,
}

impl Position {
    pub const fn flat() -> Self {
        Self {
            side: PositionSide::Flat,
            quantity: Decimal::ZERO,
            entry_price: Decimal::ZERO,
        }
    }

    pub fn open(
        side: PositionSide,
        quantity: Decimal,
        entry_price: Decimal,
    ) -> Result<Self, TrackerError> {
        if side == PositionSide::Flat {
            return Err(TrackerError::OpenFlat);
        }
        if quantity <= Decimal::ZERO {
            return Err(TrackerError::NonPositiveQuantity(quantity));
        }
        if entry_price <= Decimal::ZERO {
            return Err(TrackerError::NonPositivePrice(entry_price));
        }
        Ok(Self {
            side,
            quantity,
            entry_price,
        })
    }

    pub fn side(&self) -> PositionSide {
        self.side
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    /// Zero while flat.
    pub fn entry_price(&self) -> Decimal {
        self.entry_price
    }

    pub fn is_flat(&self) -> bool {
        self.side == PositionSide::Flat
    }

    /// Whether `action` maps to a row of the transition table: open from
    /// flat, or close the opposite side. Adding to an open side never does.
    pub fn accepts(&self, action: Action) -> bool {
        matches!(
            (self.side, action),
            (PositionSide::Flat, Action::Buy)
                | (PositionSide::Flat, Action::Sell)
                | (PositionSide::Long, Action::Sell)
                | (PositionSide::Short, Action::Buy)
        )
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::flat()
    }
}

/// Running profit and loss paired with the current position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PnlState {
    pub realized: Decimal,
    pub unrealized: Decimal,
}

/// A strategy decision plus whatever the strategy wants logged with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signal {
    pub action: Action,
    pub metadata: BTreeMap<String, String>,
}

impl Signal {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            metadata: BTreeMap::new(),
        }
    }

    pub fn buy() -> Self {
        Self::new(Action::Buy)
    }

    pub fn sell() -> Self {
        Self::new(Action::Sell)
    }

    pub fn hold() -> Self {
        Self::new(Action::Hold)
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.metadata.insert(key.into(), value.to_string());
        self
    }
}

/// Price and size the execution side actually obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill {
    pub price: Decimal,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub side: PositionSide,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub exit_price: Decimal,
    pub realized_pnl: Decimal,
    pub closed_at: DateTime<Utc>,
}

/// One row per completed iteration, handed to the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub price: Decimal,
    pub position_side: PositionSide,
    pub position_quantity: Decimal,
    pub position_entry_price: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub signal: Option<Action>,
}

impl ReportRecord {
    pub fn new(
        snapshot: &Snapshot,
        position: &Position,
        pnl: &PnlState,
        signal: Option<Action>,
    ) -> Self {
        Self {
            timestamp: snapshot.observed_at,
            symbol: snapshot.symbol.clone(),
            price: snapshot.price,
            position_side: position.side(),
            position_quantity: position.quantity(),
            position_entry_price: position.entry_price(),
            unrealized_pnl: pnl.unrealized,
            realized_pnl: pnl.realized,
            signal,
        }
    }
}
