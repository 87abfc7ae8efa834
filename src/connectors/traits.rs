// src/connectors/traits.rs
use crate::error::{ExecutionError, MarketError};
use crate::types::{Action, Fill};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Latest price for `symbol`. Failure means "skip this iteration".
    async fn get_price(&self, symbol: &str) -> Result<Decimal, MarketError>;
}

#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Places one order and reports what was filled.
    ///
    /// At-most-once: callers never retry a failed call, because the remote
    /// side may already have acted on it. `reference_price` is the snapshot
    /// price the decision was made at.
    async fn execute(
        &self,
        symbol: &str,
        action: Action,
        quantity: Decimal,
        reference_price: Decimal,
    ) -> Result<Fill, ExecutionError>;
}
