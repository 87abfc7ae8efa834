// src/connectors/paper.rs
use crate::connectors::traits::ExecutionGateway;
use crate::error::ExecutionError;
use crate::types::{Action, Fill};
use crate::utils::precision::normalize_price;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Dry-run gateway: fills every order in full at the reference price.
/// Deterministic, so replays produce identical reports.
#[derive(Debug, Default)]
pub struct PaperGateway {
    tick_size: Decimal,
    orders: AtomicU64,
}

impl PaperGateway {
    pub fn new(tick_size: Decimal) -> Self {
        Self {
            tick_size,
            orders: AtomicU64::new(0),
        }
    }

    pub fn orders_filled(&self) -> u64 {
        self.orders.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExecutionGateway for PaperGateway {
    async fn execute(
        &self,
        symbol: &str,
        action: Action,
        quantity: Decimal,
        reference_price: Decimal,
    ) -> Result<Fill, ExecutionError> {
        if action == Action::Hold {
            return Err(ExecutionError::Failed {
                symbol: symbol.to_string(),
                reason: "hold is not an order".to_string(),
            });
        }
        if reference_price <= Decimal::ZERO {
            return Err(ExecutionError::Failed {
                symbol: symbol.to_string(),
                reason: format!("non-positive reference price {}", reference_price),
            });
        }
        // Quotes finer than the tick would round to zero; fill at the raw quote.
        let price = match normalize_price(reference_price, self.tick_size) {
            normalized if normalized > Decimal::ZERO => normalized,
            _ => reference_price,
        };
        let order_no = self.orders.fetch_add(1, Ordering::Relaxed) + 1;
        info!(symbol, %action, %quantity, %price, order_no, "Paper fill");
        Ok(Fill { price, quantity })
    }
}
