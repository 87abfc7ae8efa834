// src/connectors/messages.rs
use rust_decimal::Decimal;
use serde::Deserialize;

/// Response of `GET /api/v3/ticker/price?symbol=<symbol>`.
#[derive(Debug, Deserialize)]
pub struct BinanceTickerPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Response of `POST /api/v3/order` with `newOrderRespType=RESULT`.
/// Binance sends every decimal as a string.
#[derive(Debug, Deserialize)]
pub struct BinanceOrderResult {
    #[serde(rename = "orderId")]
    pub order_id: u64,

    pub symbol: String,

    pub status: String,

    #[serde(rename = "executedQty")]
    pub executed_qty: Decimal,

    #[serde(rename = "cummulativeQuoteQty")]
    pub cummulative_quote_qty: Decimal,
}

impl BinanceOrderResult {
    /// Volume-weighted fill price, `None` when nothing executed.
    pub fn average_price(&self) -> Option<Decimal> {
        if self.executed_qty.is_zero() {
            return None;
        }
        Some(self.cummulative_quote_qty / self.executed_qty)
    }
}
