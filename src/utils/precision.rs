// src/utils/precision.rs
use rust_decimal::Decimal;

/// Decimal places of every monetary field written at the reporting boundary.
pub const MONEY_DP: u32 = 2;

/// Rounds the quantity DOWN to the nearest multiple of `step_size`.
/// Example: amount=10.999, step=1.0 -> 10.0
pub fn normalize_quantity(amount: Decimal, step_size: Decimal) -> Decimal {
    if step_size.is_zero() {
        return amount;
    }
    (amount / step_size).floor() * step_size
}

/// Rounds the price to the NEAREST multiple of `tick_size`.
/// Example: price=100.16, tick=0.1 -> 100.2
pub fn normalize_price(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size.is_zero() {
        return price;
    }
    (price / tick_size).round() * tick_size
}

/// Reporting-boundary rounding. Internal accumulation never calls this.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp(MONEY_DP)
}
