// src/error.rs
use rust_decimal::Decimal;
use thiserror::Error;

/// Startup-time configuration failures. Never raised once the loop runs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("strategy '{strategy}': missing required parameter '{key}'")]
    MissingParameter { strategy: String, key: String },

    #[error("strategy '{strategy}': invalid value '{value}' for '{key}': {reason}")]
    InvalidParameter {
        strategy: String,
        key: String,
        value: String,
        reason: String,
    },

    #[error("unknown strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },

    #[error("strategy '{0}' needs at least one child strategy")]
    EmptyComposite(String),

    #[error("invalid {field}: '{value}'")]
    InvalidSetting { field: &'static str, value: String },

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("market data unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("execution failed for {symbol}: {reason}")]
    Failed { symbol: String, reason: String },
}

/// Contract violations in a requested transition. These point at a bug in
/// the caller, so the engine surfaces them instead of correcting state.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrackerError {
    #[error("cannot open a position with side 'flat'")]
    OpenFlat,

    #[error("fill quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    #[error("fill price must be positive, got {0}")]
    NonPositivePrice(Decimal),

    #[error("close quantity {fill} does not match open quantity {open}")]
    PartialClose { open: Decimal, fill: Decimal },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(#[from] reqwest::Error),
}
