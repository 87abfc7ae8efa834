//! Periodic single-symbol trading agent: poll a price, ask a strategy what
//! to do, execute through a live or simulated gateway, and report every
//! iteration.

pub mod config;
pub mod connectors;
pub mod core;
pub mod error;
pub mod notification;
pub mod storage;
pub mod strategies;
pub mod types;
pub mod utils;

pub use crate::config::{AppConfig, RunMode};
pub use crate::core::{PositionTracker, SessionSummary, StepOutcome, TradingEngine};
pub use crate::types::{Action, Position, PositionSide, Signal, Snapshot};
