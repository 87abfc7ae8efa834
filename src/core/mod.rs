pub mod engine;
pub mod summary;
pub mod tracker;

pub use engine::{EngineSettings, StepOutcome, TradingEngine};
pub use summary::{RiskStats, SessionStats, SessionSummary, TradeStats};
pub use tracker::{apply_signal, unrealized_pnl, PositionTracker};
