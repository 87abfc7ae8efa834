pub mod binance;
pub mod messages;
pub mod paper;
pub mod replay;
pub mod traits;

pub use binance::{BinanceClient, OrderRules};
pub use paper::PaperGateway;
pub use replay::ReplayMarket;
pub use traits::{ExecutionGateway, MarketSource};
