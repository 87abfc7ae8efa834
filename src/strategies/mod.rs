pub mod composite;
pub mod iteration;
pub mod params;
pub mod percentual;
pub mod random;
pub mod registry;
pub mod traits;

pub use composite::{AgreementMode, CompositeStrategy};
pub use iteration::IterationStrategy;
pub use params::StrategyParams;
pub use percentual::PercentualPositionStrategy;
pub use random::{ChanceRoller, RandomStrategy, RngRoller};
pub use registry::{build_strategy, build_strategy_with, StrategySpec};
pub use traits::{BoxedStrategy, Strategy};
