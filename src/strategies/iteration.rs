// src/strategies/iteration.rs
use crate::error::ConfigError;
use crate::strategies::params::StrategyParams;
use crate::strategies::traits::Strategy;
use crate::types::{Position, PositionSide, Signal, Snapshot};

pub const NAME: &str = "iteration";

/// Buys on the first call, sells once on call `sell_on_iteration`, then
/// holds forever. Used to smoke-test the whole pipeline.
pub struct IterationStrategy {
    sell_on_iteration: u64,
    calls: u64,
    sold: bool,
}

impl IterationStrategy {
    pub fn new(sell_on_iteration: u64) -> Self {
        Self {
            sell_on_iteration,
            calls: 0,
            sold: false,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, ConfigError> {
        let reader = params.reader(NAME);
        let sell_on_iteration: u64 = reader.optional("sell_on_iteration", 5)?;
        if sell_on_iteration < 2 {
            return Err(reader.invalid(
                "sell_on_iteration",
                sell_on_iteration,
                "must be at least 2 (call 1 is the buy)",
            ));
        }
        Ok(Self::new(sell_on_iteration))
    }
}

impl Strategy for IterationStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, _snapshot: &Snapshot, position: &Position) -> Signal {
        self.calls += 1;

        if self.calls == 1 && position.is_flat() {
            return Signal::buy().with_meta("iteration", self.calls);
        }

        // Only closes a long it opened; never turns a missed buy into a short.
        if !self.sold && self.calls >= self.sell_on_iteration && position.side() == PositionSide::Long {
            self.sold = true;
            return Signal::sell().with_meta("iteration", self.calls);
        }

        Signal::hold().with_meta("iteration", self.calls)
    }
}
