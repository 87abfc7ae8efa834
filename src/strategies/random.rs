// src/strategies/random.rs
use crate::error::ConfigError;
use crate::strategies::params::StrategyParams;
use crate::strategies::traits::Strategy;
use crate::types::{Position, PositionSide, Signal, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const NAME: &str = "random";

/// Source of percentile rolls. An event with chance `c` fires when the roll
/// is below `c`, so 0 never fires and 100 always does.
pub trait ChanceRoller: Send {
    /// Uniform in `0..100`.
    fn roll(&mut self) -> u32;
}

pub struct RngRoller<R>(R);

impl<R: Rng + Send> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl RngRoller<StdRng> {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> ChanceRoller for RngRoller<R> {
    fn roll(&mut self) -> u32 {
        self.0.gen_range(0..100)
    }
}

/// Stress-tests the state machine with independent buy/sell draws.
pub struct RandomStrategy {
    buy_chance: u32,
    sell_chance: u32,
    roller: Box<dyn ChanceRoller>,
}

impl RandomStrategy {
    pub fn new(buy_chance: u32, sell_chance: u32, roller: Box<dyn ChanceRoller>) -> Self {
        Self {
            buy_chance,
            sell_chance,
            roller,
        }
    }

    pub fn from_params(
        params: &StrategyParams,
        roller: Box<dyn ChanceRoller>,
    ) -> Result<Self, ConfigError> {
        let reader = params.reader(NAME);
        let buy_chance: u32 = reader.required("buy_chance")?;
        let sell_chance: u32 = reader.required("sell_chance")?;
        for (key, value) in [("buy_chance", buy_chance), ("sell_chance", sell_chance)] {
            if value > 100 {
                return Err(reader.invalid(key, value, "must be between 0 and 100"));
            }
        }
        Ok(Self::new(buy_chance, sell_chance, roller))
    }
}

impl Strategy for RandomStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, _snapshot: &Snapshot, position: &Position) -> Signal {
        // Both draws always happen so the roll sequence does not depend on state.
        let buy_roll = self.roller.roll();
        let sell_roll = self.roller.roll();
        let buy = buy_roll < self.buy_chance;
        let sell = sell_roll < self.sell_chance;

        let signal = match position.side() {
            PositionSide::Flat if buy => Signal::buy(),
            PositionSide::Flat if sell => Signal::sell(),
            PositionSide::Long if sell => Signal::sell(),
            PositionSide::Short if buy => Signal::buy(),
            _ => Signal::hold(),
        };
        signal
            .with_meta("buy_roll", buy_roll)
            .with_meta("sell_roll", sell_roll)
    }
}
