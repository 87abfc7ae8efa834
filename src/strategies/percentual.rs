// src/strategies/percentual.rs
use crate::error::ConfigError;
use crate::strategies::params::StrategyParams;
use crate::strategies::traits::Strategy;
use crate::types::{Position, PositionSide, Signal, Snapshot};
use rust_decimal::Decimal;

pub const NAME: &str = "percentual_position";

/// Goes long whenever flat and exits on a percentage move from entry:
/// a drop beyond `stop_loss_percentual` or a gain beyond `gain_treshold`.
pub struct PercentualPositionStrategy {
    stop_loss_percentual: Decimal,
    gain_threshold: Decimal,
}

impl PercentualPositionStrategy {
    pub fn new(stop_loss_percentual: Decimal, gain_threshold: Decimal) -> Self {
        Self {
            stop_loss_percentual,
            gain_threshold,
        }
    }

    pub fn from_params(params: &StrategyParams) -> Result<Self, ConfigError> {
        let reader = params.reader(NAME);
        let stop_loss = reader.percent("stop_loss_percentual")?;
        let gain: Decimal = reader.required("gain_treshold")?;
        if stop_loss.is_zero() {
            return Err(reader.invalid("stop_loss_percentual", stop_loss, "must be positive"));
        }
        if gain <= Decimal::ZERO {
            return Err(reader.invalid("gain_treshold", gain, "must be positive"));
        }
        Ok(Self::new(stop_loss, gain))
    }

    fn change_percent(entry: Decimal, price: Decimal) -> Decimal {
        (price - entry) / entry * Decimal::ONE_HUNDRED
    }
}

impl Strategy for PercentualPositionStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, snapshot: &Snapshot, position: &Position) -> Signal {
        match position.side() {
            PositionSide::Flat => Signal::buy().with_meta("reason", "entry"),
            PositionSide::Long => {
                let change = Self::change_percent(position.entry_price(), snapshot.price);
                let signal = if change < -self.stop_loss_percentual {
                    Signal::sell().with_meta("reason", "stop_loss")
                } else if change > self.gain_threshold {
                    Signal::sell().with_meta("reason", "gain")
                } else {
                    Signal::hold()
                };
                signal.with_meta("change_pct", change.round_dp(4))
            }
            // Never opens shorts, so it leaves one alone.
            PositionSide::Short => Signal::hold(),
        }
    }
}
