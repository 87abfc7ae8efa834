// src/strategies/composite.rs
use crate::error::ConfigError;
use crate::strategies::params::StrategyParams;
use crate::strategies::traits::{BoxedStrategy, Strategy};
use crate::types::{Action, Position, Signal, Snapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NAME: &str = "composite";

/// How many children must agree on an action for the composite to emit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementMode {
    /// Every child voted for the action. No votes never satisfies it.
    All,
    /// At least one child voted for the action.
    Any,
}

impl AgreementMode {
    pub fn is_satisfied(&self, votes: usize, children: usize) -> bool {
        match self {
            AgreementMode::All => children > 0 && votes == children,
            AgreementMode::Any => votes > 0,
        }
    }
}

impl FromStr for AgreementMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(AgreementMode::All),
            "any" => Ok(AgreementMode::Any),
            other => Err(format!("expected 'all' or 'any', got '{other}'")),
        }
    }
}

impl fmt::Display for AgreementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgreementMode::All => f.write_str("all"),
            AgreementMode::Any => f.write_str("any"),
        }
    }
}

/// Aggregates an ordered, owned list of child strategies.
///
/// Sell is checked before buy: when both modes are satisfied in the same
/// call the composite protects the open position rather than adding exposure.
pub struct CompositeStrategy {
    children: Vec<BoxedStrategy>,
    buy_mode: AgreementMode,
    sell_mode: AgreementMode,
}

impl CompositeStrategy {
    pub fn new(children: Vec<BoxedStrategy>, buy_mode: AgreementMode, sell_mode: AgreementMode) -> Self {
        Self {
            children,
            buy_mode,
            sell_mode,
        }
    }

    pub fn from_params(params: &StrategyParams, children: Vec<BoxedStrategy>) -> Result<Self, ConfigError> {
        if children.is_empty() {
            return Err(ConfigError::EmptyComposite(NAME.to_string()));
        }
        let reader = params.reader(NAME);
        let buy_mode = reader.optional("buy_mode", AgreementMode::All)?;
        let sell_mode = reader.optional("sell_mode", AgreementMode::Any)?;
        Ok(Self::new(children, buy_mode, sell_mode))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Strategy for CompositeStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn decide(&mut self, snapshot: &Snapshot, position: &Position) -> Signal {
        let mut buys = 0;
        let mut sells = 0;
        let mut votes = Vec::with_capacity(self.children.len());

        // Every child is consulted, even once the outcome is known, so
        // stateful children keep counting.
        for (index, child) in self.children.iter_mut().enumerate() {
            let vote = child.decide(snapshot, position);
            match vote.action {
                Action::Buy => buys += 1,
                Action::Sell => sells += 1,
                Action::Hold => {}
            }
            votes.push((format!("{}.{}", index, child.name()), vote.action));
        }

        let total = self.children.len();
        let action = if self.sell_mode.is_satisfied(sells, total) {
            Action::Sell
        } else if self.buy_mode.is_satisfied(buys, total) {
            Action::Buy
        } else {
            Action::Hold
        };

        votes
            .into_iter()
            .fold(Signal::new(action), |signal, (key, vote)| signal.with_meta(key, vote))
    }
}
