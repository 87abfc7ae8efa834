// src/strategies/registry.rs
use crate::error::ConfigError;
use crate::strategies::composite::{self, CompositeStrategy};
use crate::strategies::iteration::{self, IterationStrategy};
use crate::strategies::params::StrategyParams;
use crate::strategies::percentual::{self, PercentualPositionStrategy};
use crate::strategies::random::{self, ChanceRoller, RandomStrategy, RngRoller};
use crate::strategies::traits::BoxedStrategy;
use serde::{Deserialize, Serialize};

pub const AVAILABLE: &[&str] = &[
    iteration::NAME,
    random::NAME,
    percentual::NAME,
    composite::NAME,
];

/// One node of the strategy tree as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub kind: String,
    #[serde(default)]
    pub params: StrategyParams,
    #[serde(default)]
    pub children: Vec<StrategySpec>,
}

impl StrategySpec {
    pub fn new(kind: impl Into<String>, params: StrategyParams) -> Self {
        Self {
            kind: kind.into(),
            params,
            children: Vec::new(),
        }
    }

    pub fn with_child(mut self, child: StrategySpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Builds the strategy tree with entropy-seeded randomness.
pub fn build_strategy(spec: &StrategySpec) -> Result<BoxedStrategy, ConfigError> {
    build_strategy_with(spec, &mut || -> Box<dyn ChanceRoller> {
        Box::new(RngRoller::from_entropy())
    })
}

/// Builds the strategy tree, asking `rollers` for one roller per random node.
pub fn build_strategy_with(
    spec: &StrategySpec,
    rollers: &mut dyn FnMut() -> Box<dyn ChanceRoller>,
) -> Result<BoxedStrategy, ConfigError> {
    let kind = spec.kind.trim();
    if kind != composite::NAME && !spec.children.is_empty() {
        return Err(spec.params.reader(kind).invalid(
            "children",
            spec.children.len(),
            "only composite strategies take children",
        ));
    }

    let strategy: BoxedStrategy = match kind {
        iteration::NAME => Box::new(IterationStrategy::from_params(&spec.params)?),
        random::NAME => Box::new(RandomStrategy::from_params(&spec.params, rollers())?),
        percentual::NAME => Box::new(PercentualPositionStrategy::from_params(&spec.params)?),
        composite::NAME => {
            let children = spec
                .children
                .iter()
                .map(|child| build_strategy_with(child, rollers))
                .collect::<Result<Vec<_>, _>>()?;
            Box::new(CompositeStrategy::from_params(&spec.params, children)?)
        }
        other => {
            return Err(ConfigError::UnknownStrategy {
                name: other.to_string(),
                available: AVAILABLE.join(", "),
            })
        }
    };
    Ok(strategy)
}
