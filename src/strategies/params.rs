// src/strategies/params.rs
use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Raw `option -> value` map for one strategy, as supplied by the config
/// file or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyParams(BTreeMap<String, String>);

impl StrategyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    /// Parses `"key=value key2=value2"`. A token without `=` is a flag and
    /// is stored as `"true"`.
    pub fn parse_kwargs(input: &str) -> Self {
        let map = input
            .split_whitespace()
            .map(|token| match token.split_once('=') {
                Some((key, value)) => (key.to_string(), value.to_string()),
                None => (token.to_string(), "true".to_string()),
            })
            .collect();
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Binds the map to a strategy name so errors can say who failed.
    pub fn reader<'a>(&'a self, strategy: &'a str) -> ParamReader<'a> {
        ParamReader {
            strategy,
            params: self,
        }
    }
}

pub struct ParamReader<'a> {
    strategy: &'a str,
    params: &'a StrategyParams,
}

impl ParamReader<'_> {
    pub fn required<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self
            .params
            .get(key)
            .ok_or_else(|| ConfigError::MissingParameter {
                strategy: self.strategy.to_string(),
                key: key.to_string(),
            })?;
        self.parse(key, raw)
    }

    pub fn optional<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.params.get(key) {
            Some(raw) => self.parse(key, raw),
            None => Ok(default),
        }
    }

    /// A required decimal percentage in `0..=100`.
    pub fn percent(&self, key: &str) -> Result<Decimal, ConfigError> {
        let value: Decimal = self.required(key)?;
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
            return Err(self.invalid(key, value, "must be between 0 and 100"));
        }
        Ok(value)
    }

    pub fn invalid(&self, key: &str, value: impl ToString, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidParameter {
            strategy: self.strategy.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    fn parse<T>(&self, key: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| self.invalid(key, raw, e.to_string()))
    }
}
