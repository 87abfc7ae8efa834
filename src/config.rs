// src/config.rs

use crate::connectors::binance::{OrderRules, DEFAULT_BASE_URL};
use crate::core::engine::EngineSettings;
use crate::error::ConfigError;
use crate::notification::telegram::DEFAULT_API_URL;
use crate::notification::{Notifier, NotifierKind, NullNotifier, TelegramNotifier};
use crate::storage::ReportKind;
use crate::strategies::registry::StrategySpec;
use config::{Config, Environment, File, FileFormat};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Live,
    /// Simulated fills; the default so nothing trades by accident.
    #[default]
    Dry,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "dry" => Ok(RunMode::Dry),
            other => Err(format!("unknown mode '{other}' (expected live or dry)")),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => f.write_str("live"),
            RunMode::Dry => f.write_str("dry"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExchangeConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub secret_key: String,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            secret_key: String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationConfig {
    #[serde(default)]
    pub kind: NotifierKind,
    #[serde(default = "default_telegram_url")]
    pub api_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chat_id: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            api_url: default_telegram_url(),
            token: String::new(),
            chat_id: String::new(),
        }
    }
}

impl NotificationConfig {
    pub fn build(&self) -> Box<dyn Notifier> {
        match self.kind {
            NotifierKind::Telegram => Box::new(TelegramNotifier::new(&self.api_url, &self.token, self.chat_id.clone())),
            NotifierKind::Null => Box::new(NullNotifier),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub symbol: String,
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    pub order_size: Decimal,
    #[serde(default)]
    pub step_size: Decimal,
    #[serde(default)]
    pub tick_size: Decimal,
    #[serde(default = "default_min_notional")]
    pub min_notional: Decimal,
    #[serde(default = "default_slippage")]
    pub slippage: Decimal,
    #[serde(default)]
    pub report: ReportKind,
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    pub strategy: StrategySpec,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_telegram_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_interval_secs() -> u64 {
    60
}

fn default_min_notional() -> Decimal {
    Decimal::new(55, 1)
}

fn default_slippage() -> Decimal {
    Decimal::new(1, 3)
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl AppConfig {
    /// Reads `Settings.*` (or `path`), then `APP_*` environment overrides
    /// such as `APP_MODE=live` or `APP_EXCHANGE__API_KEY=...`.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path.unwrap_or("Settings")).required(path.is_some()))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Checks cross-field rules serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(invalid("symbol", &self.symbol));
        }
        if self.order_size <= Decimal::ZERO {
            return Err(invalid("order_size", self.order_size));
        }
        if self.step_size < Decimal::ZERO {
            return Err(invalid("step_size", self.step_size));
        }
        if self.tick_size < Decimal::ZERO {
            return Err(invalid("tick_size", self.tick_size));
        }
        if self.slippage < Decimal::ZERO || self.slippage >= Decimal::ONE {
            return Err(invalid("slippage", self.slippage));
        }
        if self.mode == RunMode::Live
            && (self.exchange.api_key.is_empty() || self.exchange.secret_key.is_empty())
        {
            return Err(ConfigError::InvalidSetting {
                field: "exchange credentials",
                value: "live mode needs api_key and secret_key".to_string(),
            });
        }
        if self.notification.kind == NotifierKind::Telegram
            && (self.notification.token.is_empty() || self.notification.chat_id.is_empty())
        {
            return Err(ConfigError::InvalidSetting {
                field: "notification",
                value: "telegram needs token and chat_id".to_string(),
            });
        }
        Ok(())
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            symbol: self.symbol.clone(),
            interval: Duration::from_secs(self.interval_secs),
            order_size: self.order_size,
            step_size: self.step_size,
            min_notional: self.min_notional,
            max_iterations: None,
        }
    }

    pub fn order_rules(&self) -> OrderRules {
        OrderRules {
            slippage: self.slippage,
            tick_size: self.tick_size,
        }
    }
}

fn invalid(field: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidSetting {
        field,
        value: value.to_string(),
    }
}
