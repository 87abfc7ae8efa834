// src/notification/mod.rs
pub mod telegram;

use crate::error::NotifyError;
use async_trait::async_trait;
use serde::Deserialize;

pub use telegram::TelegramNotifier;

/// Outbound human-readable alerts. Delivery is best effort: callers log a
/// failure and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), NotifyError>;
}

/// Drops every message.
#[derive(Debug, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Telegram,
    #[default]
    Null,
}
