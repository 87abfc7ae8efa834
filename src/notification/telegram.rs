// src/notification/telegram.rs
use crate::error::NotifyError;
use crate::notification::Notifier;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Posts messages to one chat through the Bot API `sendMessage` method.
#[derive(Clone)]
pub struct TelegramNotifier {
    http_client: Client,
    chat_id: String,
    endpoint: String,
}

impl TelegramNotifier {
    pub fn new(api_url: &str, token: &str, chat_id: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            chat_id: chat_id.into(),
            endpoint: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<(), NotifyError> {
        self.http_client
            .post(&self.endpoint)
            .form(&[("chat_id", self.chat_id.as_str()), ("text", message)])
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
