//! Telegram bot notifier.

use super::retry::{is_transient_http, RetryPolicy};
use crate::error::NotificationError;
use crate::models::config::{NetworkConfig, TelegramConfig};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Map a failed Bot API answer to a notification error.
pub fn classify_failure(status: u16, description: &str) -> NotificationError {
    match status {
        401 => NotificationError::InvalidToken,
        403 => NotificationError::Forbidden(description.to_string()),
        400 if description.to_lowercase().contains("chat not found") => {
            NotificationError::ChatNotFound
        }
        400 => NotificationError::BadRequest(description.to_string()),
        404 if description.eq_ignore_ascii_case("not found") => NotificationError::InvalidToken,
        _ => NotificationError::Unexpected {
            status,
            description: description.to_string(),
        },
    }
}

/// Join share links into one message line.
pub fn format_links_message(links: &[String]) -> String {
    links.join(" ")
}

/// Sends messages to one chat through a bot.
pub struct TelegramNotifier {
    api_url: String,
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl TelegramNotifier {
    /// Create a notifier; bot token and chat ID are required.
    pub fn new(config: &TelegramConfig, network: &NetworkConfig) -> Result<Self> {
        let bot_token = config.bot_token.clone().ok_or_else(|| {
            crate::Error::Config("Telegram bot token not configured. Set TELEGRAM_BOT_TOKEN".to_string())
        })?;
        let chat_id = config.chat_id.clone().ok_or_else(|| {
            crate::Error::Config("Telegram chat ID not configured. Set TELEGRAM_CHAT_ID".to_string())
        })?;

        Ok(Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
            client: reqwest::Client::builder()
                .connect_timeout(network.timeout())
                .build()?,
            timeout: network.timeout(),
            retry: RetryPolicy::from_config(network),
        })
    }

    /// Send a text message to the configured chat.
    pub async fn send_message(&self, text: &str) -> std::result::Result<(), NotificationError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let payload = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        let response = self
            .retry
            .run("Telegram sendMessage", is_transient_http, || {
                self.client
                    .post(&url)
                    .timeout(self.timeout)
                    .json(&payload)
                    .send()
            })
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body: Option<BotApiResponse> = response.json().await.ok();
        match body {
            Some(body) if body.ok => {
                tracing::info!("Telegram message sent to chat {}", self.chat_id);
                Ok(())
            }
            body => {
                let description = body.and_then(|b| b.description).unwrap_or_default();
                let err = classify_failure(status, &description);
                tracing::error!("Telegram sendMessage failed: {}", err);
                Err(err)
            }
        }
    }
}
