use super::models::{SendMessageRequest, TelegramResponse, PARSE_MODE};
use crate::config::TelegramConfig;
use crate::error::{env_error, telegram_error, BotResult};
use reqwest::Client;
use tracing::{error, info};

/// Posts messages to one Telegram chat
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Send `text`; `true` only if Telegram acknowledged it.
    /// Failures are logged, never returned.
    pub async fn send(&self, text: &str) -> bool {
        match self.try_send(text).await {
            Ok(()) => {
                info!("Message sent successfully to Telegram");
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Send `text`, reporting why delivery failed
    pub async fn try_send(&self, text: &str) -> BotResult<()> {
        let bot_token = self
            .config
            .bot_token
            .as_deref()
            .ok_or_else(|| env_error("TELEGRAM_BOT_TOKEN"))?;
        let chat_id = self
            .config
            .chat_id
            .as_deref()
            .ok_or_else(|| env_error("TELEGRAM_CHAT_ID"))?;

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            bot_token
        );
        let payload = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        // The URL carries the bot token, keep it out of error messages
        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                telegram_error(&format!(
                    "Error sending message to Telegram: {}",
                    e.without_url()
                ))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            telegram_error(&format!(
                "Error reading Telegram response: {}",
                e.without_url()
            ))
        })?;
        let reply = serde_json::from_str::<TelegramResponse>(&body);

        if !status.is_success() {
            let description = reply
                .ok()
                .and_then(|r| r.description)
                .unwrap_or(body);
            return Err(telegram_error(&format!(
                "Failed to send message: HTTP {} - {}",
                status, description
            )));
        }

        let reply = reply.map_err(|e| {
            telegram_error(&format!("Failed to parse Telegram response: {}", e))
        })?;
        if !reply.ok {
            return Err(telegram_error(&format!(
                "Failed to send message: {}",
                reply.description.as_deref().unwrap_or("Unknown error")
            )));
        }

        Ok(())
    }
}
