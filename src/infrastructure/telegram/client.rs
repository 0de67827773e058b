use crate::config::TelegramEnvConfig;
use crate::domain::errors::NotificationError;
use crate::domain::ports::NotificationService;
use crate::domain::resonance::Destination;
use crate::infrastructure::http_client_factory::HttpClientFactory;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
    message_thread_id: i64,
}

/// Posts alerts to a Telegram forum chat, one topic per destination
pub struct TelegramNotifier {
    client: Client,
    send_url: String,
    chat_id: String,
    request_timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramEnvConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);
        Self::with_client(
            HttpClientFactory::create_client(timeout),
            timeout,
            &config.api_base_url,
            &config.bot_token,
            &config.chat_id,
        )
    }

    pub fn with_client(
        client: Client,
        request_timeout: Duration,
        api_base_url: &str,
        bot_token: &str,
        chat_id: &str,
    ) -> Self {
        Self {
            client,
            request_timeout,
            send_url: format!(
                "{}/bot{}/sendMessage",
                api_base_url.trim_end_matches('/'),
                bot_token
            ),
            chat_id: chat_id.to_string(),
        }
    }

    fn request<'a>(&'a self, destination: Destination, text: &'a str) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id: &self.chat_id,
            text,
            disable_web_page_preview: true,
            message_thread_id: destination.topic_id,
        }
    }
}

#[async_trait]
impl NotificationService for TelegramNotifier {
    async fn send(&self, destination: Destination, text: &str) -> Result<(), NotificationError> {
        let response = self
            .client
            .post(&self.send_url)
            .json(&self.request(destination, text))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotificationError::Timeout {
                        duration_ms: self.request_timeout.as_millis() as u64,
                    }
                } else {
                    // reqwest errors can embed the URL, which carries the bot token
                    NotificationError::Transport {
                        reason: e.without_url().to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Telegram accepted message for {}", destination);
        Ok(())
    }
}
