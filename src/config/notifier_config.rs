//! Notification channel configuration parsing from environment variables.
//!
//! The bot token and chat id are mandatory; startup fails without them.

use crate::domain::errors::ConfigError;
use anyhow::{Context, Result};
use std::env;

const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Telegram environment configuration
#[derive(Clone)]
pub struct TelegramEnvConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

// Keep the bot token out of logs
impl std::fmt::Debug for TelegramEnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramEnvConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base_url", &self.api_base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl TelegramEnvConfig {
    pub fn from_env() -> Result<Self> {
        let bot_token = required("TG_BOT_TOKEN")?;
        let chat_id = required("TG_CHAT_ID")?;

        let api_base_url = env::var("TG_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_seconds = env::var("NOTIFY_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .context("Failed to parse NOTIFY_TIMEOUT_SECONDS")?;
        if timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                key: "NOTIFY_TIMEOUT_SECONDS".to_string(),
                reason: "must be at least 1 second".to_string(),
            }
            .into());
        }

        Ok(Self {
            bot_token,
            chat_id,
            api_base_url,
            timeout_seconds,
        })
    }
}

fn required(key: &str) -> Result<String> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingKey {
            key: key.to_string(),
        }
        .into()),
    }
}
