//! Ingestion transport settings.

use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;

/// How webhook payloads reach the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// `POST /webhook/tradingview` on `bind_addr`
    Http,
    /// One JSON payload per line on stdin
    Stdin,
}

#[derive(Debug, Clone)]
pub struct ServerEnvConfig {
    pub ingest_mode: IngestMode,
    pub bind_addr: SocketAddr,
}

impl ServerEnvConfig {
    pub fn from_env() -> Result<Self> {
        let ingest_mode = match env::var("INGEST_MODE")
            .unwrap_or_else(|_| "http".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "http" => IngestMode::Http,
            "stdin" => IngestMode::Stdin,
            other => anyhow::bail!("Invalid INGEST_MODE '{}': expected http or stdin", other),
        };

        let bind_addr = env::var("WEBHOOK_BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8000".to_string())
            .parse::<SocketAddr>()
            .context("Failed to parse WEBHOOK_BIND_ADDR")?;

        Ok(Self {
            ingest_mode,
            bind_addr,
        })
    }
}
