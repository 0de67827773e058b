//! Resonance notifier - headless alert relay
//!
//! Receives TradingView webhook alerts, tracks multi-timeframe oscillator
//! resonance per symbol, and posts alerts to Telegram forum topics.
//!
//! # Usage
//! ```sh
//! RESONANCE_CONFIG_PATH=config/resonance.toml cargo run
//! ```
//!
//! # Environment Variables
//! - `TG_BOT_TOKEN`, `TG_CHAT_ID` - Telegram credentials (required)
//! - `INGEST_MODE` - `http` (default) or `stdin` for JSON lines
//! - `WEBHOOK_BIND_ADDR` - webhook listener (default: 0.0.0.0:8000)
//! - `RESONANCE_CONFIG_PATH` - symbols/combinations/routing TOML (default: config/resonance.toml)
//! - `RUST_LOG` - log filter (default: info)

use anyhow::Result;
use resonance_notifier::application::resonance::{ResonanceService, SymbolDispatcher};
use resonance_notifier::config::{Config, IngestMode};
use resonance_notifier::domain::resonance::NormalizedEvent;
use resonance_notifier::infrastructure::TelegramNotifier;
use resonance_notifier::interfaces::{stdin, webhook};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("Resonance notifier {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: {} symbol(s), {} combination(s), {} route(s), gate_required={}, ingest={:?}",
        config.resonance.universe.len(),
        config.resonance.combinations.len(),
        config.resonance.routing.len(),
        config.resonance.gate_required,
        config.server.ingest_mode
    );

    let notifier = Arc::new(TelegramNotifier::new(&config.telegram));
    let send_timeout = Duration::from_secs(config.telegram.timeout_seconds);
    let service = Arc::new(ResonanceService::new(
        Arc::new(config.resonance),
        notifier,
        send_timeout,
    ));

    let (event_tx, event_rx) = mpsc::channel::<NormalizedEvent>(EVENT_CHANNEL_CAPACITY);
    let dispatcher_handle = tokio::spawn(SymbolDispatcher::new(service, event_rx).run());

    match config.server.ingest_mode {
        IngestMode::Http => {
            webhook::serve(config.server.bind_addr, event_tx, shutdown_signal()).await?;
        }
        IngestMode::Stdin => {
            info!("Reading webhook payloads from stdin. Press Ctrl+C to shutdown.");
            tokio::select! {
                result = stdin::forward_lines(event_tx) => {
                    result?;
                    info!("Input closed.");
                }
                _ = shutdown_signal() => {}
            }
        }
    }

    // Every sender is gone once ingestion has stopped, which lets the dispatcher drain and exit.
    info!("Draining pending events...");
    dispatcher_handle.await?;
    info!("Resonance notifier stopped.");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received."),
        Err(e) => {
            warn!("Failed to listen for Ctrl+C, running until killed: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
