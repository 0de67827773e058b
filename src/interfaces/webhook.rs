//! HTTP ingress for TradingView alerts.
//!
//! `POST /webhook/tradingview` accepts one alert body, normalises it and
//! queues it for the symbol dispatcher. Payloads without a usable signal are
//! still acknowledged with 200 so TradingView does not retry them.
//! `GET /health` reports liveness.

use crate::domain::resonance::NormalizedEvent;
use crate::infrastructure::tradingview::parse_payload;
use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::mpsc::Sender;
use tracing::{debug, info, warn};

#[derive(Clone)]
struct WebhookState {
    events: Sender<NormalizedEvent>,
}

pub fn router(events: Sender<NormalizedEvent>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook/tradingview", post(tradingview))
        .with_state(WebhookState { events })
}

/// Binds `addr` and serves until `shutdown` resolves
pub async fn serve(
    addr: SocketAddr,
    events: Sender<NormalizedEvent>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind webhook listener on {}", addr))?;
    serve_on(listener, events, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    events: Sender<NormalizedEvent>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    info!("Webhook listening on {}", listener.local_addr()?);
    axum::serve(listener, router(events))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Webhook server failed")
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

async fn tradingview(State(state): State<WebhookState>, body: Bytes) -> (StatusCode, Json<Value>) {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            warn!("Webhook: rejecting malformed payload: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "error": "invalid JSON" })),
            );
        }
    };

    let event = parse_payload(&payload);
    if event.signals.is_empty() {
        debug!("Webhook: ignoring payload for {} without a usable signal", event.symbol);
        return (StatusCode::OK, Json(json!({ "ok": true, "ignored": true })));
    }

    if state.events.send(event).await.is_err() {
        warn!("Webhook: dispatcher stopped, refusing payload");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "ok": false, "error": "shutting down" })),
        );
    }

    (StatusCode::OK, Json(json!({ "ok": true })))
}
