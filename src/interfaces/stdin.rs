//! JSON-lines ingress: one webhook body per line on stdin.

use crate::domain::resonance::NormalizedEvent;
use crate::infrastructure::tradingview::parse_payload;
use anyhow::{Context, Result};
use std::io::BufRead;
use tokio::sync::mpsc::{self, Sender};
use tracing::warn;

const LINE_BUFFER: usize = 256;

/// Forwards stdin payloads to `events` until EOF.
///
/// Lines are read on a dedicated OS thread. If this future is dropped on
/// shutdown, the thread stays parked on its read but does not keep the
/// process alive.
pub async fn forward_lines(events: Sender<NormalizedEvent>) -> Result<()> {
    let (line_tx, mut line_rx) = mpsc::channel::<String>(LINE_BUFFER);

    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("stdin: read failed: {}", e);
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn stdin reader")?;

    while let Some(line) = line_rx.recv().await {
        let Some(event) = parse_line(&line) else {
            continue;
        };
        if events.send(event).await.is_err() {
            warn!("stdin: dispatcher stopped, no longer accepting events");
            break;
        }
    }

    Ok(())
}

/// Parses one input line. Blank and malformed lines yield `None`.
pub fn parse_line(line: &str) -> Option<NormalizedEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(payload) => Some(parse_payload(&payload)),
        Err(e) => {
            warn!("stdin: skipping malformed payload: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market::timeframe::Timeframe;

    #[test]
    fn test_parse_line() {
        let event =
            parse_line(r#"{"symbol":"BTCUSDT.P","interval":"240","value":-52}"#).unwrap();
        assert_eq!(event.symbol, "BTCUSDT");
        assert_eq!(event.signals[0].timeframe, Timeframe::FourHour);

        assert!(parse_line("   ").is_none());
        assert!(parse_line("{not json").is_none());
    }
}
