use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::NormalizedEvent;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

const UNKNOWN_SYMBOL: &str = "UNKNOWN";

/// Normalises a TradingView webhook body into a [`NormalizedEvent`].
///
/// A payload carries a single interval/value pair. When either is missing or
/// unreadable the event is returned without signals and the core ignores it.
pub fn parse_payload(payload: &Value) -> NormalizedEvent {
    let raw_symbol = non_empty_str(payload, "symbol")
        .or_else(|| non_empty_str(payload, "ticker"))
        .unwrap_or(UNKNOWN_SYMBOL);
    let symbol = normalize_symbol(raw_symbol);

    let timestamp = parse_timestamp(payload.get("timenow"))
        .or_else(|| parse_timestamp(payload.get("ts")))
        .unwrap_or_else(Utc::now);

    let mut event = NormalizedEvent::new(symbol, timestamp);

    let interval = payload.get("interval").and_then(parse_interval);
    let value = payload.get("value").and_then(parse_value);
    match (interval, value) {
        (Some(tf), Some(v)) => event = event.with_signal(tf, v),
        _ => debug!(
            "TradingView payload for {} has no usable interval/value: {:?} / {:?}",
            event.symbol,
            payload.get("interval"),
            payload.get("value")
        ),
    }

    event
}

/// Drops a trailing exchange suffix such as `.P`, keeping the base ticker
pub fn normalize_symbol(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some((base, suffix)) = trimmed.rsplit_once('.')
        && !base.is_empty()
        && !suffix.is_empty()
        && suffix.chars().all(|c| c.is_ascii_alphabetic())
    {
        return base.to_string();
    }
    trimmed.to_string()
}

fn non_empty_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn parse_interval(raw: &Value) -> Option<Timeframe> {
    match raw {
        Value::String(s) => Timeframe::from_tradingview(s.trim()),
        Value::Number(n) => Timeframe::from_tradingview(&n.to_string()),
        _ => None,
    }
}

fn parse_value(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn parse_timestamp(raw: Option<&Value>) -> Option<DateTime<Utc>> {
    match raw? {
        Value::Number(n) => from_epoch(n.as_f64()?),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            from_epoch(s.parse::<f64>().ok()?)
        }
        _ => None,
    }
}

fn from_epoch(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    Utc.timestamp_opt(whole as i64, nanos.min(999_999_999)).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_payload() {
        let payload = json!({
            "symbol": "ASTERUSDT.P",
            "interval": "60",
            "event": "cross",
            "value": 49.9999,
            "timenow": "2026-01-08T04:00:00Z"
        });

        let event = parse_payload(&payload);
        assert_eq!(event.symbol, "ASTERUSDT");
        assert_eq!(
            event.timestamp,
            Utc.with_ymd_and_hms(2026, 1, 8, 4, 0, 0).unwrap()
        );
        assert_eq!(event.signals.len(), 1);
        assert_eq!(event.signals[0].timeframe, Timeframe::OneHour);
        assert!((event.signals[0].value - 49.9999).abs() < 1e-9);
    }

    #[test]
    fn test_ticker_fallback_and_string_value() {
        let payload = json!({
            "ticker": "ETHUSDT",
            "interval": 240,
            "value": "-52.5",
            "ts": 1_767_844_800
        });

        let event = parse_payload(&payload);
        assert_eq!(event.symbol, "ETHUSDT");
        assert_eq!(event.timestamp.timestamp(), 1_767_844_800);
        assert_eq!(event.signals[0].timeframe, Timeframe::FourHour);
        assert_eq!(event.signals[0].value, -52.5);
    }

    #[test]
    fn test_missing_symbol_defaults_to_unknown() {
        let event = parse_payload(&json!({ "interval": "15", "value": 10 }));
        assert_eq!(event.symbol, "UNKNOWN");
        assert_eq!(event.signals[0].timeframe, Timeframe::FifteenMin);
    }

    #[test]
    fn test_unusable_interval_or_value_yields_no_signals() {
        let bad_interval = parse_payload(&json!({ "symbol": "BTCUSDT", "interval": "7", "value": 1 }));
        assert!(bad_interval.signals.is_empty());

        let bad_value = parse_payload(&json!({ "symbol": "BTCUSDT", "interval": "60", "value": "n/a" }));
        assert!(bad_value.signals.is_empty());

        let missing = parse_payload(&json!({ "symbol": "BTCUSDT" }));
        assert!(missing.signals.is_empty());
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" BTCUSDT.P "), "BTCUSDT");
        assert_eq!(normalize_symbol("BTCUSDT"), "BTCUSDT");
        assert_eq!(normalize_symbol("BTC.USDT1"), "BTC.USDT1");
        assert_eq!(normalize_symbol(".P"), ".P");
    }

    #[test]
    fn test_unparseable_timestamp_falls_back_to_now() {
        let before = Utc::now();
        let event = parse_payload(&json!({ "symbol": "X", "timenow": "yesterday" }));
        assert!(event.timestamp >= before);
    }
}
