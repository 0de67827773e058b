use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::{Combination, Polarity, ZoneState};
use chrono::{DateTime, Utc};

/// State and value of one combination member at alert time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberReading {
    pub timeframe: Timeframe,
    pub state: ZoneState,
    pub value: f64,
}

/// Renders the alert text:
///
/// ```text
/// BTCUSDT  OVERSOLD  4h+1h  UPGRADE
/// - 4h: IN (-55.00)
/// - 1h: WARM (-30.00)
/// 2026-01-08 04:00:00 UTC
/// ```
pub fn format_alert(
    symbol: &str,
    polarity: Polarity,
    combo: &Combination,
    is_upgrade: bool,
    readings: &[MemberReading],
    timestamp: DateTime<Utc>,
) -> String {
    let mut header = format!("{}  {}  {}", symbol, polarity.label(), combo);
    if is_upgrade {
        header.push_str("  UPGRADE");
    }

    let mut lines = vec![header];
    for tf in combo.members() {
        if let Some(r) = readings.iter().find(|r| r.timeframe == *tf) {
            lines.push(format!("- {}: {} ({:.2})", r.timeframe, r.state, r.value));
        }
    }
    lines.push(timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    lines.join("\n")
}
