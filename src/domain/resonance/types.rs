use crate::domain::market::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which extreme zone a reading is evaluated against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Oversold,
    Overbought,
}

impl Polarity {
    pub const BOTH: [Polarity; 2] = [Polarity::Oversold, Polarity::Overbought];

    /// Whether `value` sits inside this polarity's extreme zone
    pub fn is_extreme(&self, value: f64, thresholds: &Thresholds) -> bool {
        match self {
            Polarity::Oversold => value <= thresholds.oversold,
            Polarity::Overbought => value >= thresholds.overbought,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Polarity::Oversold => "OVERSOLD",
            Polarity::Overbought => "OVERBOUGHT",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Extreme-zone levels shared by every symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub overbought: f64,
    pub oversold: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            overbought: 40.0,
            oversold: -40.0,
        }
    }
}

/// Effective state of one timeframe at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneState {
    In,
    Warm,
    Out,
}

impl ZoneState {
    /// IN and WARM both count towards a resonance
    pub fn is_engaged(&self) -> bool {
        matches!(self, ZoneState::In | ZoneState::Warm)
    }
}

impl fmt::Display for ZoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ZoneState::In => "IN",
            ZoneState::Warm => "WARM",
            ZoneState::Out => "OUT",
        };
        f.write_str(label)
    }
}

/// A single indicator reading for one timeframe
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSignal {
    pub timeframe: Timeframe,
    pub value: f64,
}

/// Event handed to the resonance core once the webhook payload has been normalised
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub signals: Vec<IndicatorSignal>,
}

impl NormalizedEvent {
    pub fn new(symbol: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            timestamp,
            signals: Vec::new(),
        }
    }

    pub fn with_signal(mut self, timeframe: Timeframe, value: f64) -> Self {
        self.signals.push(IndicatorSignal { timeframe, value });
        self
    }
}

/// Where a notification is delivered (a Telegram forum topic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub topic_id: i64,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic#{}", self.topic_id)
    }
}
