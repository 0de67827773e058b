use thiserror::Error;

/// Startup configuration problems. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {key}")]
    MissingKey { key: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Unknown timeframe '{raw}' in {section}")]
    UnknownTimeframe { raw: String, section: String },

    #[error("Symbol {symbol} has no timeframes configured")]
    EmptyUniverse { symbol: String },

    #[error("Timeframe {timeframe} is used by the universe but has no warm_bars entry")]
    MissingWarmBars { timeframe: String },

    #[error("Combination {combo:?} needs at least two distinct timeframes")]
    DegenerateCombination { combo: Vec<String> },

    #[error("Thresholds out of order: overbought {overbought} must be above oversold {oversold}")]
    ThresholdOrder { overbought: f64, oversold: f64 },
}

/// Failures while delivering a notification. Logged, never retried.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("Notification rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Notification transport error: {reason}")]
    Transport { reason: String },
}
