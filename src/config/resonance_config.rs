//! Resonance universe, combination whitelist and routing tables.
//!
//! Tables are read from a TOML file and validated once at startup, so the
//! core never has to cope with a half-formed configuration at request time:
//!
//! ```toml
//! combinations = [["4h", "1h"], ["4h", "1h", "15m"]]
//!
//! [symbols]
//! BTCUSDT = ["4h", "1h", "15m", "3m"]
//!
//! [warm_bars]
//! "4h" = 2
//!
//! [bar_seconds]   # optional, defaults to the nominal bar length
//! "4h" = 14400
//!
//! [routing]       # anchor timeframe -> Telegram topic id
//! "4h" = 1325
//! ```

use super::resonance_env_config::ResonanceEnvConfig;
use crate::domain::errors::ConfigError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::{Combination, Destination, Thresholds};
use anyhow::{Context, Result};
use chrono::Duration;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Raw file layout, before timeframe strings are resolved
#[derive(Debug, Clone, Deserialize)]
pub struct ResonanceFile {
    pub symbols: BTreeMap<String, Vec<String>>,
    pub warm_bars: BTreeMap<String, u32>,
    #[serde(default)]
    pub bar_seconds: BTreeMap<String, i64>,
    pub combinations: Vec<Vec<String>>,
    pub routing: BTreeMap<String, i64>,
}

impl ResonanceFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read resonance config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse resonance config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Everything the resonance core reads from configuration
#[derive(Debug, Clone)]
pub struct ResonanceConfig {
    pub universe: HashMap<String, Vec<Timeframe>>,
    pub thresholds: Thresholds,
    pub warm_bars: HashMap<Timeframe, u32>,
    pub bar_seconds: HashMap<Timeframe, i64>,
    pub combinations: Vec<Combination>,
    pub min_resonance: usize,
    pub cooldown_seconds: i64,
    /// When set, combination matching only runs for a polarity whose gate fired
    pub gate_required: bool,
    pub routing: HashMap<Timeframe, Destination>,
}

impl ResonanceConfig {
    /// Resolves and validates the file tables against the env settings.
    pub fn build(file: ResonanceFile, env: &ResonanceEnvConfig) -> Result<Self, ConfigError> {
        let thresholds = Thresholds {
            overbought: env.overbought_level,
            oversold: env.oversold_level,
        };
        if thresholds.overbought <= thresholds.oversold {
            return Err(ConfigError::ThresholdOrder {
                overbought: thresholds.overbought,
                oversold: thresholds.oversold,
            });
        }
        if env.cooldown_seconds < 0 {
            return Err(ConfigError::InvalidValue {
                key: "COOLDOWN_SECONDS".to_string(),
                reason: "must not be negative".to_string(),
            });
        }

        if file.symbols.is_empty() {
            return Err(ConfigError::MissingKey {
                key: "symbols".to_string(),
            });
        }
        let mut universe = HashMap::new();
        for (symbol, raw) in &file.symbols {
            let mut timeframes = resolve_all(raw, "symbols")?;
            timeframes.sort_unstable();
            timeframes.dedup();
            if timeframes.is_empty() {
                return Err(ConfigError::EmptyUniverse {
                    symbol: symbol.clone(),
                });
            }
            universe.insert(symbol.clone(), timeframes);
        }

        let mut warm_bars = HashMap::new();
        for (raw, bars) in &file.warm_bars {
            warm_bars.insert(resolve(raw, "warm_bars")?, *bars);
        }

        let mut bar_seconds: HashMap<Timeframe, i64> = Timeframe::all()
            .into_iter()
            .map(|tf| (tf, tf.to_seconds()))
            .collect();
        for (raw, seconds) in &file.bar_seconds {
            let tf = resolve(raw, "bar_seconds")?;
            if *seconds <= 0 {
                return Err(ConfigError::InvalidValue {
                    key: format!("bar_seconds.{}", raw),
                    reason: "must be positive".to_string(),
                });
            }
            bar_seconds.insert(tf, *seconds);
        }

        for tf in universe.values().flatten() {
            if !warm_bars.contains_key(tf) {
                return Err(ConfigError::MissingWarmBars {
                    timeframe: tf.to_string(),
                });
            }
        }

        for (tf, bars) in &warm_bars {
            let seconds = bar_seconds.get(tf).copied().unwrap_or_else(|| tf.to_seconds());
            if window_of(*bars, seconds).is_none() {
                return Err(ConfigError::InvalidValue {
                    key: format!("warm_bars.{}", tf),
                    reason: format!("{} bars of {}s is out of range", bars, seconds),
                });
            }
        }

        let mut combinations = Vec::with_capacity(file.combinations.len());
        for raw in &file.combinations {
            let timeframes = resolve_all(raw, "combinations")?;
            let combo = Combination::new(timeframes).ok_or_else(|| {
                ConfigError::DegenerateCombination { combo: raw.clone() }
            })?;
            if !combinations.contains(&combo) {
                combinations.push(combo);
            }
        }
        if combinations.is_empty() {
            return Err(ConfigError::MissingKey {
                key: "combinations".to_string(),
            });
        }

        if file.routing.is_empty() {
            return Err(ConfigError::MissingKey {
                key: "routing".to_string(),
            });
        }
        let mut routing = HashMap::new();
        for (raw, topic_id) in &file.routing {
            routing.insert(
                resolve(raw, "routing")?,
                Destination {
                    topic_id: *topic_id,
                },
            );
        }

        for combo in &combinations {
            if !routing.contains_key(&combo.anchor()) {
                warn!(
                    "Combination {} has no route for anchor {}; its alerts will be skipped",
                    combo,
                    combo.anchor()
                );
            }
        }

        Ok(Self {
            universe,
            thresholds,
            warm_bars,
            bar_seconds,
            combinations,
            min_resonance: env.min_resonance,
            cooldown_seconds: env.cooldown_seconds,
            gate_required: env.gate_required,
            routing,
        })
    }

    /// Configured timeframes for a symbol, or `None` if the symbol is not tracked
    pub fn timeframes_for(&self, symbol: &str) -> Option<&[Timeframe]> {
        self.universe.get(symbol).map(Vec::as_slice)
    }

    /// Grace period after an exit during which a timeframe still counts as WARM.
    /// `None` when either the warm bar count or the bar duration is unknown.
    pub fn warm_window(&self, timeframe: Timeframe) -> Option<Duration> {
        let bars = *self.warm_bars.get(&timeframe)?;
        let seconds = *self.bar_seconds.get(&timeframe)?;
        window_of(bars, seconds)
    }

    /// Whitelisted combinations anchored at `anchor`
    pub fn combinations_anchored_at(&self, anchor: Timeframe) -> Vec<Combination> {
        self.combinations
            .iter()
            .filter(|c| c.anchor() == anchor)
            .cloned()
            .collect()
    }

    pub fn destination_for(&self, anchor: Timeframe) -> Option<Destination> {
        self.routing.get(&anchor).copied()
    }
}

fn window_of(bars: u32, seconds: i64) -> Option<Duration> {
    i64::from(bars)
        .checked_mul(seconds)
        .and_then(Duration::try_seconds)
}

fn resolve(raw: &str, section: &str) -> Result<Timeframe, ConfigError> {
    Timeframe::from_tradingview(raw).ok_or_else(|| ConfigError::UnknownTimeframe {
        raw: raw.to_string(),
        section: section.to_string(),
    })
}

fn resolve_all(raw: &[String], section: &str) -> Result<Vec<Timeframe>, ConfigError> {
    raw.iter().map(|s| resolve(s, section)).collect()
}
