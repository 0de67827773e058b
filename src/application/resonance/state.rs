use super::classifier::IntervalClassifier;
use super::gate::EmissionGate;
use super::lifecycle::CombinationLifecycleStore;
use super::warm_window;
use crate::config::ResonanceConfig;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::{Polarity, ZoneState};
use chrono::{DateTime, Duration, Utc};

/// All mutable resonance state, owned in one place and handed to the service
#[derive(Debug)]
pub struct ResonanceState {
    pub classifier: IntervalClassifier,
    pub lifecycle: CombinationLifecycleStore,
    pub gate: EmissionGate,
}

impl ResonanceState {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            classifier: IntervalClassifier::new(),
            lifecycle: CombinationLifecycleStore::new(),
            gate: EmissionGate::new(cooldown),
        }
    }

    pub fn from_config(config: &ResonanceConfig) -> Self {
        Self::new(Duration::seconds(config.cooldown_seconds))
    }

    /// Whether `timeframe` left its zone recently enough to still count
    pub fn is_warm(
        &self,
        config: &ResonanceConfig,
        symbol: &str,
        timeframe: Timeframe,
        polarity: Polarity,
        now: DateTime<Utc>,
    ) -> bool {
        warm_window::is_warm(
            self.classifier.state(symbol, timeframe, polarity),
            config.warm_window(timeframe),
            now,
        )
    }

    pub fn effective_state(
        &self,
        config: &ResonanceConfig,
        symbol: &str,
        timeframe: Timeframe,
        polarity: Polarity,
        now: DateTime<Utc>,
    ) -> ZoneState {
        warm_window::effective_state(
            self.classifier.state(symbol, timeframe, polarity),
            config.warm_window(timeframe),
            now,
        )
    }
}
