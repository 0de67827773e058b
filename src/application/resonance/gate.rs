use crate::domain::resonance::Polarity;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Last observed resonance count for a (symbol, polarity)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateRecord {
    pub last_count: usize,
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// Count-based emission gate.
///
/// Fires only on a strict increase that reaches `min_resonance`, and not
/// within `cooldown` of the previous firing. `last_count` is refreshed on
/// every call, fired or not.
#[derive(Debug)]
pub struct EmissionGate {
    cooldown: Duration,
    records: HashMap<String, HashMap<Polarity, GateRecord>>,
}

impl EmissionGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            records: HashMap::new(),
        }
    }

    pub fn should_emit(
        &mut self,
        symbol: &str,
        polarity: Polarity,
        in_count: usize,
        min_resonance: usize,
        now: DateTime<Utc>,
    ) -> bool {
        let record = self
            .records
            .entry(symbol.to_string())
            .or_default()
            .entry(polarity)
            .or_default();

        if in_count < min_resonance {
            record.last_count = in_count;
            return false;
        }

        let increased = in_count > record.last_count;
        let cooling = record
            .last_sent_at
            .is_some_and(|sent| now - sent < self.cooldown);

        record.last_count = in_count;
        if increased && !cooling {
            record.last_sent_at = Some(now);
            return true;
        }
        false
    }

    pub fn record(&self, symbol: &str, polarity: Polarity) -> Option<GateRecord> {
        self.records.get(symbol)?.get(&polarity).copied()
    }
}
