use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::{Combination, Polarity};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Notification state of one combination for a (symbol, polarity)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinationStatus {
    pub active: bool,
    pub last_notified_at: DateTime<Utc>,
    pub anchor: Timeframe,
}

#[derive(Debug, Default)]
struct SideLedger {
    combos: HashMap<Combination, CombinationStatus>,
    last_active: HashMap<Timeframe, Combination>,
}

/// Remembers which combinations were already notified and are still live.
///
/// Entries are deactivated, never removed, so a combination that comes back
/// after its anchor left the zone is seen as a reactivation.
#[derive(Debug, Default)]
pub struct CombinationLifecycleStore {
    ledgers: HashMap<String, HashMap<Polarity, SideLedger>>,
}

impl CombinationLifecycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `combo` as notified and active
    pub fn record(
        &mut self,
        symbol: &str,
        polarity: Polarity,
        combo: &Combination,
        now: DateTime<Utc>,
    ) {
        self.ledger_mut(symbol, polarity).combos.insert(
            combo.clone(),
            CombinationStatus {
                active: true,
                last_notified_at: now,
                anchor: combo.anchor(),
            },
        );
    }

    /// Deactivates every combination anchored at `anchor` and forgets the
    /// anchor's last active combination. Returns how many were deactivated.
    pub fn invalidate_anchor(&mut self, symbol: &str, polarity: Polarity, anchor: Timeframe) -> usize {
        let Some(ledger) = self
            .ledgers
            .get_mut(symbol)
            .and_then(|sides| sides.get_mut(&polarity))
        else {
            return 0;
        };

        ledger.last_active.remove(&anchor);

        let mut deactivated = 0;
        for status in ledger.combos.values_mut() {
            if status.anchor == anchor && status.active {
                status.active = false;
                deactivated += 1;
            }
        }
        deactivated
    }

    pub fn statuses(
        &self,
        symbol: &str,
        polarity: Polarity,
    ) -> Option<&HashMap<Combination, CombinationStatus>> {
        self.ledger(symbol, polarity).map(|l| &l.combos)
    }

    pub fn status(
        &self,
        symbol: &str,
        polarity: Polarity,
        combo: &Combination,
    ) -> Option<&CombinationStatus> {
        self.statuses(symbol, polarity)?.get(combo)
    }

    pub fn last_active(
        &self,
        symbol: &str,
        polarity: Polarity,
        anchor: Timeframe,
    ) -> Option<&Combination> {
        self.ledger(symbol, polarity)?.last_active.get(&anchor)
    }

    pub fn set_last_active(&mut self, symbol: &str, polarity: Polarity, combo: Combination) {
        self.ledger_mut(symbol, polarity)
            .last_active
            .insert(combo.anchor(), combo);
    }

    fn ledger(&self, symbol: &str, polarity: Polarity) -> Option<&SideLedger> {
        self.ledgers.get(symbol)?.get(&polarity)
    }

    fn ledger_mut(&mut self, symbol: &str, polarity: Polarity) -> &mut SideLedger {
        self.ledgers
            .entry(symbol.to_string())
            .or_default()
            .entry(polarity)
            .or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use Timeframe::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_767_830_400 + secs, 0).unwrap()
    }

    fn combo(tfs: &[Timeframe]) -> Combination {
        Combination::new(tfs.iter().copied()).unwrap()
    }

    #[test]
    fn test_record_sets_active_and_anchor() {
        let mut store = CombinationLifecycleStore::new();
        let c = combo(&[OneHour, FourHour]);

        store.record("BTCUSDT", Polarity::Oversold, &c, at(10));
        let status = store.status("BTCUSDT", Polarity::Oversold, &c).unwrap();
        assert!(status.active);
        assert_eq!(status.anchor, FourHour);
        assert_eq!(status.last_notified_at, at(10));

        // Polarities are independent
        assert!(store.status("BTCUSDT", Polarity::Overbought, &c).is_none());
    }

    #[test]
    fn test_anchor_invalidation_only_hits_that_anchor() {
        let mut store = CombinationLifecycleStore::new();
        let four_one = combo(&[FourHour, OneHour]);
        let four_fifteen = combo(&[FourHour, FifteenMin]);
        let one_fifteen = combo(&[OneHour, FifteenMin]);

        for c in [&four_one, &four_fifteen, &one_fifteen] {
            store.record("BTCUSDT", Polarity::Oversold, c, at(0));
        }
        store.set_last_active("BTCUSDT", Polarity::Oversold, four_one.clone());

        let n = store.invalidate_anchor("BTCUSDT", Polarity::Oversold, FourHour);
        assert_eq!(n, 2);
        assert!(!store.status("BTCUSDT", Polarity::Oversold, &four_one).unwrap().active);
        assert!(!store.status("BTCUSDT", Polarity::Oversold, &four_fifteen).unwrap().active);
        assert!(store.status("BTCUSDT", Polarity::Oversold, &one_fifteen).unwrap().active);
        assert!(store.last_active("BTCUSDT", Polarity::Oversold, FourHour).is_none());

        // Entries are kept, only deactivated; a second pass is a no-op
        assert_eq!(store.invalidate_anchor("BTCUSDT", Polarity::Oversold, FourHour), 0);
        assert_eq!(store.statuses("BTCUSDT", Polarity::Oversold).unwrap().len(), 3);
    }

    #[test]
    fn test_record_after_invalidation_reactivates() {
        let mut store = CombinationLifecycleStore::new();
        let c = combo(&[FourHour, OneHour]);

        store.record("BTCUSDT", Polarity::Overbought, &c, at(0));
        store.invalidate_anchor("BTCUSDT", Polarity::Overbought, FourHour);
        store.record("BTCUSDT", Polarity::Overbought, &c, at(500));

        let status = store.status("BTCUSDT", Polarity::Overbought, &c).unwrap();
        assert!(status.active);
        assert_eq!(status.last_notified_at, at(500));
    }

    #[test]
    fn test_invalidate_unknown_symbol_is_noop() {
        let mut store = CombinationLifecycleStore::new();
        assert_eq!(store.invalidate_anchor("NOPE", Polarity::Oversold, OneDay), 0);
    }

    #[test]
    fn test_last_active_is_per_anchor() {
        let mut store = CombinationLifecycleStore::new();
        store.set_last_active("BTCUSDT", Polarity::Oversold, combo(&[FourHour, OneHour]));
        store.set_last_active("BTCUSDT", Polarity::Oversold, combo(&[OneHour, FifteenMin]));

        assert_eq!(
            store.last_active("BTCUSDT", Polarity::Oversold, FourHour),
            Some(&combo(&[FourHour, OneHour]))
        );
        assert_eq!(
            store.last_active("BTCUSDT", Polarity::Oversold, OneHour),
            Some(&combo(&[OneHour, FifteenMin]))
        );
    }
}
