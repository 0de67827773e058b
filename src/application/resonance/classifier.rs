use crate::domain::market::timeframe::Timeframe;
use crate::domain::resonance::{Polarity, Thresholds};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Latest reading of one (symbol, timeframe, polarity)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeframeState {
    pub value: f64,
    pub is_in: bool,
    /// Last moment `is_in` flipped from true to false
    pub last_exit: Option<DateTime<Utc>>,
}

/// Tracks IN/OUT per polarity for every symbol and timeframe.
///
/// Entries are created on the first reading and never removed.
#[derive(Debug, Default)]
pub struct IntervalClassifier {
    states: HashMap<String, HashMap<(Timeframe, Polarity), TimeframeState>>,
}

impl IntervalClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one reading to both polarities.
    ///
    /// An exit timestamp is only stamped on a true -> false transition, so
    /// replaying the same `(value, now)` leaves the state unchanged.
    pub fn update(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        value: f64,
        thresholds: &Thresholds,
        now: DateTime<Utc>,
    ) {
        let per_symbol = self.states.entry(symbol.to_string()).or_default();

        for polarity in Polarity::BOTH {
            let is_in = polarity.is_extreme(value, thresholds);
            let state = per_symbol
                .entry((timeframe, polarity))
                .or_insert(TimeframeState {
                    value,
                    is_in: false,
                    last_exit: None,
                });

            if state.is_in && !is_in {
                debug!(
                    "{} {} {}: left extreme zone at {} (value {:.2})",
                    symbol, timeframe, polarity, now, value
                );
                state.last_exit = Some(now);
            } else if !state.is_in && is_in {
                debug!(
                    "{} {} {}: entered extreme zone (value {:.2})",
                    symbol, timeframe, polarity, value
                );
            }

            state.value = value;
            state.is_in = is_in;
        }
    }

    pub fn state(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        polarity: Polarity,
    ) -> Option<&TimeframeState> {
        self.states.get(symbol)?.get(&(timeframe, polarity))
    }

    #[cfg(test)]
    pub fn reset(&mut self) {
        self.states.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_767_830_400 + secs, 0).unwrap()
    }

    #[test]
    fn test_both_polarities_from_one_reading() {
        let mut c = IntervalClassifier::new();
        let t = Thresholds::default();

        c.update("BTCUSDT", Timeframe::OneHour, -55.0, &t, at(0));
        let os = c.state("BTCUSDT", Timeframe::OneHour, Polarity::Oversold).unwrap();
        let ob = c.state("BTCUSDT", Timeframe::OneHour, Polarity::Overbought).unwrap();
        assert!(os.is_in);
        assert!(!ob.is_in);
        assert_eq!(os.value, -55.0);
        assert_eq!(os.last_exit, None);
        assert_eq!(ob.last_exit, None);
    }

    #[test]
    fn test_exit_stamped_only_on_transition() {
        let mut c = IntervalClassifier::new();
        let t = Thresholds::default();

        c.update("BTCUSDT", Timeframe::OneHour, -55.0, &t, at(0));
        c.update("BTCUSDT", Timeframe::OneHour, -30.0, &t, at(3600));
        let s = *c.state("BTCUSDT", Timeframe::OneHour, Polarity::Oversold).unwrap();
        assert!(!s.is_in);
        assert_eq!(s.last_exit, Some(at(3600)));

        // Staying out does not move the exit forward
        c.update("BTCUSDT", Timeframe::OneHour, -25.0, &t, at(7200));
        let s = c.state("BTCUSDT", Timeframe::OneHour, Polarity::Oversold).unwrap();
        assert_eq!(s.last_exit, Some(at(3600)));
    }

    #[test]
    fn test_never_in_has_no_exit() {
        let mut c = IntervalClassifier::new();
        let t = Thresholds::default();

        c.update("ETHUSDT", Timeframe::FourHour, 10.0, &t, at(0));
        c.update("ETHUSDT", Timeframe::FourHour, 12.0, &t, at(60));
        for polarity in Polarity::BOTH {
            let s = c.state("ETHUSDT", Timeframe::FourHour, polarity).unwrap();
            assert!(!s.is_in);
            assert_eq!(s.last_exit, None);
        }
    }

    #[test]
    fn test_idempotent_replay() {
        let mut c = IntervalClassifier::new();
        let t = Thresholds::default();

        c.update("BTCUSDT", Timeframe::OneHour, 50.0, &t, at(0));
        c.update("BTCUSDT", Timeframe::OneHour, 10.0, &t, at(60));
        let first = *c.state("BTCUSDT", Timeframe::OneHour, Polarity::Overbought).unwrap();
        c.update("BTCUSDT", Timeframe::OneHour, 10.0, &t, at(60));
        let second = *c.state("BTCUSDT", Timeframe::OneHour, Polarity::Overbought).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_key_has_no_state() {
        let mut c = IntervalClassifier::new();
        assert!(c.state("BTCUSDT", Timeframe::OneHour, Polarity::Oversold).is_none());
        c.update("BTCUSDT", Timeframe::OneHour, 0.0, &Thresholds::default(), at(0));
        c.reset();
        assert!(c.state("BTCUSDT", Timeframe::OneHour, Polarity::Oversold).is_none());
    }
}
