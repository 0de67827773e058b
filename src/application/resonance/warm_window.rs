use super::classifier::TimeframeState;
use crate::domain::resonance::ZoneState;
use chrono::{DateTime, Duration, Utc};

/// True iff the timeframe left its zone at most `window` ago.
///
/// Never-entered timeframes (no exit recorded) and timeframes without a
/// configured window are never warm.
pub fn is_warm(
    state: Option<&TimeframeState>,
    window: Option<Duration>,
    now: DateTime<Utc>,
) -> bool {
    let (Some(state), Some(window)) = (state, window) else {
        return false;
    };
    match state.last_exit {
        Some(exit) => now - exit <= window,
        None => false,
    }
}

/// IN if currently extreme, WARM inside the grace window, otherwise OUT
pub fn effective_state(
    state: Option<&TimeframeState>,
    window: Option<Duration>,
    now: DateTime<Utc>,
) -> ZoneState {
    match state {
        Some(s) if s.is_in => ZoneState::In,
        _ if is_warm(state, window, now) => ZoneState::Warm,
        _ => ZoneState::Out,
    }
}
