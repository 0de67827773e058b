use super::matcher::{self, MatchKind};
use super::message::{MemberReading, format_alert};
use super::state::ResonanceState;
use crate::config::ResonanceConfig;
use crate::domain::errors::NotificationError;
use crate::domain::market::timeframe::Timeframe;
use crate::domain::ports::NotificationService;
use crate::domain::resonance::{
    Combination, Destination, IndicatorSignal, NormalizedEvent, Polarity, ZoneState,
};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// A notification the service decided on, and whether it went out
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub symbol: String,
    pub polarity: Polarity,
    pub combo: Combination,
    pub kind: MatchKind,
    pub destination: Destination,
    pub delivered: bool,
}

impl DispatchRecord {
    pub fn is_upgrade(&self) -> bool {
        self.kind == MatchKind::Upgrade
    }
}

/// Result of processing one event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOutcome {
    /// False when the event was ignored (unknown symbol or no usable signal)
    pub evaluated: bool,
    pub dispatches: Vec<DispatchRecord>,
}

struct PlannedAlert {
    polarity: Polarity,
    combo: Combination,
    kind: MatchKind,
    destination: Destination,
    text: String,
}

/// Runs one normalised event through classification, combination matching
/// and notification.
///
/// Every state mutation for an event is committed before any notification
/// for it is sent. Events for the same symbol are serialised through a
/// per-symbol lock that is held until that event's sends have completed;
/// different symbols only contend on the short synchronous evaluation.
pub struct ResonanceService {
    config: Arc<ResonanceConfig>,
    state: Mutex<ResonanceState>,
    notifier: Arc<dyn NotificationService>,
    send_timeout: Duration,
    symbol_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ResonanceService {
    pub fn new(
        config: Arc<ResonanceConfig>,
        notifier: Arc<dyn NotificationService>,
        send_timeout: Duration,
    ) -> Self {
        let state = ResonanceState::from_config(&config);
        Self {
            config,
            state: Mutex::new(state),
            notifier,
            send_timeout,
            symbol_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &ResonanceConfig {
        &self.config
    }

    /// Read-only access to the live state
    pub fn with_state<R>(&self, f: impl FnOnce(&ResonanceState) -> R) -> R {
        let state = self.lock_state();
        f(&*state)
    }

    pub async fn handle_event(&self, event: NormalizedEvent) -> EventOutcome {
        let Some(allowed) = self.config.timeframes_for(&event.symbol) else {
            debug!("Ignoring event for untracked symbol {}", event.symbol);
            return EventOutcome::default();
        };

        let signals: Vec<IndicatorSignal> = event
            .signals
            .iter()
            .filter(|s| allowed.contains(&s.timeframe))
            .copied()
            .collect();
        if signals.is_empty() {
            debug!(
                "Ignoring event for {}: no signal on a configured timeframe",
                event.symbol
            );
            return EventOutcome::default();
        }

        let symbol_lock = self.symbol_lock(&event.symbol);
        let _serial = symbol_lock.lock().await;

        let plans = self.plan(&event.symbol, &signals, allowed, event.timestamp);
        let dispatches = self.dispatch(&event.symbol, plans).await;

        EventOutcome {
            evaluated: true,
            dispatches,
        }
    }

    /// Synchronous part of an event: every state write happens here
    fn plan(
        &self,
        symbol: &str,
        signals: &[IndicatorSignal],
        allowed: &[Timeframe],
        now: DateTime<Utc>,
    ) -> Vec<PlannedAlert> {
        let mut state = self.lock_state();

        for signal in signals {
            state.classifier.update(
                symbol,
                signal.timeframe,
                signal.value,
                &self.config.thresholds,
                now,
            );
        }

        let mut plans = Vec::new();
        for polarity in Polarity::BOTH {
            self.plan_polarity(&mut state, symbol, polarity, allowed, now, &mut plans);
        }
        plans
    }

    fn plan_polarity(
        &self,
        state: &mut ResonanceState,
        symbol: &str,
        polarity: Polarity,
        allowed: &[Timeframe],
        now: DateTime<Utc>,
        plans: &mut Vec<PlannedAlert>,
    ) {
        let config = &*self.config;

        let mut states = HashMap::with_capacity(allowed.len());
        for &tf in allowed {
            let zone = state.effective_state(config, symbol, tf, polarity, now);
            if zone == ZoneState::Out {
                let reopened = state.lifecycle.invalidate_anchor(symbol, polarity, tf);
                if reopened > 0 {
                    info!(
                        "{} {}: anchor {} is OUT, {} combination(s) re-opened",
                        symbol, polarity, tf, reopened
                    );
                }
            }
            states.insert(tf, zone);
        }

        let satisfied: BTreeSet<Timeframe> = states
            .iter()
            .filter(|(_, zone)| zone.is_engaged())
            .map(|(tf, _)| *tf)
            .collect();

        let gate_fired = state.gate.should_emit(
            symbol,
            polarity,
            satisfied.len(),
            config.min_resonance,
            now,
        );
        if satisfied.is_empty() {
            return;
        }
        if gate_fired {
            debug!(
                "{} {}: resonance count rose to {}",
                symbol,
                polarity,
                satisfied.len()
            );
        } else if config.gate_required {
            debug!(
                "{} {}: gate closed at count {}, skipping combination pass",
                symbol,
                polarity,
                satisfied.len()
            );
            return;
        }

        for &anchor in satisfied.iter().rev() {
            let candidates = config.combinations_anchored_at(anchor);
            if candidates.is_empty() {
                continue;
            }

            let matches = matcher::match_combinations(
                &satisfied,
                &states,
                state.lifecycle.statuses(symbol, polarity),
                state.lifecycle.last_active(symbol, polarity, anchor),
                &candidates,
            );
            if matches.is_empty() {
                continue;
            }

            let Some(destination) = config.destination_for(anchor) else {
                warn!(
                    "{} {}: no route for anchor {}, skipping {} combination(s)",
                    symbol,
                    polarity,
                    anchor,
                    matches.len()
                );
                continue;
            };

            let mut largest: Option<&Combination> = None;
            for m in &matches {
                state.lifecycle.record(symbol, polarity, &m.combo, now);
                if largest.is_none_or(|l| m.combo.len() > l.len()) {
                    largest = Some(&m.combo);
                }

                let readings = member_readings(state, symbol, polarity, &m.combo, &states);
                plans.push(PlannedAlert {
                    polarity,
                    combo: m.combo.clone(),
                    kind: m.kind,
                    destination,
                    text: format_alert(symbol, polarity, &m.combo, m.is_upgrade(), &readings, now),
                });
            }
            if let Some(combo) = largest {
                state
                    .lifecycle
                    .set_last_active(symbol, polarity, combo.clone());
            }
        }
    }

    /// Sends all planned alerts concurrently. Failures are logged, never retried.
    async fn dispatch(&self, symbol: &str, plans: Vec<PlannedAlert>) -> Vec<DispatchRecord> {
        let sends = plans.into_iter().map(|plan| async move {
            let result = match tokio::time::timeout(
                self.send_timeout,
                self.notifier.send(plan.destination, &plan.text),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(NotificationError::Timeout {
                    duration_ms: self.send_timeout.as_millis() as u64,
                }),
            };

            let delivered = match result {
                Ok(()) => {
                    info!(
                        "Sent {} {} {} ({:?}) to {}",
                        symbol, plan.polarity, plan.combo, plan.kind, plan.destination
                    );
                    true
                }
                Err(e) => {
                    warn!(
                        "Failed to send {} {} {} to {}: {}",
                        symbol, plan.polarity, plan.combo, plan.destination, e
                    );
                    false
                }
            };

            DispatchRecord {
                symbol: symbol.to_string(),
                polarity: plan.polarity,
                combo: plan.combo,
                kind: plan.kind,
                destination: plan.destination,
                delivered,
            }
        });

        join_all(sends).await
    }

    fn lock_state(&self) -> MutexGuard<'_, ResonanceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("ResonanceService: state lock poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn symbol_lock(&self, symbol: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = match self.symbol_locks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        locks.entry(symbol.to_string()).or_default().clone()
    }
}

fn member_readings(
    state: &ResonanceState,
    symbol: &str,
    polarity: Polarity,
    combo: &Combination,
    states: &HashMap<Timeframe, ZoneState>,
) -> Vec<MemberReading> {
    combo
        .members()
        .iter()
        .filter_map(|&tf| {
            let reading = state.classifier.state(symbol, tf, polarity)?;
            Some(MemberReading {
                timeframe: tf,
                state: states.get(&tf).copied().unwrap_or(ZoneState::Out),
                value: reading.value,
            })
        })
        .collect()
}
