//! Resonance core: per-timeframe zone tracking, combination lifecycle and
//! the orchestration that turns one event into zero or more alerts.

pub mod classifier;
pub mod dispatcher;
pub mod gate;
pub mod lifecycle;
pub mod matcher;
pub mod message;
pub mod service;
pub mod state;
pub mod warm_window;

pub use classifier::{IntervalClassifier, TimeframeState};
pub use dispatcher::SymbolDispatcher;
pub use gate::{EmissionGate, GateRecord};
pub use lifecycle::{CombinationLifecycleStore, CombinationStatus};
pub use matcher::{ComboMatch, MatchKind};
pub use service::{DispatchRecord, EventOutcome, ResonanceService};
pub use state::ResonanceState;
