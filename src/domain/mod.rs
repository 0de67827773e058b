// Market vocabulary (timeframes)
pub mod market;

// Resonance domain (polarity, zone states, combinations, events)
pub mod resonance;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
