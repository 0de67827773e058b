// Resonance tracking, combination lifecycle and alert orchestration
pub mod resonance;
