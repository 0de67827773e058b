//! Resonance thresholds and gate parameters from environment variables.

use anyhow::{Context, Result};
use std::env;

/// Resonance environment configuration
#[derive(Debug, Clone)]
pub struct ResonanceEnvConfig {
    // Extreme levels
    pub overbought_level: f64,
    pub oversold_level: f64,

    // Emission gate
    pub min_resonance: usize,
    pub cooldown_seconds: i64,
    pub gate_required: bool,

    // Universe / combination / routing tables
    pub config_path: String,
}

impl ResonanceEnvConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            overbought_level: Self::parse_f64("OB_LEVEL", 40.0)?,
            oversold_level: Self::parse_f64("OS_LEVEL", -40.0)?,
            min_resonance: Self::parse_usize("MIN_RESONANCE", 2)?,
            cooldown_seconds: Self::parse_i64("COOLDOWN_SECONDS", 1800)?,
            gate_required: env::var("RESONANCE_GATE_REQUIRED")
                .unwrap_or_else(|_| "false".to_string())
                .parse::<bool>()
                .context("Failed to parse RESONANCE_GATE_REQUIRED")?,
            config_path: env::var("RESONANCE_CONFIG_PATH")
                .unwrap_or_else(|_| "config/resonance.toml".to_string()),
        })
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_i64(key: &str, default: i64) -> Result<i64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<i64>()
            .context(format!("Failed to parse {}", key))
    }

    fn parse_f64(key: &str, default: f64) -> Result<f64> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<f64>()
            .context(format!("Failed to parse {}", key))
    }
}
