//! Configuration module for the resonance notifier.
//!
//! Scalar settings come from environment variables (optionally via `.env`),
//! structured tables from a TOML file. Any missing or invalid entry fails
//! startup; nothing is re-validated at request time.

mod notifier_config;
mod resonance_config;
mod resonance_env_config;
mod server_config;

pub use notifier_config::TelegramEnvConfig;
pub use resonance_config::{ResonanceConfig, ResonanceFile};
pub use resonance_env_config::ResonanceEnvConfig;
pub use server_config::{IngestMode, ServerEnvConfig};

use anyhow::{Context, Result};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramEnvConfig,
    pub resonance: ResonanceConfig,
    pub server: ServerEnvConfig,
}

impl Config {
    /// Load configuration from environment variables and the resonance TOML file.
    pub fn from_env() -> Result<Self> {
        let telegram = TelegramEnvConfig::from_env().context("Failed to load Telegram config")?;
        let resonance_env =
            ResonanceEnvConfig::from_env().context("Failed to load resonance settings")?;

        let server = ServerEnvConfig::from_env().context("Failed to load ingestion settings")?;

        let file = ResonanceFile::load(&resonance_env.config_path)?;
        let resonance = ResonanceConfig::build(file, &resonance_env)
            .context("Invalid resonance configuration")?;

        Ok(Self {
            telegram,
            resonance,
            server,
        })
    }
}
