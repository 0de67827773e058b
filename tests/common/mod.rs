#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use resonance_notifier::application::resonance::ResonanceService;
use resonance_notifier::config::{ResonanceConfig, ResonanceEnvConfig, ResonanceFile};
use resonance_notifier::domain::resonance::Destination;
use resonance_notifier::infrastructure::MockNotificationService;
use std::sync::Arc;

pub const DEST_4H: Destination = Destination { topic_id: 1325 };
pub const DEST_1H: Destination = Destination { topic_id: 1327 };

/// X and Z track 4h/1h/15m with one warm bar each; 4h and 1h are routed.
pub const TABLES: &str = r#"
combinations = [["4h", "1h"], ["4h", "1h", "15m"], ["1h", "15m"]]

[symbols]
X = ["4h", "1h", "15m"]
Z = ["4h", "1h", "15m"]

[warm_bars]
"4h" = 1
"1h" = 1
"15m" = 1

[routing]
"4h" = 1325
"1h" = 1327
"#;

pub fn env(min_resonance: usize, cooldown_seconds: i64, gate_required: bool) -> ResonanceEnvConfig {
    ResonanceEnvConfig {
        overbought_level: 40.0,
        oversold_level: -40.0,
        min_resonance,
        cooldown_seconds,
        gate_required,
        config_path: String::new(),
    }
}

pub fn config_from(tables: &str, env: &ResonanceEnvConfig) -> Arc<ResonanceConfig> {
    let file = ResonanceFile::parse(tables).expect("tables parse");
    Arc::new(ResonanceConfig::build(file, env).expect("tables validate"))
}

pub fn default_config() -> Arc<ResonanceConfig> {
    config_from(TABLES, &env(2, 0, false))
}

pub fn service_with(
    config: Arc<ResonanceConfig>,
    notifier: MockNotificationService,
) -> (Arc<ResonanceService>, MockNotificationService) {
    let service = Arc::new(ResonanceService::new(
        config,
        Arc::new(notifier.clone()),
        std::time::Duration::from_secs(2),
    ));
    (service, notifier)
}

/// 2026-01-08 00:00:00 UTC plus `secs`
pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 8, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

/// Length of one 4h warm window (one bar)
pub const WARM_4H: i64 = 4 * 3600;
