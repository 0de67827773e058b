use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart timeframe an indicator reading was computed on.
///
/// Variants are declared from fastest to slowest so the derived `Ord`
/// matches bar duration; combination canonicalisation relies on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    ThirtySec,
    OneMin,
    ThreeMin,
    FiveMin,
    FifteenMin,
    ThirtyMin,
    FortyFiveMin,
    OneHour,
    TwoHour,
    FourHour,
    SixHour,
    EightHour,
    TwelveHour,
    OneDay,
    OneWeek,
}

impl Timeframe {
    /// Returns the nominal bar duration in seconds
    pub fn to_seconds(&self) -> i64 {
        match self {
            Timeframe::ThirtySec => 30,
            Timeframe::OneMin => 60,
            Timeframe::ThreeMin => 180,
            Timeframe::FiveMin => 300,
            Timeframe::FifteenMin => 900,
            Timeframe::ThirtyMin => 1_800,
            Timeframe::FortyFiveMin => 2_700,
            Timeframe::OneHour => 3_600,
            Timeframe::TwoHour => 7_200,
            Timeframe::FourHour => 14_400,
            Timeframe::SixHour => 21_600,
            Timeframe::EightHour => 28_800,
            Timeframe::TwelveHour => 43_200,
            Timeframe::OneDay => 86_400,
            Timeframe::OneWeek => 604_800,
        }
    }

    /// Canonical short label, e.g. "15m" or "1d"
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::ThirtySec => "30s",
            Timeframe::OneMin => "1m",
            Timeframe::ThreeMin => "3m",
            Timeframe::FiveMin => "5m",
            Timeframe::FifteenMin => "15m",
            Timeframe::ThirtyMin => "30m",
            Timeframe::FortyFiveMin => "45m",
            Timeframe::OneHour => "1h",
            Timeframe::TwoHour => "2h",
            Timeframe::FourHour => "4h",
            Timeframe::SixHour => "6h",
            Timeframe::EightHour => "8h",
            Timeframe::TwelveHour => "12h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
        }
    }

    /// Returns all timeframes in ascending order
    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::ThirtySec,
            Timeframe::OneMin,
            Timeframe::ThreeMin,
            Timeframe::FiveMin,
            Timeframe::FifteenMin,
            Timeframe::ThirtyMin,
            Timeframe::FortyFiveMin,
            Timeframe::OneHour,
            Timeframe::TwoHour,
            Timeframe::FourHour,
            Timeframe::SixHour,
            Timeframe::EightHour,
            Timeframe::TwelveHour,
            Timeframe::OneDay,
            Timeframe::OneWeek,
        ]
    }

    /// Maps a TradingView `interval` field ("60", "240", "D", ...) to a timeframe.
    ///
    /// Falls back to the regular label parser so alerts that already send
    /// "1h" style labels pass through.
    pub fn from_tradingview(raw: &str) -> Option<Timeframe> {
        let tf = match raw.trim() {
            "1" => Timeframe::OneMin,
            "3" => Timeframe::ThreeMin,
            "5" => Timeframe::FiveMin,
            "15" => Timeframe::FifteenMin,
            "30" => Timeframe::ThirtyMin,
            "45" => Timeframe::FortyFiveMin,
            "60" => Timeframe::OneHour,
            "120" => Timeframe::TwoHour,
            "240" => Timeframe::FourHour,
            "360" => Timeframe::SixHour,
            "480" => Timeframe::EightHour,
            "720" => Timeframe::TwelveHour,
            "D" | "1D" => Timeframe::OneDay,
            "W" | "1W" => Timeframe::OneWeek,
            other => return other.parse().ok(),
        };
        Some(tf)
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "30s" => Ok(Timeframe::ThirtySec),
            "1m" | "1min" => Ok(Timeframe::OneMin),
            "3m" | "3min" => Ok(Timeframe::ThreeMin),
            "5m" | "5min" => Ok(Timeframe::FiveMin),
            "15m" | "15min" => Ok(Timeframe::FifteenMin),
            "30m" | "30min" => Ok(Timeframe::ThirtyMin),
            "45m" | "45min" => Ok(Timeframe::FortyFiveMin),
            "1h" | "1hour" => Ok(Timeframe::OneHour),
            "2h" | "2hour" => Ok(Timeframe::TwoHour),
            "4h" | "4hour" => Ok(Timeframe::FourHour),
            "6h" | "6hour" => Ok(Timeframe::SixHour),
            "8h" | "8hour" => Ok(Timeframe::EightHour),
            "12h" | "12hour" => Ok(Timeframe::TwelveHour),
            "1d" | "1day" => Ok(Timeframe::OneDay),
            "1w" | "1week" => Ok(Timeframe::OneWeek),
            _ => Err(anyhow!(
                "Invalid timeframe: '{}'. Valid options: 30s, 1m, 3m, 5m, 15m, 30m, 45m, 1h, 2h, 4h, 6h, 8h, 12h, 1d, 1w",
                s
            )),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
