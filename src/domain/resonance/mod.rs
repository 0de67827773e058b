pub mod combination;
pub mod types;

pub use combination::Combination;
pub use types::{
    Destination, IndicatorSignal, NormalizedEvent, Polarity, Thresholds, ZoneState,
};
