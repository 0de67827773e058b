// Market vocabulary
pub mod timeframe;
