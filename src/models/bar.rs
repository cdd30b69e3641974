//! OHLCV price bar as returned by the candle endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single price candle. Immutable once produced; series are ordered
/// chronologically ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// Bar from a close price alone, for tests and synthetic series.
    #[cfg(test)]
    pub fn from_close(time: DateTime<Utc>, close: f64) -> Self {
        Self {
            time,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Extract the close prices of a series.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
