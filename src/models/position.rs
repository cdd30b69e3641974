//! Open-position model. Positions are owned by the broker; the core only
//! observes them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// Sign applied to unit counts when placing orders.
    pub fn sign(&self) -> i64 {
        match self {
            Side::Long => 1,
            Side::Short => -1,
        }
    }

    /// Side implied by a signed unit count. Zero units default to Long;
    /// the broker never reports a zero-unit open position.
    pub fn from_units(units: i64) -> Self {
        if units < 0 {
            Side::Short
        } else {
            Side::Long
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// An open position as reported by the broker. Exactly one position per
/// instrument at any time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Instrument name, e.g. "EUR_USD"
    pub instrument: String,

    /// Held direction
    pub side: Side,

    /// Absolute unit count
    pub units: i64,

    /// Average entry price
    pub entry_price: f64,

    /// Unrealized P&L in the account currency
    pub unrealized_pnl: Decimal,

    /// When the position was opened
    pub opened_at: DateTime<Utc>,
}

impl Position {
    pub fn is_profitable(&self) -> bool {
        self.unrealized_pnl > Decimal::ZERO
    }
}

/// Outcome of a closed trade, kept for Kelly statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeHistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub instrument: String,
    pub realized_pnl: Decimal,
}
