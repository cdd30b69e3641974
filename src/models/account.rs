//! Account snapshot combining broker state with session counters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Read-only view of the account, fetched once per cycle. The broker fills
/// the money fields; the orchestrator overlays the daily counters it owns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account balance in the account currency
    pub balance: Decimal,

    /// Margin currently committed to open positions
    pub margin_used: Decimal,

    /// Margin available for new positions
    pub margin_available: Decimal,

    /// Realized P&L since the last UTC day reset
    pub daily_pnl: Decimal,

    /// Positions opened since the last UTC day reset
    pub trades_today: u32,

    /// Winning closes since the last UTC day reset
    pub winning_trades: u32,

    /// Losing closes since the last UTC day reset
    pub losing_trades: u32,
}
