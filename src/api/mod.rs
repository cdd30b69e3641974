//! Broker gateway: the interface the decision core consumes, plus the
//! OANDA implementation.

mod oanda_client;
pub mod types;

pub use oanda_client::OandaClient;

use anyhow::Result;

use crate::models::{AccountSnapshot, Position, PriceBar};

/// A market order request. Units are signed: positive buys, negative
/// sells. Fill-or-kill, so there are never partial fills to reconcile.
#[derive(Debug, Clone)]
pub struct MarketOrder {
    pub instrument: String,
    pub units: i64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

/// Synchronous-in-spirit broker interface: every call is awaited to
/// completion before the next, and a failed call means "unavailable this
/// tick", never retried within the tick.
#[allow(async_fn_in_trait)]
pub trait MarketGateway {
    /// Balance and margin; daily counters are overlaid by the caller.
    async fn account_snapshot(&self) -> Result<AccountSnapshot>;

    /// Latest mid price for an instrument.
    async fn current_price(&self, instrument: &str) -> Result<f64>;

    /// Up to `count` most recent candles, chronologically ascending.
    async fn historical_bars(
        &self,
        instrument: &str,
        count: usize,
        granularity: &str,
    ) -> Result<Vec<PriceBar>>;

    /// Place a fill-or-kill market order; returns the order ID.
    async fn place_market_order(&self, order: &MarketOrder) -> Result<String>;

    /// All open positions, at most one per instrument.
    async fn open_positions(&self) -> Result<Vec<Position>>;

    /// Close the position held in an instrument.
    async fn close_position(&self, instrument: &str) -> Result<()>;

    /// Replace the stop-loss order protecting an open position.
    async fn amend_stop_loss(&self, instrument: &str, level: f64) -> Result<()>;
}
