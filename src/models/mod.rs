//! Data models for price bars, account state, and positions.

mod account;
mod bar;
mod position;

pub use account::AccountSnapshot;
pub use bar::{closes, PriceBar};
pub use position::{Position, Side, TradeHistoryRecord};
