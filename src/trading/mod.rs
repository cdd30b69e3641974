//! Decision core: signal generation, risk management, and position
//! lifecycle.

mod config;
mod positions;
mod risk;
mod strategy;

pub use config::{AppConfig, RiskConfig, TradingConfig};
pub use positions::{PositionAction, PositionManager};
pub use risk::{
    correlated, daily_loss_gate, fixed_risk_position_size, kelly_fraction, volatility_adjust,
    RiskManager, RiskVerdict, TradeHistory, KELLY_MIN_TRADES, LOT_STEP,
};
pub use strategy::{
    build_strategy, pip_size, SignalDirection, SignalStrategy, StrategyConfig, TradeSignal,
};
