//! Trading, risk, and file-level configuration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::strategy::StrategyConfig;

/// Instrument selection and order parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingConfig {
    /// Instruments to trade, in priority order
    pub instruments: Vec<String>,

    /// Maximum concurrent positions
    pub max_positions: usize,

    /// Baseline order size in units. Informational; actual sizes come
    /// from risk-based sizing, and stopless signals are rejected outright
    pub position_size_base: i64,

    /// Stop loss distance in pips, used when ATR is unavailable
    pub stop_loss_pips: f64,

    /// Take profit distance in pips, used when ATR is unavailable
    pub take_profit_pips: f64,

    /// Candles fetched per evaluation
    pub history_bars: usize,

    /// Candle granularity (OANDA code, e.g. "M5")
    pub granularity: String,
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            instruments: vec!["EUR_USD".to_string(), "GBP_USD".to_string()],
            max_positions: 2,
            position_size_base: 1000,
            stop_loss_pips: 20.0,
            take_profit_pips: 40.0,
            history_bars: 100,
            granularity: "M5".to_string(),
        }
    }
}

/// Risk policy. Immutable for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Fraction of balance risked per trade (0.0 to 1.0)
    pub max_risk_per_trade: Decimal,

    /// Daily loss fraction that trips the circuit breaker (0.0 to 1.0)
    pub max_daily_loss: Decimal,

    /// Scale position size with volatility
    pub position_scaling: bool,

    /// Size with the Kelly criterion once enough history exists
    pub use_kelly_criterion: bool,

    /// Signals below this confidence are demoted to Hold
    pub min_confidence: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk_per_trade: dec!(0.01), // Risk 1% per trade
            max_daily_loss: dec!(0.05),     // Halt at 5% daily loss
            position_scaling: true,
            use_kelly_criterion: false,
            min_confidence: 0.5,
        }
    }
}

/// Top-level configuration loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// OANDA account ID
    #[serde(default)]
    pub account_id: String,

    /// OANDA API access token
    #[serde(default)]
    pub access_token: String,

    /// Use the practice (demo) environment
    #[serde(default = "default_practice")]
    pub practice: bool,

    /// Seconds between trading cycles
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default)]
    pub trading: TradingConfig,

    #[serde(default)]
    pub strategy: StrategyConfig,

    #[serde(default)]
    pub risk: RiskConfig,
}

fn default_practice() -> bool {
    true
}

fn default_poll_interval() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            access_token: String::new(),
            practice: true,
            poll_interval_secs: 300,
            trading: TradingConfig::default(),
            strategy: StrategyConfig::default(),
            risk: RiskConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, then let the environment
    /// override credentials (OANDA_ACCOUNT_ID / OANDA_API_TOKEN).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid JSON in config file {}", path.display()))?;
        config.apply_env();
        Ok(config)
    }

    /// Credentials from the environment win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(account_id) = std::env::var("OANDA_ACCOUNT_ID") {
            self.account_id = account_id;
        }
        if let Ok(token) = std::env::var("OANDA_API_TOKEN") {
            self.access_token = token;
        }
    }
}
