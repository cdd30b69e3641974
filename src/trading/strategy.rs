//! Signal generation: strategy variants turning indicator values into a
//! directional trade signal with confidence and suggested stop/target.
//!
//! The variant is chosen once at startup by `build_strategy` and fixed for
//! the process lifetime. Confidence gating (demoting weak signals to Hold)
//! is a risk policy and lives in the risk manager, not here.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::indicators::{IndicatorParams, IndicatorSet};

use super::TradingConfig;

/// Strategy parameters shared by all variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Variant name: momentum, trend, mean_reversion, or hybrid
    pub name: String,

    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,

    /// Fast moving-average window
    pub ema_fast: usize,

    /// Slow moving-average window
    pub ema_slow: usize,

    pub atr_period: usize,

    pub adx_period: usize,

    /// Minimum ADX for the trend variant to act
    pub adx_threshold: f64,

    pub bb_period: usize,
    pub bb_std_multiplier: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            name: "momentum".to_string(),
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            ema_fast: 20,
            ema_slow: 50,
            atr_period: 14,
            adx_period: 14,
            adx_threshold: 25.0,
            bb_period: 20,
            bb_std_multiplier: 2.0,
        }
    }
}

impl StrategyConfig {
    pub fn indicator_params(&self) -> IndicatorParams {
        IndicatorParams {
            rsi_period: self.rsi_period,
            ema_fast: self.ema_fast,
            ema_slow: self.ema_slow,
            atr_period: self.atr_period,
            adx_period: self.adx_period,
            bb_period: self.bb_period,
            bb_std_multiplier: self.bb_std_multiplier,
        }
    }
}

/// Directional trade signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalDirection {
    Hold,
    Buy,
    Sell,
    StrongBuy,
    StrongSell,
}

impl SignalDirection {
    pub fn is_buy(&self) -> bool {
        matches!(self, SignalDirection::Buy | SignalDirection::StrongBuy)
    }

    pub fn is_sell(&self) -> bool {
        matches!(self, SignalDirection::Sell | SignalDirection::StrongSell)
    }

    pub fn is_hold(&self) -> bool {
        matches!(self, SignalDirection::Hold)
    }
}

impl std::fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SignalDirection::Hold => "HOLD",
            SignalDirection::Buy => "BUY",
            SignalDirection::Sell => "SELL",
            SignalDirection::StrongBuy => "STRONG BUY",
            SignalDirection::StrongSell => "STRONG SELL",
        };
        write!(f, "{s}")
    }
}

/// Produced fresh per evaluation; never mutated.
#[derive(Debug, Clone)]
pub struct TradeSignal {
    pub direction: SignalDirection,

    /// Confidence in [0, 1]
    pub confidence: f64,

    pub entry_price: f64,

    /// Suggested stop, absent on Hold
    pub stop_loss: Option<f64>,

    /// Suggested target, absent on Hold
    pub take_profit: Option<f64>,

    /// Which indicators drove the decision
    pub contributing_indicators: Vec<String>,

    /// Human-readable explanation for the log
    pub rationale: String,
}

impl TradeSignal {
    fn hold(entry_price: f64, rationale: impl Into<String>) -> Self {
        Self {
            direction: SignalDirection::Hold,
            confidence: 0.0,
            entry_price,
            stop_loss: None,
            take_profit: None,
            contributing_indicators: Vec::new(),
            rationale: rationale.into(),
        }
    }
}

/// Smallest price increment for a pair: 0.01 for JPY pairs, else 0.0001.
pub fn pip_size(instrument: &str) -> f64 {
    if instrument.contains("_JPY") {
        0.01
    } else {
        0.0001
    }
}

/// Stop and target for a directional entry: 2x/3x ATR when ATR is
/// available, otherwise the configured fixed pip distances.
fn stops_for(
    buying: bool,
    entry: f64,
    atr: f64,
    instrument: &str,
    stop_pips: f64,
    take_pips: f64,
) -> (f64, f64) {
    let (stop_dist, take_dist) = if atr > 0.0 {
        (2.0 * atr, 3.0 * atr)
    } else {
        let pip = pip_size(instrument);
        (stop_pips * pip, take_pips * pip)
    };

    if buying {
        (entry - stop_dist, entry + take_dist)
    } else {
        (entry + stop_dist, entry - take_dist)
    }
}

/// A strategy variant. Stateless; evaluated once per instrument per cycle.
pub trait SignalStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, instrument: &str, indicators: &IndicatorSet, current_price: f64)
        -> TradeSignal;
}

/// Select the strategy variant named in the config. Unknown names fall
/// back to momentum with a warning.
pub fn build_strategy(
    strategy: &StrategyConfig,
    trading: &TradingConfig,
) -> Box<dyn SignalStrategy> {
    let cfg = strategy.clone();
    let stop_pips = trading.stop_loss_pips;
    let take_pips = trading.take_profit_pips;

    match strategy.name.to_lowercase().as_str() {
        "momentum" => Box::new(MomentumStrategy { cfg, stop_pips, take_pips }),
        "trend" => Box::new(TrendStrategy { cfg, stop_pips, take_pips }),
        "mean_reversion" => Box::new(MeanReversionStrategy { cfg, stop_pips, take_pips }),
        "hybrid" => Box::new(HybridStrategy { cfg, stop_pips, take_pips }),
        other => {
            warn!(name = %other, "Unknown strategy name, falling back to momentum");
            Box::new(MomentumStrategy { cfg, stop_pips, take_pips })
        }
    }
}

// ==================== Sub-rule votes ====================

/// Baseline RSI/MA rule: oversold with fast MA above slow is a buy,
/// overbought with fast MA below slow is a sell.
fn momentum_vote(ind: &IndicatorSet, cfg: &StrategyConfig) -> i32 {
    if ind.ema_slow == 0.0 {
        return 0;
    }
    if ind.rsi < cfg.rsi_oversold && ind.ema_fast > ind.ema_slow {
        1
    } else if ind.rsi > cfg.rsi_overbought && ind.ema_fast < ind.ema_slow {
        -1
    } else {
        0
    }
}

/// Trend rule: only votes when ADX clears the threshold; direction from
/// the MA slope confirmed by price on the right side of the fast MA.
fn trend_vote(ind: &IndicatorSet, cfg: &StrategyConfig, price: f64) -> i32 {
    if ind.ema_slow == 0.0 || ind.adx < cfg.adx_threshold {
        return 0;
    }
    if ind.ema_fast > ind.ema_slow && price > ind.ema_fast {
        1
    } else if ind.ema_fast < ind.ema_slow && price < ind.ema_fast {
        -1
    } else {
        0
    }
}

/// Mean-reversion rule: fade a touch of either Bollinger band.
fn reversion_vote(ind: &IndicatorSet, price: f64) -> i32 {
    if ind.bb_upper == 0.0 && ind.bb_lower == 0.0 {
        return 0;
    }
    if price <= ind.bb_lower {
        1
    } else if price >= ind.bb_upper {
        -1
    } else {
        0
    }
}

// ==================== Variants ====================

/// RSI + moving-average crossover, the rule the simple bot shipped with.
pub struct MomentumStrategy {
    cfg: StrategyConfig,
    stop_pips: f64,
    take_pips: f64,
}

impl SignalStrategy for MomentumStrategy {
    fn name(&self) -> &'static str {
        "momentum"
    }

    fn evaluate(&self, instrument: &str, ind: &IndicatorSet, price: f64) -> TradeSignal {
        if ind.ema_slow == 0.0 {
            return TradeSignal::hold(price, "insufficient history for moving averages");
        }

        let (direction, confidence, rationale) = if ind.rsi < self.cfg.rsi_oversold
            && ind.ema_fast > ind.ema_slow
        {
            let strong = ind.rsi < self.cfg.rsi_oversold - 10.0;
            (
                if strong { SignalDirection::StrongBuy } else { SignalDirection::Buy },
                (0.5 + (self.cfg.rsi_oversold - ind.rsi) / 100.0).min(0.9),
                format!(
                    "RSI {:.1} below {:.0} with fast MA above slow MA",
                    ind.rsi, self.cfg.rsi_oversold
                ),
            )
        } else if ind.rsi > self.cfg.rsi_overbought && ind.ema_fast < ind.ema_slow {
            let strong = ind.rsi > self.cfg.rsi_overbought + 10.0;
            (
                if strong { SignalDirection::StrongSell } else { SignalDirection::Sell },
                (0.5 + (ind.rsi - self.cfg.rsi_overbought) / 100.0).min(0.9),
                format!(
                    "RSI {:.1} above {:.0} with fast MA below slow MA",
                    ind.rsi, self.cfg.rsi_overbought
                ),
            )
        } else {
            return TradeSignal::hold(
                price,
                format!("RSI {:.1} neutral or MA cross not confirming", ind.rsi),
            );
        };

        let (stop, target) = stops_for(
            direction.is_buy(),
            price,
            ind.atr,
            instrument,
            self.stop_pips,
            self.take_pips,
        );

        TradeSignal {
            direction,
            confidence,
            entry_price: price,
            stop_loss: Some(stop),
            take_profit: Some(target),
            contributing_indicators: vec![
                "rsi".to_string(),
                "ema_fast".to_string(),
                "ema_slow".to_string(),
            ],
            rationale,
        }
    }
}

/// ADX-gated trend following along the moving-average slope.
pub struct TrendStrategy {
    cfg: StrategyConfig,
    stop_pips: f64,
    take_pips: f64,
}

impl SignalStrategy for TrendStrategy {
    fn name(&self) -> &'static str {
        "trend"
    }

    fn evaluate(&self, instrument: &str, ind: &IndicatorSet, price: f64) -> TradeSignal {
        if ind.ema_slow == 0.0 {
            return TradeSignal::hold(price, "insufficient history for moving averages");
        }
        if ind.adx < self.cfg.adx_threshold {
            return TradeSignal::hold(
                price,
                format!("ADX {:.1} below trend threshold {:.0}", ind.adx, self.cfg.adx_threshold),
            );
        }

        let vote = trend_vote(ind, &self.cfg, price);
        if vote == 0 {
            return TradeSignal::hold(price, "trending but price not aligned with MA slope");
        }

        let strong = ind.adx >= self.cfg.adx_threshold * 1.6;
        let direction = match (vote > 0, strong) {
            (true, true) => SignalDirection::StrongBuy,
            (true, false) => SignalDirection::Buy,
            (false, true) => SignalDirection::StrongSell,
            (false, false) => SignalDirection::Sell,
        };
        let confidence = (ind.adx / 50.0).min(1.0);

        let (stop, target) = stops_for(
            direction.is_buy(),
            price,
            ind.atr,
            instrument,
            self.stop_pips,
            self.take_pips,
        );

        TradeSignal {
            direction,
            confidence,
            entry_price: price,
            stop_loss: Some(stop),
            take_profit: Some(target),
            contributing_indicators: vec![
                "adx".to_string(),
                "ema_fast".to_string(),
                "ema_slow".to_string(),
            ],
            rationale: format!(
                "ADX {:.1} confirms {} trend along MA slope",
                ind.adx,
                if vote > 0 { "up" } else { "down" }
            ),
        }
    }
}

/// Fade touches of the Bollinger bands.
pub struct MeanReversionStrategy {
    cfg: StrategyConfig,
    stop_pips: f64,
    take_pips: f64,
}

impl SignalStrategy for MeanReversionStrategy {
    fn name(&self) -> &'static str {
        "mean_reversion"
    }

    fn evaluate(&self, instrument: &str, ind: &IndicatorSet, price: f64) -> TradeSignal {
        let width = ind.bb_upper - ind.bb_lower;
        if (ind.bb_upper == 0.0 && ind.bb_lower == 0.0) || width <= 0.0 {
            return TradeSignal::hold(price, "insufficient history for Bollinger bands");
        }

        let vote = reversion_vote(ind, price);
        if vote == 0 {
            return TradeSignal::hold(price, "price inside Bollinger bands");
        }

        // Penetration depth beyond the band, as a fraction of band width.
        let penetration = if vote > 0 {
            (ind.bb_lower - price) / width
        } else {
            (price - ind.bb_upper) / width
        };
        let strong = penetration > 0.25;
        let direction = match (vote > 0, strong) {
            (true, true) => SignalDirection::StrongBuy,
            (true, false) => SignalDirection::Buy,
            (false, true) => SignalDirection::StrongSell,
            (false, false) => SignalDirection::Sell,
        };
        let confidence = (0.5 + penetration).min(0.9);

        let (stop, target) = stops_for(
            direction.is_buy(),
            price,
            ind.atr,
            instrument,
            self.stop_pips,
            self.take_pips,
        );

        TradeSignal {
            direction,
            confidence,
            entry_price: price,
            stop_loss: Some(stop),
            take_profit: Some(target),
            contributing_indicators: vec!["bb_upper".to_string(), "bb_lower".to_string()],
            rationale: format!(
                "price {:.5} {} band ({:.5} / {:.5})",
                price,
                if vote > 0 { "at or below lower" } else { "at or above upper" },
                ind.bb_lower,
                ind.bb_upper
            ),
        }
    }
}

/// Vote aggregation across the momentum, trend, and mean-reversion rules.
///
/// Confidence is the fraction of sub-rules agreeing on the direction; when
/// the trend rule is among them it is scaled by ADX strength relative to
/// the threshold (clamped to [0.8, 1.2]).
pub struct HybridStrategy {
    cfg: StrategyConfig,
    stop_pips: f64,
    take_pips: f64,
}

impl SignalStrategy for HybridStrategy {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn evaluate(&self, instrument: &str, ind: &IndicatorSet, price: f64) -> TradeSignal {
        if ind.ema_slow == 0.0 {
            return TradeSignal::hold(price, "insufficient history for moving averages");
        }

        let votes = [
            ("momentum", momentum_vote(ind, &self.cfg)),
            ("trend", trend_vote(ind, &self.cfg, price)),
            ("reversion", reversion_vote(ind, price)),
        ];

        let buys = votes.iter().filter(|(_, v)| *v > 0).count();
        let sells = votes.iter().filter(|(_, v)| *v < 0).count();

        if buys == sells {
            return TradeSignal::hold(price, "sub-rules disagree or are neutral");
        }

        let buying = buys > sells;
        let agreeing = buys.max(sells);
        let mut confidence = agreeing as f64 / votes.len() as f64;

        let trend_agrees = votes[1].1 != 0 && (votes[1].1 > 0) == buying;
        if trend_agrees && self.cfg.adx_threshold > 0.0 {
            confidence =
                (confidence * (ind.adx / self.cfg.adx_threshold).clamp(0.8, 1.2)).min(1.0);
        }

        let direction = match (buying, agreeing == votes.len()) {
            (true, true) => SignalDirection::StrongBuy,
            (true, false) => SignalDirection::Buy,
            (false, true) => SignalDirection::StrongSell,
            (false, false) => SignalDirection::Sell,
        };

        let contributing: Vec<String> = votes
            .iter()
            .filter(|(_, v)| *v != 0 && (*v > 0) == buying)
            .map(|(name, _)| name.to_string())
            .collect();

        let (stop, target) = stops_for(
            buying,
            price,
            ind.atr,
            instrument,
            self.stop_pips,
            self.take_pips,
        );

        TradeSignal {
            direction,
            confidence,
            entry_price: price,
            stop_loss: Some(stop),
            take_profit: Some(target),
            rationale: format!(
                "{}/{} sub-rules vote {} ({})",
                agreeing,
                votes.len(),
                if buying { "buy" } else { "sell" },
                contributing.join("+")
            ),
            contributing_indicators: contributing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indicators() -> IndicatorSet {
        IndicatorSet {
            rsi: 50.0,
            ema_fast: 1.1010,
            ema_slow: 1.1000,
            atr: 0.0012,
            adx: 30.0,
            bb_upper: 1.1060,
            bb_lower: 1.0960,
        }
    }

    fn trading() -> TradingConfig {
        TradingConfig::default()
    }

    #[test]
    fn factory_selects_variant() {
        let cfg = StrategyConfig::default();
        assert_eq!(build_strategy(&cfg, &trading()).name(), "momentum");

        let cfg = StrategyConfig { name: "trend".to_string(), ..Default::default() };
        assert_eq!(build_strategy(&cfg, &trading()).name(), "trend");

        let cfg = StrategyConfig { name: "mean_reversion".to_string(), ..Default::default() };
        assert_eq!(build_strategy(&cfg, &trading()).name(), "mean_reversion");

        let cfg = StrategyConfig { name: "hybrid".to_string(), ..Default::default() };
        assert_eq!(build_strategy(&cfg, &trading()).name(), "hybrid");

        let cfg = StrategyConfig { name: "nonsense".to_string(), ..Default::default() };
        assert_eq!(build_strategy(&cfg, &trading()).name(), "momentum");
    }

    #[test]
    fn momentum_buys_oversold_with_bullish_cross() {
        let strategy = build_strategy(&StrategyConfig::default(), &trading());
        let mut ind = indicators();
        ind.rsi = 25.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1005);
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert!(signal.confidence >= 0.5);
        assert!(signal.stop_loss.unwrap() < 1.1005);
        assert!(signal.take_profit.unwrap() > 1.1005);
    }

    #[test]
    fn momentum_strong_buy_on_deep_oversold() {
        let strategy = build_strategy(&StrategyConfig::default(), &trading());
        let mut ind = indicators();
        ind.rsi = 15.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1005);
        assert_eq!(signal.direction, SignalDirection::StrongBuy);
    }

    #[test]
    fn momentum_holds_without_ma_confirmation() {
        let strategy = build_strategy(&StrategyConfig::default(), &trading());
        let mut ind = indicators();
        ind.rsi = 25.0;
        ind.ema_fast = 1.0990; // below slow MA

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1005);
        assert_eq!(signal.direction, SignalDirection::Hold);
    }

    #[test]
    fn momentum_sells_overbought_with_bearish_cross() {
        let strategy = build_strategy(&StrategyConfig::default(), &trading());
        let mut ind = indicators();
        ind.rsi = 75.0;
        ind.ema_fast = 1.0990;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1005);
        assert_eq!(signal.direction, SignalDirection::Sell);
        assert!(signal.stop_loss.unwrap() > 1.1005);
        assert!(signal.take_profit.unwrap() < 1.1005);
    }

    #[test]
    fn momentum_holds_on_insufficient_data() {
        let strategy = build_strategy(&StrategyConfig::default(), &trading());
        let mut ind = indicators();
        ind.ema_fast = 0.0;
        ind.ema_slow = 0.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1005);
        assert_eq!(signal.direction, SignalDirection::Hold);
        assert_eq!(signal.confidence, 0.0);
    }

    #[test]
    fn trend_holds_below_adx_threshold() {
        let cfg = StrategyConfig { name: "trend".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let mut ind = indicators();
        ind.adx = 12.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1020);
        assert_eq!(signal.direction, SignalDirection::Hold);
    }

    #[test]
    fn trend_buys_with_price_above_rising_fast_ma() {
        let cfg = StrategyConfig { name: "trend".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let ind = indicators(); // adx 30, fast > slow

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1020);
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert!((signal.confidence - 0.6).abs() < 1e-9); // adx 30 / 50
    }

    #[test]
    fn trend_strong_signal_on_high_adx() {
        let cfg = StrategyConfig { name: "trend".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let mut ind = indicators();
        ind.adx = 45.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1020);
        assert_eq!(signal.direction, SignalDirection::StrongBuy);
    }

    #[test]
    fn mean_reversion_buys_lower_band_touch() {
        let cfg = StrategyConfig { name: "mean_reversion".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let ind = indicators();

        let signal = strategy.evaluate("EUR_USD", &ind, 1.0955);
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert!(signal.confidence >= 0.5);
    }

    #[test]
    fn mean_reversion_sells_upper_band_touch() {
        let cfg = StrategyConfig { name: "mean_reversion".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let ind = indicators();

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1065);
        assert_eq!(signal.direction, SignalDirection::Sell);
    }

    #[test]
    fn mean_reversion_holds_inside_bands() {
        let cfg = StrategyConfig { name: "mean_reversion".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let ind = indicators();

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1010);
        assert_eq!(signal.direction, SignalDirection::Hold);
    }

    #[test]
    fn hybrid_confidence_is_agreement_fraction() {
        let cfg = StrategyConfig { name: "hybrid".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());

        // Momentum and reversion vote buy; trend abstains (price below fast MA).
        let mut ind = indicators();
        ind.rsi = 25.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.0955);
        assert_eq!(signal.direction, SignalDirection::Buy);
        assert!((signal.confidence - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(signal.contributing_indicators, vec!["momentum", "reversion"]);
    }

    #[test]
    fn hybrid_scales_confidence_by_adx_when_trend_agrees() {
        let cfg = StrategyConfig { name: "hybrid".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());

        // Momentum and trend vote buy: price above fast MA, oversold RSI.
        let mut ind = indicators();
        ind.rsi = 25.0;
        ind.adx = 30.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1020);
        assert_eq!(signal.direction, SignalDirection::Buy);
        // 2/3 scaled by min(30/25, 1.2)
        assert!((signal.confidence - (2.0 / 3.0) * 1.2).abs() < 1e-9);
    }

    #[test]
    fn hybrid_holds_when_votes_cancel() {
        let cfg = StrategyConfig { name: "hybrid".to_string(), ..Default::default() };
        let strategy = build_strategy(&cfg, &trading());
        let ind = indicators(); // everything neutral at mid price

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1010);
        assert_eq!(signal.direction, SignalDirection::Hold);
    }

    #[test]
    fn stops_fall_back_to_pips_without_atr() {
        let strategy = build_strategy(&StrategyConfig::default(), &trading());
        let mut ind = indicators();
        ind.rsi = 25.0;
        ind.atr = 0.0;

        let signal = strategy.evaluate("EUR_USD", &ind, 1.1000);
        // 20 pips stop, 40 pips target at 0.0001 per pip
        assert!((signal.stop_loss.unwrap() - 1.0980).abs() < 1e-9);
        assert!((signal.take_profit.unwrap() - 1.1040).abs() < 1e-9);
    }

    #[test]
    fn jpy_pairs_use_wider_pip() {
        assert_eq!(pip_size("USD_JPY"), 0.01);
        assert_eq!(pip_size("EUR_USD"), 0.0001);
    }
}
