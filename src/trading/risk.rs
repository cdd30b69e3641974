//! Risk management: fixed-fractional and Kelly position sizing, volatility
//! scaling, correlation exposure limits, and the daily loss circuit
//! breaker.
//!
//! Checks run in sequence per candidate; the first failure short-circuits
//! with a reason. A rejection is a deliberate no-trade outcome, not an
//! error.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{AccountSnapshot, Position, TradeHistoryRecord};

use super::strategy::TradeSignal;
use super::RiskConfig;

/// Unit sizes are non-negative multiples of this before direction sign is
/// applied.
pub const LOT_STEP: i64 = 100;

/// Kelly sizing is only trusted once this many closed trades exist.
pub const KELLY_MIN_TRADES: usize = 20;

const HISTORY_CAPACITY: usize = 100;

/// Fixed-capacity ring of closed-trade outcomes, oldest evicted first.
/// Used only to estimate Kelly statistics.
#[derive(Debug, Default)]
pub struct TradeHistory {
    records: VecDeque<TradeHistoryRecord>,
}

/// Win/loss statistics extracted from the trade history.
#[derive(Debug, Clone, Copy)]
pub struct KellyStats {
    pub win_rate: f64,
    pub avg_win: Decimal,
    pub avg_loss: Decimal,
}

impl TradeHistory {
    pub fn new() -> Self {
        Self { records: VecDeque::with_capacity(HISTORY_CAPACITY) }
    }

    /// O(1) append with automatic oldest-eviction at capacity.
    pub fn record(&mut self, timestamp: DateTime<Utc>, instrument: &str, realized_pnl: Decimal) {
        if self.records.len() == HISTORY_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(TradeHistoryRecord {
            timestamp,
            instrument: instrument.to_string(),
            realized_pnl,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Win rate and average win/loss magnitudes. `None` until at least one
    /// win and one loss exist; Kelly is undefined without both.
    pub fn stats(&self) -> Option<KellyStats> {
        let mut wins = Vec::new();
        let mut losses = Vec::new();

        for record in &self.records {
            if record.realized_pnl > Decimal::ZERO {
                wins.push(record.realized_pnl);
            } else {
                losses.push(-record.realized_pnl);
            }
        }

        if wins.is_empty() || losses.is_empty() {
            return None;
        }

        let avg_win = wins.iter().sum::<Decimal>() / Decimal::from(wins.len());
        let avg_loss = losses.iter().sum::<Decimal>() / Decimal::from(losses.len());
        let win_rate = wins.len() as f64 / self.records.len() as f64;

        Some(KellyStats { win_rate, avg_win, avg_loss })
    }
}

/// Outcome of risk evaluation for one candidate entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskVerdict {
    /// Trade approved at this unsigned unit size.
    Approved { units: i64 },
    /// Deliberate no-trade outcome with the failing check's reason.
    Rejected { reason: String },
}

impl RiskVerdict {
    fn rejected(reason: impl Into<String>) -> Self {
        RiskVerdict::Rejected { reason: reason.into() }
    }
}

/// Converts a signal and account state into a concrete, bounded position
/// size.
pub struct RiskManager {
    config: RiskConfig,
}

impl RiskManager {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// Apply all risk checks in sequence for a candidate instrument.
    ///
    /// `current_atr` and `average_atr` feed the volatility adjustment;
    /// either being zero skips it.
    pub fn evaluate(
        &self,
        instrument: &str,
        signal: &TradeSignal,
        account: &AccountSnapshot,
        open_positions: &[Position],
        history: &TradeHistory,
        current_atr: f64,
        average_atr: f64,
    ) -> RiskVerdict {
        // Weak signals are demoted to Hold here: the threshold is a risk
        // policy knob, not a strategy concern.
        if signal.confidence < self.config.min_confidence {
            return RiskVerdict::rejected(format!(
                "confidence {:.2} below threshold {:.2}",
                signal.confidence, self.config.min_confidence
            ));
        }

        if daily_loss_gate(account.daily_pnl, account.balance, self.config.max_daily_loss) {
            return RiskVerdict::rejected(format!(
                "daily loss gate: {} <= -{} * {}",
                account.daily_pnl, account.balance, self.config.max_daily_loss
            ));
        }

        for position in open_positions {
            if correlated(instrument, &position.instrument) {
                return RiskVerdict::rejected(format!(
                    "correlated with open position {}",
                    position.instrument
                ));
            }
        }

        let Some(stop_loss) = signal.stop_loss else {
            return RiskVerdict::rejected("signal carries no stop loss");
        };
        let stop_distance = (signal.entry_price - stop_loss).abs();

        let risk_fraction = self.risk_fraction(history);
        let mut units = fixed_risk_position_size(account.balance, stop_distance, risk_fraction);

        if self.config.position_scaling {
            units = round_down_to_lot(volatility_adjust(units, current_atr, average_atr));
        }

        if units < LOT_STEP {
            return RiskVerdict::rejected(format!("size {units} below one lot ({LOT_STEP})"));
        }

        debug!(
            instrument = %instrument,
            units = units,
            risk_fraction = %risk_fraction,
            "Risk checks passed"
        );

        RiskVerdict::Approved { units }
    }

    /// Kelly fraction once enough history exists, otherwise the configured
    /// per-trade cap.
    fn risk_fraction(&self, history: &TradeHistory) -> Decimal {
        if !self.config.use_kelly_criterion || history.len() < KELLY_MIN_TRADES {
            return self.config.max_risk_per_trade;
        }

        match history.stats() {
            Some(stats) => kelly_fraction(
                stats.win_rate,
                stats.avg_win,
                stats.avg_loss,
                self.config.max_risk_per_trade,
            ),
            None => self.config.max_risk_per_trade,
        }
    }
}

/// Fixed-fractional size: `(balance * risk_fraction) / stop_distance`,
/// floored to the nearest lot step. Floor-toward-zero keeps the realized
/// risk at or under the configured fraction.
pub fn fixed_risk_position_size(
    balance: Decimal,
    stop_distance: f64,
    risk_fraction: Decimal,
) -> i64 {
    if stop_distance <= 0.0 {
        return 0;
    }
    let Ok(stop) = Decimal::try_from(stop_distance) else {
        return 0;
    };
    if stop.is_zero() {
        return 0;
    }

    let raw = (balance * risk_fraction / stop).floor();
    round_down_to_lot(raw.to_i64().unwrap_or(0))
}

/// Kelly criterion: `f* = p - (1 - p) / (avg_win / avg_loss)`, clipped to
/// `[0, cap]`.
pub fn kelly_fraction(win_rate: f64, avg_win: Decimal, avg_loss: Decimal, cap: Decimal) -> Decimal {
    if avg_loss <= Decimal::ZERO || avg_win <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let payoff = (avg_win / avg_loss).to_f64().unwrap_or(0.0);
    if payoff <= 0.0 {
        return Decimal::ZERO;
    }

    let kelly = win_rate - (1.0 - win_rate) / payoff;
    if kelly <= 0.0 {
        return Decimal::ZERO;
    }

    Decimal::try_from(kelly).unwrap_or(Decimal::ZERO).min(cap)
}

/// Scale `units` by `average_atr / current_atr`, clamped to [0.5x, 1.5x]:
/// shrink in abnormally volatile conditions, cap the boost in quiet ones.
/// A zero or missing ATR on either side skips the adjustment.
pub fn volatility_adjust(units: i64, current_atr: f64, average_atr: f64) -> i64 {
    if current_atr <= 0.0 || average_atr <= 0.0 {
        return units;
    }

    let scale = (average_atr / current_atr).clamp(0.5, 1.5);
    (units as f64 * scale).floor() as i64
}

/// Coarse correlation proxy: two instruments are correlated when they
/// share the same base (first) currency code. EUR_USD and EUR_GBP conflict;
/// EUR_USD and USD_JPY do not. Deliberately not a statistical measure.
pub fn correlated(a: &str, b: &str) -> bool {
    match (a.split('_').next(), b.split('_').next()) {
        (Some(base_a), Some(base_b)) => !base_a.is_empty() && base_a == base_b,
        _ => false,
    }
}

/// True once `daily_pnl <= -balance * max_daily_loss`; the block persists
/// until the daily counters reset.
pub fn daily_loss_gate(daily_pnl: Decimal, balance: Decimal, max_daily_loss: Decimal) -> bool {
    daily_pnl <= -(balance * max_daily_loss)
}

fn round_down_to_lot(units: i64) -> i64 {
    (units.max(0) / LOT_STEP) * LOT_STEP
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trading::strategy::{SignalDirection, TradeSignal};
    use rust_decimal_macros::dec;

    fn buy_signal(entry: f64, stop: f64, confidence: f64) -> TradeSignal {
        TradeSignal {
            direction: SignalDirection::Buy,
            confidence,
            entry_price: entry,
            stop_loss: Some(stop),
            take_profit: Some(entry + 2.0 * (entry - stop)),
            contributing_indicators: vec!["rsi".to_string()],
            rationale: "test".to_string(),
        }
    }

    fn account(balance: Decimal, daily_pnl: Decimal) -> AccountSnapshot {
        AccountSnapshot {
            balance,
            margin_available: balance,
            daily_pnl,
            ..Default::default()
        }
    }

    #[test]
    fn fixed_risk_sizing_follows_formula() {
        // 10000 * 0.01 / 0.0020 = 50000, already on the lot step
        assert_eq!(fixed_risk_position_size(dec!(10000), 0.0020, dec!(0.01)), 50_000);

        // 10000 * 0.01 / 0.0015 = 66666.67 -> floor to 66600
        assert_eq!(fixed_risk_position_size(dec!(10000), 0.0015, dec!(0.01)), 66_600);
    }

    #[test]
    fn fixed_risk_sizing_floors_below_lot_to_zero() {
        // 100 * 0.01 / 0.0150 = 66.67 -> below one lot
        assert_eq!(fixed_risk_position_size(dec!(100), 0.0150, dec!(0.01)), 0);
    }

    #[test]
    fn fixed_risk_sizing_rejects_zero_stop() {
        assert_eq!(fixed_risk_position_size(dec!(10000), 0.0, dec!(0.01)), 0);
    }

    #[test]
    fn kelly_clips_to_cap() {
        // 0.6 - 0.4 / (100/50) = 0.4, clipped to 0.01
        assert_eq!(kelly_fraction(0.6, dec!(100), dec!(50), dec!(0.01)), dec!(0.01));
    }

    #[test]
    fn kelly_unclipped_value() {
        let f = kelly_fraction(0.6, dec!(100), dec!(50), dec!(1));
        assert!((f - dec!(0.4)).abs() < dec!(0.0001));
    }

    #[test]
    fn kelly_negative_edge_is_zero() {
        // 0.3 - 0.7 / 0.5 = -1.1
        assert_eq!(kelly_fraction(0.3, dec!(50), dec!(100), dec!(0.01)), Decimal::ZERO);
    }

    #[test]
    fn volatility_adjust_clamps_both_ways() {
        // Twice the usual volatility: halve
        assert_eq!(volatility_adjust(1000, 0.0020, 0.0010), 500);
        // Quarter of usual volatility: clamp boost at 1.5x
        assert_eq!(volatility_adjust(1000, 0.0005, 0.0020), 1500);
        // Missing ATR: untouched
        assert_eq!(volatility_adjust(1000, 0.0, 0.0010), 1000);
        assert_eq!(volatility_adjust(1000, 0.0010, 0.0), 1000);
    }

    #[test]
    fn correlation_matches_base_currency_only() {
        assert!(correlated("EUR_USD", "EUR_GBP"));
        assert!(!correlated("EUR_USD", "USD_JPY"));
        assert!(!correlated("EUR_USD", "GBP_USD"));
        assert!(correlated("USD_JPY", "USD_CHF"));
    }

    #[test]
    fn daily_gate_blocks_at_threshold() {
        assert!(daily_loss_gate(dec!(-600), dec!(10000), dec!(0.05)));
        assert!(daily_loss_gate(dec!(-500), dec!(10000), dec!(0.05)));
        assert!(!daily_loss_gate(dec!(-499), dec!(10000), dec!(0.05)));
        assert!(!daily_loss_gate(dec!(250), dec!(10000), dec!(0.05)));
    }

    #[test]
    fn history_evicts_oldest_at_capacity() {
        let mut history = TradeHistory::new();
        for i in 0..150 {
            history.record(Utc::now(), "EUR_USD", Decimal::from(i));
        }
        assert_eq!(history.len(), 100);
        // Oldest 50 evicted: remaining P&Ls are 50..150
        assert!(history.records.iter().all(|r| r.realized_pnl >= dec!(50)));
    }

    #[test]
    fn history_stats_need_both_wins_and_losses() {
        let mut history = TradeHistory::new();
        assert!(history.is_empty());

        history.record(Utc::now(), "EUR_USD", dec!(10));
        assert!(history.stats().is_none());

        history.record(Utc::now(), "EUR_USD", dec!(-5));
        let stats = history.stats().unwrap();
        assert!((stats.win_rate - 0.5).abs() < 1e-9);
        assert_eq!(stats.avg_win, dec!(10));
        assert_eq!(stats.avg_loss, dec!(5));
    }

    #[test]
    fn evaluate_approves_sized_trade() {
        let manager = RiskManager::new(RiskConfig::default());
        let signal = buy_signal(1.1000, 1.0985, 0.8); // 15 pip stop
        let account = account(dec!(10000), Decimal::ZERO);

        let verdict = manager.evaluate(
            "EUR_USD",
            &signal,
            &account,
            &[],
            &TradeHistory::new(),
            0.0,
            0.0,
        );

        // 10000 * 0.01 / 0.0015 floored to lot step
        assert_eq!(verdict, RiskVerdict::Approved { units: 66_600 });
    }

    #[test]
    fn evaluate_demotes_low_confidence() {
        let manager = RiskManager::new(RiskConfig::default());
        let signal = buy_signal(1.1000, 1.0985, 0.4);
        let account = account(dec!(10000), Decimal::ZERO);

        let verdict =
            manager.evaluate("EUR_USD", &signal, &account, &[], &TradeHistory::new(), 0.0, 0.0);
        assert!(matches!(verdict, RiskVerdict::Rejected { ref reason } if reason.contains("confidence")));
    }

    #[test]
    fn evaluate_blocks_on_daily_loss() {
        let manager = RiskManager::new(RiskConfig::default());
        let signal = buy_signal(1.1000, 1.0985, 0.8);
        let account = account(dec!(10000), dec!(-600));

        let verdict =
            manager.evaluate("EUR_USD", &signal, &account, &[], &TradeHistory::new(), 0.0, 0.0);
        assert!(matches!(verdict, RiskVerdict::Rejected { ref reason } if reason.contains("daily loss")));
    }

    #[test]
    fn evaluate_rejects_correlated_candidate() {
        let manager = RiskManager::new(RiskConfig::default());
        let signal = buy_signal(1.1000, 1.0985, 0.8);
        let account = account(dec!(10000), Decimal::ZERO);
        let open = vec![Position {
            instrument: "EUR_GBP".to_string(),
            side: crate::models::Side::Long,
            units: 1000,
            entry_price: 0.8500,
            unrealized_pnl: Decimal::ZERO,
            opened_at: Utc::now(),
        }];

        let verdict =
            manager.evaluate("EUR_USD", &signal, &account, &open, &TradeHistory::new(), 0.0, 0.0);
        assert!(matches!(verdict, RiskVerdict::Rejected { ref reason } if reason.contains("correlated")));
    }

    #[test]
    fn evaluate_rejects_below_one_lot() {
        let manager = RiskManager::new(RiskConfig::default());
        // Tiny balance, wide stop: raw size under one lot step
        let signal = buy_signal(1.1000, 1.0850, 0.8);
        let account = account(dec!(100), Decimal::ZERO);

        let verdict =
            manager.evaluate("EUR_USD", &signal, &account, &[], &TradeHistory::new(), 0.0, 0.0);
        assert!(matches!(verdict, RiskVerdict::Rejected { ref reason } if reason.contains("below one lot")));
    }

    #[test]
    fn evaluate_scales_size_in_volatile_markets() {
        let manager = RiskManager::new(RiskConfig::default()); // position_scaling on
        let signal = buy_signal(1.1000, 1.0985, 0.8);
        let account = account(dec!(10000), Decimal::ZERO);

        // Current ATR double the average: size halves (then lot-floored)
        let verdict = manager.evaluate(
            "EUR_USD",
            &signal,
            &account,
            &[],
            &TradeHistory::new(),
            0.0030,
            0.0015,
        );
        assert_eq!(verdict, RiskVerdict::Approved { units: 33_300 });
    }

    #[test]
    fn kelly_used_only_with_enough_history() {
        let config = RiskConfig { use_kelly_criterion: true, ..Default::default() };
        let manager = RiskManager::new(config);

        let mut history = TradeHistory::new();
        for i in 0..KELLY_MIN_TRADES {
            // 60% winners at +100, losers at -50: kelly 0.4, clipped to 0.01
            let pnl = if i % 5 < 3 { dec!(100) } else { dec!(-50) };
            history.record(Utc::now(), "EUR_USD", pnl);
        }

        let signal = buy_signal(1.1000, 1.0985, 0.8);
        let account = account(dec!(10000), Decimal::ZERO);
        let verdict =
            manager.evaluate("EUR_USD", &signal, &account, &[], &history, 0.0, 0.0);

        // Clipped Kelly equals the cap, so sizing matches fixed-fraction
        assert_eq!(verdict, RiskVerdict::Approved { units: 66_600 });
    }
}
