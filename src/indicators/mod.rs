//! Technical indicator library: pure functions over a price series.
//!
//! All functions are deterministic given the same series and use plain
//! rolling means evaluated at the latest bar. Insufficient data returns a
//! sentinel (50.0 for RSI, 0.0 elsewhere) rather than an error, so a short
//! warmup window degrades to "no opinion" instead of failing the cycle.

use statrs::statistics::Statistics;

use crate::models::{closes, PriceBar};

/// Periods and multipliers for one indicator pass.
#[derive(Debug, Clone)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr_period: usize,
    pub adx_period: usize,
    pub bb_period: usize,
    pub bb_std_multiplier: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_fast: 20,
            ema_slow: 50,
            atr_period: 14,
            adx_period: 14,
            bb_period: 20,
            bb_std_multiplier: 2.0,
        }
    }
}

/// Named scalar outputs of one indicator pass. Recomputed every cycle,
/// never persisted.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub atr: f64,
    pub adx: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
}

impl IndicatorSet {
    pub fn compute(bars: &[PriceBar], params: &IndicatorParams) -> Self {
        let (ema_fast, ema_slow) = moving_averages(bars, params.ema_fast, params.ema_slow);
        let (bb_upper, bb_lower) = bollinger(bars, params.bb_period, params.bb_std_multiplier);

        Self {
            rsi: rsi(bars, params.rsi_period),
            ema_fast,
            ema_slow,
            atr: atr(bars, params.atr_period),
            adx: adx(bars, params.adx_period),
            bb_upper,
            bb_lower,
        }
    }
}

/// Relative Strength Index over `period` bars, using a rolling mean of
/// gains and losses (not Wilder smoothing).
///
/// Returns the neutral 50.0 when fewer than `period + 1` bars are
/// available. A zero average loss reads as RSI 100.
pub fn rsi(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 50.0;
    }

    let start = bars.len() - period;
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;

    for i in start..bars.len() {
        let delta = bars[i].close - bars[i - 1].close;
        if delta > 0.0 {
            gain_sum += delta;
        } else {
            loss_sum += -delta;
        }
    }

    let avg_gain = gain_sum / period as f64;
    let avg_loss = loss_sum / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// Fast and slow simple moving averages of the close, evaluated at the
/// latest bar. Returns the `(0.0, 0.0)` insufficient-data sentinel when
/// fewer bars than the longer window are available; the windows are not
/// required to be ordered.
pub fn moving_averages(bars: &[PriceBar], fast_window: usize, slow_window: usize) -> (f64, f64) {
    if fast_window == 0 || slow_window == 0 || bars.len() < fast_window.max(slow_window) {
        return (0.0, 0.0);
    }

    let fast = window_mean(bars, fast_window);
    let slow = window_mean(bars, slow_window);
    (fast, slow)
}

fn window_mean(bars: &[PriceBar], window: usize) -> f64 {
    let start = bars.len() - window;
    bars[start..].iter().map(|b| b.close).mean()
}

/// Average True Range: rolling mean of the true range over `period` bars.
///
/// True range needs the previous close, so `period + 1` bars are required;
/// fewer returns 0.0 and callers skip volatility logic.
pub fn atr(bars: &[PriceBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 0.0;
    }

    let start = bars.len() - period;
    let sum: f64 = (start..bars.len()).map(|i| true_range(&bars[i], &bars[i - 1])).sum();
    sum / period as f64
}

fn true_range(bar: &PriceBar, prev: &PriceBar) -> f64 {
    (bar.high - bar.low)
        .max((bar.high - prev.close).abs())
        .max((bar.low - prev.close).abs())
}

/// Average Directional Index over `period` bars, rolling-mean variant.
///
/// DX is computed per bar from +DI/-DI over the trailing `period` window,
/// then ADX is the mean of the last `period` DX values. Needs
/// `2 * period + 1` bars; fewer returns 0.0, which always fails a trend
/// filter threshold.
pub fn adx(bars: &[PriceBar], period: usize) -> f64 {
    let n = bars.len();
    if period == 0 || n < 2 * period + 1 {
        return 0.0;
    }

    // Per-delta directional movement and true range.
    let mut plus_dm = Vec::with_capacity(n - 1);
    let mut minus_dm = Vec::with_capacity(n - 1);
    let mut tr = Vec::with_capacity(n - 1);

    for i in 1..n {
        let high_diff = bars[i].high - bars[i - 1].high;
        let low_diff = bars[i - 1].low - bars[i].low;

        plus_dm.push(if high_diff > low_diff && high_diff > 0.0 {
            high_diff
        } else {
            0.0
        });
        minus_dm.push(if low_diff > high_diff && low_diff > 0.0 {
            low_diff
        } else {
            0.0
        });
        tr.push(true_range(&bars[i], &bars[i - 1]));
    }

    let dx_at = |end: usize| -> f64 {
        let window = end - period..end;
        let tr_sum: f64 = tr[window.clone()].iter().sum();
        if tr_sum == 0.0 {
            return 0.0;
        }
        let plus_di = 100.0 * plus_dm[window.clone()].iter().sum::<f64>() / tr_sum;
        let minus_di = 100.0 * minus_dm[window].iter().sum::<f64>() / tr_sum;
        let di_sum = plus_di + minus_di;
        if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di - minus_di).abs() / di_sum
        }
    };

    let deltas = n - 1;
    let dx_sum: f64 = (deltas - period + 1..=deltas).map(dx_at).sum();
    dx_sum / period as f64
}

/// Bollinger bands: rolling mean of the close plus/minus `std_multiplier`
/// standard deviations over `period` bars. Returns `(0.0, 0.0)` when
/// fewer than `period` bars are available.
pub fn bollinger(bars: &[PriceBar], period: usize, std_multiplier: f64) -> (f64, f64) {
    if period == 0 || bars.len() < period {
        return (0.0, 0.0);
    }

    let start = bars.len() - period;
    let closes = closes(&bars[start..]);
    let mean = (&closes).mean();
    let std = (&closes).std_dev();

    (mean + std_multiplier * std, mean - std_multiplier * std)
}
