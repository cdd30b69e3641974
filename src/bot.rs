//! Trading cycle orchestrator: poll, manage open positions, evaluate
//! entries, repeat.
//!
//! The bot owns all per-session state (daily counters, trade history,
//! pending closes). The broker owns positions and balances; every cycle
//! starts from a fresh snapshot of both, so a restart only loses the
//! session counters, never position state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::api::{MarketGateway, MarketOrder};
use crate::indicators::{atr, IndicatorSet};
use crate::models::{AccountSnapshot, Position, Side};
use crate::trading::{
    build_strategy, daily_loss_gate, PositionAction, PositionManager, RiskConfig, RiskManager,
    RiskVerdict, SignalStrategy, StrategyConfig, TradeHistory, TradeSignal, TradingConfig,
};

/// Everything the orchestrator needs, assembled from the app config and
/// CLI flags at startup.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Log intended orders instead of sending them
    pub dry_run: bool,

    /// Seconds between trading cycles
    pub poll_interval_secs: u64,

    pub trading: TradingConfig,
    pub strategy: StrategyConfig,
    pub risk: RiskConfig,
}

/// Session counters, reset at the first cycle of each UTC day.
#[derive(Debug)]
struct Session {
    daily_pnl: Decimal,
    trades_today: u32,
    winning_trades: u32,
    losing_trades: u32,
    history: TradeHistory,
    last_reset: NaiveDate,
}

impl Session {
    fn new(today: NaiveDate) -> Self {
        Self {
            daily_pnl: Decimal::ZERO,
            trades_today: 0,
            winning_trades: 0,
            losing_trades: 0,
            history: TradeHistory::new(),
            last_reset: today,
        }
    }

    /// Reset the daily counters on the first cycle of a new UTC day. The
    /// trade history survives; Kelly statistics span days.
    fn roll_day(&mut self, today: NaiveDate) {
        if today != self.last_reset {
            info!(
                daily_pnl = %self.daily_pnl,
                trades = self.trades_today,
                "New UTC day, resetting daily counters"
            );
            self.daily_pnl = Decimal::ZERO;
            self.trades_today = 0;
            self.winning_trades = 0;
            self.losing_trades = 0;
            self.last_reset = today;
        }
    }

    fn record_close(&mut self, timestamp: DateTime<Utc>, instrument: &str, pnl: Decimal) {
        self.history.record(timestamp, instrument, pnl);
        self.daily_pnl += pnl;
        if pnl > Decimal::ZERO {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }
    }

    /// Overlay the counters this process owns onto the broker snapshot.
    fn overlay(&self, account: &mut AccountSnapshot) {
        account.daily_pnl = self.daily_pnl;
        account.trades_today = self.trades_today;
        account.winning_trades = self.winning_trades;
        account.losing_trades = self.losing_trades;
    }
}

/// Per-instrument evaluation output for one cycle.
struct Evaluation {
    signal: TradeSignal,
    current_price: f64,
    atr: f64,
    average_atr: f64,
}

/// Run lifecycle. Stopping is terminal and triggers the drain phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BotState {
    WaitingForMarket,
    Running,
    Stopping,
}

/// The forex market is closed all of Saturday and until 22:00 UTC on
/// Sunday (the Sydney open).
pub fn market_is_open(now: DateTime<Utc>) -> bool {
    match now.weekday() {
        Weekday::Sat => false,
        Weekday::Sun => now.hour() >= 22,
        _ => true,
    }
}

/// The trading bot, generic over the broker gateway.
pub struct Bot<G: MarketGateway> {
    config: BotConfig,
    gateway: G,
    strategy: Box<dyn SignalStrategy>,
    risk: RiskManager,
    positions: PositionManager,
    session: Session,
    shutdown: Arc<AtomicBool>,
}

impl<G: MarketGateway> Bot<G> {
    pub fn new(config: BotConfig, gateway: G) -> Self {
        let strategy = build_strategy(&config.strategy, &config.trading);
        let risk = RiskManager::new(config.risk.clone());

        Self {
            config,
            gateway,
            strategy,
            risk,
            positions: PositionManager::new(),
            session: Session::new(Utc::now().date_naive()),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Main loop. Runs until Ctrl-C, then closes all open positions
    /// before returning.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            strategy = self.strategy.name(),
            dry_run = self.config.dry_run,
            interval_secs = self.config.poll_interval_secs,
            "Starting trading loop"
        );

        let flag = self.shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                flag.store(true, Ordering::SeqCst);
            }
        });

        let mut state = BotState::WaitingForMarket;
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                state = BotState::Stopping;
            }

            let now = Utc::now();
            match state {
                BotState::Stopping => break,
                BotState::WaitingForMarket => {
                    if market_is_open(now) {
                        info!("Market open, entering trading state");
                        state = BotState::Running;
                        continue;
                    }
                    debug!("Market closed, waiting");
                }
                BotState::Running => {
                    if !market_is_open(now) {
                        info!("Market closed, leaving trading state");
                        state = BotState::WaitingForMarket;
                    } else if let Err(e) = self.tick(now).await {
                        error!(error = %e, "Trading cycle failed");
                    }
                }
            }

            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
        }

        self.drain().await;
        info!("Trading loop stopped");
        Ok(())
    }

    /// One trading cycle: reconcile, manage open positions, then look for
    /// at most one new entry.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.session.roll_day(now.date_naive());

        let open = self.gateway.open_positions().await?;
        self.positions.sync(&open);

        // A failed snapshot blocks new entries but never position
        // management; an open position must always be reviewable.
        let account = match self.gateway.account_snapshot().await {
            Ok(mut snapshot) => {
                self.session.overlay(&mut snapshot);
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "Account snapshot unavailable, skipping entries");
                None
            }
        };

        for position in &open {
            if let Err(e) = self.manage_position(position, now).await {
                warn!(instrument = %position.instrument, error = %e, "Position review failed");
            }
        }

        let Some(account) = account else {
            return Ok(());
        };

        if daily_loss_gate(account.daily_pnl, account.balance, self.config.risk.max_daily_loss) {
            info!(daily_pnl = %account.daily_pnl, "Daily loss limit reached, no new entries");
            return Ok(());
        }

        if open.len() >= self.config.trading.max_positions {
            debug!(open = open.len(), "At position limit, no new entries");
            return Ok(());
        }

        self.seek_entry(&account, &open).await;
        Ok(())
    }

    /// Fetch candles, compute indicators, and run the strategy for one
    /// instrument.
    async fn evaluate_instrument(&self, instrument: &str) -> Result<Evaluation> {
        let bars = self
            .gateway
            .historical_bars(
                instrument,
                self.config.trading.history_bars,
                &self.config.trading.granularity,
            )
            .await?;
        let current_price = self.gateway.current_price(instrument).await?;

        let params = self.config.strategy.indicator_params();
        let indicators = IndicatorSet::compute(&bars, &params);

        // Baseline ATR over a three-times-longer window, for the
        // volatility sizing adjustment.
        let average_atr = atr(&bars, params.atr_period * 3);

        let signal = self.strategy.evaluate(instrument, &indicators, current_price);
        debug!(
            instrument = %instrument,
            direction = %signal.direction,
            confidence = signal.confidence,
            rationale = %signal.rationale,
            "Evaluated"
        );

        Ok(Evaluation { current_price, atr: indicators.atr, average_atr, signal })
    }

    /// Review one open position against a fresh signal: reversal exit or
    /// trailing-stop advance.
    async fn manage_position(&mut self, position: &Position, now: DateTime<Utc>) -> Result<()> {
        let eval = self.evaluate_instrument(&position.instrument).await?;

        let action = self.positions.review(
            position,
            &eval.signal,
            eval.atr,
            eval.current_price,
            self.config.risk.min_confidence,
        );

        match action {
            PositionAction::Close { reason } => {
                info!(
                    instrument = %position.instrument,
                    side = %position.side,
                    pnl = %position.unrealized_pnl,
                    reason = %reason,
                    "Closing position"
                );

                if self.config.dry_run {
                    info!(instrument = %position.instrument, "[DRY RUN] Would close position");
                    self.session
                        .record_close(now, &position.instrument, position.unrealized_pnl);
                    return Ok(());
                }

                match self.gateway.close_position(&position.instrument).await {
                    Ok(()) => {
                        self.session
                            .record_close(now, &position.instrument, position.unrealized_pnl);
                    }
                    Err(e) => {
                        warn!(instrument = %position.instrument, error = %e, "Close failed, will retry");
                        self.positions.close_failed(&position.instrument);
                    }
                }
            }
            PositionAction::AmendStop { level } => {
                if self.config.dry_run {
                    info!(
                        instrument = %position.instrument,
                        level = level,
                        "[DRY RUN] Would trail stop"
                    );
                    return Ok(());
                }

                // Advisory only; a failed amendment leaves the old stop
                // in place and is retried next cycle.
                if let Err(e) = self.gateway.amend_stop_loss(&position.instrument, level).await {
                    warn!(instrument = %position.instrument, error = %e, "Stop amendment failed");
                } else {
                    debug!(instrument = %position.instrument, level = level, "Trailed stop");
                }
            }
            PositionAction::Hold => {}
        }

        Ok(())
    }

    /// Walk instruments in priority order and open at most one position.
    async fn seek_entry(&mut self, account: &AccountSnapshot, open: &[Position]) {
        for instrument in self.config.trading.instruments.clone() {
            if open.iter().any(|p| p.instrument == instrument) {
                continue;
            }

            let eval = match self.evaluate_instrument(&instrument).await {
                Ok(eval) => eval,
                Err(e) => {
                    warn!(instrument = %instrument, error = %e, "Data unavailable, skipping");
                    continue;
                }
            };

            if eval.signal.direction.is_hold() {
                continue;
            }

            let verdict = self.risk.evaluate(
                &instrument,
                &eval.signal,
                account,
                open,
                &self.session.history,
                eval.atr,
                eval.average_atr,
            );

            let units = match verdict {
                RiskVerdict::Approved { units } => units,
                RiskVerdict::Rejected { reason } => {
                    info!(instrument = %instrument, reason = %reason, "Entry rejected");
                    continue;
                }
            };

            let side = if eval.signal.direction.is_buy() { Side::Long } else { Side::Short };
            let signed_units = units * side.sign();
            let order = MarketOrder {
                instrument: instrument.clone(),
                units: signed_units,
                stop_loss: eval.signal.stop_loss,
                take_profit: eval.signal.take_profit,
            };

            info!(
                instrument = %instrument,
                direction = %eval.signal.direction,
                units = signed_units,
                confidence = eval.signal.confidence,
                rationale = %eval.signal.rationale,
                "Opening position"
            );

            if self.config.dry_run {
                info!(instrument = %instrument, units = signed_units, "[DRY RUN] Would place order");
            } else {
                match self.gateway.place_market_order(&order).await {
                    Ok(order_id) => {
                        info!(instrument = %instrument, order_id = %order_id, "Order placed");
                        self.session.trades_today += 1;
                    }
                    Err(e) => {
                        error!(instrument = %instrument, error = %e, "Order failed");
                    }
                }
            }

            // One new position per cycle, filled or not.
            break;
        }
    }

    /// Close everything on shutdown so no position is left unmanaged.
    async fn drain(&mut self) {
        let open = match self.gateway.open_positions().await {
            Ok(open) => open,
            Err(e) => {
                error!(error = %e, "Could not list positions during shutdown");
                return;
            }
        };

        for position in &open {
            if self.config.dry_run {
                info!(instrument = %position.instrument, "[DRY RUN] Would close on shutdown");
                continue;
            }
            match self.gateway.close_position(&position.instrument).await {
                Ok(()) => info!(instrument = %position.instrument, "Closed on shutdown"),
                Err(e) => {
                    error!(instrument = %position.instrument, error = %e, "Close failed on shutdown")
                }
            }
        }
    }
}
