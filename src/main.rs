//! OANDA Forex Trading Bot
//!
//! Indicator-driven signal generation with risk-managed position sizing
//! and automated position lifecycle management.

mod api;
mod bot;
mod indicators;
mod models;
mod trading;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{MarketGateway, OandaClient};
use crate::bot::{market_is_open, Bot, BotConfig};
use crate::indicators::IndicatorSet;
use crate::trading::{build_strategy, AppConfig};

/// OANDA forex trading bot CLI.
#[derive(Parser)]
#[command(name = "fxbot")]
#[command(about = "Algorithmic forex trading on the OANDA v20 API", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the trading bot
    Run {
        /// Polling interval in seconds (overrides config)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Dry run (don't place orders)
        #[arg(long)]
        dry_run: bool,
    },

    /// Evaluate the strategy once for an instrument and print the signal
    Signal {
        /// Instrument to evaluate (e.g. EUR_USD)
        instrument: String,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli.config);

    match cli.command {
        Commands::Run { interval, dry_run } => {
            let poll_interval_secs = interval.unwrap_or(config.poll_interval_secs);

            info!(
                strategy = %config.strategy.name,
                interval = poll_interval_secs,
                dry_run = dry_run,
                practice = config.practice,
                "Starting forex trading bot"
            );

            let gateway =
                OandaClient::new(&config.account_id, &config.access_token, config.practice)?;

            let bot_config = BotConfig {
                dry_run,
                poll_interval_secs,
                trading: config.trading.clone(),
                strategy: config.strategy.clone(),
                risk: config.risk.clone(),
            };

            println!("\n=== OANDA Forex Trading Bot ===");
            println!("Environment: {}", if config.practice { "practice" } else { "LIVE" });
            println!("Instruments: {}", config.trading.instruments.join(", "));
            println!("Strategy: {}", config.strategy.name);
            println!("Polling interval: {}s", poll_interval_secs);
            println!("Mode: {}", if dry_run { "DRY RUN (no real orders)" } else { "LIVE TRADING" });
            println!("\nPress Ctrl+C to stop.\n");

            let mut bot = Bot::new(bot_config, gateway);
            if let Err(e) = bot.run().await {
                tracing::error!(error = %e, "Bot error");
            }
        }

        Commands::Signal { instrument } => {
            let gateway =
                OandaClient::new(&config.account_id, &config.access_token, config.practice)?;

            let bars = gateway
                .historical_bars(
                    &instrument,
                    config.trading.history_bars,
                    &config.trading.granularity,
                )
                .await?;
            let price = gateway.current_price(&instrument).await?;

            let params = config.strategy.indicator_params();
            let ind = IndicatorSet::compute(&bars, &params);

            let strategy = build_strategy(&config.strategy, &config.trading);
            let signal = strategy.evaluate(&instrument, &ind, price);

            println!("\n=== {} ({} bars, {}) ===", instrument, bars.len(), config.trading.granularity);
            println!("Price:      {:.5}", price);
            println!("\nIndicators:");
            println!("  RSI:       {:.1}", ind.rsi);
            println!("  Fast MA:   {:.5}", ind.ema_fast);
            println!("  Slow MA:   {:.5}", ind.ema_slow);
            println!("  ATR:       {:.5}", ind.atr);
            println!("  ADX:       {:.1}", ind.adx);
            println!("  BB upper:  {:.5}", ind.bb_upper);
            println!("  BB lower:  {:.5}", ind.bb_lower);

            println!("\nSignal ({}):", strategy.name());
            println!("  Direction:  {}", signal.direction);
            println!("  Confidence: {:.2}", signal.confidence);
            if let Some(stop) = signal.stop_loss {
                println!("  Stop loss:  {:.5}", stop);
            }
            if let Some(target) = signal.take_profit {
                println!("  Target:     {:.5}", target);
            }
            println!("  Rationale:  {}", signal.rationale);
            println!("\nMarket open: {}", if market_is_open(chrono::Utc::now()) { "Yes" } else { "No" });
        }

        Commands::Config => {
            println!("\n=== Account ===\n");
            println!("Account ID:   {}", mask(&config.account_id));
            println!("Environment:  {}", if config.practice { "practice" } else { "LIVE" });
            println!("Poll interval: {}s", config.poll_interval_secs);

            println!("\n=== Trading ===\n");
            println!("Instruments:      {}", config.trading.instruments.join(", "));
            println!("Max Positions:    {}", config.trading.max_positions);
            println!("Base Size:        {} units", config.trading.position_size_base);
            println!("Stop Loss:        {} pips", config.trading.stop_loss_pips);
            println!("Take Profit:      {} pips", config.trading.take_profit_pips);
            println!("History Bars:     {}", config.trading.history_bars);
            println!("Granularity:      {}", config.trading.granularity);

            println!("\n=== Strategy ({}) ===\n", config.strategy.name);
            println!("RSI Period:       {}", config.strategy.rsi_period);
            println!("RSI Oversold:     {}", config.strategy.rsi_oversold);
            println!("RSI Overbought:   {}", config.strategy.rsi_overbought);
            println!("Fast MA:          {}", config.strategy.ema_fast);
            println!("Slow MA:          {}", config.strategy.ema_slow);
            println!("ATR Period:       {}", config.strategy.atr_period);
            println!("ADX Period:       {}", config.strategy.adx_period);
            println!("ADX Threshold:    {}", config.strategy.adx_threshold);
            println!("BB Period:        {}", config.strategy.bb_period);
            println!("BB Std Mult:      {}", config.strategy.bb_std_multiplier);

            println!("\n=== Risk ===\n");
            println!("Risk Per Trade:   {}%", config.risk.max_risk_per_trade * rust_decimal::Decimal::from(100));
            println!("Max Daily Loss:   {}%", config.risk.max_daily_loss * rust_decimal::Decimal::from(100));
            println!("Position Scaling: {}", config.risk.position_scaling);
            println!("Kelly Sizing:     {}", config.risk.use_kelly_criterion);
            println!("Min Confidence:   {}", config.risk.min_confidence);
        }
    }

    Ok(())
}

/// Load the config file, falling back to defaults (plus environment
/// credentials) when it does not exist.
fn load_config(path: &str) -> AppConfig {
    match AppConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            info!(path = %path, error = %e, "Config file not loaded, using defaults");
            let mut config = AppConfig::default();
            config.apply_env();
            config
        }
    }
}

fn mask(value: &str) -> String {
    if value.len() <= 4 {
        return "(not set)".to_string();
    }
    format!("...{}", &value[value.len() - 4..])
}
