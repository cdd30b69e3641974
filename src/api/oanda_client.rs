//! OANDA v20 REST client implementing the market gateway.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{AccountSnapshot, Position, PriceBar, Side};
use crate::trading::pip_size;

use super::types::*;
use super::{MarketGateway, MarketOrder};

const PRACTICE_BASE: &str = "https://api-fxpractice.oanda.com";
const LIVE_BASE: &str = "https://api-fxtrade.oanda.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the OANDA v20 REST API.
pub struct OandaClient {
    client: Client,
    base_url: String,
    account_id: String,
    token: String,
}

impl OandaClient {
    pub fn new(account_id: &str, token: &str, practice: bool) -> Result<Self> {
        if account_id.is_empty() || token.is_empty() {
            bail!("OANDA credentials missing: set account_id and access_token");
        }

        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = if practice { PRACTICE_BASE } else { LIVE_BASE };

        Ok(Self {
            client,
            base_url: base_url.to_string(),
            account_id: account_id.to_string(),
            token: token.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Request failed: {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("OANDA returned {status} for {url}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode response from {url}"))
    }

    /// The open trade protecting an instrument, if any. One position per
    /// instrument means at most one open trade.
    async fn find_open_trade(&self, instrument: &str) -> Result<OandaTrade> {
        let url = format!("{}/v3/accounts/{}/openTrades", self.base_url, self.account_id);
        let response: OpenTradesResponse = self.get_json(&url).await?;

        response
            .trades
            .into_iter()
            .find(|t| t.instrument == instrument)
            .ok_or_else(|| anyhow!("No open trade for {instrument}"))
    }
}

fn parse_f64(value: &str, field: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .with_context(|| format!("Invalid {field} in OANDA response: {value:?}"))
}

fn parse_decimal(value: &str, field: &str) -> Result<Decimal> {
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }
    value
        .parse::<Decimal>()
        .with_context(|| format!("Invalid {field} in OANDA response: {value:?}"))
}

fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid timestamp in OANDA response: {value:?}"))
}

/// Prices are quoted to 5 decimal places, 3 for JPY pairs.
fn format_price(instrument: &str, value: f64) -> String {
    if pip_size(instrument) == 0.01 {
        format!("{value:.3}")
    } else {
        format!("{value:.5}")
    }
}

impl MarketGateway for OandaClient {
    async fn account_snapshot(&self) -> Result<AccountSnapshot> {
        let url = format!("{}/v3/accounts/{}/summary", self.base_url, self.account_id);
        let response: AccountSummaryResponse = self.get_json(&url).await?;
        let account = response.account;

        Ok(AccountSnapshot {
            balance: parse_decimal(&account.balance, "balance")?,
            margin_used: parse_decimal(&account.margin_used, "marginUsed")?,
            margin_available: parse_decimal(&account.margin_available, "marginAvailable")?,
            ..Default::default()
        })
    }

    async fn current_price(&self, instrument: &str) -> Result<f64> {
        let url = format!(
            "{}/v3/instruments/{}/candles?count=1&granularity=M1&price=M",
            self.base_url, instrument
        );
        let response: CandlesResponse = self.get_json(&url).await?;

        let candle = response
            .candles
            .last()
            .ok_or_else(|| anyhow!("No candles returned for {instrument}"))?;
        parse_f64(&candle.mid.c, "close")
    }

    async fn historical_bars(
        &self,
        instrument: &str,
        count: usize,
        granularity: &str,
    ) -> Result<Vec<PriceBar>> {
        let url = format!(
            "{}/v3/instruments/{}/candles?count={}&granularity={}&price=M",
            self.base_url, instrument, count, granularity
        );
        let response: CandlesResponse = self.get_json(&url).await?;

        let mut bars = Vec::with_capacity(response.candles.len());
        for candle in &response.candles {
            bars.push(PriceBar {
                time: parse_time(&candle.time)?,
                open: parse_f64(&candle.mid.o, "open")?,
                high: parse_f64(&candle.mid.h, "high")?,
                low: parse_f64(&candle.mid.l, "low")?,
                close: parse_f64(&candle.mid.c, "close")?,
                volume: candle.volume,
            });
        }

        debug!(instrument = %instrument, bars = bars.len(), "Fetched candles");
        Ok(bars)
    }

    async fn place_market_order(&self, order: &MarketOrder) -> Result<String> {
        let url = format!("{}/v3/accounts/{}/orders", self.base_url, self.account_id);

        let body = OrderBody {
            order: MarketOrderRequest {
                order_type: "MARKET".to_string(),
                instrument: order.instrument.clone(),
                units: order.units.to_string(),
                time_in_force: "FOK".to_string(),
                position_fill: "DEFAULT".to_string(),
                stop_loss_on_fill: order
                    .stop_loss
                    .map(|p| PriceDetails { price: format_price(&order.instrument, p) }),
                take_profit_on_fill: order
                    .take_profit
                    .map(|p| PriceDetails { price: format_price(&order.instrument, p) }),
            },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Order request failed for {}", order.instrument))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Order rejected for {} ({status}): {text}", order.instrument);
        }

        let created: OrderCreateResponse = response
            .json()
            .await
            .context("Failed to decode order response")?;

        created
            .order_fill_transaction
            .or(created.order_create_transaction)
            .map(|t| t.id)
            .ok_or_else(|| anyhow!("Order response carried no transaction ID"))
    }

    async fn open_positions(&self) -> Result<Vec<Position>> {
        let url = format!("{}/v3/accounts/{}/openTrades", self.base_url, self.account_id);
        let response: OpenTradesResponse = self.get_json(&url).await?;

        let mut positions = Vec::with_capacity(response.trades.len());
        for trade in &response.trades {
            let units = trade
                .current_units
                .parse::<f64>()
                .with_context(|| format!("Invalid units in trade {}", trade.id))?
                as i64;

            positions.push(Position {
                instrument: trade.instrument.clone(),
                side: Side::from_units(units),
                units: units.abs(),
                entry_price: parse_f64(&trade.price, "price")?,
                unrealized_pnl: parse_decimal(&trade.unrealized_pl, "unrealizedPL")?,
                opened_at: parse_time(&trade.open_time)?,
            });
        }

        Ok(positions)
    }

    async fn close_position(&self, instrument: &str) -> Result<()> {
        let trade = self.find_open_trade(instrument).await?;
        let url = format!(
            "{}/v3/accounts/{}/trades/{}/close",
            self.base_url, self.account_id, trade.id
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .send()
            .await
            .with_context(|| format!("Close request failed for {instrument}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Close rejected for {instrument} ({status}): {text}");
        }

        Ok(())
    }

    async fn amend_stop_loss(&self, instrument: &str, level: f64) -> Result<()> {
        let trade = self.find_open_trade(instrument).await?;
        let url = format!(
            "{}/v3/accounts/{}/trades/{}/orders",
            self.base_url, self.account_id, trade.id
        );

        let body = TradeOrdersBody {
            stop_loss: StopLossDetails {
                price: format_price(instrument, level),
                time_in_force: "GTC".to_string(),
            },
        };

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Stop amendment failed for {instrument}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Stop amendment rejected for {instrument} ({status}): {text}");
        }

        Ok(())
    }
}
