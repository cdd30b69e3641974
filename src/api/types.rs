//! Wire types for the OANDA v20 REST API. Prices arrive as strings and
//! are parsed at the client boundary.

use serde::{Deserialize, Serialize};

/// Candle response from /v3/instruments/{instrument}/candles.
#[derive(Debug, Clone, Deserialize)]
pub struct CandlesResponse {
    pub instrument: String,
    pub candles: Vec<Candle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candle {
    pub time: String,
    pub volume: i64,
    #[serde(default)]
    pub complete: bool,
    pub mid: CandleData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandleData {
    pub o: String,
    pub h: String,
    pub l: String,
    pub c: String,
}

/// Account summary response from /v3/accounts/{id}/summary.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSummaryResponse {
    pub account: AccountSummary,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub balance: String,
    #[serde(default)]
    pub margin_used: String,
    #[serde(default)]
    pub margin_available: String,
}

/// Open trades response from /v3/accounts/{id}/openTrades.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenTradesResponse {
    pub trades: Vec<OandaTrade>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OandaTrade {
    pub id: String,
    pub instrument: String,
    pub price: String,
    #[serde(rename = "openTime")]
    pub open_time: String,
    #[serde(rename = "currentUnits")]
    pub current_units: String,
    #[serde(rename = "unrealizedPL", default)]
    pub unrealized_pl: String,
}

/// Market order request body for POST /v3/accounts/{id}/orders.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBody {
    pub order: MarketOrderRequest,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOrderRequest {
    #[serde(rename = "type")]
    pub order_type: String,
    pub instrument: String,
    pub units: String,
    pub time_in_force: String,
    pub position_fill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss_on_fill: Option<PriceDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit_on_fill: Option<PriceDetails>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceDetails {
    pub price: String,
}

/// Response to order creation; either transaction carries the ID.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreateResponse {
    #[serde(default)]
    pub order_create_transaction: Option<Transaction>,
    #[serde(default)]
    pub order_fill_transaction: Option<Transaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: String,
}

/// Stop-loss replacement body for PUT /v3/accounts/{id}/trades/{id}/orders.
#[derive(Debug, Clone, Serialize)]
pub struct TradeOrdersBody {
    #[serde(rename = "stopLoss")]
    pub stop_loss: StopLossDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLossDetails {
    pub price: String,
    pub time_in_force: String,
}
