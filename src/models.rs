// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A quantity of a stock held at some average acquisition price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub qty: f64,
    pub avg_price: f64,
}

/// Live quote snapshot for a symbol at request time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PriceInfo {
    pub last_price: f64,
    pub previous_close: f64,
    pub close: f64,
}

/// One day of a per-symbol historical close series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// A named collection of holdings plus a cash balance and a recorded
/// starting portfolio value. Wire field names match the existing clients.
#[derive(Debug, Clone, Deserialize)]
pub struct Plan {
    #[serde(rename = "planName")]
    pub plan_name: String,
    pub cash: f64,
    #[serde(rename = "startVal")]
    pub start_val: f64,
    pub stocks: Vec<PlanHolding>,
}

/// Holding as it appears inside a plan; clients send `price` for the
/// average acquisition price here.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanHolding {
    pub symbol: String,
    pub qty: f64,
    pub price: f64,
}

/// Per-holding valuation, all figures rounded to 2 decimals.
#[derive(Debug, Clone, Serialize)]
pub struct StockValuation {
    pub symbol: String,
    pub today_change_percent: f64,
    pub total_change_percent: f64,
    pub current_value: f64,
}

/// Per-holding valuation inside a plan, carrying the plan-level totals.
#[derive(Debug, Clone, Serialize)]
pub struct PlanStockValuation {
    pub symbol: String,
    pub today_change_percent: f64,
    pub total_change_percent: f64,
    pub current_value: f64,
    pub total_current_value: f64,
    pub initial_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanValuation {
    #[serde(rename = "planName")]
    pub plan_name: String,
    pub individual_stocks: Vec<PlanStockValuation>,
    pub total_current_gains: f64,
}

/// Basket value for one calendar day; only days with a positive total
/// are ever emitted.
#[derive(Debug, Clone, Serialize)]
pub struct BasketDailyValue {
    pub date: NaiveDate,
    pub total_value: f64,
}
