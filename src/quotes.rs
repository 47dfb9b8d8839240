// src/quotes.rs
use crate::error::ServiceError;
use crate::models::{HistoricalPoint, PriceInfo};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use reqwest::Client;
use serde::Deserialize;

/// Market-data provider contract. Every endpoint fetches through this
/// trait so tests can substitute a mock provider.
#[async_trait]
pub trait QuoteGateway: Send + Sync {
    /// Live quote for a symbol.
    async fn live_quote(&self, symbol: &str) -> Result<PriceInfo, ServiceError>;

    /// Daily EQ-series closes for `symbol` over `[from, to]`, ascending
    /// by date.
    async fn historical_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalPoint>, ServiceError>;

    /// All derivatives-eligible stocks with their last traded price.
    async fn derivative_stocks(&self) -> Result<Vec<(String, f64)>, ServiceError>;
}

#[derive(Deserialize)]
struct NsePriceInfo {
    #[serde(rename = "lastPrice")]
    last_price: f64,
    #[serde(rename = "previousClose")]
    previous_close: f64,
    close: f64,
}

#[derive(Deserialize)]
struct NseQuoteResponse {
    #[serde(rename = "priceInfo")]
    price_info: NsePriceInfo,
}

#[derive(Deserialize)]
struct NseHistoricalRow {
    #[serde(rename = "CH_TIMESTAMP")]
    timestamp: String,
    #[serde(rename = "CH_CLOSING_PRICE")]
    close: f64,
}

#[derive(Deserialize)]
struct NseHistoricalResponse {
    data: Vec<NseHistoricalRow>,
}

#[derive(Deserialize)]
struct NseIndexEntry {
    symbol: String,
    #[serde(rename = "lastPrice")]
    last_price: f64,
}

#[derive(Deserialize)]
struct NseIndexResponse {
    data: Vec<NseIndexEntry>,
}

/// NSE India HTTP client. One reqwest `Client` shared across requests;
/// no retries or caching, upstream failures surface as-is.
pub struct NseClient {
    client: Client,
    base_url: String,
}

impl NseClient {
    pub fn new(base_url: String) -> Self {
        NseClient {
            client: Client::new(),
            base_url,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, ServiceError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::Upstream(format!(
                "Failed to fetch data: HTTP {}",
                response.status()
            )));
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl QuoteGateway for NseClient {
    async fn live_quote(&self, symbol: &str) -> Result<PriceInfo, ServiceError> {
        let url = format!("{}/api/quote-equity?symbol={}", self.base_url, symbol);
        let quote: NseQuoteResponse = self.get_json(&url).await?;
        Ok(PriceInfo {
            last_price: quote.price_info.last_price,
            previous_close: quote.price_info.previous_close,
            close: quote.price_info.close,
        })
    }

    async fn historical_series(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalPoint>, ServiceError> {
        // NSE expects dd-mm-YYYY bounds and returns rows newest-first.
        let url = format!(
            "{}/api/historical/cm/equity?symbol={}&series=[%22EQ%22]&from={}&to={}",
            self.base_url,
            symbol,
            from.format("%d-%m-%Y"),
            to.format("%d-%m-%Y"),
        );
        let history: NseHistoricalResponse = self.get_json(&url).await?;

        let mut series = Vec::with_capacity(history.data.len());
        for row in history.data {
            let date = NaiveDate::parse_from_str(&row.timestamp, "%Y-%m-%d")
                .map_err(|e| ServiceError::Upstream(format!("Bad date in series: {}", e)))?;
            series.push(HistoricalPoint {
                date,
                close: row.close,
            });
        }
        series.sort_by_key(|point| point.date);
        info!("Fetched {} records for symbol: {}", series.len(), symbol);
        Ok(series)
    }

    async fn derivative_stocks(&self) -> Result<Vec<(String, f64)>, ServiceError> {
        let url = format!(
            "{}/api/equity-stockIndices?index=SECURITIES%20IN%20F%26O",
            self.base_url
        );
        let index: NseIndexResponse = self.get_json(&url).await?;
        Ok(index
            .data
            .into_iter()
            .map(|entry| (entry.symbol, entry.last_price))
            .collect())
    }
}
