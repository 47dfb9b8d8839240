// src/api.rs
use crate::error::ServiceError;
use crate::models::{Holding, Plan, PriceInfo};
use crate::quotes::QuoteGateway;
use crate::valuation::{
    basket_daily_values, cagr, round2, total_current_value, value_holding, value_plan,
    ZeroPriceRule,
};
use chrono::{Duration, Local};
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Longest accepted trailing window. Keeps the per-day loop bounded and
/// the date arithmetic inside `NaiveDate`'s range.
const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Deserialize)]
struct CalculateRequest {
    stocks: Vec<Holding>,
}

#[derive(Deserialize)]
struct TotalValueRequest {
    stocks: HashMap<String, f64>,
    num_days: i64,
}

#[derive(Deserialize)]
struct PlansRequest {
    plans_data: Vec<Plan>,
}

pub fn routes(
    gateway: Arc<dyn QuoteGateway>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let symbol_lastprice = warp::path("get_symbol_lastprice")
        .and(warp::get())
        .and(with_gateway(gateway.clone()))
        .and_then(symbol_lastprice_handler);

    let total_value = warp::path("calculate_total_value")
        .and(warp::post())
        .and(with_gateway(gateway.clone()))
        .and(warp::body::json())
        .and_then(total_value_handler);

    let plans = warp::path("calculate_sts")
        .and(warp::post())
        .and(with_gateway(gateway.clone()))
        .and(warp::body::json())
        .and_then(plans_handler);

    let calculate = warp::path("calculate")
        .and(warp::post())
        .and(with_gateway(gateway.clone()))
        .and(warp::body::json())
        .and_then(calculate_handler);

    let cagr_route = warp::path("calculate_cagr")
        .and(warp::post())
        .and(with_gateway(gateway))
        .and(warp::body::json())
        .and_then(cagr_handler);

    symbol_lastprice
        .or(total_value)
        .or(plans)
        .or(calculate)
        .or(cagr_route)
        .recover(handle_rejection)
}

fn with_gateway(
    gateway: Arc<dyn QuoteGateway>,
) -> impl Filter<Extract = (Arc<dyn QuoteGateway>,), Error = Infallible> + Clone {
    warp::any().map(move || gateway.clone())
}

async fn symbol_lastprice_handler(gateway: Arc<dyn QuoteGateway>) -> Result<impl Reply, Rejection> {
    match gateway.derivative_stocks().await {
        Ok(stocks) => {
            let symbol_lastprice: HashMap<String, f64> = stocks.into_iter().collect();
            info!("Listed {} derivative stocks.", symbol_lastprice.len());
            Ok(warp::reply::json(&symbol_lastprice))
        }
        Err(e) => {
            error!("Failed to list derivative stocks: {}", e);
            Err(warp::reject::custom(e))
        }
    }
}

async fn total_value_handler(
    gateway: Arc<dyn QuoteGateway>,
    request: TotalValueRequest,
) -> Result<impl Reply, Rejection> {
    if request.num_days <= 0 {
        return Err(warp::reject::custom(ServiceError::Validation(
            "Invalid num_days, must be a positive integer".to_string(),
        )));
    }
    if request.num_days > MAX_WINDOW_DAYS {
        return Err(warp::reject::custom(ServiceError::Validation(format!(
            "Invalid num_days, must be at most {}",
            MAX_WINDOW_DAYS
        ))));
    }
    if request.stocks.is_empty() {
        return Err(warp::reject::custom(ServiceError::Validation(
            "Invalid or empty stocks data".to_string(),
        )));
    }

    let end_date = Local::now().date_naive();
    let start_date = end_date - Duration::days(request.num_days);

    // One series fetch per symbol; day totals are assembled by date-matching
    // against these.
    let mut series = HashMap::new();
    for symbol in request.stocks.keys() {
        let points = gateway
            .historical_series(symbol, start_date, end_date + Duration::days(1))
            .await
            .map_err(|e| {
                error!("Failed to fetch series for {}: {}", symbol, e);
                warp::reject::custom(e)
            })?;
        series.insert(symbol.clone(), points);
    }

    let values = basket_daily_values(&request.stocks, &series, start_date, request.num_days);
    Ok(warp::reply::json(&values))
}

async fn calculate_handler(
    gateway: Arc<dyn QuoteGateway>,
    request: CalculateRequest,
) -> Result<impl Reply, Rejection> {
    let mut results = Vec::with_capacity(request.stocks.len());
    for holding in &request.stocks {
        let quote = fetch_quote(&gateway, &holding.symbol).await?;
        let valuation = value_holding(
            &holding.symbol,
            holding.qty,
            holding.avg_price,
            quote,
            ZeroPriceRule::EitherZero,
        )
        .map_err(warp::reject::custom)?;
        results.push(valuation);
    }

    let total = total_current_value(&results);
    Ok(warp::reply::json(&json!({
        "individual_stocks": results,
        "total_current_value": total,
    })))
}

async fn plans_handler(
    gateway: Arc<dyn QuoteGateway>,
    request: PlansRequest,
) -> Result<impl Reply, Rejection> {
    let mut response_data = Vec::with_capacity(request.plans_data.len());
    for plan in &request.plans_data {
        let mut quotes = Vec::with_capacity(plan.stocks.len());
        for holding in &plan.stocks {
            quotes.push(fetch_quote(&gateway, &holding.symbol).await?);
        }
        let valuation = value_plan(plan, &quotes).map_err(warp::reject::custom)?;
        response_data.push(valuation);
    }

    Ok(warp::reply::json(&json!({ "plans_data": response_data })))
}

async fn cagr_handler(
    gateway: Arc<dyn QuoteGateway>,
    request: CalculateRequest,
) -> Result<impl Reply, Rejection> {
    let current_date = Local::now().date_naive();
    let one_year_ago = current_date - Duration::days(365);

    let mut current_value = 0.0;
    let mut value_one_year_ago = 0.0;

    for holding in &request.stocks {
        let quote = fetch_quote(&gateway, &holding.symbol).await?;
        current_value += holding.qty * quote.last_price;

        let series = gateway
            .historical_series(
                &holding.symbol,
                one_year_ago - Duration::days(3),
                one_year_ago,
            )
            .await
            .map_err(|e| {
                error!("Failed to fetch series for {}: {}", holding.symbol, e);
                warp::reject::custom(e)
            })?;
        if let Some(point) = series.last() {
            value_one_year_ago += holding.qty * point.close;
        }
    }

    let growth = cagr(current_value, value_one_year_ago).map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&json!({
        "current_value": round2(current_value),
        "value_one_year_ago": round2(value_one_year_ago),
        "cagr": growth,
    })))
}

async fn fetch_quote(
    gateway: &Arc<dyn QuoteGateway>,
    symbol: &str,
) -> Result<PriceInfo, Rejection> {
    gateway.live_quote(symbol).await.map_err(|e| {
        error!("Failed to fetch quote for {}: {}", symbol, e);
        warp::reject::custom(e)
    })
}

/// Map every rejection to a JSON `{"error": message}` body. Computation
/// and upstream failures are client-attributable per the API contract, so
/// they all report 400.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(e) = err.find::<ServiceError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}
