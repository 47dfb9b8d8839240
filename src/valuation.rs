// src/valuation.rs
use crate::error::ServiceError;
use crate::models::{
    BasketDailyValue, HistoricalPoint, Plan, PlanStockValuation, PlanValuation, PriceInfo,
    StockValuation,
};
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Round to 2 decimal places, the precision of every figure we report.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Which zero-price condition triggers the close-price fallback. The
/// single-portfolio endpoint falls back when either the last price or the
/// previous close is zero; the plan endpoint only when both are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZeroPriceRule {
    EitherZero,
    BothZero,
}

/// Value one holding against its live quote.
///
/// When the zero-price rule fires (pre-open or suspended symbols report
/// zero), today's change is 0 and the session close stands in for the
/// current price. Zero denominators are reported, never folded into NaN.
pub fn value_holding(
    symbol: &str,
    qty: f64,
    avg_price: f64,
    quote: PriceInfo,
    rule: ZeroPriceRule,
) -> Result<StockValuation, ServiceError> {
    if avg_price == 0.0 {
        return Err(ServiceError::Math(format!(
            "Average price for {} is zero",
            symbol
        )));
    }

    let fallback = match rule {
        ZeroPriceRule::EitherZero => quote.last_price == 0.0 || quote.previous_close == 0.0,
        ZeroPriceRule::BothZero => quote.last_price == 0.0 && quote.previous_close == 0.0,
    };

    let (current_price, today_change_percent, total_change_percent) = if fallback {
        let total = ((quote.close - avg_price) / avg_price) * 100.0;
        (quote.close, 0.0, total)
    } else {
        if quote.previous_close == 0.0 {
            return Err(ServiceError::Math(format!(
                "Previous close for {} is zero",
                symbol
            )));
        }
        let today = ((quote.last_price - quote.previous_close) / quote.previous_close) * 100.0;
        let total = ((quote.last_price - avg_price) / avg_price) * 100.0;
        (quote.last_price, today, total)
    };

    Ok(StockValuation {
        symbol: symbol.to_string(),
        today_change_percent: round2(today_change_percent),
        total_change_percent: round2(total_change_percent),
        current_value: round2(qty * current_price),
    })
}

/// Sum of per-holding current values, rounded to 2 decimals.
pub fn total_current_value(stocks: &[StockValuation]) -> f64 {
    round2(stocks.iter().map(|s| s.current_value).sum())
}

/// Value a whole plan against prefetched quotes (one per holding, in
/// holding order). The plan total is computed first and then stamped onto
/// every per-holding result, so `total_current_value` is consistent across
/// the plan rather than a partial running sum.
pub fn value_plan(plan: &Plan, quotes: &[PriceInfo]) -> Result<PlanValuation, ServiceError> {
    if plan.start_val == 0.0 {
        return Err(ServiceError::Math(format!(
            "Start value for plan {} is zero",
            plan.plan_name
        )));
    }

    let mut valued = Vec::with_capacity(plan.stocks.len());
    for (holding, quote) in plan.stocks.iter().zip(quotes) {
        valued.push(value_holding(
            &holding.symbol,
            holding.qty,
            holding.price,
            *quote,
            ZeroPriceRule::BothZero,
        )?);
    }

    let plan_total = total_current_value(&valued);
    let total_with_cash = round2(plan_total + plan.cash);
    let initial_value = plan.start_val.round();

    let individual_stocks = valued
        .into_iter()
        .map(|s| PlanStockValuation {
            symbol: s.symbol,
            today_change_percent: s.today_change_percent,
            total_change_percent: s.total_change_percent,
            current_value: s.current_value,
            total_current_value: total_with_cash,
            initial_value,
        })
        .collect();

    let gains = ((plan_total + plan.cash - plan.start_val) / plan.start_val) * 100.0;

    Ok(PlanValuation {
        plan_name: plan.plan_name.clone(),
        individual_stocks,
        total_current_gains: round2(gains),
    })
}

/// Total basket value for each calendar day in the trailing window,
/// assembled by date-matching against prefetched per-symbol series. A
/// symbol with no close on a given day contributes zero; days whose total
/// is not positive are omitted. Output ascends by date.
pub fn basket_daily_values(
    weights: &HashMap<String, f64>,
    series: &HashMap<String, Vec<HistoricalPoint>>,
    start_date: NaiveDate,
    num_days: i64,
) -> Vec<BasketDailyValue> {
    let mut values = Vec::new();

    for day_delta in 0..num_days {
        let current_date = start_date + Duration::days(day_delta);
        let mut total = 0.0;

        for (symbol, qty) in weights {
            if let Some(points) = series.get(symbol) {
                if let Some(point) = points.iter().find(|p| p.date == current_date) {
                    total += point.close * qty;
                }
            }
        }

        let total = round2(total);
        if total > 0.0 {
            values.push(BasketDailyValue {
                date: current_date,
                total_value: total,
            });
        }
    }

    values
}

/// Single-year compound growth between the two portfolio values.
pub fn cagr(current_value: f64, value_one_year_ago: f64) -> Result<f64, ServiceError> {
    if value_one_year_ago == 0.0 {
        return Err(ServiceError::Math(
            "Portfolio value one year ago is zero".to_string(),
        ));
    }
    Ok(round2((current_value / value_one_year_ago - 1.0) * 100.0))
}
