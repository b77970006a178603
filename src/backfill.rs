//! Seeds the current day with an earlier day's rates, so the diff flow has
//! something to compare on days the feed does not publish.

use chrono::{Days, NaiveDate};
use log::{error, info, warn};
use serde_json::json;

use crate::error::{RatesError, Result};
use crate::exchange_rate::ExchangeRateRecord;
use crate::response::{Invocation, InvocationResponse};
use crate::store::RateStore;

pub const DEFAULT_DAYS_BACK: u64 = 2;

/// Copies the record stored `days_back` days before `today` under today's
/// key. Returns the source date.
pub async fn copy_forward(store: &dyn RateStore, today: NaiveDate, days_back: u64) -> Result<String> {
    let source = today
        .checked_sub_days(Days::new(days_back))
        .ok_or_else(|| RatesError::NotFound(format!("Can't go back {} days from {}", days_back, today)))?
        .format("%Y-%m-%d")
        .to_string();

    let record = store
        .get(&source)
        .await?
        .ok_or_else(|| RatesError::NotFound(format!("No data found for {}", source)))?;

    let current = today.format("%Y-%m-%d").to_string();
    store
        .put(&ExchangeRateRecord::new(current.as_str(), record.exchange_rates))
        .await?;
    info!("Inserted data for current date {} from {}", current, source);

    Ok(source)
}

pub async fn backfill(store: &dyn RateStore, today: NaiveDate, days_back: u64) -> Invocation {
    match copy_forward(store, today, days_back).await {
        Ok(source) => Ok(InvocationResponse::ok(&format!("Copied rates from {}", source))),
        Err(RatesError::NotFound(detail)) => {
            warn!("{}", detail);
            Err(InvocationResponse::json(404, &json!({ "error": detail })))
        }
        Err(e) => {
            error!("An error occurred: {}", e);
            Err(InvocationResponse::json(500, &json!({ "error": "An error occurred while copying the data" })))
        }
    }
}
