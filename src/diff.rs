use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use log::{error, info};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use serde_json::json;

use crate::error::{RatesError, Result};
use crate::exchange_rate::RateMap;
use crate::response::{Invocation, InvocationResponse};
use crate::store::RateStore;

const DIFF_SCALE: u32 = 4;

pub const NOT_FOUND_MESSAGE: &str = "Data not found for either the current day or the previous day. \
     or check if current day data is uploaded?";
pub const FAILURE_MESSAGE: &str = "An error occurred while computing the rate differences";

/// Day-over-day movement. Decimals serialize as strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifferenceReport {
    pub current_day_rates: RateMap,
    pub exchange_rate_differences: BTreeMap<String, Decimal>,
}

/// `current - previous` for every currency of `current`, rounded half to even
/// at four places. A currency missing from `previous` counts as zero there.
pub fn compute_differences(
    current: &RateMap,
    previous: &RateMap,
) -> Result<BTreeMap<String, Decimal>> {
    current
        .iter()
        .map(|(currency, rate)| {
            let last = previous.get(currency).copied().unwrap_or(Decimal::ZERO);
            let difference = rate.checked_sub(last).ok_or_else(|| {
                RatesError::Parse(format!("{} difference overflowed: {} - {}", currency, rate, last))
            })?;
            Ok((currency.clone(), round_difference(difference)))
        })
        .collect()
}

fn round_difference(difference: Decimal) -> Decimal {
    let mut rounded =
        difference.round_dp_with_strategy(DIFF_SCALE, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        rounded = Decimal::ZERO;
    }
    rounded.rescale(DIFF_SCALE);
    rounded
}

pub fn previous_day(today: NaiveDate) -> Result<NaiveDate> {
    today
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| RatesError::NotFound(format!("Can't get previous date for {}", today)))
}

async fn load_rates(store: &dyn RateStore, date: NaiveDate) -> Result<RateMap> {
    let key = date.format("%Y-%m-%d").to_string();
    match store.get(&key).await? {
        Some(record) if !record.exchange_rates.is_empty() => Ok(record.exchange_rates),
        _ => Err(RatesError::NotFound(format!("no rates stored for {}", key))),
    }
}

pub async fn rate_differences(store: &dyn RateStore, today: NaiveDate) -> Result<DifferenceReport> {
    let yesterday = previous_day(today)?;
    let current_day_rates = load_rates(store, today).await?;
    let last_day_rates = load_rates(store, yesterday).await?;

    let exchange_rate_differences = compute_differences(&current_day_rates, &last_day_rates)?;

    Ok(DifferenceReport {
        current_day_rates,
        exchange_rate_differences,
    })
}

/// Differences between `today` and the day before. Missing data answers 404;
/// any other failure is logged and answers a generic 500.
pub async fn diff(store: &dyn RateStore, today: NaiveDate) -> Invocation {
    match rate_differences(store, today).await {
        Ok(report) => {
            info!(
                "Computed {} rate differences for {}",
                report.exchange_rate_differences.len(),
                today
            );
            Ok(InvocationResponse::ok(&report))
        }
        Err(RatesError::NotFound(detail)) => {
            info!("Rate differences unavailable: {}", detail);
            Err(InvocationResponse::json(404, &json!({ "error": NOT_FOUND_MESSAGE })))
        }
        Err(e) => {
            error!("An error occurred: {}", e);
            Err(InvocationResponse::json(500, &json!({ "error": FAILURE_MESSAGE })))
        }
    }
}
