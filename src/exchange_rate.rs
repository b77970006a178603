use std::collections::BTreeMap;

use rust_decimal::Decimal;

/// Rates published for a single day, keyed by ISO currency code.
pub type RateMap = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateRecord {
    /// `YYYY-MM-DD`, exactly as it appears in the feed.
    pub date: String,
    pub exchange_rates: RateMap,
}

impl ExchangeRateRecord {
    pub fn new(date: impl Into<String>, exchange_rates: RateMap) -> Self {
        Self {
            date: date.into(),
            exchange_rates,
        }
    }
}
