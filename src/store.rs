use async_trait::async_trait;
use tokio::sync::RwLock;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::exchange_rate::{ExchangeRateRecord, RateMap};

/// Durable date-keyed storage for published rates.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Writes `record`, replacing whatever was stored under its date.
    async fn put(&self, record: &ExchangeRateRecord) -> Result<()>;

    async fn get(&self, date: &str) -> Result<Option<ExchangeRateRecord>>;

    async fn is_empty(&self) -> Result<bool>;
}

#[derive(Debug, Default)]
pub struct InMemoryRateStore {
    records: RwLock<BTreeMap<String, RateMap>>,
}

#[cfg(test)]
impl InMemoryRateStore {
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RateStore for InMemoryRateStore {
    async fn put(&self, record: &ExchangeRateRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.date.clone(), record.exchange_rates.clone());
        Ok(())
    }

    async fn get(&self, date: &str) -> Result<Option<ExchangeRateRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(date)
            .map(|rates| ExchangeRateRecord::new(date, rates.clone())))
    }

    async fn is_empty(&self) -> Result<bool> {
        Ok(self.records.read().await.is_empty())
    }
}
