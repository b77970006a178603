use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::Result;
use crate::exchange_rate::{ExchangeRateRecord, RateMap};
use crate::store::RateStore;

/// PostgreSQL-backed store. One `rate_dates` row per published day, one
/// `exchange_rates` row per currency of that day.
#[derive(Debug, Clone)]
pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn put(&self, record: &ExchangeRateRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO rate_dates (date) VALUES ($1) ON CONFLICT (date) DO NOTHING")
            .bind(&record.date)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM exchange_rates WHERE date = $1")
            .bind(&record.date)
            .execute(&mut *tx)
            .await?;

        for (currency, rate) in &record.exchange_rates {
            sqlx::query("INSERT INTO exchange_rates (date, currency, rate) VALUES ($1, $2, $3)")
                .bind(&record.date)
                .bind(currency)
                .bind(rate)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!("Upserted {} rates for {}", record.exchange_rates.len(), record.date);

        Ok(())
    }

    async fn get(&self, date: &str) -> Result<Option<ExchangeRateRecord>> {
        let known: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rate_dates WHERE date = $1)")
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        if !known {
            return Ok(None);
        }

        let rows: Vec<(String, Decimal)> =
            sqlx::query_as("SELECT currency, rate FROM exchange_rates WHERE date = $1")
                .bind(date)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(ExchangeRateRecord::new(
            date,
            rows.into_iter().collect::<RateMap>(),
        )))
    }

    async fn is_empty(&self) -> Result<bool> {
        let any: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM rate_dates)")
            .fetch_one(&self.pool)
            .await?;
        Ok(!any)
    }
}
