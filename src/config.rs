use std::env;

use anyhow::{Context, Result};

pub const HISTORICAL_FEED_URL: &str =
    "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-hist-90d.xml";
pub const DAILY_FEED_URL: &str = "https://www.ecb.europa.eu/stats/eurofxref/eurofxref-daily.xml";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Feed endpoints used by the ingestion flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedUrls {
    pub historical: String,
    pub daily: String,
}

impl Default for FeedUrls {
    fn default() -> Self {
        Self {
            historical: HISTORICAL_FEED_URL.to_string(),
            daily: DAILY_FEED_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub feeds: FeedUrls,
    pub bind_addr: String,
}

impl Config {
    /// Reads the process environment. A `.env` file, when present, is
    /// loaded by the caller beforehand.
    pub fn from_env() -> Result<Self> {
        let max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS must be a number, got {value:?}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
            max_connections,
            feeds: FeedUrls {
                historical: env_or("HISTORICAL_FEED_URL", HISTORICAL_FEED_URL),
                daily: env_or("DAILY_FEED_URL", DAILY_FEED_URL),
            },
            bind_addr: env_or("BIND_ADDR", DEFAULT_BIND_ADDR),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
