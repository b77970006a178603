use async_trait::async_trait;
use log::info;
use reqwest::Client;

use crate::config::FeedUrls;
use crate::error::{RatesError, Result};
use crate::store::RateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    /// Multi-day history, used to seed an empty store.
    Historical,
    /// Latest published day only.
    Daily,
}

impl FeedSource {
    pub fn url(self, feeds: &FeedUrls) -> &str {
        match self {
            FeedSource::Historical => &feeds.historical,
            FeedSource::Daily => &feeds.daily,
        }
    }
}

/// Picks the historical feed for an empty store, the daily feed otherwise.
/// A store that can't be read is reported as a retrieval failure.
pub async fn select_source(store: &dyn RateStore) -> Result<FeedSource> {
    let empty = store
        .is_empty()
        .await
        .map_err(|e| RatesError::Retrieval(e.to_string()))?;

    if empty {
        info!("No entries found in the store. Downloading the historical feed.");
        Ok(FeedSource::Historical)
    } else {
        info!("Data found in the store. Downloading the daily feed.");
        Ok(FeedSource::Daily)
    }
}

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpFeedFetcher {
    client: Client,
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(RatesError::Retrieval(format!(
                "Can't download {}: {}",
                url,
                resp.status()
            )));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
