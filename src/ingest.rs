use log::{error, info};

use crate::config::FeedUrls;
use crate::error::Result;
use crate::extract::store_rates;
use crate::feed::{FeedFetcher, select_source};
use crate::response::{Invocation, InvocationResponse};
use crate::store::RateStore;

pub const SUCCESS_MESSAGE: &str = "Data processed successfully";
pub const FAILURE_MESSAGE: &str = "An error occurred while processing the data";

/// Selects a feed, downloads it and stores its rates. Every failure is
/// logged and folded into a generic 500 response.
pub async fn ingest(store: &dyn RateStore, fetcher: &dyn FeedFetcher, feeds: &FeedUrls) -> Invocation {
    match run_ingestion(store, fetcher, feeds).await {
        Ok(written) => {
            info!("Ingestion finished, {} records stored", written);
            Ok(InvocationResponse::ok(SUCCESS_MESSAGE))
        }
        Err(e) => {
            error!("An error occurred: {}", e);
            Err(InvocationResponse::json(500, FAILURE_MESSAGE))
        }
    }
}

pub async fn run_ingestion(
    store: &dyn RateStore,
    fetcher: &dyn FeedFetcher,
    feeds: &FeedUrls,
) -> Result<usize> {
    let source = select_source(store).await?;
    let url = source.url(feeds);
    info!("Fetching {:?} feed from {}", source, url);

    let xml = fetcher.fetch(url).await?;
    store_rates(&xml, store).await
}
