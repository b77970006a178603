use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::warn;

use config::Config;
use feed::HttpFeedFetcher;
use pg_store::PgRateStore;
use response::{Invocation, into_response};
use server::AppState;
use store::{InMemoryRateStore, RateStore};

mod backfill;
mod config;
mod cube;
mod diff;
mod error;
mod exchange_rate;
mod extract;
mod feed;
mod ingest;
mod pg_store;
mod response;
mod server;
mod store;

/// Euro foreign-exchange reference rates: ingestion and day-over-day deltas
#[derive(Parser, Debug)]
#[command(name = "eurofx", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the ingestion and diff flows over HTTP
    Serve,
    /// Fetch the feed once and store its rates
    Ingest,
    /// Print today's rates and their change since yesterday
    Diff,
    /// Copy an earlier day's rates under today's date
    Backfill {
        #[arg(long, default_value_t = backfill::DEFAULT_DAYS_BACK)]
        days_back: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let store = open_store(&config).await?;
    let today = Utc::now().date_naive();

    let invocation = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState {
                store,
                fetcher: Arc::new(HttpFeedFetcher::default()),
                feeds: config.feeds.clone(),
            };
            server::serve(state, &config.bind_addr).await?;
            return Ok(());
        }
        Command::Ingest => {
            let fetcher = HttpFeedFetcher::default();
            ingest::ingest(store.as_ref(), &fetcher, &config.feeds).await
        }
        Command::Diff => diff::diff(store.as_ref(), today).await,
        Command::Backfill { days_back } => backfill::backfill(store.as_ref(), today, days_back).await,
    };

    report(invocation)
}

async fn open_store(config: &Config) -> Result<Arc<dyn RateStore>> {
    match &config.database_url {
        Some(url) => Ok(Arc::new(PgRateStore::connect(url, config.max_connections).await?)),
        None => {
            warn!("DATABASE_URL is not set, rates are kept in memory only");
            Ok(Arc::new(InMemoryRateStore::default()))
        }
    }
}

fn report(invocation: Invocation) -> Result<()> {
    let response = into_response(invocation);
    println!("{}", serde_json::to_string_pretty(&response)?);

    if !response.is_success() {
        anyhow::bail!("Invocation failed with status {}", response.status_code);
    }

    Ok(())
}
