//! Foresight daemon entry point.
//!
//! Wires the real collaborators from config and runs one on-demand
//! prediction for the requested event.

use anyhow::Result;
use clap::Parser;
use foresight_common::{PredictionRequest, Tier};
use foresightd::cache::SqliteCache;
use foresightd::config::{ForesightConfig, CONFIG_PATH};
use foresightd::event_store::SqliteEventStore;
use foresightd::fetch::HttpFetcher;
use foresightd::llm::OllamaClient;
use foresightd::search::ExaSearchClient;
use foresightd::Predictor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "foresightd", version, about = "Scenario prediction pipeline")]
struct Args {
    /// Event to generate a prediction for
    #[arg(long)]
    event_id: String,

    /// Generation tier (fast, standard, deep)
    #[arg(long)]
    tier: Option<Tier>,

    /// Bypass the cache and regenerate
    #[arg(long)]
    force_refresh: bool,

    /// Config file path
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    info!("foresightd v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ForesightConfig::load(&args.config)?;

    let event_store = Arc::new(SqliteEventStore::open(Path::new(&config.storage.events_db))?);
    let cache = Arc::new(SqliteCache::open(Path::new(&config.storage.cache_db))?);
    let search = Arc::new(ExaSearchClient::new(&config.search)?);
    let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
    let llm = Arc::new(OllamaClient::new(&config.llm)?);

    let predictor = Predictor::new(event_store, search, Some(fetcher), llm, cache);

    let mut request = PredictionRequest::new(args.event_id);
    request.tier = args.tier;
    request.force_refresh = args.force_refresh;

    let response = predictor.generate_prediction(&request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.success {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
