//! Market Summary Ingestion Engine
//!
//! Downloads the daily market summary file, unpacks it and upserts every
//! instrument row into a local SQLite database:
//! - Optional backfill over an explicit date range at startup
//! - Daily run at a fixed local time, forever

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use market_source::{HttpSource, SourceConfig};
use market_store::{health, Store, StoreConfig};
use telemetry::init_tracing_from_env;
use worker::{DateRange, IngestConfig, Ingestor, ScheduleConfig, Scheduler};

/// Command line arguments.
#[derive(Debug, Parser)]
#[command(name = "market-ingest", version, about = "Daily market summary ingestion")]
struct Cli {
    /// SQLite database path (default: market_data.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// First date to backfill, YYYY-MM-DD
    #[arg(long, value_name = "YYYY-MM-DD")]
    backload_from: Option<String>,

    /// Last date to backfill, YYYY-MM-DD (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    backload_to: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default)]
    source: SourceConfig,

    #[serde(default)]
    store: StoreConfig,

    #[serde(default)]
    schedule: ScheduleConfig,

    #[serde(default)]
    ingest: IngestConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing_from_env();

    let cli = Cli::parse();

    info!("Starting Market Ingestion Engine v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config()?;
    if let Some(db) = cli.db {
        config.store.path = db;
    }

    let tz = config.schedule.tz().context("Invalid schedule timezone")?;
    let at = config
        .schedule
        .trigger_time()
        .context("Invalid schedule trigger time")?;

    let today = Utc::now().with_timezone(&tz).date_naive();
    if let (None, Some(to)) = (&cli.backload_from, &cli.backload_to) {
        warn!(to = %to, "--backload-to given without --backload-from, ignoring");
    }
    let backfill = DateRange::from_bounds(
        cli.backload_from.as_deref(),
        cli.backload_to.as_deref(),
        today,
    )
    .context("Invalid backload range")?;

    info!(
        db = %config.store.path.display(),
        url = %config.source.url_template,
        timezone = %tz,
        trigger = %at,
        "Loaded configuration"
    );

    let store = Store::open(config.store.clone()).context("Failed to open market store")?;
    if health::check_connection(&store) {
        info!("Market store connection: healthy");
    } else {
        error!("Market store connection: unhealthy");
    }

    let source = Arc::new(
        HttpSource::new(config.source.clone()).context("Failed to create HTTP client")?,
    );

    let ingestor = Ingestor::new(source, store).with_policy(config.ingest.row_policy());

    Scheduler::new(ingestor, tz, at, backfill).run().await;

    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables, e.g. MARKET_STORE__PATH
        .add_source(
            config::Environment::with_prefix("MARKET")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
