//! Firemap Server
//!
//! Run with: cargo run --bin firemap
//!
//! # Configuration
//!
//! Settings come from the config file (see `firemap-cli config`), then
//! environment variables, then command-line flags:
//! - `FIREMAP_POINTS_PATH`: Point-level detection table
//! - `FIREMAP_AGGREGATES_PATH`: State/month aggregate table
//! - `FIREMAP_MAP_TOKEN`: Tile provider access token
//! - `FIREMAP_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `FIREMAP_API_PORT`: Port to listen on (default: 8050)
//! - `FIREMAP_LOG_LEVEL`, `FIREMAP_LOG_FORMAT`: Logging (`RUST_LOG` wins)

use anyhow::Context;
use clap::Parser;
use firemap::api::{serve, AppState};
use firemap::config::{Config, LoggingConfig};
use firemap::dashboard::Dashboard;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "firemap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Wildfire detection dashboard server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Point-level detection table
    #[arg(long)]
    points: Option<PathBuf>,

    /// State/month aggregate table
    #[arg(long)]
    aggregates: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // A config file that exists but does not parse stops startup
    let config_path = args.config.clone().or_else(Config::find_default);
    let mut config = match &config_path {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env(),
    };

    if let Some(host) = args.host {
        config.api.host = host;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(points) = args.points {
        config.data.points_path = points;
    }
    if let Some(aggregates) = args.aggregates {
        config.data.aggregates_path = aggregates;
    }

    init_tracing(&config.logging);

    tracing::info!("Starting Firemap server v{}", env!("CARGO_PKG_VERSION"));
    match &config_path {
        Some(path) => tracing::info!("Loaded config from {:?}", path),
        None => tracing::info!("Using default config with environment overrides"),
    }
    tracing::info!("Points table: {:?}", config.data.points_path);
    tracing::info!("Aggregates table: {:?}", config.data.aggregates_path);

    if config.map.access_token.is_empty() {
        tracing::warn!("No map access token configured (set FIREMAP_MAP_TOKEN)");
    }

    // Load the dataset once; it is read-only from here on
    let dataset = config
        .dataset_loader()
        .load()
        .context("loading detection dataset")?;
    tracing::info!("Dataset loaded: {}", dataset.stats());

    let dashboard = Arc::new(Dashboard::new(Arc::new(dataset), config.map.settings()));
    let state = AppState::new(dashboard, config.api.clone());

    serve(state, &config.api).await?;

    tracing::info!("Firemap server stopped");
    Ok(())
}

/// Initialize tracing; `RUST_LOG` takes precedence over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("firemap={},tower_http=info", logging.level))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
