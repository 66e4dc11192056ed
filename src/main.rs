//! homestatus: a home/away status webhook.
//!
//! This is the application entry point. It loads configuration from a TOML
//! file, initializes tracing, builds the file-backed status updater, sets up
//! the Axum router and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homestatus::clock::SystemClock;
use homestatus::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use homestatus::http::start_server;
use homestatus::routes::create_router;
use homestatus::state::AppState;
use homestatus::StatusUpdater;

/// homestatus: records the last home/away status posted by a webhook
#[derive(Parser, Debug)]
#[command(name = "homestatus", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "homestatus=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration is needed first: it selects the log format
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = %args.config, "Loaded configuration");

    let updater = StatusUpdater::from_config(&config.webhook, Arc::new(SystemClock))?;

    let state = AppState::new(config.clone(), updater);
    let app = create_router(state);

    start_server(app, &config).await?;

    Ok(())
}
