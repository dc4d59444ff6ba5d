//! botgate server binary.
//!
//! Startup order matters: configuration first (env overrides file overrides
//! defaults), then the shared state objects, then the feature poller task,
//! then the HTTP server. A fatal poller fault drains the server and turns
//! into a non-zero exit.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use botgate::config::load_config;
use botgate::features::{FeatureCache, FeaturePoller};
use botgate::http::HttpServer;
use botgate::lifecycle::Shutdown;
use botgate::stats::StatsCollector;

#[derive(Parser, Debug)]
#[command(name = "botgate", version, about = "Bot-gating reverse proxy", long_about = None)]
struct Args {
    /// Path to a TOML config file; environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("botgate={},tower_http=warn", config.observability.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("botgate v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = %config.backend.authority(),
        features_url = %config.features.url,
        poll_interval_secs = config.features.poll_interval_secs,
        table_capacity = config.features.table_capacity,
        bot_manager = config.bot_manager.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let features = Arc::new(FeatureCache::empty(config.features.table_capacity));
    let stats = Arc::new(StatsCollector::new(config.stats.count_bot_in_total));
    let shutdown = Arc::new(Shutdown::new());

    // Spawn the supervised feature poller.
    let poller = FeaturePoller::new(&config.features, features.clone(), shutdown.clone())?;
    let poller_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        poller.run(poller_shutdown).await;
    });

    let server = HttpServer::new(config, features, stats)?;
    server.run(listener, shutdown.subscribe()).await?;

    if shutdown.is_fatal() {
        return Err("feature poller aborted on an unrecoverable fault".into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
