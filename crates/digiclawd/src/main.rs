//! Digiclaw Daemon - dashboard status server
//!
//! Aggregates host metrics and workspace activity into one snapshot and
//! serves it, with the dashboard's static files, over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use digiclawd::aggregator::Aggregator;
use digiclawd::cli::Cli;
use digiclawd::config::Config;
use digiclawd::network;
use digiclawd::server::{self, AppState};
use std::net::{IpAddr, SocketAddr};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Digiclaw Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    info!("  Workspace: {}", config.workspace.root.display());

    let aggregator = Aggregator::from_config(&config)?;

    if cli.once {
        let snapshot = aggregator.aggregate().await;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let ip: IpAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", config.server.bind))?;
    let listener = server::bind(SocketAddr::new(ip, config.server.port)).await?;

    network::announce(config.server.port);
    if config.server.open_browser {
        network::open_browser(&format!("http://localhost:{}", config.server.port));
    }

    let state = AppState::new(aggregator, config.server.document_root.clone());
    server::run(listener, state).await
}
