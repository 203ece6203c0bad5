//! Messenger bot (wbj-mb) - Main entry point
//!
//! Serves the Messenger webhook and holds one conversation per user.
//!
//! Settings come from the TOML bootstrap file, overridden by command-line
//! arguments and environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wbj_common::config::{ConfigSource, TomlConfig};
use wbj_common::geocoder::NominatimClient;
use wbj_common::PhraseRules;
use wbj_mb::{build_router, AppState, MessengerClient, SessionStore};

/// Command-line arguments for wbj-mb
#[derive(Parser, Debug)]
#[command(name = "wbj-mb")]
#[command(about = "Messenger bot that finds out where you are")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: <config dir>/wbj/wbj.toml)
    #[arg(short, long, env = "WBJ_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "WBJ_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "WBJ_PORT")]
    port: Option<u16>,

    /// Token expected during webhook verification
    #[arg(long, env = "VERIFY_TOKEN", hide_env_values = true)]
    verify_token: Option<String>,

    /// Page access token for the Send API
    #[arg(long, env = "PAGE_ACCESS_TOKEN", hide_env_values = true)]
    page_access_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, source) =
        TomlConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!("Starting WBJ Messenger bot (wbj-mb) {}", env!("WBJ_BUILD_ID"));

    match &source {
        ConfigSource::File(_) => info!("Configuration: {}", source),
        ConfigSource::Defaults(_) => warn!("Configuration: {}", source),
    }

    // CLI / environment take precedence over the file
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.verify_token.is_some() {
        config.messenger.verify_token = args.verify_token;
    }
    if args.page_access_token.is_some() {
        config.messenger.page_access_token = args.page_access_token;
    }

    if config.messenger.verify_token.is_none() {
        warn!("No verify token configured; webhook verification will be refused");
    }

    let rules = Arc::new(PhraseRules::new(&config.phrases).context("Invalid phrase configuration")?);
    let geocoder = Arc::new(
        NominatimClient::new(&config.geocoder).context("Failed to create geocoder client")?,
    );
    info!("Geocoder: {}", config.geocoder.endpoint);
    let transport = Arc::new(
        MessengerClient::new(&config.messenger, config.maps.clone())
            .context("Failed to create Messenger client")?,
    );

    let state = AppState::new(
        geocoder,
        transport,
        SessionStore::new(rules),
        config.messenger.verify_token.clone(),
    );
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("wbj-mb listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
