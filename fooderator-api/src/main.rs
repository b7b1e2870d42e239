//! Fooderator - Main entry point
//!
//! Barcode food product lookup service: resolves a barcode against Open Food
//! Facts, UPCitemdb and USDA FoodData Central, merges the results and serves
//! them over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use fooderator_api::resolver::Resolver;
use fooderator_api::scanner::RxingDecoder;
use fooderator_api::translator::GoogleTranslator;
use fooderator_api::{build_router, logging, AppState};
use fooderator_common::config::{self, Credentials};
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for fooderator
#[derive(Parser, Debug)]
#[command(name = "fooderator")]
#[command(about = "Barcode food product lookup service")]
#[command(version)]
struct Args {
    /// Path to config.toml (default: per-user config directory)
    #[arg(short, long, env = "FOODERATOR_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind
    #[arg(long, env = "FOODERATOR_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "FOODERATOR_PORT")]
    port: Option<u16>,

    /// USDA FoodData Central API key (also read from USDA_API_KEY)
    #[arg(long)]
    usda_api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    ensure_dotenv();
    let args = Args::parse();

    let toml_config =
        config::load_toml_config(args.config.as_deref()).context("Failed to load configuration")?;

    logging::init_tracing(toml_config.logging.level.as_deref())?;

    info!("Starting Fooderator v{}", env!("CARGO_PKG_VERSION"));

    let credentials = Credentials {
        usda_api_key: config::resolve_usda_api_key(args.usda_api_key.as_deref(), &toml_config),
    };

    let resolver = Resolver::from_config(&toml_config.providers)
        .context("Failed to initialize product sources")?;
    info!(sources = ?resolver.source_names(), "Product sources ready");

    let translator = GoogleTranslator::from_config(&toml_config.providers.translate)
        .context("Failed to initialize translator")?;

    let state = AppState::new(
        resolver,
        Arc::new(translator),
        Arc::new(RxingDecoder),
        credentials,
    );
    let app = build_router(state);

    let addr = config::resolve_bind_addr(args.host.as_deref(), args.port, &toml_config);
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Load `.env` from the working directory, falling back to the crate root
fn ensure_dotenv() {
    if dotenv::dotenv().is_ok() {
        return;
    }
    let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
    let _ = dotenv::from_filename(candidate);
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
