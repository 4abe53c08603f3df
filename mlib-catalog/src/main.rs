//! mlib-catalog - song lyrics catalog HTTP service
//!
//! Settings resolve as command line > `MLIB_*` environment (a `.env` file is
//! loaded first) > TOML config file > built-in defaults.

use anyhow::{Context, Result};
use clap::Parser;
use mlib_common::config::{ConfigOverrides, ServiceConfig};
use mlib_common::db::init_database;
use mlib_catalog::db::SqliteSongStore;
use mlib_catalog::enrichment::HttpMetadataClient;
use mlib_catalog::services::CatalogService;
use mlib_catalog::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mlib-catalog")]
#[command(about = "Song lyrics catalog service")]
#[command(version)]
struct Args {
    /// TOML config file (default: ~/.config/musiclib/config.toml if present)
    #[arg(short, long, env = "MLIB_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite connection URL
    #[arg(long, env = "MLIB_DATABASE_URL")]
    database_url: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "MLIB_PORT")]
    port: Option<u16>,

    /// Base URL of the song metadata service
    #[arg(long, env = "MLIB_METADATA_URL")]
    metadata_url: Option<String>,

    /// Metadata request timeout in seconds
    #[arg(long, env = "MLIB_METADATA_TIMEOUT_SECS")]
    metadata_timeout_secs: Option<u64>,

    /// Drop and recreate the schema at startup
    #[arg(long, env = "MLIB_RELOAD_SCHEMA")]
    reload_schema: Option<bool>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "MLIB_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database_url: self.database_url.clone(),
            port: self.port,
            metadata_url: self.metadata_url.clone(),
            metadata_timeout_secs: self.metadata_timeout_secs,
            reload_schema: self.reload_schema,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = ServiceConfig::resolve(args.overrides(), args.config.as_deref())
        .context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("mlib_catalog={0},mlib_common={0},tower_http={0}", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting mlib-catalog v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let pool = init_database(&config.database_url, config.reload_schema)
        .await
        .map_err(|e| {
            error!("Failed to initialize database: {}", e);
            e
        })
        .context("Database initialization failed")?;
    info!("✓ Database ready");

    let metadata = HttpMetadataClient::new(
        config.metadata_url.as_str(),
        Duration::from_secs(config.metadata_timeout_secs),
    )
    .context("Failed to build metadata client")?;
    info!(
        url = %config.metadata_url,
        timeout_secs = config.metadata_timeout_secs,
        "Metadata service configured"
    );

    let catalog = CatalogService::new(Arc::new(SqliteSongStore::new(pool.clone())));
    let state = AppState::new(Arc::new(catalog), Arc::new(metadata));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("mlib-catalog listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("mlib-catalog stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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
