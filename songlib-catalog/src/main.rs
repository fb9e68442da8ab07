//! songlib-catalog - Song catalog HTTP service
//!
//! Startup order: configuration, tracing, database, enrichment provider,
//! router. Shutdown cancels every in-flight operation and waits up to the
//! configured grace period for handlers to drain.

use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use songlib_catalog::enrichment::client_from_config;
use songlib_catalog::store::SqliteCatalogStore;
use songlib_catalog::{build_router, AppState, CatalogService};
use songlib_common::config::{default_config_path, ProviderKind, TomlConfig};
use songlib_common::db::init_database;
use songlib_common::logging::init_tracing;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Command-line arguments for songlib-catalog
#[derive(Parser, Debug)]
#[command(name = "songlib-catalog")]
#[command(about = "Song catalog service with metadata enrichment")]
#[command(version)]
struct Args {
    /// TOML configuration file (must exist when given)
    #[arg(short, long, env = "SONGLIB_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "SONGLIB_DATABASE")]
    database: Option<PathBuf>,

    /// HTTP listen address
    #[arg(short, long, env = "SONGLIB_BIND_ADDR")]
    bind: Option<String>,

    /// Base URL of the metadata provider
    #[arg(long, env = "SONGLIB_ENRICHMENT_URL")]
    enrichment_url: Option<String>,

    /// Enrichment provider
    #[arg(long, value_enum, env = "SONGLIB_PROVIDER")]
    provider: Option<ProviderArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Http,
    Fixture,
}

impl From<ProviderArg> for ProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Http => ProviderKind::Http,
            ProviderArg::Fixture => ProviderKind::Fixture,
        }
    }
}

/// Load the TOML layer and fold command-line/env overrides on top
///
/// Returns the merged config and, when no file was found at the default
/// location, that location (reported once tracing is up).
fn resolve_config(args: &Args) -> Result<(TomlConfig, Option<PathBuf>)> {
    let (mut config, missing) = match &args.config {
        Some(path) => {
            let config = TomlConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (config, None)
        }
        None => {
            let path = default_config_path();
            match TomlConfig::load_optional(&path)? {
                Some(config) => (config, None),
                None => (TomlConfig::default(), Some(path)),
            }
        }
    };

    if let Some(database) = &args.database {
        config.database_path = Some(database.clone());
    }
    if let Some(bind) = &args.bind {
        config.bind_addr = Some(bind.clone());
    }
    if let Some(url) = &args.enrichment_url {
        config.enrichment.base_url = Some(url.clone());
    }
    if let Some(provider) = args.provider {
        config.enrichment.provider = provider.into();
    }

    Ok((config, missing))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, missing_config) = resolve_config(&args)?;

    init_tracing(&config.logging)?;

    info!(
        "Starting songlib catalog (songlib-catalog) v{}",
        env!("CARGO_PKG_VERSION")
    );
    if let Some(path) = missing_config {
        warn!("No config file at {}, using defaults", path.display());
    }

    let db_path = config.database_path_or_default();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let enrichment = client_from_config(&config.enrichment)?;
    info!("Enrichment provider: {}", enrichment.provider_name());

    let store = Arc::new(SqliteCatalogStore::new(pool.clone()));
    let service = CatalogService::new(store, enrichment);

    let shutdown = CancellationToken::new();
    let state = AppState::new(service, shutdown.clone());
    let app = build_router(state);

    let bind_addr = config.bind_addr_or_default();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!("songlib-catalog listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    let server_token = shutdown.clone();
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_token.cancelled().await })
            .into_future(),
    );

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let grace = Duration::from_secs(config.shutdown_grace_secs_or_default());
    tokio::select! {
        joined = &mut server => {
            joined.context("Server task failed")?.context("Server error")?;
        }
        _ = shutdown.cancelled() => {
            match tokio::time::timeout(grace, &mut server).await {
                Ok(joined) => {
                    joined.context("Server task failed")?.context("Server error")?;
                }
                Err(_) => {
                    warn!("In-flight requests still running after {:?}, aborting", grace);
                    server.abort();
                }
            }
        }
    }

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
