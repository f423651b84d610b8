//! gc-ui - GarageCloud collection service
//!
//! Serves the collection API and the embedded web UI. The collection is
//! persisted in `garage.db` inside the root folder.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use gc_common::config::{
    resolve_gemini_api_key, resolve_root_folder, RootFolderInitializer, TomlConfig, DEFAULT_PORT,
};
use gc_common::db::init_database;
use gc_common::store::{CollectionStore, SqliteSlot};
use gc_ui::image_search::GeminiImageSearch;
use gc_ui::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "gc_ui=info,gc_common=info,tower_http=info";

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "gc-ui")]
#[command(about = "GarageCloud scale model collection service")]
#[command(version)]
struct Args {
    /// Port to listen on [default: 5780]
    #[arg(short, long, env = "GARAGE_PORT")]
    port: Option<u16>,

    /// Root folder holding garage.db (overrides GARAGE_ROOT_FOLDER)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file [default: <config dir>/garage-cloud/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; the TOML log_level is applied once the config is read
    let (filter, filter_handle) = reload::Layer::new(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting GarageCloud (gc-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml_config = TomlConfig::load_or_default(args.config.as_deref());

    if std::env::var_os("RUST_LOG").is_none() {
        if let Some(level) = toml_config.log_level.as_deref() {
            match EnvFilter::try_new(level) {
                Ok(new_filter) => {
                    if let Err(e) = filter_handle.reload(new_filter) {
                        warn!("Could not apply log_level {:?}: {}", level, e);
                    }
                }
                Err(e) => warn!("Invalid log_level {:?} in config: {}", level, e),
            }
        }
    }

    let root_folder = resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    let store = CollectionStore::load(Arc::new(SqliteSlot::new(pool))).await;

    let placeholders = toml_config.placeholders();
    let image_search = GeminiImageSearch::new(
        resolve_gemini_api_key(&toml_config),
        toml_config.gemini_model(),
        placeholders.clone(),
    )
    .context("Failed to create image search client")?;

    let state = AppState::new(store, placeholders, Arc::new(image_search));
    let app = build_router(state);

    let port = args.port.or(toml_config.port).unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("gc-ui listening on http://{}", addr);
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
            warn!("Failed to install Ctrl+C handler: {}", e);
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
