use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmzi_core::{
    create_ingest_system, create_user_system, load_config, reconcile_backlog, validate_config,
    CatalogStore, Ingester, JsonlHistory, SqliteCatalog, SqliteUserRegistry, UserRegistry,
};

use filmzi_server::api::create_router;
use filmzi_server::state::AppState;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("FILMZI_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Source channel: {}", config.channel.id);
    info!("Database path: {:?}", config.database.path);

    // Create SQLite catalog
    let catalog: Arc<dyn CatalogStore> = Arc::new(
        SqliteCatalog::new(&config.database.path).context("Failed to create catalog")?,
    );
    info!("Catalog initialized");

    // Create SQLite user registry
    let users: Arc<dyn UserRegistry> = Arc::new(
        SqliteUserRegistry::new(&config.database.path)
            .context("Failed to create user registry")?,
    );
    info!("User registry initialized");

    // Create user recording system
    let (recorder, user_writer) = create_user_system(Arc::clone(&users), config.users.queue_size);
    let user_writer_handle = tokio::spawn(user_writer.run());

    // Create live ingestion system
    let ingester = Arc::new(Ingester::new(Arc::clone(&catalog), config.channel.id));
    let (ingest_handle, ingest_worker) =
        create_ingest_system(Arc::clone(&ingester), config.ingest.queue_size);
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let ingest_worker_handle = tokio::spawn(ingest_worker.run(shutdown_rx));

    // Reconcile the channel backlog alongside live ingestion
    let backfill_handle = match config.ingest.backlog_path.clone() {
        Some(path) => {
            let ingester = Arc::clone(&ingester);
            let window = config.ingest.backfill_window;
            let page_size = config.ingest.page_size;
            Some(tokio::spawn(async move {
                match JsonlHistory::open(&path).await {
                    Ok(history) => {
                        info!(path = ?path, messages = history.len(), "Backfill source opened");
                        let report = reconcile_backlog(&ingester, &history, window, page_size).await;
                        info!(
                            scanned = report.scanned,
                            stored = report.tally.stored,
                            completed = report.completed,
                            "Backfill finished"
                        );
                    }
                    Err(e) => warn!(path = ?path, "Backfill skipped: {}", e),
                }
            }))
        }
        None => {
            info!("No backlog configured, skipping backfill");
            None
        }
    };

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        catalog,
        users,
        recorder,
        ingest_handle,
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");

    // Stop an unfinished backfill; replaying it later is harmless.
    if let Some(handle) = backfill_handle {
        if !handle.is_finished() {
            warn!("Backfill still running, aborting");
            handle.abort();
        }
    }

    // Stop live ingestion; messages already queued are still stored.
    let _ = shutdown_tx.send(());
    match ingest_worker_handle.await {
        Ok(tally) => info!(
            stored = tally.stored,
            rejected = tally.rejected,
            dropped = tally.dropped,
            "Ingest worker stopped"
        ),
        Err(e) => error!("Ingest worker failed: {}", e),
    }

    // The router (and with it the last UserRecorder) is gone once serve
    // returns, so the writer drains and exits.
    let _ = user_writer_handle.await;
    info!("User writer stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
