// # spindled - album ingestion daemon
//
// This daemon is a THIN integration layer:
// - DO NOT add pipeline, catalog or storage logic here
// - All ingestion logic lives in spindle-core
// - Configuration is via environment variables ONLY
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the collaborators and the ingestion engine
// 4. Serving the HTTP API until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Server
// - `SPINDLE_BIND_ADDR`: Listen address (default 127.0.0.1:8787)
// - `SPINDLE_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ### Catalog
// - `SPINDLE_CATALOG_CLIENT_ID`: Client id (required)
// - `SPINDLE_CATALOG_CLIENT_SECRET`: Client secret (required)
// - `SPINDLE_REFRESH_TOKEN_ON_UNAUTHORIZED`: Re-issue token once on 401 (default false)
//
// ### Identity
// - `SPINDLE_IDENTITY_URL`: Session lookup endpoint (required)
//
// ### Board
// - `SPINDLE_BOARD_SEARCH_URL`: Search page to scrape
// - `SPINDLE_BOARD_READY_SELECTOR`: Selector marking the results area (default main)
// - `SPINDLE_BOARD_READY_TIMEOUT_SECS`: Ready wait (default 30)
// - `SPINDLE_CHROME_EXECUTABLE`: Browser binary (auto-detected if unset)
//
// ### Store
// - `SPINDLE_STORE_TYPE`: sqlite or memory (default sqlite)
// - `SPINDLE_STORE_URL`: SQLite URL (default sqlite://spindle.db)
//
// ## Example
//
// ```bash
// export SPINDLE_CATALOG_CLIENT_ID=...
// export SPINDLE_CATALOG_CLIENT_SECRET=...
// export SPINDLE_IDENTITY_URL=https://auth.internal/session
// export SPINDLE_STORE_URL=sqlite:///var/lib/spindle/releases.db
//
// spindled
// ```

use anyhow::Result;
use spindle_board_chromium::ChromiumDriver;
use spindle_catalog_spotify::SpotifyCatalog;
use spindle_core::traits::ReleaseStore;
use spindle_core::{IngestEngine, IngestEvent, MemoryReleaseStore, StoreConfig};
use spindle_identity_http::HttpSessionResolver;
use spindle_store_sqlite::SqliteReleaseStore;
use spindled::{AppState, Config, router};
use std::process::ExitCode;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum SpindleExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<SpindleExitCode> for ExitCode {
    fn from(code: SpindleExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SpindleExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SpindleExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SpindleExitCode::ConfigError.into();
    }

    info!("Starting spindled daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SpindleExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {:#}", e);
            SpindleExitCode::RuntimeError
        } else {
            SpindleExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the collaborators and serve until a shutdown signal
async fn run_daemon(config: Config) -> Result<()> {
    let ingest = config.ingest_config();

    let catalog = SpotifyCatalog::from_config(&ingest.catalog)?;
    let sessions = HttpSessionResolver::new(config.identity_url.clone())?;
    let browser = ChromiumDriver::new(config.chrome_executable.clone());

    let store: Box<dyn ReleaseStore> = match &ingest.store {
        StoreConfig::Memory => {
            warn!("Using in-memory release store; releases are lost on restart");
            Box::new(MemoryReleaseStore::new())
        }
        StoreConfig::Sqlite { url } => Box::new(SqliteReleaseStore::connect(url).await?),
    };
    info!("Release store holds {} release(s)", store.count_releases().await?);

    let (engine, events) = IngestEngine::new(
        Box::new(sessions),
        Box::new(browser),
        Box::new(catalog.clone()),
        Box::new(catalog),
        store,
        ingest,
    )?;

    let event_task = tokio::spawn(log_events(events));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(engine)))
        .with_graceful_shutdown(async {
            match wait_for_shutdown().await {
                Ok(signal) => info!("Received shutdown signal: {}", signal),
                Err(e) => error!("Shutdown signal error: {}", e),
            }
        })
        .await?;

    event_task.abort();
    info!("Shutting down daemon");
    Ok(())
}

/// Log engine events until the engine is dropped
async fn log_events(events: mpsc::Receiver<IngestEvent>) {
    let mut events = ReceiverStream::new(events);
    while let Some(event) = events.next().await {
        match event {
            IngestEvent::StageChanged { stage } => debug!("Batch stage: {}", stage),
            IngestEvent::LinkImported { url, outcome, .. } => {
                debug!("Link imported ({:?}): {}", outcome, url)
            }
            IngestEvent::LinkFailed { url, error } => debug!("Link failed: {} ({})", url, error),
            IngestEvent::BatchCompleted { imported, failed } => {
                info!("Batch event: {} imported, {} failed", imported, failed)
            }
            IngestEvent::BatchAborted { stage, error } => {
                warn!("Batch event: aborted during {} ({})", stage, error)
            }
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
