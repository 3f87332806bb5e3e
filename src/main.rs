//! Pomotrack - a Pomodoro timer and per-project time tracker
//!
//! This is the main entry point for the pomotrack server.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use pomotrack::{
    config::Config,
    state::AppState,
    api::create_router,
    services::FileSnapshotStore,
    tasks::{clock_task, completion_notifier_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomotrack={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomotrack server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, pomodoro={}min, tick={}ms, data_dir={}",
          config.host, config.port, config.pomodoro_minutes, config.tick_ms,
          config.data_dir.display());

    let store = FileSnapshotStore::new(&config.data_dir)
        .with_context(|| format!("Failed to open data directory {}", config.data_dir.display()))?;

    // Create application state
    let state = Arc::new(AppState::new(config.app_settings(), Arc::new(store)));

    // Start the single clock source and the completion hook
    tokio::spawn(clock_task(Arc::clone(&state)));
    tokio::spawn(completion_notifier_task(Arc::clone(&state), config.notify_command.clone()));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/start|pause|toggle|reset|mode");
    info!("  GET  /projects, POST /projects, POST /projects/:id/toggle");
    info!("  GET  /status     - Timer and project status");
    info!("  GET  /events     - Server-sent state changes");
    info!("  GET  /health     - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
