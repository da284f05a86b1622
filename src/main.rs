use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use ardispatch::api::{create_router, AppState};
use ardispatch::config::Config;
use ardispatch::dispatch::Dispatcher;
use ardispatch::observability::{init_tracing, MetricsRegistry};
use ardispatch::policy::{PolicyLoader, PolicyWatcher};
use ardispatch::queue::UnixQueue;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration
    let config = Config::parse();

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting active-response dispatcher"
    );

    let metrics = Arc::new(MetricsRegistry::new());

    // Start policy watcher
    let loader = PolicyLoader::new(
        config.policy_path.to_string_lossy(),
        config
            .ignore_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned()),
    );
    let watcher = PolicyWatcher::new(loader, config.policy_reload_interval(), metrics.clone());
    let (policy_rx, policy_handle) = watcher.start();

    // Connect execution queues
    let local = UnixQueue::connect("execq", &config.exec_queue, config.queue_timeout()).with_context(|| {
        format!("connecting to exec queue {}", config.exec_queue.display())
    })?;
    let forward = UnixQueue::connect("arq", &config.forward_queue, config.queue_timeout()).with_context(|| {
        format!("connecting to forward queue {}", config.forward_queue.display())
    })?;
    info!(
        exec_queue = %config.exec_queue.display(),
        forward_queue = %config.forward_queue.display(),
        "Execution queues connected"
    );

    let dispatcher = Dispatcher::new(Arc::new(local), Arc::new(forward), metrics);

    // Create application state
    let state = Arc::new(AppState {
        dispatcher,
        policy_rx,
        start_time: Instant::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    let app = create_router(state, config.request_timeout());

    let addr: SocketAddr = config.listen_addr.parse()?;

    if !addr.ip().is_loopback() {
        warn!(addr = %addr, "API is unauthenticated and listening beyond loopback");
    }

    info!(addr = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.graceful_shutdown {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    } else {
        axum::serve(listener, app).await?;
    }

    info!("Shutting down...");
    policy_handle.abort();

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
