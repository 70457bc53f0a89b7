//! Serve command - runs a Memoir node.

use std::sync::Arc;
use std::time::Duration;

use memoir::clock::SystemClock;
use memoir::node::{Node, NodeConfig, http};
use memoir::store::InMemory;

use crate::cli::ServeArgs;

/// Run a Memoir node until a termination signal arrives, then save the
/// store back to disk.
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create the node store
    let store = match InMemory::load_from_file(&args.data_file) {
        Ok(store) => {
            tracing::info!("Loaded store from {}", args.data_file.display());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Failed to load store: {e}. Starting with an empty one.");
            Arc::new(InMemory::new())
        }
    };

    let mut config = NodeConfig::new(args.role.into(), args.peer_url.clone());
    config.sync_interval = Duration::from_secs(args.sync_interval);
    config.health_interval = Duration::from_secs(args.health_interval);
    if let Some(serve_recovery) = args.recovery_endpoint {
        config.recovery_endpoint = serve_recovery;
    }

    let node = Arc::new(Node::new(config, store.clone(), Arc::new(SystemClock)));
    node.start_background_jobs()?;

    let app = http::router(node.clone());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!(
        "Memoir {} node listening on http://{local_addr} (peer: {})",
        node.role(),
        args.peer_url
    );
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, draining background jobs");
    node.shutdown().await;

    match store.save_to_file(&args.data_file) {
        Ok(()) => tracing::info!("Store saved to {}", args.data_file.display()),
        Err(e) => tracing::error!("Failed to save store: {e}"),
    }

    println!("Node shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
