//! Server startup and graceful shutdown

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::HttpConfig;
use crate::error::HttpError;
use crate::router::router;

/// Bind and serve until SIGINT or SIGTERM
pub async fn serve(config: HttpConfig) -> Result<(), HttpError> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| HttpError::Bind { addr, source })?;

    info!(%addr, cors = config.enable_cors, "HTTP demo server listening");

    axum::serve(listener, router(&config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(HttpError::Server)?;

    info!("HTTP demo server stopped");
    Ok(())
}

/// Completes when a shutdown signal is received
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
