//! HTTP transport
//!
//! Exposes the chat service over axum. The server stops on Ctrl-C (or
//! SIGTERM on Unix), then persists every resident session.

pub mod error;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, RATE_LIMIT_MESSAGE};
pub use routes::create_router;

use crate::context::AppContext;
use crate::error::{JarvisError, Result};

/// Bind the configured address and serve until a shutdown signal
///
/// # Errors
///
/// Returns error if the listener cannot be bound or the server fails
pub async fn serve(ctx: AppContext) -> Result<()> {
    let addr = format!("{}:{}", ctx.config.server.host, ctx.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| JarvisError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("API listening on http://{}", addr);

    let router = create_router(ctx.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ctx.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
