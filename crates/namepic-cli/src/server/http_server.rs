//! HTTP server startup and lifecycle management.

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::server::{Result, ServerError, TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};
use crate::server::shutdown::shutdown_signal;

/// Starts an HTTP server with graceful shutdown.
///
/// Validates the configuration, binds to the configured address and
/// serves requests until a shutdown signal arrives.
pub async fn serve_http(app: Router, config: ServerConfig) -> Result<()> {
    if let Err(validation_error) = config.validate() {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = %validation_error,
            "Invalid server configuration"
        );
        return Err(ServerError::InvalidConfig(validation_error.to_string()));
    }

    let addr = config.server_addr();
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_STARTUP,
                addr = %addr,
                error = %err,
                "Failed to bind to address"
            );
            return Err(ServerError::Bind {
                address: addr.to_string(),
                source: err,
            });
        }
    };

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        addr = %addr,
        "Server is ready and listening for connections"
    );

    if config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.shutdown_timeout()))
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_SHUTDOWN,
                error = %err,
                "Server encountered an error"
            );
            ServerError::Runtime(err)
        })?;

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "Server shut down gracefully");
    Ok(())
}
