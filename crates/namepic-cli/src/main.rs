#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use namepic_server::middleware::create_cors_layer;
use namepic_server::service::ServiceState;

use crate::config::Cli;
use crate::server::TRACING_TARGET_SHUTDOWN;

/// Tracing target for configuration events.
pub const TRACING_TARGET_CONFIG: &str = "namepic_cli::config";

/// Tracing target for startup events.
pub const TRACING_TARGET_STARTUP: &str = "namepic_cli::server::startup";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let service_config = cli.service_config()?;
    let state = ServiceState::from_config(&service_config)
        .context("failed to create service state")?;
    let router = create_router(state, &cli);

    server::serve_http(router, cli.server).await?;

    Ok(())
}

/// Creates the router with the CORS layer applied outermost.
fn create_router(state: ServiceState, cli: &Cli) -> Router {
    namepic_server::routes()
        .with_state(state)
        .layer(create_cors_layer(&cli.cors))
}
