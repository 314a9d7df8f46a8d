//! CLI configuration management.
//!
//! The configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── server: ServerConfig # Host, port, shutdown
//! ├── cors: CorsConfig     # Allowed origins, max age
//! ├── store: StoreConfig   # Blob storage backend
//! └── chains: ChainConfig  # RPC endpoint overrides
//! ```
//!
//! All options can be provided via CLI arguments or environment
//! variables. Use `--help` to see them all.

mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use namepic_ethereum::ChainConfig;
use namepic_server::middleware::CorsConfig;
use namepic_server::service::ServiceConfig;
use namepic_store::StoreConfig;
use serde::{Deserialize, Serialize};
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "namepic")]
#[command(about = "ENS avatar storage and retrieval server")]
#[command(version)]
pub struct Cli {
    /// Server network and lifecycle configuration.
    #[clap(flatten)]
    pub server: ServerConfig,

    /// CORS configuration.
    #[clap(flatten)]
    pub cors: CorsConfig,

    /// Blob storage configuration.
    #[clap(flatten)]
    pub store: StoreConfig,

    /// Chain RPC endpoint overrides.
    #[clap(flatten)]
    pub chains: ChainConfig,
}

impl Cli {
    /// Loads environment variables from a .env file and parses CLI
    /// arguments.
    ///
    /// The .env pass runs before clap so its `env` attributes can pick
    /// the values up as defaults.
    pub fn init() -> Self {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
        Self::parse()
    }

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("invalid server configuration")?;
        Ok(())
    }

    /// Assembles the service configuration for state construction.
    pub fn service_config(&self) -> anyhow::Result<ServiceConfig> {
        ServiceConfig::builder()
            .with_store(self.store.clone())
            .with_chains(self.chains.clone())
            .build()
            .context("failed to assemble service configuration")
    }

    /// Logs configuration at startup (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            host = %self.server.host,
            port = self.server.port,
            binds_to_all_interfaces = self.server.binds_to_all_interfaces(),
            "Server configuration loaded"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            store_service = %self.store.store_service,
            cors_origins = ?self.cors.allowed_origins,
            "Service configuration loaded"
        );
    }
}
