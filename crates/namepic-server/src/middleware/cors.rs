//! CORS (Cross-Origin Resource Sharing) middleware configuration.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use clap::Args;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Creates a CORS layer based on the provided configuration.
///
/// With no configured origins the layer mirrors the request origin,
/// matching the open-access behavior avatar consumers expect; an
/// explicit allow-list restricts it.
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origin = if config.allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::PUT, Method::HEAD, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(config.max_age())
}

/// CORS configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct CorsConfig {
    /// List of allowed CORS origins.
    /// If empty, the request origin is mirrored.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Maximum age for CORS preflight requests in seconds.
    #[arg(long, env = "CORS_MAX_AGE", default_value_t = 3600)]
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_age_seconds: 3600,
        }
    }
}

impl CorsConfig {
    /// Returns the CORS max age as a `Duration`.
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_mirroring_layer() {
        let config = CorsConfig::default();
        assert!(config.allowed_origins.is_empty());
        let _layer = create_cors_layer(&config);
    }

    #[test]
    fn explicit_origins_build_list_layer() {
        let config = CorsConfig {
            allowed_origins: vec!["https://app.ens.domains".to_owned()],
            ..CorsConfig::default()
        };
        let _layer = create_cors_layer(&config);
    }
}
