//! Store configuration.

use clap::Args;
use opendal::{Operator, services};
use serde::{Deserialize, Serialize};

use crate::backend::AvatarStore;
use crate::error::{StoreError, StoreResult};

/// Storage service backing the avatar store.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StoreService {
    /// In-memory store for tests and local development.
    #[default]
    Memory,
    /// Local filesystem.
    Fs,
    /// S3-compatible object storage.
    S3,
}

/// Avatar store configuration, provided as CLI arguments or environment
/// variables.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StoreConfig {
    /// Storage service backing the avatar store.
    #[arg(long, env = "STORE_SERVICE", value_enum, default_value_t = StoreService::Memory)]
    pub store_service: StoreService,

    /// Root path within the storage service.
    #[arg(long, env = "STORE_ROOT", default_value = "/")]
    pub store_root: String,

    /// S3 bucket name. Required for the s3 service.
    #[arg(long, env = "STORE_S3_BUCKET")]
    pub store_s3_bucket: Option<String>,

    /// S3 region.
    #[arg(long, env = "STORE_S3_REGION")]
    pub store_s3_region: Option<String>,

    /// Custom S3 endpoint, for S3-compatible providers.
    #[arg(long, env = "STORE_S3_ENDPOINT")]
    pub store_s3_endpoint: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_service: StoreService::Memory,
            store_root: "/".to_owned(),
            store_s3_bucket: None,
            store_s3_region: None,
            store_s3_endpoint: None,
        }
    }
}

impl StoreConfig {
    /// Builds the configured OpenDAL operator.
    pub fn build_operator(&self) -> StoreResult<Operator> {
        let operator = match self.store_service {
            StoreService::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StoreError::init(e.to_string()))?
                .finish(),
            StoreService::Fs => {
                let builder = services::Fs::default().root(&self.store_root);
                Operator::new(builder)
                    .map_err(|e| StoreError::init(e.to_string()))?
                    .finish()
            }
            StoreService::S3 => {
                let bucket = self
                    .store_s3_bucket
                    .as_deref()
                    .ok_or_else(|| StoreError::init("s3 service requires a bucket"))?;

                let mut builder = services::S3::default().bucket(bucket).root(&self.store_root);
                if let Some(region) = &self.store_s3_region {
                    builder = builder.region(region);
                }
                if let Some(endpoint) = &self.store_s3_endpoint {
                    builder = builder.endpoint(endpoint);
                }
                Operator::new(builder)
                    .map_err(|e| StoreError::init(e.to_string()))?
                    .finish()
            }
        };
        Ok(operator)
    }

    /// Builds the avatar store for this configuration.
    pub fn build_store(&self) -> StoreResult<AvatarStore> {
        tracing::info!(
            target: crate::TRACING_TARGET,
            service = %self.store_service,
            root = %self.store_root,
            "Initializing avatar store"
        );

        Ok(AvatarStore::from_operator(self.build_operator()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_builds() {
        let config = StoreConfig::default();
        assert!(config.build_store().is_ok());
    }

    #[test]
    fn fs_store_builds_with_root() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            store_service: StoreService::Fs,
            store_root: dir.path().to_string_lossy().into_owned(),
            ..StoreConfig::default()
        };
        assert!(config.build_store().is_ok());
    }

    #[test]
    fn s3_requires_bucket() {
        let config = StoreConfig {
            store_service: StoreService::S3,
            ..StoreConfig::default()
        };
        assert!(matches!(
            config.build_store(),
            Err(StoreError::Init(_))
        ));
    }
}
