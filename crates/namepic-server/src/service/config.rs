//! Service configuration.

use std::sync::Arc;
use std::time::Duration;

use derive_builder::Builder;
use namepic_ethereum::{ChainConfig, ChainRegistry, OwnershipOracle, RpcClient};
use namepic_store::{AvatarStore, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::service::Result;

/// Default values for configuration options.
mod defaults {
    /// Default timeout for a single JSON-RPC round trip.
    pub const RPC_TIMEOUT_SECS: u64 = 10;
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[must_use = "config does nothing unless you use it"]
#[builder(pattern = "owned", setter(into, strip_option, prefix = "with"))]
pub struct ServiceConfig {
    /// Avatar store configuration.
    #[builder(default)]
    pub store: StoreConfig,

    /// Chain endpoint overrides.
    #[builder(default)]
    pub chains: ChainConfig,

    /// Timeout for a single JSON-RPC round trip in seconds.
    #[builder(default = "defaults::RPC_TIMEOUT_SECS")]
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
}

fn default_rpc_timeout_secs() -> u64 {
    defaults::RPC_TIMEOUT_SECS
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            chains: ChainConfig::default(),
            rpc_timeout_secs: defaults::RPC_TIMEOUT_SECS,
        }
    }
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Builds the avatar store.
    pub fn connect_store(&self) -> Result<AvatarStore> {
        Ok(self.store.build_store()?)
    }

    /// Builds the chain registry with endpoint overrides applied.
    pub fn chain_registry(&self) -> ChainRegistry {
        self.chains.registry()
    }

    /// Creates the ownership oracle over a fresh JSON-RPC client.
    pub fn create_oracle(&self) -> Result<OwnershipOracle> {
        let client = RpcClient::with_timeout(Duration::from_secs(self.rpc_timeout_secs))?;
        Ok(OwnershipOracle::new(Arc::new(client)))
    }
}
