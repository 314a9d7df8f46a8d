//! Application state and dependency injection.

use std::sync::Arc;

use namepic_ethereum::{ChainRegistry, ResolveOwnership};
use namepic_store::AvatarStore;

use crate::service::{Result, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection). Holds no
/// per-request state; every request is handled independently.
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    store: AvatarStore,
    chains: ChainRegistry,
    oracle: Arc<dyn ResolveOwnership>,
}

impl ServiceState {
    /// Creates state from already-built components.
    pub fn new(
        store: AvatarStore,
        chains: ChainRegistry,
        oracle: Arc<dyn ResolveOwnership>,
    ) -> Self {
        Self {
            store,
            chains,
            oracle,
        }
    }

    /// Initializes application state from configuration.
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Ok(Self {
            store: config.connect_store()?,
            chains: config.chain_registry(),
            oracle: Arc::new(config.create_oracle()?),
        })
    }
}

impl std::fmt::Debug for ServiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceState")
            .field("store", &self.store)
            .field("chains", &self.chains)
            .finish_non_exhaustive()
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+ $(,)?) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(store: AvatarStore);
impl_di!(chains: ChainRegistry);
impl_di!(oracle: Arc<dyn ResolveOwnership>);
