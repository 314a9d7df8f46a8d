//! Service initialization errors.

use namepic_ethereum::RpcError;
use namepic_store::StoreError;

/// Result type for service initialization.
pub type Result<T, E = ServiceError> = std::result::Result<T, E>;

/// Errors raised while building the service state.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Avatar store could not be initialized.
    #[error("store: {0}")]
    Store(#[from] StoreError),

    /// JSON-RPC client could not be created.
    #[error("rpc client: {0}")]
    Rpc(#[from] RpcError),
}
