//! Ethereum-side error types.

/// Result type for JSON-RPC transport operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// Result type for ownership resolution.
pub type OracleResult<T> = Result<T, OracleError>;

/// Errors raised by the JSON-RPC transport.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// HTTP transport failure (connection, timeout, non-success status).
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The response envelope did not have the expected shape.
    #[error("malformed rpc response: {0}")]
    Malformed(String),
}

impl RpcError {
    /// Creates a new malformed response error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Errors raised while decoding ABI-encoded call data or results.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    /// The payload ended before a required word could be read.
    #[error("abi data truncated at offset {0}")]
    Truncated(usize),

    /// An offset or length word did not fit in a usize.
    #[error("abi offset out of range at {0}")]
    OffsetOutOfRange(usize),

    /// A word had padding bytes that should have been zero.
    #[error("abi word has invalid padding at offset {0}")]
    InvalidPadding(usize),

    /// A boolean word held a value other than zero or one.
    #[error("abi word is not a valid boolean")]
    InvalidBool,
}

/// Errors raised by the ownership oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The underlying `eth_call` failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// The multicall response could not be decoded.
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// A batched sub-call reverted. No per-call fallback is attempted.
    #[error("multicall sub-call {index} reverted")]
    SubCallFailed {
        /// Position of the failed call within the batch.
        index: usize,
    },

    /// The response held a different number of results than calls submitted.
    #[error("multicall returned {got} results, expected {expected}")]
    ResultCountMismatch {
        /// Number of results in the response.
        got: usize,
        /// Number of calls submitted.
        expected: usize,
    },
}
