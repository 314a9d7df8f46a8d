//! JSON-RPC `eth_call` transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::TRACING_TARGET;
use crate::address::Address;
use crate::error::{RpcError, RpcResult};

/// Default timeout for a single `eth_call` round trip.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only `eth_call` seam between the oracle and the network.
///
/// Production uses [`RpcClient`]; tests substitute canned transports.
#[async_trait]
pub trait EthCall: Send + Sync {
    /// Executes an `eth_call` against `to` at the latest block and
    /// returns the raw return data.
    async fn eth_call(&self, endpoint: &Url, to: Address, data: &[u8]) -> RpcResult<Vec<u8>>;
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: (CallParams<'a>, &'static str),
}

#[derive(Debug, Serialize)]
struct CallParams<'a> {
    to: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

struct RpcClientInner {
    http: reqwest::Client,
}

impl std::fmt::Debug for RpcClientInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClientInner").finish_non_exhaustive()
    }
}

/// HTTP JSON-RPC client shared across all configured networks.
///
/// The endpoint is supplied per call, so one client serves every chain
/// profile without holding per-network state.
#[derive(Clone, Debug)]
pub struct RpcClient {
    inner: Arc<RpcClientInner>,
}

impl RpcClient {
    /// Creates a new client with the default request timeout.
    pub fn new() -> RpcResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Creates a new client with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> RpcResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            inner: Arc::new(RpcClientInner { http }),
        })
    }
}

#[async_trait]
impl EthCall for RpcClient {
    async fn eth_call(&self, endpoint: &Url, to: Address, data: &[u8]) -> RpcResult<Vec<u8>> {
        let to = to.to_checksum();
        let data = format!("0x{}", hex::encode(data));

        tracing::debug!(
            target: TRACING_TARGET,
            endpoint = %endpoint,
            to = %to,
            data_len = data.len(),
            "Submitting eth_call"
        );

        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (
                CallParams {
                    to: &to,
                    data: &data,
                },
                "latest",
            ),
        };

        let response: RpcResponse = self
            .inner
            .http
            .post(endpoint.clone())
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = response
            .result
            .ok_or_else(|| RpcError::malformed("response has neither result nor error"))?;
        let hex_part = result
            .strip_prefix("0x")
            .ok_or_else(|| RpcError::malformed("result is not 0x-prefixed hex"))?;

        hex::decode(hex_part).map_err(|_| RpcError::malformed("result is not valid hex"))
    }
}
