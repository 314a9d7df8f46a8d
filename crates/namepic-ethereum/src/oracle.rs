//! On-chain ownership and availability resolution.

use std::sync::Arc;

use async_trait::async_trait;

use crate::TRACING_TARGET;
use crate::abi::{
    self, Call3, SELECTOR_REGISTRAR_AVAILABLE, SELECTOR_REGISTRY_OWNER, SELECTOR_WRAPPER_OWNER_OF,
};
use crate::address::Address;
use crate::chain::ChainProfile;
use crate::error::{OracleError, OracleResult};
use crate::namehash::{labelhash, namehash};
use crate::rpc::EthCall;

/// Resolved on-chain state for one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRecord {
    /// Current owner, `None` when no registry entry exists.
    pub owner: Option<Address>,
    /// Whether the name is open for registration. Meaningful only for
    /// direct subnames of the root label; `false` everywhere else.
    pub available: bool,
}

/// Ownership resolution seam consumed by the upload and retrieval paths.
#[async_trait]
pub trait ResolveOwnership: Send + Sync {
    /// Resolves the owner and availability of `name` on `chain`.
    async fn resolve(&self, chain: &ChainProfile, name: &str) -> OracleResult<NameRecord>;
}

/// Resolves ownership with a single Multicall3 batch per call.
///
/// Results are never cached; every resolution is one fresh round trip.
#[derive(Clone)]
pub struct OwnershipOracle {
    transport: Arc<dyn EthCall>,
}

impl OwnershipOracle {
    /// Creates an oracle over the given transport.
    pub fn new(transport: Arc<dyn EthCall>) -> Self {
        Self { transport }
    }
}

impl std::fmt::Debug for OwnershipOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnershipOracle").finish_non_exhaustive()
    }
}

#[async_trait]
impl ResolveOwnership for OwnershipOracle {
    async fn resolve(&self, chain: &ChainProfile, name: &str) -> OracleResult<NameRecord> {
        let node = namehash(name);
        let labels: Vec<&str> = name.split('.').collect();

        // The availability call only applies to direct subnames of the
        // root label; any other shape never needs the third sub-call.
        let is_root_second_level = labels.len() == 2 && labels[1] == chain.root_label;

        let mut calls = vec![
            Call3 {
                target: chain.registry,
                call_data: abi::encode_word_call(SELECTOR_REGISTRY_OWNER, node),
            },
            Call3 {
                target: chain.wrapper,
                call_data: abi::encode_word_call(SELECTOR_WRAPPER_OWNER_OF, node),
            },
        ];
        if is_root_second_level {
            calls.push(Call3 {
                target: chain.base_registrar,
                call_data: abi::encode_word_call(
                    SELECTOR_REGISTRAR_AVAILABLE,
                    labelhash(labels[0]),
                ),
            });
        }

        tracing::debug!(
            target: TRACING_TARGET,
            network = %chain.network,
            name = %name,
            sub_calls = calls.len(),
            "Resolving ownership"
        );

        let data = abi::encode_aggregate3(&calls);
        let raw = self
            .transport
            .eth_call(&chain.rpc_endpoint, chain.multicall, &data)
            .await?;

        let results = abi::decode_aggregate3(&raw)?;
        if results.len() != calls.len() {
            return Err(OracleError::ResultCountMismatch {
                got: results.len(),
                expected: calls.len(),
            });
        }
        if let Some(index) = results.iter().position(|r| !r.success) {
            return Err(OracleError::SubCallFailed { index });
        }

        let registry_owner = abi::decode_address(&results[0].return_data)?;
        let wrapper_owner = abi::decode_address(&results[1].return_data)?;
        let available = match results.get(2) {
            Some(result) => abi::decode_bool(&result.return_data)?,
            None => false,
        };

        // When the registry points at the wrapper, the wrapper holds the
        // name on behalf of its actual owner.
        let owner = if registry_owner == chain.wrapper {
            wrapper_owner
        } else {
            registry_owner
        };

        let record = NameRecord {
            owner: (!owner.is_zero()).then_some(owner),
            available,
        };

        tracing::debug!(
            target: TRACING_TARGET,
            network = %chain.network,
            name = %name,
            owner = ?record.owner,
            available = record.available,
            "Ownership resolved"
        );

        Ok(record)
    }
}
