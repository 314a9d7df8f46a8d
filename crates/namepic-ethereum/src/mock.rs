//! Mock ownership resolver for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::chain::ChainProfile;
use crate::error::{OracleError, OracleResult, RpcError};
use crate::oracle::{NameRecord, ResolveOwnership};

/// Queue-backed [`ResolveOwnership`] implementation.
///
/// Each queued record answers exactly one `resolve` call, in order.
/// Resolving past the end of the queue fails with an upstream error, so
/// tests notice unexpected extra round trips.
#[derive(Debug, Default)]
pub struct MockOracle {
    records: Mutex<VecDeque<NameRecord>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockOracle {
    /// Creates an empty mock oracle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a record for the next `resolve` call.
    pub fn push(&self, record: NameRecord) {
        self.records
            .lock()
            .expect("mock oracle lock poisoned")
            .push_back(record);
    }

    /// Returns the (network, name) pairs resolved so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .expect("mock oracle lock poisoned")
            .clone()
    }
}

#[async_trait]
impl ResolveOwnership for MockOracle {
    async fn resolve(&self, chain: &ChainProfile, name: &str) -> OracleResult<NameRecord> {
        self.calls
            .lock()
            .expect("mock oracle lock poisoned")
            .push((chain.network.clone(), name.to_owned()));

        self.records
            .lock()
            .expect("mock oracle lock poisoned")
            .pop_front()
            .ok_or_else(|| {
                OracleError::Rpc(RpcError::malformed("mock oracle has no queued record"))
            })
    }
}
