#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod abi;
mod address;
mod chain;
mod error;
mod namehash;
mod oracle;
mod rpc;
mod typed_data;

#[cfg(feature = "mock")]
pub mod mock;

pub use abi::{
    Call3, SELECTOR_AGGREGATE3, SELECTOR_REGISTRAR_AVAILABLE, SELECTOR_REGISTRY_OWNER,
    SELECTOR_WRAPPER_OWNER_OF, SubResult, decode_address, decode_aggregate3, decode_bool,
    encode_aggregate3, encode_word_call,
};
pub use address::{Address, ParseAddressError};
pub use chain::{ChainConfig, ChainProfile, ChainRegistry};
pub use error::{AbiError, OracleError, OracleResult, RpcError, RpcResult};
pub use namehash::{is_normalized, labelhash, namehash};
pub use oracle::{NameRecord, OwnershipOracle, ResolveOwnership};
pub use rpc::{EthCall, RpcClient};
pub use typed_data::{UploadMessage, recover_signer, upload_digest, verify_upload};

/// Tracing target for ethereum-side operations.
pub const TRACING_TARGET: &str = "namepic_ethereum";
