#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;
mod key;

pub use backend::{AvatarStore, ListPage, StoredAvatar};
pub use config::{StoreConfig, StoreService};
pub use error::{StoreError, StoreResult};
pub use key::ObjectKey;

/// Tracing target for store operations.
pub const TRACING_TARGET: &str = "namepic_store";
