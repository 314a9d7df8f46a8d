#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::handler::routes;

/// Default tracing target for this crate.
pub const TRACING_TARGET: &str = "namepic_server";
