//! Service layer: configuration, state, and the two core operations.

mod config;
mod error;
mod promote;
mod state;
mod upload;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::error::{Result, ServiceError};
pub use crate::service::promote::retrieve;
pub use crate::service::state::ServiceState;
pub use crate::service::upload::{MAX_IMAGE_BYTES, UploadParams, authorize_and_store};
