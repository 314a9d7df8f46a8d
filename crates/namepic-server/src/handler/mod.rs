//! HTTP handlers and the router.

mod avatars;
mod error;
mod response;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{ErrorBody, MessageBody};

use axum::Router;

use crate::service::ServiceState;

/// Returns the [`Router`] with all handler routes.
///
/// Unmatched paths and methods both fall back to a plain 404; the API
/// never answers 405.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(avatars::routes())
        .fallback(avatars::fallback)
        .method_not_allowed_fallback(avatars::fallback)
}
