//! JSON response envelopes.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Success envelope, `{"message": "..."}`.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    /// Human-readable success message.
    pub message: Cow<'static, str>,
}

impl MessageBody {
    /// Creates a new message body.
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error envelope, `{"error": "...", "status": 400}`.
///
/// The shape is part of the wire contract; clients match on it.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
    /// HTTP status code, repeated in the body.
    pub status: u16,
}
