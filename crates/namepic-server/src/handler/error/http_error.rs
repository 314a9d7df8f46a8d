//! HTTP error handling with builder-style messages.

use std::borrow::Cow;
use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use namepic_ethereum::OracleError;
use namepic_store::StoreError;

use crate::handler::response::ErrorBody;

/// Tracing target for handler-boundary fault translation.
const TRACING_TARGET: &str = "namepic::handler::error";

/// The error type for HTTP handlers.
///
/// Carries an [`ErrorKind`] plus an optional message overriding the
/// kind's default. Serializes as the `{error, status}` envelope; no
/// internal fault leaks past the handler boundary unclassified.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless serialized"]
pub struct Error {
    kind: ErrorKind,
    message: Option<Cow<'static, str>>,
}

impl Error {
    /// Creates a new [`Error`] with the specified kind.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Sets a custom message for the error.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message that will be serialized.
    pub fn message(&self) -> &str {
        self.message
            .as_deref()
            .unwrap_or_else(|| self.kind.default_message())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({})",
            self.message(),
            self.kind.status_code().as_u16()
        )
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();
        let body = ErrorBody {
            error: self.message().to_owned(),
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ErrorKind> for Error {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        tracing::error!(
            target: TRACING_TARGET,
            error = %err,
            "Store operation failed"
        );
        // Store misses are handled before this boundary; anything that
        // reaches it is an internal fault.
        Error::new(ErrorKind::InternalServerError)
    }
}

impl From<OracleError> for Error {
    fn from(err: OracleError) -> Self {
        tracing::error!(
            target: TRACING_TARGET,
            error = %err,
            "Ownership resolution failed"
        );
        Error::new(ErrorKind::UpstreamUnavailable)
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// All failure kinds the service can report.
#[must_use = "error kinds do nothing unless used to create errors"]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400 - Missing or malformed request data.
    BadRequest,
    /// 400 - Signature recovery failed or mismatched the claimed
    /// address. Distinct from [`Forbidden`](Self::Forbidden): the
    /// request never proved who signed it.
    InvalidSignature,
    /// 403 - Verified signer is not authorized (wrong owner, expired
    /// signature).
    Forbidden,
    /// 404 - Name or blob not found.
    NotFound,
    /// 413 - Image exceeds the upload size limit.
    PayloadTooLarge,
    /// 415 - Upload is not an `image/jpeg`.
    UnsupportedMediaType,
    /// 502 - RPC call failed or its response could not be decoded.
    UpstreamUnavailable,
    /// 500 - Unexpected internal fault.
    #[default]
    InternalServerError,
}

impl ErrorKind {
    /// Converts this error kind into a full [`Error`].
    #[inline]
    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    /// Creates an [`Error`] with the specified message.
    #[inline]
    pub fn with_message(self, message: impl Into<Cow<'static, str>>) -> Error {
        Error::new(self).with_message(message)
    }

    /// Returns the HTTP status code for this error kind.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default wire message for this error kind.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::InvalidSignature => "Invalid signature",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::PayloadTooLarge => "Image is too large",
            Self::UnsupportedMediaType => "File must be of type image/jpeg",
            Self::UpstreamUnavailable => "Upstream unavailable",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_message())
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        self.into_error().into_response()
    }
}
