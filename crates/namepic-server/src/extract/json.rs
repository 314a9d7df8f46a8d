//! JSON extractor mapping rejections onto the service's error envelope.

use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// JSON extractor whose rejection is the wire-format parameter error.
///
/// Any missing field, malformed body or wrong content type rejects with
/// 400 `"Request is missing parameters"` instead of axum's default
/// plain-text rejection.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        <AxumJson<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map(|json| Self(json.0))
            .map_err(|_| ErrorKind::BadRequest.with_message("Request is missing parameters"))
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
