//! Avatar retrieval and upload endpoints.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use namepic_ethereum::{ChainProfile, ChainRegistry, ResolveOwnership};
use namepic_store::AvatarStore;

use crate::extract::Json;
use crate::handler::response::MessageBody;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{self, ServiceState, UploadParams};

/// Tracing target for the avatar endpoints.
const TRACING_TARGET: &str = "namepic::handler::avatars";

/// Network assumed when the path carries only a name.
const DEFAULT_NETWORK: &str = "mainnet";

/// Returns the [`Router`] with the avatar endpoints.
///
/// Single-segment paths address the default network; two-segment paths
/// name the network explicitly. `GET` routes also answer `HEAD`.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/{network}/{name}", get(get_avatar).put(put_avatar))
        .route(
            "/{name}",
            get(get_avatar_default).put(put_avatar_default),
        )
}

fn lookup_chain<'a>(chains: &'a ChainRegistry, network: &str) -> Result<&'a ChainProfile> {
    chains
        .lookup(network)
        .ok_or_else(|| ErrorKind::BadRequest.with_message("Network not supported"))
}

async fn get_avatar(
    method: Method,
    State(store): State<AvatarStore>,
    State(chains): State<ChainRegistry>,
    State(oracle): State<Arc<dyn ResolveOwnership>>,
    Path((network, name)): Path<(String, String)>,
) -> Result<Response> {
    let chain = lookup_chain(&chains, &network)?;

    tracing::debug!(
        target: TRACING_TARGET,
        method = %method,
        network = %chain.network,
        name = %name,
        "Retrieving avatar"
    );

    let avatar = service::retrieve(&store, oracle.as_ref(), chain, &name).await?;

    // HEAD advertises the blob's length without a body; setting the
    // length explicitly keeps both verbs consistent.
    let length = HeaderValue::from(avatar.size());
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(avatar.bytes)
    };

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("image/jpeg")),
            (CONTENT_LENGTH, length),
        ],
        body,
    )
        .into_response())
}

async fn get_avatar_default(
    method: Method,
    store: State<AvatarStore>,
    chains: State<ChainRegistry>,
    oracle: State<Arc<dyn ResolveOwnership>>,
    Path(name): Path<String>,
) -> Result<Response> {
    let path = Path((DEFAULT_NETWORK.to_owned(), name));
    get_avatar(method, store, chains, oracle, path).await
}

async fn put_avatar(
    State(store): State<AvatarStore>,
    State(chains): State<ChainRegistry>,
    State(oracle): State<Arc<dyn ResolveOwnership>>,
    Path((network, name)): Path<(String, String)>,
    Json(params): Json<UploadParams>,
) -> Result<Json<MessageBody>> {
    let chain = lookup_chain(&chains, &network)?;

    tracing::debug!(
        target: TRACING_TARGET,
        network = %chain.network,
        name = %name,
        "Authorizing upload"
    );

    service::authorize_and_store(&store, oracle.as_ref(), chain, &name, params).await?;
    Ok(Json(MessageBody::new("uploaded")))
}

async fn put_avatar_default(
    store: State<AvatarStore>,
    chains: State<ChainRegistry>,
    oracle: State<Arc<dyn ResolveOwnership>>,
    Path(name): Path<String>,
    params: Json<UploadParams>,
) -> Result<Json<MessageBody>> {
    let path = Path((DEFAULT_NETWORK.to_owned(), name));
    put_avatar(store, chains, oracle, path, params).await
}

/// Fallback for paths no route matches.
pub async fn fallback() -> Error {
    ErrorKind::NotFound.into_error()
}
