//! Upload authorization.
//!
//! The checks run as ordered hard gates with cheap local validation
//! first; the rate-limited on-chain lookup is the last gate that can
//! reject without it.

use bytes::Bytes;
use namepic_ethereum::{
    Address, ChainProfile, ResolveOwnership, UploadMessage, is_normalized, verify_upload,
};
use namepic_store::{AvatarStore, ObjectKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::handler::{ErrorKind, Result};

/// Tracing target for upload authorization.
const TRACING_TARGET: &str = "namepic::service::upload";

/// Maximum accepted image size: 512 KiB.
pub const MAX_IMAGE_BYTES: usize = 512 * 1024;

/// The only content type accepted for uploads.
const JPEG_MIME: &str = "image/jpeg";

/// Upload request body.
///
/// Constructed per request and discarded once the write succeeds or
/// fails; never persisted independently of the resulting blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    /// Expiry timestamp as a decimal millisecond string.
    pub expiry: String,
    /// Image payload as a base64 data URL.
    #[serde(rename = "dataURL")]
    pub data_url: String,
    /// 0x-prefixed hex typed-data signature.
    pub sig: String,
    /// Address the client claims signed the upload.
    pub unverified_address: String,
}

/// Decoded data URL payload.
struct DataUrl {
    mime: String,
    bytes: Bytes,
}

fn parse_data_url(data_url: &str) -> Option<DataUrl> {
    use base64::Engine;

    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.split(';').next()?.to_owned();

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()?;
    Some(DataUrl {
        mime,
        bytes: Bytes::from(bytes),
    })
}

/// Authorizes an upload and writes the blob into its slot.
///
/// Gate order is normative: schema, mime, normalization, signature,
/// size, ownership, expiry, write, write verification. Each failure
/// short-circuits with its wire error.
pub async fn authorize_and_store(
    store: &AvatarStore,
    oracle: &dyn ResolveOwnership,
    chain: &ChainProfile,
    name: &str,
    params: UploadParams,
) -> Result<()> {
    // Gate 1b: the expiry field must at least be numeric, even though
    // the freshness comparison happens after the ownership lookup.
    let expiry_ms: i64 = params
        .expiry
        .parse()
        .map_err(|_| ErrorKind::BadRequest.with_message("Request is missing parameters"))?;

    // Gate 2: decode the payload and check the declared media type.
    let data = parse_data_url(&params.data_url)
        .ok_or_else(|| ErrorKind::BadRequest.with_message("Request is missing parameters"))?;
    if data.mime != JPEG_MIME {
        return Err(ErrorKind::UnsupportedMediaType
            .with_message("File must be of type image/jpeg"));
    }

    // Gate 3: the name must already be canonical; uploads are never
    // silently normalized.
    if !is_normalized(name) {
        return Err(ErrorKind::BadRequest.with_message("Name must be in normalized form"));
    }

    // Gate 4: recover and match the signer.
    let claimed: Address = params
        .unverified_address
        .parse()
        .map_err(|_| ErrorKind::InvalidSignature.with_message("Invalid signature"))?;
    let hash = format!("0x{}", hex::encode(Sha256::digest(&data.bytes)));
    let message = UploadMessage {
        expiry: &params.expiry,
        name,
        hash: &hash,
    };
    let verified = verify_upload(&chain.domain_name, &message, &params.sig, claimed)
        .ok_or_else(|| ErrorKind::InvalidSignature.with_message("Invalid signature"))?;

    // Gate 5: size limit, before any network round trip.
    if data.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ErrorKind::PayloadTooLarge.with_message("Image is too large"));
    }

    // Gate 6: the single on-chain lookup.
    let record = oracle.resolve(chain, name).await?;
    if !record.available {
        match record.owner {
            None => {
                return Err(ErrorKind::NotFound.with_message(format!("{name} not found")));
            }
            Some(owner) if owner != verified => {
                return Err(ErrorKind::Forbidden
                    .with_message(format!("Address {verified} is not the owner of {name}")));
            }
            Some(_) => {}
        }
    }

    // Gate 7: signature freshness.
    let now_ms = jiff::Timestamp::now().as_millisecond();
    if expiry_ms <= now_ms {
        return Err(ErrorKind::Forbidden.with_message("Signature expired"));
    }

    // Gate 8: available names go to the uploader's speculative slot,
    // registered names straight to the canonical slot.
    let key = if record.available {
        ObjectKey::speculative(&chain.network, name, verified)
    } else {
        ObjectKey::canonical(&chain.network, name)
    };

    tracing::info!(
        target: TRACING_TARGET,
        network = %chain.network,
        name = %name,
        uploader = %verified,
        key = %key,
        size = data.bytes.len(),
        "Storing authorized upload"
    );

    // Gate 9: the write must land on the intended key.
    let reported = store.put(&key, data.bytes, JPEG_MIME).await?;
    if reported != key.to_string() {
        return Err(ErrorKind::InternalServerError.with_message(format!("{name} not uploaded")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use namepic_ethereum::mock::MockOracle;
    use namepic_ethereum::{ChainRegistry, NameRecord, recover_signer, upload_digest};

    use super::*;
    use crate::handler::ErrorKind;

    fn chain() -> ChainProfile {
        ChainRegistry::default().lookup("mainnet").unwrap().clone()
    }

    fn jpeg_data_url(len: usize) -> String {
        use base64::Engine;
        let mut bytes = vec![0u8; len.max(3)];
        bytes[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    fn signed_params(data_url: &str, expiry: &str, name: &str) -> (UploadParams, Address) {
        use k256::ecdsa::SigningKey;

        let key = SigningKey::from_bytes(&[0x42u8; 32].into()).unwrap();
        let payload = parse_data_url(data_url).unwrap();
        let hash = format!("0x{}", hex::encode(Sha256::digest(&payload.bytes)));
        let message = UploadMessage {
            expiry,
            name,
            hash: &hash,
        };
        let digest = upload_digest(&chain().domain_name, &message);
        let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();
        let mut raw = signature.to_bytes().to_vec();
        raw.push(recovery_id.to_byte() + 27);
        let signer = recover_signer(&digest, &raw).unwrap();

        (
            UploadParams {
                expiry: expiry.to_owned(),
                data_url: data_url.to_owned(),
                sig: format!("0x{}", hex::encode(raw)),
                unverified_address: signer.to_checksum(),
            },
            signer,
        )
    }

    fn future_expiry() -> String {
        (jiff::Timestamp::now().as_millisecond() + 100_000).to_string()
    }

    #[tokio::test]
    async fn registered_name_stores_canonical() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let data_url = jpeg_data_url(16);
        let (params, signer) = signed_params(&data_url, &future_expiry(), "test.eth");

        oracle.push(NameRecord {
            owner: Some(signer),
            available: false,
        });

        authorize_and_store(&store, oracle.as_ref(), &chain, "test.eth", params)
            .await
            .unwrap();

        let key = ObjectKey::canonical("mainnet", "test.eth");
        assert!(store.get(&key).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn available_name_stores_speculative() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let data_url = jpeg_data_url(16);
        let (params, signer) = signed_params(&data_url, &future_expiry(), "test.eth");

        oracle.push(NameRecord {
            owner: None,
            available: true,
        });

        authorize_and_store(&store, oracle.as_ref(), &chain, "test.eth", params)
            .await
            .unwrap();

        let key = ObjectKey::speculative("mainnet", "test.eth", signer);
        assert!(store.get(&key).await.unwrap().is_some());
        // Nothing landed in the canonical slot.
        let canonical = ObjectKey::canonical("mainnet", "test.eth");
        assert!(store.get(&canonical).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_payload_rejected_before_oracle() {
        let store = AvatarStore::memory().unwrap();
        // Empty oracle queue: a resolve call would fail the test with
        // an upstream error instead of 413.
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let data_url = jpeg_data_url(MAX_IMAGE_BYTES + 1);
        let (params, _) = signed_params(&data_url, &future_expiry(), "test.eth");

        let error = authorize_and_store(&store, oracle.as_ref(), &chain, "test.eth", params)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::PayloadTooLarge);
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn expired_signature_rejected_after_ownership_passes() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let data_url = jpeg_data_url(16);
        let (params, signer) = signed_params(&data_url, "1", "test.eth");

        oracle.push(NameRecord {
            owner: Some(signer),
            available: false,
        });

        let error = authorize_and_store(&store, oracle.as_ref(), &chain, "test.eth", params)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.message(), "Signature expired");
    }

    #[tokio::test]
    async fn non_numeric_expiry_is_a_bad_request() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let data_url = jpeg_data_url(16);
        let (mut params, _) = signed_params(&data_url, &future_expiry(), "test.eth");
        params.expiry = "soon".to_owned();

        let error = authorize_and_store(&store, oracle.as_ref(), &chain, "test.eth", params)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::BadRequest);
    }
}
