//! EIP-712 typed-data hashing and signature recovery for avatar uploads.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::Address;

/// The single message type bound by upload signatures.
const UPLOAD_TYPE: &str = "Upload(string upload,string expiry,string name,string hash)";

/// Domain type without chainId or verifyingContract, matching the wire
/// format clients sign against.
const DOMAIN_TYPE: &str = "EIP712Domain(string name,string version)";

/// Fixed value of the `upload` message field.
const UPLOAD_KIND: &str = "avatar";

/// Domain version, bumped only on breaking schema changes.
const DOMAIN_VERSION: &str = "1";

/// EIP-712 message over upload metadata and the content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMessage<'a> {
    /// Expiry timestamp as a decimal millisecond string.
    pub expiry: &'a str,
    /// The name the avatar is being uploaded for.
    pub name: &'a str,
    /// 0x-prefixed hex SHA-256 of the uploaded bytes.
    pub hash: &'a str,
}

fn keccak(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn hash_string(value: &str) -> [u8; 32] {
    keccak(value.as_bytes())
}

fn domain_separator(domain_name: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(hash_string(DOMAIN_TYPE));
    hasher.update(hash_string(domain_name));
    hasher.update(hash_string(DOMAIN_VERSION));
    hasher.finalize().into()
}

fn struct_hash(message: &UploadMessage<'_>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(hash_string(UPLOAD_TYPE));
    hasher.update(hash_string(UPLOAD_KIND));
    hasher.update(hash_string(message.expiry));
    hasher.update(hash_string(message.name));
    hasher.update(hash_string(message.hash));
    hasher.finalize().into()
}

/// Computes the EIP-712 signing digest for an upload message.
///
/// `"\x19\x01" || domainSeparator || structHash`, keccak-256 hashed.
pub fn upload_digest(domain_name: &str, message: &UploadMessage<'_>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain_separator(domain_name));
    hasher.update(struct_hash(message));
    hasher.finalize().into()
}

/// Recovers the signer address from a 65-byte `r || s || v` signature.
///
/// `v` may be 0/1 or 27/28. Any malformed input returns `None`.
pub fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Option<Address> {
    if signature.len() != 65 {
        return None;
    }

    let v = signature[64];
    let recovery_byte = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_byte(recovery_byte)?;
    let signature = Signature::from_slice(&signature[..64]).ok()?;

    let verifying_key = VerifyingKey::recover_from_prehash(digest, &signature, recovery_id).ok()?;

    // Address is the low 20 bytes of the keccak of the uncompressed
    // public key, prefix byte dropped.
    let point = verifying_key.to_encoded_point(false);
    let hash = keccak(&point.as_bytes()[1..]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Some(Address::new(bytes))
}

/// Verifies an upload signature against the address the client claims.
///
/// Returns the recovered address only when it matches `claimed`; every
/// recovery failure collapses to `None` rather than an error, so the
/// caller can report "invalid signature" distinctly from ownership
/// failures.
pub fn verify_upload(
    domain_name: &str,
    message: &UploadMessage<'_>,
    signature_hex: &str,
    claimed: Address,
) -> Option<Address> {
    let signature = hex::decode(signature_hex.strip_prefix("0x")?).ok()?;
    let digest = upload_digest(domain_name, message);
    let recovered = recover_signer(&digest, &signature)?;

    (recovered == claimed).then_some(recovered)
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::SigningKey;

    use super::*;

    const DOMAIN: &str = "Ethereum Name Service";

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[0x42u8; 32].into()).unwrap()
    }

    fn sign(message: &UploadMessage<'_>) -> (String, Address) {
        let key = signing_key();
        let digest = upload_digest(DOMAIN, message);
        let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();

        let mut raw = signature.to_bytes().to_vec();
        raw.push(recovery_id.to_byte() + 27);

        let signer = recover_signer(&digest, &raw).unwrap();
        (format!("0x{}", hex::encode(raw)), signer)
    }

    fn message() -> UploadMessage<'static> {
        UploadMessage {
            expiry: "1735689600000",
            name: "test.eth",
            hash: "0x9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08",
        }
    }

    #[test]
    fn digest_is_deterministic_and_binds_fields() {
        let base = upload_digest(DOMAIN, &message());
        assert_eq!(base, upload_digest(DOMAIN, &message()));

        let other = UploadMessage {
            name: "other.eth",
            ..message()
        };
        assert_ne!(base, upload_digest(DOMAIN, &other));
        assert_ne!(base, upload_digest("Other Service", &message()));
    }

    #[test]
    fn verify_accepts_matching_signer() {
        let message = message();
        let (signature, signer) = sign(&message);

        let recovered = verify_upload(DOMAIN, &message, &signature, signer);
        assert_eq!(recovered, Some(signer));
    }

    #[test]
    fn verify_rejects_wrong_claimed_address() {
        let message = message();
        let (signature, _) = sign(&message);

        let other = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(verify_upload(DOMAIN, &message, &signature, other), None);
    }

    #[test]
    fn verify_rejects_tampered_message() {
        let message = message();
        let (signature, signer) = sign(&message);

        let tampered = UploadMessage {
            expiry: "1",
            ..message
        };
        assert_eq!(verify_upload(DOMAIN, &tampered, &signature, signer), None);
    }

    #[test]
    fn malformed_signatures_collapse_to_none() {
        let message = message();
        let signer = Address::new([1; 20]);

        assert_eq!(verify_upload(DOMAIN, &message, "0x1234", signer), None);
        assert_eq!(verify_upload(DOMAIN, &message, "not-hex", signer), None);
        assert_eq!(verify_upload(DOMAIN, &message, "", signer), None);

        let all_zero = format!("0x{}", "00".repeat(65));
        assert_eq!(verify_upload(DOMAIN, &message, &all_zero, signer), None);
    }

    #[test]
    fn v_values_27_and_0_are_equivalent() {
        let message = message();
        let key = signing_key();
        let digest = upload_digest(DOMAIN, &message);
        let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();

        let mut legacy = signature.to_bytes().to_vec();
        legacy.push(recovery_id.to_byte() + 27);
        let mut modern = signature.to_bytes().to_vec();
        modern.push(recovery_id.to_byte());

        assert_eq!(
            recover_signer(&digest, &legacy),
            recover_signer(&digest, &modern)
        );
    }
}
