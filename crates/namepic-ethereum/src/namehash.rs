//! ENS name hashing and normalization checks.

use sha3::{Digest, Keccak256};
use unicode_normalization::UnicodeNormalization;

/// Computes the EIP-137 namehash of a dot-separated name.
///
/// The empty name hashes to thirty-two zero bytes; each label extends
/// the node hash from the right, `node = keccak(node || keccak(label))`.
pub fn namehash(name: &str) -> [u8; 32] {
    let mut node = [0u8; 32];
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = labelhash(label);
        let mut hasher = Keccak256::new();
        hasher.update(node);
        hasher.update(label_hash);
        node = hasher.finalize().into();
    }
    node
}

/// Computes the keccak-256 hash of a single label.
pub fn labelhash(label: &str) -> [u8; 32] {
    Keccak256::digest(label.as_bytes()).into()
}

/// Checks that a name is already in its canonical normalized form.
///
/// Canonical form here is lowercase, Unicode NFC, with no empty labels.
/// Uploads for names that round-trip differently are rejected rather
/// than silently normalized, so the signed message and the storage key
/// always agree.
pub fn is_normalized(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if name.split('.').any(str::is_empty) {
        return false;
    }

    let canonical: String = name.to_lowercase().nfc().collect();
    canonical == name
}
