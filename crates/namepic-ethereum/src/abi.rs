//! Strict ABI encoding and decoding for the fixed on-chain call set.
//!
//! Only the shapes the oracle actually submits are supported: single-word
//! view calls and the Multicall3 `aggregate3((address,bool,bytes)[])`
//! envelope. Every decode is positional and fails hard on any shape
//! mismatch instead of skipping malformed words.

use crate::address::Address;
use crate::error::AbiError;

/// `owner(bytes32)` on the ENS registry.
pub const SELECTOR_REGISTRY_OWNER: [u8; 4] = [0x02, 0x57, 0x1b, 0xe3];

/// `ownerOf(uint256)` on the name wrapper.
pub const SELECTOR_WRAPPER_OWNER_OF: [u8; 4] = [0x63, 0x52, 0x21, 0x1e];

/// `available(uint256)` on the base registrar.
pub const SELECTOR_REGISTRAR_AVAILABLE: [u8; 4] = [0x96, 0xe4, 0x94, 0xe8];

/// `aggregate3((address,bool,bytes)[])` on Multicall3.
pub const SELECTOR_AGGREGATE3: [u8; 4] = [0x82, 0xad, 0x56, 0xcb];

/// A single sub-call within an `aggregate3` batch.
///
/// `allowFailure` is always encoded as `false`: a reverting sub-call
/// must fail the whole batch, never fall back per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call3 {
    /// Contract the sub-call targets.
    pub target: Address,
    /// ABI-encoded call data, selector included.
    pub call_data: Vec<u8>,
}

/// One decoded `aggregate3` sub-result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubResult {
    /// Whether the sub-call succeeded.
    pub success: bool,
    /// Raw return data of the sub-call.
    pub return_data: Vec<u8>,
}

fn push_word_usize(out: &mut Vec<u8>, value: usize) {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&(value as u64).to_be_bytes());
    out.extend_from_slice(&word);
}

/// Encodes a view call that takes a single 32-byte word argument.
pub fn encode_word_call(selector: [u8; 4], word: [u8; 32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(36);
    out.extend_from_slice(&selector);
    out.extend_from_slice(&word);
    out
}

/// Encodes an `aggregate3` batch into full call data.
pub fn encode_aggregate3(calls: &[Call3]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&SELECTOR_AGGREGATE3);

    // Single dynamic parameter: offset to the tuple array.
    push_word_usize(&mut out, 32);
    push_word_usize(&mut out, calls.len());

    let mut tails: Vec<Vec<u8>> = Vec::with_capacity(calls.len());
    for call in calls {
        let mut tail = Vec::new();

        let mut target = [0u8; 32];
        target[12..].copy_from_slice(call.target.as_bytes());
        tail.extend_from_slice(&target);

        // allowFailure = false
        push_word_usize(&mut tail, 0);
        // offset of the bytes field within the tuple
        push_word_usize(&mut tail, 96);
        push_word_usize(&mut tail, call.call_data.len());
        tail.extend_from_slice(&call.call_data);

        let pad = (32 - call.call_data.len() % 32) % 32;
        tail.resize(tail.len() + pad, 0);
        tails.push(tail);
    }

    // Element offsets are relative to the start of the element area.
    let mut offset = calls.len() * 32;
    for tail in &tails {
        push_word_usize(&mut out, offset);
        offset += tail.len();
    }
    for tail in tails {
        out.extend_from_slice(&tail);
    }
    out
}

struct WordReader<'a> {
    data: &'a [u8],
}

impl<'a> WordReader<'a> {
    fn word(&self, at: usize) -> Result<&'a [u8], AbiError> {
        self.data
            .get(at..at + 32)
            .ok_or(AbiError::Truncated(at))
    }

    fn usize_at(&self, at: usize) -> Result<usize, AbiError> {
        let word = self.word(at)?;
        if word[..24].iter().any(|&b| b != 0) {
            return Err(AbiError::OffsetOutOfRange(at));
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[24..]);
        let value = u64::from_be_bytes(buf);
        usize::try_from(value).map_err(|_| AbiError::OffsetOutOfRange(at))
    }

    fn bytes_at(&self, at: usize, len: usize) -> Result<&'a [u8], AbiError> {
        self.data
            .get(at..at.checked_add(len).ok_or(AbiError::OffsetOutOfRange(at))?)
            .ok_or(AbiError::Truncated(at))
    }
}

/// Decodes an `aggregate3` return payload into per-call results.
pub fn decode_aggregate3(data: &[u8]) -> Result<Vec<SubResult>, AbiError> {
    let reader = WordReader { data };

    let array_at = reader.usize_at(0)?;
    let len = reader.usize_at(array_at)?;
    let elements_at = array_at + 32;

    let mut results = Vec::with_capacity(len);
    for i in 0..len {
        let element_at = elements_at + reader.usize_at(elements_at + i * 32)?;

        let success = decode_bool(reader.word(element_at)?)?;
        let bytes_at = element_at + reader.usize_at(element_at + 32)?;
        let bytes_len = reader.usize_at(bytes_at)?;
        let return_data = reader.bytes_at(bytes_at + 32, bytes_len)?.to_vec();

        results.push(SubResult {
            success,
            return_data,
        });
    }
    Ok(results)
}

/// Decodes a 32-byte word as an address, rejecting dirty padding.
pub fn decode_address(data: &[u8]) -> Result<Address, AbiError> {
    if data.len() != 32 {
        return Err(AbiError::Truncated(data.len()));
    }
    if data[..12].iter().any(|&b| b != 0) {
        return Err(AbiError::InvalidPadding(0));
    }

    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&data[12..]);
    Ok(Address::new(bytes))
}

/// Decodes a 32-byte word as a strict boolean (zero or one only).
pub fn decode_bool(data: &[u8]) -> Result<bool, AbiError> {
    if data.len() != 32 {
        return Err(AbiError::Truncated(data.len()));
    }
    if data[..31].iter().any(|&b| b != 0) {
        return Err(AbiError::InvalidBool);
    }
    match data[31] {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(AbiError::InvalidBool),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::new(bytes)
    }

    fn word_usize(value: usize) -> Vec<u8> {
        let mut out = Vec::new();
        push_word_usize(&mut out, value);
        out
    }

    /// Builds an `aggregate3` return payload from (success, returnData) pairs.
    fn encode_aggregate3_response(items: &[(bool, &[u8])]) -> Vec<u8> {
        let mut out = word_usize(32);
        out.extend(word_usize(items.len()));

        let mut tails: Vec<Vec<u8>> = Vec::new();
        for (success, data) in items {
            let mut tail = word_usize(usize::from(*success));
            tail.extend(word_usize(64));
            tail.extend(word_usize(data.len()));
            tail.extend_from_slice(data);
            let pad = (32 - data.len() % 32) % 32;
            tail.resize(tail.len() + pad, 0);
            tails.push(tail);
        }

        let mut offset = items.len() * 32;
        for tail in &tails {
            out.extend(word_usize(offset));
            offset += tail.len();
        }
        for tail in tails {
            out.extend_from_slice(&tail);
        }
        out
    }

    #[test]
    fn word_call_layout() {
        let node = [0xabu8; 32];
        let data = encode_word_call(SELECTOR_REGISTRY_OWNER, node);
        assert_eq!(data.len(), 36);
        assert_eq!(&data[..4], &SELECTOR_REGISTRY_OWNER);
        assert_eq!(&data[4..], &node);
    }

    #[test]
    fn aggregate3_encode_two_calls() {
        let calls = vec![
            Call3 {
                target: addr(1),
                call_data: encode_word_call(SELECTOR_REGISTRY_OWNER, [0u8; 32]),
            },
            Call3 {
                target: addr(2),
                call_data: encode_word_call(SELECTOR_WRAPPER_OWNER_OF, [0u8; 32]),
            },
        ];
        let data = encode_aggregate3(&calls);

        assert_eq!(&data[..4], &SELECTOR_AGGREGATE3);
        let body = &data[4..];
        let reader = WordReader { data: body };
        assert_eq!(reader.usize_at(0).unwrap(), 32);
        assert_eq!(reader.usize_at(32).unwrap(), 2);

        // First tuple: two head words, then the tuple content.
        let first_at = 64 + reader.usize_at(64).unwrap();
        assert_eq!(decode_address(reader.word(first_at).unwrap()).unwrap(), addr(1));
        // allowFailure is always false
        assert_eq!(reader.usize_at(first_at + 32).unwrap(), 0);
        // call data length: selector + one word
        let bytes_at = first_at + reader.usize_at(first_at + 64).unwrap();
        assert_eq!(reader.usize_at(bytes_at).unwrap(), 36);
    }

    #[test]
    fn aggregate3_decode_roundtrip() {
        let owner_word = {
            let mut w = [0u8; 32];
            w[31] = 0x42;
            w
        };
        let response = encode_aggregate3_response(&[
            (true, &owner_word),
            (false, &[]),
        ]);

        let results = decode_aggregate3(&response).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].success);
        assert_eq!(decode_address(&results[0].return_data).unwrap(), addr(0x42));
        assert!(!results[1].success);
        assert!(results[1].return_data.is_empty());
    }

    #[test]
    fn decode_rejects_truncated_payload() {
        let response = encode_aggregate3_response(&[(true, &[0u8; 32])]);
        let cut = &response[..response.len() - 8];
        assert!(matches!(
            decode_aggregate3(cut),
            Err(AbiError::Truncated(_))
        ));
    }

    #[test]
    fn decode_bool_is_strict() {
        let mut word = [0u8; 32];
        assert_eq!(decode_bool(&word).unwrap(), false);
        word[31] = 1;
        assert_eq!(decode_bool(&word).unwrap(), true);
        word[31] = 2;
        assert_eq!(decode_bool(&word), Err(AbiError::InvalidBool));
        word[31] = 1;
        word[0] = 1;
        assert_eq!(decode_bool(&word), Err(AbiError::InvalidBool));
    }

    #[test]
    fn decode_address_rejects_dirty_padding() {
        let mut word = [0u8; 32];
        word[0] = 1;
        assert_eq!(decode_address(&word), Err(AbiError::InvalidPadding(0)));
    }
}
