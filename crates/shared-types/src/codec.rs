//! # Canonical Codec
//!
//! The single binary encoding used for content hashing and persistence.
//!
//! ## Format
//!
//! - Fields in declaration order, no field names or tags
//! - Fixed-width big-endian integers
//! - Sequences and byte strings prefixed with a `u64` length
//! - Trailing bytes rejected on decode
//!
//! Encode → decode → re-encode is byte-identical, which is what makes
//! `canonical_hash` stable across nodes.

use crate::errors::CodecError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Upper bound on a single decoded value (64 MiB).
///
/// Garbage input with a huge length prefix fails instead of allocating.
pub const MAX_ENCODED_SIZE: u64 = 64 * 1024 * 1024;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_limit(MAX_ENCODED_SIZE)
        .with_big_endian()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Encode a value into its canonical byte form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    options()
        .serialize(value)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

/// Decode a value from its canonical byte form.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    options()
        .deserialize(bytes)
        .map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;
    use proptest::prelude::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        version: i32,
        id: NodeId,
        offset: u64,
        names: Vec<String>,
    }

    #[test]
    fn test_integers_are_big_endian_fixed_width() {
        let bytes = encode(&0x0102_0304u32).unwrap();
        assert_eq!(bytes, vec![0x01, 0x02, 0x03, 0x04]);

        let bytes = encode(&1u64).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_hash_arrays_have_no_length_prefix() {
        let bytes = encode(&NodeId([0xAA; 32])).unwrap();
        assert_eq!(bytes.len(), 32);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut bytes = encode(&7u64).unwrap();
        bytes.push(0);
        assert!(matches!(decode::<u64>(&bytes), Err(CodecError::Decode(_))));
    }

    #[test]
    fn test_truncated_input_rejected() {
        let bytes = encode(&7u64).unwrap();
        assert!(decode::<u64>(&bytes[..4]).is_err());
    }

    #[test]
    fn test_huge_length_prefix_rejected() {
        // Sequence length of u64::MAX followed by nothing.
        let bytes = vec![0xFF; 8];
        assert!(decode::<Vec<u8>>(&bytes).is_err());
    }

    proptest! {
        #[test]
        fn prop_reencode_is_byte_identical(
            version in any::<i32>(),
            id in any::<[u8; 32]>(),
            offset in any::<u64>(),
            names in proptest::collection::vec(".{0,12}", 0..4),
        ) {
            let value = Sample { version, id: NodeId(id), offset, names };
            let first = encode(&value).unwrap();
            let decoded: Sample = decode(&first).unwrap();
            prop_assert_eq!(&decoded, &value);
            prop_assert_eq!(encode(&decoded).unwrap(), first);
        }
    }
}
