//! # Chain Checkpoint
//!
//! `{head, height}` persisted after every committed block.
//!
//! ## Encoding (49 bytes)
//!
//! ```text
//! ┌───────┬─────────┬──────────┬────────────┬──────────┐
//! │ magic │ version │   head   │   height   │  crc32   │
//! │ SQCP  │   u8    │ 32 bytes │   u64 BE   │  u32 BE  │
//! └───────┴─────────┴──────────┴────────────┴──────────┘
//! ```
//!
//! The CRC covers everything before it.

use super::errors::CheckpointDecodeError;
use shared_types::{short_hex, Hash, ZERO_HASH};
use std::fmt;

/// Leading bytes of an encoded checkpoint.
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"SQCP";
/// Checkpoint format version.
pub const CHECKPOINT_VERSION: u8 = 1;
/// Encoded checkpoint size: magic, version, head, height, CRC32.
pub const CHECKPOINT_LEN: usize = 4 + 1 + 32 + 8 + 4;

const BODY_LEN: usize = CHECKPOINT_LEN - 4;

/// Current head and height of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct State {
    pub head: Hash,
    pub height: u64,
}

impl State {
    /// Checkpoint at `height` with tip `head`.
    pub fn new(head: Hash, height: u64) -> Self {
        Self { head, height }
    }

    /// Fixed-size encoding with a trailing CRC32.
    pub fn marshal_binary(&self) -> [u8; CHECKPOINT_LEN] {
        let mut out = [0u8; CHECKPOINT_LEN];
        out[..4].copy_from_slice(&CHECKPOINT_MAGIC);
        out[4] = CHECKPOINT_VERSION;
        out[5..37].copy_from_slice(&self.head);
        out[37..45].copy_from_slice(&self.height.to_be_bytes());
        let crc = crc32fast::hash(&out[..BODY_LEN]);
        out[BODY_LEN..].copy_from_slice(&crc.to_be_bytes());
        out
    }

    /// Decode a checkpoint into a new value.
    pub fn decode(bytes: &[u8]) -> Result<Self, CheckpointDecodeError> {
        if bytes.len() != CHECKPOINT_LEN {
            return Err(CheckpointDecodeError::Length {
                actual: bytes.len(),
                expected: CHECKPOINT_LEN,
            });
        }
        if bytes[..4] != CHECKPOINT_MAGIC {
            return Err(CheckpointDecodeError::Magic);
        }
        if bytes[4] != CHECKPOINT_VERSION {
            return Err(CheckpointDecodeError::Version(bytes[4]));
        }

        let mut crc_bytes = [0u8; 4];
        crc_bytes.copy_from_slice(&bytes[BODY_LEN..]);
        let expected = u32::from_be_bytes(crc_bytes);
        let actual = crc32fast::hash(&bytes[..BODY_LEN]);
        if expected != actual {
            return Err(CheckpointDecodeError::Checksum { expected, actual });
        }

        let mut head = ZERO_HASH;
        head.copy_from_slice(&bytes[5..37]);
        let mut height = [0u8; 8];
        height.copy_from_slice(&bytes[37..45]);

        Ok(Self {
            head,
            height: u64::from_be_bytes(height),
        })
    }

    /// Decode into `self`; on failure `self` is left untouched.
    pub fn unmarshal_binary(&mut self, bytes: &[u8]) -> Result<(), CheckpointDecodeError> {
        *self = Self::decode(bytes)?;
        Ok(())
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "height {} head 0x{}", self.height, short_hex(&self.head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::RngCore;

    #[test]
    fn test_roundtrip() {
        let state = State::new([0xAB; 32], 50);
        let bytes = state.marshal_binary();

        assert_eq!(bytes.len(), 49);
        assert_eq!(&bytes[..4], b"SQCP");
        assert_eq!(State::decode(&bytes).unwrap(), state);
    }

    #[test]
    fn test_random_bytes_leave_receiver_unchanged() {
        let original = State::new([0x01; 32], 7);
        let mut rng = rand::thread_rng();

        for len in [0usize, 1, 48, 49, 50, 128] {
            let mut garbage = vec![0u8; len];
            rng.fill_bytes(&mut garbage);

            let mut state = original;
            assert!(state.unmarshal_binary(&garbage).is_err());
            assert_eq!(state, original);
        }
    }

    #[test]
    fn test_unmarshal_assigns_on_success() {
        let target = State::new([0x02; 32], 3);
        let mut state = State::new(ZERO_HASH, 0);

        state.unmarshal_binary(&target.marshal_binary()).unwrap();

        assert_eq!(state, target);
    }

    #[test]
    fn test_each_failure_mode() {
        let good = State::new([0x03; 32], 9).marshal_binary();

        assert!(matches!(
            State::decode(&good[..48]),
            Err(CheckpointDecodeError::Length { actual: 48, .. })
        ));

        let mut bad_magic = good;
        bad_magic[0] = b'X';
        assert_eq!(State::decode(&bad_magic), Err(CheckpointDecodeError::Magic));

        let mut bad_version = good;
        bad_version[4] = 9;
        assert_eq!(
            State::decode(&bad_version),
            Err(CheckpointDecodeError::Version(9))
        );

        let mut bad_height = good;
        bad_height[44] ^= 0xFF;
        assert!(matches!(
            State::decode(&bad_height),
            Err(CheckpointDecodeError::Checksum { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(head in any::<[u8; 32]>(), height in any::<u64>()) {
            let state = State::new(head, height);
            prop_assert_eq!(State::decode(&state.marshal_binary()).unwrap(), state);
        }

        #[test]
        fn prop_single_bit_flip_detected(height in any::<u64>(), bit in 0usize..(CHECKPOINT_LEN * 8)) {
            let mut bytes = State::new([0x5A; 32], height).marshal_binary();
            bytes[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(State::decode(&bytes).is_err());
        }
    }
}
