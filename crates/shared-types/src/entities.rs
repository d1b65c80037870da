//! # Core Domain Entities
//!
//! Primitive identity and content types shared by the chain subsystems.
//!
//! ## Clusters
//!
//! - **Content**: `Hash`, `ZERO_HASH`
//! - **Identity**: `NodeId`, `AccountAddress`
//! - **Time**: `Timestamp`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: CONTENT
// =============================================================================

/// A 32-byte content digest.
///
/// Used as block identity, parent pointer, Merkle leaf/root and transaction
/// identifier. Equality is byte-exact.
pub type Hash = [u8; 32];

/// The distinguished empty hash (genesis parent, empty Merkle root).
pub const ZERO_HASH: Hash = [0u8; 32];

/// Hex-encode the first 8 bytes of a hash for log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

// =============================================================================
// CLUSTER B: IDENTITY
// =============================================================================

/// Unique identifier for a node in the network.
///
/// A valid node id is the double SHA-256 of the node's compressed public key
/// followed by its proof-of-work nonce. The DHT and the chain share this
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub Hash);

/// The identity that produces blocks (alias for `NodeId` in chain contexts).
pub type AccountAddress = NodeId;

impl NodeId {
    /// Raw identity bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Proof-of-work difficulty of this id: the number of leading zero bits.
    pub fn difficulty(&self) -> u32 {
        let mut bits = 0;
        for byte in self.0 {
            if byte == 0 {
                bits += 8;
                continue;
            }
            bits += byte.leading_zeros();
            break;
        }
        bits
    }

    /// Parse a node id from its 64-character hex form.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let hash: Hash = bytes.try_into().ok()?;
        Some(Self(hash))
    }
}

impl From<Hash> for NodeId {
    fn from(hash: Hash) -> Self {
        Self(hash)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

// =============================================================================
// CLUSTER C: TIME
// =============================================================================

/// Nanoseconds since the Unix epoch.
pub type Timestamp = i64;

/// Current wall-clock time as a `Timestamp`.
pub fn now() -> Timestamp {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_counts_leading_zero_bits() {
        assert_eq!(NodeId([0xFF; 32]).difficulty(), 0);

        let mut id = [0xFF; 32];
        id[0] = 0x00;
        id[1] = 0x1F;
        assert_eq!(NodeId(id).difficulty(), 11);

        assert_eq!(NodeId(ZERO_HASH).difficulty(), 256);
    }

    #[test]
    fn test_node_id_hex_roundtrip() {
        let id = NodeId([0xAB; 32]);
        let parsed = NodeId::from_hex(&id.to_string()).unwrap();
        assert_eq!(parsed, id);

        assert!(NodeId::from_hex("abcd").is_none());
        assert!(NodeId::from_hex("not hex").is_none());
    }

    #[test]
    fn test_now_is_after_2020() {
        // 2020-01-01T00:00:00Z in nanoseconds
        assert!(now() > 1_577_836_800_000_000_000);
    }
}
