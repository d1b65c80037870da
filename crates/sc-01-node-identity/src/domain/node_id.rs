//! Node id derivation.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use shared_crypto::{hashing::sha256d_many, PublicKey};
use shared_types::NodeId;
use std::fmt;

/// 256-bit proof-of-work nonce, stored big-endian.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeNonce(pub [u8; 32]);

impl NodeNonce {
    /// Raw big-endian bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Numeric value.
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }
}

impl From<U256> for NodeNonce {
    fn from(value: U256) -> Self {
        let mut bytes = [0u8; 32];
        value.to_big_endian(&mut bytes);
        Self(bytes)
    }
}

impl From<u64> for NodeNonce {
    fn from(value: u64) -> Self {
        Self::from(U256::from(value))
    }
}

impl fmt::Debug for NodeNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeNonce({})", self.to_u256())
    }
}

/// `sha256d(compressed_pubkey || nonce)`.
pub fn derive_node_id(public_key: &PublicKey, nonce: &NodeNonce) -> NodeId {
    NodeId(sha256d_many(&[
        public_key.as_bytes().as_slice(),
        nonce.as_bytes().as_slice(),
    ]))
}

/// Whether `id` is the id derived from `public_key` and `nonce`.
pub fn is_id_pub_nonce_valid(id: &NodeId, nonce: &NodeNonce, public_key: &PublicKey) -> bool {
    derive_node_id(public_key, nonce) == *id
}
