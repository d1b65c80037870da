//! # Outbound Ports
//!
//! Key-management SPI consumed by genesis verification and peer admission.

use crate::domain::errors::KeyStoreError;
use crate::domain::node_id::{self, NodeNonce};
use shared_crypto::PublicKey;
use shared_types::NodeId;

/// A registered `(nonce, public key)` binding for a node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeKeyRecord {
    /// Proof-of-work nonce
    pub nonce: NodeNonce,
    /// Compressed public key
    pub public_key: PublicKey,
}

/// Registry of node public keys.
///
/// Shared across threads behind an `Arc`; implementations use interior
/// mutability.
pub trait PublicKeyStore: Send + Sync {
    /// Look up the binding for `id`.
    fn get_public_key(&self, id: &NodeId) -> Result<Option<NodeKeyRecord>, KeyStoreError>;

    /// Register `id → (nonce, public_key)`.
    ///
    /// Fails with `InvalidBinding` when the id does not derive from the key
    /// and nonce, and with `BindingConflict` when the id is already bound to
    /// something else. Re-registering the same binding succeeds.
    fn set_public_key(
        &self,
        id: NodeId,
        nonce: NodeNonce,
        public_key: PublicKey,
    ) -> Result<(), KeyStoreError>;

    /// Whether `id` derives from `public_key` and `nonce`.
    fn is_id_pub_nonce_valid(&self, id: &NodeId, nonce: &NodeNonce, public_key: &PublicKey) -> bool {
        node_id::is_id_pub_nonce_valid(id, nonce, public_key)
    }
}
