use crate::domain::errors::KeyStoreError;
use crate::domain::node_id::NodeNonce;
use crate::ports::{NodeKeyRecord, PublicKeyStore};
use parking_lot::RwLock;
use shared_crypto::PublicKey;
use shared_types::NodeId;
use std::collections::HashMap;

/// In-process public key registry.
#[derive(Debug, Default)]
pub struct InMemoryPublicKeyStore {
    records: RwLock<HashMap<NodeId, NodeKeyRecord>>,
}

impl InMemoryPublicKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered ids.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl PublicKeyStore for InMemoryPublicKeyStore {
    fn get_public_key(&self, id: &NodeId) -> Result<Option<NodeKeyRecord>, KeyStoreError> {
        Ok(self.records.read().get(id).copied())
    }

    fn set_public_key(
        &self,
        id: NodeId,
        nonce: NodeNonce,
        public_key: PublicKey,
    ) -> Result<(), KeyStoreError> {
        if !self.is_id_pub_nonce_valid(&id, &nonce, &public_key) {
            tracing::warn!("[sc-01] Rejected key binding for {}: id mismatch", id);
            return Err(KeyStoreError::InvalidBinding { node_id: id });
        }

        let record = NodeKeyRecord { nonce, public_key };
        let mut records = self.records.write();
        match records.get(&id) {
            Some(existing) if *existing == record => Ok(()),
            Some(_) => {
                tracing::warn!("[sc-01] Rejected key binding for {}: already bound", id);
                Err(KeyStoreError::BindingConflict { node_id: id })
            }
            None => {
                records.insert(id, record);
                tracing::debug!(
                    "[sc-01] Registered key for node {}",
                    hex::encode(&id.0[..8])
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node_id::derive_node_id;
    use shared_crypto::PrivateKey;

    fn binding(n: u64) -> (NodeId, NodeNonce, PublicKey) {
        let pk = PrivateKey::generate().public_key();
        let nonce = NodeNonce::from(n);
        (derive_node_id(&pk, &nonce), nonce, pk)
    }

    #[test]
    fn test_set_and_get() {
        let store = InMemoryPublicKeyStore::new();
        let (id, nonce, pk) = binding(3);

        store.set_public_key(id, nonce, pk).unwrap();

        let record = store.get_public_key(&id).unwrap().unwrap();
        assert_eq!(record.nonce, nonce);
        assert_eq!(record.public_key, pk);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = InMemoryPublicKeyStore::new();
        assert!(store.get_public_key(&NodeId([9; 32])).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_non_derived_id() {
        let store = InMemoryPublicKeyStore::new();
        let (_, nonce, pk) = binding(1);
        let bogus = NodeId([7; 32]);

        assert_eq!(
            store.set_public_key(bogus, nonce, pk),
            Err(KeyStoreError::InvalidBinding { node_id: bogus })
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_same_binding_is_idempotent() {
        let store = InMemoryPublicKeyStore::new();
        let (id, nonce, pk) = binding(5);

        store.set_public_key(id, nonce, pk).unwrap();
        store.set_public_key(id, nonce, pk).unwrap();

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_conflicting_binding_is_rejected() {
        let store = InMemoryPublicKeyStore::new();
        let (id, nonce, pk) = binding(5);
        store.set_public_key(id, nonce, pk).unwrap();

        // Forge a conflicting record directly; a valid second binding for the
        // same id would need a hash collision.
        let forged = NodeKeyRecord {
            nonce: NodeNonce::from(6u64),
            public_key: pk,
        };
        store.records.write().insert(id, forged);

        assert_eq!(
            store.set_public_key(id, nonce, pk),
            Err(KeyStoreError::BindingConflict { node_id: id })
        );
    }
}
