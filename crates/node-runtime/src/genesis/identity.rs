//! # Node Identity File
//!
//! The node's signing key and proof-of-work nonce, persisted as JSON:
//!
//! ```json
//! { "node_id": "<64 hex>", "nonce": "<64 hex>", "private_key": "<64 hex>" }
//! ```
//!
//! The node id is re-derived on load; a file whose id does not match its key
//! and nonce is rejected.

use sc_01_node_identity::{derive_node_id, KeyStoreError, NodeNonce, PublicKeyStore};
use serde::{Deserialize, Serialize};
use shared_crypto::{CryptoError, PrivateKey, PublicKey};
use shared_types::NodeId;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identity file {path} already exists")]
    Exists { path: PathBuf },

    #[error("identity file is malformed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("identity field {field} is not 32 bytes of hex")]
    Hex { field: &'static str },

    #[error("identity key rejected: {0}")]
    Key(#[from] CryptoError),

    #[error("stored node id {stored} does not derive from key and nonce (got {derived})")]
    NodeIdMismatch { stored: NodeId, derived: NodeId },

    #[error("key store rejected identity: {0}")]
    KeyStore(#[from] KeyStoreError),
}

#[derive(Serialize, Deserialize)]
struct IdentityFile {
    node_id: String,
    nonce: String,
    private_key: String,
}

/// Signing key plus the nonce that makes its node id.
pub struct NodeIdentity {
    key: PrivateKey,
    nonce: NodeNonce,
    node_id: NodeId,
}

impl NodeIdentity {
    pub fn from_parts(key: PrivateKey, nonce: NodeNonce) -> Self {
        let node_id = derive_node_id(&key.public_key(), &nonce);
        Self {
            key,
            nonce,
            node_id,
        }
    }

    pub fn key(&self) -> &PrivateKey {
        &self.key
    }

    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    pub fn nonce(&self) -> NodeNonce {
        self.nonce
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Record the binding in `store`.
    pub fn register(&self, store: &dyn PublicKeyStore) -> Result<(), IdentityError> {
        store.set_public_key(self.node_id, self.nonce, self.public_key())?;
        Ok(())
    }

    /// Write to a new file. Never overwrites.
    pub fn save(&self, path: &Path) -> Result<(), IdentityError> {
        let io_err = |source| IdentityError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let file = IdentityFile {
            node_id: self.node_id.to_string(),
            nonce: hex::encode(self.nonce.as_bytes()),
            private_key: hex::encode(&*self.key.to_bytes()),
        };
        let body = Zeroizing::new(serde_json::to_vec_pretty(&file)?);
        let _secret = Zeroizing::new(file.private_key);

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut out = options.open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                IdentityError::Exists {
                    path: path.to_path_buf(),
                }
            } else {
                io_err(e)
            }
        })?;
        out.write_all(&body).map_err(io_err)?;
        out.sync_all().map_err(io_err)?;

        tracing::info!("Node identity {} saved to {}", self.node_id, path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, IdentityError> {
        let raw = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            IdentityError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?);
        let file: IdentityFile = serde_json::from_str(&raw)?;
        let private_key = Zeroizing::new(file.private_key);

        let key_bytes = Zeroizing::new(decode32("private_key", &private_key)?);
        let key = PrivateKey::from_bytes(&key_bytes)?;
        let nonce = NodeNonce(decode32("nonce", &file.nonce)?);
        let stored = NodeId(decode32("node_id", &file.node_id)?);

        let identity = Self::from_parts(key, nonce);
        if identity.node_id != stored {
            return Err(IdentityError::NodeIdMismatch {
                stored,
                derived: identity.node_id,
            });
        }
        Ok(identity)
    }
}

fn decode32(field: &'static str, value: &str) -> Result<[u8; 32], IdentityError> {
    hex::decode(value.trim())
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(IdentityError::Hex { field })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_01_node_identity::InMemoryPublicKeyStore;

    fn identity() -> NodeIdentity {
        NodeIdentity::from_parts(PrivateKey::generate(), NodeNonce::from(42u64))
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys").join("node_key.json");
        let original = identity();

        original.save(&path).unwrap();
        let loaded = NodeIdentity::load(&path).unwrap();

        assert_eq!(loaded.node_id(), original.node_id());
        assert_eq!(loaded.nonce(), original.nonce());
        assert_eq!(loaded.public_key(), original.public_key());
    }

    #[test]
    fn test_save_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_key.json");
        identity().save(&path).unwrap();

        assert!(matches!(
            identity().save(&path),
            Err(IdentityError::Exists { .. })
        ));
    }

    #[test]
    fn test_tampered_nonce_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_key.json");
        identity().save(&path).unwrap();

        let mut file: IdentityFile =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        file.nonce = hex::encode(NodeNonce::from(43u64).as_bytes());
        std::fs::write(&path, serde_json::to_vec(&file).unwrap()).unwrap();

        assert!(matches!(
            NodeIdentity::load(&path),
            Err(IdentityError::NodeIdMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_hex_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node_key.json");
        std::fs::write(
            &path,
            r#"{ "node_id": "00", "nonce": "00", "private_key": "zz" }"#,
        )
        .unwrap();

        assert!(matches!(
            NodeIdentity::load(&path),
            Err(IdentityError::Hex {
                field: "private_key"
            })
        ));
    }

    #[test]
    fn test_register_binds_key() {
        let store = InMemoryPublicKeyStore::new();
        let identity = identity();

        identity.register(&store).unwrap();
        let record = store.get_public_key(&identity.node_id()).unwrap().unwrap();
        assert_eq!(record.public_key, identity.public_key());
        assert_eq!(record.nonce, identity.nonce());
    }
}
