//! # SHA-256 Hashing
//!
//! Content hashing for the chain. Every block, header, acknowledgement and
//! query transaction is identified by the double SHA-256 of its canonical
//! binary encoding.

use sha2::{Digest, Sha256};
use shared_types::{CodecError, Hash};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Double SHA-256: `SHA256(SHA256(data))`.
pub fn sha256d(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Double SHA-256 over several inputs, as if concatenated.
pub fn sha256d_many(inputs: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for input in inputs {
        hasher.update(input);
    }
    let first = hasher.finalize();
    Sha256::digest(first).into()
}

/// Content with a deterministic binary encoding.
///
/// Two values that compare equal must produce identical bytes. The canonical
/// hash is the double SHA-256 of those bytes.
pub trait MarshalHash {
    /// Canonical encoding used for hashing.
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError>;

    /// Double SHA-256 of the canonical encoding.
    fn canonical_hash(&self) -> Result<Hash, CodecError> {
        Ok(sha256d(&self.marshal_hash()?))
    }
}
