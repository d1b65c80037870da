//! Persisted key layout.

use shared_types::Hash;

/// Key families in the chain store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPrefix {
    /// Sealed signed header: `hdr:{height BE}`
    Header,
    /// Height of a block: `idx:{hash}` -> height BE
    HashIndex,
    /// Sealed block body: `body:{hash}`
    Body,
    /// Chain metadata: `meta:{name}`
    Meta,
}

impl KeyPrefix {
    /// Raw prefix bytes.
    pub fn as_bytes(&self) -> &'static [u8] {
        match self {
            KeyPrefix::Header => b"hdr:",
            KeyPrefix::HashIndex => b"idx:",
            KeyPrefix::Body => b"body:",
            KeyPrefix::Meta => b"meta:",
        }
    }

    /// Prefix followed by `suffix`.
    pub fn key(&self, suffix: &[u8]) -> Vec<u8> {
        let mut key = self.as_bytes().to_vec();
        key.extend_from_slice(suffix);
        key
    }

    /// Header record at `height` (big-endian, so keys sort by height).
    pub fn header_key(height: u64) -> Vec<u8> {
        KeyPrefix::Header.key(&height.to_be_bytes())
    }

    /// Height lookup for a block hash.
    pub fn index_key(hash: &Hash) -> Vec<u8> {
        KeyPrefix::HashIndex.key(hash)
    }

    /// Full block body by hash.
    pub fn body_key(hash: &Hash) -> Vec<u8> {
        KeyPrefix::Body.key(hash)
    }

    /// The checkpoint record.
    pub fn state_key() -> Vec<u8> {
        KeyPrefix::Meta.key(b"state")
    }
}
