//! # Block Header
//!
//! `Header` is the signed part of a block. `SignedHeader` pairs it with the
//! envelope produced by the block producer; the block hash is the envelope's
//! data hash.

use super::errors::BlockError;
use serde::{Deserialize, Serialize};
use shared_crypto::{HashSignVerifier, MarshalHash, PrivateKey, PublicKey};
use shared_types::{AccountAddress, CodecError, Hash, Timestamp, ZERO_HASH};

/// Current header format version.
pub const HEADER_VERSION: i32 = 1;

/// Block header.
///
/// Field order is the canonical encoding order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Header {
    /// Format version
    pub version: i32,
    /// Producer identity
    pub producer: AccountAddress,
    /// Merkle root over acks then query transactions
    pub merkle_root: Hash,
    /// Hash of the previous block (`ZERO_HASH` for genesis)
    pub parent_hash: Hash,
    /// Production time
    pub timestamp: Timestamp,
}

impl Header {
    /// Header for a block extending `parent_hash`; the Merkle root is filled
    /// in when the block is packed.
    pub fn new(producer: AccountAddress, parent_hash: Hash, timestamp: Timestamp) -> Self {
        Self {
            version: HEADER_VERSION,
            producer,
            merkle_root: ZERO_HASH,
            parent_hash,
            timestamp,
        }
    }

    /// Canonical encoding; its double SHA-256 is the block hash.
    pub fn marshal_binary(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }

    /// Decode a header produced by `marshal_binary`.
    pub fn unmarshal_binary(bytes: &[u8]) -> Result<Self, CodecError> {
        shared_types::decode(bytes)
    }
}

impl MarshalHash for Header {
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
        self.marshal_binary()
    }
}

/// Header plus the producer's hash-sign-verify envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedHeader {
    pub header: Header,
    pub hsv: HashSignVerifier<Header>,
}

impl SignedHeader {
    /// Hash and sign `header`.
    pub fn sign(header: Header, signer: &PrivateKey) -> Result<Self, BlockError> {
        let hsv = HashSignVerifier::sign(&header, signer)?;
        Ok(Self { header, hsv })
    }

    /// Check the header hash, then the signature.
    pub fn verify(&self) -> Result<(), BlockError> {
        self.hsv.verify(&self.header).map_err(BlockError::from)
    }

    /// Block identity.
    pub fn block_hash(&self) -> Hash {
        self.hsv.data_hash
    }

    /// Hash of the previous block.
    pub fn parent_hash(&self) -> Hash {
        self.header.parent_hash
    }

    /// Producer identity.
    pub fn producer(&self) -> AccountAddress {
        self.header.producer
    }

    /// Merkle root committed by the header.
    pub fn merkle_root(&self) -> Hash {
        self.header.merkle_root
    }

    /// Production time.
    pub fn timestamp(&self) -> Timestamp {
        self.header.timestamp
    }

    /// Header format version.
    pub fn version(&self) -> i32 {
        self.header.version
    }

    /// Public key of the producer that signed the header.
    pub fn signee(&self) -> PublicKey {
        self.hsv.signee
    }

    /// Encoding of the header followed by its envelope.
    pub fn marshal_binary(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }

    /// Decode a signed header produced by `marshal_binary`.
    pub fn unmarshal_binary(bytes: &[u8]) -> Result<Self, CodecError> {
        shared_types::decode(bytes)
    }
}
