//! # Domain Errors
//!
//! Error types for the SQL chain.
//!
//! ## Layers
//!
//! - `VerifyError` (envelope) feeds `BlockError` (block validity)
//! - `BlockError`, `KVStoreError` and `CheckpointDecodeError` feed `ChainError`
//! - No panics in domain logic (use Result instead)

use sc_01_node_identity::{KeyStoreError, MineError};
use shared_crypto::{CryptoError, VerifyError};
use shared_types::{short_hex, AccountAddress, CodecError, Hash};
use thiserror::Error;

/// Why a block was rejected as a genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisFailure {
    /// Genesis has a parent.
    #[error("parent hash {} is not zero", short_hex(.0))]
    NonZeroParent(Hash),

    /// The producer id has no registered key binding.
    #[error("producer is not registered in the key store")]
    UnknownProducer,

    /// The registered key differs from the header signee.
    #[error("registered public key differs from the header signee")]
    PublicKeyMismatch,

    /// The producer id does not derive from the registered key and nonce.
    #[error("producer id does not derive from the registered key and nonce")]
    NonceMismatch,

    /// The producer id is too easy.
    #[error("producer difficulty {actual} below required {required}")]
    InsufficientDifficulty {
        /// Leading zero bits of the producer id
        actual: u32,
        /// Minimum accepted
        required: u32,
    },

    /// The key store could not be queried.
    #[error("key store lookup failed: {0}")]
    KeyStore(String),
}

/// Block validity errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// Recomputed Merkle root differs from the header.
    #[error("Merkle root mismatch: header {}, computed {}", short_hex(.expected), short_hex(.actual))]
    MerkleRootVerification {
        /// Root stored in the header
        expected: Hash,
        /// Root recomputed from the transactions
        actual: Hash,
    },

    /// Recomputed header hash differs from the block hash.
    #[error("Block hash mismatch: stored {}, computed {}", short_hex(.expected), short_hex(.actual))]
    HashVerification {
        /// Hash stored in the envelope
        expected: Hash,
        /// Hash recomputed from the header
        actual: Hash,
    },

    /// Header signature does not verify.
    #[error("Header signature verification failed")]
    SignVerification(#[source] VerifyError),

    /// Genesis identity checks failed.
    #[error("Genesis verification failed for producer {producer}: {reason}")]
    GenesisVerification {
        /// Claimed producer
        producer: AccountAddress,
        /// First failed check
        reason: GenesisFailure,
    },

    /// Request declares a different number of queries than it carries.
    #[error("Request batch count {declared} but carries {actual} queries")]
    BatchCountMismatch {
        /// `batch_count` in the header
        declared: u64,
        /// Queries in the payload
        actual: u64,
    },

    /// Request header does not commit to its payload.
    #[error("Request queries hash does not match the payload")]
    QueriesHashMismatch,

    /// Response refers to a different request.
    #[error("Response does not answer the enclosed request")]
    ResponseRequestMismatch,

    /// Signing failed.
    #[error("Signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// Canonical encoding failed.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl From<VerifyError> for BlockError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::HashMismatch { expected, actual } => {
                BlockError::HashVerification { expected, actual }
            }
            VerifyError::Codec(e) => BlockError::Codec(e),
            other @ VerifyError::SignatureInvalid { .. } => BlockError::SignVerification(other),
        }
    }
}

/// Genesis construction errors.
#[derive(Debug, Error)]
pub enum GenesisBuildError {
    /// No identity nonce found.
    #[error(transparent)]
    Mine(#[from] MineError),

    /// Key registration failed.
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),

    /// Block signing failed.
    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Checkpoint decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointDecodeError {
    /// Wrong encoded length.
    #[error("checkpoint length {actual}, expected {expected}")]
    Length {
        /// Bytes supplied
        actual: usize,
        /// Bytes required
        expected: usize,
    },

    /// Magic prefix missing.
    #[error("checkpoint magic mismatch")]
    Magic,

    /// Unknown format version.
    #[error("unsupported checkpoint version {0}")]
    Version(u8),

    /// CRC32 mismatch.
    #[error("checkpoint checksum {actual:#010x}, expected {expected:#010x}")]
    Checksum {
        /// Checksum stored in the record
        expected: u32,
        /// Checksum of the decoded fields
        actual: u32,
    },
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Detail
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Detail
        message: String,
    },

    /// Store already closed.
    #[error("KV store is closed")]
    Closed,
}

/// Chain state machine errors.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Header does not extend the current head.
    #[error("Block does not extend head {}: parent {}", short_hex(.head), short_hex(.parent))]
    ForkOrOutOfOrder {
        /// Current head
        head: Hash,
        /// Parent named by the rejected header
        parent: Hash,
    },

    /// Persisted chain cannot be reconstructed.
    #[error("Chain corrupted: {reason}")]
    ChainCorrupted {
        /// What failed during replay
        reason: String,
    },

    /// Persisted checkpoint is undecodable.
    #[error("Checkpoint decode failed: {0}")]
    CheckpointDecode(#[from] CheckpointDecodeError),

    /// Store already holds a chain with another genesis.
    #[error("Store holds genesis {}, requested {}", short_hex(.existing), short_hex(.requested))]
    GenesisConflict {
        /// Genesis hash found in the store
        existing: Hash,
        /// Genesis hash supplied by the caller
        requested: Hash,
    },

    /// Block validity failure.
    #[error(transparent)]
    Block(#[from] BlockError),

    /// Durable store failure.
    #[error(transparent)]
    Storage(#[from] KVStoreError),

    /// No block at this height.
    #[error("No block at height {height}")]
    NotFound {
        /// Requested height
        height: u64,
    },
}

impl ChainError {
    pub(crate) fn corrupted(reason: impl Into<String>) -> Self {
        ChainError::ChainCorrupted {
            reason: reason.into(),
        }
    }
}
