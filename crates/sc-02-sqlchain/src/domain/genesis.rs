//! # Genesis Blocks
//!
//! A genesis block has a zero parent hash and is accepted only from a
//! producer whose id is a valid proof-of-work identity: the id is registered in the key store with a
//! `(nonce, public key)` binding, the key signed the header, the id derives
//! from key and nonce, and the id reaches the minimum difficulty.

use super::block::Block;
use super::errors::{BlockError, GenesisBuildError, GenesisFailure};
use super::header::{Header, SignedHeader};
use sc_01_node_identity::{
    derive_node_id, mine_identity, CancelToken, InMemoryPublicKeyStore, PublicKeyStore,
};
use shared_crypto::PrivateKey;
use shared_types::{now, Timestamp, ZERO_HASH};
use std::fmt;
use std::sync::Arc;

/// Default minimum leading zero bits of a block producer id.
pub const DEFAULT_MIN_NODE_ID_DIFFICULTY: u32 = 4;

/// Collaborators needed to judge genesis blocks.
#[derive(Clone)]
pub struct ChainContext {
    pub key_store: Arc<dyn PublicKeyStore>,
    pub min_node_id_difficulty: u32,
}

impl ChainContext {
    /// Context over `key_store` requiring `min_node_id_difficulty` leading zero bits.
    pub fn new(key_store: Arc<dyn PublicKeyStore>, min_node_id_difficulty: u32) -> Self {
        Self {
            key_store,
            min_node_id_difficulty,
        }
    }

    /// Context backed by a fresh in-memory key store.
    pub fn in_memory(min_node_id_difficulty: u32) -> Self {
        Self::new(
            Arc::new(InMemoryPublicKeyStore::new()),
            min_node_id_difficulty,
        )
    }
}

impl fmt::Debug for ChainContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainContext")
            .field("min_node_id_difficulty", &self.min_node_id_difficulty)
            .finish_non_exhaustive()
    }
}

fn check_genesis_producer(header: &SignedHeader, ctx: &ChainContext) -> Result<(), GenesisFailure> {
    if header.parent_hash() != ZERO_HASH {
        return Err(GenesisFailure::NonZeroParent(header.parent_hash()));
    }
    let producer = header.producer();
    let record = ctx
        .key_store
        .get_public_key(&producer)
        .map_err(|e| GenesisFailure::KeyStore(e.to_string()))?
        .ok_or(GenesisFailure::UnknownProducer)?;

    if record.public_key != header.signee() {
        return Err(GenesisFailure::PublicKeyMismatch);
    }
    if derive_node_id(&record.public_key, &record.nonce) != producer {
        return Err(GenesisFailure::NonceMismatch);
    }

    let actual = producer.difficulty();
    if actual < ctx.min_node_id_difficulty {
        return Err(GenesisFailure::InsufficientDifficulty {
            actual,
            required: ctx.min_node_id_difficulty,
        });
    }
    Ok(())
}

fn verify_genesis_producer(header: &SignedHeader, ctx: &ChainContext) -> Result<(), BlockError> {
    check_genesis_producer(header, ctx).map_err(|reason| {
        tracing::warn!(
            "[sc-02] ✗ Genesis rejected: producer {} ({})",
            header.producer(),
            reason
        );
        BlockError::GenesisVerification {
            producer: header.producer(),
            reason,
        }
    })
}

impl SignedHeader {
    /// Producer identity checks, then ordinary header verification.
    pub fn verify_as_genesis(&self, ctx: &ChainContext) -> Result<(), BlockError> {
        verify_genesis_producer(self, ctx)?;
        self.verify()
    }
}

impl Block {
    /// Producer identity checks, then full block verification.
    pub fn verify_as_genesis(&self, ctx: &ChainContext) -> Result<(), BlockError> {
        verify_genesis_producer(&self.signed_header, ctx)?;
        self.verify()
    }
}

/// Builds a signed genesis block for a producer key.
///
/// Mines an identity nonce for the key, registers the binding in the
/// context's key store, and signs an empty block with `parent_hash =
/// ZERO_HASH`.
pub struct GenesisBuilder<'a> {
    signer: &'a PrivateKey,
    ctx: &'a ChainContext,
    timestamp: Option<Timestamp>,
    max_iterations: u64,
    cancel: CancelToken,
}

impl<'a> GenesisBuilder<'a> {
    /// Builder signing with `signer` and registering into `ctx`.
    pub fn new(signer: &'a PrivateKey, ctx: &'a ChainContext) -> Self {
        Self {
            signer,
            ctx,
            timestamp: None,
            max_iterations: u64::MAX,
            cancel: CancelToken::new(),
        }
    }

    /// Fixed timestamp (defaults to now).
    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Hash budget for the identity search.
    pub fn max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Token that aborts the identity search.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Mine the identity, register it and sign the genesis block.
    pub fn build(self) -> Result<Block, GenesisBuildError> {
        let public_key = self.signer.public_key();
        let identity = mine_identity(
            &public_key,
            self.ctx.min_node_id_difficulty,
            self.max_iterations,
            &self.cancel,
        )?;
        self.ctx
            .key_store
            .set_public_key(identity.hash, identity.nonce, public_key)?;

        let header = Header::new(
            identity.hash,
            ZERO_HASH,
            self.timestamp.unwrap_or_else(now),
        );
        let mut block = Block::new(header);
        block.pack_and_sign_block(self.signer)?;

        tracing::info!(
            "[sc-02] 🌱 Genesis built: hash 0x{} producer {} (difficulty {})",
            shared_types::short_hex(&block.block_hash()),
            identity.hash,
            identity.difficulty
        );
        Ok(block)
    }
}
