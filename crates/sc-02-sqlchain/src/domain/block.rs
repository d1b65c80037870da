//! # Block
//!
//! A signed header plus the transactions it commits to.
//!
//! ## Verification Order
//!
//! 1. Merkle root over `acks ++ query_txs` against the header
//! 2. Header hash against the block hash
//! 3. Producer signature over the block hash
//!
//! The first failure is returned.

use super::ack::SignedAckHeader;
use super::errors::BlockError;
use super::header::{Header, SignedHeader};
use super::query::QueryAsTx;
use serde::{Deserialize, Serialize};
use shared_crypto::{MerkleTree, PrivateKey};
use shared_types::{short_hex, CodecError, Hash};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    pub signed_header: SignedHeader,
    pub acks: Vec<SignedAckHeader>,
    pub query_txs: Vec<QueryAsTx>,
}

impl Block {
    /// Unsigned block with no transactions.
    pub fn new(header: Header) -> Self {
        Self {
            signed_header: SignedHeader {
                header,
                hsv: Default::default(),
            },
            acks: Vec::new(),
            query_txs: Vec::new(),
        }
    }

    /// Append an acknowledgement; the block must be re-packed afterwards.
    pub fn push_ack(&mut self, ack: SignedAckHeader) {
        self.acks.push(ack);
    }

    /// Append a query transaction; the block must be re-packed afterwards.
    pub fn push_query_tx(&mut self, tx: QueryAsTx) {
        self.query_txs.push(tx);
    }

    /// Merkle leaves: acks first, then query transactions, in order.
    pub fn leaves(&self) -> Result<Vec<Hash>, CodecError> {
        let mut leaves = Vec::with_capacity(self.acks.len() + self.query_txs.len());
        leaves.extend(self.acks.iter().map(SignedAckHeader::leaf_hash));
        for tx in &self.query_txs {
            leaves.push(tx.leaf_hash()?);
        }
        Ok(leaves)
    }

    /// Merkle root over the current leaves.
    pub fn compute_merkle_root(&self) -> Result<Hash, CodecError> {
        Ok(MerkleTree::root_of(&self.leaves()?))
    }

    /// Write the Merkle root into the header, then hash and sign it.
    pub fn pack_and_sign_block(&mut self, signer: &PrivateKey) -> Result<(), BlockError> {
        let mut header = self.signed_header.header.clone();
        header.merkle_root = self.compute_merkle_root()?;
        self.signed_header = SignedHeader::sign(header, signer)?;
        Ok(())
    }

    /// Merkle root, header hash, then signature.
    pub fn verify(&self) -> Result<(), BlockError> {
        let expected = self.signed_header.merkle_root();
        let actual = self.compute_merkle_root()?;
        if actual != expected {
            tracing::warn!(
                "[sc-02] ✗ Merkle root mismatch for block 0x{}: header 0x{}, computed 0x{}",
                short_hex(&self.block_hash()),
                short_hex(&expected),
                short_hex(&actual)
            );
            return Err(BlockError::MerkleRootVerification { expected, actual });
        }

        self.signed_header.verify().map_err(|e| {
            tracing::warn!(
                "[sc-02] ✗ Header verification failed for block 0x{}: {}",
                short_hex(&self.block_hash()),
                e
            );
            e
        })
    }

    /// Verify every enclosed ack and query transaction.
    pub fn verify_transactions(&self) -> Result<(), BlockError> {
        for ack in &self.acks {
            ack.verify()?;
        }
        for tx in &self.query_txs {
            tx.verify()?;
        }
        Ok(())
    }

    /// Hash of the signed header.
    pub fn block_hash(&self) -> Hash {
        self.signed_header.block_hash()
    }

    /// Hash of the previous block.
    pub fn parent_hash(&self) -> Hash {
        self.signed_header.parent_hash()
    }

    /// Canonical encoding of header, acks and query transactions.
    pub fn marshal_binary(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }

    /// Decode a block produced by `marshal_binary`.
    pub fn unmarshal_binary(bytes: &[u8]) -> Result<Self, CodecError> {
        shared_types::decode(bytes)
    }
}
