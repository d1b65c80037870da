//! Node identity error types.

use shared_types::NodeId;
use thiserror::Error;

/// Key-management failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    /// The id is not `sha256d(pubkey || nonce)`.
    #[error("Node id {node_id} does not derive from the supplied key and nonce")]
    InvalidBinding {
        /// Offending id
        node_id: NodeId,
    },

    /// The id is already bound to a different key or nonce.
    #[error("Node id {node_id} is already bound to a different key")]
    BindingConflict {
        /// Offending id
        node_id: NodeId,
    },

    /// Backend failure.
    #[error("Key store backend error: {message}")]
    Backend {
        /// Backend detail
        message: String,
    },
}

/// Proof-of-work search failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MineError {
    /// The cancel token was triggered.
    #[error("Mining cancelled after {iterations} iterations")]
    Cancelled {
        /// Hashes evaluated before stopping
        iterations: u64,
    },

    /// The iteration budget ran out before reaching the target.
    #[error("No nonce reached difficulty {target} within {iterations} iterations")]
    Exhausted {
        /// Requested difficulty
        target: u32,
        /// Hashes evaluated
        iterations: u64,
    },
}
