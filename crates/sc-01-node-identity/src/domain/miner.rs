//! # Proof-of-Work Nonce Search
//!
//! Searches nonces upward from `start` until `sha256d(data || nonce)` has at
//! least `target_difficulty` leading zero bits.
//!
//! The search is synchronous and bounded. Callers that need a background
//! search run it on their own thread or pool and stop it through a
//! [`CancelToken`].

use super::errors::MineError;
use super::node_id::{derive_node_id, NodeNonce};
use primitive_types::U256;
use shared_crypto::{hashing::sha256d_many, PublicKey};
use shared_types::NodeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The cancel flag is polled once per this many hashes.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Shared cancellation flag for a running search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Fresh, untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding a clone of this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A nonce that satisfied the requested difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceInfo {
    /// Winning nonce
    pub nonce: NodeNonce,
    /// `sha256d(data || nonce)`
    pub hash: NodeId,
    /// Leading zero bits of `hash` (at least the target)
    pub difficulty: u32,
}

/// Search for a nonce whose hash with `data` reaches `target_difficulty`.
pub fn compute_nonce(
    data: &[u8],
    target_difficulty: u32,
    start: U256,
    max_iterations: u64,
    cancel: &CancelToken,
) -> Result<NonceInfo, MineError> {
    tracing::debug!(
        "[sc-01] ⛏ Searching nonce: target={} start={} budget={}",
        target_difficulty,
        start,
        max_iterations
    );

    let mut nonce = start;
    for iteration in 0..max_iterations {
        if iteration % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
            tracing::info!("[sc-01] Nonce search cancelled after {} hashes", iteration);
            return Err(MineError::Cancelled {
                iterations: iteration,
            });
        }

        let candidate = NodeNonce::from(nonce);
        let hash = NodeId(sha256d_many(&[data, candidate.as_bytes().as_slice()]));
        let difficulty = hash.difficulty();
        if difficulty >= target_difficulty {
            tracing::info!(
                "[sc-01] ✓ Nonce found after {} hashes: difficulty {} (target {})",
                iteration + 1,
                difficulty,
                target_difficulty
            );
            return Ok(NonceInfo {
                nonce: candidate,
                hash,
                difficulty,
            });
        }

        nonce = nonce.overflowing_add(U256::one()).0;
    }

    tracing::warn!(
        "[sc-01] Nonce search exhausted: target={} iterations={}",
        target_difficulty,
        max_iterations
    );
    Err(MineError::Exhausted {
        target: target_difficulty,
        iterations: max_iterations,
    })
}

/// Mine a node identity for `public_key`.
///
/// The returned `hash` is the node id `derive_node_id(public_key, nonce)`.
pub fn mine_identity(
    public_key: &PublicKey,
    target_difficulty: u32,
    max_iterations: u64,
    cancel: &CancelToken,
) -> Result<NonceInfo, MineError> {
    let info = compute_nonce(
        public_key.as_bytes(),
        target_difficulty,
        U256::zero(),
        max_iterations,
        cancel,
    )?;
    debug_assert_eq!(info.hash, derive_node_id(public_key, &info.nonce));
    Ok(info)
}
