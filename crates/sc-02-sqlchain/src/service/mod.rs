//! # Chain State Machine
//!
//! Owns the `{head, height}` checkpoint and the durable block records.
//!
//! ## Concurrency
//!
//! - Commits (`push_block`, `push_block_with_body`) serialize on one mutex
//!   around read-validate-write.
//! - `state()` loads the published `Arc<State>` without locking; a commit
//!   swaps in a new `Arc` only after its batch is durable.
//! - Bulk header verification runs on the rayon pool.
//!
//! ## Durability
//!
//! Header record, hash index and checkpoint of a block are written in one
//! atomic batch. Records above the checkpoint height are never read.

mod config;

pub use config::ChainConfig;

use crate::adapters::infra::{seal, unseal, DefaultChecksumProvider};
use crate::adapters::storage::{FileBackedKVStore, DATA_FILE};
use crate::domain::block::Block;
use crate::domain::errors::{BlockError, ChainError, KVStoreError};
use crate::domain::genesis::ChainContext;
use crate::domain::header::SignedHeader;
use crate::domain::keys::KeyPrefix;
use crate::domain::state::State;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rayon::prelude::*;
use shared_types::{short_hex, Hash, ZERO_HASH};
use std::sync::Arc;

struct ChainInner<KV> {
    store: KV,
    /// Block hash by height, `0..=state.height`
    index: Vec<Hash>,
}

/// A linear chain of signed blocks over a key-value store.
pub struct Chain<KV: KeyValueStore> {
    inner: Mutex<ChainInner<KV>>,
    state: ArcSwap<State>,
    checksum: DefaultChecksumProvider,
}

/// Read and decode the checkpoint, if any.
pub fn read_checkpoint<KV: KeyValueStore>(store: &KV) -> Result<Option<State>, ChainError> {
    match store.get(&KeyPrefix::state_key())? {
        Some(bytes) => Ok(Some(State::decode(&bytes)?)),
        None => Ok(None),
    }
}

impl Chain<FileBackedKVStore> {
    /// Create a chain in `config.data_dir`, or open the one already there if
    /// it has the same genesis.
    pub fn new_chain(
        config: &ChainConfig,
        genesis: &Block,
        ctx: &ChainContext,
    ) -> Result<Self, ChainError> {
        let store = FileBackedKVStore::open_with_sync(&config.data_dir, config.sync_writes)?;
        Self::new_chain_with_store(store, genesis, ctx)
    }

    /// Open the chain in `config.data_dir`.
    ///
    /// Fails with `ChainCorrupted` if there is no chain or it cannot be
    /// replayed. A missing data file is reported without creating anything.
    pub fn load_chain(config: &ChainConfig) -> Result<Self, ChainError> {
        let path = config.data_dir.join(DATA_FILE);
        if !path.is_file() {
            tracing::error!("[sc-02] ✗ No chain store at {}", path.display());
            return Err(ChainError::corrupted(format!(
                "no chain store at {}",
                path.display()
            )));
        }
        let store = FileBackedKVStore::open_with_sync(&config.data_dir, config.sync_writes)
            .map_err(|e| match e {
                KVStoreError::CorruptionError { message } => {
                    ChainError::corrupted(message)
                }
                other => ChainError::Storage(other),
            })?;
        let chain = Self::load_chain_with_store(store)?;
        if config.verify_on_load {
            chain.verify_all_headers()?;
        }
        Ok(chain)
    }
}

impl<KV: KeyValueStore> Chain<KV> {
    fn assemble(store: KV, index: Vec<Hash>, state: State) -> Self {
        Self {
            inner: Mutex::new(ChainInner { store, index }),
            state: ArcSwap::from_pointee(state),
            checksum: DefaultChecksumProvider,
        }
    }

    /// Initialize `store` with `genesis`.
    ///
    /// A store that already holds a chain is loaded instead when its genesis
    /// hash matches, and rejected with `GenesisConflict` otherwise.
    pub fn new_chain_with_store(
        mut store: KV,
        genesis: &Block,
        ctx: &ChainContext,
    ) -> Result<Self, ChainError> {
        let requested = genesis.block_hash();

        if read_checkpoint(&store)?.is_some() {
            let chain = Self::load_chain_with_store(store)?;
            let existing = chain.genesis_hash();
            if existing != requested {
                tracing::error!(
                    "[sc-02] ✗ Store already holds genesis 0x{}, refusing 0x{}",
                    short_hex(&existing),
                    short_hex(&requested)
                );
                return Err(ChainError::GenesisConflict {
                    existing,
                    requested,
                });
            }
            tracing::info!(
                "[sc-02] Existing chain with genesis 0x{} reopened at {}",
                short_hex(&existing),
                chain.state()
            );
            return Ok(chain);
        }

        genesis.verify_as_genesis(ctx)?;

        let state = State::new(requested, 0);
        let checksum = DefaultChecksumProvider;
        let ops = commit_ops(&checksum, &genesis.signed_header, Some(genesis), &state)?;
        store.atomic_batch_write(ops)?;

        tracing::info!(
            "[sc-02] ✓ Genesis #0 stored! Hash: 0x{}",
            short_hex(&requested)
        );
        Ok(Self::assemble(store, vec![requested], state))
    }

    /// Rebuild a chain from `store`.
    ///
    /// Replays headers `0..=height`: each must exist, pass its checksum,
    /// decode and link to its predecessor, and the last must be the
    /// checkpoint head.
    pub fn load_chain_with_store(store: KV) -> Result<Self, ChainError> {
        let state = match read_checkpoint(&store) {
            Ok(Some(state)) => state,
            Ok(None) => return Err(corrupted("checkpoint missing")),
            Err(ChainError::CheckpointDecode(e)) => {
                return Err(corrupted(format!("checkpoint undecodable: {e}")))
            }
            Err(e) => return Err(e),
        };

        let checksum = DefaultChecksumProvider;
        let capacity = usize::try_from(state.height).map_or(0, |h| h.saturating_add(1));
        let mut index: Vec<Hash> = Vec::with_capacity(capacity.min(1 << 20));
        for height in 0..=state.height {
            let header = read_header(&store, &checksum, height)?
                .ok_or_else(|| corrupted(format!("header #{height} missing")))?;

            let expected_parent = index.last().copied();
            if let Some(parent) = expected_parent {
                if header.parent_hash() != parent {
                    return Err(corrupted(format!(
                        "header #{height} does not link to 0x{}",
                        short_hex(&parent)
                    )));
                }
            }
            index.push(header.block_hash());
        }

        if index.last() != Some(&state.head) {
            return Err(corrupted(format!(
                "replayed head does not match checkpoint head 0x{}",
                short_hex(&state.head)
            )));
        }

        tracing::info!("[sc-02] 💾 Chain loaded: {}", state);
        Ok(Self::assemble(store, index, state))
    }

    /// Append a header extending the current head.
    pub fn push_block(&self, header: &SignedHeader) -> Result<State, ChainError> {
        self.commit(header, None)
    }

    /// Verify a full block, then append it with its body.
    pub fn push_block_with_body(&self, block: &Block) -> Result<State, ChainError> {
        self.commit(&block.signed_header, Some(block))
    }

    fn commit(&self, header: &SignedHeader, body: Option<&Block>) -> Result<State, ChainError> {
        let mut inner = self.inner.lock();
        let current = **self.state.load();

        if header.parent_hash() != current.head {
            tracing::warn!(
                "[sc-02] ✗ Rejected block 0x{}: parent 0x{} is not head 0x{}",
                short_hex(&header.block_hash()),
                short_hex(&header.parent_hash()),
                short_hex(&current.head)
            );
            return Err(ChainError::ForkOrOutOfOrder {
                head: current.head,
                parent: header.parent_hash(),
            });
        }

        match body {
            Some(block) => block.verify()?,
            None => header.verify().map_err(|e| {
                tracing::warn!(
                    "[sc-02] ✗ Rejected block 0x{}: {}",
                    short_hex(&header.block_hash()),
                    e
                );
                e
            })?,
        }

        let next = State::new(header.block_hash(), current.height + 1);
        let ops = commit_ops(&self.checksum, header, body, &next)?;
        inner.store.atomic_batch_write(ops)?;
        inner.index.push(next.head);
        self.state.store(Arc::new(next));

        tracing::info!(
            "[sc-02] ✓ Block #{} stored! Hash: 0x{}",
            next.height,
            short_hex(&next.head)
        );
        Ok(next)
    }

    /// Current checkpoint snapshot.
    pub fn state(&self) -> State {
        **self.state.load()
    }

    /// Shared handle to the current checkpoint.
    pub fn state_arc(&self) -> Arc<State> {
        self.state.load_full()
    }

    pub fn height(&self) -> u64 {
        self.state.load().height
    }

    pub fn head(&self) -> Hash {
        self.state.load().head
    }

    pub fn genesis_hash(&self) -> Hash {
        self.inner.lock().index.first().copied().unwrap_or(ZERO_HASH)
    }

    /// Block hashes in chain order, genesis first.
    pub fn block_hashes(&self) -> Vec<Hash> {
        self.inner.lock().index.clone()
    }

    /// Height of a committed block, from the persisted hash index.
    pub fn height_of(&self, hash: &Hash) -> Result<Option<u64>, ChainError> {
        let inner = self.inner.lock();
        let Some(record) = inner.store.get(&KeyPrefix::index_key(hash))? else {
            return Ok(None);
        };
        let bytes: [u8; 8] = record
            .as_slice()
            .try_into()
            .map_err(|_| corrupted(format!("index record for 0x{} malformed", short_hex(hash))))?;
        let height = u64::from_be_bytes(bytes);

        // Index entries above the checkpoint belong to uncommitted batches.
        let committed = usize::try_from(height)
            .ok()
            .and_then(|h| inner.index.get(h))
            .is_some_and(|h| h == hash);
        Ok(committed.then_some(height))
    }

    pub fn header_at(&self, height: u64) -> Result<SignedHeader, ChainError> {
        if height > self.height() {
            return Err(ChainError::NotFound { height });
        }
        let inner = self.inner.lock();
        read_header(&inner.store, &self.checksum, height)?
            .ok_or_else(|| corrupted(format!("header #{height} missing")))
    }

    /// Full block at `height`; `NotFound` if only its header was committed.
    pub fn block_at(&self, height: u64) -> Result<Block, ChainError> {
        let inner = self.inner.lock();
        let Some(hash) = usize::try_from(height)
            .ok()
            .and_then(|h| inner.index.get(h))
            .copied()
        else {
            return Err(ChainError::NotFound { height });
        };
        let Some(record) = inner.store.get(&KeyPrefix::body_key(&hash))? else {
            return Err(ChainError::NotFound { height });
        };
        let payload = unseal(&self.checksum, &record)
            .ok_or_else(|| corrupted(format!("body #{height} checksum mismatch")))?;
        Block::unmarshal_binary(payload)
            .map_err(|e| corrupted(format!("body #{height} undecodable: {e}")))
    }

    /// Verify every committed header signature in parallel.
    ///
    /// Returns the failure at the lowest height.
    pub fn verify_all_headers(&self) -> Result<(), ChainError> {
        let headers = {
            let inner = self.inner.lock();
            let mut headers = Vec::with_capacity(inner.index.len());
            for height in 0..inner.index.len() as u64 {
                let header = read_header(&inner.store, &self.checksum, height)?
                    .ok_or_else(|| corrupted(format!("header #{height} missing")))?;
                headers.push(header);
            }
            headers
        };

        let failure = headers
            .par_iter()
            .enumerate()
            .find_map_first(|(height, header)| header.verify().err().map(|e| (height, e)));

        match failure {
            Some((height, err)) => {
                tracing::error!(
                    "[sc-02] ✗ Header #{} (0x{}) failed verification: {}",
                    height,
                    short_hex(&headers[height].block_hash()),
                    err
                );
                Err(ChainError::Block(err))
            }
            None => {
                tracing::debug!("[sc-02] Verified {} headers", headers.len());
                Ok(())
            }
        }
    }

    /// Flush and release the store.
    pub fn close(self) -> Result<(), ChainError> {
        let state = **self.state.load();
        let mut inner = self.inner.into_inner();
        inner.store.close()?;
        tracing::info!("[sc-02] Chain closed at {}", state);
        Ok(())
    }
}

fn corrupted(reason: impl Into<String>) -> ChainError {
    let err = ChainError::corrupted(reason);
    tracing::error!("[sc-02] ✗ {}", err);
    err
}

fn read_header<KV: KeyValueStore>(
    store: &KV,
    checksum: &DefaultChecksumProvider,
    height: u64,
) -> Result<Option<SignedHeader>, ChainError> {
    let Some(record) = store.get(&KeyPrefix::header_key(height))? else {
        return Ok(None);
    };
    let payload = unseal(checksum, &record)
        .ok_or_else(|| corrupted(format!("header #{height} checksum mismatch")))?;
    SignedHeader::unmarshal_binary(payload)
        .map(Some)
        .map_err(|e| corrupted(format!("header #{height} undecodable: {e}")))
}

fn commit_ops(
    checksum: &DefaultChecksumProvider,
    header: &SignedHeader,
    body: Option<&Block>,
    state: &State,
) -> Result<Vec<BatchOperation>, BlockError> {
    let hash = header.block_hash();
    let mut ops = vec![
        BatchOperation::put(
            KeyPrefix::header_key(state.height),
            seal(checksum, &header.marshal_binary()?),
        ),
        BatchOperation::put(KeyPrefix::index_key(&hash), state.height.to_be_bytes().to_vec()),
    ];
    if let Some(block) = body {
        ops.push(BatchOperation::put(
            KeyPrefix::body_key(&hash),
            seal(checksum, &block.marshal_binary()?),
        ));
    }
    ops.push(BatchOperation::put(
        KeyPrefix::state_key(),
        state.marshal_binary().to_vec(),
    ));
    Ok(ops)
}
