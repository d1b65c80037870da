//! # SQL Chain Core (sc-02)
//!
//! Append-only chain of signed blocks recording committed query batches.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Linear Chain | A block is accepted only if its parent is the current head |
//! | 2 | Verified Content | Merkle root, header hash and producer signature all check |
//! | 3 | Proven Genesis | The genesis producer is a registered proof-of-work identity |
//! | 4 | Atomic Commit | Header, index and checkpoint are written in one batch |
//! | 5 | Checkpoint Authority | Records above the checkpoint height are ignored on load |
//! | 6 | No Silent Reset | An unreadable chain fails with `ChainCorrupted` |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Block model, verification, genesis rules, checkpoint
//! - `ports/` - Outbound SPI (`KeyValueStore`, `ChecksumProvider`)
//! - `adapters/` - In-memory, file and RocksDB stores; CRC sealing
//! - `service/` - The `Chain` state machine
//!
//! ## Usage
//!
//! ```ignore
//! use sc_02_sqlchain::{Chain, ChainConfig, ChainContext, GenesisBuilder};
//!
//! let ctx = ChainContext::in_memory(4);
//! let genesis = GenesisBuilder::new(&key, &ctx).build()?;
//! let chain = Chain::new_chain(&ChainConfig::new("./data"), &genesis, &ctx)?;
//!
//! chain.push_block(&next.signed_header)?;
//! println!("{}", chain.state());
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

pub use adapters::infra::DefaultChecksumProvider;
pub use adapters::storage::{FileBackedKVStore, InMemoryKVStore};
#[cfg(feature = "rocksdb")]
pub use adapters::storage::{RocksDbConfig, RocksDbStore};
pub use domain::ack::{AckHeader, SignedAckHeader};
pub use domain::block::Block;
pub use domain::errors::{
    BlockError, ChainError, CheckpointDecodeError, GenesisBuildError, GenesisFailure,
    KVStoreError,
};
pub use domain::genesis::{ChainContext, GenesisBuilder, DEFAULT_MIN_NODE_ID_DIFFICULTY};
pub use domain::header::{Header, SignedHeader, HEADER_VERSION};
pub use domain::keys::KeyPrefix;
pub use domain::query::{
    ArgValue, NamedArg, Query, QueryAsTx, QueryType, Request, RequestHeader, RequestPayload,
    ResponseHeader, SignedRequestHeader, SignedResponseHeader,
};
pub use domain::state::State;
pub use ports::outbound::{BatchOperation, ChecksumProvider, KeyValueStore};
pub use service::{read_checkpoint, Chain, ChainConfig};
