//! # Node Identity (sc-01)
//!
//! Cryptographic node identities shared by the chain and the DHT.
//!
//! A node id is `sha256d(compressed_pubkey || nonce)`. Its difficulty is the
//! number of leading zero bits, so an id with difficulty `d` costs roughly
//! `2^d` hash evaluations to produce.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Binding | A registered id always equals `derive_node_id(pubkey, nonce)` |
//! | 2 | Immutability | A registered binding is never replaced by a different one |
//! | 3 | Bounded Mining | The miner stops after `max_iterations` or on cancel |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Node id derivation, nonce mining, errors
//! - `ports/` - `PublicKeyStore` (key-management SPI)
//! - `adapters/` - In-memory key store

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryPublicKeyStore;
pub use domain::errors::{KeyStoreError, MineError};
pub use domain::miner::{compute_nonce, mine_identity, CancelToken, NonceInfo};
pub use domain::node_id::{derive_node_id, is_id_pub_nonce_valid, NodeNonce};
pub use ports::{NodeKeyRecord, PublicKeyStore};
