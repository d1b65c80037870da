//! Domain layer for node identity.

pub mod errors;
pub mod miner;
pub mod node_id;
