//! Infrastructure adapters.

pub mod checksum;

pub use checksum::{seal, unseal, DefaultChecksumProvider};
