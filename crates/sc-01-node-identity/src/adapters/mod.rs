//! Key store adapters.

mod memory;

pub use memory::InMemoryPublicKeyStore;
