//! Port traits for the SQL chain.

pub mod outbound;

pub use outbound::{BatchOperation, ChecksumProvider, KeyValueStore, ScanResult};
