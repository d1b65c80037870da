//! # Shared Crypto - Chain Cryptographic Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | double SHA-256 | Canonical content hashes |
//! | `ecdsa` | secp256k1 | Block producer and peer signatures |
//! | `verifier` | hash + sign + verify | Envelope binding content to a signer |
//! | `merkle` | binary Merkle tree | Transaction-set roots |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization
//! - **Signing over digests**: every signature covers a 32-byte canonical hash,
//!   never raw content

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;
pub mod merkle;
pub mod verifier;

// Re-exports
pub use ecdsa::{verify_hash, PrivateKey, PublicKey, Signature};
pub use errors::{CryptoError, VerifyError};
pub use hashing::{sha256, sha256d, MarshalHash};
pub use merkle::{merkle_root, MerkleTree};
pub use verifier::HashSignVerifier;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
