//! # Shared Types Crate
//!
//! Primitive types shared across the SQL-chain subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: hashes, node identities and timestamps are
//!   defined once here and reused by every crate.
//! - **Canonical Encoding**: `codec` is the only binary encoding used for
//!   hashing and persistence, so two semantically equal values always produce
//!   the same bytes.

pub mod codec;
pub mod entities;
pub mod errors;

pub use codec::{decode, encode};
pub use entities::*;
pub use errors::*;
