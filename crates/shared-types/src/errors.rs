//! # Error Types
//!
//! Errors shared by every crate that touches the canonical codec.

use thiserror::Error;

/// Canonical encoding and decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The value could not be encoded.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// The input bytes are not a valid canonical encoding.
    #[error("Decoding failed: {0}")]
    Decode(String),
}
