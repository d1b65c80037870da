//! Crypto error types.

use shared_types::{short_hex, CodecError, Hash};
use thiserror::Error;

/// Key handling and signing errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Invalid public key
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid signature format
    #[error("Invalid signature format")]
    InvalidSignature,

    /// Signature verification failed
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Signing failed
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Content could not be canonically encoded
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Hash-sign-verify envelope failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// The envelope's data hash does not match the recomputed content hash.
    #[error("Hash mismatch: envelope {}, content {}", short_hex(.expected), short_hex(.actual))]
    HashMismatch {
        /// Hash carried by the envelope
        expected: Hash,
        /// Hash recomputed from the content
        actual: Hash,
    },

    /// The signature is malformed or does not verify under the signee key.
    #[error("Signature invalid for data hash {}", short_hex(.data_hash))]
    SignatureInvalid {
        /// Hash the signature was checked against
        data_hash: Hash,
    },

    /// Content could not be canonically encoded
    #[error(transparent)]
    Codec(#[from] CodecError),
}
