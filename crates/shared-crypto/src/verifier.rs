//! # Hash-Sign-Verify Envelope
//!
//! Binds a piece of content to a signer: the envelope stores the content's
//! canonical hash, the signer's public key and a signature over that hash.
//!
//! ```text
//! content ──marshal_hash──► bytes ──sha256d──► data_hash ──sign──► signature
//! ```
//!
//! Verification recomputes the hash first and only then checks the
//! signature, so a tampered body is always reported as a hash mismatch.

use crate::ecdsa::{PrivateKey, PublicKey, Signature};
use crate::errors::{CryptoError, VerifyError};
use crate::hashing::MarshalHash;
use serde::{Deserialize, Serialize};
use shared_types::{Hash, ZERO_HASH};
use std::fmt;
use std::marker::PhantomData;

/// Envelope over content of type `T`.
///
/// The type parameter only ties the envelope to what it signs; it carries no
/// data and is not serialized.
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct HashSignVerifier<T> {
    /// Canonical hash of the signed content
    pub data_hash: Hash,
    /// Public key of the signer
    pub signee: PublicKey,
    /// Signature over `data_hash`
    pub signature: Signature,
    #[serde(skip)]
    _content: PhantomData<fn() -> T>,
}

impl<T> HashSignVerifier<T> {
    /// Assemble an envelope from parts.
    pub fn from_parts(data_hash: Hash, signee: PublicKey, signature: Signature) -> Self {
        Self {
            data_hash,
            signee,
            signature,
            _content: PhantomData,
        }
    }

    /// The stored content hash.
    pub fn hash(&self) -> Hash {
        self.data_hash
    }

    /// Check the signature against the stored hash without recomputing it.
    pub fn verify_signature(&self) -> Result<(), VerifyError> {
        self.signee
            .verify_hash(&self.data_hash, &self.signature)
            .map_err(|_| VerifyError::SignatureInvalid {
                data_hash: self.data_hash,
            })
    }
}

impl<T: MarshalHash> HashSignVerifier<T> {
    /// Hash `content` and sign the hash with `signer`.
    pub fn sign(content: &T, signer: &PrivateKey) -> Result<Self, CryptoError> {
        let data_hash = content.canonical_hash()?;
        let signature = signer.sign_hash(&data_hash)?;
        Ok(Self::from_parts(data_hash, signer.public_key(), signature))
    }

    /// Recompute the hash of `content`, compare, then check the signature.
    pub fn verify(&self, content: &T) -> Result<(), VerifyError> {
        let actual = content.canonical_hash()?;
        if actual != self.data_hash {
            return Err(VerifyError::HashMismatch {
                expected: self.data_hash,
                actual,
            });
        }
        self.verify_signature()
    }
}

impl<T> Clone for HashSignVerifier<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HashSignVerifier<T> {}

impl<T> PartialEq for HashSignVerifier<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data_hash == other.data_hash
            && self.signee == other.signee
            && self.signature == other.signature
    }
}

impl<T> Eq for HashSignVerifier<T> {}

impl<T> Default for HashSignVerifier<T> {
    fn default() -> Self {
        Self::from_parts(ZERO_HASH, PublicKey::default(), Signature::default())
    }
}

impl<T> fmt::Debug for HashSignVerifier<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashSignVerifier")
            .field("data_hash", &hex::encode(self.data_hash))
            .field("signee", &self.signee)
            .field("signature", &self.signature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::CodecError;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        text: String,
    }

    impl MarshalHash for Note {
        fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
            shared_types::encode(&self.text)
        }
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_sign_then_verify() {
        let key = PrivateKey::generate();
        let content = note("SELECT 1");

        let hsv = HashSignVerifier::sign(&content, &key).unwrap();

        assert_eq!(hsv.hash(), content.canonical_hash().unwrap());
        assert_eq!(hsv.signee, key.public_key());
        assert!(hsv.verify(&content).is_ok());
    }

    #[test]
    fn test_modified_content_is_hash_mismatch() {
        let key = PrivateKey::generate();
        let hsv = HashSignVerifier::sign(&note("SELECT 1"), &key).unwrap();

        let err = hsv.verify(&note("SELECT 2")).unwrap_err();

        assert!(matches!(err, VerifyError::HashMismatch { .. }));
    }

    #[test]
    fn test_modified_hash_is_hash_mismatch() {
        let key = PrivateKey::generate();
        let content = note("SELECT 1");
        let mut hsv = HashSignVerifier::sign(&content, &key).unwrap();

        hsv.data_hash[0] ^= 0xFF;

        match hsv.verify(&content).unwrap_err() {
            VerifyError::HashMismatch { expected, actual } => {
                assert_eq!(expected, hsv.data_hash);
                assert_eq!(actual, content.canonical_hash().unwrap());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_foreign_signee_is_signature_invalid() {
        let key = PrivateKey::generate();
        let content = note("SELECT 1");
        let mut hsv = HashSignVerifier::sign(&content, &key).unwrap();

        hsv.signee = PrivateKey::generate().public_key();

        assert!(matches!(
            hsv.verify(&content).unwrap_err(),
            VerifyError::SignatureInvalid { .. }
        ));
    }

    #[test]
    fn test_default_envelope_never_verifies() {
        let hsv = HashSignVerifier::<Note>::default();
        assert!(hsv.verify_signature().is_err());
    }

    #[test]
    fn test_envelope_serde_roundtrip() {
        let key = PrivateKey::generate();
        let hsv = HashSignVerifier::sign(&note("INSERT"), &key).unwrap();

        let bytes = shared_types::encode(&hsv).unwrap();
        let decoded: HashSignVerifier<Note> = shared_types::decode(&bytes).unwrap();

        assert_eq!(decoded, hsv);
        assert!(decoded.verify(&note("INSERT")).is_ok());
    }
}
