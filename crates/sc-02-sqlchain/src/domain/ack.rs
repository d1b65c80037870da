//! Acknowledgements: a peer's signed receipt of a query response.

use super::errors::BlockError;
use serde::{Deserialize, Serialize};
use shared_crypto::{HashSignVerifier, MarshalHash, PrivateKey};
use shared_types::{CodecError, Hash, NodeId, Timestamp};

/// Acknowledged response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AckHeader {
    /// Hash of the acknowledged response header
    pub response_hash: Hash,
    /// Acknowledging node
    pub node_id: NodeId,
    pub timestamp: Timestamp,
}

impl MarshalHash for AckHeader {
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }
}

/// Ack header with its envelope. The Merkle leaf is the envelope hash.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedAckHeader {
    pub header: AckHeader,
    pub hsv: HashSignVerifier<AckHeader>,
}

impl SignedAckHeader {
    /// Hash and sign the acknowledgement header.
    pub fn sign(header: AckHeader, signer: &PrivateKey) -> Result<Self, BlockError> {
        let hsv = HashSignVerifier::sign(&header, signer)?;
        Ok(Self { header, hsv })
    }

    /// Check the header hash, then the signature.
    pub fn verify(&self) -> Result<(), BlockError> {
        self.hsv.verify(&self.header).map_err(BlockError::from)
    }

    /// Merkle leaf for this ack.
    pub fn leaf_hash(&self) -> Hash {
        self.hsv.data_hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_sign_verify() {
        let key = PrivateKey::generate();
        let ack = SignedAckHeader::sign(
            AckHeader {
                response_hash: [5; 32],
                node_id: NodeId([6; 32]),
                timestamp: 10,
            },
            &key,
        )
        .unwrap();

        assert!(ack.verify().is_ok());
        assert_eq!(ack.leaf_hash(), ack.header.canonical_hash().unwrap());
    }

    #[test]
    fn test_tampered_ack_fails() {
        let key = PrivateKey::generate();
        let mut ack = SignedAckHeader::sign(AckHeader::default(), &key).unwrap();

        ack.header.timestamp = 99;

        assert!(matches!(
            ack.verify(),
            Err(BlockError::HashVerification { .. })
        ));
    }
}
