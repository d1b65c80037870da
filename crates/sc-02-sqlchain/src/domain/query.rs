//! # Queries, Requests and Responses
//!
//! A client request carries a batch of queries under a signed header; the
//! serving node answers with a signed response header. A `QueryAsTx` packs
//! both into a chain transaction.

use super::errors::BlockError;
use serde::{Deserialize, Serialize};
use shared_crypto::{HashSignVerifier, MarshalHash, PrivateKey};
use shared_types::{CodecError, Hash, NodeId, Timestamp};

/// Whether a request reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum QueryType {
    #[default]
    Read,
    Write,
}

/// Bound query argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArgValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// Named query argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArg {
    pub name: String,
    pub value: ArgValue,
}

/// One SQL statement with its arguments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Query {
    pub pattern: String,
    pub args: Vec<NamedArg>,
}

impl Query {
    /// Statement without arguments.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            args: Vec::new(),
        }
    }
}

/// Query batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestPayload {
    pub queries: Vec<Query>,
}

impl MarshalHash for RequestPayload {
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }
}

/// Request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequestHeader {
    pub query_type: QueryType,
    /// Requesting node
    pub node_id: NodeId,
    pub database_id: String,
    pub connection_id: u64,
    pub seq_no: u64,
    pub timestamp: Timestamp,
    /// Number of queries in the payload
    pub batch_count: u64,
    /// Canonical hash of the payload
    pub queries_hash: Hash,
}

impl MarshalHash for RequestHeader {
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedRequestHeader {
    pub header: RequestHeader,
    pub hsv: HashSignVerifier<RequestHeader>,
}

/// Signed request with its query batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Request {
    pub header: SignedRequestHeader,
    pub payload: RequestPayload,
}

impl Request {
    /// Commit `header` to `payload` (batch count and queries hash) and sign.
    pub fn sign(
        mut header: RequestHeader,
        payload: RequestPayload,
        signer: &PrivateKey,
    ) -> Result<Self, BlockError> {
        header.batch_count = payload.queries.len() as u64;
        header.queries_hash = payload.canonical_hash()?;
        let hsv = HashSignVerifier::sign(&header, signer)?;
        Ok(Self {
            header: SignedRequestHeader { header, hsv },
            payload,
        })
    }

    /// Check the envelope and that the header commits to the payload.
    pub fn verify(&self) -> Result<(), BlockError> {
        self.header.hsv.verify(&self.header.header)?;

        let declared = self.header.header.batch_count;
        let actual = self.payload.queries.len() as u64;
        if declared != actual {
            return Err(BlockError::BatchCountMismatch { declared, actual });
        }
        if self.payload.canonical_hash()? != self.header.header.queries_hash {
            return Err(BlockError::QueriesHashMismatch);
        }
        Ok(())
    }

    /// Read or write, as declared by the request.
    pub fn query_type(&self) -> QueryType {
        self.header.header.query_type
    }

    /// Hash of the signed request header.
    pub fn request_hash(&self) -> Hash {
        self.header.hsv.data_hash
    }
}

/// Outcome of executing a request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Hash of the answered request header
    pub request_hash: Hash,
    /// Serving node
    pub node_id: NodeId,
    pub timestamp: Timestamp,
    pub row_count: u64,
    /// Log offset of the first query in the batch
    pub log_offset: u64,
    pub last_insert_id: i64,
    pub affected_rows: i64,
}

impl MarshalHash for ResponseHeader {
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SignedResponseHeader {
    pub header: ResponseHeader,
    pub hsv: HashSignVerifier<ResponseHeader>,
}

impl SignedResponseHeader {
    /// Hash and sign the response header.
    pub fn sign(header: ResponseHeader, signer: &PrivateKey) -> Result<Self, BlockError> {
        let hsv = HashSignVerifier::sign(&header, signer)?;
        Ok(Self { header, hsv })
    }

    /// Check the header hash, then the signature.
    pub fn verify(&self) -> Result<(), BlockError> {
        self.hsv.verify(&self.header).map_err(BlockError::from)
    }
}

/// A request and its response recorded as one chain transaction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryAsTx {
    pub request: Request,
    pub response: SignedResponseHeader,
}

impl QueryAsTx {
    /// Merkle leaf: canonical hash of the whole pair.
    pub fn leaf_hash(&self) -> Result<Hash, CodecError> {
        self.canonical_hash()
    }

    /// Check both envelopes and that the response answers the request.
    pub fn verify(&self) -> Result<(), BlockError> {
        self.request.verify()?;
        self.response.verify()?;
        if self.response.header.request_hash != self.request.request_hash() {
            return Err(BlockError::ResponseRequestMismatch);
        }
        Ok(())
    }
}

impl MarshalHash for QueryAsTx {
    fn marshal_hash(&self) -> Result<Vec<u8>, CodecError> {
        shared_types::encode(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(query_type: QueryType, queries: usize, key: &PrivateKey) -> Request {
        let payload = RequestPayload {
            queries: (0..queries)
                .map(|i| Query {
                    pattern: "INSERT INTO t VALUES (:v)".to_string(),
                    args: vec![NamedArg {
                        name: "v".to_string(),
                        value: ArgValue::Integer(i as i64),
                    }],
                })
                .collect(),
        };
        let header = RequestHeader {
            query_type,
            node_id: NodeId([1; 32]),
            database_id: "db".to_string(),
            connection_id: 1,
            seq_no: 7,
            timestamp: 100,
            ..Default::default()
        };
        Request::sign(header, payload, key).unwrap()
    }

    #[test]
    fn test_request_sign_sets_batch_count() {
        let key = PrivateKey::generate();
        let req = request(QueryType::Write, 3, &key);

        assert_eq!(req.header.header.batch_count, 3);
        assert!(req.verify().is_ok());
    }

    #[test]
    fn test_request_extra_query_rejected() {
        let key = PrivateKey::generate();
        let mut req = request(QueryType::Write, 2, &key);

        req.payload.queries.push(Query::new("DELETE FROM t"));

        assert_eq!(
            req.verify(),
            Err(BlockError::BatchCountMismatch {
                declared: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_request_swapped_query_rejected() {
        let key = PrivateKey::generate();
        let mut req = request(QueryType::Write, 2, &key);

        req.payload.queries[0] = Query::new("DROP TABLE t");

        assert_eq!(req.verify(), Err(BlockError::QueriesHashMismatch));
    }

    #[test]
    fn test_query_tx_verify() {
        let key = PrivateKey::generate();
        let req = request(QueryType::Read, 1, &key);
        let response = SignedResponseHeader::sign(
            ResponseHeader {
                request_hash: req.request_hash(),
                row_count: 4,
                ..Default::default()
            },
            &key,
        )
        .unwrap();
        let tx = QueryAsTx {
            request: req,
            response,
        };

        assert!(tx.verify().is_ok());
        assert_eq!(tx.leaf_hash().unwrap(), tx.canonical_hash().unwrap());
    }

    #[test]
    fn test_query_tx_response_for_other_request() {
        let key = PrivateKey::generate();
        let response =
            SignedResponseHeader::sign(ResponseHeader::default(), &key).unwrap();
        let tx = QueryAsTx {
            request: request(QueryType::Read, 1, &key),
            response,
        };

        assert_eq!(tx.verify(), Err(BlockError::ResponseRequestMismatch));
    }

    #[test]
    fn test_leaf_hash_covers_response() {
        let key = PrivateKey::generate();
        let mut tx = QueryAsTx {
            request: request(QueryType::Write, 1, &key),
            response: SignedResponseHeader::default(),
        };
        let before = tx.leaf_hash().unwrap();

        tx.response.header.log_offset = 1;

        assert_ne!(tx.leaf_hash().unwrap(), before);
    }
}
