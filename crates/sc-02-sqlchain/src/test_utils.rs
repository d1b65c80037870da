//! Shared fixtures for unit tests.

use crate::domain::ack::{AckHeader, SignedAckHeader};
use crate::domain::block::Block;
use crate::domain::genesis::{ChainContext, GenesisBuilder};
use crate::domain::header::{Header, SignedHeader};
use crate::domain::query::{
    Query, QueryAsTx, QueryType, Request, RequestHeader, RequestPayload, ResponseHeader,
    SignedResponseHeader,
};
use shared_crypto::{sha256d, PrivateKey};
use shared_types::{now, Hash, NodeId};

/// Producer difficulty used by fixtures; cheap to mine.
pub const TEST_DIFFICULTY: u32 = 4;

/// Context, producer key and a verified genesis block.
pub fn genesis_fixture() -> (ChainContext, PrivateKey, Block) {
    let ctx = ChainContext::in_memory(TEST_DIFFICULTY);
    let key = PrivateKey::generate();
    let genesis = GenesisBuilder::new(&key, &ctx)
        .max_iterations(1 << 20)
        .build()
        .unwrap();
    (ctx, key, genesis)
}

/// Producer id for non-genesis fixtures.
pub fn producer_of(key: &PrivateKey) -> NodeId {
    NodeId(sha256d(key.public_key().as_bytes()))
}

pub fn unsigned_block(key: &PrivateKey, parent: Hash) -> Block {
    Block::new(Header::new(producer_of(key), parent, now()))
}

pub fn query_tx(key: &PrivateKey, query_type: QueryType, log_offset: u64, queries: usize) -> QueryAsTx {
    let payload = RequestPayload {
        queries: (0..queries)
            .map(|i| Query::new(format!("INSERT INTO t VALUES ({i})")))
            .collect(),
    };
    let header = RequestHeader {
        query_type,
        node_id: producer_of(key),
        database_id: "db".to_string(),
        timestamp: now(),
        ..Default::default()
    };
    let request = Request::sign(header, payload, key).unwrap();
    let response = SignedResponseHeader::sign(
        ResponseHeader {
            request_hash: request.request_hash(),
            node_id: producer_of(key),
            timestamp: now(),
            log_offset,
            ..Default::default()
        },
        key,
    )
    .unwrap();
    QueryAsTx { request, response }
}

/// Signed block extending `parent` with one ack and one write.
pub fn next_block(key: &PrivateKey, parent: Hash) -> Block {
    let mut block = unsigned_block(key, parent);
    block.push_ack(
        SignedAckHeader::sign(
            AckHeader {
                response_hash: parent,
                node_id: producer_of(key),
                timestamp: now(),
            },
            key,
        )
        .unwrap(),
    );
    block.push_query_tx(query_tx(key, QueryType::Write, 0, 2));
    block.pack_and_sign_block(key).unwrap();
    block
}

/// Signed header extending `parent`.
pub fn next_header(key: &PrivateKey, parent: Hash) -> SignedHeader {
    let mut block = unsigned_block(key, parent);
    block.pack_and_sign_block(key).unwrap();
    block.signed_header
}
