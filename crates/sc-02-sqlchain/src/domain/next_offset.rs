//! Next log offset derivation.

use super::block::Block;
use super::query::QueryType;

impl Block {
    /// Log offset following the last write in this block.
    ///
    /// The last `Write` transaction's response log offset plus the number of
    /// queries in its batch. `None` when the block carries no write.
    pub fn calc_next_id(&self) -> Option<u64> {
        self.query_txs
            .iter()
            .rev()
            .find(|tx| tx.request.query_type() == QueryType::Write)
            .map(|tx| {
                let queries = tx.request.payload.queries.len() as u64;
                tx.response.header.log_offset.saturating_add(queries)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{query_tx, unsigned_block};
    use shared_crypto::PrivateKey;
    use shared_types::ZERO_HASH;

    fn block_with(txs: &[(QueryType, u64, usize)]) -> Block {
        let key = PrivateKey::generate();
        let mut block = unsigned_block(&key, ZERO_HASH);
        for &(query_type, offset, queries) in txs {
            block.push_query_tx(query_tx(&key, query_type, offset, queries));
        }
        block
    }

    #[test]
    fn test_empty_block_has_no_next_id() {
        assert_eq!(Block::default().calc_next_id(), None);
        assert_eq!(block_with(&[]).calc_next_id(), None);
    }

    #[test]
    fn test_read_only_block_has_no_next_id() {
        let block = block_with(&[(QueryType::Read, 0, 10), (QueryType::Read, 5, 2)]);
        assert_eq!(block.calc_next_id(), None);
    }

    #[test]
    fn test_single_write() {
        let block = block_with(&[(QueryType::Write, 0, 10)]);
        assert_eq!(block.calc_next_id(), Some(10));
    }

    #[test]
    fn test_last_write_wins() {
        let block = block_with(&[
            (QueryType::Write, 0, 10),
            (QueryType::Read, 10, 10),
            (QueryType::Write, 20, 10),
            (QueryType::Read, 30, 10),
        ]);
        assert_eq!(block.calc_next_id(), Some(30));
    }

    #[test]
    fn test_mixed_reads_and_writes() {
        let block = block_with(&[
            (QueryType::Read, 0, 10),
            (QueryType::Write, 0, 10),
            (QueryType::Read, 0, 10),
            (QueryType::Write, 10, 20),
        ]);
        assert_eq!(block.calc_next_id(), Some(30));
    }

    #[test]
    fn test_offset_saturates() {
        let block = block_with(&[(QueryType::Write, u64::MAX - 1, 5)]);
        assert_eq!(block.calc_next_id(), Some(u64::MAX));
    }
}
