//! # Merkle Engine
//!
//! Binary Merkle tree over 32-byte leaves. Parents are the double SHA-256 of
//! `left || right`. A trailing node without a sibling is promoted to the next
//! level unchanged.
//!
//! ```text
//!        root
//!       /    \
//!     h01     c         (c promoted)
//!    /   \    |
//!   a     b   c
//! ```

use crate::hashing::sha256d_many;
use shared_types::{Hash, ZERO_HASH};

/// A fully built tree, leaves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build the tree over `leaves` in order.
    pub fn new(leaves: &[Hash]) -> Self {
        let mut levels = vec![leaves.to_vec()];
        while levels.last().map_or(0, Vec::len) > 1 {
            let current = &levels[levels.len() - 1];
            let next = current
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    _ => pair[0],
                })
                .collect();
            levels.push(next);
        }
        Self { levels }
    }

    /// Root over `leaves` without keeping the intermediate levels.
    pub fn root_of(leaves: &[Hash]) -> Hash {
        Self::new(leaves).root()
    }

    /// Root hash; `ZERO_HASH` for an empty tree.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(ZERO_HASH)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }
}

/// Shorthand for [`MerkleTree::root_of`].
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    MerkleTree::root_of(leaves)
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    sha256d_many(&[left.as_slice(), right.as_slice()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::sha256d;
    use proptest::prelude::*;

    fn leaf(n: u8) -> Hash {
        sha256d(&[n])
    }

    fn join(left: &Hash, right: &Hash) -> Hash {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(left);
        buf.extend_from_slice(right);
        sha256d(&buf)
    }

    #[test]
    fn test_empty_root_is_zero() {
        let tree = MerkleTree::new(&[]);
        assert_eq!(tree.root(), ZERO_HASH);
        assert_eq!(tree.leaf_count(), 0);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_single_leaf_is_root() {
        assert_eq!(merkle_root(&[leaf(1)]), leaf(1));
    }

    #[test]
    fn test_two_leaves() {
        assert_eq!(merkle_root(&[leaf(1), leaf(2)]), join(&leaf(1), &leaf(2)));
    }

    #[test]
    fn test_odd_leaf_is_promoted_unchanged() {
        let (a, b, c) = (leaf(1), leaf(2), leaf(3));
        let expected = join(&join(&a, &b), &c);

        let tree = MerkleTree::new(&[a, b, c]);

        assert_eq!(tree.root(), expected);
        assert_eq!(tree.depth(), 2);
        assert_ne!(MerkleTree::root_of(&[a, b, c]), MerkleTree::root_of(&[a, b, c, c]));
    }

    #[test]
    fn test_five_leaves_structure() {
        let l: Vec<Hash> = (0..5).map(leaf).collect();
        let left = join(&join(&l[0], &l[1]), &join(&l[2], &l[3]));
        let expected = join(&left, &l[4]);

        assert_eq!(merkle_root(&l), expected);
    }

    #[test]
    fn test_root_golden_vector() {
        let leaves: Vec<Hash> = (1..=5u8).map(|n| [n; 32]).collect();

        assert_eq!(
            hex::encode(merkle_root(&leaves)),
            "c0da3e026e4b3428038b6cc0c152f3756347e4e83ff8be563038d2b04d7a5227"
        );
    }

    #[test]
    fn test_order_matters() {
        assert_ne!(
            merkle_root(&[leaf(1), leaf(2)]),
            merkle_root(&[leaf(2), leaf(1)])
        );
    }

    #[test]
    fn test_appending_leaf_changes_root() {
        let base: Vec<Hash> = (0..4).map(leaf).collect();
        let mut extended = base.clone();
        extended.push(leaf(9));

        assert_ne!(merkle_root(&base), merkle_root(&extended));
    }

    proptest! {
        #[test]
        fn prop_changing_any_leaf_changes_root(
            seeds in proptest::collection::vec(any::<u8>(), 1..40),
            index in any::<prop::sample::Index>(),
        ) {
            let leaves: Vec<Hash> = seeds.iter().enumerate().map(|(i, s)| sha256d(&[i as u8, *s])).collect();
            let i = index.index(leaves.len());
            let mut tampered = leaves.clone();
            tampered[i][0] ^= 0x01;

            prop_assert_ne!(merkle_root(&leaves), merkle_root(&tampered));
        }

        #[test]
        fn prop_depth_is_ceil_log2(n in 1usize..70) {
            let leaves: Vec<Hash> = (0..n).map(|i| leaf(i as u8)).collect();
            let expected = (n as f64).log2().ceil() as usize;
            prop_assert_eq!(MerkleTree::new(&leaves).depth(), expected);
        }
    }
}
