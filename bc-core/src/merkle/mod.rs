//! Merkle Tree Module
//!
//! Binary merkle tree over transaction ids, committed to by the block
//! header's `transactions_root`.
//!
//! - leaf: `SHA-256(0x00 || id)`
//! - node: `SHA-256(0x01 || left || right)`
//! - an odd node at the end of a level is promoted unchanged
//! - the empty tree has the all-zero root

use sha2::{Digest, Sha256};

use crate::canon::{MERKLE_LEAF_PREFIX, MERKLE_NODE_PREFIX};
use crate::types::{EntryId, Hash};

/// Root over `ids` in order
pub fn merkle_root(ids: &[EntryId]) -> Hash {
    let leaves: Vec<Hash> = ids.iter().map(hash_leaf).collect();
    build_tree(&leaves)
}

/// Transactions root committed to by a block header
pub fn transactions_root(tx_ids: &[EntryId]) -> Hash {
    merkle_root(tx_ids)
}

fn hash_leaf(id: &EntryId) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([MERKLE_LEAF_PREFIX]);
    hasher.update(id.as_bytes());
    Hash(hasher.finalize().into())
}

fn hash_node(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([MERKLE_NODE_PREFIX]);
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Hash(hasher.finalize().into())
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|chunk| match chunk {
            [left, right] => hash_node(left, right),
            // Odd number of nodes: promote the single node
            [single] => *single,
            _ => Hash::zero(),
        })
        .collect()
}

fn build_tree(leaves: &[Hash]) -> Hash {
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level.first().copied().unwrap_or_else(Hash::zero)
}

/// Merkle proof node
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofNode {
    /// Sibling digest
    pub digest: Hash,
    /// Is this sibling on the left?
    pub is_left: bool,
}

/// Inclusion proof for one id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub leaf_index: usize,
    pub path: Vec<ProofNode>,
    pub root: Hash,
}

impl MerkleProof {
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Whether `id` is committed to by `self.root`
    pub fn verify(&self, id: &EntryId) -> bool {
        let current = self.path.iter().fold(hash_leaf(id), |current, node| {
            if node.is_left {
                hash_node(&node.digest, &current)
            } else {
                hash_node(&current, &node.digest)
            }
        });
        current == self.root
    }
}

/// Proof that `ids[index]` is included in `merkle_root(ids)`
pub fn generate_proof(ids: &[EntryId], index: usize) -> Option<MerkleProof> {
    if index >= ids.len() {
        return None;
    }

    let mut path = Vec::new();
    let mut level: Vec<Hash> = ids.iter().map(hash_leaf).collect();
    let mut current = index;

    while level.len() > 1 {
        let sibling = current ^ 1;
        if let Some(digest) = level.get(sibling) {
            path.push(ProofNode {
                digest: *digest,
                is_left: current % 2 == 1,
            });
        }
        level = next_level(&level);
        current /= 2;
    }

    Some(MerkleProof {
        leaf_index: index,
        path,
        root: level[0],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u8) -> Vec<EntryId> {
        (0..n).map(|i| EntryId(Hash([i; 32]))).collect()
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(merkle_root(&[]), Hash::zero());
    }

    #[test]
    fn test_single_leaf() {
        let ids = ids(1);
        assert_eq!(merkle_root(&ids), hash_leaf(&ids[0]));
    }

    #[test]
    fn test_odd_node_promoted() {
        let ids = ids(3);
        let expected = hash_node(
            &hash_node(&hash_leaf(&ids[0]), &hash_leaf(&ids[1])),
            &hash_leaf(&ids[2]),
        );
        assert_eq!(merkle_root(&ids), expected);
    }

    #[test]
    fn test_order_matters() {
        let mut ids = ids(4);
        let root = merkle_root(&ids);
        ids.swap(0, 1);
        assert_ne!(merkle_root(&ids), root);
    }

    #[test]
    fn test_proofs_verify() {
        let ids = ids(5);
        let root = merkle_root(&ids);
        for i in 0..ids.len() {
            let proof = generate_proof(&ids, i).unwrap();
            assert_eq!(proof.root, root);
            assert!(proof.verify(&ids[i]));
            assert!(!proof.verify(&EntryId(Hash([0xff; 32]))));
        }
        assert!(generate_proof(&ids, 5).is_none());
    }
}
