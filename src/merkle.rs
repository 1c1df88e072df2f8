//! Sparse Merkle tree implementation for identity-commitment insertions.
//!
//! This module provides the native counterpart of the circuit's path gadgets:
//! recomputing a root from a leaf, its index and the leaf-first sibling list
//! (`compute_root`), and a fixed-depth sparse tree (`SparseMerkleTree`) that
//! stores only non-empty nodes and hands out the siblings of each insertion.

use ff::Field;
use std::collections::HashMap;

use crate::poseidon::hash_node;
use crate::{FieldElement, InsertionProverError, Result};

/// Recomputes the root from a leaf at `index` and its siblings (leaf-first).
///
/// Bit `j` of `index` decides the order at level `j`: a set bit puts the
/// current node on the right.
pub fn compute_root(leaf: FieldElement, index: u64, siblings: &[FieldElement]) -> FieldElement {
    let mut current_hash = leaf;
    for (level, sibling) in siblings.iter().enumerate() {
        let is_right_node = (index >> level) & 1 == 1;
        current_hash = if is_right_node {
            hash_node(*sibling, current_hash)
        } else {
            hash_node(current_hash, *sibling)
        };
    }
    current_hash
}

/// Verifies a Merkle path against a given root.
/// This is a non-circuit implementation for direct verification.
pub fn verify_merkle_proof(
    root: FieldElement,
    leaf: FieldElement,
    index: u64,
    siblings: &[FieldElement],
) -> bool {
    compute_root(leaf, index, siblings) == root
}

/// Hashes of empty subtrees: `zeros[0]` is the empty leaf, `zeros[l + 1]` is
/// `node(zeros[l], zeros[l])`. The returned vector has `depth + 1` entries.
pub fn empty_subtree_hashes(depth: usize) -> Vec<FieldElement> {
    let mut zeros = Vec::with_capacity(depth + 1);
    zeros.push(FieldElement::ZERO);
    for level in 0..depth {
        let below = zeros[level];
        zeros.push(hash_node(below, below));
    }
    zeros
}

/// Root of a tree of the given depth where every leaf is zero.
pub fn empty_root(depth: usize) -> FieldElement {
    empty_subtree_hashes(depth)[depth]
}

/// A fixed-depth sparse Merkle tree with all leaves initially zero.
///
/// Only nodes that differ from the empty-subtree hash are stored, keyed by
/// `(level, position)` with level 0 being the leaves.
#[derive(Debug, Clone)]
pub struct SparseMerkleTree {
    depth: usize,
    zeros: Vec<FieldElement>,
    nodes: HashMap<(usize, u64), FieldElement>,
}

impl SparseMerkleTree {
    /// Creates an empty tree. Fails if `depth` exceeds 64 levels, the width of a leaf index.
    pub fn new(depth: usize) -> Result<Self> {
        if depth > 64 {
            return Err(InsertionProverError::Witness(format!(
                "sparse tree depth {depth} exceeds the 64-bit index space"
            )));
        }
        Ok(Self {
            depth,
            zeros: empty_subtree_hashes(depth),
            nodes: HashMap::new(),
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of leaf positions, saturating at `u64::MAX` for depth 64.
    pub fn capacity(&self) -> u64 {
        1u64.checked_shl(self.depth as u32).unwrap_or(u64::MAX)
    }

    fn node(&self, level: usize, position: u64) -> FieldElement {
        self.nodes
            .get(&(level, position))
            .copied()
            .unwrap_or(self.zeros[level])
    }

    /// Returns the current root of the tree.
    pub fn root(&self) -> FieldElement {
        self.node(self.depth, 0)
    }

    /// Returns the leaf-first sibling list for `index`.
    pub fn proof(&self, index: u64) -> Result<Vec<FieldElement>> {
        self.check_index(index)?;
        Ok((0..self.depth)
            .map(|level| self.node(level, (index >> level) ^ 1))
            .collect())
    }

    /// Writes `leaf` at `index` and returns the siblings of that path.
    ///
    /// The siblings are unaffected by the write, so they prove both the old leaf
    /// under the previous root and the new leaf under the new root.
    pub fn update(&mut self, index: u64, leaf: FieldElement) -> Result<Vec<FieldElement>> {
        let siblings = self.proof(index)?;

        let mut current_hash = leaf;
        let mut position = index;
        self.set_node(0, position, current_hash);
        for (level, sibling) in siblings.iter().enumerate() {
            current_hash = if position & 1 == 1 {
                hash_node(*sibling, current_hash)
            } else {
                hash_node(current_hash, *sibling)
            };
            position >>= 1;
            self.set_node(level + 1, position, current_hash);
        }

        Ok(siblings)
    }

    fn set_node(&mut self, level: usize, position: u64, value: FieldElement) {
        if value == self.zeros[level] {
            self.nodes.remove(&(level, position));
        } else {
            self.nodes.insert((level, position), value);
        }
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if self.depth < 64 && index >= self.capacity() {
            return Err(InsertionProverError::Witness(format!(
                "leaf index {index} out of range for tree depth {}",
                self.depth
            )));
        }
        Ok(())
    }
}
