//! Circuit witness data structures and constructors.

use ff::PrimeField;

/// Private assignment for one batch of insertions.
///
/// The shape (`commitments.len()` and every `merkle_proofs[i].len()`) fixes the
/// circuit's constraint layout, so key generation synthesizes a blank witness
/// with the same shape as every real batch.
#[derive(Clone, Debug)]
pub struct InsertionWitness<F: PrimeField> {
    /// Index of the first inserted leaf
    pub start_index: u64,
    /// Root before the first insertion
    pub pre_root: F,
    /// Root after the last insertion
    pub post_root: F,
    /// Inserted leaves, in insertion order
    pub commitments: Vec<F>,
    /// Leaf-first siblings for each insertion
    pub merkle_proofs: Vec<Vec<F>>,
}

impl<F: PrimeField> InsertionWitness<F> {
    /// An all-zero witness of the given shape, used for parameter generation.
    pub fn blank(tree_depth: usize, batch_size: usize) -> Self {
        Self {
            start_index: 0,
            pre_root: F::ZERO,
            post_root: F::ZERO,
            commitments: vec![F::ZERO; batch_size],
            merkle_proofs: vec![vec![F::ZERO; tree_depth]; batch_size],
        }
    }

    /// Number of insertions in this witness
    pub fn batch_size(&self) -> usize {
        self.commitments.len()
    }

    /// Whether the witness has exactly the given shape
    pub fn has_shape(&self, tree_depth: usize, batch_size: usize) -> bool {
        self.commitments.len() == batch_size
            && self.merkle_proofs.len() == batch_size
            && self.merkle_proofs.iter().all(|p| p.len() == tree_depth)
    }
}
