//! Shape validation for incoming batches.
//!
//! These checks run before any witness assignment or cryptographic work and use
//! only integer comparisons.

use super::types::InsertionParameters;
use crate::config::{MAX_BATCH_SIZE, MAX_TREE_DEPTH};
use crate::error::ShapeError;
use crate::utils::index_fits_depth;

/// Checks that a (tree depth, batch size) pair is supported.
pub fn validate_dimensions(tree_depth: u32, batch_size: u32) -> Result<(), ShapeError> {
    if tree_depth == 0 || tree_depth > MAX_TREE_DEPTH {
        return Err(ShapeError::InvalidTreeDepth { depth: tree_depth });
    }
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        return Err(ShapeError::InvalidBatchSize { size: batch_size });
    }
    Ok(())
}

/// Checks a batch against the compiled shape, failing on the first violation.
///
/// Order: commitment count, proof count, each proof's length, then that the
/// last insertion index `start_index + batch_size - 1` fits in `tree_depth` bits.
pub fn validate_shape(
    params: &InsertionParameters,
    tree_depth: u32,
    batch_size: u32,
) -> Result<(), ShapeError> {
    let expected_batch = batch_size as usize;
    let expected_depth = tree_depth as usize;

    if params.identity_commitments.len() != expected_batch {
        return Err(ShapeError::CommitmentCount {
            got: params.identity_commitments.len(),
            expected: expected_batch,
        });
    }

    if params.merkle_proofs.len() != expected_batch {
        return Err(ShapeError::ProofCount {
            got: params.merkle_proofs.len(),
            expected: expected_batch,
        });
    }

    for (index, proof) in params.merkle_proofs.iter().enumerate() {
        if proof.len() != expected_depth {
            return Err(ShapeError::ProofLength {
                index,
                got: proof.len(),
                expected: expected_depth,
            });
        }
    }

    let last_index = u64::from(params.start_index) + u64::from(batch_size.saturating_sub(1));
    if !index_fits_depth(last_index, tree_depth) {
        return Err(ShapeError::IndexOverflow {
            start_index: u64::from(params.start_index),
            batch_size,
            tree_depth,
        });
    }

    Ok(())
}
