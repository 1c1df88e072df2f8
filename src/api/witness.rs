//! Witness generation logic.
//!
//! Replays the batch natively before any circuit is synthesized, so an
//! inconsistent batch fails with a precise message instead of an unsatisfiable
//! constraint system deep inside the backend.

use super::types::{FieldElement, InsertionParameters};
use crate::circuit::InsertionWitness;
use crate::merkle::compute_root;
use crate::utils::index_fits_depth;
use crate::{InsertionProverError, Result};
use ff::Field;
use tracing::{debug, debug_span, trace};

/// Builds the circuit witness for a shape-validated batch.
///
/// Checks, in order: every insertion's empty-leaf path matches the running root
/// (starting from `pre_root`), the final root equals `post_root`, and a supplied
/// input hash equals the recomputed one. Returns the witness together with the
/// input hash that becomes the circuit's public input.
pub fn generate_witness(
    params: &InsertionParameters,
    tree_depth: u32,
) -> Result<(InsertionWitness<FieldElement>, FieldElement)> {
    let _span = debug_span!(
        "generate_witness",
        tree_depth,
        batch_size = params.identity_commitments.len(),
        start_index = params.start_index
    )
    .entered();

    let start_index = u64::from(params.start_index);
    let mut current_root = params.pre_root;

    for (i, (commitment, siblings)) in params
        .identity_commitments
        .iter()
        .zip(&params.merkle_proofs)
        .enumerate()
    {
        let index = start_index + i as u64;
        if !index_fits_depth(index, tree_depth) {
            return Err(InsertionProverError::Witness(format!(
                "insertion {i}: index {index} does not fit in a depth-{tree_depth} tree"
            )));
        }

        if compute_root(FieldElement::ZERO, index, siblings) != current_root {
            return Err(InsertionProverError::Witness(format!(
                "insertion {i}: merkle proof for index {index} does not match the current root"
            )));
        }

        current_root = compute_root(*commitment, index, siblings);
        trace!("insertion {} at index {} applied", i, index);
    }

    if current_root != params.post_root {
        return Err(InsertionProverError::Witness(
            "post-root does not match the root after the last insertion".to_string(),
        ));
    }

    let input_hash = params.compute_input_hash();
    if let Some(expected) = params.input_hash {
        if expected != input_hash {
            return Err(InsertionProverError::Witness(
                "input hash does not match the batch".to_string(),
            ));
        }
    }
    debug!("witness generated, input hash {:?}", input_hash);

    let witness = InsertionWitness {
        start_index,
        pre_root: params.pre_root,
        post_root: params.post_root,
        commitments: params.identity_commitments.clone(),
        merkle_proofs: params.merkle_proofs.clone(),
    };

    Ok((witness, input_hash))
}
