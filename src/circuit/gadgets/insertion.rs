//! Batch insertion gadget: sequential single-leaf insertions with root chaining.

use ff::PrimeField;
use ff::PrimeFieldBits;
use generic_array::typenum::U2;
use nova_snark::frontend::{
    gadgets::{num::AllocatedNum, poseidon::PoseidonConstants},
    ConstraintSystem, SynthesisError,
};

use super::bits::decompose_index;
use super::merkle::verify_merkle_path;

/// Enforces `a == b`.
pub fn enforce_equal<F: PrimeField, CS: ConstraintSystem<F>>(
    mut cs: CS,
    a: &AllocatedNum<F>,
    b: &AllocatedNum<F>,
) {
    cs.enforce(
        || "equal",
        |lc| lc + a.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc + b.get_variable(),
    );
}

/// Allocates the empty leaf, pinned to zero.
fn alloc_empty_leaf<F: PrimeField, CS: ConstraintSystem<F>>(
    mut cs: CS,
) -> Result<AllocatedNum<F>, SynthesisError> {
    let zero = AllocatedNum::alloc(cs.namespace(|| "value"), || Ok(F::ZERO))?;
    cs.enforce(
        || "is_zero",
        |lc| lc + zero.get_variable(),
        |lc| lc + CS::one(),
        |lc| lc,
    );
    Ok(zero)
}

/// Verifies `commitments.len()` sequential insertions starting from `pre_root`
/// and returns the final root.
///
/// For insertion `i`, `index_i = start_index + i` is decomposed into
/// `tree_depth` bits. The empty leaf under `proofs[i]` must hash to the current
/// root; the commitment under the same siblings gives the next current root.
pub fn insert_batch<F: PrimeField + PrimeFieldBits, CS: ConstraintSystem<F>>(
    mut cs: CS,
    constants: &PoseidonConstants<F, U2>,
    pre_root: &AllocatedNum<F>,
    start_index: &AllocatedNum<F>,
    commitments: &[AllocatedNum<F>],
    proofs: &[Vec<AllocatedNum<F>>],
    tree_depth: usize,
) -> Result<AllocatedNum<F>, SynthesisError> {
    if commitments.len() != proofs.len() || proofs.iter().any(|p| p.len() != tree_depth) {
        return Err(SynthesisError::Unsatisfiable);
    }

    let empty_leaf = alloc_empty_leaf(cs.namespace(|| "empty_leaf"))?;
    let mut current_root = pre_root.clone();

    for (i, (commitment, siblings)) in commitments.iter().zip(proofs).enumerate() {
        let mut ins_cs = cs.namespace(|| format!("insertion_{}", i));
        let offset = F::from(i as u64);

        let index = AllocatedNum::alloc(ins_cs.namespace(|| "index"), || {
            start_index
                .get_value()
                .map(|start| start + offset)
                .ok_or(SynthesisError::AssignmentMissing)
        })?;
        ins_cs.enforce(
            || "index_is_start_plus_offset",
            |lc| lc + start_index.get_variable() + (offset, CS::one()),
            |lc| lc + CS::one(),
            |lc| lc + index.get_variable(),
        );

        let path_bits = decompose_index(ins_cs.namespace(|| "index_bits"), &index, tree_depth)?;

        let old_root = verify_merkle_path(
            ins_cs.namespace(|| "empty_path"),
            constants,
            &empty_leaf,
            siblings,
            &path_bits,
        )?;
        enforce_equal(
            ins_cs.namespace(|| "empty_path_matches_current_root"),
            &old_root,
            &current_root,
        );

        current_root = verify_merkle_path(
            ins_cs.namespace(|| "inserted_path"),
            constants,
            commitment,
            siblings,
            &path_bits,
        )?;
    }

    Ok(current_root)
}
