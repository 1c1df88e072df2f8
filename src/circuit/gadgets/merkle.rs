//! Merkle path gadgets.
//!
//! `path_round` hashes one level; `verify_merkle_path` folds rounds from the
//! leaf to the root. Bit `j` of the leaf index drives level `j`.

use ff::PrimeField;
use ff::PrimeFieldBits;
use generic_array::typenum::U2;
use nova_snark::frontend::{
    gadgets::{boolean::Boolean, num::AllocatedNum, poseidon::PoseidonConstants},
    ConstraintSystem, SynthesisError,
};

use super::poseidon::poseidon_hash_tagged_gadget;
use super::select::ordered_pair;
use crate::poseidon::domain_tags;

/// One level of a Merkle path.
///
/// Returns `node(left, right)` with `(left, right) = direction ? (sibling, hash)
/// : (hash, sibling)`. `direction` must already be constrained boolean, which
/// holds for every `Boolean` built from an `AllocatedBit`.
pub fn path_round<F: PrimeField + PrimeFieldBits, CS: ConstraintSystem<F>>(
    mut cs: CS,
    constants: &PoseidonConstants<F, U2>,
    direction: &Boolean,
    hash: &AllocatedNum<F>,
    sibling: &AllocatedNum<F>,
) -> Result<AllocatedNum<F>, SynthesisError> {
    let (left, right) = ordered_pair(cs.namespace(|| "order"), direction, hash, sibling)?;
    poseidon_hash_tagged_gadget(
        cs.namespace(|| "hash_nodes"),
        constants,
        domain_tags::node(),
        &left,
        &right,
    )
}

/// Recomputes the root from `leaf`, leaf-first `siblings` and matching
/// leaf-first `path_bits`.
pub fn verify_merkle_path<F: PrimeField + PrimeFieldBits, CS: ConstraintSystem<F>>(
    mut cs: CS,
    constants: &PoseidonConstants<F, U2>,
    leaf: &AllocatedNum<F>,
    siblings: &[AllocatedNum<F>],
    path_bits: &[Boolean],
) -> Result<AllocatedNum<F>, SynthesisError> {
    if siblings.len() != path_bits.len() {
        return Err(SynthesisError::Unsatisfiable);
    }

    let mut current_hash = leaf.clone();
    for (level, (sibling, bit)) in siblings.iter().zip(path_bits).enumerate() {
        current_hash = path_round(
            cs.namespace(|| format!("level_{}", level)),
            constants,
            bit,
            &current_hash,
            sibling,
        )?;
    }

    Ok(current_hash)
}
