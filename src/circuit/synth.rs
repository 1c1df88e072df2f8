//! Circuit synthesis logic for the batch insertion circuit.
//!
//! The only public value is the input hash carried in `z[0]`. Everything else
//! (start index, roots, commitments, siblings) is private and bound to it by
//! recomputing the hash in-circuit.

use ff::PrimeField;
use ff::PrimeFieldBits;
use generic_array::typenum::U2;
use nova_snark::frontend::{
    gadgets::{num::AllocatedNum, poseidon::PoseidonConstants},
    ConstraintSystem, SynthesisError,
};
#[cfg(debug_assertions)]
use tracing::debug;

use super::gadgets::{
    circuit_poseidon_constants, enforce_equal, insert_batch, poseidon_hash_tagged_gadget,
};
use super::witness::InsertionWitness;
use crate::config;
use crate::poseidon::domain_tags;

/// Main circuit synthesis function for the batch insertion circuit
pub fn synthesize_insertion_circuit<F: PrimeField + PrimeFieldBits, CS: ConstraintSystem<F>>(
    cs: &mut CS,
    z: &[AllocatedNum<F>],
    tree_depth: usize,
    batch_size: usize,
    witness: &InsertionWitness<F>,
) -> Result<Vec<AllocatedNum<F>>, SynthesisError> {
    if z.len() != config::CIRCUIT_ARITY || !witness.has_shape(tree_depth, batch_size) {
        return Err(SynthesisError::Unsatisfiable);
    }
    let input_hash_public = &z[0];

    #[cfg(debug_assertions)]
    {
        debug!("InsertionCircuit::synthesize() entry:");
        debug!("  - tree_depth: {}", tree_depth);
        debug!("  - batch_size: {}", batch_size);
        debug!("  - start_index: {}", witness.start_index);
        debug!("  - z[0] (input_hash): {:?}", input_hash_public.get_value());
    }

    let constants = circuit_poseidon_constants::<F>();

    // 1. Allocate the private values
    let start_index = AllocatedNum::alloc(cs.namespace(|| "start_index"), || {
        Ok(F::from(witness.start_index))
    })?;
    let pre_root = AllocatedNum::alloc(cs.namespace(|| "pre_root"), || Ok(witness.pre_root))?;
    let post_root = AllocatedNum::alloc(cs.namespace(|| "post_root"), || Ok(witness.post_root))?;

    let commitments = witness
        .commitments
        .iter()
        .enumerate()
        .map(|(i, c)| AllocatedNum::alloc(cs.namespace(|| format!("commitment_{}", i)), || Ok(*c)))
        .collect::<Result<Vec<_>, _>>()?;

    let proofs = witness
        .merkle_proofs
        .iter()
        .enumerate()
        .map(|(i, siblings)| {
            siblings
                .iter()
                .enumerate()
                .map(|(level, s)| {
                    AllocatedNum::alloc(
                        cs.namespace(|| format!("proof_{}_sibling_{}", i, level)),
                        || Ok(*s),
                    )
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    // 2. Bind the private values to the public input hash
    let input_hash = compute_input_hash_gadget(
        cs.namespace(|| "input_hash"),
        &constants,
        &start_index,
        &pre_root,
        &post_root,
        &commitments,
    )?;
    enforce_equal(
        cs.namespace(|| "input_hash_matches_public"),
        &input_hash,
        input_hash_public,
    );

    // 3. Chain the insertions from pre_root and pin the result to post_root
    let final_root = insert_batch(
        cs.namespace(|| "batch"),
        &constants,
        &pre_root,
        &start_index,
        &commitments,
        &proofs,
        tree_depth,
    )?;
    enforce_equal(
        cs.namespace(|| "final_root_matches_post_root"),
        &final_root,
        &post_root,
    );

    #[cfg(debug_assertions)]
    debug!("  - final_root: {:?}", final_root.get_value());

    // The step output is the unchanged input hash
    Ok(vec![input_hash_public.clone()])
}

/// In-circuit counterpart of `crate::poseidon::compute_input_hash`.
pub fn compute_input_hash_gadget<F: PrimeField + PrimeFieldBits, CS: ConstraintSystem<F>>(
    mut cs: CS,
    constants: &PoseidonConstants<F, U2>,
    start_index: &AllocatedNum<F>,
    pre_root: &AllocatedNum<F>,
    post_root: &AllocatedNum<F>,
    commitments: &[AllocatedNum<F>],
) -> Result<AllocatedNum<F>, SynthesisError> {
    let tag = domain_tags::input_hash::<F>();
    let mut acc = poseidon_hash_tagged_gadget(
        cs.namespace(|| "start_pre"),
        constants,
        tag,
        start_index,
        pre_root,
    )?;
    acc = poseidon_hash_tagged_gadget(cs.namespace(|| "post"), constants, tag, &acc, post_root)?;
    for (i, commitment) in commitments.iter().enumerate() {
        acc = poseidon_hash_tagged_gadget(
            cs.namespace(|| format!("commitment_{}", i)),
            constants,
            tag,
            &acc,
            commitment,
        )?;
    }
    Ok(acc)
}
