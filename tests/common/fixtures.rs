//! Test fixtures: batch builders and shared proving systems.
//!
//! Batches are built by replaying insertions into a `SparseMerkleTree`, so
//! every generated proof is consistent with the tree state it was taken from.

#![allow(dead_code)]

use batch_insertion_prover::{
    api::{generate_witness, FieldElement, InsertionParameters, ProvingSystem},
    circuit::InsertionWitness,
    config, params, SparseMerkleTree,
};
use ff::Field;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Small shape used by the end-to-end tests.
pub const SMALL_DEPTH: u32 = 4;
pub const SMALL_BATCH: u32 = 2;

pub type F1 = FieldElement;

/// Deterministic RNG for test data.
pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(config::TEST_RANDOM_SEED)
}

/// A tree whose first `occupied` leaves hold random commitments.
pub fn prefilled_tree(depth: u32, occupied: u32) -> SparseMerkleTree {
    let mut rng = test_rng();
    let mut tree = SparseMerkleTree::new(depth as usize).expect("valid test depth");
    for index in 0..occupied {
        tree.update(u64::from(index), F1::random(&mut rng))
            .expect("index fits");
    }
    tree
}

/// Insert `commitments` at consecutive indices starting from `start_index`,
/// returning the batch (input hash filled in). The tree is advanced.
pub fn insert_into(
    tree: &mut SparseMerkleTree,
    start_index: u32,
    commitments: &[F1],
) -> InsertionParameters {
    let pre_root = tree.root();
    let merkle_proofs = commitments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            tree.update(u64::from(start_index) + i as u64, *c)
                .expect("index fits")
        })
        .collect();

    let mut params = InsertionParameters {
        input_hash: None,
        start_index,
        pre_root,
        post_root: tree.root(),
        identity_commitments: commitments.to_vec(),
        merkle_proofs,
    };
    params.input_hash = Some(params.compute_input_hash());
    params
}

/// Commitments `1..=count`.
pub fn sequential_commitments(count: u32) -> Vec<F1> {
    (1..=u64::from(count)).map(F1::from).collect()
}

/// A valid batch of `count` insertions at `start_index` into a tree whose
/// first `start_index` leaves are occupied.
pub fn valid_batch(depth: u32, start_index: u32, count: u32) -> InsertionParameters {
    let mut tree = prefilled_tree(depth, start_index);
    insert_into(&mut tree, start_index, &sequential_commitments(count))
}

/// A batch that inserts twice at index 0: both proofs come from the empty
/// tree, as if the second insertion did not see the first.
pub fn reused_index_batch(depth: u32) -> InsertionParameters {
    let mut first = SparseMerkleTree::new(depth as usize).expect("valid test depth");
    let pre_root = first.root();
    let c0 = F1::from(1u64);
    let c1 = F1::from(2u64);
    let proof0 = first.update(0, c0).expect("index fits");
    let proof1 = proof0.clone();

    let mut params = InsertionParameters {
        input_hash: None,
        start_index: 0,
        pre_root,
        post_root: batch_insertion_prover::compute_root(c1, 0, &proof1),
        identity_commitments: vec![c0, c1],
        merkle_proofs: vec![proof0, proof1],
    };
    params.input_hash = Some(params.compute_input_hash());
    params
}

/// Circuit witness and input hash for a valid batch.
pub fn witness_for(
    params: &InsertionParameters,
    depth: u32,
) -> (InsertionWitness<F1>, F1) {
    generate_witness(params, depth).expect("batch should be consistent")
}

/// Raw circuit witness for a batch, skipping the native consistency checks.
pub fn raw_witness(params: &InsertionParameters) -> InsertionWitness<F1> {
    InsertionWitness {
        start_index: u64::from(params.start_index),
        pre_root: params.pre_root,
        post_root: params.post_root,
        commitments: params.identity_commitments.clone(),
        merkle_proofs: params.merkle_proofs.clone(),
    }
}

/// Proving system for a shape, cached across tests in the same binary.
pub fn shared_system(depth: u32, batch: u32) -> ProvingSystem {
    params::load_or_setup(depth, batch).expect("setup should succeed")
}
