//! End-to-end prove/verify tests on small trees.

use batch_insertion_prover::api::Proof;
use batch_insertion_prover::{InsertionProverError, ShapeError, SparseMerkleTree};

mod common;
use common::fixtures::{insert_into, sequential_commitments, F1};
use common::{shared_system, valid_batch, SMALL_BATCH, SMALL_DEPTH};
use ff::Field;

#[test]
fn test_prove_and_verify_fresh_tree() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let params = valid_batch(SMALL_DEPTH, 0, SMALL_BATCH);

    let proof = system.prove(&params).expect("proving should succeed");
    assert_eq!(proof.tree_depth, SMALL_DEPTH);
    assert_eq!(proof.batch_size, SMALL_BATCH);

    system
        .verify(params.compute_input_hash(), &proof)
        .expect("proof should verify");
}

#[test]
fn test_consecutive_batches_chain() {
    // Two batches against one evolving tree; the second starts where the first ended
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let mut tree = SparseMerkleTree::new(SMALL_DEPTH as usize).unwrap();

    let first = insert_into(&mut tree, 0, &sequential_commitments(SMALL_BATCH));
    let second = insert_into(&mut tree, SMALL_BATCH, &[F1::from(77u64), F1::from(78u64)]);
    assert_eq!(second.pre_root, first.post_root);

    for params in [&first, &second] {
        let proof = system.prove(params).expect("proving should succeed");
        system
            .verify(params.compute_input_hash(), &proof)
            .expect("proof should verify");
    }
}

#[test]
fn test_prove_at_last_leaves() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    // Indices 14 and 15: the last two leaves of a depth-4 tree
    let params = valid_batch(SMALL_DEPTH, 14, SMALL_BATCH);

    let proof = system.prove(&params).expect("proving should succeed");
    system
        .verify(params.compute_input_hash(), &proof)
        .expect("proof should verify");
}

#[test]
fn test_concurrent_proving_shares_one_system() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let batches: Vec<_> = [0u32, 3, 6, 10]
        .into_iter()
        .map(|start| valid_batch(SMALL_DEPTH, start, SMALL_BATCH))
        .collect();

    let proofs: Vec<Proof> = std::thread::scope(|scope| {
        let handles: Vec<_> = batches
            .iter()
            .map(|params| {
                let system = system.clone();
                scope.spawn(move || system.prove(params).expect("proving should succeed"))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("prover thread panicked"))
            .collect()
    });

    std::thread::scope(|scope| {
        for (params, proof) in batches.iter().zip(&proofs) {
            let system = system.clone();
            scope.spawn(move || {
                system
                    .verify(params.compute_input_hash(), proof)
                    .expect("proof should verify")
            });
        }
    });

    // Each proof is bound to its own batch only
    for (i, proof) in proofs.iter().enumerate() {
        for (j, params) in batches.iter().enumerate() {
            if i != j {
                assert!(matches!(
                    system.verify(params.compute_input_hash(), proof),
                    Err(InsertionProverError::VerificationFailed)
                ));
            }
        }
    }
}

#[test]
fn test_verify_rejects_wrong_input_hash() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let params = valid_batch(SMALL_DEPTH, 0, SMALL_BATCH);
    let proof = system.prove(&params).unwrap();

    let wrong = params.compute_input_hash() + F1::ONE;
    assert!(matches!(
        system.verify(wrong, &proof),
        Err(InsertionProverError::VerificationFailed)
    ));

    // Hash of a different batch over the same tree
    let other = valid_batch(SMALL_DEPTH, 5, SMALL_BATCH);
    assert!(matches!(
        system.verify(other.compute_input_hash(), &proof),
        Err(InsertionProverError::VerificationFailed)
    ));
}

#[test]
fn test_verify_rejects_proof_of_other_shape() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let other = shared_system(SMALL_DEPTH, 1);
    let params = valid_batch(SMALL_DEPTH, 0, SMALL_BATCH);
    let proof = system.prove(&params).unwrap();

    match other.verify(params.compute_input_hash(), &proof) {
        Err(InsertionProverError::Shape(ShapeError::ProofShapeMismatch {
            proof_batch,
            system_batch,
            ..
        })) => {
            assert_eq!(proof_batch, SMALL_BATCH);
            assert_eq!(system_batch, 1);
        }
        Err(e) => panic!("expected shape mismatch, got {e:?}"),
        Ok(()) => panic!("proof of another shape must not verify"),
    }
}

#[test]
fn test_proof_transport_forms() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let params = valid_batch(SMALL_DEPTH, 1, SMALL_BATCH);
    let proof = system.prove(&params).unwrap();
    let input_hash = params.compute_input_hash();

    let json = proof.to_json().unwrap();
    assert!(json.proof.starts_with("0x"));
    let decoded = Proof::from_json(&json).unwrap();
    system.verify(input_hash, &decoded).expect("decoded proof verifies");

    let mut bytes = proof.to_bytes().unwrap();
    bytes.push(0);
    assert!(matches!(
        Proof::from_bytes(&bytes),
        Err(InsertionProverError::Serialization(_))
    ));

    bytes.truncate(4);
    assert!(matches!(
        Proof::from_bytes(&bytes),
        Err(InsertionProverError::Serialization(_))
    ));
}

#[test]
fn test_proof_envelope_rejects_bad_magic() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let proof = system.prove(&valid_batch(SMALL_DEPTH, 0, SMALL_BATCH)).unwrap();

    let mut bytes = proof.to_bytes().unwrap();
    bytes[0] ^= 0xff;
    assert!(matches!(
        Proof::from_bytes(&bytes),
        Err(InsertionProverError::Serialization(_))
    ));
}
