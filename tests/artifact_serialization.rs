//! Persisted artifact and key import/export tests.

use batch_insertion_prover::api::ProvingSystem;
use batch_insertion_prover::{InsertionProverError, ShapeError};

mod common;
use common::{shared_system, valid_batch, SMALL_BATCH, SMALL_DEPTH};
use tempfile::TempDir;

#[test]
fn test_artifact_round_trip_cross_verifies() {
    let original = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let restored = ProvingSystem::from_bytes(&original.to_bytes().unwrap()).unwrap();
    assert_eq!(restored.tree_depth(), SMALL_DEPTH);
    assert_eq!(restored.batch_size(), SMALL_BATCH);

    let params = valid_batch(SMALL_DEPTH, 4, SMALL_BATCH);
    let input_hash = params.compute_input_hash();

    let from_original = original.prove(&params).unwrap();
    let from_restored = restored.prove(&params).unwrap();

    restored.verify(input_hash, &from_original).unwrap();
    original.verify(input_hash, &from_restored).unwrap();
}

#[test]
fn test_artifact_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("keys.bin");

    let original = shared_system(SMALL_DEPTH, SMALL_BATCH);
    original.write_to_file(&path).unwrap();
    let loaded = ProvingSystem::read_from_file(&path).unwrap();

    let params = valid_batch(SMALL_DEPTH, 0, SMALL_BATCH);
    let proof = loaded.prove(&params).unwrap();
    original.verify(params.compute_input_hash(), &proof).unwrap();
}

#[test]
fn test_artifact_rejects_trailing_bytes() {
    let mut bytes = shared_system(SMALL_DEPTH, SMALL_BATCH).to_bytes().unwrap();
    bytes.extend_from_slice(&[0, 1, 2]);

    assert!(matches!(
        ProvingSystem::from_bytes(&bytes),
        Err(InsertionProverError::Serialization(_))
    ));
}

#[test]
fn test_artifact_rejects_bad_header() {
    let mut bytes = shared_system(SMALL_DEPTH, SMALL_BATCH).to_bytes().unwrap();
    bytes[0..4].copy_from_slice(&0u32.to_be_bytes());

    assert!(matches!(
        ProvingSystem::from_bytes(&bytes),
        Err(InsertionProverError::Shape(ShapeError::InvalidTreeDepth { depth: 0 }))
    ));

    assert!(matches!(
        ProvingSystem::from_bytes(&bytes[..5]),
        Err(InsertionProverError::Serialization(_))
    ));
}

#[test]
fn test_artifact_rejects_header_of_other_shape() {
    let mut bytes = shared_system(SMALL_DEPTH, SMALL_BATCH).to_bytes().unwrap();
    bytes[4..8].copy_from_slice(&1u32.to_be_bytes());

    match ProvingSystem::from_bytes(&bytes) {
        Err(InsertionProverError::Shape(ShapeError::ParamsMismatch {
            tree_depth,
            batch_size,
        })) => {
            assert_eq!(tree_depth, SMALL_DEPTH);
            assert_eq!(batch_size, 1);
        }
        Err(e) => panic!("expected params mismatch, got {e:?}"),
        Ok(_) => panic!("header for another shape must not load"),
    }
}

#[test]
fn test_artifact_rejects_keys_of_other_shape() {
    let system = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let other = shared_system(SMALL_DEPTH, 1);

    // Header and constraint system of one shape, keys of another
    let own_keys_len =
        system.proving_key_bytes().unwrap().len() + system.verifying_key_bytes().unwrap().len();
    let bytes = system.to_bytes().unwrap();
    let (header, rest) = bytes.split_at(8);
    let params_segment = &rest[own_keys_len..];

    let mut spliced = header.to_vec();
    spliced.extend(other.proving_key_bytes().unwrap());
    spliced.extend(other.verifying_key_bytes().unwrap());
    spliced.extend_from_slice(params_segment);

    assert!(matches!(
        ProvingSystem::from_bytes(&spliced),
        Err(InsertionProverError::Shape(ShapeError::KeysMismatch { .. }))
    ));
}

#[test]
fn test_artifact_rejects_truncated_body() {
    let bytes = shared_system(SMALL_DEPTH, SMALL_BATCH).to_bytes().unwrap();
    let truncated = &bytes[..bytes.len() / 2];

    assert!(matches!(
        ProvingSystem::from_bytes(truncated),
        Err(InsertionProverError::Serialization(_))
    ));
}

#[test]
fn test_import_setup_from_exported_keys() {
    let original = shared_system(SMALL_DEPTH, SMALL_BATCH);
    let pk = original.proving_key_bytes().unwrap();
    let vk = original.verifying_key_bytes().unwrap();

    let imported = ProvingSystem::import_setup(SMALL_DEPTH, SMALL_BATCH, &pk, &vk).unwrap();

    let params = valid_batch(SMALL_DEPTH, 2, SMALL_BATCH);
    let proof = imported.prove(&params).unwrap();
    original
        .verify(params.compute_input_hash(), &proof)
        .expect("proof from imported keys verifies under the original keys");
}

#[test]
fn test_import_setup_from_files() {
    let dir = TempDir::new().unwrap();
    let pk_path = dir.path().join("pk.bin");
    let vk_path = dir.path().join("vk.bin");

    let original = shared_system(SMALL_DEPTH, SMALL_BATCH);
    std::fs::write(&pk_path, original.proving_key_bytes().unwrap()).unwrap();
    original.write_verifying_key(&vk_path).unwrap();

    let imported =
        ProvingSystem::import_setup_from_files(SMALL_DEPTH, SMALL_BATCH, &pk_path, &vk_path)
            .unwrap();
    let params = valid_batch(SMALL_DEPTH, 0, SMALL_BATCH);
    let proof = original.prove(&params).unwrap();
    imported.verify(params.compute_input_hash(), &proof).unwrap();
}

#[test]
fn test_import_setup_rejects_keys_of_other_shape() {
    let other = shared_system(SMALL_DEPTH, 1);
    let pk = other.proving_key_bytes().unwrap();
    let vk = other.verifying_key_bytes().unwrap();

    match ProvingSystem::import_setup(SMALL_DEPTH, SMALL_BATCH, &pk, &vk) {
        Err(InsertionProverError::Shape(ShapeError::KeysMismatch {
            tree_depth,
            batch_size,
        })) => {
            assert_eq!(tree_depth, SMALL_DEPTH);
            assert_eq!(batch_size, SMALL_BATCH);
        }
        Err(e) => panic!("expected keys mismatch, got {e:?}"),
        Ok(_) => panic!("keys of another shape must not import"),
    }

    // Mixing a matching proving key with a foreign verifying key fails too
    let own_pk = shared_system(SMALL_DEPTH, SMALL_BATCH)
        .proving_key_bytes()
        .unwrap();
    assert!(matches!(
        ProvingSystem::import_setup(SMALL_DEPTH, SMALL_BATCH, &own_pk, &vk),
        Err(InsertionProverError::Shape(ShapeError::KeysMismatch { .. }))
    ));
}

#[test]
fn test_import_setup_rejects_garbage_keys() {
    let result = ProvingSystem::import_setup(SMALL_DEPTH, SMALL_BATCH, &[1, 2, 3], &[4, 5, 6]);
    assert!(matches!(result, Err(InsertionProverError::Serialization(_))));
}

#[test]
fn test_constraint_system_export_writes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("circuit.r1cs");

    shared_system(SMALL_DEPTH, SMALL_BATCH)
        .write_constraint_system(&path)
        .unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}
