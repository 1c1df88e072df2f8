//! Proof generation functionality.
//!
//! Pipeline: shape validation, native witness generation, one Nova folding step
//! carrying the whole batch, then Spartan compression.

use super::{
    system::ProvingSystem,
    types::{FieldElement, InsertionCompressedSNARK, InsertionParameters, Proof, C, E1, E2},
    validate::validate_shape,
    witness::generate_witness,
};
use crate::error::ProverStage;
use crate::{config, InsertionProverError, Result};
use nova_snark::nova::RecursiveSNARK;
use tracing::{debug, info_span};

/// Generates a proof that `params` transforms its pre-root into its post-root.
///
/// Input errors (`Shape`, `Witness`) are returned before any backend work;
/// backend failures are `Prover { stage: Prove, .. }`. The proving system is
/// only read.
pub fn prove(system: &ProvingSystem, params: &InsertionParameters) -> Result<Proof> {
    let _span = info_span!(
        "prove",
        tree_depth = system.tree_depth,
        batch_size = system.batch_size,
        start_index = params.start_index
    )
    .entered();

    validate_shape(params, system.tree_depth, system.batch_size)?;
    let (witness, input_hash) = generate_witness(params, system.tree_depth)?;

    let circuit = C::new(system.tree_depth as usize, witness);
    let z0 = vec![input_hash];

    let recursive_snark = fold_batch(system, &circuit, &z0)?;

    let _compress_span = info_span!("CompressedSNARK::prove").entered();
    let compressed_snark =
        InsertionCompressedSNARK::prove(&system.pp, &system.keys.pk, &recursive_snark)
            .map_err(|e| InsertionProverError::prover(ProverStage::Prove, e))?;

    Ok(Proof {
        tree_depth: system.tree_depth,
        batch_size: system.batch_size,
        compressed_snark,
    })
}

/// Runs the single folding step and checks the folded instance before compression.
fn fold_batch(
    system: &ProvingSystem,
    circuit: &C,
    z0: &[FieldElement],
) -> Result<RecursiveSNARK<E1, E2, C>> {
    let _span = info_span!("RecursiveSNARK::prove_step").entered();

    let mut recursive_snark = RecursiveSNARK::new(&system.pp, circuit, z0)
        .map_err(|e| InsertionProverError::prover(ProverStage::Prove, e))?;
    recursive_snark
        .prove_step(&system.pp, circuit)
        .map_err(|e| InsertionProverError::prover(ProverStage::Prove, e))?;

    let zn = recursive_snark
        .verify(&system.pp, config::NUM_STEPS, z0)
        .map_err(|e| InsertionProverError::prover(ProverStage::Prove, e))?;
    debug!("folded batch, step output {:?}", zn);

    Ok(recursive_snark)
}
