//! Proof verification functionality.

use super::{
    system::ProvingSystem,
    types::{FieldElement, Proof},
};
use crate::error::ShapeError;
use crate::{config, InsertionProverError, Result};
use tracing::{debug, info_span};

/// Verifies a proof against the input hash it claims to bind.
///
/// A proof produced for a different shape is a `Shape` error. Every backend
/// rejection is reported as `VerificationFailed` without further detail; the
/// backend's reason is only logged at debug level.
pub fn verify(system: &ProvingSystem, input_hash: FieldElement, proof: &Proof) -> Result<()> {
    let _span = info_span!(
        "verify",
        tree_depth = system.tree_depth,
        batch_size = system.batch_size
    )
    .entered();

    if proof.tree_depth != system.tree_depth || proof.batch_size != system.batch_size {
        return Err(ShapeError::ProofShapeMismatch {
            proof_depth: proof.tree_depth,
            proof_batch: proof.batch_size,
            system_depth: system.tree_depth,
            system_batch: system.batch_size,
        }
        .into());
    }

    let z0 = [input_hash];
    match proof
        .compressed_snark
        .verify(&system.keys.vk, config::NUM_STEPS, &z0)
    {
        Ok(zn) if zn.as_slice() == z0.as_slice() => Ok(()),
        Ok(zn) => {
            debug!("step output {:?} does not carry the input hash", zn);
            Err(InsertionProverError::VerificationFailed)
        }
        Err(e) => {
            debug!("backend rejected proof: {:?}", e);
            Err(InsertionProverError::VerificationFailed)
        }
    }
}
