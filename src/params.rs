//! Circuit compilation and key generation for a fixed (tree depth, batch size) shape.
//!
//! Compiling the circuit into Nova public parameters is deterministic given the
//! shape, so a proving system can be rebuilt from its keys alone. An in-memory
//! cache keyed by shape lets tests and tooling reuse an expensive setup within a
//! session.

use crate::api::types::{
    FieldElement, InsertionCompressedSNARK, InsertionPublicParams, KeyPair, C, E1, S1, S2,
};
use crate::api::{validate_dimensions, ProvingSystem};
use crate::error::{ProverStage, ShapeError};
use crate::{InsertionProverError, Result};
use bincode::Options;
use ff::Field;
use nova_snark::frontend::{gadgets::num::AllocatedNum, shape_cs::ShapeCS, ConstraintSystem};
use nova_snark::traits::{circuit::StepCircuit, snark::RelaxedR1CSSNARKTrait};
use once_cell::sync::{Lazy, OnceCell};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, info_span};

/// Cache key: parameters depend only on the circuit shape.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct ShapeKey {
    tree_depth: u32,
    batch_size: u32,
}

/// Maximum number of proving systems to cache in memory.
const MAX_CACHE_SIZE: usize = 8;

static MEMORY_CACHE: Lazy<Mutex<HashMap<ShapeKey, ProvingSystem>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Compiles the insertion circuit for the given shape into Nova public parameters.
pub fn build_constraint_system(tree_depth: u32, batch_size: u32) -> Result<InsertionPublicParams> {
    validate_dimensions(tree_depth, batch_size)?;
    let _span = info_span!("build_constraint_system", tree_depth, batch_size).entered();

    let circuit = C::blank(tree_depth as usize, batch_size as usize);
    let pp = InsertionPublicParams::setup(&circuit, &*S1::ck_floor(), &*S2::ck_floor())
        .map_err(|e| InsertionProverError::prover(ProverStage::Compile, e))?;

    let (primary_constraints, secondary_constraints) = pp.num_constraints();
    let (primary_variables, secondary_variables) = pp.num_variables();
    info!(
        primary_constraints,
        secondary_constraints, primary_variables, secondary_variables, "circuit compiled"
    );

    Ok(pp)
}

/// Runs key generation for compiled parameters.
pub fn generate_keys(pp: &InsertionPublicParams) -> Result<KeyPair> {
    let _span = info_span!("generate_keys").entered();
    let (pk, vk) = InsertionCompressedSNARK::setup(pp)
        .map_err(|e| InsertionProverError::prover(ProverStage::Setup, e))?;
    Ok(KeyPair {
        pk: Arc::new(pk),
        vk: Arc::new(vk),
    })
}

/// Writes compiled parameters with the pinned bincode encoding.
pub fn write_constraint_system<W: Write>(pp: &InsertionPublicParams, writer: W) -> Result<()> {
    crate::config::bincode_options()
        .serialize_into(writer, pp)
        .map_err(|e| {
            InsertionProverError::Serialization(format!(
                "Failed to serialize constraint system: {}",
                e
            ))
        })
}

/// Load a cached proving system for the shape, or run setup and cache it.
pub fn load_or_setup(tree_depth: u32, batch_size: u32) -> Result<ProvingSystem> {
    let key = ShapeKey {
        tree_depth,
        batch_size,
    };

    {
        let cache = MEMORY_CACHE.lock().map_err(|_| poisoned())?;
        if let Some(system) = cache.get(&key) {
            debug!("Using memory-cached proving system for {:?}", key);
            return Ok(system.clone());
        }
    }

    let system = ProvingSystem::setup(tree_depth, batch_size)?;

    {
        let mut cache = MEMORY_CACHE.lock().map_err(|_| poisoned())?;
        if cache.len() >= MAX_CACHE_SIZE {
            if let Some(old_key) = cache.keys().next().copied() {
                cache.remove(&old_key);
                info!("Evicted proving system cache entry to stay under limit");
            }
        }
        cache.insert(key, system.clone());
    }

    Ok(system)
}

/// Constraint and variable counts of the bare step circuit for a shape.
pub fn step_circuit_size(tree_depth: u32, batch_size: u32) -> Result<(usize, usize)> {
    validate_dimensions(tree_depth, batch_size)?;
    let mut cs = ShapeCS::<E1>::new();
    let z0 = AllocatedNum::alloc(cs.namespace(|| "z0"), || Ok(FieldElement::ZERO))
        .map_err(|e| InsertionProverError::prover(ProverStage::Compile, e))?;
    C::blank(tree_depth as usize, batch_size as usize)
        .synthesize(&mut cs, &[z0])
        .map_err(|e| InsertionProverError::prover(ProverStage::Compile, e))?;
    Ok((cs.num_constraints(), cs.num_aux()))
}

/// Constraints and variables the folding verifier adds around any step circuit.
/// Measured once on the smallest shape.
static AUGMENTATION_OVERHEAD: OnceCell<(usize, usize)> = OnceCell::new();

fn augmentation_overhead() -> Result<(usize, usize)> {
    AUGMENTATION_OVERHEAD
        .get_or_try_init(|| {
            let reference = build_constraint_system(1, 1)?;
            let (step_constraints, step_variables) = step_circuit_size(1, 1)?;
            Ok((
                reference.num_constraints().0.saturating_sub(step_constraints),
                reference.num_variables().0.saturating_sub(step_variables),
            ))
        })
        .copied()
}

/// Checks that compiled parameters belong to the `(tree_depth, batch_size)` circuit
/// without recompiling it.
pub fn ensure_params_match(
    pp: &InsertionPublicParams,
    tree_depth: u32,
    batch_size: u32,
) -> Result<()> {
    let (overhead_constraints, overhead_variables) = augmentation_overhead()?;
    let (step_constraints, step_variables) = step_circuit_size(tree_depth, batch_size)?;
    let expected = (
        overhead_constraints + step_constraints,
        overhead_variables + step_variables,
    );
    let actual = (pp.num_constraints().0, pp.num_variables().0);
    if actual != expected {
        debug!(?expected, ?actual, "constraint system size mismatch");
        return Err(ShapeError::ParamsMismatch {
            tree_depth,
            batch_size,
        }
        .into());
    }
    Ok(())
}

/// Checks that `keys` were generated from `pp`.
///
/// Key generation is deterministic given the compiled parameters, so keys for
/// this circuit encode exactly like freshly derived ones.
pub fn ensure_keys_match(
    pp: &InsertionPublicParams,
    keys: &KeyPair,
    tree_depth: u32,
    batch_size: u32,
) -> Result<()> {
    let _span = info_span!("check_keys", tree_depth, batch_size).entered();
    let derived = generate_keys(pp)?;
    let matches = encode(&*derived.vk)? == encode(&*keys.vk)?
        && encode(&*derived.pk)? == encode(&*keys.pk)?;
    if !matches {
        return Err(ShapeError::KeysMismatch {
            tree_depth,
            batch_size,
        }
        .into());
    }
    Ok(())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    crate::config::bincode_options()
        .serialize(value)
        .map_err(|e| InsertionProverError::Serialization(format!("Failed to encode key: {e}")))
}

fn poisoned() -> InsertionProverError {
    InsertionProverError::IO("proving system cache mutex poisoned".to_string())
}
