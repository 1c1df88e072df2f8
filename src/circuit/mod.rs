//! Batch insertion circuit module structure.
//!
//! - `gadgets/`: Low-level circuit gadgets (select, poseidon, merkle path, bits, insertion)
//! - `witness`: Witness data structures and constructors
//! - `synth`: Main synthesis logic

pub mod gadgets;
pub mod synth;
pub mod witness;

pub use witness::InsertionWitness;

use ff::PrimeField;
use ff::PrimeFieldBits;
use nova_snark::{
    frontend::{gadgets::num::AllocatedNum, ConstraintSystem, SynthesisError},
    traits::circuit::StepCircuit,
};

use crate::config;

/// A Nova step circuit proving one batch of sparse Merkle tree insertions.
///
/// A single folding step carries the whole batch; its only public input and
/// output is the input hash binding the start index, both roots and the
/// inserted commitments.
#[derive(Clone, Debug)]
pub struct InsertionCircuit<F: PrimeField> {
    /// Number of levels of the tree.
    pub tree_depth: usize,
    /// Number of insertions per proof.
    pub batch_size: usize,
    /// Private assignment. Blank (all zero) during parameter generation.
    pub witness: InsertionWitness<F>,
}

impl<F: PrimeField> InsertionCircuit<F> {
    /// Creates a circuit whose shape is taken from the witness.
    pub fn new(tree_depth: usize, witness: InsertionWitness<F>) -> Self {
        Self {
            tree_depth,
            batch_size: witness.batch_size(),
            witness,
        }
    }

    /// Creates a circuit with an all-zero witness, for parameter generation.
    pub fn blank(tree_depth: usize, batch_size: usize) -> Self {
        Self {
            tree_depth,
            batch_size,
            witness: InsertionWitness::blank(tree_depth, batch_size),
        }
    }
}

impl<F: PrimeField + PrimeFieldBits> StepCircuit<F> for InsertionCircuit<F> {
    fn arity(&self) -> usize {
        config::CIRCUIT_ARITY
    }

    fn synthesize<CS: ConstraintSystem<F>>(
        &self,
        cs: &mut CS,
        z: &[AllocatedNum<F>],
    ) -> Result<Vec<AllocatedNum<F>>, SynthesisError> {
        synth::synthesize_insertion_circuit(
            cs,
            z,
            self.tree_depth,
            self.batch_size,
            &self.witness,
        )
    }
}
