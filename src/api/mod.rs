//! High-level API for proving batches of sparse Merkle tree insertions.
//!
//! ## Core Workflow
//!
//! 1. **`ProvingSystem::setup()`**: Compiles the insertion circuit for a fixed
//!    `(tree_depth, batch_size)` and generates proving/verifying keys. Expensive;
//!    the result is persisted with `write_to_file` and reloaded with
//!    `read_from_file`, or rebuilt from exported keys with `import_setup`.
//! 2. **`InsertionParameters`**: One batch (start index, pre/post root,
//!    commitments, leaf-first Merkle proofs), usually parsed from JSON.
//! 3. **`prove()`**: Validates the batch shape, replays the insertions natively,
//!    and produces a succinct `Proof`.
//! 4. **`verify()`**: Checks a `Proof` against the batch's input hash alone.
//!
//! ## Example
//!
//! ```rust,no_run
//! use batch_insertion_prover::api::{InsertionParameters, ProvingSystem};
//! use batch_insertion_prover::merkle::SparseMerkleTree;
//! use batch_insertion_prover::FieldElement;
//!
//! let system = ProvingSystem::setup(4, 1)?;
//!
//! let mut tree = SparseMerkleTree::new(4)?;
//! let pre_root = tree.root();
//! let commitment = FieldElement::from(1u64);
//! let siblings = tree.update(0, commitment)?;
//!
//! let params = InsertionParameters {
//!     input_hash: None,
//!     start_index: 0,
//!     pre_root,
//!     post_root: tree.root(),
//!     identity_commitments: vec![commitment],
//!     merkle_proofs: vec![siblings],
//! };
//!
//! let proof = system.prove(&params)?;
//! system.verify(params.compute_input_hash(), &proof)?;
//! # Ok::<(), batch_insertion_prover::InsertionProverError>(())
//! ```

mod prove;
mod serialize;
mod system;
pub(crate) mod types;
mod validate;
mod verify;
mod witness;

// Re-export the public API
pub use system::ProvingSystem;
pub use types::{FieldElement, InsertionParameters, KeyPair, Proof, ProofJson};
pub use validate::{validate_dimensions, validate_shape};

#[doc(hidden)]
pub use witness::generate_witness;

pub use crate::{InsertionProverError, Result};
