//! Batch insertion prover
//!
//! Proves in zero knowledge that a batch of identity-commitment insertions into a
//! fixed-depth sparse Merkle tree turns a declared pre-root into a declared
//! post-root. The only public value of a proof is an input hash binding the
//! start index, both roots and the inserted commitments, so verification needs
//! nothing but that hash.
//!
//! ## Main Components
//!
//! - [`api`]: `ProvingSystem` lifecycle (setup, import, serialize, prove, verify)
//!   and the `InsertionParameters` batch type
//! - [`circuit`]: Nova step circuit and its gadgets (path round, path
//!   verification, index decomposition, batch insertion)
//! - [`merkle`]: Native root recomputation and a sparse Merkle tree
//! - [`poseidon`]: Domain-separated Poseidon node and input hashes
//! - [`server`]: HTTP prover service and metrics endpoint
//! - [`config`]: Centralized configuration constants
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, InsertionProverError>`. Caller mistakes
//! (`Shape`, `Parse`, `Witness`) are reported before any backend work and are
//! distinguishable from backend failures (`Prover`) and from an invalid proof
//! (`VerificationFailed`).

pub mod api;
pub mod circuit;
pub mod config;
pub mod error;
pub mod merkle;
pub mod metrics;
pub mod params;
pub mod poseidon;
pub mod server;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use api::{FieldElement, InsertionParameters, Proof, ProofJson, ProvingSystem};
pub use circuit::{InsertionCircuit, InsertionWitness};
pub use error::{InsertionProverError, ProverStage, Result, ShapeError};
pub use merkle::{compute_root, empty_root, SparseMerkleTree};
pub use poseidon::{compute_input_hash, hash_node};
pub use utils::{field_from_hex, field_to_hex};
