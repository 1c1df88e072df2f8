//! Circuit gadgets for the batch insertion circuit.
//!
//! This module contains low-level circuit components used in the synthesis.

pub mod bits;
pub mod insertion;
pub mod merkle;
pub mod poseidon;
pub mod select;

// Re-export commonly used gadgets
pub use bits::decompose_index;
pub use insertion::{enforce_equal, insert_batch};
pub use merkle::{path_round, verify_merkle_path};
pub use poseidon::{circuit_poseidon_constants, poseidon_hash_tagged_gadget};
pub use select::{conditional_select, ordered_pair};
