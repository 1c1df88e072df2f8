//! Common test utilities and shared infrastructure.
//!
//! - `fixtures`: batch builders over `SparseMerkleTree` and cached proving systems

pub mod fixtures;

// Re-export commonly used test helpers
#[allow(unused_imports)] // These are used across many test files
pub use fixtures::{insert_into, shared_system, valid_batch, SMALL_BATCH, SMALL_DEPTH};
