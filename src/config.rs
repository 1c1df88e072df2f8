//! Centralized configuration for the batch insertion prover.
//!
//! This module contains constants and default parameters used throughout the
//! application to ensure consistency and ease of modification.

// --- Circuit Shape Limits ---

/// Maximum supported tree depth. Indices are native `u64` values and the
/// in-circuit bit decomposition must stay far below the field size.
pub const MAX_TREE_DEPTH: u32 = 32;

/// Maximum number of insertions per proof (prevents DoS via resource exhaustion)
pub const MAX_BATCH_SIZE: u32 = 4096;

/// Arity of the step circuit: the input hash is the only public value.
pub const CIRCUIT_ARITY: usize = 1;

/// Number of folding steps per proof. One step carries the whole batch.
pub const NUM_STEPS: usize = 1;

// --- Service Defaults ---

/// Default listen address of the prover HTTP endpoint
pub const DEFAULT_PROVER_ADDRESS: &str = "localhost:3001";

/// Default listen address of the metrics endpoint
pub const DEFAULT_METRICS_ADDRESS: &str = "localhost:9998";

/// Largest accepted `POST /prove` body (64 MiB). Large batches of deep proofs
/// exceed axum's 2 MB default.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024 * 1024;

// --- Artifact and Proof Formats ---

/// Size of the persisted artifact header: tree depth (u32 BE) + batch size (u32 BE)
pub const ARTIFACT_HEADER_SIZE: usize = 8;

/// Constants for the versioned proof envelope
pub mod proof_format {
    /// Magic bytes identifying a merkle batch update proof
    pub const MAGIC: &[u8] = b"MBUP";

    /// Current format version for forward compatibility
    pub const VERSION: u16 = 1;

    /// Header size in bytes: magic(4) + version(2) + length(4)
    pub const HEADER_SIZE: usize = 10;
}

/// Pinned bincode options so persisted artifacts and proofs stay stable even if
/// bincode's defaults change.
pub fn bincode_options() -> impl bincode::Options + Copy {
    use bincode::Options;
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

// --- Test-related Constants ---

/// Tree depth used by the production-sized scenarios
pub const PRODUCTION_TREE_DEPTH: u32 = 22;

/// A fixed random seed used in tests to ensure deterministic behavior.
pub const TEST_RANDOM_SEED: u64 = 42;
