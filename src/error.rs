//! Error types for the batch insertion prover

use std::fmt;

/// Stage of the proving backend at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProverStage {
    /// Circuit compilation into public parameters
    Compile,
    /// Proving/verifying key generation
    Setup,
    /// Folding and proof compression
    Prove,
    /// Backend verification routine
    Verify,
}

impl fmt::Display for ProverStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProverStage::Compile => "compile",
            ProverStage::Setup => "setup",
            ProverStage::Prove => "prove",
            ProverStage::Verify => "verify",
        };
        f.write_str(name)
    }
}

/// A batch or proof whose dimensions do not match the compiled circuit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("wrong number of identity commitments: got {got}, expected {expected}")]
    CommitmentCount { got: usize, expected: usize },

    #[error("wrong number of merkle proofs: got {got}, expected {expected}")]
    ProofCount { got: usize, expected: usize },

    #[error("wrong size of merkle proof for proof {index}: got {got}, expected {expected}")]
    ProofLength {
        index: usize,
        got: usize,
        expected: usize,
    },

    /// `start_index + batch_size - 1` does not fit in `tree_depth` bits
    #[error(
        "insertion indices overflow the tree: start index {start_index} with batch size {batch_size} exceeds 2^{tree_depth} leaves"
    )]
    IndexOverflow {
        start_index: u64,
        batch_size: u32,
        tree_depth: u32,
    },

    #[error("invalid tree depth {depth} (must be > 0 and <= {max})", max = crate::config::MAX_TREE_DEPTH)]
    InvalidTreeDepth { depth: u32 },

    #[error("invalid batch size {size} (must be > 0 and <= {max})", max = crate::config::MAX_BATCH_SIZE)]
    InvalidBatchSize { size: u32 },

    /// Proof was produced for a different (depth, batch size) pair
    #[error(
        "proof shape mismatch: proof is for depth {proof_depth} batch {proof_batch}, system is depth {system_depth} batch {system_batch}"
    )]
    ProofShapeMismatch {
        proof_depth: u32,
        proof_batch: u32,
        system_depth: u32,
        system_batch: u32,
    },

    /// Compiled constraint system is not the one for the claimed shape
    #[error("constraint system does not match the depth {tree_depth} batch {batch_size} circuit")]
    ParamsMismatch { tree_depth: u32, batch_size: u32 },

    /// Proving or verifying key was generated for a different circuit
    #[error("keys were not generated for the depth {tree_depth} batch {batch_size} circuit")]
    KeysMismatch { tree_depth: u32, batch_size: u32 },
}

/// Error types for the batch insertion prover
#[derive(Debug, thiserror::Error)]
pub enum InsertionProverError {
    /// Batch dimensions rejected before any cryptographic work
    #[error("Shape error: {0}")]
    Shape(#[from] ShapeError),

    /// Malformed hex or JSON input
    #[error("Parse error: {0}")]
    Parse(String),

    /// Witness assignment failed (root chaining, input hash, range)
    #[error("Witness error: {0}")]
    Witness(String),

    /// The proof backend failed at the given stage
    #[error("Prover error during {stage}: {message}")]
    Prover { stage: ProverStage, message: String },

    /// The proof does not verify against the given input hash
    #[error("Proof verification failed")]
    VerificationFailed,

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO operation failed
    #[error("IO error: {0}")]
    IO(String),
}

impl InsertionProverError {
    pub(crate) fn prover(stage: ProverStage, err: impl fmt::Debug) -> Self {
        InsertionProverError::Prover {
            stage,
            message: format!("{err:?}"),
        }
    }

    /// Whether this error was caused by the caller's input rather than the backend.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            InsertionProverError::Shape(_)
                | InsertionProverError::Parse(_)
                | InsertionProverError::Witness(_)
        )
    }
}

impl From<std::io::Error> for InsertionProverError {
    fn from(err: std::io::Error) -> Self {
        InsertionProverError::IO(err.to_string())
    }
}

impl From<serde_json::Error> for InsertionProverError {
    fn from(err: serde_json::Error) -> Self {
        InsertionProverError::Parse(err.to_string())
    }
}

/// Convenience Result type for batch insertion prover operations
pub type Result<T> = std::result::Result<T, InsertionProverError>;
