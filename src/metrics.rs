//! Service metrics and CLI-friendly timing summaries.
//!
//! `ProverMetrics` holds lock-free counters shared by all request handlers and
//! is served as JSON on the metrics address. `ProofMetrics` and
//! `VerificationMetrics` are one-shot measurements printed by the CLI.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::InsertionProverError;

/// Counters for the prover service.
#[derive(Debug, Default)]
pub struct ProverMetrics {
    requests_total: AtomicU64,
    proofs_generated: AtomicU64,
    malformed_requests: AtomicU64,
    rejected_batches: AtomicU64,
    backend_failures: AtomicU64,
    proving_time_ms_total: AtomicU64,
}

/// Point-in-time copy of [`ProverMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub proofs_generated: u64,
    pub malformed_requests: u64,
    pub rejected_batches: u64,
    pub backend_failures: u64,
    pub proving_time_ms_total: u64,
}

impl ProverMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_proof(&self, elapsed: Duration) {
        self.proofs_generated.fetch_add(1, Ordering::Relaxed);
        self.proving_time_ms_total
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    /// Count a failed request by error class.
    pub fn record_failure(&self, err: &InsertionProverError) {
        let counter = match err {
            InsertionProverError::Parse(_) => &self.malformed_requests,
            InsertionProverError::Shape(_) | InsertionProverError::Witness(_) => {
                &self.rejected_batches
            }
            _ => &self.backend_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a failure that never produced a library error (crashed worker).
    pub fn record_backend_failure(&self) {
        self.backend_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            proofs_generated: self.proofs_generated.load(Ordering::Relaxed),
            malformed_requests: self.malformed_requests.load(Ordering::Relaxed),
            rejected_batches: self.rejected_batches.load(Ordering::Relaxed),
            backend_failures: self.backend_failures.load(Ordering::Relaxed),
            proving_time_ms_total: self.proving_time_ms_total.load(Ordering::Relaxed),
        }
    }
}

/// Metrics collected during proof generation
#[derive(Debug, Clone)]
pub struct ProofMetrics {
    pub duration: Duration,
    pub proof_size_bytes: usize,
    pub tree_depth: u32,
    pub batch_size: u32,
}

impl ProofMetrics {
    /// Get proof size in KB
    pub fn proof_size_kb(&self) -> f64 {
        self.proof_size_bytes as f64 / 1024.0
    }

    /// Format as human-readable string
    pub fn format(&self) -> String {
        format!(
            "Proved {} insertions (depth {}) in {:.1}s, proof size {:.1} KB",
            self.batch_size,
            self.tree_depth,
            self.duration.as_secs_f64(),
            self.proof_size_kb()
        )
    }
}

/// Metrics collected during verification
#[derive(Debug, Clone)]
pub struct VerificationMetrics {
    pub duration: Duration,
    pub valid: bool,
}

impl VerificationMetrics {
    /// Format as human-readable string
    pub fn format(&self) -> String {
        let outcome = if self.valid { "valid" } else { "invalid" };
        format!(
            "Proof {} (checked in {:.0}ms)",
            outcome,
            self.duration.as_secs_f64() * 1000.0
        )
    }
}
