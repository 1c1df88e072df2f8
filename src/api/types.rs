//! Core API data types and structures.
//!
//! This module contains the public data structures used by the API:
//! - InsertionParameters: one batch of insertions, as received from a client
//! - Proof: Final succinct proof object
//! - KeyPair: Proving and verifying keys

use bincode::Options;
use nova_snark::{
    nova::{CompressedSNARK, ProverKey, PublicParams, VerifierKey},
    provider::{ipa_pc, PallasEngine, VestaEngine},
    spartan::snark::RelaxedR1CSSNARK,
    traits::Engine,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{self, proof_format};
use crate::utils::{field_from_hex, field_to_hex};
use crate::{InsertionProverError, Result};

// --- Type Aliases for Core SNARK Components ---

pub type E1 = PallasEngine;
pub type E2 = VestaEngine;
pub type EE1 = ipa_pc::EvaluationEngine<E1>;
pub type EE2 = ipa_pc::EvaluationEngine<E2>;
pub type S1 = RelaxedR1CSSNARK<E1, EE1>;
pub type S2 = RelaxedR1CSSNARK<E2, EE2>;

/// A type alias for the scalar field of the primary curve.
pub type FieldElement = <E1 as Engine>::Scalar;

pub type C = crate::circuit::InsertionCircuit<FieldElement>;

pub type InsertionPublicParams = PublicParams<E1, E2, C>;
pub type InsertionProverKey = ProverKey<E1, E2, C, S1, S2>;
pub type InsertionVerifierKey = VerifierKey<E1, E2, C, S1, S2>;
pub type InsertionCompressedSNARK = CompressedSNARK<E1, E2, C, S1, S2>;

/// One batch of insertions.
///
/// JSON form uses camelCase names and `0x`-prefixed hex strings for every field
/// element; `startIndex` is a plain number and `inputHash` may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "InsertionParametersJson",
    into = "InsertionParametersJson"
)]
pub struct InsertionParameters {
    /// Expected input hash. When present it must match the hash of the other fields.
    pub input_hash: Option<FieldElement>,
    /// Index of the first inserted leaf; insertion `i` lands at `start_index + i`
    pub start_index: u32,
    /// Root before the first insertion
    pub pre_root: FieldElement,
    /// Root after the last insertion
    pub post_root: FieldElement,
    /// Inserted leaves, in insertion order
    pub identity_commitments: Vec<FieldElement>,
    /// Leaf-first siblings for each insertion
    pub merkle_proofs: Vec<Vec<FieldElement>>,
}

impl InsertionParameters {
    /// Parse a batch from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the batch as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InsertionProverError::Serialization(e.to_string()))
    }

    /// Hash binding every public value of the batch.
    pub fn compute_input_hash(&self) -> FieldElement {
        crate::poseidon::compute_input_hash(
            u64::from(self.start_index),
            self.pre_root,
            self.post_root,
            &self.identity_commitments,
        )
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertionParametersJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_hash: Option<String>,
    start_index: u32,
    pre_root: String,
    post_root: String,
    identity_commitments: Vec<String>,
    merkle_proofs: Vec<Vec<String>>,
}

impl TryFrom<InsertionParametersJson> for InsertionParameters {
    type Error = InsertionProverError;

    fn try_from(json: InsertionParametersJson) -> Result<Self> {
        Ok(Self {
            input_hash: json.input_hash.as_deref().map(field_from_hex).transpose()?,
            start_index: json.start_index,
            pre_root: field_from_hex(&json.pre_root)?,
            post_root: field_from_hex(&json.post_root)?,
            identity_commitments: parse_all(&json.identity_commitments)?,
            merkle_proofs: json
                .merkle_proofs
                .iter()
                .map(|proof| parse_all(proof))
                .collect::<Result<_>>()?,
        })
    }
}

fn parse_all(values: &[String]) -> Result<Vec<FieldElement>> {
    values.iter().map(|v| field_from_hex(v)).collect()
}

fn hex_all(values: &[FieldElement]) -> Vec<String> {
    values.iter().map(field_to_hex).collect()
}

impl From<InsertionParameters> for InsertionParametersJson {
    fn from(params: InsertionParameters) -> Self {
        Self {
            input_hash: params.input_hash.as_ref().map(field_to_hex),
            start_index: params.start_index,
            pre_root: field_to_hex(&params.pre_root),
            post_root: field_to_hex(&params.post_root),
            identity_commitments: hex_all(&params.identity_commitments),
            merkle_proofs: params
                .merkle_proofs
                .iter()
                .map(|proof| hex_all(proof))
                .collect(),
        }
    }
}

/// The final, succinct proof object that is sent to the verifier.
///
/// Carries the shape of the proving system that produced it, so verification
/// against a differently shaped system is reported as a shape error.
#[derive(Serialize, Deserialize)]
pub struct Proof {
    /// Tree depth of the producing system
    pub tree_depth: u32,
    /// Batch size of the producing system
    pub batch_size: u32,
    /// The compressed SNARK proof
    pub compressed_snark: InsertionCompressedSNARK,
}

impl Proof {
    /// Serialize this proof to bytes for network transport.
    ///
    /// The format includes a magic number, version, and the proof data.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut result = Vec::new();

        result.extend_from_slice(proof_format::MAGIC);
        result.extend_from_slice(&proof_format::VERSION.to_le_bytes());

        let proof_bytes = config::bincode_options()
            .serialize(self)
            .map_err(|e| {
                InsertionProverError::Serialization(format!("Failed to serialize proof: {}", e))
            })?;

        let length = u32::try_from(proof_bytes.len()).map_err(|_| {
            InsertionProverError::Serialization("Proof too large for envelope".to_string())
        })?;
        result.extend_from_slice(&length.to_le_bytes());
        result.extend_from_slice(&proof_bytes);

        Ok(result)
    }

    /// Deserialize a proof from bytes.
    ///
    /// Validates the magic number, version and length before deserializing.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < proof_format::HEADER_SIZE {
            return Err(InsertionProverError::Serialization(
                "Proof bytes too short for header".to_string(),
            ));
        }

        if &bytes[0..4] != proof_format::MAGIC {
            return Err(InsertionProverError::Serialization(
                "Invalid magic bytes in proof".to_string(),
            ));
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != proof_format::VERSION {
            return Err(InsertionProverError::Serialization(format!(
                "Unsupported proof format version: {}",
                version
            )));
        }

        let length = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
        let expected_len = proof_format::HEADER_SIZE + length;
        if bytes.len() < expected_len {
            return Err(InsertionProverError::Serialization(
                "Proof bytes truncated".to_string(),
            ));
        }
        if bytes.len() > expected_len {
            return Err(InsertionProverError::Serialization(
                "Proof bytes contain trailing data".to_string(),
            ));
        }

        config::bincode_options()
            .reject_trailing_bytes()
            .deserialize(&bytes[proof_format::HEADER_SIZE..expected_len])
            .map_err(|e| {
                InsertionProverError::Serialization(format!("Failed to deserialize proof: {}", e))
            })
    }

    /// Wrap the proof into its JSON transport form.
    pub fn to_json(&self) -> Result<ProofJson> {
        Ok(ProofJson {
            proof: format!("0x{}", hex::encode(self.to_bytes()?)),
        })
    }

    /// Unwrap a proof from its JSON transport form.
    pub fn from_json(json: &ProofJson) -> Result<Self> {
        let digits = json
            .proof
            .strip_prefix("0x")
            .ok_or_else(|| InsertionProverError::Parse("proof is missing 0x prefix".to_string()))?;
        let bytes = hex::decode(digits)
            .map_err(|e| InsertionProverError::Parse(format!("invalid proof hex: {}", e)))?;
        Self::from_bytes(&bytes)
    }
}

/// JSON transport form of a proof: `{ "proof": "0x..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofJson {
    pub proof: String,
}

// --- Keys ---

#[derive(Clone)]
pub struct KeyPair {
    pub(crate) pk: Arc<InsertionProverKey>,
    pub(crate) vk: Arc<InsertionVerifierKey>,
}
