//! Stateless helper functions for the batch insertion prover

use crate::{FieldElement, InsertionProverError, Result};
use ff::PrimeField;

/// Parse a `0x`-prefixed big-endian hex string into a field element.
///
/// Digits may be any case and leading zeros are optional. Values greater than
/// or equal to the field modulus are rejected rather than reduced.
pub fn field_from_hex(s: &str) -> Result<FieldElement> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| InsertionProverError::Parse(format!("missing 0x prefix: {s:?}")))?;

    if digits.is_empty() || digits.len() > 64 {
        return Err(InsertionProverError::Parse(format!(
            "invalid hex length for field element: {s:?}"
        )));
    }

    let padded = format!("{digits:0>64}");
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(&padded, &mut bytes)
        .map_err(|e| InsertionProverError::Parse(format!("invalid hex {s:?}: {e}")))?;

    // The field's canonical representation is little-endian.
    bytes.reverse();
    let mut repr = <FieldElement as PrimeField>::Repr::default();
    repr.as_mut().copy_from_slice(&bytes);

    Option::from(FieldElement::from_repr(repr)).ok_or_else(|| {
        InsertionProverError::Parse(format!("value exceeds field modulus: {s:?}"))
    })
}

/// Format a field element as lowercase `0x` hex without leading zeros (`0x0` for zero).
pub fn field_to_hex(element: &FieldElement) -> String {
    let mut bytes = element.to_repr().as_ref().to_vec();
    bytes.reverse();
    let encoded = hex::encode(bytes);
    let trimmed = encoded.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{trimmed}")
    }
}

/// Decompose `index` into `depth` bits, least-significant bit first.
pub fn index_to_bits_le(index: u64, depth: usize) -> Vec<bool> {
    (0..depth)
        .map(|j| j < 64 && (index >> j) & 1 == 1)
        .collect()
}

/// Recombine least-significant-first bits into an index.
pub fn bits_to_index(bits: &[bool]) -> u64 {
    bits.iter()
        .enumerate()
        .filter(|(_, bit)| **bit)
        .fold(0u64, |acc, (j, _)| acc | (1u64 << j))
}

/// Whether `index` is addressable in a tree of the given depth.
pub fn index_fits_depth(index: u64, depth: u32) -> bool {
    depth >= 64 || index < (1u64 << depth)
}
