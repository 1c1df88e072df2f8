//! Shared hashing logic for the native code and the circuit.
//!
//! The node hash and the input hash are computed here for witness generation and
//! test-parameter construction; the circuit gadgets reproduce the same sponge
//! calls so the two can never diverge.

use crate::FieldElement;
use generic_array::typenum::U2;
use nova_snark::frontend::gadgets::poseidon::{
    IOPattern, PoseidonConstants, Simplex, Sponge, SpongeAPI, SpongeOp, SpongeTrait, Strength,
};
use once_cell::sync::Lazy;

/// Cached Poseidon constants for performance
static POSEIDON_CONSTANTS: Lazy<PoseidonConstants<FieldElement, U2>> =
    Lazy::new(|| Sponge::<FieldElement, U2>::api_constants(Strength::Standard));

/// Cached IO pattern for 3-input (tag + 2 data elements), 1-output hashing
static IO_PATTERN_3: Lazy<IOPattern> =
    Lazy::new(|| IOPattern(vec![SpongeOp::Absorb(3), SpongeOp::Squeeze(1)]));

/// Domain separation tag values
mod tag_values {
    pub const NODE: u64 = 2;
    pub const INPUT_HASH: u64 = 11;
}

/// Domain separation tags for different Poseidon hash contexts
pub mod domain_tags {
    use super::tag_values;
    use ff::PrimeField;

    /// Tag for hashing internal Merkle tree nodes
    pub fn node<F: PrimeField>() -> F {
        F::from(tag_values::NODE)
    }

    /// Tag for folding public values into the input hash
    pub fn input_hash<F: PrimeField>() -> F {
        F::from(tag_values::INPUT_HASH)
    }
}

/// Domain-separated Poseidon hash: a single sponge absorbing `[tag, x, y]`.
pub fn poseidon_hash_tagged(tag: FieldElement, x: FieldElement, y: FieldElement) -> FieldElement {
    let mut sponge = Sponge::<FieldElement, U2>::new_with_constants(&POSEIDON_CONSTANTS, Simplex);
    let mut acc = ();
    sponge.start(IO_PATTERN_3.clone(), None, &mut acc);
    SpongeAPI::absorb(&mut sponge, 3, &[tag, x, y], &mut acc);
    let output = SpongeAPI::squeeze(&mut sponge, 1, &mut acc);
    sponge
        .finish(&mut acc)
        .expect("Poseidon sponge finish should not fail");

    output[0]
}

/// Merkle node combination: `node(left, right) = H(T_NODE, left, right)`.
pub fn hash_node(left: FieldElement, right: FieldElement) -> FieldElement {
    poseidon_hash_tagged(domain_tags::node(), left, right)
}

/// Bind every public value of a batch into one field element.
///
/// `h = H(T_IN, start_index, pre_root)`, then `post_root` and each commitment in
/// order are folded in as `h = H(T_IN, h, value)`.
pub fn compute_input_hash(
    start_index: u64,
    pre_root: FieldElement,
    post_root: FieldElement,
    commitments: &[FieldElement],
) -> FieldElement {
    let tag = domain_tags::input_hash();
    let mut acc = poseidon_hash_tagged(tag, FieldElement::from(start_index), pre_root);
    acc = poseidon_hash_tagged(tag, acc, post_root);
    for commitment in commitments {
        acc = poseidon_hash_tagged(tag, acc, *commitment);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_separation() {
        let x = FieldElement::from(42u64);
        let y = FieldElement::from(123u64);

        let h_node = poseidon_hash_tagged(domain_tags::node(), x, y);
        let h_input = poseidon_hash_tagged(domain_tags::input_hash(), x, y);

        assert_ne!(h_node, h_input, "node and input-hash tags should differ");
        assert_eq!(h_node, hash_node(x, y));
    }

    #[test]
    fn test_node_hash_is_order_sensitive() {
        let a = FieldElement::from(1u64);
        let b = FieldElement::from(2u64);
        assert_ne!(hash_node(a, b), hash_node(b, a));
    }

    #[test]
    fn test_input_hash_binds_every_field() {
        let pre = FieldElement::from(10u64);
        let post = FieldElement::from(20u64);
        let commitments = vec![FieldElement::from(1u64), FieldElement::from(2u64)];
        let base = compute_input_hash(0, pre, post, &commitments);

        assert_eq!(base, compute_input_hash(0, pre, post, &commitments));
        assert_ne!(base, compute_input_hash(1, pre, post, &commitments));
        assert_ne!(base, compute_input_hash(0, post, pre, &commitments));
        assert_ne!(
            base,
            compute_input_hash(0, pre, post, &[commitments[1], commitments[0]])
        );
        assert_ne!(base, compute_input_hash(0, pre, post, &commitments[..1]));
    }
}
