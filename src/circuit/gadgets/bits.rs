//! Index decomposition gadget.

use ff::PrimeField;
use nova_snark::frontend::{
    gadgets::{
        boolean::{AllocatedBit, Boolean},
        num::AllocatedNum,
    },
    ConstraintSystem, SynthesisError,
};

/// Decomposes `index` into exactly `depth` boolean bits, least-significant first.
///
/// Each bit is allocated with its boolean constraint, and the bits are bound to
/// the index by `sum(bit_j * 2^j) = index`. An index of `2^depth` or more has no
/// satisfying assignment, so this doubles as the range check `index < 2^depth`.
pub fn decompose_index<F: PrimeField, CS: ConstraintSystem<F>>(
    mut cs: CS,
    index: &AllocatedNum<F>,
    depth: usize,
) -> Result<Vec<Boolean>, SynthesisError> {
    let repr = index.get_value().map(|v| v.to_repr());

    let bits = (0..depth)
        .map(|j| {
            let value = repr.as_ref().map(|r| {
                let bytes = r.as_ref();
                bytes
                    .get(j / 8)
                    .map(|byte| (byte >> (j % 8)) & 1 == 1)
                    .unwrap_or(false)
            });
            AllocatedBit::alloc(cs.namespace(|| format!("bit_{}", j)), value)
        })
        .collect::<Result<Vec<_>, _>>()?;

    cs.enforce(
        || "recompose_index",
        |mut lc| {
            let mut coeff = F::ONE;
            for bit in &bits {
                lc = lc + (coeff, bit.get_variable());
                coeff = coeff.double();
            }
            lc
        },
        |lc| lc + CS::one(),
        |lc| lc + index.get_variable(),
    );

    Ok(bits.into_iter().map(Boolean::Is).collect())
}
