//! Branchless selection gadgets.
//!
//! Both slots of a path round are filled by arithmetic selects so the emitted
//! constraints are identical whatever the direction bit is.

use ff::PrimeField;
use nova_snark::frontend::{
    gadgets::{boolean::Boolean, num::AllocatedNum},
    ConstraintSystem, SynthesisError,
};

/// Conditionally selects between two AllocatedNums based on a Boolean condition.
/// If condition is false, returns `if_false`. If condition is true, returns `if_true`.
pub fn conditional_select<F: PrimeField, CS: ConstraintSystem<F>>(
    mut cs: CS,
    condition: &Boolean,
    if_false: &AllocatedNum<F>,
    if_true: &AllocatedNum<F>,
) -> Result<AllocatedNum<F>, SynthesisError> {
    let result = AllocatedNum::alloc(cs.namespace(|| "select_result"), || {
        let pick_true = condition
            .get_value()
            .ok_or(SynthesisError::AssignmentMissing)?;
        let picked = if pick_true { if_true } else { if_false };
        picked.get_value().ok_or(SynthesisError::AssignmentMissing)
    })?;

    // result - if_false = condition * (if_true - if_false)
    cs.enforce(
        || "select_constraint",
        |lc| lc + &condition.lc(CS::one(), F::ONE),
        |lc| lc + if_true.get_variable() - if_false.get_variable(),
        |lc| lc + result.get_variable() - if_false.get_variable(),
    );

    Ok(result)
}

/// Orders `(current, sibling)` into `(left, right)`.
///
/// `swap = false` yields `(current, sibling)`, `swap = true` yields
/// `(sibling, current)`. Two independent selects, one per slot.
pub fn ordered_pair<F: PrimeField, CS: ConstraintSystem<F>>(
    mut cs: CS,
    swap: &Boolean,
    current: &AllocatedNum<F>,
    sibling: &AllocatedNum<F>,
) -> Result<(AllocatedNum<F>, AllocatedNum<F>), SynthesisError> {
    let left = conditional_select(cs.namespace(|| "left"), swap, current, sibling)?;
    let right = conditional_select(cs.namespace(|| "right"), swap, sibling, current)?;
    Ok((left, right))
}
