//! # Presolve rules
//!
//! Each rule is a unit struct implementing `Presolver`. The standard set contains all of them,
//! ordered by their execution order.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::entity::Bounded;
use crate::data::model::expression::Expression;
use crate::data::model::variable::Variable;

pub use integer_rounding::IntegerRounding;
pub use linear_objective::LinearObjective;
pub use mixed_integer_rounding::MixedIntegerRounding;
pub use redundant::RedundantConstraint;
pub use sign_only::SignOnly;
pub use zero_one_two::ZeroOneTwo;

mod integer_rounding;
mod linear_objective;
mod mixed_integer_rounding;
mod redundant;
mod sign_only;
mod zero_one_two;

/// Range of values a term `factor * x` can take on the bounds of `x`.
///
/// A fixed `x` only takes its fixed value. A missing bound of `x`, or a product that a decimal
/// can't hold, makes the corresponding side of the range missing.
fn term_range(factor: Decimal, variable: &Variable) -> (Option<Decimal>, Option<Decimal>) {
    let (lower, upper) = match variable.fixed_value() {
        Some(value) => (Some(value), Some(value)),
        None => (variable.lower_limit(), variable.upper_limit()),
    };
    let lower = lower.and_then(|bound| factor.checked_mul(bound));
    let upper = upper.and_then(|bound| factor.checked_mul(bound));

    if factor.is_sign_positive() {
        (lower, upper)
    } else {
        (upper, lower)
    }
}

/// Range of values the linear part of an expression can take, restricted to some variables.
///
/// This is the activity range of the constraint: the sum of the term ranges. A side is missing
/// when one of the terms misses it or when the sum overflows.
fn activity_range(
    expression: &Expression,
    subset: &BTreeSet<usize>,
    variables: &[Variable],
) -> (Option<Decimal>, Option<Decimal>) {
    subset.iter()
        .filter_map(|&j| expression.linear_factors().get(&j).map(|&factor| term_range(factor, &variables[j])))
        .fold((Some(Decimal::ZERO), Some(Decimal::ZERO)), |(lower, upper), (term_lower, term_upper)| {
            (
                lower.zip(term_lower).and_then(|(total, term)| total.checked_add(term)),
                upper.zip(term_upper).and_then(|(total, term)| total.checked_add(term)),
            )
        })
}
