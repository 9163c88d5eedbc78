//! # Sign only
//!
//! When every term of a constraint has the same sign on the bounds of its variable, the bound on
//! the other side of zero can only be reached by setting terms to zero. Only the signs of the
//! factors and bounds are used, which makes the rule cheap enough for constraints on many
//! variables.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::expression::Expression;
use crate::data::model::presolve::{BoundChange, Change, Presolver, Workspace};

/// Fixes variables at zero using only signs, for constraints on three or more variables.
#[derive(Copy, Clone, Debug, Default)]
pub struct SignOnly;

impl Presolver for SignOnly {
    fn name(&self) -> &str {
        "SignOnly"
    }

    fn execution_order(&self) -> i32 {
        40
    }

    fn simplify(
        &self,
        expression: &mut Expression,
        remaining: &BTreeSet<usize>,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change {
        if remaining.len() < 3 {
            return Change::None;
        }

        if let Some(upper) = upper {
            if expression.is_positive_on(remaining, workspace.variables()) {
                return do_case_n(expression, remaining, upper, Side::Positive, workspace);
            }
        }
        if let Some(lower) = lower {
            if expression.is_negative_on(remaining, workspace.variables()) {
                return do_case_n(expression, remaining, lower, Side::Negative, workspace);
            }
        }

        Change::None
    }
}

/// Sign of all terms of the constraint.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Side {
    /// All terms are non-negative, the upper bound limits them.
    Positive,
    /// All terms are non-positive, the lower bound limits them.
    Negative,
}

/// Fix variables at zero if the binding bound doesn't leave room for them.
///
/// A bound beyond zero makes the constraint infeasible and a zero bound forces every term to zero.
/// Otherwise, a binary variable is forced to zero if its factor alone exceeds the bound.
///
/// # Arguments
///
/// * `bound`: The compensated upper bound for `Side::Positive`, the lower bound otherwise.
fn do_case_n(
    expression: &mut Expression,
    remaining: &BTreeSet<usize>,
    bound: Decimal,
    side: Side,
    workspace: &mut Workspace<'_>,
) -> Change {
    let context = *workspace.context();
    // Distance from zero in the direction of the terms
    let room = match side {
        Side::Positive => bound,
        Side::Negative => -bound,
    };

    if context.is_less(room, Decimal::ZERO) {
        expression.mark_infeasible();
        return Change::Meaningful;
    }

    let to_fix = if context.is_zero(room) {
        remaining.iter().copied().collect::<Vec<_>>()
    } else {
        remaining.iter()
            .copied()
            .filter(|&j| workspace.variable(j).is_binary())
            .filter(|&j| {
                let factor = expression.linear_factors()[&j];
                let contribution = match side {
                    Side::Positive => factor,
                    Side::Negative => -factor,
                };
                context.is_less(room, contribution)
            })
            .collect()
    };

    let mut change = Change::None;
    for j in to_fix {
        let result = workspace.fix(j, Decimal::ZERO);
        if result == BoundChange::Infeasible {
            expression.mark_infeasible();
        }
        change = change.max(result.change());
    }

    change
}
