//! # Zero, one or two remaining variables
//!
//! Constraints on few variables are simple enough to resolve exactly. Without variables, the
//! constraint is either always or never satisfied. With a single variable, it is a bound on that
//! variable. With two variables, each variable is bounded by the constraint bounds minus the range
//! of the other term.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::elements::{BoundDirection, NonZeroSign};
use crate::data::model::expression::Expression;
use crate::data::model::presolve::{BoundChange, Change, Presolver, Workspace};
use crate::data::model::presolve::rule::term_range;

/// Resolves constraints on at most two variables that are not fixed.
#[derive(Copy, Clone, Debug, Default)]
pub struct ZeroOneTwo;

impl Presolver for ZeroOneTwo {
    fn name(&self) -> &str {
        "ZeroOneTwo"
    }

    fn execution_order(&self) -> i32 {
        30
    }

    fn simplify(
        &self,
        expression: &mut Expression,
        remaining: &BTreeSet<usize>,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change {
        let mut variables = remaining.iter().copied();
        match (variables.next(), variables.next(), variables.next()) {
            (None, _, _) => do_case_0(expression, lower, upper, workspace),
            (Some(j), None, _) => do_case_1(expression, j, lower, upper, workspace),
            (Some(j), Some(k), None) => do_case_2(expression, j, k, lower, upper, workspace),
            _ => Change::None,
        }
    }
}

/// All variables are fixed: the constraint is redundant or infeasible.
fn do_case_0(
    expression: &mut Expression,
    lower: Option<Decimal>,
    upper: Option<Decimal>,
    workspace: &Workspace<'_>,
) -> Change {
    let context = workspace.context();
    let is_below = lower.is_some_and(|lower| context.is_less(Decimal::ZERO, lower));
    let is_above = upper.is_some_and(|upper| context.is_less(upper, Decimal::ZERO));

    if is_below || is_above {
        expression.mark_infeasible();
    }
    expression.mark_redundant();

    Change::Meaningful
}

/// A single variable remains: the constraint bounds that variable.
///
/// An equality fixes the variable, after checking that the value is allowed by the bounds of the
/// variable. Otherwise, the implied bounds are intersected with the existing ones. Either way, the
/// constraint is implied by the bounds of the variable afterwards.
fn do_case_1(
    expression: &mut Expression,
    j: usize,
    lower: Option<Decimal>,
    upper: Option<Decimal>,
    workspace: &mut Workspace<'_>,
) -> Change {
    let factor = expression.linear_factors()[&j];
    let context = *workspace.context();

    let results = match (lower, upper) {
        (Some(lower), Some(upper)) if lower == upper => {
            let Some(value) = lower.checked_div(factor) else {
                return Change::None;
            };
            vec![workspace.fix(j, value)]
        },
        _ => {
            let sign = NonZeroSign::from(&factor);
            [BoundDirection::Lower, BoundDirection::Upper].into_iter()
                .filter_map(|direction| {
                    let bound = match direction * sign {
                        BoundDirection::Lower => lower,
                        BoundDirection::Upper => upper,
                    }?;
                    let value = bound.checked_div(factor)?;
                    let value = match direction {
                        BoundDirection::Lower => context.loosen_lower(value),
                        BoundDirection::Upper => context.loosen_upper(value),
                    };
                    Some((direction, value))
                })
                .map(|(direction, value)| workspace.tighten(j, direction, value))
                .collect()
        },
    };

    if results.contains(&BoundChange::Infeasible) {
        expression.mark_infeasible();
    }
    expression.mark_redundant();

    Change::Meaningful
}

/// Two variables remain: bound each by the constraint bounds minus the range of the other term.
///
/// For `a x + b y` within `[L, U]`, the term `a x` lies within `[L - max(b y), U - min(b y)]`.
/// Dividing by `a` gives bounds on `x`, swapped if `a` is negative. The second variable uses the
/// bounds of the first as they are after tightening.
fn do_case_2(
    expression: &mut Expression,
    j: usize,
    k: usize,
    lower: Option<Decimal>,
    upper: Option<Decimal>,
    workspace: &mut Workspace<'_>,
) -> Change {
    let factors = expression.linear_factors();
    let (a, b) = (factors[&j], factors[&k]);

    // Even the best case of both terms together doesn't reach the bounds
    let (j_min, j_max) = term_range(a, workspace.variable(j));
    let (k_min, k_max) = term_range(b, workspace.variable(k));
    let context = *workspace.context();
    let maximum = j_max.zip(k_max).and_then(|(j_max, k_max)| j_max.checked_add(k_max));
    let minimum = j_min.zip(k_min).and_then(|(j_min, k_min)| j_min.checked_add(k_min));
    let too_low = lower.zip(maximum).is_some_and(|(lower, maximum)| context.is_less(maximum, lower));
    let too_high = upper.zip(minimum).is_some_and(|(upper, minimum)| context.is_less(upper, minimum));
    if too_low || too_high {
        expression.mark_infeasible();
        return Change::Meaningful;
    }

    let mut results = tighten_against(j, a, (k_min, k_max), lower, upper, workspace);
    if !results.contains(&BoundChange::Infeasible) {
        let updated = term_range(a, workspace.variable(j));
        results.extend(tighten_against(k, b, updated, lower, upper, workspace));
    }

    if results.contains(&BoundChange::Infeasible) {
        expression.mark_infeasible();
    }
    results.into_iter().map(BoundChange::change).max().unwrap_or(Change::None)
}

/// Tighten the bounds of `x` in `factor * x + other` within `[lower, upper]`.
///
/// # Arguments
///
/// * `j`: Index of `x`.
/// * `factor`: Non-zero factor of `x`.
/// * `other`: Range of the other term.
/// * `lower`: Lower bound of the constraint, if any.
/// * `upper`: Upper bound of the constraint, if any.
fn tighten_against(
    j: usize,
    factor: Decimal,
    (other_min, other_max): (Option<Decimal>, Option<Decimal>),
    lower: Option<Decimal>,
    upper: Option<Decimal>,
    workspace: &mut Workspace<'_>,
) -> Vec<BoundChange> {
    let context = *workspace.context();
    let term_lower = lower.zip(other_max).and_then(|(lower, other_max)| lower.checked_sub(other_max));
    let term_upper = upper.zip(other_min).and_then(|(upper, other_min)| upper.checked_sub(other_min));

    let sign = NonZeroSign::from(&factor);
    let mut results = Vec::with_capacity(2);
    for direction in [BoundDirection::Lower, BoundDirection::Upper] {
        let term_bound = match direction * sign {
            BoundDirection::Lower => term_lower,
            BoundDirection::Upper => term_upper,
        };
        let Some(value) = term_bound.and_then(|bound| bound.checked_div(factor)) else {
            continue;
        };
        let value = match direction {
            BoundDirection::Lower => context.loosen_lower(value),
            BoundDirection::Upper => context.loosen_upper(value),
        };

        results.push(workspace.tighten(j, direction, value));
    }

    results
}
