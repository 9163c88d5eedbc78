//! # Redundant constraints
//!
//! Interval arithmetic over the bounds of the remaining variables gives the range of values the
//! constraint can attain. If that range lies within the bounds, the constraint can be dropped. If
//! it lies outside of them, the model is infeasible.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::expression::Expression;
use crate::data::model::presolve::{Change, Presolver, Workspace};
use crate::data::model::presolve::rule::activity_range;

/// Detects constraints that are always or never satisfied.
#[derive(Copy, Clone, Debug, Default)]
pub struct RedundantConstraint;

impl Presolver for RedundantConstraint {
    fn name(&self) -> &str {
        "RedundantConstraint"
    }

    fn execution_order(&self) -> i32 {
        50
    }

    fn simplify(
        &self,
        expression: &mut Expression,
        remaining: &BTreeSet<usize>,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change {
        let context = workspace.context();
        let (minimum, maximum) = activity_range(expression, remaining, workspace.variables());

        let too_high = upper.zip(minimum).is_some_and(|(upper, minimum)| context.is_less(upper, minimum));
        let too_low = lower.zip(maximum).is_some_and(|(lower, maximum)| context.is_less(maximum, lower));
        if too_high || too_low {
            expression.mark_infeasible();
            return Change::Meaningful;
        }

        let lower_holds = lower.is_none_or(|lower| minimum.is_some_and(|minimum| context.is_greater_or_equal(minimum, lower)));
        let upper_holds = upper.is_none_or(|upper| maximum.is_some_and(|maximum| context.is_less_or_equal(maximum, upper)));
        if lower_holds && upper_holds {
            expression.mark_redundant();
            return Change::Meaningful;
        }

        Change::None
    }
}
