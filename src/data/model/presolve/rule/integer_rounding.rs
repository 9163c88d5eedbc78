//! # Integer rounding
//!
//! A constraint with only integer variables and integer factors can only attain integer values,
//! so its bounds can be rounded towards each other.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::entity::Bounded;
use crate::data::model::expression::Expression;
use crate::data::model::presolve::{Change, Presolver, Workspace};

/// Rounds the bounds of all-integer constraints.
#[derive(Copy, Clone, Debug, Default)]
pub struct IntegerRounding;

impl Presolver for IntegerRounding {
    fn name(&self) -> &str {
        "IntegerRounding"
    }

    fn execution_order(&self) -> i32 {
        20
    }

    fn simplify(
        &self,
        expression: &mut Expression,
        remaining: &BTreeSet<usize>,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change {
        if remaining.is_empty() {
            return Change::None;
        }
        let is_all_integer = remaining.iter().all(|&j| {
            workspace.variable(j).is_integer() && expression.linear_factors()[&j].fract().is_zero()
        });
        if !is_all_integer {
            return Change::None;
        }

        let context = workspace.context();
        let rounded_lower = lower.map(|lower| context.ceil(lower));
        let rounded_upper = upper.map(|upper| context.floor(upper));
        if rounded_lower.zip(rounded_upper).is_some_and(|(lower, upper)| lower > upper) {
            expression.mark_infeasible();
            return Change::Meaningful;
        }

        // The fixed variables contribute what the compensation took away
        let shift = |original: Option<Decimal>, compensated: Option<Decimal>, rounded: Option<Decimal>| {
            match (original, compensated, rounded) {
                (Some(original), Some(compensated), Some(rounded)) => original.checked_sub(compensated)
                    .and_then(|constant| rounded.checked_add(constant))
                    .map(Some),
                _ => Some(original),
            }
        };
        let (Some(new_lower), Some(new_upper)) = (
            shift(expression.lower_limit(), lower, rounded_lower),
            shift(expression.upper_limit(), upper, rounded_upper),
        ) else {
            return Change::None;
        };

        if new_lower == expression.lower_limit() && new_upper == expression.upper_limit() {
            return Change::None;
        }

        expression.lower(new_lower).upper(new_upper);
        Change::Meaningful
    }
}
