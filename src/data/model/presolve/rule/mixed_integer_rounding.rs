//! # Mixed integer rounding
//!
//! An equality `sum a_j x_j = b` over non-negative integer variables with a fractional `b` admits
//! a cut. With `f = b - floor(b)` and `f_j = a_j - floor(a_j)`, every integer solution satisfies
//!
//! `sum min(f_j / f, (1 - f_j) / (1 - f)) x_j >= 1`.
//!
//! The cut is added to the model as a new expression named after the equality it came from.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::entity::Bounded;
use crate::data::model::expression::Expression;
use crate::data::model::presolve::{Change, Presolver, Workspace};

/// Suffix of the name of a cut, appended to the name of the equality.
const SUFFIX: &str = "_MIR";

/// Derives a cut from an equality on non-negative integer variables.
#[derive(Copy, Clone, Debug, Default)]
pub struct MixedIntegerRounding;

impl Presolver for MixedIntegerRounding {
    fn name(&self) -> &str {
        "MixedIntegerRounding"
    }

    fn execution_order(&self) -> i32 {
        60
    }

    fn simplify(
        &self,
        expression: &mut Expression,
        remaining: &BTreeSet<usize>,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change {
        let level = match (lower, upper) {
            (Some(lower), Some(upper)) if lower == upper => lower,
            _ => return Change::None,
        };
        let is_applicable = !remaining.is_empty() && remaining.iter().all(|&j| {
            let variable = workspace.variable(j);
            variable.is_integer() && variable.lower_limit().is_some_and(|lower| !lower.is_sign_negative() || lower.is_zero())
        });
        if !is_applicable {
            return Change::None;
        }

        let context = *workspace.context();
        let fraction = level - level.floor();
        if context.is_zero(fraction) || context.is_zero(Decimal::ONE - fraction) {
            return Change::None;
        }

        let name = format!("{}{}", expression.name(), SUFFIX);
        if workspace.is_name_taken(&name) {
            return Change::None;
        }

        let mut cut = Expression::new(name);
        for &j in remaining {
            let factor = expression.linear_factors()[&j];
            let factor_fraction = factor - factor.floor();
            let coefficient = match (
                factor_fraction.checked_div(fraction),
                (Decimal::ONE - factor_fraction).checked_div(Decimal::ONE - fraction),
            ) {
                (Some(below), Some(above)) => below.min(above),
                _ => return Change::None,
            };
            // Rounding up only weakens the cut
            cut.set_linear(j, context.loosen_upper(coefficient));
        }

        if cut.is_function_constant() {
            // Integer factors times integer variables can't reach a fractional level.
            expression.mark_infeasible();
            return Change::Meaningful;
        }

        cut.lower(Decimal::ONE);
        if workspace.add_cut(cut) {
            Change::Meaningful
        } else {
            Change::None
        }
    }
}
