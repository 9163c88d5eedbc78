//! # Linear objective
//!
//! A constraint expression that also contributes to the objective function spreads its weight
//! over its variables. The expression is then only a constraint, which the other rules can
//! simplify without having to keep track of its contribution to the objective.
use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::data::model::entity::Weighted;
use crate::data::model::expression::Expression;
use crate::data::model::presolve::{Change, Presolver, Workspace};

/// Moves the weight of a linear constraint expression onto its variables.
#[derive(Copy, Clone, Debug, Default)]
pub struct LinearObjective;

impl Presolver for LinearObjective {
    fn name(&self) -> &str {
        "LinearObjective"
    }

    fn execution_order(&self) -> i32 {
        10
    }

    fn simplify(
        &self,
        expression: &mut Expression,
        _remaining: &BTreeSet<usize>,
        _lower: Option<Decimal>,
        _upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change {
        let Some(weight) = expression.contribution_weight() else {
            return Change::None;
        };
        if !expression.is_function_linear() {
            return Change::None;
        }

        let mut weights = Vec::with_capacity(expression.count_linear_factors());
        for (&j, &factor) in expression.linear_factors() {
            let current = workspace.variable(j).contribution_weight().unwrap_or_default();
            let Some(total) = weight.checked_mul(factor).and_then(|contribution| current.checked_add(contribution)) else {
                return Change::None;
            };
            weights.push((j, total));
        }
        for (j, total) in weights {
            workspace.set_weight(j, total);
        }
        expression.weight(None::<Decimal>);

        // The bounds didn't change.
        Change::NotMeaningful
    }
}
