//! # Workspace
//!
//! Rules don't own the variables of the model, they receive a `Workspace` through which they read
//! them and propose changes. Every change is checked here before it is applied: bounds only ever
//! get tighter and a variable whose bounds cross is flagged instead of modified.
use std::collections::{BTreeSet, HashMap};

use log::trace;
use rust_decimal::Decimal;

use crate::data::model::elements::BoundDirection;
use crate::data::model::entity::{Bounded, Weighted};
use crate::data::model::expression::Expression;
use crate::data::model::presolve::Change;
use crate::data::model::variable::Variable;
use crate::data::number_types::NumberContext;

/// Access to the variables of a model during presolving.
#[derive(Debug)]
pub struct Workspace<'a> {
    variables: &'a mut [Variable],
    context: NumberContext,
    /// Names of expressions already in the model, new cuts can't reuse them.
    names: &'a HashMap<String, usize>,

    /// Expressions to add to the model once the current rule is done.
    cuts: Vec<Expression>,
    /// Variables whose bounds or fixed value changed.
    touched: BTreeSet<usize>,
    /// Whether anything changed that doesn't show in `touched`, such as a weight.
    modified: bool,
}

/// Effect of a single bound change on a variable.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BoundChange {
    /// The proposed bound was not tighter than the existing one.
    None,
    /// The bound was tightened.
    Tightened,
    /// The bounds collapsed, the variable is now fixed.
    Fixed,
    /// The bounds crossed, the variable is flagged infeasible.
    Infeasible,
}

impl BoundChange {
    /// Fixing a variable or proving infeasibility is meaningful, a tighter bound is not.
    pub fn change(self) -> Change {
        match self {
            BoundChange::None => Change::None,
            BoundChange::Tightened => Change::NotMeaningful,
            BoundChange::Fixed | BoundChange::Infeasible => Change::Meaningful,
        }
    }
}

impl<'a> Workspace<'a> {
    pub(crate) fn new(
        variables: &'a mut [Variable],
        context: NumberContext,
        names: &'a HashMap<String, usize>,
    ) -> Self {
        Self {
            variables,
            context,
            names,

            cuts: Vec::new(),
            touched: BTreeSet::new(),
            modified: false,
        }
    }

    /// Working precision of the feasibility checks.
    pub fn context(&self) -> &NumberContext {
        &self.context
    }

    #[allow(missing_docs)]
    pub fn variable(&self, index: usize) -> &Variable {
        &self.variables[index]
    }

    /// All variables of the model.
    pub fn variables(&self) -> &[Variable] {
        self.variables
    }

    /// Propose a new bound for a variable.
    ///
    /// Bounds of integer variables are rounded to an integer first. The bound is only applied
    /// when it is tighter than the current one by more than the tolerance. When the new bound and
    /// the opposite bound have a common level, the variable is fixed at that level.
    ///
    /// # Arguments
    ///
    /// * `index`: Variable to tighten.
    /// * `direction`: Which of its bounds.
    /// * `value`: The proposed bound, already rounded such that no feasible point is excluded.
    ///
    /// # Return value
    ///
    /// What happened to the variable.
    pub fn tighten(&mut self, index: usize, direction: BoundDirection, value: Decimal) -> BoundChange {
        let context = self.context;
        let variable = &mut self.variables[index];
        if variable.is_infeasible() {
            return BoundChange::None;
        }

        let value = match (variable.is_integer(), direction) {
            (true, BoundDirection::Lower) => context.ceil(value),
            (true, BoundDirection::Upper) => context.floor(value),
            (false, _) => value,
        };

        if let Some(fixed) = variable.fixed_value() {
            let is_violated = match direction {
                BoundDirection::Lower => context.is_less(fixed, value),
                BoundDirection::Upper => context.is_less(value, fixed),
            };
            if is_violated {
                trace!("Fixed value {} of {} violates the bound {}", fixed, variable.name(), value);
                variable.mark_infeasible();
                self.touched.insert(index);
                return BoundChange::Infeasible;
            }
            return BoundChange::None;
        }

        let is_tighter = match (direction, variable.limits().bound(direction)) {
            (_, None) => true,
            (BoundDirection::Lower, Some(current)) => context.is_less(current, value),
            (BoundDirection::Upper, Some(current)) => context.is_less(value, current),
        };
        if !is_tighter {
            return BoundChange::None;
        }

        let opposite = variable.limits().bound(!direction);
        if let Some(opposite) = opposite {
            let (lower, upper) = match direction {
                BoundDirection::Lower => (value, opposite),
                BoundDirection::Upper => (opposite, value),
            };

            if context.is_less(upper, lower) {
                trace!("Bounds of {} cross: {} > {}", variable.name(), lower, upper);
                variable.mark_infeasible();
                self.touched.insert(index);
                return BoundChange::Infeasible;
            }
            if let Some(level) = context.common_level(lower, upper).or((lower > upper).then_some(upper)) {
                variable.fix(level);
                self.touched.insert(index);
                return BoundChange::Fixed;
            }
        }

        variable.limits_mut().set_bound(direction, Some(value));
        self.touched.insert(index);
        BoundChange::Tightened
    }

    /// Fix a variable at a value.
    ///
    /// The value is checked against the bounds of the variable and, for integer variables, against
    /// integrality. If either check fails, the variable is flagged infeasible.
    pub fn fix(&mut self, index: usize, value: Decimal) -> BoundChange {
        let context = self.context;
        let variable = &mut self.variables[index];
        if variable.is_infeasible() {
            return BoundChange::None;
        }
        if let Some(current) = variable.fixed_value() {
            if context.is_equal(current, value) {
                return BoundChange::None;
            }
        }

        self.touched.insert(index);
        let value = if variable.is_integer() {
            if !context.is_integral(value) {
                variable.mark_infeasible();
                return BoundChange::Infeasible;
            }
            context.enforce(value).round()
        } else {
            value
        };

        if variable.is_fixed() || !variable.validate(value, &context, &mut Vec::<String>::new()) {
            trace!("Variable {} can't be fixed at {}", variable.name(), value);
            variable.mark_infeasible();
            return BoundChange::Infeasible;
        }

        variable.fix(value);
        BoundChange::Fixed
    }

    /// Replace the objective weight of a variable.
    pub fn set_weight(&mut self, index: usize, weight: Decimal) {
        self.variables[index].weight(weight);
        self.modified = true;
    }

    /// Propose a new expression, such as a cut.
    ///
    /// # Return value
    ///
    /// Whether it was accepted: the name should not be in use yet.
    pub fn add_cut(&mut self, cut: Expression) -> bool {
        if self.is_name_taken(cut.name()) {
            return false;
        }

        self.cuts.push(cut);
        true
    }

    /// Whether a name is used by an expression in the model or by a proposed cut.
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.names.contains_key(name) || self.cuts.iter().any(|cut| cut.name() == name)
    }

    /// Consume the workspace, returning the proposed cuts, the touched variables and whether
    /// anything else changed.
    pub(crate) fn finish(self) -> (Vec<Expression>, BTreeSet<usize>, bool) {
        (self.cuts, self.touched, self.modified)
    }
}
