//! # Presolving models
//!
//! Before a model is handed to a solver, it is simplified. Variables with collapsed bounds or no
//! references are fixed, after which a queue of constraint expressions is processed until nothing
//! changes anymore. Each expression is offered to a set of rules, which can tighten the bounds of
//! its variables, fix them, or mark the expression redundant or infeasible.
//!
//! Rules only ever make bounds tighter, and they round derived bounds such that no feasible point
//! is cut off.
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use fifo_set::FIFOSet;
use log::{debug, info, trace};
use rust_decimal::Decimal;

use crate::data::model::ExpressionsBasedModel;
use crate::data::model::elements::Objective;
use crate::data::model::entity::{Bounded, Weighted};
use crate::data::model::expression::Expression;
use crate::data::model::variable::Variable;
use crate::data::number_types::NumberContext;

pub use workspace::{BoundChange, Workspace};

pub mod rule;
mod workspace;

/// Whether a change that was made was "meaningful".
///
/// Bounds can be tightened over and over by ever smaller amounts without converging. Fixing a
/// variable, removing a constraint or proving infeasibility on the other hand makes the problem
/// simpler. Only a limited number of consecutive changes that are not meaningful is allowed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Change {
    /// Nothing changed.
    None,
    /// A bound was tightened.
    NotMeaningful,
    /// A variable was fixed, an expression became redundant or infeasible, or a cut was added.
    Meaningful,
}

/// A simplification rule.
///
/// Rules are stateless: everything they need is passed to `simplify`.
pub trait Presolver: Debug {
    /// Name, used to remove a rule from a set.
    fn name(&self) -> &str;

    /// Rules with a lower value are applied first.
    fn execution_order(&self) -> i32;

    /// Attempt to simplify a single constraint expression.
    ///
    /// # Arguments
    ///
    /// * `expression`: Linear constraint expression that is neither infeasible nor redundant.
    /// * `remaining`: Indices of its variables that are not fixed.
    /// * `lower`: Lower bound of the expression, compensated for the fixed variables.
    /// * `upper`: Upper bound of the expression, compensated for the fixed variables.
    /// * `workspace`: Access to the variables.
    ///
    /// # Return value
    ///
    /// What kind of change was made, if any.
    fn simplify(
        &self,
        expression: &mut Expression,
        remaining: &BTreeSet<usize>,
        lower: Option<Decimal>,
        upper: Option<Decimal>,
        workspace: &mut Workspace<'_>,
    ) -> Change;
}

/// Ordered collection of rules.
#[derive(Debug, Default)]
pub struct PresolverSet {
    presolvers: Vec<Box<dyn Presolver>>,
}

impl PresolverSet {
    /// A set without rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// All rules provided by this crate.
    pub fn standard() -> Self {
        let mut set = Self::empty();
        set.add(rule::LinearObjective)
            .add(rule::IntegerRounding)
            .add(rule::ZeroOneTwo)
            .add(rule::SignOnly)
            .add(rule::RedundantConstraint)
            .add(rule::MixedIntegerRounding);
        set
    }

    /// Add a rule, replacing any rule with the same name.
    ///
    /// Rules with the same execution order are applied in the order in which they were added.
    pub fn add(&mut self, presolver: impl Presolver + 'static) -> &mut Self {
        self.remove(presolver.name());
        let position = self.presolvers
            .partition_point(|existing| existing.execution_order() <= presolver.execution_order());
        self.presolvers.insert(position, Box::new(presolver));
        self
    }

    /// Remove a rule by name.
    ///
    /// # Return value
    ///
    /// Whether a rule with that name was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.presolvers.len();
        self.presolvers.retain(|presolver| presolver.name() != name);
        self.presolvers.len() < before
    }

    /// Remove all rules.
    pub fn clear(&mut self) {
        self.presolvers.clear();
    }

    /// Rules in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Presolver + 'static)> {
        self.presolvers.iter().map(Box::as_ref)
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.presolvers.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.presolvers.is_empty()
    }
}

/// Numbers describing a single presolve run, for logging.
#[derive(Debug, Default)]
struct Counters {
    steps: usize,
    meaningful: usize,
    cuts: usize,
}

impl ExpressionsBasedModel {
    /// Simplify the model.
    ///
    /// Fixes variables whose bounds collapse, fixes variables that are not referenced by any
    /// expression, and then applies the rules of the presolver set to the constraint expressions
    /// until nothing changes anymore. Expressions with quadratic factors are left alone.
    ///
    /// The value of an unreferenced variable depends on the objective. It is derived again on
    /// every run, such that a change of direction or weight is picked up.
    ///
    /// Running presolve twice has the same effect as running it once.
    ///
    /// # Panics
    ///
    /// If the model fails `check`.
    pub fn presolve(&mut self) {
        if let Err(error) = self.check() {
            panic!("Can't presolve an invalid model: {}", error);
        }

        let Self { variables, expressions, names, objective, options, .. } = self;
        let context = options.feasibility;

        // Fixings that depend on the objective are derived again from scratch
        let before = variables.iter()
            .map(|variable| (variable.fixed_value(), variable.is_unbounded()))
            .collect::<Vec<_>>();
        release(variables);
        let mut changed = presolve_variables(variables, &context);
        presolve_unreferenced(variables, expressions, *objective);
        changed |= variables.iter().zip(&before)
            .any(|(variable, &previous)| (variable.fixed_value(), variable.is_unbounded()) != previous);

        let mut incidence = vec![Vec::new(); variables.len()];
        for (i, expression) in expressions.iter().enumerate() {
            for j in expression.linear_variables() {
                incidence[j].push(i);
            }
        }

        let mut queue = (0..expressions.len())
            .filter(|&i| is_eligible(&expressions[i]))
            .collect::<FIFOSet<_>>();
        let limit = options.tightening_limit.unwrap_or(variables.len() + expressions.len());
        let mut counters = Counters::default();
        let mut idle = 0;

        while let Some(i) = queue.pop() {
            if !is_eligible(&expressions[i]) {
                continue;
            }

            let mut workspace = Workspace::new(variables, context, names);
            let change = simplify(&mut expressions[i], &options.presolvers, &mut workspace);
            let (cuts, touched, modified) = workspace.finish();
            counters.steps += 1;
            changed |= modified || change != Change::None;

            for cut in cuts {
                let index = expressions.len();
                for j in cut.linear_variables() {
                    incidence[j].push(index);
                }
                names.insert(cut.name().to_string(), index);
                expressions.push(cut);
                queue.push(index);
                counters.cuts += 1;
            }
            for j in touched {
                for &k in &incidence[j] {
                    queue.push(k);
                }
            }

            match change {
                Change::Meaningful => {
                    counters.meaningful += 1;
                    idle = 0;
                },
                Change::NotMeaningful => {
                    idle += 1;
                    if idle > limit {
                        debug!("Presolve stopped after {} steps without a meaningful change", idle);
                        break;
                    }
                },
                Change::None => {},
            }
            if change != Change::None {
                queue.push(i);
            }
        }

        info!(
            "Presolve: {} steps, {} meaningful, {} cuts, {} of {} variables fixed, {} of {} expressions redundant",
            counters.steps,
            counters.meaningful,
            counters.cuts,
            variables.iter().filter(|variable| variable.is_fixed()).count(),
            variables.len(),
            expressions.iter().filter(|expression| expression.is_redundant()).count(),
            expressions.len(),
        );

        if changed {
            self.touch();
        }
    }
}

/// Constraint expressions without quadratic factors that presolve didn't settle yet.
fn is_eligible(expression: &Expression) -> bool {
    expression.is_constraint()
        && !expression.is_infeasible()
        && !expression.is_redundant()
        && expression.count_quadratic_factors() == 0
}

/// Offer one expression to each rule in turn.
///
/// Before each rule, the remaining variables and the compensated bounds are derived again, as the
/// previous rule might have fixed variables. A meaningful change ends the turn of the expression.
fn simplify(expression: &mut Expression, presolvers: &PresolverSet, workspace: &mut Workspace<'_>) -> Change {
    let mut overall = Change::None;

    for presolver in presolvers.iter() {
        if expression.is_infeasible() || expression.is_redundant() {
            break;
        }

        let mut fixed = BTreeMap::new();
        let mut remaining = BTreeSet::new();
        for j in expression.linear_variables() {
            match workspace.variable(j).fixed_value() {
                Some(value) => { fixed.insert(j, value); },
                None => { remaining.insert(j); },
            }
        }
        let Some((lower, upper)) = expression.compensated_bounds(&fixed) else {
            debug!("Fixed variables of {} contribute more than a decimal can hold", expression.name());
            break;
        };
        trace!("{} with {} remaining variables, bounds {:?} and {:?}", expression.name(), remaining.len(), lower, upper);

        let change = presolver.simplify(expression, &remaining, lower, upper, workspace);
        if change != Change::None {
            debug!("{} changed {} ({:?})", presolver.name(), expression.name(), change);
        }
        overall = overall.max(change);
        if change == Change::Meaningful {
            break;
        }
    }

    overall
}

/// Round the bounds of integer variables, fix variables with collapsed bounds and flag variables
/// with crossed bounds.
///
/// # Return value
///
/// Whether any variable changed.
fn presolve_variables(variables: &mut [Variable], context: &NumberContext) -> bool {
    let mut changed = false;

    for variable in variables.iter_mut().filter(|variable| !variable.is_fixed() && !variable.is_infeasible()) {
        let (lower, upper) = if variable.is_integer() {
            (variable.lower_limit().map(|lower| context.ceil(lower)), variable.upper_limit().map(|upper| context.floor(upper)))
        } else {
            (variable.lower_limit(), variable.upper_limit())
        };

        if let (Some(lower), Some(upper)) = (lower, upper) {
            if context.is_less(upper, lower) {
                // The bounds are left as they are, such that the model stays consistent
                debug!("Variable {} has crossed bounds {} > {}", variable.name(), lower, upper);
                variable.mark_infeasible();
                changed = true;
                continue;
            }
        }
        if lower != variable.lower_limit() || upper != variable.upper_limit() {
            variable.lower(lower).upper(upper);
            changed = true;
        }

        if let (Some(lower), Some(upper)) = (lower, upper) {
            if let Some(level) = context.common_level(lower, upper) {
                variable.fix(level);
                changed = true;
            }
        }
    }

    changed
}

/// Undo the fixings and unbounded flags of `presolve_unreferenced`.
///
/// # Return value
///
/// Whether any variable changed.
pub(crate) fn release(variables: &mut [Variable]) -> bool {
    variables.iter_mut().fold(false, |changed, variable| variable.release() || changed)
}

/// Fix variables that are not referenced by any expression at their best value.
///
/// Without a weight, that is the feasible value closest to zero. With a weight, it is the bound
/// that the objective pushes the variable to; a variable is flagged unbounded if that bound is
/// missing. These fixings only hold for the current objective, they are provisional.
fn presolve_unreferenced(variables: &mut [Variable], expressions: &[Expression], objective: Objective) {
    let referenced = expressions.iter()
        .flat_map(Expression::referenced_variables)
        .collect::<BTreeSet<_>>();

    for (j, variable) in variables.iter_mut().enumerate() {
        if referenced.contains(&j) || variable.is_fixed() || variable.is_infeasible() {
            continue;
        }

        let best = match variable.contribution_weight() {
            None => Some(variable.feasible_value_nearest_zero()),
            Some(weight) => {
                let wants_lower = weight.is_sign_positive() == (objective == Objective::Minimise);
                if wants_lower { variable.lower_limit() } else { variable.upper_limit() }
            },
        };

        match best {
            Some(value) => variable.fix_provisionally(value),
            None => {
                debug!("Variable {} is unbounded", variable.name());
                variable.mark_unbounded();
            },
        }
    }
}
