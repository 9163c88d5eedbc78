//! # Solving through an integration
//!
//! A brute force solver for small models with bounded variables: every integer point within the
//! bounds of the free variables is tried.
use std::cell::Cell;
use std::rc::Rc;

use rust_decimal::Decimal;

use relp_model::{Bounded, Expression, ExpressionsBasedModel, Integration, NumberContext, OptimisationResult, Solver, State, UpdatableSolver};

/// # Solve cycle
#[allow(missing_docs)]
mod test;

/// Builds `Enumerator`s and counts how often it did so.
#[derive(Debug)]
pub struct Enumeration {
    builds: Rc<Cell<usize>>,
    updatable: bool,
}

impl Enumeration {
    pub fn new(updatable: bool) -> (Self, Rc<Cell<usize>>) {
        let builds = Rc::new(Cell::new(0));
        (Self { builds: Rc::clone(&builds), updatable }, builds)
    }
}

impl Integration for Enumeration {
    fn name(&self) -> &str {
        "Enumeration"
    }

    fn is_capable(&self, model: &ExpressionsBasedModel) -> bool {
        model.free_variables().iter()
            .map(|&j| &model.variables()[j])
            .all(|variable| variable.lower_limit().is_some() && variable.upper_limit().is_some())
    }

    fn build(&self, model: &ExpressionsBasedModel) -> Box<dyn Solver> {
        self.builds.set(self.builds.get() + 1);

        let columns = model.solver_columns();
        let bounds = columns.iter()
            .map(|&j| {
                let variable = &model.variables()[j];
                (variable.lower_limit().unwrap().ceil(), variable.upper_limit().unwrap().floor())
            })
            .collect();

        Box::new(Enumerator {
            columns,
            bounds,
            template: model.current_solution(),
            constraints: model.expressions().iter()
                .filter(|expression| expression.is_constraint() && !expression.is_redundant())
                .cloned()
                .collect(),
            objective: model.objective_expression(),
            maximise: model.is_maximisation(),
            context: model.options().feasibility,
            updatable: self.updatable,
        })
    }
}

/// Tries all integer points.
pub struct Enumerator {
    /// Model index of each solver variable.
    columns: Vec<usize>,
    /// Integer bounds of each solver variable.
    bounds: Vec<(Decimal, Decimal)>,
    /// Full model solution, providing the values of the variables the solver doesn't know.
    template: Vec<Decimal>,
    constraints: Vec<Expression>,
    objective: Expression,
    maximise: bool,
    context: NumberContext,
    updatable: bool,
}

impl Enumerator {
    fn is_feasible(&self, point: &[Decimal]) -> bool {
        self.constraints.iter()
            .all(|constraint| {
                constraint.evaluate(point)
                    .is_some_and(|value| constraint.validate(value, &self.context, &mut Vec::<String>::new()))
            })
    }

    fn is_better(&self, value: Decimal, best: Option<Decimal>) -> bool {
        match best {
            None => true,
            Some(best) if self.maximise => value > best,
            Some(best) => value < best,
        }
    }
}

impl Solver for Enumerator {
    fn solve(&mut self, _kick_starter: Option<&OptimisationResult>) -> OptimisationResult {
        let mut best: Option<(Decimal, Vec<Decimal>)> = None;

        let mut current = self.bounds.iter().map(|&(lower, _)| lower).collect::<Vec<_>>();
        if self.bounds.iter().any(|&(lower, upper)| lower > upper) {
            return OptimisationResult::of_state(State::INFEASIBLE);
        }
        loop {
            let mut point = self.template.clone();
            for (&j, &value) in self.columns.iter().zip(&current) {
                point[j] = value;
            }
            if let Some(value) = self.objective.evaluate(&point).filter(|_| self.is_feasible(&point)) {
                if self.is_better(value, best.as_ref().map(|(value, _)| *value)) {
                    best = Some((value, current.clone()));
                }
            }

            // Next point, like a counter
            let mut position = 0;
            loop {
                if position == current.len() {
                    return match best {
                        Some((value, solution)) => OptimisationResult::new(State::OPTIMAL, Some(value), solution),
                        None => OptimisationResult::of_state(State::INFEASIBLE),
                    };
                }
                if current[position] < self.bounds[position].1 {
                    current[position] += Decimal::ONE;
                    break;
                }
                current[position] = self.bounds[position].0;
                position += 1;
            }
        }
    }

    fn as_updatable(&mut self) -> Option<&mut dyn UpdatableSolver> {
        if self.updatable {
            Some(self)
        } else {
            None
        }
    }
}

impl UpdatableSolver for Enumerator {
    fn fix_variable(&mut self, solver_index: usize, value: Decimal) -> bool {
        if !value.fract().is_zero() {
            return false;
        }

        self.bounds[solver_index] = (value, value);
        true
    }
}
