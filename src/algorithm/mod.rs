//! # Algorithms
//!
//! This crate doesn't contain solvers. It describes what a solver needs to provide, and how a
//! model finds one that can solve it.
//!
//! A solver works in "solver space": it usually only knows about the variables that are not fixed,
//! numbered in its own way. An `Integration` builds a solver for a model and translates solutions
//! between the variables of the model and those of the solver.
use std::fmt::Debug;

use rust_decimal::Decimal;

use crate::data::model::ExpressionsBasedModel;
use crate::data::model::solution::OptimisationResult;

pub mod registry;

/// Knows how to build a solver for some models.
pub trait Integration: Debug {
    /// Name of the integration, used in logging and to remove it from a registry.
    fn name(&self) -> &str;

    /// Whether this integration can solve the model in its current state.
    ///
    /// This is called after presolving, so fixed variables and redundant expressions can be
    /// ignored.
    fn is_capable(&self, model: &ExpressionsBasedModel) -> bool;

    /// Create a solver for the model.
    fn build(&self, model: &ExpressionsBasedModel) -> Box<dyn Solver>;

    /// Translate a result in model space to solver space.
    ///
    /// By default, the solver knows the free variables of the model at the time it was built, in
    /// the order of their index in the model.
    ///
    /// # Arguments
    ///
    /// * `model_state`: Result with a value for every variable of the model, or no values at all.
    /// * `model`: The model the solver was built for.
    fn to_solver_state(&self, model_state: &OptimisationResult, model: &ExpressionsBasedModel) -> OptimisationResult {
        let solution = if model_state.solution().len() == model.count_variables() {
            model.solver_columns().iter().map(|&j| model_state.solution()[j]).collect()
        } else {
            Vec::new()
        };

        OptimisationResult::new(model_state.state(), model_state.value(), solution)
    }

    /// Translate a result in solver space to model space.
    ///
    /// Variables the solver doesn't know about, such as fixed variables, get their value from the
    /// model. A solver result without values keeps the current values of the model.
    ///
    /// # Arguments
    ///
    /// * `solver_state`: Result with a value for every variable of the solver, or no values at all.
    /// * `model`: The model the solver was built for.
    ///
    /// # Panics
    ///
    /// When the solver result has values, but not one for each solver variable.
    fn to_model_state(&self, solver_state: &OptimisationResult, model: &ExpressionsBasedModel) -> OptimisationResult {
        let mut solution = model.current_solution();

        if !solver_state.solution().is_empty() {
            let columns = model.solver_columns();
            assert_eq!(
                solver_state.solution().len(), columns.len(),
                "{}: the solver returned {} values for {} variables",
                self.name(), solver_state.solution().len(), columns.len(),
            );
            for (&j, &value) in columns.iter().zip(solver_state.solution()) {
                solution[j] = value;
            }
        }

        OptimisationResult::new(solver_state.state(), solver_state.value(), solution)
    }
}

/// Solves a single model, built by an `Integration`.
pub trait Solver {
    /// Solve the problem.
    ///
    /// # Arguments
    ///
    /// * `kick_starter`: A result in solver space that may be used as a starting point.
    ///
    /// # Return value
    ///
    /// Result in solver space. An empty solution vector means that no values are known.
    fn solve(&mut self, kick_starter: Option<&OptimisationResult>) -> OptimisationResult;

    /// Access to in-place updates, if this solver supports them.
    fn as_updatable(&mut self) -> Option<&mut dyn UpdatableSolver> {
        None
    }
}

/// A solver that can be modified after it was built, such that it doesn't have to be rebuilt when
/// the model changes slightly.
pub trait UpdatableSolver: Solver {
    /// Fix a variable at a value.
    ///
    /// # Arguments
    ///
    /// * `solver_index`: Index of the variable in solver space.
    /// * `value`: Value to fix the variable at.
    ///
    /// # Return value
    ///
    /// Whether the update succeeded. If not, the solver is rebuilt before the next solve.
    fn fix_variable(&mut self, solver_index: usize, value: Decimal) -> bool;
}
