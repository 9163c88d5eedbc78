//! # Expressions based models
//!
//! A model owns variables and named expressions over those variables. It presolves itself, picks
//! an integration from its options to build a solver, and writes the solution back onto its
//! variables.
use std::cell::Ref;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};

use log::{debug, info};
use rust_decimal::Decimal;

use crate::algorithm::{Integration, Solver};
use crate::algorithm::registry::IntegrationKey;
use crate::data::model::categories::{Categorisation, Generational};
use crate::data::model::elements::{Category, Objective, ProblemShape};
use crate::data::model::entity::{Bounded, LogReporter, Reporter, Weighted};
use crate::data::model::error::ModelError;
use crate::data::model::expression::Expression;
use crate::data::model::options::Options;
use crate::data::model::solution::{OptimisationResult, State};
use crate::data::model::variable::{Variable, VariableIndex};

pub mod elements;
pub mod entity;
pub mod error;
pub mod expression;
pub mod function;
pub mod options;
pub mod presolve;
pub mod solution;
pub mod variable;
mod categories;

/// Name of the expression generated by `objective_expression`.
const OBJECTIVE: &str = "objective";

/// A solver built for the model, kept between solves.
struct CachedSolver {
    /// Where the integration that built the solver is in the registry.
    key: IntegrationKey,
    solver: Box<dyn Solver>,
    /// Model index of each solver variable.
    columns: Vec<usize>,
}

/// Optimisation model built from variables and expressions.
pub struct ExpressionsBasedModel {
    /// Index in this vector is the index of the variable.
    variables: Vec<Variable>,
    /// In insertion order.
    expressions: Vec<Expression>,
    /// Name to index in `expressions`.
    names: HashMap<String, usize>,
    objective: Objective,
    options: Options,

    /// Incremented on every change that derived values depend on.
    generation: u64,
    categorisation: Generational<Categorisation>,
    solver: Option<CachedSolver>,
}

impl ExpressionsBasedModel {
    /// An empty model with default options.
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// An empty model.
    pub fn with_options(options: Options) -> Self {
        Self {
            variables: Vec::new(),
            expressions: Vec::new(),
            names: HashMap::new(),
            objective: Objective::default(),
            options,

            generation: 0,
            categorisation: Generational::new(),
            solver: None,
        }
    }

    #[allow(missing_docs)]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Modify the options. Any cached solver is discarded.
    pub fn options_mut(&mut self) -> &mut Options {
        self.touch();
        &mut self.options
    }

    /// Add a variable to the model.
    ///
    /// # Return value
    ///
    /// The index of the variable, to be used in expressions.
    pub fn add_variable(&mut self, mut variable: Variable) -> VariableIndex {
        let index = self.variables.len();
        variable.set_index(index);
        self.variables.push(variable);
        self.touch();

        VariableIndex::new(index)
    }

    /// Add a free, continuous variable without bounds.
    pub fn new_variable(&mut self, name: impl Into<String>) -> VariableIndex {
        self.add_variable(Variable::new(name))
    }

    #[allow(missing_docs)]
    pub fn variable(&self, index: VariableIndex) -> &Variable {
        &self.variables[index.get()]
    }

    /// Modify a variable. Derived values and any cached solver are discarded.
    pub fn variable_mut(&mut self, index: VariableIndex) -> &mut Variable {
        self.touch();
        &mut self.variables[index.get()]
    }

    #[allow(missing_docs)]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    #[allow(missing_docs)]
    pub fn count_variables(&self) -> usize {
        self.variables.len()
    }

    /// The index of the variable at a position.
    ///
    /// # Panics
    ///
    /// If there is no variable at that position.
    pub fn index(&self, position: usize) -> VariableIndex {
        assert!(
            position < self.variables.len(),
            "Variable index {} out of range for a model with {} variables", position, self.variables.len(),
        );

        VariableIndex::new(position)
    }

    /// Add an expression.
    ///
    /// # Return value
    ///
    /// The new expression, without factors or bounds.
    ///
    /// # Panics
    ///
    /// If an expression with that name already exists.
    pub fn add_expression(&mut self, name: impl Into<String>) -> &mut Expression {
        match self.try_add_expression(name) {
            Ok(expression) => expression,
            Err(error) => panic!("{}", error),
        }
    }

    /// Add an expression, unless the name is taken.
    pub fn try_add_expression(&mut self, name: impl Into<String>) -> Result<&mut Expression, ModelError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(ModelError::DuplicateExpression(name));
        }

        self.touch();
        let index = self.expressions.len();
        self.names.insert(name.clone(), index);
        self.expressions.push(Expression::new(name));

        Ok(&mut self.expressions[index])
    }

    /// Expression by name.
    pub fn expression(&self, name: &str) -> Option<&Expression> {
        self.names.get(name).map(|&index| &self.expressions[index])
    }

    /// Modify an expression. Derived values and any cached solver are discarded.
    pub fn expression_mut(&mut self, name: &str) -> Option<&mut Expression> {
        let index = *self.names.get(name)?;
        self.touch();
        Some(&mut self.expressions[index])
    }

    /// All expressions, in insertion order.
    pub fn expressions(&self) -> &[Expression] {
        &self.expressions
    }

    #[allow(missing_docs)]
    pub fn count_expressions(&self) -> usize {
        self.expressions.len()
    }

    fn categorisation(&self) -> Ref<'_, Categorisation> {
        self.categorisation.get(self.generation, || Categorisation::compute(&self.variables))
    }

    /// Indices of the variables in a category, in increasing order.
    pub fn variables_in(&self, category: Category) -> Ref<'_, [usize]> {
        Ref::map(self.categorisation(), |categorisation| categorisation.members(category))
    }

    /// Variables that are not fixed.
    pub fn free_variables(&self) -> Ref<'_, [usize]> {
        self.variables_in(Category::Free)
    }

    /// Free variables that can take a positive value.
    pub fn positive_variables(&self) -> Ref<'_, [usize]> {
        self.variables_in(Category::Positive)
    }

    /// Free variables that can take a negative value.
    pub fn negative_variables(&self) -> Ref<'_, [usize]> {
        self.variables_in(Category::Negative)
    }

    /// Free integer variables.
    pub fn integer_variables(&self) -> Ref<'_, [usize]> {
        self.variables_in(Category::Integer)
    }

    /// Position of a variable within a category, `None` if it is not part of it.
    pub fn index_in_category(&self, category: Category, index: VariableIndex) -> Option<usize> {
        self.categorisation().local_index(category, index.get())
    }

    /// Rough classification, based on the free variables and the constraint and objective
    /// expressions not yet settled by presolving.
    pub fn problem_shape(&self) -> ProblemShape {
        if !self.integer_variables().is_empty() {
            ProblemShape::MixedInteger
        } else if self.expressions.iter()
            .filter(|expression| expression.is_constraint() || expression.is_objective())
            .filter(|expression| !expression.is_redundant())
            .any(Expression::is_function_quadratic) {
            ProblemShape::ConvexQuadratic
        } else {
            ProblemShape::Linear
        }
    }

    /// Model index of each variable in solver space.
    ///
    /// The columns of the cached solver, or the free variables if there is no solver yet.
    pub fn solver_columns(&self) -> Vec<usize> {
        match &self.solver {
            Some(cached) => cached.columns.clone(),
            None => self.free_variables().to_vec(),
        }
    }

    /// A value for every variable: the fixed value, the last value written by a solve, or the
    /// feasible value closest to zero.
    pub fn current_solution(&self) -> Vec<Decimal> {
        self.variables.iter()
            .map(|variable| {
                variable.fixed_value()
                    .or(variable.value())
                    .unwrap_or_else(|| variable.feasible_value_nearest_zero())
            })
            .collect()
    }

    /// All contributions to the objective function collected in a single expression.
    ///
    /// The expression is not part of the model. It has weight one when anything contributes to
    /// the objective and no bounds.
    pub fn objective_expression(&self) -> Expression {
        let mut objective = Expression::new(OBJECTIVE);

        for (j, variable) in self.variables.iter().enumerate() {
            if let Some(weight) = variable.contribution_weight() {
                objective.add_linear(j, weight);
            }
        }
        for expression in &self.expressions {
            if let Some(weight) = expression.contribution_weight() {
                for (&j, &factor) in expression.linear_factors() {
                    objective.add_linear(j, weight * factor);
                }
                for (&(row, column), &factor) in expression.quadratic_factors() {
                    objective.add_product(row, column, weight * factor);
                }
            }
        }

        if !objective.is_function_constant() {
            objective.weight(Decimal::ONE);
        }
        objective
    }

    /// Check a solution against the bounds of all variables and constraint expressions.
    ///
    /// Every violation is reported, validation doesn't stop at the first one.
    ///
    /// # Arguments
    ///
    /// * `solution`: A value for every variable.
    /// * `reporter`: Receives a message for each violation.
    ///
    /// # Return value
    ///
    /// Whether the solution is feasible within the feasibility tolerance.
    pub fn validate(&self, solution: &[Decimal], reporter: &mut dyn Reporter) -> bool {
        if solution.len() != self.variables.len() {
            reporter.report(format!(
                "Solution has {} values for {} variables", solution.len(), self.variables.len(),
            ));
            return false;
        }

        let context = &self.options.feasibility;
        let mut valid = true;
        for (variable, &value) in self.variables.iter().zip(solution) {
            valid &= variable.validate(value, context, reporter);
            if variable.is_integer() && !context.is_integral(value) {
                reporter.report(format!("{}: {} is not an integer", variable.name(), value.normalize()));
                valid = false;
            }
        }
        for expression in self.expressions.iter().filter(|expression| expression.is_constraint()) {
            valid &= match expression.evaluate(solution) {
                Some(value) => expression.validate(value, context, reporter),
                None => {
                    reporter.report(format!("{}: value doesn't fit in a decimal", expression.name()));
                    false
                },
            };
        }

        valid
    }

    /// Validate the current solution, see `current_solution`.
    pub fn validate_current(&self, reporter: &mut dyn Reporter) -> bool {
        self.validate(&self.current_solution(), reporter)
    }

    /// Whether presolving found a variable or expression whose bounds can't be satisfied.
    pub fn is_infeasible(&self) -> bool {
        self.variables.iter().any(Variable::is_infeasible)
            || self.expressions.iter().any(Expression::is_infeasible)
    }

    /// Whether presolving found a variable that the objective pushes to a missing bound.
    pub fn is_unbounded(&self) -> bool {
        self.variables.iter().any(Variable::is_unbounded)
    }

    /// Verify that the model was constructed correctly.
    ///
    /// Bounds should not cross, and expressions may only refer to variables of this model.
    pub fn check(&self) -> Result<(), ModelError> {
        let entities = self.variables.iter().map(|variable| variable as &dyn Bounded)
            .chain(self.expressions.iter().map(|expression| expression as &dyn Bounded));
        for entity in entities {
            if let (Some(lower), Some(upper)) = (entity.lower_limit(), entity.upper_limit()) {
                if lower > upper {
                    return Err(ModelError::InconsistentBounds { entity: entity.name().to_string(), lower, upper });
                }
            }
        }

        for expression in &self.expressions {
            if let Some(&index) = expression.referenced_variables().last() {
                if index >= self.variables.len() {
                    return Err(ModelError::UnknownVariable { expression: expression.name().to_string(), index });
                }
            }
        }

        Ok(())
    }

    /// The integration that will be used to solve this model.
    pub fn try_integration(&self) -> Result<&dyn Integration, ModelError> {
        if let Some(cached) = &self.solver {
            if let Some(integration) = self.options.integrations.get(cached.key) {
                return Ok(integration);
            }
        }

        self.options.integrations.select(self).map(|(_, integration)| integration)
    }

    /// The integration that will be used to solve this model.
    ///
    /// # Panics
    ///
    /// If no registered integration is capable of solving the model.
    pub fn integration(&self) -> &dyn Integration {
        match self.try_integration() {
            Ok(integration) => integration,
            Err(error) => panic!("{}", error),
        }
    }

    #[allow(missing_docs)]
    pub fn objective(&self) -> Objective {
        self.objective
    }

    #[allow(missing_docs)]
    pub fn is_minimisation(&self) -> bool {
        self.objective == Objective::Minimise
    }

    #[allow(missing_docs)]
    pub fn is_maximisation(&self) -> bool {
        self.objective == Objective::Maximise
    }

    /// Minimise the objective function from now on.
    pub fn set_minimisation(&mut self) {
        self.set_objective(Objective::Minimise);
    }

    /// Maximise the objective function from now on.
    pub fn set_maximisation(&mut self) {
        self.set_objective(Objective::Maximise);
    }

    fn set_objective(&mut self, objective: Objective) {
        if self.objective != objective {
            self.objective = objective;
            self.touch();
        }
    }

    /// Minimise the objective function.
    pub fn minimise(&mut self) -> OptimisationResult {
        self.set_minimisation();
        self.optimise()
    }

    /// Maximise the objective function.
    pub fn maximise(&mut self) -> OptimisationResult {
        self.set_maximisation();
        self.optimise()
    }

    /// Fix a variable at a value.
    ///
    /// The bounds of the variable are kept. A value outside of them makes the model invalid: if
    /// all variables are fixed, solving reports `State::INVALID`.
    ///
    /// If a solver was built before, it is updated in place when it supports that. Otherwise, it
    /// is discarded and a new one is built on the next solve.
    pub fn fix_variable(&mut self, index: VariableIndex, value: Decimal) {
        let j = index.get();
        self.variables[j].fix(value);
        self.generation += 1;

        let is_updated = self.solver.as_mut().is_some_and(|cached| {
            let column = cached.columns.iter().position(|&column| column == j);
            match (column, cached.solver.as_updatable()) {
                (Some(column), Some(solver)) => solver.fix_variable(column, value),
                _ => false,
            }
        });
        if !is_updated {
            debug!("Solver can't fix variable {} in place", self.variables[j].name());
            self.solver = None;
        }
    }

    /// Make all variables continuous.
    pub fn relax(&mut self) {
        for variable in &mut self.variables {
            variable.relax();
        }
        self.touch();
    }

    /// Make a single variable continuous.
    pub fn relax_variable(&mut self, index: VariableIndex) {
        self.variable_mut(index).relax();
    }

    /// Forget the results of presolving and solving.
    ///
    /// Clears the infeasible and redundant flags of the expressions, the values and flags of the
    /// variables, and the cached solver. Variables fixed through `fix_variable` stay fixed and
    /// derived bounds stay. Values that presolve picked for unreferenced variables are dropped.
    pub fn reset(&mut self) {
        for expression in &mut self.expressions {
            expression.reset_flags();
        }
        for variable in &mut self.variables {
            variable.reset();
        }
        self.touch();
    }

    /// Invalidate everything derived from the model.
    fn touch(&mut self) {
        self.generation += 1;
        self.categorisation.invalidate();
        self.solver = None;
    }

    /// Presolve, then decide the outcome directly or through a solver.
    fn optimise(&mut self) -> OptimisationResult {
        if let Err(error) = self.check() {
            panic!("Can't optimise an invalid model: {}", error);
        }
        if self.options.presolve {
            self.presolve();
        } else if presolve::release(&mut self.variables) {
            self.touch();
        }

        let result = if self.is_infeasible() {
            OptimisationResult::new(State::INFEASIBLE, None, self.current_solution())
        } else if self.is_unbounded() {
            self.optimise_unbounded()
        } else if self.free_variables().is_empty() {
            let solution = self.current_solution();
            let state = if self.validate(&solution, &mut LogReporter) { State::DISTINCT } else { State::INVALID };
            let value = self.objective_expression().evaluate(&solution);
            OptimisationResult::new(state, value, solution)
        } else {
            self.solve_with_backend()
        };

        info!("{}imisation finished: {}", if self.is_minimisation() { "Min" } else { "Max" }, result.state());
        result
    }

    /// An unbounded model still gets a solution: the current one if it is feasible, or one from a
    /// solver if there is a capable one.
    fn optimise_unbounded(&mut self) -> OptimisationResult {
        let candidate = self.current_solution();
        if self.validate(&candidate, &mut Vec::<String>::new()) {
            let value = self.objective_expression().evaluate(&candidate);
            return OptimisationResult::new(State::UNBOUNDED, value, candidate);
        }

        if self.try_integration().is_ok() {
            let derived = self.solve_with_backend();
            if derived.state().is_feasible() {
                return derived.with_state(State::UNBOUNDED);
            }
        }

        OptimisationResult::new(State::UNBOUNDED, None, candidate)
    }

    /// Build or reuse a solver, solve and write the solution back onto the variables.
    ///
    /// # Panics
    ///
    /// If no registered integration is capable of solving the model.
    fn solve_with_backend(&mut self) -> OptimisationResult {
        let key = match self.solver.as_ref().map(|cached| cached.key) {
            Some(key) => key,
            None => {
                let (key, integration) = match self.options.integrations.select(self) {
                    Ok(selected) => selected,
                    Err(error) => panic!("{}", error),
                };
                let columns = self.free_variables().to_vec();
                let solver = integration.build(self);
                self.solver = Some(CachedSolver { key, solver, columns });
                key
            },
        };
        let Some(integration) = self.options.integrations.get(key) else {
            panic!("Integration {:?} disappeared while its solver was cached", key);
        };

        let model_state = OptimisationResult::new(State::UNEXPLORED, None, self.current_solution());
        let kick_starter = integration.to_solver_state(&model_state, self);
        let solver_state = match self.solver.as_mut() {
            Some(cached) => cached.solver.solve(Some(&kick_starter)),
            None => OptimisationResult::of_state(State::FAILED),
        };
        let result = integration.to_model_state(&solver_state, self);
        debug!("{} returned {}", integration.name(), solver_state.state());

        if !solver_state.solution().is_empty() {
            for (variable, &value) in self.variables.iter_mut().zip(result.solution()) {
                variable.set_value(value);
            }
        }
        let value = self.objective_expression().evaluate(result.solution());

        OptimisationResult::new(result.state(), value, result.into_solution())
    }
}

impl Default for ExpressionsBasedModel {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ExpressionsBasedModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}imise", if self.is_minimisation() { "Min" } else { "Max" })?;
        for variable in &self.variables {
            writeln!(f, "  {}", variable)?;
        }
        for expression in &self.expressions {
            writeln!(f, "  {}", expression)?;
        }

        Ok(())
    }
}
