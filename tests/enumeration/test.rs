use rust_decimal_macros::dec;

use relp_model::{
    Bounded, ExpressionsBasedModel, Integration, ModelError, OptimisationResult, ProblemShape, State, Variable,
    VariableIndex, Weighted,
};

use super::Enumeration;

/// Maximise `x + y` subject to `x + 2 y <= 4` with `x` and `y` integer within `[0, 4]`.
fn knapsack(updatable: bool, presolve: bool) -> (ExpressionsBasedModel, [VariableIndex; 2], std::rc::Rc<std::cell::Cell<usize>>) {
    let mut model = ExpressionsBasedModel::new();
    let (integration, builds) = Enumeration::new(updatable);
    model.options_mut().integrations.set_builtin(ProblemShape::MixedInteger, integration);
    model.options_mut().presolve = presolve;

    let variables = ["x", "y"].map(|name| {
        let mut variable = Variable::new(name);
        variable.integer(true).lower(dec!(0)).upper(dec!(4)).weight(dec!(1));
        model.add_variable(variable)
    });
    model.add_expression("capacity").set(variables[0], dec!(1)).set(variables[1], dec!(2)).upper(dec!(4));

    (model, variables, builds)
}

#[test]
fn solve_integer_program() {
    let (mut model, [x, y], builds) = knapsack(false, true);
    assert_eq!(model.problem_shape(), ProblemShape::MixedInteger);

    let result = model.maximise();

    assert_eq!(result.state(), State::OPTIMAL);
    assert_eq!(result.value(), Some(dec!(4)));
    assert_eq!(result.solution(), &[dec!(4), dec!(0)]);
    assert_eq!(result.to_string(), "OPTIMAL 4 @ [4, 0]");
    assert_eq!(model.variable(x).value(), Some(dec!(4)));
    assert_eq!(model.variable(y).value(), Some(dec!(0)));
    assert_eq!(model.variable(y).upper_limit(), Some(dec!(2)));
    assert_eq!(builds.get(), 1);
    assert!(model.validate_current(&mut Vec::<String>::new()));
}

#[test]
fn minimise_after_maximise() {
    let (mut model, _, builds) = knapsack(false, false);

    assert_eq!(model.maximise().value(), Some(dec!(4)));
    let result = model.minimise();

    assert_eq!(result.state(), State::OPTIMAL);
    assert_eq!(result.value(), Some(dec!(0)));
    assert_eq!(result.solution(), &[dec!(0), dec!(0)]);
    // Changing the direction of optimisation discards the solver
    assert_eq!(builds.get(), 2);
}

#[test]
fn fix_variable_updates_solver() {
    let (mut model, [x, y], builds) = knapsack(true, false);
    assert_eq!(model.maximise().value(), Some(dec!(4)));

    model.fix_variable(x, dec!(1));
    let result = model.maximise();

    assert_eq!(result.state(), State::OPTIMAL);
    assert_eq!(result.value(), Some(dec!(2)));
    assert_eq!(result.solution(), &[dec!(1), dec!(1)]);
    assert_eq!(model.variable(y).value(), Some(dec!(1)));
    assert_eq!(builds.get(), 1);
    assert_eq!(model.solver_columns(), vec![0, 1]);
}

#[test]
fn fix_variable_rebuilds_solver() {
    let (mut model, [x, _], builds) = knapsack(false, false);
    assert_eq!(model.maximise().value(), Some(dec!(4)));

    model.fix_variable(x, dec!(1));
    let result = model.maximise();

    assert_eq!(result.value(), Some(dec!(2)));
    assert_eq!(result.solution(), &[dec!(1), dec!(1)]);
    assert_eq!(builds.get(), 2);
    assert_eq!(model.solver_columns(), vec![1]);
}

#[test]
fn fixed_by_presolve() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).weight(dec!(1));
    model.add_expression("e").set(x, dec!(2)).level(dec!(10));

    let result = model.minimise();

    assert_eq!(result.state(), State::DISTINCT);
    assert_eq!(result.value(), Some(dec!(5)));
    assert_eq!(result.solution(), &[dec!(5)]);
}

#[test]
fn fixed_and_invalid() {
    let mut model = ExpressionsBasedModel::new();
    model.options_mut().presolve = false;
    let x = model.new_variable("x");
    model.add_expression("e").set(x, dec!(1)).upper(dec!(3));
    model.fix_variable(x, dec!(5));

    let result = model.minimise();

    assert_eq!(result.state(), State::INVALID);
    assert!(result.state().is_failure());
    assert_eq!(result.solution(), &[dec!(5)]);
}

#[test]
fn fixed_outside_bounds() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).upper(dec!(3));
    model.fix_variable(x, dec!(5));

    let result = model.minimise();

    assert_eq!(result.state(), State::INVALID);
    assert_eq!(result.solution(), &[dec!(5)]);
    assert_eq!(model.variable(x).lower_limit(), Some(dec!(0)));
    assert_eq!(model.variable(x).upper_limit(), Some(dec!(3)));
}

#[test]
fn direction_change_after_presolve() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).upper(dec!(4)).weight(dec!(1));

    let result = model.maximise();
    assert_eq!(result.state(), State::DISTINCT);
    assert_eq!(result.value(), Some(dec!(4)));
    assert_eq!(result.solution(), &[dec!(4)]);

    let result = model.minimise();
    assert_eq!(result.state(), State::DISTINCT);
    assert_eq!(result.value(), Some(dec!(0)));
    assert_eq!(result.solution(), &[dec!(0)]);

    model.variable_mut(x).weight(dec!(-1));
    let result = model.minimise();
    assert_eq!(result.value(), Some(dec!(-4)));
    assert_eq!(result.solution(), &[dec!(4)]);
}

#[test]
fn direction_change_without_presolve() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).upper(dec!(4)).weight(dec!(1));
    assert_eq!(model.maximise().solution(), &[dec!(4)]);

    model.options_mut().presolve = false;
    let (integration, builds) = Enumeration::new(false);
    model.options_mut().integrations.add_fallback(integration);
    let result = model.minimise();

    assert_eq!(result.state(), State::OPTIMAL);
    assert_eq!(result.solution(), &[dec!(0)]);
    assert_eq!(builds.get(), 1);
}

#[test]
fn bound_added_after_unbounded() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).weight(dec!(-1));
    assert_eq!(model.minimise().state(), State::UNBOUNDED);

    model.variable_mut(x).upper(dec!(3));
    let result = model.minimise();

    assert_eq!(result.state(), State::DISTINCT);
    assert_eq!(result.value(), Some(dec!(-3)));
    assert_eq!(result.solution(), &[dec!(3)]);
    assert!(!model.is_unbounded());
}

#[test]
fn infeasible() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).upper(dec!(1));
    let y = model.new_variable("y");
    model.variable_mut(y).lower(dec!(0)).upper(dec!(2));
    model.add_expression("e").set(x, dec!(1)).set(y, dec!(1)).lower(dec!(4));

    let result = model.minimise();

    assert_eq!(result.state(), State::INFEASIBLE);
    assert_eq!(result.value(), None);
    assert!(!result.state().is_feasible());
}

#[test]
fn unbounded() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).weight(dec!(1));

    let result = model.minimise();

    assert_eq!(result.state(), State::UNBOUNDED);
    assert_eq!(result.value(), Some(dec!(0)));
    assert_eq!(result.solution(), &[dec!(0)]);
    assert!(model.is_unbounded());
}

#[test]
#[should_panic(expected = "no registered integration")]
fn no_integration() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).upper(dec!(4));
    let y = model.new_variable("y");
    model.variable_mut(y).lower(dec!(0)).upper(dec!(4));
    model.add_expression("e").set(x, dec!(1)).set(y, dec!(1)).upper(dec!(5));

    model.minimise();
}

#[test]
fn capability() {
    let mut model = ExpressionsBasedModel::new();
    let (integration, _) = Enumeration::new(false);
    model.options_mut().integrations.add_fallback(integration);
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0));

    assert_eq!(model.try_integration().err(), Some(ModelError::NoCapableIntegration));

    model.variable_mut(x).upper(dec!(3));
    assert_eq!(model.integration().name(), "Enumeration");
}

#[test]
fn state_translation() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    let y = model.new_variable("y");
    model.variable_mut(y).lower(dec!(1)).upper(dec!(5));
    model.new_variable("z");
    model.fix_variable(x, dec!(2));
    let (integration, _) = Enumeration::new(false);

    assert_eq!(model.solver_columns(), vec![1, 2]);

    let model_state = OptimisationResult::new(State::FEASIBLE, Some(dec!(1)), vec![dec!(2), dec!(3), dec!(4)]);
    let solver_state = integration.to_solver_state(&model_state, &model);
    assert_eq!(solver_state.state(), State::FEASIBLE);
    assert_eq!(solver_state.value(), Some(dec!(1)));
    assert_eq!(solver_state.solution(), &[dec!(3), dec!(4)]);

    let incomplete = OptimisationResult::new(State::FEASIBLE, None, vec![dec!(2)]);
    assert!(integration.to_solver_state(&incomplete, &model).solution().is_empty());

    let solver_state = OptimisationResult::new(State::OPTIMAL, Some(dec!(9)), vec![dec!(7), dec!(8)]);
    let model_state = integration.to_model_state(&solver_state, &model);
    assert_eq!(model_state.state(), State::OPTIMAL);
    assert_eq!(model_state.solution(), &[dec!(2), dec!(7), dec!(8)]);

    let model_state = integration.to_model_state(&OptimisationResult::of_state(State::FAILED), &model);
    assert_eq!(model_state.state(), State::FAILED);
    assert_eq!(model_state.solution(), &[dec!(2), dec!(1), dec!(0)]);
}

#[test]
#[should_panic]
fn state_translation_wrong_length() {
    let mut model = ExpressionsBasedModel::new();
    model.new_variable("x");
    model.new_variable("y");
    let (integration, _) = Enumeration::new(false);

    let solver_state = OptimisationResult::new(State::OPTIMAL, None, vec![dec!(7)]);
    integration.to_model_state(&solver_state, &model);
}
