use rust_decimal_macros::dec;

use relp_model::{Bounded, Category, ExpressionsBasedModel, ModelError, ProblemShape, Variable, Weighted};

#[test]
fn expressions_by_name() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.add_expression("e").set(x, dec!(3));

    assert_eq!(model.count_expressions(), 1);
    assert_eq!(model.expression("e").unwrap().get(x), dec!(3));
    assert!(model.expression("f").is_none());
    assert!(matches!(model.try_add_expression("e"), Err(ModelError::DuplicateExpression(name)) if name == "e"));

    model.expression_mut("e").unwrap().add(x, dec!(-3));
    assert_eq!(model.expression("e").unwrap().count_linear_factors(), 0);
}

#[test]
#[should_panic(expected = "already exists")]
fn duplicate_expression() {
    let mut model = ExpressionsBasedModel::new();
    model.add_expression("e");
    model.add_expression("e");
}

#[test]
fn check() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    assert_eq!(model.check(), Ok(()));

    model.variable_mut(x).lower(dec!(2)).upper(dec!(1));
    assert_eq!(
        model.check(),
        Err(ModelError::InconsistentBounds { entity: "x".to_string(), lower: dec!(2), upper: dec!(1) }),
    );
    model.variable_mut(x).upper(None::<rust_decimal::Decimal>);
    assert_eq!(model.check(), Ok(()));

    let mut other = ExpressionsBasedModel::new();
    other.new_variable("a");
    let foreign = other.new_variable("b");
    model.add_expression("e").set(foreign, dec!(1));
    assert_eq!(model.check(), Err(ModelError::UnknownVariable { expression: "e".to_string(), index: 1 }));
}

#[test]
#[should_panic(expected = "invalid model")]
fn presolve_invalid() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.add_expression("e").set(x, dec!(1)).lower(dec!(1)).upper(dec!(0));

    model.presolve();
}

#[test]
fn categories() {
    let mut model = ExpressionsBasedModel::new();
    let fixed = model.new_variable("fixed");
    let positive = model.new_variable("positive");
    model.variable_mut(positive).lower(dec!(0)).upper(dec!(5));
    let negative = model.new_variable("negative");
    model.variable_mut(negative).lower(dec!(-3)).upper(dec!(0));
    let free = model.new_variable("free");
    let binary = model.add_variable({ let mut variable = Variable::new("binary"); variable.binary(); variable });
    model.fix_variable(fixed, dec!(1));

    assert_eq!(&*model.free_variables(), &[1, 2, 3, 4]);
    assert_eq!(&*model.positive_variables(), &[1, 3, 4]);
    assert_eq!(&*model.negative_variables(), &[2, 3]);
    assert_eq!(&*model.integer_variables(), &[4]);
    assert_eq!(model.index_in_category(Category::Positive, binary), Some(2));
    assert_eq!(model.index_in_category(Category::Negative, positive), None);
    assert_eq!(model.index_in_category(Category::Free, free), Some(2));
    assert_eq!(model.index_in_category(Category::Free, fixed), None);
    assert_eq!(model.problem_shape(), ProblemShape::MixedInteger);

    model.relax();
    assert!(model.integer_variables().is_empty());
    assert_eq!(model.problem_shape(), ProblemShape::Linear);

    // Neither a constraint nor part of the objective
    model.add_expression("unused").set_quadratic(positive, negative, dec!(1));
    assert_eq!(model.problem_shape(), ProblemShape::Linear);

    model.add_expression("q").set_quadratic(positive, negative, dec!(1)).upper(dec!(1));
    assert_eq!(model.problem_shape(), ProblemShape::ConvexQuadratic);
}

#[test]
fn relax_single_variable() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.add_variable({ let mut variable = Variable::new("x"); variable.binary(); variable });
    let y = model.add_variable({ let mut variable = Variable::new("y"); variable.integer(true); variable });

    model.relax_variable(x);

    assert!(!model.variable(x).is_integer());
    assert_eq!(model.variable(x).upper_limit(), Some(dec!(1)));
    assert_eq!(&*model.integer_variables(), &[y.get()]);
}

#[test]
fn objective_expression() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).weight(dec!(2));
    let y = model.new_variable("y");
    model.add_expression("q").set(y, dec!(1)).set_quadratic(x, y, dec!(1)).weight(dec!(3));
    model.add_expression("c").set(x, dec!(5)).upper(dec!(1));

    let objective = model.objective_expression();

    assert_eq!(objective.get(x), dec!(2));
    assert_eq!(objective.get(y), dec!(3));
    assert_eq!(objective.get_quadratic(x, y), dec!(3));
    assert_eq!(objective.contribution_weight(), Some(dec!(1)));
    assert!(!objective.is_constraint());
    assert_eq!(objective.evaluate(&[dec!(1), dec!(2)]), Some(dec!(14)));

    assert_eq!(ExpressionsBasedModel::new().objective_expression().contribution_weight(), None);
}

#[test]
fn validate() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.add_variable({ let mut variable = Variable::new("x"); variable.binary(); variable });
    let y = model.new_variable("y");
    model.variable_mut(y).lower(dec!(0));
    model.add_expression("e").set(x, dec!(1)).set(y, dec!(1)).upper(dec!(2));

    let mut messages = Vec::<String>::new();
    assert!(!model.validate(&[dec!(1.5), dec!(3)], &mut messages));
    assert_eq!(messages.len(), 3);

    let mut messages = Vec::<String>::new();
    assert!(model.validate(&[dec!(1), dec!(1)], &mut messages));
    assert!(messages.is_empty());

    let mut messages = Vec::<String>::new();
    assert!(!model.validate(&[dec!(1)], &mut messages));
    assert_eq!(messages.len(), 1);

    // Within tolerance
    assert!(model.validate(&[dec!(1.000000000001), dec!(1)], &mut Vec::<String>::new()));
    assert!(model.validate_current(&mut Vec::<String>::new()));

    let mut messages = Vec::<String>::new();
    assert!(!model.validate(&[dec!(1), rust_decimal::Decimal::MAX], &mut messages));
    assert_eq!(messages.len(), 1);
}

#[test]
fn reset() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.add_expression("e").set(x, dec!(1)).upper(dec!(3));
    model.fix_variable(x, dec!(5));
    model.presolve();
    assert!(model.is_infeasible());

    model.reset();

    assert!(!model.is_infeasible());
    assert!(!model.expression("e").unwrap().is_infeasible());
    assert_eq!(model.variable(x).fixed_value(), Some(dec!(5)));
    assert_eq!(model.current_solution(), vec![dec!(5)]);
}

#[test]
fn fixing_keeps_bounds() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0)).upper(dec!(3));

    model.fix_variable(x, dec!(5));

    let variable = model.variable(x);
    assert_eq!(variable.fixed_value(), Some(dec!(5)));
    assert_eq!(variable.lower_limit(), Some(dec!(0)));
    assert_eq!(variable.upper_limit(), Some(dec!(3)));
    assert!(!model.validate_current(&mut Vec::<String>::new()));
}

#[test]
fn current_solution() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(2));
    let y = model.new_variable("y");
    model.variable_mut(y).set_value(dec!(7));
    let z = model.new_variable("z");
    model.fix_variable(z, dec!(-1));

    assert_eq!(model.current_solution(), vec![dec!(2), dec!(7), dec!(-1)]);
}

#[test]
fn display() {
    let mut model = ExpressionsBasedModel::new();
    let x = model.new_variable("x");
    model.variable_mut(x).lower(dec!(0));
    model.add_expression("e").set(x, dec!(2)).upper(dec!(4));
    model.set_maximisation();

    let text = model.to_string();

    assert!(text.starts_with("Maximise\n"));
    assert!(text.contains(&model.variable(x).to_string()));
    assert!(text.contains(&model.expression("e").unwrap().to_string()));
    assert!(model.is_maximisation());
}
