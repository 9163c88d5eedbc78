//! # Expressions
//!
//! An expression is a weighted sum of variables and products of two variables. Its bounds make it
//! a constraint, its weight makes it part of the objective function.
//!
//! The factor maps are reference counted and only copied when an expression that shares them is
//! modified. A `copy_shallow` is therefore cheap until one of the two copies changes.
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use itertools::Itertools;
use rust_decimal::Decimal;

use crate::data::model::entity::{Bounded, Limits, Weighted};
use crate::data::model::function::MultiaryFunction;
use crate::data::model::variable::{Variable, VariableIndex};

/// Linear and quadratic combination of variables.
#[derive(Clone, Debug)]
pub struct Expression {
    name: String,
    limits: Limits,
    /// Variable index to factor, never zero.
    linear: Rc<BTreeMap<usize, Decimal>>,
    /// `(row, column)` to factor, never zero.
    quadratic: Rc<BTreeMap<(usize, usize), Decimal>>,
    infeasible: bool,
    redundant: bool,
}

impl Expression {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            limits: Limits::default(),
            linear: Rc::new(BTreeMap::new()),
            quadratic: Rc::new(BTreeMap::new()),
            infeasible: false,
            redundant: false,
        }
    }

    /// Set the factor of a variable, replacing any existing factor. Zero removes the variable.
    ///
    /// An index handed out by another model is accepted here. `ExpressionsBasedModel::check`
    /// rejects it, which makes presolving and solving panic.
    pub fn set(&mut self, variable: VariableIndex, factor: Decimal) -> &mut Self {
        self.set_linear(variable.get(), factor);
        self
    }

    /// Set the factor of the product of two variables. Zero removes the product.
    pub fn set_quadratic(&mut self, row: VariableIndex, column: VariableIndex, factor: Decimal) -> &mut Self {
        self.set_product(row.get(), column.get(), factor);
        self
    }

    /// Add to the factor of a variable.
    pub fn add(&mut self, variable: VariableIndex, delta: Decimal) -> &mut Self {
        let factor = self.get(variable) + delta;
        self.set(variable, factor)
    }

    /// Add to the factor of the product of two variables.
    pub fn add_quadratic(&mut self, row: VariableIndex, column: VariableIndex, delta: Decimal) -> &mut Self {
        let factor = self.get_quadratic(row, column) + delta;
        self.set_quadratic(row, column, factor)
    }

    pub(crate) fn set_linear(&mut self, variable: usize, factor: Decimal) {
        if factor.is_zero() {
            if self.linear.contains_key(&variable) {
                Rc::make_mut(&mut self.linear).remove(&variable);
            }
        } else {
            Rc::make_mut(&mut self.linear).insert(variable, factor);
        }
    }

    pub(crate) fn add_linear(&mut self, variable: usize, delta: Decimal) {
        let factor = self.linear.get(&variable).copied().unwrap_or_default() + delta;
        self.set_linear(variable, factor);
    }

    /// Like `add_linear`, but `None` instead of overflowing.
    fn try_add_linear(&mut self, variable: usize, delta: Decimal) -> Option<()> {
        let factor = self.linear.get(&variable).copied().unwrap_or_default().checked_add(delta)?;
        self.set_linear(variable, factor);
        Some(())
    }

    pub(crate) fn add_product(&mut self, row: usize, column: usize, delta: Decimal) {
        let factor = self.quadratic.get(&(row, column)).copied().unwrap_or_default() + delta;
        self.set_product(row, column, factor);
    }

    fn set_product(&mut self, row: usize, column: usize, factor: Decimal) {
        let key = (row, column);
        if factor.is_zero() {
            if self.quadratic.contains_key(&key) {
                Rc::make_mut(&mut self.quadratic).remove(&key);
            }
        } else {
            Rc::make_mut(&mut self.quadratic).insert(key, factor);
        }
    }

    /// Factor of a variable, zero if it doesn't appear.
    pub fn get(&self, variable: VariableIndex) -> Decimal {
        self.linear.get(&variable.get()).copied().unwrap_or_default()
    }

    /// Factor of a product of two variables, zero if it doesn't appear.
    pub fn get_quadratic(&self, row: VariableIndex, column: VariableIndex) -> Decimal {
        self.quadratic.get(&(row.get(), column.get())).copied().unwrap_or_default()
    }

    /// Variable index to non-zero factor.
    pub fn linear_factors(&self) -> &BTreeMap<usize, Decimal> {
        &self.linear
    }

    /// `(row, column)` to non-zero factor.
    pub fn quadratic_factors(&self) -> &BTreeMap<(usize, usize), Decimal> {
        &self.quadratic
    }

    /// Indices of the variables with a linear factor.
    pub fn linear_variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.linear.keys().copied()
    }

    /// Indices of all variables that appear in a linear or quadratic factor.
    pub fn referenced_variables(&self) -> BTreeSet<usize> {
        self.linear.keys().copied()
            .chain(self.quadratic.keys().flat_map(|&(row, column)| [row, column]))
            .collect()
    }

    #[allow(missing_docs)]
    pub fn count_linear_factors(&self) -> usize {
        self.linear.len()
    }

    #[allow(missing_docs)]
    pub fn count_quadratic_factors(&self) -> usize {
        self.quadratic.len()
    }

    /// Value of the linear and quadratic part in a point.
    ///
    /// # Arguments
    ///
    /// * `point`: A value for every variable in the model.
    ///
    /// # Return value
    ///
    /// `None` if the value, or a term of it, doesn't fit in a decimal.
    ///
    /// # Panics
    ///
    /// When a factor refers to a variable outside of the point.
    pub fn evaluate(&self, point: &[Decimal]) -> Option<Decimal> {
        let largest = self.referenced_variables().last().copied();
        assert!(
            largest.is_none_or(|index| index < point.len()),
            "Expression \"{}\" can't be evaluated in a point of dimension {}", self.name, point.len(),
        );

        let linear = self.linear.iter()
            .try_fold(Decimal::ZERO, |total, (&j, factor)| total.checked_add(factor.checked_mul(point[j])?))?;
        self.quadratic.iter()
            .try_fold(linear, |total, (&(row, column), factor)| {
                total.checked_add(factor.checked_mul(point[row])?.checked_mul(point[column])?)
            })
    }

    /// Remove the fixed variables, moving their contribution into the bounds.
    ///
    /// A product of a fixed and a free variable becomes a linear factor of the free variable.
    ///
    /// # Arguments
    ///
    /// * `fixed`: Variable index to fixed value.
    ///
    /// # Return value
    ///
    /// This expression itself if no factor refers to a fixed variable, a modified copy otherwise.
    /// The copy has the same name. `None` if the contribution of the fixed variables doesn't fit
    /// in a decimal.
    pub fn compensate(&self, fixed: &BTreeMap<usize, Decimal>) -> Option<Cow<'_, Expression>> {
        let touches_fixed = self.linear.keys().any(|j| fixed.contains_key(j))
            || self.quadratic.keys().any(|(row, column)| fixed.contains_key(row) || fixed.contains_key(column));
        if !touches_fixed {
            return Some(Cow::Borrowed(self));
        }

        let mut compensated = Expression {
            name: self.name.clone(),
            limits: self.limits,
            linear: Rc::new(BTreeMap::new()),
            quadratic: Rc::new(BTreeMap::new()),
            infeasible: self.infeasible,
            redundant: self.redundant,
        };

        let mut constant = Decimal::ZERO;
        for (&j, &factor) in self.linear.iter() {
            match fixed.get(&j) {
                Some(&value) => constant = constant.checked_add(factor.checked_mul(value)?)?,
                None => compensated.add_linear(j, factor),
            }
        }
        for (&(row, column), &factor) in self.quadratic.iter() {
            match (fixed.get(&row), fixed.get(&column)) {
                (Some(&left), Some(&right)) => {
                    constant = constant.checked_add(factor.checked_mul(left)?.checked_mul(right)?)?;
                },
                (Some(&value), None) => compensated.try_add_linear(column, factor.checked_mul(value)?)?,
                (None, Some(&value)) => compensated.try_add_linear(row, factor.checked_mul(value)?)?,
                (None, None) => compensated.set_product(row, column, factor),
            }
        }

        // Beyond what a decimal holds, the bound is no restriction
        let lower = self.lower_limit().and_then(|lower| lower.checked_sub(constant));
        let upper = self.upper_limit().and_then(|upper| upper.checked_sub(constant));
        compensated.lower(lower).upper(upper);

        Some(Cow::Owned(compensated))
    }

    /// Bounds on the linear factors of the free variables.
    ///
    /// The contribution of the fixed variables to the linear part is subtracted from both bounds.
    /// The quadratic part is ignored. A bound that ends up beyond what a decimal holds is missing.
    ///
    /// # Return value
    ///
    /// `None` if the contribution of the fixed variables doesn't fit in a decimal.
    pub fn compensated_bounds(&self, fixed: &BTreeMap<usize, Decimal>) -> Option<(Option<Decimal>, Option<Decimal>)> {
        let constant = self.linear.iter()
            .filter_map(|(j, factor)| fixed.get(j).map(|value| factor.checked_mul(*value)))
            .try_fold(Decimal::ZERO, |total, term| total.checked_add(term?))?;

        Some((
            self.lower_limit().and_then(|lower| lower.checked_sub(constant)),
            self.upper_limit().and_then(|upper| upper.checked_sub(constant)),
        ))
    }

    /// Only linear factors, at least one.
    pub fn is_function_linear(&self) -> bool {
        self.quadratic.is_empty() && !self.linear.is_empty()
    }

    /// Only quadratic factors, at least one.
    pub fn is_function_pure_quadratic(&self) -> bool {
        self.linear.is_empty() && !self.quadratic.is_empty()
    }

    /// At least one quadratic factor.
    pub fn is_function_quadratic(&self) -> bool {
        !self.quadratic.is_empty()
    }

    /// No factors at all.
    pub fn is_function_constant(&self) -> bool {
        self.linear.is_empty() && self.quadratic.is_empty()
    }

    /// Whether every linear term of the given variables is non-negative on the variable bounds.
    ///
    /// A term `a * x` can't become negative if `a > 0` and `x >= 0`, or if `a < 0` and `x <= 0`.
    ///
    /// # Arguments
    ///
    /// * `subset`: Variable indices to consider; indices without a factor are ignored.
    /// * `variables`: All variables of the model.
    pub fn is_positive_on(&self, subset: &BTreeSet<usize>, variables: &[Variable]) -> bool {
        self.terms_on(subset).all(|(j, factor)| {
            let variable = &variables[j];
            if factor.is_sign_positive() {
                variable.lower_limit().is_some_and(|lower| !lower.is_sign_negative() || lower.is_zero())
            } else {
                variable.upper_limit().is_some_and(|upper| upper.is_sign_negative() || upper.is_zero())
            }
        })
    }

    /// Whether every linear term of the given variables is non-positive on the variable bounds.
    ///
    /// See `is_positive_on`.
    pub fn is_negative_on(&self, subset: &BTreeSet<usize>, variables: &[Variable]) -> bool {
        self.terms_on(subset).all(|(j, factor)| {
            let variable = &variables[j];
            if factor.is_sign_positive() {
                variable.upper_limit().is_some_and(|upper| upper.is_sign_negative() || upper.is_zero())
            } else {
                variable.lower_limit().is_some_and(|lower| !lower.is_sign_negative() || lower.is_zero())
            }
        })
    }

    fn terms_on<'a>(&'a self, subset: &'a BTreeSet<usize>) -> impl Iterator<Item = (usize, Decimal)> + 'a {
        subset.iter().filter_map(|j| self.linear.get(j).map(|&factor| (*j, factor)))
    }

    /// The function of this expression, without its bounds and name.
    ///
    /// # Arguments
    ///
    /// * `arity`: Number of variables of the model.
    ///
    /// # Panics
    ///
    /// When a factor refers to a variable that is not below `arity`.
    pub fn to_function(&self, arity: usize) -> MultiaryFunction {
        assert!(
            self.referenced_variables().last().is_none_or(|&index| index < arity),
            "Expression \"{}\" refers to variables beyond {}", self.name, arity,
        );

        let linear = || {
            let mut factors = vec![Decimal::ZERO; arity];
            for (&j, &factor) in self.linear.iter() {
                factors[j] = factor;
            }
            factors
        };
        let quadratic = || {
            self.quadratic.iter().map(|(&(row, column), &factor)| (row, column, factor)).collect()
        };

        if self.is_function_constant() {
            MultiaryFunction::Constant { arity, constant: Decimal::ZERO }
        } else if self.is_function_linear() {
            MultiaryFunction::Linear { arity, factors: linear() }
        } else if self.is_function_pure_quadratic() {
            MultiaryFunction::PureQuadratic { arity, factors: quadratic() }
        } else {
            MultiaryFunction::Quadratic { arity, linear: linear(), quadratic: quadratic() }
        }
    }

    /// A copy that shares the factor maps with this expression until either one is modified.
    pub fn copy_shallow(&self) -> Expression {
        self.clone()
    }

    /// A copy with its own factor maps.
    pub fn copy_deep(&self) -> Expression {
        Expression {
            linear: Rc::new((*self.linear).clone()),
            quadratic: Rc::new((*self.quadratic).clone()),
            ..self.clone()
        }
    }

    /// Whether the factor maps are shared with another expression.
    pub fn shares_factors_with(&self, other: &Expression) -> bool {
        Rc::ptr_eq(&self.linear, &other.linear) && Rc::ptr_eq(&self.quadratic, &other.quadratic)
    }

    /// Whether presolve found that the bounds can't be satisfied.
    pub fn is_infeasible(&self) -> bool {
        self.infeasible
    }

    /// Whether presolve found that the bounds are always satisfied.
    pub fn is_redundant(&self) -> bool {
        self.redundant
    }

    pub(crate) fn mark_infeasible(&mut self) {
        self.infeasible = true;
    }

    pub(crate) fn mark_redundant(&mut self) {
        self.redundant = true;
    }

    pub(crate) fn reset_flags(&mut self) {
        self.infeasible = false;
        self.redundant = false;
    }
}

impl Bounded for Expression {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn limits_mut(&mut self) -> &mut Limits {
        &mut self.limits
    }
}

impl Weighted for Expression {}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Expression {}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let terms = self.linear.iter()
            .map(|(j, factor)| format!("{} x{}", factor.normalize(), j))
            .chain(self.quadratic.iter().map(|((row, column), factor)| {
                format!("{} x{} x{}", factor.normalize(), row, column)
            }))
            .join(" + ");
        let terms = if terms.is_empty() { "0".to_string() } else { terms };

        write!(f, "{}: ", self.name)?;
        if let Some(lower) = self.lower_limit() {
            write!(f, "{} <= ", lower.normalize())?;
        }
        write!(f, "{}", terms)?;
        if let Some(upper) = self.upper_limit() {
            write!(f, " <= {}", upper.normalize())?;
        }
        if let Some(weight) = self.contribution_weight() {
            write!(f, " (weight {})", weight.normalize())?;
        }
        if self.infeasible {
            write!(f, " [infeasible]")?;
        }
        if self.redundant {
            write!(f, " [redundant]")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::borrow::Cow;
    use std::collections::{BTreeMap, BTreeSet};

    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::data::model::entity::Bounded;
    use crate::data::model::expression::Expression;
    use crate::data::model::function::MultiaryFunction;
    use crate::data::model::variable::{Variable, VariableIndex};

    fn x(j: usize) -> VariableIndex {
        VariableIndex::new(j)
    }

    #[test]
    fn zero_removes() {
        let mut expression = Expression::new("e");
        expression.set(x(0), dec!(2)).set(x(1), dec!(3));
        assert_eq!(expression.count_linear_factors(), 2);

        expression.set(x(0), dec!(0));
        assert_eq!(expression.count_linear_factors(), 1);
        assert_eq!(expression.get(x(0)), dec!(0));

        expression.add(x(1), dec!(-3));
        assert!(expression.is_function_constant());

        expression.add_quadratic(x(0), x(1), dec!(1)).add_quadratic(x(0), x(1), dec!(1));
        assert_eq!(expression.get_quadratic(x(0), x(1)), dec!(2));
        assert!(expression.is_function_pure_quadratic());
    }

    #[test]
    fn evaluate() {
        let mut expression = Expression::new("e");
        expression.set(x(0), dec!(2)).set_quadratic(x(0), x(1), dec!(0.5));

        assert_eq!(expression.evaluate(&[dec!(3), dec!(4)]), Some(dec!(12)));
        assert_eq!(expression.evaluate(&[Decimal::MAX, dec!(0)]), None);
    }

    #[test]
    #[should_panic]
    fn evaluate_wrong_dimension() {
        let mut expression = Expression::new("e");
        expression.set(x(2), dec!(1));
        expression.evaluate(&[dec!(1), dec!(1)]);
    }

    #[test]
    fn compensate() {
        let mut expression = Expression::new("e");
        expression
            .set(x(0), dec!(2))
            .set(x(1), dec!(3))
            .set_quadratic(x(1), x(2), dec!(4))
            .lower(dec!(1))
            .upper(dec!(10));

        assert!(matches!(expression.compensate(&BTreeMap::new()), Some(Cow::Borrowed(_))));
        assert!(matches!(expression.compensate(&BTreeMap::from([(5, dec!(1))])), Some(Cow::Borrowed(_))));

        // x1 = 2: 3 * 2 moves into the bounds, 4 x1 x2 becomes 8 x2
        let compensated = expression.compensate(&BTreeMap::from([(1, dec!(2))])).unwrap();
        assert!(matches!(compensated, Cow::Owned(_)));
        assert_eq!(compensated.get(x(0)), dec!(2));
        assert_eq!(compensated.get(x(1)), dec!(0));
        assert_eq!(compensated.get(x(2)), dec!(8));
        assert!(compensated.is_function_linear());
        assert_eq!(compensated.lower_limit(), Some(dec!(-5)));
        assert_eq!(compensated.upper_limit(), Some(dec!(4)));

        assert_eq!(
            expression.compensated_bounds(&BTreeMap::from([(0, dec!(1))])),
            Some((Some(dec!(-1)), Some(dec!(8)))),
        );

        let huge = BTreeMap::from([(0, Decimal::MAX)]);
        assert_eq!(expression.compensated_bounds(&huge), None);
        assert!(expression.compensate(&huge).is_none());
        // The constant fits, the lower bound minus the constant doesn't
        let mut bounded = Expression::new("f");
        bounded.set(x(0), dec!(-1)).set(x(1), dec!(1)).lower(-Decimal::MAX).upper(dec!(0));
        assert_eq!(bounded.compensated_bounds(&BTreeMap::from([(0, dec!(-2))])), Some((None, Some(dec!(-2)))));
    }

    #[test]
    fn shallow_and_deep_copies() {
        let mut original = Expression::new("e");
        original.set(x(0), dec!(1));

        let mut shallow = original.copy_shallow();
        let deep = original.copy_deep();
        assert!(shallow.shares_factors_with(&original));
        assert!(!deep.shares_factors_with(&original));

        shallow.set(x(1), dec!(1));
        assert!(!shallow.shares_factors_with(&original));
        assert_eq!(original.count_linear_factors(), 1);
        assert_eq!(shallow.count_linear_factors(), 2);
    }

    #[test]
    fn sign_on_bounds() {
        let mut nonnegative = Variable::new("a");
        nonnegative.lower(dec!(0));
        let mut nonpositive = Variable::new("b");
        nonpositive.upper(dec!(0));
        let free = Variable::new("c");
        let variables = [nonnegative, nonpositive, free];

        let mut expression = Expression::new("e");
        expression.set(x(0), dec!(2)).set(x(1), dec!(-1)).set(x(2), dec!(1));

        let first_two = BTreeSet::from([0, 1]);
        assert!(expression.is_positive_on(&first_two, &variables));
        assert!(!expression.is_negative_on(&first_two, &variables));
        assert!(!expression.is_positive_on(&BTreeSet::from([0, 1, 2]), &variables));

        expression.set(x(0), dec!(-2)).set(x(1), dec!(1));
        assert!(expression.is_negative_on(&first_two, &variables));
    }

    #[test]
    fn to_function() {
        let mut expression = Expression::new("e");
        assert_eq!(expression.to_function(2), MultiaryFunction::Constant { arity: 2, constant: dec!(0) });

        expression.set(x(1), dec!(3));
        assert_eq!(expression.to_function(2), MultiaryFunction::Linear { arity: 2, factors: vec![dec!(0), dec!(3)] });

        expression.set_quadratic(x(0), x(0), dec!(1));
        assert_eq!(
            expression.to_function(2),
            MultiaryFunction::Quadratic {
                arity: 2,
                linear: vec![dec!(0), dec!(3)],
                quadratic: vec![(0, 0, dec!(1))],
            },
        );
    }
}
