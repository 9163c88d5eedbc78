//! # Bounds and weights
//!
//! Variables and expressions both have an optional lower and upper bound, which make them a
//! constraint, and an optional weight, which makes them contribute to the objective function. The
//! `Bounded` and `Weighted` traits provide that shared behaviour on top of a `Limits` value that
//! both structs contain.
use std::fmt;
use std::fmt::{Display, Formatter};

use enum_map::{EnumMap, enum_map};
use log::warn;
use rust_decimal::Decimal;

use crate::data::model::elements::BoundDirection;
use crate::data::number_types::NumberContext;

/// Bounds and objective weight of a variable or an expression.
///
/// A missing bound means unbounded in that direction. A missing weight means no contribution to
/// the objective; a zero weight is never stored.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Limits {
    bounds: EnumMap<BoundDirection, Option<Decimal>>,
    weight: Option<Decimal>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            bounds: enum_map! { _ => None },
            weight: None,
        }
    }
}

impl Limits {
    /// Bound in a direction, `None` if unbounded.
    pub fn bound(&self, direction: BoundDirection) -> Option<Decimal> {
        self.bounds[direction]
    }

    pub(crate) fn set_bound(&mut self, direction: BoundDirection, value: Option<Decimal>) {
        self.bounds[direction] = value;
    }

    /// Objective weight, `None` if no contribution.
    pub fn weight(&self) -> Option<Decimal> {
        self.weight
    }

    pub(crate) fn set_weight(&mut self, weight: Option<Decimal>) {
        self.weight = weight.filter(|value| !value.is_zero());
    }
}

impl Display for Limits {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.bound(BoundDirection::Lower) {
            Some(lower) => write!(f, "{} <= ", lower.normalize())?,
            None => write!(f, "-inf <= ")?,
        }
        write!(f, "[...]")?;
        match self.bound(BoundDirection::Upper) {
            Some(upper) => write!(f, " <= {}", upper.normalize())?,
            None => write!(f, " <= +inf")?,
        }
        if let Some(weight) = self.weight {
            write!(f, " ({})", weight.normalize())?;
        }

        Ok(())
    }
}

/// Receives diagnostics during validation.
///
/// Validation never stops at the first violation, such that every problem can be reported.
pub trait Reporter {
    /// Receive a single message.
    fn report(&mut self, message: String);
}

/// Collects messages, mostly useful in tests.
impl Reporter for Vec<String> {
    fn report(&mut self, message: String) {
        self.push(message);
    }
}

/// Writes messages to the log as warnings.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, message: String) {
        warn!("{}", message);
    }
}

/// An entity that can be bounded from below and above.
pub trait Bounded {
    /// Name of the entity, used as its identity and in diagnostics.
    fn name(&self) -> &str;
    /// The bounds and weight of the entity.
    fn limits(&self) -> &Limits;
    /// The bounds and weight of the entity.
    fn limits_mut(&mut self) -> &mut Limits;

    /// Set or clear the lower bound.
    fn lower(&mut self, value: impl Into<Option<Decimal>>) -> &mut Self where Self: Sized {
        self.limits_mut().set_bound(BoundDirection::Lower, value.into());
        self
    }

    /// Set or clear the upper bound.
    fn upper(&mut self, value: impl Into<Option<Decimal>>) -> &mut Self where Self: Sized {
        self.limits_mut().set_bound(BoundDirection::Upper, value.into());
        self
    }

    /// Set both bounds to the same value, making the entity an equality constraint.
    fn level(&mut self, value: Decimal) -> &mut Self where Self: Sized {
        self.limits_mut().set_bound(BoundDirection::Lower, Some(value));
        self.limits_mut().set_bound(BoundDirection::Upper, Some(value));
        self
    }

    /// Lower bound, if any.
    fn lower_limit(&self) -> Option<Decimal> {
        self.limits().bound(BoundDirection::Lower)
    }

    /// Upper bound, if any.
    fn upper_limit(&self) -> Option<Decimal> {
        self.limits().bound(BoundDirection::Upper)
    }

    /// Whether a lower bound is set.
    fn is_lower_limit_set(&self) -> bool {
        self.lower_limit().is_some()
    }

    /// Whether an upper bound is set.
    fn is_upper_limit_set(&self) -> bool {
        self.upper_limit().is_some()
    }

    /// Whether any bound is set.
    fn is_constraint(&self) -> bool {
        self.is_lower_limit_set() || self.is_upper_limit_set()
    }

    /// Whether both bounds are set and equal.
    fn is_equality_constraint(&self) -> bool {
        matches!((self.lower_limit(), self.upper_limit()), (Some(lower), Some(upper)) if lower == upper)
    }

    /// Whether the bounds don't contradict each other.
    fn are_bounds_consistent(&self) -> bool {
        match (self.lower_limit(), self.upper_limit()) {
            (Some(lower), Some(upper)) => lower <= upper,
            _ => true,
        }
    }

    /// The value closest to zero that satisfies both bounds.
    ///
    /// Only meaningful if the bounds are consistent.
    fn feasible_value_nearest_zero(&self) -> Decimal {
        let mut value = Decimal::ZERO;
        if let Some(lower) = self.lower_limit() {
            value = value.max(lower);
        }
        if let Some(upper) = self.upper_limit() {
            value = value.min(upper);
        }

        value
    }

    /// Check a value against the bounds.
    ///
    /// Doesn't stop at the first violation, all violations are sent to the reporter.
    ///
    /// # Arguments
    ///
    /// * `value`: Value of the entity to check, such as the value of a variable or an evaluated
    /// expression.
    /// * `context`: Tolerance with which to compare.
    /// * `reporter`: Receives a message for each violated bound.
    ///
    /// # Return value
    ///
    /// Whether the value is within the bounds.
    fn validate(&self, value: Decimal, context: &NumberContext, reporter: &mut dyn Reporter) -> bool {
        let mut valid = true;

        if let Some(lower) = self.lower_limit() {
            if !context.is_greater_or_equal(value, lower) {
                reporter.report(format!(
                    "{}: {} is below the lower bound {}", self.name(), value.normalize(), lower.normalize(),
                ));
                valid = false;
            }
        }
        if let Some(upper) = self.upper_limit() {
            if !context.is_less_or_equal(value, upper) {
                reporter.report(format!(
                    "{}: {} is above the upper bound {}", self.name(), value.normalize(), upper.normalize(),
                ));
                valid = false;
            }
        }

        valid
    }
}

/// An entity that can contribute to the objective function.
pub trait Weighted: Bounded {
    /// Set the objective weight, zero meaning no contribution.
    fn weight(&mut self, weight: impl Into<Option<Decimal>>) -> &mut Self where Self: Sized {
        self.limits_mut().set_weight(weight.into());
        self
    }

    /// Objective weight, if any.
    fn contribution_weight(&self) -> Option<Decimal> {
        self.limits().weight()
    }

    /// Whether this entity contributes to the objective function.
    fn is_objective(&self) -> bool {
        self.contribution_weight().is_some()
    }
}
