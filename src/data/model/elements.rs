//! # Building blocks to describe models.
use std::ops::{Mul, Not};

use enum_map::Enum;
use num_traits::Signed;

/// Direction of a bound.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum BoundDirection {
    /// The value should be at least the bound.
    Lower,
    /// The value should be at most the bound.
    Upper,
}

impl Not for BoundDirection {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

/// Sign of a value known not to be zero, such as a stored coefficient.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NonZeroSign {
    #[allow(missing_docs)]
    Positive,
    #[allow(missing_docs)]
    Negative,
}

impl<T: Signed> From<&T> for NonZeroSign {
    fn from(value: &T) -> Self {
        debug_assert!(!value.is_zero());

        if value.is_positive() {
            NonZeroSign::Positive
        } else {
            NonZeroSign::Negative
        }
    }
}

/// Which bound of a variable bounds a term `coefficient * variable`.
///
/// A term with a negative coefficient is largest when the variable is at its lower bound.
impl Mul<NonZeroSign> for BoundDirection {
    type Output = Self;

    fn mul(self, sign: NonZeroSign) -> Self::Output {
        match sign {
            NonZeroSign::Positive => self,
            NonZeroSign::Negative => !self,
        }
    }
}

/// Direction of optimisation.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Objective {
    #[default]
    Minimise,
    Maximise,
}

/// Rough classification of a model, used to pick a built-in integration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum ProblemShape {
    /// Only linear expressions and continuous variables.
    Linear,
    /// Quadratic expressions, no integer variables.
    ConvexQuadratic,
    /// At least one integer variable.
    MixedInteger,
}

/// Categories of variables, as handed to solvers.
///
/// Every category only contains variables that are not fixed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum Category {
    /// Not fixed.
    Free,
    /// Can take a positive value: no upper bound, or a positive one.
    Positive,
    /// Can take a negative value: no lower bound, or a negative one.
    Negative,
    /// Integer and not fixed.
    Integer,
}
