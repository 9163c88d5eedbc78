//! # Plain functions
//!
//! Solvers don't need names, bounds or sparse maps keyed by model indices. An expression can be
//! turned into one of these functions over a fixed number of arguments instead.
use rust_decimal::Decimal;

/// A function of `arity` arguments.
///
/// Quadratic terms are stored as `(row, column, factor)` with the meaning `factor * x_row *
/// x_column`; both `(i, j)` and `(j, i)` may appear.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MultiaryFunction {
    /// Doesn't depend on its arguments.
    Constant {
        /// Number of arguments.
        arity: usize,
        /// The value everywhere.
        constant: Decimal,
    },
    /// Weighted sum of the arguments.
    Linear {
        /// Number of arguments.
        arity: usize,
        /// One factor per argument, dense.
        factors: Vec<Decimal>,
    },
    /// Only products of two arguments.
    PureQuadratic {
        /// Number of arguments.
        arity: usize,
        /// Sparse `(row, column, factor)` terms.
        factors: Vec<(usize, usize, Decimal)>,
    },
    /// Both a linear and a quadratic part.
    Quadratic {
        /// Number of arguments.
        arity: usize,
        /// One factor per argument, dense.
        linear: Vec<Decimal>,
        /// Sparse `(row, column, factor)` terms.
        quadratic: Vec<(usize, usize, Decimal)>,
    },
}

impl MultiaryFunction {
    /// Number of arguments.
    pub fn arity(&self) -> usize {
        match self {
            Self::Constant { arity, .. }
            | Self::Linear { arity, .. }
            | Self::PureQuadratic { arity, .. }
            | Self::Quadratic { arity, .. } => *arity,
        }
    }

    /// Evaluate in a point.
    ///
    /// # Panics
    ///
    /// If the point doesn't have `arity` elements.
    pub fn value(&self, point: &[Decimal]) -> Decimal {
        assert_eq!(point.len(), self.arity(), "Point has the wrong dimension");

        match self {
            Self::Constant { constant, .. } => *constant,
            Self::Linear { factors, .. } => linear_value(factors, point),
            Self::PureQuadratic { factors, .. } => quadratic_value(factors, point),
            Self::Quadratic { linear, quadratic, .. } => {
                linear_value(linear, point) + quadratic_value(quadratic, point)
            },
        }
    }

    /// Gradient in a point.
    ///
    /// # Panics
    ///
    /// If the point doesn't have `arity` elements.
    pub fn gradient(&self, point: &[Decimal]) -> Vec<Decimal> {
        assert_eq!(point.len(), self.arity(), "Point has the wrong dimension");

        let mut gradient = vec![Decimal::ZERO; self.arity()];
        match self {
            Self::Constant { .. } => {},
            Self::Linear { factors, .. } => gradient.clone_from(factors),
            Self::PureQuadratic { factors, .. } => add_quadratic_gradient(&mut gradient, factors, point),
            Self::Quadratic { linear, quadratic, .. } => {
                gradient.clone_from(linear);
                add_quadratic_gradient(&mut gradient, quadratic, point);
            },
        }

        gradient
    }

    /// Dense, symmetric matrix of second derivatives. Constant for these functions.
    pub fn hessian(&self) -> Vec<Vec<Decimal>> {
        let arity = self.arity();
        let mut hessian = vec![vec![Decimal::ZERO; arity]; arity];

        if let Self::PureQuadratic { factors: quadratic, .. } | Self::Quadratic { quadratic, .. } = self {
            for &(row, column, factor) in quadratic {
                hessian[row][column] += factor;
                hessian[column][row] += factor;
            }
        }

        hessian
    }
}

fn linear_value(factors: &[Decimal], point: &[Decimal]) -> Decimal {
    factors.iter().zip(point).map(|(factor, x)| factor * x).sum()
}

fn quadratic_value(factors: &[(usize, usize, Decimal)], point: &[Decimal]) -> Decimal {
    factors.iter().map(|&(row, column, factor)| factor * point[row] * point[column]).sum()
}

fn add_quadratic_gradient(gradient: &mut [Decimal], factors: &[(usize, usize, Decimal)], point: &[Decimal]) {
    for &(row, column, factor) in factors {
        gradient[row] += factor * point[column];
        gradient[column] += factor * point[row];
    }
}
