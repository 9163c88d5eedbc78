//! # Results of optimisation
//!
//! A `State` describes how good a result is. States form a total preorder: the magnitude is the
//! strength of the result, the sign tells whether it is a success or a failure.
use std::fmt;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use rust_decimal::Decimal;

/// Quality of a solution, backed by a signed integer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct State(i8);

impl State {
    /// Nothing is known yet.
    pub const UNEXPLORED: Self = Self(0);
    /// A solution that satisfies the bounds of the variables.
    pub const VALID: Self = Self(2);
    /// Feasible up to a tolerance larger than the working precision.
    pub const APPROXIMATE: Self = Self(3);
    /// A solution that satisfies all constraints.
    pub const FEASIBLE: Self = Self(4);
    /// A feasible solution with the best objective value.
    pub const OPTIMAL: Self = Self(6);
    /// The only solution: all variables are fixed.
    pub const DISTINCT: Self = Self(8);

    /// The solver didn't produce anything usable.
    pub const FAILED: Self = Self(-1);
    /// The only candidate violates the constraints.
    pub const INVALID: Self = Self(-2);
    /// No solution exists.
    pub const INFEASIBLE: Self = Self(-3);
    /// The objective value can be improved without limit.
    pub const UNBOUNDED: Self = Self(-5);

    /// Strength of the state, regardless of success.
    pub fn strength(self) -> u8 {
        self.0.unsigned_abs()
    }

    /// At least as strong as `FEASIBLE`.
    pub fn is_feasible(self) -> bool {
        self.strength() >= Self::FEASIBLE.strength()
    }

    /// At least as strong as `OPTIMAL`.
    pub fn is_optimal(self) -> bool {
        self.strength() >= Self::OPTIMAL.strength()
    }

    /// At least as strong as `DISTINCT`.
    pub fn is_distinct(self) -> bool {
        self.strength() >= Self::DISTINCT.strength()
    }

    #[allow(missing_docs)]
    pub fn is_failure(self) -> bool {
        self.0 < 0
    }

    #[allow(missing_docs)]
    pub fn is_success(self) -> bool {
        self.0 > 0
    }

    #[allow(missing_docs)]
    pub fn is_unexplored(self) -> bool {
        self.0 == 0
    }

    fn name(self) -> &'static str {
        match self {
            Self::UNEXPLORED => "UNEXPLORED",
            Self::VALID => "VALID",
            Self::APPROXIMATE => "APPROXIMATE",
            Self::FEASIBLE => "FEASIBLE",
            Self::OPTIMAL => "OPTIMAL",
            Self::DISTINCT => "DISTINCT",
            Self::FAILED => "FAILED",
            Self::INVALID => "INVALID",
            Self::INFEASIBLE => "INFEASIBLE",
            Self::UNBOUNDED => "UNBOUNDED",
            _ => "UNKNOWN",
        }
    }
}

impl Default for State {
    fn default() -> Self {
        Self::UNEXPLORED
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of solving a model.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OptimisationResult {
    state: State,
    /// `None` when not evaluated.
    value: Option<Decimal>,
    solution: Vec<Decimal>,
}

impl OptimisationResult {
    /// Create a new result.
    ///
    /// # Arguments
    ///
    /// * `state`: Quality of the solution.
    /// * `value`: Objective value, if it was evaluated.
    /// * `solution`: A value per variable, in model space or in solver space depending on who
    /// creates the result.
    pub fn new(state: State, value: Option<Decimal>, solution: Vec<Decimal>) -> Self {
        Self { state, value, solution }
    }

    /// A result without a solution.
    pub fn of_state(state: State) -> Self {
        Self::new(state, None, Vec::new())
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Objective value, `None` if it wasn't evaluated.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    #[allow(missing_docs)]
    pub fn solution(&self) -> &[Decimal] {
        &self.solution
    }

    /// Take ownership of the solution vector.
    pub fn into_solution(self) -> Vec<Decimal> {
        self.solution
    }

    /// Same solution and value, another state.
    pub fn with_state(self, state: State) -> Self {
        Self { state, ..self }
    }
}

impl Display for OptimisationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state)?;
        match self.value {
            Some(value) => write!(f, " {}", value.normalize())?,
            None => write!(f, " NaN")?,
        }
        write!(f, " @ [{}]", self.solution.iter().map(|value| value.normalize()).join(", "))
    }
}
