//! # Construction errors
//!
//! Problems with the way a model was put together. Outcomes of optimisation, such as an infeasible
//! or unbounded model, are not errors; they are a `State`.
use rust_decimal::Decimal;
use thiserror::Error;

/// A model that was constructed incorrectly.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ModelError {
    /// A variable or expression with a lower bound above its upper bound.
    #[error("\"{entity}\" has lower bound {lower} above its upper bound {upper}")]
    InconsistentBounds {
        /// Name of the variable or expression.
        entity: String,
        #[allow(missing_docs)]
        lower: Decimal,
        #[allow(missing_docs)]
        upper: Decimal,
    },
    /// An expression with a factor on a variable that is not part of the model.
    #[error("expression \"{expression}\" refers to variable {index}, which doesn't exist")]
    UnknownVariable {
        #[allow(missing_docs)]
        expression: String,
        #[allow(missing_docs)]
        index: usize,
    },
    /// Two expressions with the same name.
    #[error("an expression named \"{0}\" already exists")]
    DuplicateExpression(String),
    /// No registered integration can solve the model.
    #[error("no registered integration is capable of solving this model")]
    NoCapableIntegration,
}
