//! # Expressions based optimisation models
//!
//! Optimisation problems (linear, quadratic, mixed integer) are built declaratively from
//! variables and expressions over those variables. Before the problem is handed to a solver, a
//! presolve procedure simplifies it using exact decimal arithmetic: bounds are tightened,
//! variables are fixed and constraints are recognized as redundant or infeasible.
//!
//! Solvers are not part of this crate. They are plugged in through the `Integration` trait, which
//! builds a solver for a model and translates solutions between the variables of the model and the
//! variables the solver works with.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;

pub use crate::algorithm::{Integration, Solver, UpdatableSolver};
pub use crate::algorithm::registry::{IntegrationKey, IntegrationRegistry};
pub use crate::data::model::ExpressionsBasedModel;
pub use crate::data::model::elements::{BoundDirection, Category, Objective, ProblemShape};
pub use crate::data::model::entity::{Bounded, LogReporter, Reporter, Weighted};
pub use crate::data::model::error::ModelError;
pub use crate::data::model::expression::Expression;
pub use crate::data::model::function::MultiaryFunction;
pub use crate::data::model::options::Options;
pub use crate::data::model::presolve::{Change, Presolver, PresolverSet, Workspace};
pub use crate::data::model::solution::{OptimisationResult, State};
pub use crate::data::model::variable::{Variable, VariableIndex};
pub use crate::data::number_types::NumberContext;
