//! # Storing of optimisation models in memory
//!
//! This module provides the data structures used to represent models in memory, together with the
//! presolve procedure that operates on them. Solver integrations live in `algorithm`.

pub mod model;
pub mod number_types;
