//! # Models without solvers
//!
//! Everything that can be done with a model before and after solving it.

#[allow(missing_docs)]
mod test;
