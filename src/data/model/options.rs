//! # Options
//!
//! Everything that can be configured about a model: the tolerance of feasibility checks, whether
//! and how to presolve, and which solvers can be used. The caller owns these values; there is no
//! global state.
use crate::algorithm::registry::IntegrationRegistry;
use crate::data::model::presolve::PresolverSet;
use crate::data::number_types::NumberContext;

/// Configuration of a model.
#[derive(Debug)]
pub struct Options {
    /// Working precision for feasibility checks, validation and presolving.
    pub feasibility: NumberContext,
    /// Whether to presolve before solving.
    pub presolve: bool,
    /// Number of consecutive presolve steps that only tighten bounds, after which presolving
    /// stops. `None` uses the number of variables plus the number of expressions.
    pub tightening_limit: Option<usize>,
    /// Rules used when presolving.
    pub presolvers: PresolverSet,
    /// Integrations that can build a solver for the model.
    pub integrations: IntegrationRegistry,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            feasibility: NumberContext::default(),
            presolve: true,
            tightening_limit: None,
            presolvers: PresolverSet::standard(),
            integrations: IntegrationRegistry::default(),
        }
    }
}
