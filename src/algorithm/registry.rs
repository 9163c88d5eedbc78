//! # Integration registry
//!
//! A caller-owned collection of integrations, consulted in a fixed order: the preferred
//! integrations, then the built-in integration for the shape of the problem, then the fallback
//! integrations. The first one that is capable of solving the model is used.
use enum_map::EnumMap;
use log::debug;

use crate::algorithm::Integration;
use crate::data::model::ExpressionsBasedModel;
use crate::data::model::elements::ProblemShape;
use crate::data::model::error::ModelError;

/// Position of an integration in a registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IntegrationKey {
    /// Index in the preferred list.
    Preferred(usize),
    /// Built-in slot for a problem shape.
    Builtin(ProblemShape),
    /// Index in the fallback list.
    Fallback(usize),
}

/// Integrations available to a model.
///
/// The built-in slots are empty by default: this crate doesn't provide solvers.
#[derive(Debug, Default)]
pub struct IntegrationRegistry {
    preferred: Vec<Box<dyn Integration>>,
    builtin: EnumMap<ProblemShape, Option<Box<dyn Integration>>>,
    fallback: Vec<Box<dyn Integration>>,
}

impl IntegrationRegistry {
    /// Add an integration to try before all others.
    ///
    /// Integrations added earlier are tried first.
    pub fn add_preferred(&mut self, integration: impl Integration + 'static) -> &mut Self {
        self.preferred.push(Box::new(integration));
        self
    }

    /// Remove a preferred integration by name.
    ///
    /// # Return value
    ///
    /// Whether an integration with that name was present.
    pub fn remove_preferred(&mut self, name: &str) -> bool {
        remove_by_name(&mut self.preferred, name)
    }

    /// Remove all preferred integrations.
    pub fn clear_preferred(&mut self) {
        self.preferred.clear();
    }

    /// Add an integration to try after all others.
    pub fn add_fallback(&mut self, integration: impl Integration + 'static) -> &mut Self {
        self.fallback.push(Box::new(integration));
        self
    }

    /// Remove a fallback integration by name.
    pub fn remove_fallback(&mut self, name: &str) -> bool {
        remove_by_name(&mut self.fallback, name)
    }

    /// Remove all fallback integrations.
    pub fn clear_fallback(&mut self) {
        self.fallback.clear();
    }

    /// Install the integration used for problems of a shape, replacing any existing one.
    pub fn set_builtin(&mut self, shape: ProblemShape, integration: impl Integration + 'static) -> &mut Self {
        self.builtin[shape] = Some(Box::new(integration));
        self
    }

    /// Remove the integration used for problems of a shape.
    pub fn clear_builtin(&mut self, shape: ProblemShape) {
        self.builtin[shape] = None;
    }

    /// The integration at a position, if there is one.
    pub fn get(&self, key: IntegrationKey) -> Option<&dyn Integration> {
        match key {
            IntegrationKey::Preferred(index) => self.preferred.get(index).map(Box::as_ref),
            IntegrationKey::Builtin(shape) => self.builtin[shape].as_deref(),
            IntegrationKey::Fallback(index) => self.fallback.get(index).map(Box::as_ref),
        }
    }

    /// Find the first integration that is capable of solving the model.
    ///
    /// # Return value
    ///
    /// The position and the integration itself, or an error if none of them is capable.
    pub fn select(&self, model: &ExpressionsBasedModel) -> Result<(IntegrationKey, &dyn Integration), ModelError> {
        let shape = model.problem_shape();

        let preferred = self.preferred.iter()
            .enumerate()
            .map(|(index, integration)| (IntegrationKey::Preferred(index), integration.as_ref()));
        let builtin = self.builtin[shape].as_deref()
            .map(|integration| (IntegrationKey::Builtin(shape), integration));
        let fallback = self.fallback.iter()
            .enumerate()
            .map(|(index, integration)| (IntegrationKey::Fallback(index), integration.as_ref()));

        let selected = preferred
            .chain(builtin)
            .chain(fallback)
            .find(|(_, integration)| integration.is_capable(model));
        match selected {
            Some((key, integration)) => {
                debug!("Selected integration {} ({:?}) for a {:?} problem", integration.name(), key, shape);
                Ok((key, integration))
            },
            None => Err(ModelError::NoCapableIntegration),
        }
    }
}

fn remove_by_name(integrations: &mut Vec<Box<dyn Integration>>, name: &str) -> bool {
    let before = integrations.len();
    integrations.retain(|integration| integration.name() != name);
    integrations.len() < before
}
