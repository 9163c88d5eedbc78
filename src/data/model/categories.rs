//! # Variable categories
//!
//! Solvers work with subsets of the variables of a model: all variables that are not fixed, or
//! only the integer ones. These subsets are derived from the variables in one pass and cached
//! until the model changes.
use std::cell::{Ref, RefCell};

use enum_map::EnumMap;

use crate::data::model::elements::Category;
use crate::data::model::entity::Bounded;
use crate::data::model::variable::Variable;

/// Value that is derived from a model and valid for one generation of that model.
///
/// The model increments its generation whenever something changes that the value depends on; the
/// value is then recomputed on the next read.
#[derive(Debug)]
pub(crate) struct Generational<T> {
    cached: RefCell<Option<(u64, T)>>,
}

impl<T> Generational<T> {
    pub(crate) fn new() -> Self {
        Self { cached: RefCell::new(None) }
    }

    /// Read the value, computing it first if it is missing or from another generation.
    pub(crate) fn get(&self, generation: u64, compute: impl FnOnce() -> T) -> Ref<'_, T> {
        let is_current = matches!(&*self.cached.borrow(), Some((stamp, _)) if *stamp == generation);
        if !is_current {
            *self.cached.borrow_mut() = Some((generation, compute()));
        }

        Ref::map(self.cached.borrow(), |cached| match cached {
            Some((_, value)) => value,
            None => unreachable!("value was computed above"),
        })
    }

    pub(crate) fn invalidate(&mut self) {
        *self.cached.get_mut() = None;
    }
}

/// Members of each category and the position of each variable within them.
#[derive(Debug)]
pub(crate) struct Categorisation {
    members: EnumMap<Category, Vec<usize>>,
    /// Per category, variable index to position in `members`.
    local: EnumMap<Category, Vec<Option<usize>>>,
}

impl Categorisation {
    /// Categorise all variables in one pass.
    pub(crate) fn compute(variables: &[Variable]) -> Self {
        let mut members = EnumMap::<Category, Vec<usize>>::default();
        let mut local = EnumMap::<Category, Vec<Option<usize>>>::default();
        for positions in local.values_mut() {
            positions.resize(variables.len(), None);
        }

        for (j, variable) in variables.iter().enumerate() {
            for (category, positions) in local.iter_mut() {
                if belongs_to(variable, category) {
                    positions[j] = Some(members[category].len());
                    members[category].push(j);
                }
            }
        }

        Self { members, local }
    }

    pub(crate) fn members(&self, category: Category) -> &[usize] {
        &self.members[category]
    }

    pub(crate) fn local_index(&self, category: Category, variable: usize) -> Option<usize> {
        self.local[category].get(variable).copied().flatten()
    }
}

fn belongs_to(variable: &Variable, category: Category) -> bool {
    if variable.is_fixed() {
        return false;
    }

    match category {
        Category::Free => true,
        Category::Positive => !variable.upper_limit().is_some_and(|upper| upper.is_sign_negative() || upper.is_zero()),
        Category::Negative => !variable.lower_limit().is_some_and(|lower| !lower.is_sign_negative() || lower.is_zero()),
        Category::Integer => variable.is_integer(),
    }
}
