//! # Variables
//!
//! A variable is identified by its position in the model that owns it. That position is assigned
//! once, when the variable is added, and never changes afterwards.
use std::fmt;
use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;

use crate::data::model::entity::{Bounded, Limits, Weighted};

/// Position of a variable in the model that owns it.
///
/// Only handed out by a model, such that factors can't be set on variables that don't exist.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VariableIndex(usize);

impl VariableIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the variable in the model.
    pub fn get(self) -> usize {
        self.0
    }
}

impl From<VariableIndex> for usize {
    fn from(index: VariableIndex) -> Self {
        index.0
    }
}

impl Display for VariableIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decision variable.
#[derive(Clone, Debug)]
pub struct Variable {
    name: String,
    index: Option<usize>,
    limits: Limits,
    integer: bool,
    /// Pinned value, independent of the bounds.
    fixed: Option<Decimal>,
    /// Whether `fixed` only holds for the current objective, it is derived again by every presolve.
    provisional: bool,
    /// Latest value written back by a solve.
    value: Option<Decimal>,
    unbounded: bool,
    infeasible: bool,
}

impl Variable {
    /// Create a free, continuous variable without bounds.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            limits: Limits::default(),
            integer: false,
            fixed: None,
            provisional: false,
            value: None,
            unbounded: false,
            infeasible: false,
        }
    }

    /// Make the variable integer or continuous.
    pub fn integer(&mut self, integer: bool) -> &mut Self {
        self.integer = integer;
        self
    }

    /// Make the variable integer with bounds zero and one.
    pub fn binary(&mut self) -> &mut Self {
        self.integer(true).lower(Decimal::ZERO).upper(Decimal::ONE)
    }

    /// Make the variable continuous.
    pub fn relax(&mut self) -> &mut Self {
        self.integer(false)
    }

    /// Position of the variable in its model, if it has been added to one.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Assign the position in the model.
    ///
    /// # Panics
    ///
    /// When the variable already has a different index.
    pub(crate) fn set_index(&mut self, index: usize) {
        match self.index {
            None => self.index = Some(index),
            Some(existing) => assert_eq!(existing, index, "Variable \"{}\" can't be moved", self.name),
        }
    }

    /// Whether the variable can only take integer values.
    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// Integer with lower bound 0 and upper bound 1.
    pub fn is_binary(&self) -> bool {
        self.integer
            && self.lower_limit() == Some(Decimal::ZERO)
            && self.upper_limit() == Some(Decimal::ONE)
    }

    /// Whether a value has been pinned for this variable.
    pub fn is_fixed(&self) -> bool {
        self.fixed.is_some()
    }

    /// The pinned value, if any.
    pub fn fixed_value(&self) -> Option<Decimal> {
        self.fixed
    }

    /// Pin the variable to a value.
    ///
    /// The bounds stay as they are, a value outside of them makes the model invalid.
    pub(crate) fn fix(&mut self, value: Decimal) {
        self.fixed = Some(value);
        self.provisional = false;
    }

    /// Pin the variable to the best value for the current objective.
    pub(crate) fn fix_provisionally(&mut self, value: Decimal) {
        self.fixed = Some(value);
        self.provisional = true;
    }

    /// Undo a provisional fixing and forget whether the variable is unbounded.
    ///
    /// # Return value
    ///
    /// Whether anything changed.
    pub(crate) fn release(&mut self) -> bool {
        let released = self.provisional || self.unbounded;
        if self.provisional {
            self.fixed = None;
            self.provisional = false;
        }
        self.unbounded = false;

        released
    }

    /// Latest value written back by a solve.
    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    /// Set the value, for example to provide a starting point.
    pub fn set_value(&mut self, value: impl Into<Option<Decimal>>) -> &mut Self {
        self.value = value.into();
        self
    }

    /// Whether the objective pushes this variable to a missing bound.
    pub fn is_unbounded(&self) -> bool {
        self.unbounded
    }

    pub(crate) fn mark_unbounded(&mut self) {
        self.unbounded = true;
    }

    /// Whether presolve found bounds that can't be satisfied.
    pub fn is_infeasible(&self) -> bool {
        self.infeasible
    }

    pub(crate) fn mark_infeasible(&mut self) {
        self.infeasible = true;
    }

    /// Forget values and presolve flags. Values pinned through `fix` stay.
    pub(crate) fn reset(&mut self) {
        self.value = None;
        self.infeasible = false;
        self.release();
    }
}

impl Bounded for Variable {
    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn limits_mut(&mut self) -> &mut Limits {
        &mut self.limits
    }
}

impl Weighted for Variable {}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Variable {}

impl Display for Variable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.integer {
            write!(f, " (int)")?;
        }
        write!(f, ": ")?;
        match self.fixed {
            Some(value) => write!(f, "fixed at {}", value.normalize())?,
            None => write!(f, "{}", self.limits)?,
        }
        if let Some(value) = self.value {
            write!(f, " = {}", value.normalize())?;
        }

        Ok(())
    }
}
