use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

/// The category of a predicate decides which part of the task owns its ground
/// atoms: static atoms are fixed by the initial state, fluent atoms change
/// under action effects, and derived atoms are recomputed from axioms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PredicateCategory {
    Static,
    Fluent,
    Derived,
}

impl PredicateCategory {
    /// Static atoms never change after the initial state; the other two
    /// categories are re-evaluated against every state.
    #[inline(always)]
    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Static)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub name: String,
    /// Dense index within the predicate's category.
    pub index: usize,
    pub category: PredicateCategory,
    /// Type index per argument position.
    pub parameter_types: Vec<usize>,
}

impl Predicate {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        category: PredicateCategory,
        parameter_types: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            category,
            parameter_types,
        }
    }

    #[inline(always)]
    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }

    pub fn is_nullary(&self) -> bool {
        self.parameter_types.is_empty()
    }
}
