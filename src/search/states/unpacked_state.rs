use crate::formalism::{PredicateCategory, Problem};
use fixedbitset::FixedBitSet;

/// Insert a bit, growing the set first if the index is out of range. Ground
/// atom repositories grow during the run, so state and effect bitsets must
/// tolerate indices beyond their current capacity.
#[inline(always)]
pub(crate) fn grow_insert(set: &mut FixedBitSet, bit: usize) {
    if bit >= set.len() {
        set.grow(bit + 1);
    }
    set.insert(bit);
}

/// The materialised view of a state: one bitset per dynamic atom category,
/// indexed by ground atom index, plus the numeric variable vector indexed by
/// fluent ground function index. Static atoms live in the problem and are
/// shared by all states.
///
/// Instances are scratch buffers: the state repository creates and mutates
/// them during successor construction and reuses them between queries.
#[derive(Debug, Clone, PartialEq)]
pub struct UnpackedState {
    pub fluent_atoms: FixedBitSet,
    pub derived_atoms: FixedBitSet,
    pub numeric_variables: Vec<f64>,
}

impl UnpackedState {
    pub fn new(problem: &Problem) -> Self {
        Self {
            fluent_atoms: FixedBitSet::with_capacity(
                problem.num_ground_atoms(PredicateCategory::Fluent),
            ),
            derived_atoms: FixedBitSet::with_capacity(
                problem.num_ground_atoms(PredicateCategory::Derived),
            ),
            numeric_variables: Vec::new(),
        }
    }

    /// The atom bitset of a dynamic category.
    pub fn dynamic_atoms(&self, category: PredicateCategory) -> &FixedBitSet {
        match category {
            PredicateCategory::Fluent => &self.fluent_atoms,
            PredicateCategory::Derived => &self.derived_atoms,
            PredicateCategory::Static => {
                panic!("static atoms live in the problem, not in the state")
            }
        }
    }

    pub fn clear(&mut self) {
        self.fluent_atoms.clear();
        self.derived_atoms.clear();
        self.numeric_variables.clear();
    }
}
