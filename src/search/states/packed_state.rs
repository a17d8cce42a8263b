use crate::formalism::{PredicateCategory, Problem};
use crate::search::states::unpacked_state::{grow_insert, UnpackedState};
use ordered_float::OrderedFloat;

/// The compressed, hashable form of a state: the sorted indices of the set
/// fluent and derived atoms plus the numeric variable vector. Sparse index
/// lists beat raw bit blocks here because planning states set few bits of a
/// large and growing atom universe, and two states that differ only in
/// trailing unset bits must compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackedState {
    fluent_atoms: Vec<u32>,
    derived_atoms: Vec<u32>,
    numeric_variables: Vec<OrderedFloat<f64>>,
}

impl PackedState {
    pub fn pack(state: &UnpackedState) -> Self {
        Self {
            fluent_atoms: state.fluent_atoms.ones().map(|bit| bit as u32).collect(),
            derived_atoms: state.derived_atoms.ones().map(|bit| bit as u32).collect(),
            numeric_variables: state
                .numeric_variables
                .iter()
                .map(|&value| OrderedFloat(value))
                .collect(),
        }
    }

    /// Materialise into a reusable buffer. The bitsets are sized to the
    /// current repository counts so that later membership tests stay in
    /// range.
    pub fn unpack_into(&self, problem: &Problem, out: &mut UnpackedState) {
        out.clear();
        out.fluent_atoms
            .grow(problem.num_ground_atoms(PredicateCategory::Fluent));
        out.derived_atoms
            .grow(problem.num_ground_atoms(PredicateCategory::Derived));
        for &bit in &self.fluent_atoms {
            grow_insert(&mut out.fluent_atoms, bit as usize);
        }
        for &bit in &self.derived_atoms {
            grow_insert(&mut out.derived_atoms, bit as usize);
        }
        out.numeric_variables
            .extend(self.numeric_variables.iter().map(|value| value.0));
    }

    pub fn num_fluent_atoms(&self) -> usize {
        self.fluent_atoms.len()
    }

    pub fn num_derived_atoms(&self) -> usize {
        self.derived_atoms.len()
    }
}
