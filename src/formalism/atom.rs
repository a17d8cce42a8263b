use crate::formalism::{Negatable, PredicateCategory, Problem, RawBinding, Term};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A possibly lifted atom: a predicate applied to a list of terms. The atom
/// is ground when every term is an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    category: PredicateCategory,
    predicate_index: usize,
    terms: Vec<Term>,
}

impl Atom {
    pub fn new(category: PredicateCategory, predicate_index: usize, terms: Vec<Term>) -> Self {
        Self {
            category,
            predicate_index,
            terms,
        }
    }

    #[inline(always)]
    pub fn category(&self) -> PredicateCategory {
        self.category
    }

    #[inline(always)]
    pub fn predicate_index(&self) -> usize {
        self.predicate_index
    }

    #[inline(always)]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    #[inline(always)]
    pub fn term(&self, index: usize) -> &Term {
        &self.terms[index]
    }

    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    pub fn is_nullary(&self) -> bool {
        self.terms.is_empty()
    }

    /// Substitute the binding into the terms, yielding the argument objects
    /// of the corresponding ground atom.
    pub fn substitute(&self, binding: &[usize]) -> RawBinding {
        self.terms.iter().map(|term| term.resolve(binding)).collect()
    }
}

/// A literal is an atom with a polarity.
pub type Literal = Negatable<Atom>;

impl Negatable<Atom> {
    pub fn new_literal(
        negated: bool,
        category: PredicateCategory,
        predicate_index: usize,
        terms: Vec<Term>,
    ) -> Self {
        Negatable::new(negated, Atom::new(category, predicate_index, terms))
    }

    #[inline(always)]
    pub fn category(&self) -> PredicateCategory {
        self.underlying().category()
    }

    #[inline(always)]
    pub fn predicate_index(&self) -> usize {
        self.underlying().predicate_index()
    }

    #[inline(always)]
    pub fn terms(&self) -> &[Term] {
        self.underlying().terms()
    }

    #[inline(always)]
    pub fn is_nullary(&self) -> bool {
        self.underlying().is_nullary()
    }

    #[inline(always)]
    pub fn arity(&self) -> usize {
        self.underlying().arity()
    }
}

/// A fully grounded atom, interned in the problem repositories. Its `index`
/// is dense within the atom's category and doubles as the bit position in
/// every state and precondition bitset of that category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundAtom {
    pub category: PredicateCategory,
    pub predicate_index: usize,
    pub index: usize,
    pub objects: RawBinding,
}

impl GroundAtom {
    pub fn arity(&self) -> usize {
        self.objects.len()
    }

    pub fn human_readable(&self, problem: &Problem) -> String {
        format!(
            "{}({})",
            problem.predicates(self.category)[self.predicate_index].name,
            self.objects
                .iter()
                .map(|&object| problem.object(object).name.as_str())
                .join(", ")
        )
    }
}

/// A grounded literal, reduced to the polarity and the dense index of its
/// interned atom. This is all the flat precondition and effect layouts need.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundLiteral {
    pub negated: bool,
    pub atom_index: usize,
}

impl GroundLiteral {
    pub fn new(negated: bool, atom_index: usize) -> Self {
        Self {
            negated,
            atom_index,
        }
    }
}
