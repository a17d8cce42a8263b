use crate::formalism::{Literal, Predicate, PredicateCategory, Problem, Term};
use crate::search::consistency_graph::{Edge, Vertex};
use fixedbitset::FixedBitSet;

/// Sentinel for an unused assignment slot. Adding 1 wraps to 0, which keeps
/// the rank formula branch-free.
const UNUSED: usize = usize::MAX;

/// An assignment of objects to at most two argument positions of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    first_index: usize,
    first_object: usize,
    second_index: usize,
    second_object: usize,
}

impl Assignment {
    pub fn unary(index: usize, object: usize) -> Self {
        Self {
            first_index: index,
            first_object: object,
            second_index: UNUSED,
            second_object: UNUSED,
        }
    }

    pub fn binary(
        first_index: usize,
        first_object: usize,
        second_index: usize,
        second_object: usize,
    ) -> Self {
        debug_assert!(first_index < second_index);
        Self {
            first_index,
            first_object,
            second_index,
            second_object,
        }
    }

    /// Number of argument positions the assignment binds.
    pub fn size(&self) -> usize {
        (self.first_object != UNUSED) as usize + (self.second_object != UNUSED) as usize
    }

    /// Dense rank of the assignment within the function table of a predicate
    /// with the given arity, over the given object universe.
    pub fn rank(&self, arity: usize, num_objects: usize) -> usize {
        let first = 1;
        let second = first * (arity + 1);
        let third = second * (arity + 1);
        let fourth = third * (num_objects + 1);
        first * self.first_index.wrapping_add(1)
            + second * self.second_index.wrapping_add(1)
            + third * self.first_object.wrapping_add(1)
            + fourth * self.second_object.wrapping_add(1)
    }
}

/// Size of the assignment function table for one predicate.
pub fn num_assignments(arity: usize, num_objects: usize) -> usize {
    let first = 1;
    let second = first * (arity + 1);
    let third = second * (arity + 1);
    let fourth = third * (num_objects + 1);
    let max = first * arity + second * arity + third * num_objects + fourth * num_objects;
    max + 1
}

/// A set of boolean functions, one per predicate, over partial argument
/// assignments:
///
/// 1. `f(p, i, o, j, o')` is true iff some ground atom of `p` has `o` at
///    position `i` and `o'` at position `j`.
/// 2. `f(p, i, o, -, -)` is true iff some ground atom of `p` has `o` at
///    position `i`.
///
/// This gives an O(1) consistency test for a candidate (parameter, object)
/// vertex or a pair of them against the atoms the set was built from. The set
/// is static if those atoms are the static initial atoms, and dynamic if it
/// is rebuilt from a state.
#[derive(Debug, Clone)]
pub struct AssignmentSet {
    num_objects: usize,
    arities: Vec<usize>,
    sets: Vec<FixedBitSet>,
}

impl AssignmentSet {
    pub fn new(num_objects: usize, predicates: &[Predicate]) -> Self {
        let mut arities = Vec::with_capacity(predicates.len());
        let mut sets = Vec::with_capacity(predicates.len());
        for (position, predicate) in predicates.iter().enumerate() {
            // Dense predicate indexing is what makes `sets` indexable.
            assert_eq!(predicate.index, position);
            arities.push(predicate.arity());
            sets.push(FixedBitSet::with_capacity(num_assignments(
                predicate.arity(),
                num_objects,
            )));
        }
        Self {
            num_objects,
            arities,
            sets,
        }
    }

    pub fn reset(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }

    pub fn insert_ground_atom(&mut self, predicate_index: usize, objects: &[usize]) {
        let arity = self.arities[predicate_index];
        debug_assert_eq!(arity, objects.len());
        let set = &mut self.sets[predicate_index];

        for (first_index, &first_object) in objects.iter().enumerate() {
            set.insert(Assignment::unary(first_index, first_object).rank(arity, self.num_objects));

            for (offset, &second_object) in objects[first_index + 1..].iter().enumerate() {
                let second_index = first_index + 1 + offset;
                set.insert(
                    Assignment::binary(first_index, first_object, second_index, second_object)
                        .rank(arity, self.num_objects),
                );
            }
        }
    }

    /// True iff every literal stays consistent under the single assignment
    /// induced by the vertex. A negated literal can only be refuted by a
    /// full assignment, so it is skipped unless its arity is 1 or 2.
    pub fn consistent_literals_with_vertex(&self, literals: &[Literal], vertex: &Vertex) -> bool {
        self.consistent_literals(literals, |term| object_if_vertex_overlap(term, vertex))
    }

    /// True iff every literal stays consistent under the assignments induced
    /// by the endpoints of the edge: all single-position assignments plus
    /// all pairs of overlapping positions.
    pub fn consistent_literals_with_edge(&self, literals: &[Literal], edge: &Edge) -> bool {
        self.consistent_literals(literals, |term| object_if_edge_overlap(term, edge))
    }

    fn consistent_literals(
        &self,
        literals: &[Literal],
        overlap: impl Fn(&Term) -> usize,
    ) -> bool {
        for literal in literals {
            let arity = literal.arity();
            let negated = literal.is_negated();

            if negated && arity != 1 && arity != 2 {
                continue;
            }

            let set = &self.sets[literal.predicate_index()];
            let terms = literal.terms();

            for (first_index, first_term) in terms.iter().enumerate() {
                let first_object = overlap(first_term);
                if first_object == UNUSED {
                    continue;
                }

                let unary = Assignment::unary(first_index, first_object);
                if !self.check(set, &unary, arity, negated) {
                    return false;
                }

                for (offset, second_term) in terms[first_index + 1..].iter().enumerate() {
                    let second_object = overlap(second_term);
                    if second_object == UNUSED {
                        continue;
                    }
                    let second_index = first_index + 1 + offset;
                    let binary = Assignment::binary(
                        first_index,
                        first_object,
                        second_index,
                        second_object,
                    );
                    if !self.check(set, &binary, arity, negated) {
                        return false;
                    }
                }
            }
        }

        true
    }

    #[inline(always)]
    fn check(&self, set: &FixedBitSet, assignment: &Assignment, arity: usize, negated: bool) -> bool {
        let consistent = set.contains(assignment.rank(arity, self.num_objects));
        if !negated && !consistent {
            return false;
        }
        if negated && consistent && assignment.size() == arity {
            return false;
        }
        true
    }
}

fn object_if_vertex_overlap(term: &Term, vertex: &Vertex) -> usize {
    match term {
        Term::Object(object) => *object,
        Term::Variable(variable) => {
            if variable.parameter_index == vertex.parameter_index() {
                vertex.object_index()
            } else {
                UNUSED
            }
        }
    }
}

fn object_if_edge_overlap(term: &Term, edge: &Edge) -> usize {
    match term {
        Term::Object(object) => *object,
        Term::Variable(variable) => {
            if variable.parameter_index == edge.src().parameter_index() {
                edge.src().object_index()
            } else if variable.parameter_index == edge.dst().parameter_index() {
                edge.dst().object_index()
            } else {
                UNUSED
            }
        }
    }
}

/// Build the assignment set of the positive static initial atoms.
pub fn static_assignment_set(problem: &Problem) -> AssignmentSet {
    let mut set = AssignmentSet::new(
        problem.num_objects(),
        problem.predicates(PredicateCategory::Static),
    );
    problem.with_repositories(|repositories| {
        for index in problem.static_initial_positive_atoms().ones() {
            let atom = repositories.static_atoms.atom(index);
            set.insert_ground_atom(atom.predicate_index, &atom.objects);
        }
    });
    set
}
