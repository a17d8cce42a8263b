use crate::formalism::{
    Function, FunctionCategory, FunctionSkeleton, NumericConstraint, Problem, Term,
};
use crate::search::assignment_set::{num_assignments, Assignment};
use crate::search::consistency_graph::{Edge, Vertex};
use fixedbitset::FixedBitSet;

const UNUSED: usize = usize::MAX;

/// The numeric counterpart of the predicate assignment sets: for every
/// function skeleton it records which partial argument assignments are
/// covered by a ground function with a defined value. A constraint can only
/// be satisfiable under a candidate vertex or edge if every function it
/// mentions has a defined value for the induced assignments, so this is a
/// sound pre-filter; the exact constraint check happens at full-binding
/// validation.
#[derive(Debug, Clone)]
pub struct NumericAssignmentSet {
    category: FunctionCategory,
    num_objects: usize,
    arities: Vec<usize>,
    sets: Vec<FixedBitSet>,
}

impl NumericAssignmentSet {
    pub fn new(
        num_objects: usize,
        category: FunctionCategory,
        skeletons: &[FunctionSkeleton],
    ) -> Self {
        let mut arities = Vec::with_capacity(skeletons.len());
        let mut sets = Vec::with_capacity(skeletons.len());
        for (position, skeleton) in skeletons.iter().enumerate() {
            assert_eq!(skeleton.index, position);
            arities.push(skeleton.arity());
            sets.push(FixedBitSet::with_capacity(num_assignments(
                skeleton.arity(),
                num_objects,
            )));
        }
        Self {
            category,
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

    /// Record a ground function. An undefined value (`NaN`) contributes
    /// nothing.
    pub fn insert_ground_function(&mut self, skeleton_index: usize, objects: &[usize], value: f64) {
        if value.is_nan() {
            return;
        }
        let arity = self.arities[skeleton_index];
        debug_assert_eq!(arity, objects.len());
        let set = &mut self.sets[skeleton_index];

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

    pub fn consistent_function_with_vertex(&self, function: &Function, vertex: &Vertex) -> bool {
        debug_assert_eq!(function.category, self.category);
        self.consistent_function(function, |term| match term {
            Term::Object(object) => *object,
            Term::Variable(variable) => {
                if variable.parameter_index == vertex.parameter_index() {
                    vertex.object_index()
                } else {
                    UNUSED
                }
            }
        })
    }

    pub fn consistent_function_with_edge(&self, function: &Function, edge: &Edge) -> bool {
        debug_assert_eq!(function.category, self.category);
        self.consistent_function(function, |term| match term {
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
        })
    }

    fn consistent_function(&self, function: &Function, overlap: impl Fn(&Term) -> usize) -> bool {
        let arity = self.arities[function.skeleton_index];
        let set = &self.sets[function.skeleton_index];

        for (first_index, first_term) in function.terms.iter().enumerate() {
            let first_object = overlap(first_term);
            if first_object == UNUSED {
                continue;
            }
            let unary = Assignment::unary(first_index, first_object);
            if !set.contains(unary.rank(arity, self.num_objects)) {
                return false;
            }
            for (offset, second_term) in function.terms[first_index + 1..].iter().enumerate() {
                let second_object = overlap(second_term);
                if second_object == UNUSED {
                    continue;
                }
                let second_index = first_index + 1 + offset;
                let binary =
                    Assignment::binary(first_index, first_object, second_index, second_object);
                if !set.contains(binary.rank(arity, self.num_objects)) {
                    return false;
                }
            }
        }

        true
    }
}

/// True iff every constraint passes the vertex-level defined-value test
/// against the matching assignment set.
pub fn consistent_constraints_with_vertex(
    constraints: &[NumericConstraint],
    static_set: &NumericAssignmentSet,
    fluent_set: &NumericAssignmentSet,
    vertex: &Vertex,
) -> bool {
    let mut functions = Vec::new();
    for constraint in constraints {
        functions.clear();
        constraint.collect_functions(&mut functions);
        for function in &functions {
            let set = match function.category {
                FunctionCategory::Static => static_set,
                FunctionCategory::Fluent => fluent_set,
            };
            if !set.consistent_function_with_vertex(function, vertex) {
                return false;
            }
        }
    }
    true
}

/// Edge-level variant of [`consistent_constraints_with_vertex`].
pub fn consistent_constraints_with_edge(
    constraints: &[NumericConstraint],
    static_set: &NumericAssignmentSet,
    fluent_set: &NumericAssignmentSet,
    edge: &Edge,
) -> bool {
    let mut functions = Vec::new();
    for constraint in constraints {
        functions.clear();
        constraint.collect_functions(&mut functions);
        for function in &functions {
            let set = match function.category {
                FunctionCategory::Static => static_set,
                FunctionCategory::Fluent => fluent_set,
            };
            if !set.consistent_function_with_edge(function, edge) {
                return false;
            }
        }
    }
    true
}

/// Build the numeric assignment set of the static initial function values.
pub fn static_numeric_assignment_set(problem: &Problem) -> NumericAssignmentSet {
    let mut set = NumericAssignmentSet::new(
        problem.num_objects(),
        FunctionCategory::Static,
        problem.functions(FunctionCategory::Static),
    );
    problem.with_repositories(|repositories| {
        for function in repositories.static_functions.functions() {
            let value = problem
                .static_function_values()
                .get(function.index)
                .copied()
                .unwrap_or(f64::NAN);
            set.insert_ground_function(function.skeleton_index, &function.objects, value);
        }
    });
    set
}
