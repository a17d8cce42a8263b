use crate::formalism::{
    evaluate_binary, evaluate_multi, ConjunctiveCondition, FunctionCategory, FunctionExpression,
    GroundLiteral, Literal, NumericConstraint, NumericError, PredicateCategory, Problem,
    RawBinding,
};
use crate::search::assignment_set::{static_assignment_set, AssignmentSet};
use crate::search::consistency_graph::StaticConsistencyGraph;
use crate::search::event_handlers::BindingEventHandler;
use crate::search::kpkc::KpkcSearch;
use crate::search::numeric_assignment_set::{
    consistent_constraints_with_edge, consistent_constraints_with_vertex,
    static_numeric_assignment_set, NumericAssignmentSet,
};
use crate::search::states::UnpackedState;
use fixedbitset::FixedBitSet;
use std::rc::Rc;

/// The per-state assignment sets shared by all binding generators of one
/// driver: rebuilt from the fluent and derived atoms (and the numeric
/// variables) whenever the driver moves to a new state. The derived set is
/// additionally extended incrementally by the axiom evaluator as new derived
/// atoms appear during closure.
#[derive(Debug)]
pub struct DynamicAssignmentSets {
    pub fluent: AssignmentSet,
    pub derived: AssignmentSet,
    pub fluent_numeric: NumericAssignmentSet,
}

impl DynamicAssignmentSets {
    pub fn new(problem: &Problem) -> Self {
        Self {
            fluent: AssignmentSet::new(
                problem.num_objects(),
                problem.predicates(PredicateCategory::Fluent),
            ),
            derived: AssignmentSet::new(
                problem.num_objects(),
                problem.predicates(PredicateCategory::Derived),
            ),
            fluent_numeric: NumericAssignmentSet::new(
                problem.num_objects(),
                FunctionCategory::Fluent,
                problem.functions(FunctionCategory::Fluent),
            ),
        }
    }

    pub fn initialize(&mut self, problem: &Problem, state: &UnpackedState) {
        self.fluent.reset();
        self.derived.reset();
        self.fluent_numeric.reset();
        problem.with_repositories(|repositories| {
            for index in state.fluent_atoms.ones() {
                let atom = repositories.fluent_atoms.atom(index);
                self.fluent
                    .insert_ground_atom(atom.predicate_index, &atom.objects);
            }
            for index in state.derived_atoms.ones() {
                let atom = repositories.derived_atoms.atom(index);
                self.derived
                    .insert_ground_atom(atom.predicate_index, &atom.objects);
            }
            for function in repositories.fluent_functions.functions() {
                let value = state
                    .numeric_variables
                    .get(function.index)
                    .copied()
                    .unwrap_or(f64::NAN);
                self.fluent_numeric.insert_ground_function(
                    function.skeleton_index,
                    &function.objects,
                    value,
                );
            }
        });
    }
}

/// Returns true if all nullary literals of the condition hold: dynamic ones
/// against the state, static ones against the static initial set. Nullary
/// ground atoms are interned at problem construction, so these are pure
/// lookups.
pub fn nullary_conditions_hold(
    problem: &Problem,
    condition: &ConjunctiveCondition,
    state: &UnpackedState,
) -> bool {
    for category in [PredicateCategory::Fluent, PredicateCategory::Derived] {
        for literal in condition.nullary_literals(category) {
            let index = problem
                .find_ground_atom(category, literal.predicate_index(), &[])
                .expect("nullary ground atoms are interned at problem construction");
            if state.dynamic_atoms(category).contains(index) == literal.is_negated() {
                return false;
            }
        }
    }

    for literal in condition.nullary_literals(PredicateCategory::Static) {
        let index = problem
            .find_ground_atom(PredicateCategory::Static, literal.predicate_index(), &[])
            .expect("nullary ground atoms are interned at problem construction");
        if problem.static_initial_positive_atoms().contains(index) == literal.is_negated() {
            return false;
        }
    }

    true
}

/// A static literal holds iff the polarity matches membership of its ground
/// atom in the static initial set.
pub fn is_valid_static_binding(
    problem: &Problem,
    literals: &[Literal],
    binding: &[usize],
) -> bool {
    for literal in literals {
        let ground_literal = problem.ground_literal(literal, binding);
        if ground_literal.negated
            == problem
                .static_initial_positive_atoms()
                .contains(ground_literal.atom_index)
        {
            return false;
        }
    }
    true
}

/// A dynamic literal holds iff the polarity matches membership of its ground
/// atom in the given state bitset.
pub fn is_valid_dynamic_binding(
    problem: &Problem,
    literals: &[Literal],
    atom_indices: &FixedBitSet,
    binding: &[usize],
) -> bool {
    for literal in literals {
        let ground_literal = problem.ground_literal(literal, binding);
        if ground_literal.negated == atom_indices.contains(ground_literal.atom_index) {
            return false;
        }
    }
    true
}

/// Evaluate a lifted expression under a binding against the static initial
/// values and the numeric variables of a state.
pub fn evaluate_expression(
    problem: &Problem,
    expression: &FunctionExpression,
    binding: &[usize],
    fluent_values: &[f64],
) -> Result<f64, NumericError> {
    match expression {
        FunctionExpression::Number(number) => Ok(*number),
        FunctionExpression::BinaryOperation { op, left, right } => evaluate_binary(
            *op,
            evaluate_expression(problem, left, binding, fluent_values)?,
            evaluate_expression(problem, right, binding, fluent_values)?,
        ),
        FunctionExpression::MultiOperation { op, operands } => {
            debug_assert!(!operands.is_empty());
            let mut result = evaluate_expression(problem, &operands[0], binding, fluent_values)?;
            for operand in &operands[1..] {
                result = evaluate_multi(
                    *op,
                    result,
                    evaluate_expression(problem, operand, binding, fluent_values)?,
                );
            }
            Ok(result)
        }
        FunctionExpression::Minus(inner) => {
            Ok(-evaluate_expression(problem, inner, binding, fluent_values)?)
        }
        FunctionExpression::Function(function) => {
            let objects = function.substitute(binding);
            let index = problem
                .find_ground_function(function.category, function.skeleton_index, &objects)
                .ok_or(NumericError::UndefinedFunction)?;
            let values = match function.category {
                FunctionCategory::Static => problem.static_function_values(),
                FunctionCategory::Fluent => fluent_values,
            };
            let value = values.get(index).copied().ok_or(NumericError::UndefinedFunction)?;
            if value.is_nan() {
                return Err(NumericError::UndefinedFunction);
            }
            Ok(value)
        }
    }
}

pub fn evaluate_constraint(
    problem: &Problem,
    constraint: &NumericConstraint,
    binding: &[usize],
    fluent_values: &[f64],
) -> Result<bool, NumericError> {
    let left = evaluate_expression(problem, &constraint.left, binding, fluent_values)?;
    let right = evaluate_expression(problem, &constraint.right, binding, fluent_values)?;
    Ok(constraint.comparator.compare(left, right))
}

/// Full validation of a binding against a condition and a state: static,
/// fluent and derived literals plus the numeric constraints. All categories
/// must be re-tested because the consistency graph over-approximates. A
/// numeric error makes the binding invalid, it is never propagated.
pub fn is_valid_binding(
    problem: &Problem,
    condition: &ConjunctiveCondition,
    state: &UnpackedState,
    binding: &[usize],
) -> bool {
    if !is_valid_static_binding(
        problem,
        condition.literals(PredicateCategory::Static),
        binding,
    ) || !is_valid_dynamic_binding(
        problem,
        condition.literals(PredicateCategory::Fluent),
        &state.fluent_atoms,
        binding,
    ) || !is_valid_dynamic_binding(
        problem,
        condition.literals(PredicateCategory::Derived),
        &state.derived_atoms,
        binding,
    ) {
        return false;
    }

    for constraint in condition.numeric_constraints() {
        match evaluate_constraint(problem, constraint, binding, &state.numeric_variables) {
            Ok(true) => {}
            Ok(false) | Err(_) => return false,
        }
    }

    true
}

/// True iff the state satisfies the problem's goal. The goal is an arity-0
/// condition over ground literals, so this is nullary checks plus a
/// validation under the empty binding.
pub fn is_goal_state(problem: &Problem, state: &UnpackedState) -> bool {
    nullary_conditions_hold(problem, problem.goal(), state)
        && is_valid_binding(problem, problem.goal(), state, &[])
}

/// A satisfied binding together with the ground literals it induces, split
/// by category in the same order as the condition's literal lists.
#[derive(Debug, Clone)]
pub struct GroundConjunction {
    pub binding: RawBinding,
    pub static_literals: Vec<GroundLiteral>,
    pub fluent_literals: Vec<GroundLiteral>,
    pub derived_literals: Vec<GroundLiteral>,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Idle,
    Nullary,
    Unary { cursor: usize },
    General,
    Exhausted,
}

/// Yields the bindings of a conjunctive condition that are satisfied in a
/// state, as a resumable state machine: `start` primes the generator for a
/// state, `next_binding` produces one binding per call until exhaustion.
///
/// Arity 0 short-circuits to a single validation, arity 1 walks the vertices
/// of the static consistency graph, and arity 2 and up restricts the static
/// graph to the dynamically consistent part and enumerates its k-cliques.
/// Every candidate is fully re-validated before it is emitted; candidates
/// that fail are reported through the event handler.
///
/// The scratch buffers (the full consistency bitmatrix, the consistent
/// vertex set and the clique workspace) are owned here and reused across
/// states.
#[derive(Debug)]
pub struct SatisficingBindingGenerator {
    problem: Rc<Problem>,
    condition: ConjunctiveCondition,
    static_graph: StaticConsistencyGraph,
    static_numeric: NumericAssignmentSet,
    full_adjacency: Vec<FixedBitSet>,
    consistent_vertices: FixedBitSet,
    kpkc: KpkcSearch,
    phase: Phase,
}

impl SatisficingBindingGenerator {
    /// Build a generator for one condition. The static assignment sets are
    /// passed in so a driver with many conditions builds them once.
    pub fn new(
        problem: Rc<Problem>,
        condition: ConjunctiveCondition,
        static_sets: &StaticAssignmentSets,
    ) -> Self {
        let static_graph = StaticConsistencyGraph::new(
            &problem,
            condition.parameters(),
            condition.literals(PredicateCategory::Static),
            &static_sets.predicates,
        );
        let num_vertices = static_graph.num_vertices();
        let num_partitions = condition.arity();
        Self {
            problem,
            condition,
            static_graph,
            static_numeric: static_sets.numeric.clone(),
            full_adjacency: vec![FixedBitSet::with_capacity(num_vertices); num_vertices],
            consistent_vertices: FixedBitSet::with_capacity(num_vertices),
            kpkc: KpkcSearch::new(num_partitions, num_vertices),
            phase: Phase::Idle,
        }
    }

    pub fn condition(&self) -> &ConjunctiveCondition {
        &self.condition
    }

    pub fn static_graph(&self) -> &StaticConsistencyGraph {
        &self.static_graph
    }

    /// Prime the generator for a state. Returns false (and parks the
    /// generator) if a nullary literal of the condition fails, which is the
    /// fast path that skips the whole schema.
    pub fn start(&mut self, state: &UnpackedState, sets: &DynamicAssignmentSets) -> bool {
        if !nullary_conditions_hold(&self.problem, &self.condition, state) {
            self.phase = Phase::Exhausted;
            return false;
        }

        self.phase = match self.condition.arity() {
            0 => Phase::Nullary,
            1 => Phase::Unary { cursor: 0 },
            _ => {
                if self.static_graph.edges().is_empty() {
                    Phase::Exhausted
                } else {
                    self.build_full_consistency_graph(sets);
                    self.kpkc.reset();
                    Phase::General
                }
            }
        };

        true
    }

    /// Restrict the static graph to the dynamically consistent part.
    /// Vertices are tested once up front; edges with an inconsistent
    /// endpoint are skipped without re-testing the endpoint.
    fn build_full_consistency_graph(&mut self, sets: &DynamicAssignmentSets) {
        for row in &mut self.full_adjacency {
            row.clear();
        }
        self.consistent_vertices.clear();

        let fluent_literals = self.condition.literals(PredicateCategory::Fluent);
        let derived_literals = self.condition.literals(PredicateCategory::Derived);
        let constraints = self.condition.numeric_constraints();

        for vertex in self.static_graph.vertices() {
            if sets
                .fluent
                .consistent_literals_with_vertex(fluent_literals, vertex)
                && sets
                    .derived
                    .consistent_literals_with_vertex(derived_literals, vertex)
                && consistent_constraints_with_vertex(
                    constraints,
                    &self.static_numeric,
                    &sets.fluent_numeric,
                    vertex,
                )
            {
                self.consistent_vertices.insert(vertex.index());
            }
        }

        for edge in self.static_graph.edges() {
            if self.consistent_vertices.contains(edge.src().index())
                && self.consistent_vertices.contains(edge.dst().index())
                && sets
                    .fluent
                    .consistent_literals_with_edge(fluent_literals, edge)
                && sets
                    .derived
                    .consistent_literals_with_edge(derived_literals, edge)
                && consistent_constraints_with_edge(
                    constraints,
                    &self.static_numeric,
                    &sets.fluent_numeric,
                    edge,
                )
            {
                self.full_adjacency[edge.src().index()].insert(edge.dst().index());
                self.full_adjacency[edge.dst().index()].insert(edge.src().index());
            }
        }
    }

    /// Advance to the next satisfied binding, or `None` when exhausted.
    pub fn next_binding(
        &mut self,
        state: &UnpackedState,
        sets: &DynamicAssignmentSets,
        handler: &mut dyn BindingEventHandler,
    ) -> Option<RawBinding> {
        loop {
            match self.phase {
                Phase::Idle | Phase::Exhausted => return None,
                Phase::Nullary => {
                    self.phase = Phase::Exhausted;
                    let binding = RawBinding::new();
                    if is_valid_binding(&self.problem, &self.condition, state, &binding) {
                        return Some(binding);
                    }
                    handler.on_invalid_binding(&binding);
                }
                Phase::Unary { cursor } => {
                    let Some(&vertex) = self.static_graph.vertices().get(cursor) else {
                        self.phase = Phase::Exhausted;
                        return None;
                    };
                    self.phase = Phase::Unary { cursor: cursor + 1 };

                    let fluent_literals = self.condition.literals(PredicateCategory::Fluent);
                    let derived_literals = self.condition.literals(PredicateCategory::Derived);
                    if !sets
                        .fluent
                        .consistent_literals_with_vertex(fluent_literals, &vertex)
                        || !sets
                            .derived
                            .consistent_literals_with_vertex(derived_literals, &vertex)
                        || !consistent_constraints_with_vertex(
                            self.condition.numeric_constraints(),
                            &self.static_numeric,
                            &sets.fluent_numeric,
                            &vertex,
                        )
                    {
                        continue;
                    }

                    let mut binding = RawBinding::new();
                    binding.push(vertex.object_index());
                    if is_valid_binding(&self.problem, &self.condition, state, &binding) {
                        return Some(binding);
                    }
                    handler.on_invalid_binding(&binding);
                }
                Phase::General => {
                    let arity = self.condition.arity();
                    let mut binding = RawBinding::new();
                    {
                        let Some(clique) = self.kpkc.next(
                            &self.full_adjacency,
                            self.static_graph.vertices_by_parameter_index(),
                        ) else {
                            self.phase = Phase::Exhausted;
                            return None;
                        };
                        binding.resize(arity, usize::MAX);
                        for &vertex_index in clique {
                            let vertex = self.static_graph.vertices()[vertex_index];
                            binding[vertex.parameter_index()] = vertex.object_index();
                        }
                    }
                    debug_assert!(binding.iter().all(|&object| object != usize::MAX));

                    if is_valid_binding(&self.problem, &self.condition, state, &binding) {
                        return Some(binding);
                    }
                    handler.on_invalid_binding(&binding);
                }
            }
        }
    }

    /// Like `next_binding`, but also hands back the ground literals the
    /// binding induces per category. Useful to callers that consume the
    /// grounded conjunction itself rather than a ground record, e.g.
    /// heuristics over partially grounded conditions.
    pub fn next_ground_conjunction(
        &mut self,
        state: &UnpackedState,
        sets: &DynamicAssignmentSets,
        handler: &mut dyn BindingEventHandler,
    ) -> Option<GroundConjunction> {
        let binding = self.next_binding(state, sets, handler)?;

        let mut conjunction = GroundConjunction {
            static_literals: Vec::new(),
            fluent_literals: Vec::new(),
            derived_literals: Vec::new(),
            binding,
        };
        for (category, out) in [
            (PredicateCategory::Static, &mut conjunction.static_literals),
            (PredicateCategory::Fluent, &mut conjunction.fluent_literals),
            (PredicateCategory::Derived, &mut conjunction.derived_literals),
        ] {
            for literal in self.condition.all_literals(category) {
                out.push(self.problem.ground_literal(literal, &conjunction.binding));
            }
        }
        Some(conjunction)
    }

    /// Drain the generator into a vector. Used by drivers that must see all
    /// bindings of a round before applying any of them, like the axiom
    /// evaluator.
    pub fn collect_bindings(
        &mut self,
        state: &UnpackedState,
        sets: &DynamicAssignmentSets,
        handler: &mut dyn BindingEventHandler,
        out: &mut Vec<RawBinding>,
    ) {
        while let Some(binding) = self.next_binding(state, sets, handler) {
            out.push(binding);
        }
    }
}

/// The assignment sets of the static initial state, built once per driver
/// and shared by its binding generators.
#[derive(Debug)]
pub struct StaticAssignmentSets {
    pub predicates: AssignmentSet,
    pub numeric: NumericAssignmentSet,
}

impl StaticAssignmentSets {
    pub fn new(problem: &Problem) -> Self {
        Self {
            predicates: static_assignment_set(problem),
            numeric: static_numeric_assignment_set(problem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formalism::{
        raw_binding, Comparator, DomainBuilder, Function, Literal, Parameter, ProblemBuilder, Term,
    };
    use crate::search::event_handlers::{
        CountingEventHandler, DefaultBindingEventHandler, SharedGenerationCounts,
    };
    use std::collections::BTreeSet;

    fn positive(category: PredicateCategory, predicate: usize, terms: Vec<Term>) -> Literal {
        Literal::new_literal(false, category, predicate, terms)
    }

    /// Arity-3 condition over five objects where the static relations admit
    /// exactly two triples.
    #[test]
    fn sparse_static_relations_admit_exactly_two_bindings() {
        use PredicateCategory::Static;

        let mut domain = DomainBuilder::new("triples");
        let object = domain.object_type();
        let r1 = domain.add_predicate(Static, "r1", &[object, object]);
        let r2 = domain.add_predicate(Static, "r2", &[object, object]);
        let r3 = domain.add_predicate(Static, "r3", &[object, object]);
        let domain = Rc::new(domain.finish());

        let mut builder = ProblemBuilder::new(Rc::clone(&domain), "triples-01");
        let objects: Vec<usize> = (1..=5)
            .map(|i| builder.add_object(format!("o{i}"), vec![object]))
            .collect();
        let (o1, o2, o3, o4, o5) = (objects[0], objects[1], objects[2], objects[3], objects[4]);

        builder.add_initial_atom(Static, r1, raw_binding![o1, o2]);
        builder.add_initial_atom(Static, r1, raw_binding![o4, o5]);
        builder.add_initial_atom(Static, r2, raw_binding![o2, o3]);
        builder.add_initial_atom(Static, r2, raw_binding![o5, o1]);
        builder.add_initial_atom(Static, r3, raw_binding![o1, o3]);
        builder.add_initial_atom(Static, r3, raw_binding![o4, o1]);
        let problem = Rc::new(builder.finish().unwrap());

        let condition = ConjunctiveCondition::new(
            vec![
                Parameter::new(0, object),
                Parameter::new(1, object),
                Parameter::new(2, object),
            ],
            vec![
                positive(Static, r1, vec![Term::variable(0), Term::variable(1)]),
                positive(Static, r2, vec![Term::variable(1), Term::variable(2)]),
                positive(Static, r3, vec![Term::variable(0), Term::variable(2)]),
            ],
            Vec::new(),
        );

        let static_sets = StaticAssignmentSets::new(&problem);
        let mut generator =
            SatisficingBindingGenerator::new(Rc::clone(&problem), condition, &static_sets);

        let state = UnpackedState::new(&problem);
        let sets = {
            let mut sets = DynamicAssignmentSets::new(&problem);
            sets.initialize(&problem, &state);
            sets
        };

        let mut handler = DefaultBindingEventHandler;
        assert!(generator.start(&state, &sets));
        let mut bindings = Vec::new();
        generator.collect_bindings(&state, &sets, &mut handler, &mut bindings);

        let found: BTreeSet<Vec<usize>> = bindings
            .iter()
            .map(|binding| binding.to_vec())
            .collect();
        assert_eq!(
            found,
            BTreeSet::from([vec![o1, o2, o3], vec![o4, o5, o1]])
        );
    }

    /// A division by zero during constraint evaluation invalidates the
    /// binding and fires the event instead of propagating.
    #[test]
    fn division_by_zero_invalidates_the_binding() {
        use crate::formalism::{BinaryOp, FunctionCategory};
        use PredicateCategory::Fluent;

        let mut domain = DomainBuilder::new("ratios");
        let object = domain.object_type();
        let marked = domain.add_predicate(Fluent, "marked", &[object]);
        let weight = domain.add_function(FunctionCategory::Fluent, "weight", &[object]);
        let domain = Rc::new(domain.finish());

        let mut builder = ProblemBuilder::new(Rc::clone(&domain), "ratios-01");
        let o1 = builder.add_object("o1", vec![object]);
        let o2 = builder.add_object("o2", vec![object]);
        builder.add_initial_atom(Fluent, marked, raw_binding![o1]);
        builder.add_initial_atom(Fluent, marked, raw_binding![o2]);
        builder.set_fluent_function_value(weight, raw_binding![o1], 4.0);
        builder.set_fluent_function_value(weight, raw_binding![o2], 0.0);
        let problem = Rc::new(builder.finish().unwrap());

        // marked(x) and 10 / weight(x) > 1.
        let condition = ConjunctiveCondition::new(
            vec![Parameter::new(0, object)],
            vec![positive(Fluent, marked, vec![Term::variable(0)])],
            vec![NumericConstraint::new(
                Comparator::Greater,
                FunctionExpression::BinaryOperation {
                    op: BinaryOp::Div,
                    left: Box::new(FunctionExpression::Number(10.0)),
                    right: Box::new(FunctionExpression::Function(Function::new(
                        FunctionCategory::Fluent,
                        weight,
                        vec![Term::variable(0)],
                    ))),
                },
                FunctionExpression::Number(1.0),
            )],
        );

        let static_sets = StaticAssignmentSets::new(&problem);
        let mut generator =
            SatisficingBindingGenerator::new(Rc::clone(&problem), condition, &static_sets);

        let mut repository = crate::search::StateRepository::new(Rc::clone(&problem)).unwrap();
        let state = repository.initial_state();
        let mut sets = DynamicAssignmentSets::new(&problem);
        sets.initialize(&problem, &state);

        let counts = SharedGenerationCounts::default();
        let mut handler = CountingEventHandler::new(counts.clone());
        assert!(generator.start(&state, &sets));
        let mut bindings = Vec::new();
        generator.collect_bindings(&state, &sets, &mut handler, &mut bindings);

        // o1 passes (10 / 4 > 1); o2 divides by zero and is dropped.
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].as_slice(), &[o1]);
        assert_eq!(counts.snapshot().invalid_bindings, 1);
    }

    #[test]
    fn ground_conjunctions_carry_the_induced_literals() {
        let fixture = crate::test_utils::gripper();
        let mut repository =
            crate::search::StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();

        let static_sets = StaticAssignmentSets::new(&fixture.problem);
        let schema = &fixture.problem.domain().action_schemas()[fixture.pick_schema];
        let mut generator = SatisficingBindingGenerator::new(
            Rc::clone(&fixture.problem),
            schema.precondition().clone(),
            &static_sets,
        );
        let mut sets = DynamicAssignmentSets::new(&fixture.problem);
        sets.initialize(&fixture.problem, &state);

        let mut handler = DefaultBindingEventHandler;
        assert!(generator.start(&state, &sets));
        let mut count = 0;
        while let Some(conjunction) =
            generator.next_ground_conjunction(&state, &sets, &mut handler)
        {
            assert_eq!(conjunction.fluent_literals.len(), 3);
            assert!(conjunction.static_literals.is_empty());
            assert!(conjunction.derived_literals.is_empty());
            // The pick precondition is all-positive and every induced
            // literal holds in the state the binding came from.
            for literal in &conjunction.fluent_literals {
                assert!(!literal.negated);
                assert!(state.fluent_atoms.contains(literal.atom_index));
            }
            count += 1;
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn goal_detection_goes_through_the_goal_condition() {
        let fixture = crate::test_utils::gripper();
        let mut repository = crate::search::StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();
        assert!(!is_goal_state(&fixture.problem, &state));
    }
}
