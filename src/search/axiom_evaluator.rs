use crate::formalism::{PredicateCategory, Problem, RawBinding, StructuralError};
use crate::search::applicability::is_axiom_applicable;
use crate::search::binding_generator::{
    DynamicAssignmentSets, SatisficingBindingGenerator, StaticAssignmentSets,
};
use crate::search::event_handlers::{
    AxiomEventHandler, BindingEventHandler, DefaultAxiomEventHandler, DefaultBindingEventHandler,
};
use crate::search::grounder::AxiomGrounder;
use crate::search::ground_action::GroundAxiom;
use crate::search::states::{grow_insert, UnpackedState};
use crate::search::stratification::{compute_axiom_partitioning, AxiomPartition};
use fixedbitset::FixedBitSet;
use std::rc::Rc;
use tracing::trace;

/// Closes a state under the derived-predicate axioms: stratum by stratum, a
/// fixed-point loop drives the binding generators of the relevant axioms,
/// grounds every produced binding and adds the head atoms to the derived
/// bitset until nothing new appears. The fluent atoms of the state are fixed
/// throughout; only the derived bitset is mutated.
#[derive(Debug)]
pub struct AxiomEvaluator {
    problem: Rc<Problem>,
    partitioning: Vec<AxiomPartition>,
    generators: Vec<SatisficingBindingGenerator>,
    grounder: AxiomGrounder,
    assignment_sets: DynamicAssignmentSets,
    event_handler: Box<dyn AxiomEventHandler>,
    binding_event_handler: Box<dyn BindingEventHandler>,
    /// Scratch across calls.
    bindings: Vec<RawBinding>,
    applicable: Vec<Rc<GroundAxiom>>,
    relevant: FixedBitSet,
}

impl AxiomEvaluator {
    pub fn new(problem: Rc<Problem>) -> Result<Self, StructuralError> {
        Self::with_event_handlers(
            problem,
            Box::new(DefaultAxiomEventHandler),
            Box::new(DefaultBindingEventHandler),
        )
    }

    pub fn with_event_handlers(
        problem: Rc<Problem>,
        event_handler: Box<dyn AxiomEventHandler>,
        binding_event_handler: Box<dyn BindingEventHandler>,
    ) -> Result<Self, StructuralError> {
        let axioms = problem.axiom_schemas();

        if axioms.iter().any(|axiom| axiom.head().is_negated()) {
            return Err(StructuralError::NegativeAxiomHead);
        }

        let partitioning = compute_axiom_partitioning(
            axioms,
            problem.predicates(PredicateCategory::Derived),
        )?;

        let static_sets = StaticAssignmentSets::new(&problem);
        let generators = axioms
            .iter()
            .map(|axiom| {
                SatisficingBindingGenerator::new(
                    Rc::clone(&problem),
                    axiom.body().clone(),
                    &static_sets,
                )
            })
            .collect();

        let num_axioms = axioms.len();
        Ok(Self {
            grounder: AxiomGrounder::new(Rc::clone(&problem)),
            generators,
            assignment_sets: DynamicAssignmentSets::new(&problem),
            partitioning,
            problem,
            event_handler,
            binding_event_handler,
            bindings: Vec::new(),
            applicable: Vec::new(),
            relevant: FixedBitSet::with_capacity(num_axioms),
        })
    }

    pub fn problem(&self) -> &Rc<Problem> {
        &self.problem
    }

    pub fn partitioning(&self) -> &[AxiomPartition] {
        &self.partitioning
    }

    pub fn grounder(&self) -> &AxiomGrounder {
        &self.grounder
    }

    /// Extend the derived bitset of the state to the least fixed point of
    /// the axioms over its fluent atoms. Idempotent: running it twice yields
    /// the same bitset.
    pub fn generate_and_apply_axioms(&mut self, state: &mut UnpackedState) {
        self.event_handler.on_start_generating_applicable_axioms();
        self.assignment_sets.initialize(&self.problem, state);

        let Self {
            problem,
            partitioning,
            generators,
            grounder,
            assignment_sets,
            event_handler,
            binding_event_handler,
            bindings,
            applicable,
            relevant,
            ..
        } = self;

        for partition in partitioning.iter() {
            relevant.clear();
            relevant.grow(problem.axiom_schemas().len());
            for &axiom_index in partition.initially_relevant_axioms() {
                relevant.insert(axiom_index);
            }

            loop {
                let mut reached_fixed_point = true;

                applicable.clear();
                for axiom_index in relevant.ones() {
                    let axiom = &problem.axiom_schemas()[axiom_index];
                    let generator = &mut generators[axiom_index];
                    if !generator.start(state, assignment_sets) {
                        continue;
                    }
                    bindings.clear();
                    generator.collect_bindings(
                        state,
                        assignment_sets,
                        binding_event_handler.as_mut(),
                        bindings,
                    );
                    for binding in bindings.drain(..) {
                        match grounder.ground(axiom, binding) {
                            Ok((ground_axiom, cache_hit)) => {
                                event_handler.on_ground_axiom(&ground_axiom);
                                if cache_hit {
                                    event_handler.on_ground_axiom_cache_hit();
                                } else {
                                    event_handler.on_ground_axiom_cache_miss();
                                }
                                applicable.push(ground_axiom);
                            }
                            Err(_) => {
                                // A contradictory body cannot come out of a
                                // validated binding.
                                debug_assert!(false, "validated binding failed to ground");
                            }
                        }
                    }
                }

                relevant.clear();

                for ground_axiom in applicable.iter() {
                    debug_assert!(is_axiom_applicable(ground_axiom, problem, state));

                    let atom_index = ground_axiom.head_atom_index;
                    if state.derived_atoms.contains(atom_index) {
                        continue;
                    }

                    grow_insert(&mut state.derived_atoms, atom_index);
                    reached_fixed_point = false;

                    let atom = problem.ground_atom(PredicateCategory::Derived, atom_index);
                    assignment_sets
                        .derived
                        .insert_ground_atom(atom.predicate_index, &atom.objects);

                    for &watcher in partition.axioms_with_body_predicate(atom.predicate_index) {
                        relevant.insert(watcher);
                    }
                }

                if reached_fixed_point {
                    break;
                }
                trace!("Axiom stratum not yet at fixed point, rerunning relevant axioms");
            }
        }

        self.event_handler.on_end_generating_applicable_axioms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formalism::raw_binding;
    use crate::search::StateRepository;
    use crate::test_utils::reachability_chain;
    use std::collections::BTreeSet;

    fn reachable_objects(
        problem: &Problem,
        state: &UnpackedState,
        reachable: usize,
    ) -> BTreeSet<usize> {
        state
            .derived_atoms
            .ones()
            .map(|index| problem.ground_atom(PredicateCategory::Derived, index))
            .filter(|atom| atom.predicate_index == reachable)
            .map(|atom| atom.objects[0])
            .collect()
    }

    #[test]
    fn chain_reachability_closes_to_the_tail() {
        crate::test_utils::init_test_logging();
        let fixture = reachability_chain();
        let mut repository = StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();

        assert_eq!(
            reachable_objects(&fixture.problem, &state, fixture.reachable),
            BTreeSet::from([fixture.b, fixture.c, fixture.d])
        );
        // The source itself is not derived reachable.
        assert!(!reachable_objects(&fixture.problem, &state, fixture.reachable)
            .contains(&fixture.a));

        let atom_index = fixture
            .problem
            .find_ground_atom(PredicateCategory::Derived, fixture.reachable, &[fixture.b])
            .unwrap();
        assert_eq!(
            fixture
                .problem
                .ground_atom(PredicateCategory::Derived, atom_index)
                .human_readable(&fixture.problem),
            "reachable(b)"
        );

        // Both axioms share one stratum; only the base axiom can fire before
        // anything is derived, the recursive one is woken by new atoms.
        let partitioning = repository.axiom_evaluator().partitioning();
        assert_eq!(partitioning.len(), 1);
        assert_eq!(partitioning[0].initially_relevant_axioms(), &[0]);
        assert_eq!(
            partitioning[0].axioms_with_body_predicate(fixture.reachable),
            &[1]
        );
    }

    #[test]
    fn closure_is_idempotent() {
        let fixture = reachability_chain();
        let mut evaluator = AxiomEvaluator::new(Rc::clone(&fixture.problem)).unwrap();
        let mut state = UnpackedState::new(&fixture.problem);

        evaluator.generate_and_apply_axioms(&mut state);
        let first = state.derived_atoms.clone();
        evaluator.generate_and_apply_axioms(&mut state);
        assert_eq!(first, state.derived_atoms);
    }

    #[test]
    fn closure_subsumes_preseeded_derived_atoms() {
        let fixture = reachability_chain();
        let mut evaluator = AxiomEvaluator::new(Rc::clone(&fixture.problem)).unwrap();

        // Start from a state that already believes reachable(d); the fixed
        // point is the same.
        let mut state = UnpackedState::new(&fixture.problem);
        let preseeded = fixture.problem.ground_atom_index(
            PredicateCategory::Derived,
            fixture.reachable,
            raw_binding![fixture.d],
        );
        grow_insert(&mut state.derived_atoms, preseeded);
        evaluator.generate_and_apply_axioms(&mut state);

        assert_eq!(
            reachable_objects(&fixture.problem, &state, fixture.reachable),
            BTreeSet::from([fixture.b, fixture.c, fixture.d])
        );
    }

    #[test]
    fn problem_level_axioms_are_unioned_with_domain_axioms() {
        use crate::formalism::{ConjunctiveCondition, DomainBuilder, Literal, ProblemBuilder};

        let mut domain = DomainBuilder::new("flags");
        let marked = domain.add_predicate(PredicateCategory::Fluent, "marked", &[]);
        let domain = Rc::new(domain.finish());

        // The derived predicate and its defining axiom live on the problem.
        let mut builder = ProblemBuilder::new(Rc::clone(&domain), "flags-01");
        let flagged = builder.add_derived_predicate("flagged", &[]);
        builder.add_axiom_schema(
            ConjunctiveCondition::new(
                Vec::new(),
                vec![Literal::new_literal(
                    false,
                    PredicateCategory::Fluent,
                    marked,
                    Vec::new(),
                )],
                Vec::new(),
            ),
            Literal::new_literal(false, PredicateCategory::Derived, flagged, Vec::new()),
        );
        builder.add_initial_atom(PredicateCategory::Fluent, marked, RawBinding::new());
        let problem = Rc::new(builder.finish().unwrap());

        let mut repository = StateRepository::new(Rc::clone(&problem)).unwrap();
        let state = repository.initial_state();

        let flagged_index = problem
            .find_ground_atom(PredicateCategory::Derived, flagged, &[])
            .unwrap();
        assert!(state.derived_atoms.contains(flagged_index));
    }

    #[test]
    fn negated_axiom_head_is_rejected_at_load_time() {
        use crate::formalism::{
            ConjunctiveCondition, DomainBuilder, Literal, Parameter, ProblemBuilder, Term,
        };

        let mut domain = DomainBuilder::new("bad-heads");
        let object = domain.object_type();
        let p = domain.add_predicate(PredicateCategory::Derived, "p", &[object]);
        domain.add_axiom_schema(
            ConjunctiveCondition::new(vec![Parameter::new(0, object)], Vec::new(), Vec::new()),
            Literal::new_literal(true, PredicateCategory::Derived, p, vec![Term::variable(0)]),
        );
        let domain = Rc::new(domain.finish());
        let problem = Rc::new(
            ProblemBuilder::new(domain, "bad-heads-01")
                .finish()
                .unwrap(),
        );

        assert_eq!(
            AxiomEvaluator::new(problem).unwrap_err(),
            StructuralError::NegativeAxiomHead
        );
    }
}
