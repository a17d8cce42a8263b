use crate::formalism::Problem;
use crate::search::applicability::is_action_applicable;
use crate::search::binding_generator::{
    DynamicAssignmentSets, SatisficingBindingGenerator, StaticAssignmentSets,
};
use crate::search::event_handlers::{
    BindingEventHandler, DefaultBindingEventHandler, DefaultLaagEventHandler, LaagEventHandler,
};
use crate::search::ground_action::GroundAction;
use crate::search::grounder::ActionGrounder;
use crate::search::states::UnpackedState;
use std::rc::Rc;
use tracing::debug;

/// The lifted applicable-action generator: per state, enumerates all ground
/// actions whose preconditions hold, by driving one satisficing binding
/// generator per action schema and grounding every binding it yields.
///
/// Schemas are visited in domain order and bindings in the deterministic
/// order of the clique enumeration, so the emission order is reproducible.
#[derive(Debug)]
pub struct LiftedApplicableActionGenerator {
    problem: Rc<Problem>,
    generators: Vec<SatisficingBindingGenerator>,
    grounder: ActionGrounder,
    assignment_sets: DynamicAssignmentSets,
    event_handler: Box<dyn LaagEventHandler>,
    binding_event_handler: Box<dyn BindingEventHandler>,
}

impl LiftedApplicableActionGenerator {
    pub fn new(problem: Rc<Problem>) -> Self {
        Self::with_event_handlers(
            problem,
            Box::new(DefaultLaagEventHandler),
            Box::new(DefaultBindingEventHandler),
        )
    }

    pub fn with_event_handlers(
        problem: Rc<Problem>,
        event_handler: Box<dyn LaagEventHandler>,
        binding_event_handler: Box<dyn BindingEventHandler>,
    ) -> Self {
        let static_sets = StaticAssignmentSets::new(&problem);
        let generators = problem
            .domain()
            .action_schemas()
            .iter()
            .map(|schema| {
                SatisficingBindingGenerator::new(
                    Rc::clone(&problem),
                    schema.precondition().clone(),
                    &static_sets,
                )
            })
            .collect();
        debug!(
            "Initialised lifted applicable-action generator for {} action schemas",
            problem.domain().action_schemas().len()
        );
        Self {
            grounder: ActionGrounder::new(Rc::clone(&problem), &static_sets),
            generators,
            assignment_sets: DynamicAssignmentSets::new(&problem),
            problem,
            event_handler,
            binding_event_handler,
        }
    }

    pub fn problem(&self) -> &Rc<Problem> {
        &self.problem
    }

    pub fn grounder(&self) -> &ActionGrounder {
        &self.grounder
    }

    /// The lazy sequence of applicable ground actions in the given state.
    /// The iterator borrows the generator's buffers; dropping it at any
    /// point cancels the enumeration.
    pub fn generate_applicable_actions<'a>(
        &'a mut self,
        state: &'a UnpackedState,
    ) -> ApplicableActionIter<'a> {
        ApplicableActionIter {
            generator: self,
            state,
            schema_cursor: 0,
            schema_active: false,
            started: false,
            finished: false,
        }
    }

    /// Convenience wrapper that drains the lazy sequence.
    pub fn collect_applicable_actions(&mut self, state: &UnpackedState) -> Vec<Rc<GroundAction>> {
        self.generate_applicable_actions(state).collect()
    }

    /// Notification hook from the search layer; forwarded to the event
    /// handler.
    pub fn on_finish_search_layer(&mut self) {
        self.event_handler.on_finish_search_layer();
    }

    /// Notification hook from the search layer; forwarded to the event
    /// handler.
    pub fn on_end_search(&mut self) {
        self.event_handler.on_end_search();
    }
}

/// Cooperative lazy iterator over the applicable ground actions of one
/// state. Suspension points are between emitted actions; within one `next`
/// call the work is uninterruptible.
#[derive(Debug)]
pub struct ApplicableActionIter<'a> {
    generator: &'a mut LiftedApplicableActionGenerator,
    state: &'a UnpackedState,
    schema_cursor: usize,
    schema_active: bool,
    started: bool,
    finished: bool,
}

impl Iterator for ApplicableActionIter<'_> {
    type Item = Rc<GroundAction>;

    fn next(&mut self) -> Option<Self::Item> {
        let generator = &mut *self.generator;

        if self.finished {
            return None;
        }

        if !self.started {
            self.started = true;
            generator
                .event_handler
                .on_start_generating_applicable_actions();
            generator
                .assignment_sets
                .initialize(&generator.problem, self.state);
        }

        loop {
            let schemas = generator.problem.domain().action_schemas();
            if self.schema_cursor >= schemas.len() {
                self.finished = true;
                generator
                    .event_handler
                    .on_end_generating_applicable_actions();
                return None;
            }

            if !self.schema_active {
                // The nullary fast path lives in `start`: a failed nullary
                // precondition parks the whole schema.
                if !generator.generators[self.schema_cursor]
                    .start(self.state, &generator.assignment_sets)
                {
                    self.schema_cursor += 1;
                    continue;
                }
                self.schema_active = true;
            }

            let binding = generator.generators[self.schema_cursor].next_binding(
                self.state,
                &generator.assignment_sets,
                generator.binding_event_handler.as_mut(),
            );

            let Some(binding) = binding else {
                self.schema_active = false;
                self.schema_cursor += 1;
                continue;
            };

            let schema = &generator.problem.domain().action_schemas()[self.schema_cursor];
            let raw_binding = binding.clone();
            match generator.grounder.ground(schema, binding) {
                Ok((action, cache_hit)) => {
                    debug_assert!(is_action_applicable(&action, &generator.problem, self.state));
                    generator.event_handler.on_ground_action(&action);
                    if cache_hit {
                        generator.event_handler.on_ground_action_cache_hit();
                    } else {
                        generator.event_handler.on_ground_action_cache_miss();
                    }
                    return Some(action);
                }
                Err(_) => {
                    // A cost evaluation error makes the binding invalid; the
                    // enumeration continues.
                    generator
                        .binding_event_handler
                        .on_invalid_binding(&raw_binding);
                    continue;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::event_handlers::{CountingEventHandler, SharedGenerationCounts};
    use crate::search::StateRepository;
    use crate::test_utils::gripper;
    use std::collections::BTreeSet;

    fn signature(action: &GroundAction) -> (usize, Vec<usize>) {
        (action.schema_index, action.binding.iter().copied().collect())
    }

    #[test]
    fn gripper_initial_state_yields_exactly_six_actions() {
        crate::test_utils::init_test_logging();
        let fixture = gripper();
        let mut repository = StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();

        let mut generator = LiftedApplicableActionGenerator::new(Rc::clone(&fixture.problem));
        let actions: BTreeSet<_> = generator
            .generate_applicable_actions(&state)
            .map(|action| signature(&action))
            .collect();

        let expected = BTreeSet::from([
            (fixture.move_schema, vec![fixture.rooma, fixture.rooma]),
            (fixture.move_schema, vec![fixture.rooma, fixture.roomb]),
            (
                fixture.pick_schema,
                vec![fixture.ball1, fixture.rooma, fixture.left],
            ),
            (
                fixture.pick_schema,
                vec![fixture.ball1, fixture.rooma, fixture.right],
            ),
            (
                fixture.pick_schema,
                vec![fixture.ball2, fixture.rooma, fixture.left],
            ),
            (
                fixture.pick_schema,
                vec![fixture.ball2, fixture.rooma, fixture.right],
            ),
        ]);
        assert_eq!(actions, expected);

        let names: BTreeSet<String> = generator
            .generate_applicable_actions(&state)
            .map(|action| action.human_readable(&fixture.problem))
            .collect();
        let expected_names: BTreeSet<String> = [
            "move(rooma, rooma)",
            "move(rooma, roomb)",
            "pick(ball1, rooma, left)",
            "pick(ball1, rooma, right)",
            "pick(ball2, rooma, left)",
            "pick(ball2, rooma, right)",
        ]
        .map(String::from)
        .into();
        assert_eq!(names, expected_names);
    }

    #[test]
    fn picked_ball_cannot_be_picked_again_but_can_be_dropped() {
        let fixture = gripper();
        let mut repository = StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();

        let mut generator = LiftedApplicableActionGenerator::new(Rc::clone(&fixture.problem));
        let pick_ball1_left = generator
            .generate_applicable_actions(&state)
            .find(|action| {
                signature(action)
                    == (
                        fixture.pick_schema,
                        vec![fixture.ball1, fixture.rooma, fixture.left],
                    )
            })
            .expect("pick(ball1, rooma, left) is applicable initially");

        let successor = repository
            .successor_state(&state, &pick_ball1_left)
            .unwrap();

        // carry(ball1, left), not free(left), not at(ball1, rooma), and the
        // robot has not moved.
        let fluent = crate::formalism::PredicateCategory::Fluent;
        let atom = |predicate: usize, objects: &[usize]| {
            fixture
                .problem
                .find_ground_atom(fluent, predicate, objects)
                .expect("atom was interned during grounding")
        };
        assert!(successor
            .fluent_atoms
            .contains(atom(fixture.carry, &[fixture.ball1, fixture.left])));
        assert!(!successor
            .fluent_atoms
            .contains(atom(fixture.free, &[fixture.left])));
        assert!(!successor
            .fluent_atoms
            .contains(atom(fixture.at, &[fixture.ball1, fixture.rooma])));
        assert!(successor
            .fluent_atoms
            .contains(atom(fixture.at_robby, &[fixture.rooma])));

        let actions: BTreeSet<_> = generator
            .generate_applicable_actions(&successor)
            .map(|action| signature(&action))
            .collect();

        assert!(actions
            .iter()
            .all(|(schema, binding)| *schema != fixture.pick_schema || binding[0] != fixture.ball1));
        assert!(actions.contains(&(
            fixture.drop_schema,
            vec![fixture.ball1, fixture.rooma, fixture.left],
        )));
        // The other ball is still up for grabs.
        assert!(actions.contains(&(
            fixture.pick_schema,
            vec![fixture.ball2, fixture.rooma, fixture.right],
        )));
    }

    #[test]
    fn generation_is_lazy_and_cancellable() {
        let fixture = gripper();
        let mut repository = StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();

        let counts = SharedGenerationCounts::default();
        let mut generator = LiftedApplicableActionGenerator::with_event_handlers(
            Rc::clone(&fixture.problem),
            Box::new(CountingEventHandler::new(counts.clone())),
            Box::new(CountingEventHandler::new(counts.clone())),
        );

        {
            let mut iter = generator.generate_applicable_actions(&state);
            assert!(iter.next().is_some());
            // Dropping the iterator here abandons the enumeration.
        }
        assert_eq!(counts.snapshot().ground_actions, 1);

        // A fresh run over the same state replays everything from the cache.
        let total = generator.collect_applicable_actions(&state).len();
        assert_eq!(total, 6);
        let snapshot = counts.snapshot();
        assert_eq!(snapshot.ground_actions, 7);
        assert_eq!(snapshot.action_cache_hits, 1);
        assert_eq!(snapshot.action_cache_misses, 6);
    }
}
