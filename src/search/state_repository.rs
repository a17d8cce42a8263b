use crate::formalism::{NumericEffectOp, NumericError, Problem, StructuralError};
use crate::search::applicability::{conditional_effect_fires, is_action_applicable};
use crate::search::axiom_evaluator::AxiomEvaluator;
use crate::search::binding_generator::is_goal_state;
use crate::search::ground_action::GroundAction;
use crate::search::states::{grow_insert, PackedState, UnpackedState};
use std::collections::HashMap;
use std::rc::Rc;

/// Owns the packed-state interning table, effect application and the axiom
/// closure that follows it. The flat layout of the ground records fixes the
/// effect semantics: adds and deletes are aggregated over the unconditional
/// effect and every fired conditional effect, and deletions win, so the
/// successor is `(state ∪ all_add) \ all_del`.
#[derive(Debug)]
pub struct StateRepository {
    problem: Rc<Problem>,
    axiom_evaluator: AxiomEvaluator,
    index_by_packed: HashMap<PackedState, usize>,
    packed_states: Vec<PackedState>,
}

impl StateRepository {
    pub fn new(problem: Rc<Problem>) -> Result<Self, StructuralError> {
        let axiom_evaluator = AxiomEvaluator::new(Rc::clone(&problem))?;
        Ok(Self::with_axiom_evaluator(problem, axiom_evaluator))
    }

    pub fn with_axiom_evaluator(problem: Rc<Problem>, axiom_evaluator: AxiomEvaluator) -> Self {
        Self {
            problem,
            axiom_evaluator,
            index_by_packed: HashMap::new(),
            packed_states: Vec::new(),
        }
    }

    pub fn problem(&self) -> &Rc<Problem> {
        &self.problem
    }

    pub fn axiom_evaluator(&self) -> &AxiomEvaluator {
        &self.axiom_evaluator
    }

    /// The initial state: the positive fluent initial atoms and the initial
    /// numeric values, closed under the axioms.
    pub fn initial_state(&mut self) -> UnpackedState {
        let mut state = UnpackedState::new(&self.problem);
        for &atom_index in self.problem.fluent_initial_atoms() {
            grow_insert(&mut state.fluent_atoms, atom_index);
        }
        state.numeric_variables = self.problem.initial_numeric_values().to_vec();
        self.axiom_evaluator.generate_and_apply_axioms(&mut state);
        state
    }

    /// Apply an action to a state. Conditional effects are tested against
    /// the pre-state, propositional deltas are aggregated with delete-wins,
    /// numeric effects run in declaration order, and the derived atoms are
    /// recomputed from scratch on the result.
    pub fn successor_state(
        &mut self,
        state: &UnpackedState,
        action: &GroundAction,
    ) -> Result<UnpackedState, NumericError> {
        debug_assert!(is_action_applicable(action, &self.problem, state));

        let mut all_add = action.effect.add.clone();
        let mut all_delete = action.effect.delete.clone();
        for conditional in &action.conditional_effects {
            if conditional_effect_fires(conditional, &self.problem, state) {
                if conditional.effect.negated {
                    grow_insert(&mut all_delete, conditional.effect.atom_index);
                } else {
                    grow_insert(&mut all_add, conditional.effect.atom_index);
                }
            }
        }

        let mut fluent_atoms = state.fluent_atoms.clone();
        fluent_atoms.union_with(&all_add);
        fluent_atoms.difference_with(&all_delete);

        let mut numeric_variables = state.numeric_variables.clone();
        for numeric_effect in &action.effect.numeric_effects {
            let operand = numeric_effect.expression.evaluate(
                self.problem.static_function_values(),
                &numeric_variables,
            )?;
            let target = numeric_effect
                .target
                .ok_or(NumericError::UndefinedFunction)?;
            if numeric_variables.len() <= target {
                numeric_variables.resize(target + 1, f64::NAN);
            }
            let previous = numeric_variables[target];
            if previous.is_nan() && numeric_effect.op != NumericEffectOp::Assign {
                return Err(NumericError::UndefinedFunction);
            }
            if numeric_effect.op == NumericEffectOp::ScaleDown && operand == 0.0 {
                return Err(NumericError::DivisionByZero);
            }
            numeric_variables[target] = numeric_effect.op.apply(previous, operand);
        }

        let mut successor = UnpackedState::new(&self.problem);
        successor.fluent_atoms = fluent_atoms;
        successor.numeric_variables = numeric_variables;
        self.axiom_evaluator
            .generate_and_apply_axioms(&mut successor);
        Ok(successor)
    }

    pub fn pack(&self, state: &UnpackedState) -> PackedState {
        PackedState::pack(state)
    }

    pub fn unpack(&self, packed: &PackedState, out: &mut UnpackedState) {
        packed.unpack_into(&self.problem, out);
    }

    /// Intern a packed state, returning its dense index and whether it was
    /// new.
    pub fn get_or_insert(&mut self, packed: PackedState) -> (usize, bool) {
        if let Some(&index) = self.index_by_packed.get(&packed) {
            return (index, false);
        }
        let index = self.packed_states.len();
        self.index_by_packed.insert(packed.clone(), index);
        self.packed_states.push(packed);
        (index, true)
    }

    pub fn packed_state(&self, index: usize) -> &PackedState {
        &self.packed_states[index]
    }

    pub fn num_states(&self) -> usize {
        self.packed_states.len()
    }

    pub fn is_goal_state(&self, state: &UnpackedState) -> bool {
        is_goal_state(&self.problem, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formalism::{
        raw_binding, ConditionalEffect, ConjunctiveCondition, ConjunctiveEffect, DomainBuilder,
        Function, FunctionCategory, FunctionExpression, Literal, NumericEffect, NumericEffectOp,
        PredicateCategory, ProblemBuilder, RawBinding,
    };
    use crate::search::binding_generator::StaticAssignmentSets;
    use crate::search::grounder::ActionGrounder;
    use crate::search::LiftedApplicableActionGenerator;
    use assert_approx_eq::assert_approx_eq;
    use crate::test_utils::gripper;

    /// An action that unconditionally adds `p` while a conditional effect,
    /// whose condition holds, deletes it again: the deletion wins.
    #[test]
    fn conditional_delete_wins_over_unconditional_add() {
        use PredicateCategory::Fluent;

        let mut domain = DomainBuilder::new("toggle");
        let p = domain.add_predicate(Fluent, "p", &[]);
        let q = domain.add_predicate(Fluent, "q", &[]);
        let schema = domain.add_action_schema(
            "act",
            ConjunctiveCondition::new(Vec::new(), Vec::new(), Vec::new()),
            ConjunctiveEffect::new(
                vec![Literal::new_literal(false, Fluent, p, Vec::new())],
                Vec::new(),
            ),
            vec![ConditionalEffect::new(
                ConjunctiveCondition::new(
                    Vec::new(),
                    vec![Literal::new_literal(false, Fluent, q, Vec::new())],
                    Vec::new(),
                ),
                Literal::new_literal(true, Fluent, p, Vec::new()),
            )],
            Vec::new(),
            FunctionExpression::Number(1.0),
        );
        let domain = Rc::new(domain.finish());

        let mut builder = ProblemBuilder::new(Rc::clone(&domain), "toggle-01");
        builder.add_initial_atom(Fluent, q, RawBinding::new());
        let problem = Rc::new(builder.finish().unwrap());

        let static_sets = StaticAssignmentSets::new(&problem);
        let mut grounder = ActionGrounder::new(Rc::clone(&problem), &static_sets);
        let action = {
            let schema = &problem.domain().action_schemas()[schema];
            grounder.ground(schema, RawBinding::new()).unwrap().0
        };

        let mut repository = StateRepository::new(Rc::clone(&problem)).unwrap();
        let state = repository.initial_state();
        let successor = repository.successor_state(&state, &action).unwrap();

        let p_index = problem
            .find_ground_atom(Fluent, p, &[])
            .expect("nullary atoms are interned");
        let q_index = problem.find_ground_atom(Fluent, q, &[]).unwrap();
        assert!(!successor.fluent_atoms.contains(p_index));
        assert!(successor.fluent_atoms.contains(q_index));

        // Without q the conditional effect does not fire and p survives.
        let without_q = UnpackedState::new(&problem);
        let successor = repository.successor_state(&without_q, &action).unwrap();
        assert!(successor.fluent_atoms.contains(p_index));
    }

    #[test]
    fn numeric_effects_apply_in_declaration_order() {
        use PredicateCategory::Fluent;

        let mut domain = DomainBuilder::new("counter");
        let tick = domain.add_predicate(Fluent, "ticked", &[]);
        let total = domain.add_function(FunctionCategory::Fluent, "total", &[]);
        let total_fn = || Function::new(FunctionCategory::Fluent, total, Vec::new());
        let schema = domain.add_action_schema(
            "tick",
            ConjunctiveCondition::new(Vec::new(), Vec::new(), Vec::new()),
            ConjunctiveEffect::new(
                vec![Literal::new_literal(false, Fluent, tick, Vec::new())],
                vec![
                    NumericEffect::new(
                        NumericEffectOp::Increase,
                        total_fn(),
                        FunctionExpression::Number(2.5),
                    ),
                    NumericEffect::new(
                        NumericEffectOp::ScaleUp,
                        total_fn(),
                        FunctionExpression::Number(2.0),
                    ),
                ],
            ),
            Vec::new(),
            Vec::new(),
            FunctionExpression::Number(1.0),
        );
        let domain = Rc::new(domain.finish());

        let mut builder = ProblemBuilder::new(Rc::clone(&domain), "counter-01");
        builder.set_fluent_function_value(total, RawBinding::new(), 1.0);
        let problem = Rc::new(builder.finish().unwrap());

        let static_sets = StaticAssignmentSets::new(&problem);
        let mut grounder = ActionGrounder::new(Rc::clone(&problem), &static_sets);
        let action = {
            let schema = &problem.domain().action_schemas()[schema];
            grounder.ground(schema, RawBinding::new()).unwrap().0
        };

        let mut repository = StateRepository::new(Rc::clone(&problem)).unwrap();
        let state = repository.initial_state();
        assert_approx_eq!(state.numeric_variables[0], 1.0);

        // (1 + 2.5) * 2, not 1 * 2 + 2.5.
        let successor = repository.successor_state(&state, &action).unwrap();
        assert_approx_eq!(successor.numeric_variables[0], 7.0);
    }

    #[test]
    fn pack_unpack_pack_is_bit_identical() {
        let fixture = gripper();
        let mut repository = StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let state = repository.initial_state();

        let packed = repository.pack(&state);
        let mut unpacked = UnpackedState::new(&fixture.problem);
        repository.unpack(&packed, &mut unpacked);
        let repacked = repository.pack(&unpacked);
        assert_eq!(packed, repacked);

        let (index, fresh) = repository.get_or_insert(packed.clone());
        let (again, fresh_again) = repository.get_or_insert(repacked);
        assert!(fresh);
        assert!(!fresh_again);
        assert_eq!(index, again);
        assert_eq!(repository.packed_state(index), &packed);
    }

    #[test]
    fn executing_the_obvious_plan_reaches_the_goal() {
        let fixture = gripper();
        let mut repository = StateRepository::new(Rc::clone(&fixture.problem)).unwrap();
        let mut generator = LiftedApplicableActionGenerator::new(Rc::clone(&fixture.problem));

        let plan = [
            (
                fixture.pick_schema,
                raw_binding![fixture.ball1, fixture.rooma, fixture.left],
            ),
            (
                fixture.pick_schema,
                raw_binding![fixture.ball2, fixture.rooma, fixture.right],
            ),
            (fixture.move_schema, raw_binding![fixture.rooma, fixture.roomb]),
            (
                fixture.drop_schema,
                raw_binding![fixture.ball1, fixture.roomb, fixture.left],
            ),
            (
                fixture.drop_schema,
                raw_binding![fixture.ball2, fixture.roomb, fixture.right],
            ),
        ];

        let mut state = repository.initial_state();
        assert!(!repository.is_goal_state(&state));
        for (schema_index, binding) in plan {
            let action = generator
                .generate_applicable_actions(&state)
                .find(|action| {
                    action.schema_index == schema_index
                        && action.binding.as_slice() == binding.as_slice()
                })
                .expect("plan step is applicable");
            state = repository.successor_state(&state, &action).unwrap();
        }

        assert!(repository.is_goal_state(&state));
    }
}
