use crate::formalism::Problem;
use crate::search::ground_action::{
    GroundAction, GroundAxiom, GroundConditionalEffect, GroundConjunctiveCondition,
};
use crate::search::states::UnpackedState;
use fixedbitset::FixedBitSet;

/// The static part of applicability: the positive static precondition is
/// contained in the static initial set and the negative one is disjoint from
/// it. Static atoms never change, so failing this makes the record dead for
/// the whole run.
pub fn is_statically_applicable(
    condition: &GroundConjunctiveCondition,
    static_atoms: &FixedBitSet,
) -> bool {
    condition.positive_static.is_subset(static_atoms)
        && condition.negative_static.is_disjoint(static_atoms)
}

/// The dynamic part of applicability against the fluent and derived bitsets
/// of a state.
pub fn is_dynamically_applicable(
    condition: &GroundConjunctiveCondition,
    state: &UnpackedState,
) -> bool {
    condition.positive_fluent.is_subset(&state.fluent_atoms)
        && condition.negative_fluent.is_disjoint(&state.fluent_atoms)
        && condition.positive_derived.is_subset(&state.derived_atoms)
        && condition.negative_derived.is_disjoint(&state.derived_atoms)
}

pub fn is_applicable(
    condition: &GroundConjunctiveCondition,
    problem: &Problem,
    state: &UnpackedState,
) -> bool {
    is_statically_applicable(condition, problem.static_initial_positive_atoms())
        && is_dynamically_applicable(condition, state)
}

pub fn is_action_applicable(action: &GroundAction, problem: &Problem, state: &UnpackedState) -> bool {
    is_applicable(&action.condition, problem, state)
}

pub fn is_axiom_applicable(axiom: &GroundAxiom, problem: &Problem, state: &UnpackedState) -> bool {
    is_applicable(&axiom.condition, problem, state)
}

/// Conditional effects are evaluated against the state the action is applied
/// to, before any effect of the same action lands.
pub fn conditional_effect_fires(
    effect: &GroundConditionalEffect,
    problem: &Problem,
    state: &UnpackedState,
) -> bool {
    is_applicable(&effect.condition, problem, state)
}
