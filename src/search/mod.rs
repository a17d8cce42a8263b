//! The successor-state machinery: state representations, the assignment-set
//! and consistency-graph infrastructure, the k-partite k-clique enumeration
//! it feeds, the satisficing binding generator built on top, and the two
//! drivers that consume bindings: the lifted applicable-action generator and
//! the stratified axiom evaluator.

mod applicability;
mod applicable_action_generator;
mod assignment_set;
mod axiom_evaluator;
mod binding_generator;
mod consistency_graph;
mod event_handlers;
mod ground_action;
mod grounder;
mod kpkc;
mod numeric_assignment_set;
mod state_repository;
pub mod states;
mod stratification;

pub use applicability::{
    conditional_effect_fires, is_action_applicable, is_applicable, is_axiom_applicable,
    is_dynamically_applicable, is_statically_applicable,
};
pub use applicable_action_generator::{ApplicableActionIter, LiftedApplicableActionGenerator};
pub use assignment_set::{num_assignments, static_assignment_set, Assignment, AssignmentSet};
pub use axiom_evaluator::AxiomEvaluator;
pub use binding_generator::{
    evaluate_constraint, evaluate_expression, is_goal_state, is_valid_binding,
    is_valid_dynamic_binding, is_valid_static_binding, nullary_conditions_hold,
    DynamicAssignmentSets, GroundConjunction, SatisficingBindingGenerator, StaticAssignmentSets,
};
pub use consistency_graph::{Edge, StaticConsistencyGraph, Vertex};
pub use event_handlers::{
    AxiomEventHandler, BindingEventHandler, CountingEventHandler, DefaultAxiomEventHandler,
    DefaultBindingEventHandler, DefaultLaagEventHandler, GenerationCounts, LaagEventHandler,
    SharedGenerationCounts,
};
pub use ground_action::{
    GroundAction, GroundAxiom, GroundConditionalEffect, GroundConjunctiveCondition,
    GroundConjunctiveEffect, GroundNumericEffect,
};
pub use grounder::{ActionGrounder, AxiomGrounder, GroundingError};
pub use kpkc::KpkcSearch;
pub use numeric_assignment_set::{
    consistent_constraints_with_edge, consistent_constraints_with_vertex,
    static_numeric_assignment_set, NumericAssignmentSet,
};
pub use state_repository::StateRepository;
pub use states::{PackedState, UnpackedState};
pub use stratification::{compute_axiom_partitioning, AxiomPartition};
