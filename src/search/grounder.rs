use crate::formalism::{
    ActionSchema, AxiomSchema, Binding, ConjunctiveCondition, FunctionCategory, FunctionExpression,
    GroundFunctionExpression, NumericError, PredicateCategory, Problem, RawBinding,
};
use crate::search::binding_generator::StaticAssignmentSets;
use crate::search::consistency_graph::StaticConsistencyGraph;
use crate::search::ground_action::{
    GroundAction, GroundAxiom, GroundConditionalEffect, GroundConjunctiveCondition,
    GroundConjunctiveEffect, GroundNumericEffect,
};
use crate::search::states::grow_insert;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::collections::HashMap;
use std::rc::Rc;
use strum::IntoEnumIterator;
use thiserror::Error;

/// Grounding a (schema, binding) pair can fail without the binding being a
/// programming error; the caller treats the binding as invalid and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GroundingError {
    #[error("positive and negative static preconditions intersect")]
    StaticallyInapplicable,
    #[error("positive and negative dynamic preconditions intersect")]
    ContradictoryPrecondition,
    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Substitute the binding into every literal of the condition and set the
/// matching polarity/category bit.
fn ground_condition(
    problem: &Problem,
    condition: &ConjunctiveCondition,
    binding: &[usize],
) -> GroundConjunctiveCondition {
    let mut flat = GroundConjunctiveCondition::default();
    for category in PredicateCategory::iter() {
        for literal in condition.all_literals(category) {
            let ground_literal = problem.ground_literal(literal, binding);
            let (positive, negative) = flat.bitsets_mut(category);
            if ground_literal.negated {
                grow_insert(negative, ground_literal.atom_index);
            } else {
                grow_insert(positive, ground_literal.atom_index);
            }
        }
    }
    flat
}

fn ground_expression(
    problem: &Problem,
    expression: &FunctionExpression,
    binding: &[usize],
) -> GroundFunctionExpression {
    match expression {
        FunctionExpression::Number(number) => GroundFunctionExpression::Number(*number),
        FunctionExpression::BinaryOperation { op, left, right } => {
            GroundFunctionExpression::BinaryOperation {
                op: *op,
                left: Box::new(ground_expression(problem, left, binding)),
                right: Box::new(ground_expression(problem, right, binding)),
            }
        }
        FunctionExpression::MultiOperation { op, operands } => {
            GroundFunctionExpression::MultiOperation {
                op: *op,
                operands: operands
                    .iter()
                    .map(|operand| ground_expression(problem, operand, binding))
                    .collect(),
            }
        }
        FunctionExpression::Minus(inner) => {
            GroundFunctionExpression::Minus(Box::new(ground_expression(problem, inner, binding)))
        }
        FunctionExpression::Function(function) => {
            let objects = function.substitute(binding);
            GroundFunctionExpression::Function {
                category: function.category,
                index: problem.find_ground_function(
                    function.category,
                    function.skeleton_index,
                    &objects,
                ),
            }
        }
    }
}

/// Memoised grounding of action schemas. One grounding table per schema,
/// keyed by the interned binding; ground records live in a dense per-kind
/// vector and never reference other ground records.
#[derive(Debug)]
pub struct ActionGrounder {
    problem: Rc<Problem>,
    tables: Vec<HashMap<Binding, usize>>,
    actions: Vec<Rc<GroundAction>>,
    /// Static consistency graphs of the universal effects, per schema. Only
    /// the object partitions are consulted; the dynamic part of a universal
    /// effect condition is re-checked at effect application.
    universal_graphs: Vec<Vec<StaticConsistencyGraph>>,
}

impl ActionGrounder {
    pub fn new(problem: Rc<Problem>, static_sets: &StaticAssignmentSets) -> Self {
        let universal_graphs = problem
            .domain()
            .action_schemas()
            .iter()
            .map(|schema| {
                schema
                    .universal_effects()
                    .iter()
                    .map(|universal| {
                        StaticConsistencyGraph::new(
                            &problem,
                            universal.parameters(),
                            universal.condition().literals(PredicateCategory::Static),
                            &static_sets.predicates,
                        )
                    })
                    .collect()
            })
            .collect();
        let num_schemas = problem.domain().action_schemas().len();
        Self {
            problem,
            tables: vec![HashMap::new(); num_schemas],
            actions: Vec::new(),
            universal_graphs,
        }
    }

    /// Ground a schema under a binding. Returns the hash-consed record and
    /// whether it was already in the table.
    pub fn ground(
        &mut self,
        schema: &ActionSchema,
        binding: RawBinding,
    ) -> Result<(Rc<GroundAction>, bool), GroundingError> {
        let binding = Binding::new(binding);
        if let Some(&index) = self.tables[schema.index].get(&binding) {
            return Ok((Rc::clone(&self.actions[index]), true));
        }

        let problem = &self.problem;
        let condition = ground_condition(problem, schema.precondition(), binding.as_slice());
        if !condition.positive_static.is_disjoint(&condition.negative_static) {
            return Err(GroundingError::StaticallyInapplicable);
        }
        if !condition.is_internally_consistent() {
            return Err(GroundingError::ContradictoryPrecondition);
        }

        let mut effect = GroundConjunctiveEffect::default();
        for literal in schema.effect().literals() {
            let ground_literal = problem.ground_literal(literal, binding.as_slice());
            if ground_literal.negated {
                grow_insert(&mut effect.delete, ground_literal.atom_index);
            } else {
                grow_insert(&mut effect.add, ground_literal.atom_index);
            }
        }
        for numeric_effect in schema.effect().numeric_effects() {
            let objects = numeric_effect.function.substitute(binding.as_slice());
            effect.numeric_effects.push(GroundNumericEffect {
                op: numeric_effect.op,
                target: problem.find_ground_function(
                    FunctionCategory::Fluent,
                    numeric_effect.function.skeleton_index,
                    &objects,
                ),
                expression: ground_expression(
                    problem,
                    &numeric_effect.expression,
                    binding.as_slice(),
                ),
            });
        }

        let mut conditional_effects = Vec::new();
        for conditional in schema.conditional_effects() {
            conditional_effects.push(GroundConditionalEffect {
                condition: ground_condition(problem, conditional.condition(), binding.as_slice()),
                effect: problem.ground_literal(conditional.effect(), binding.as_slice()),
            });
        }

        // Universal effects expand by Cartesian product over the object
        // partitions of their own static consistency graph, extending the
        // binding with the quantified parameters.
        for (universal, graph) in schema
            .universal_effects()
            .iter()
            .zip(&self.universal_graphs[schema.index])
        {
            let partitions = graph.objects_by_parameter_index();
            for combination in partitions.iter().multi_cartesian_product() {
                let mut extended: RawBinding = binding.raw().clone();
                extended.extend(combination.into_iter().copied());
                conditional_effects.push(GroundConditionalEffect {
                    condition: ground_condition(problem, universal.condition(), &extended),
                    effect: problem.ground_literal(universal.effect(), &extended),
                });
            }
        }

        let cost = ground_expression(problem, schema.cost(), binding.as_slice())
            .evaluate(problem.static_function_values(), problem.initial_numeric_values())?;

        let index = self.actions.len();
        let action = Rc::new(GroundAction {
            index,
            schema_index: schema.index,
            binding,
            condition,
            effect,
            conditional_effects,
            cost: OrderedFloat(cost),
        });
        self.actions.push(Rc::clone(&action));
        self.tables[schema.index].insert(binding, index);
        Ok((action, false))
    }

    /// All ground actions created so far, dense by index.
    pub fn actions(&self) -> &[Rc<GroundAction>] {
        &self.actions
    }

    pub fn num_ground_actions(&self) -> usize {
        self.actions.len()
    }
}

/// Memoised grounding of axiom schemas, one table per axiom.
#[derive(Debug)]
pub struct AxiomGrounder {
    problem: Rc<Problem>,
    tables: Vec<HashMap<Binding, usize>>,
    axioms: Vec<Rc<GroundAxiom>>,
}

impl AxiomGrounder {
    pub fn new(problem: Rc<Problem>) -> Self {
        let num_axioms = problem.axiom_schemas().len();
        Self {
            problem,
            tables: vec![HashMap::new(); num_axioms],
            axioms: Vec::new(),
        }
    }

    pub fn ground(
        &mut self,
        axiom: &AxiomSchema,
        binding: RawBinding,
    ) -> Result<(Rc<GroundAxiom>, bool), GroundingError> {
        let binding = Binding::new(binding);
        if let Some(&index) = self.tables[axiom.index].get(&binding) {
            return Ok((Rc::clone(&self.axioms[index]), true));
        }

        let problem = &self.problem;
        let condition = ground_condition(problem, axiom.body(), binding.as_slice());
        if !condition.positive_static.is_disjoint(&condition.negative_static) {
            return Err(GroundingError::StaticallyInapplicable);
        }
        if !condition.is_internally_consistent() {
            return Err(GroundingError::ContradictoryPrecondition);
        }

        let head = problem.ground_literal(axiom.head(), binding.as_slice());
        debug_assert!(!head.negated);

        let index = self.axioms.len();
        let ground_axiom = Rc::new(GroundAxiom {
            index,
            schema_index: axiom.index,
            binding,
            condition,
            head_atom_index: head.atom_index,
        });
        self.axioms.push(Rc::clone(&ground_axiom));
        self.tables[axiom.index].insert(binding, index);
        Ok((ground_axiom, false))
    }

    pub fn axioms(&self) -> &[Rc<GroundAxiom>] {
        &self.axioms
    }

    pub fn num_ground_axioms(&self) -> usize {
        self.axioms.len()
    }
}
