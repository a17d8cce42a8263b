use crate::formalism::{
    Binding, GroundFunctionExpression, GroundLiteral, NumericEffectOp, PredicateCategory, Problem,
};
use fixedbitset::FixedBitSet;
use itertools::Itertools;
use ordered_float::OrderedFloat;

/// The flat form of a grounded conjunctive condition: six bitsets in fixed
/// order, one positive and one negative per predicate category, indexed by
/// ground atom index. Applicability is `(state ⊇ positive) ∧ (state ∩
/// negative = ∅)` per category, with the static initial set standing in for
/// the state on the static pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundConjunctiveCondition {
    pub positive_static: FixedBitSet,
    pub negative_static: FixedBitSet,
    pub positive_fluent: FixedBitSet,
    pub negative_fluent: FixedBitSet,
    pub positive_derived: FixedBitSet,
    pub negative_derived: FixedBitSet,
}

impl GroundConjunctiveCondition {
    pub fn positive(&self, category: PredicateCategory) -> &FixedBitSet {
        match category {
            PredicateCategory::Static => &self.positive_static,
            PredicateCategory::Fluent => &self.positive_fluent,
            PredicateCategory::Derived => &self.positive_derived,
        }
    }

    pub fn negative(&self, category: PredicateCategory) -> &FixedBitSet {
        match category {
            PredicateCategory::Static => &self.negative_static,
            PredicateCategory::Fluent => &self.negative_fluent,
            PredicateCategory::Derived => &self.negative_derived,
        }
    }

    pub(crate) fn bitsets_mut(
        &mut self,
        category: PredicateCategory,
    ) -> (&mut FixedBitSet, &mut FixedBitSet) {
        match category {
            PredicateCategory::Static => (&mut self.positive_static, &mut self.negative_static),
            PredicateCategory::Fluent => (&mut self.positive_fluent, &mut self.negative_fluent),
            PredicateCategory::Derived => (&mut self.positive_derived, &mut self.negative_derived),
        }
    }

    /// False iff some atom occurs both positively and negatively in any
    /// category, making the condition unsatisfiable.
    pub fn is_internally_consistent(&self) -> bool {
        self.positive_static.is_disjoint(&self.negative_static)
            && self.positive_fluent.is_disjoint(&self.negative_fluent)
            && self.positive_derived.is_disjoint(&self.negative_derived)
    }
}

/// A grounded numeric effect: the target fluent function (if it has a ground
/// record) and the grounded operand expression. An unresolved target
/// surfaces as an arithmetic error when the effect is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundNumericEffect {
    pub op: NumericEffectOp,
    pub target: Option<usize>,
    pub expression: GroundFunctionExpression,
}

/// The flat STRIPS effect: add and delete bitsets over fluent atoms, plus
/// the numeric effects in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundConjunctiveEffect {
    pub add: FixedBitSet,
    pub delete: FixedBitSet,
    pub numeric_effects: Vec<GroundNumericEffect>,
}

/// A grounded conditional effect: a flat condition plus a single fluent
/// add or delete. Universal effects are expanded into these at grounding
/// time.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundConditionalEffect {
    pub condition: GroundConjunctiveCondition,
    pub effect: GroundLiteral,
}

/// A memoised fully-grounded action: the schema and binding it came from
/// plus the flat precondition, flat effect, conditional effects and cost.
/// Hash-consed by (schema, binding): grounding the same pair twice returns
/// the same record and index.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundAction {
    pub index: usize,
    pub schema_index: usize,
    pub binding: Binding,
    pub condition: GroundConjunctiveCondition,
    pub effect: GroundConjunctiveEffect,
    pub conditional_effects: Vec<GroundConditionalEffect>,
    pub cost: OrderedFloat<f64>,
}

impl GroundAction {
    /// The action in plan notation, e.g. `pick(ball1, rooma, left)`.
    pub fn human_readable(&self, problem: &Problem) -> String {
        format!(
            "{}({})",
            problem.domain().action_schemas()[self.schema_index].name,
            self.binding
                .iter()
                .map(|&object| problem.object(object).name.as_str())
                .join(", ")
        )
    }
}

/// A memoised fully-grounded axiom: flat body condition plus the single
/// positive derived head atom.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundAxiom {
    pub index: usize,
    pub schema_index: usize,
    pub binding: Binding,
    pub condition: GroundConjunctiveCondition,
    pub head_atom_index: usize,
}
