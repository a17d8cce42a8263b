use crate::formalism::{
    ActionSchema, AxiomSchema, ConditionalEffect, ConjunctiveCondition, ConjunctiveEffect,
    FunctionCategory, FunctionExpression, FunctionSkeleton, Literal, ObjectDecl, Predicate,
    PredicateCategory, Type, UniversalEffect,
};

/// The lifted theory shared by all problems of a planning domain: the type
/// hierarchy, the predicates split by category, the function skeletons, the
/// domain constants and the action and axiom schemas.
///
/// Domain constants occupy object indices `0..constants.len()`; the objects
/// of a problem continue the numbering. This lets schemas mention constants
/// by index before any problem exists.
#[derive(Debug)]
pub struct Domain {
    name: String,
    types: Vec<Type>,
    static_predicates: Vec<Predicate>,
    fluent_predicates: Vec<Predicate>,
    derived_predicates: Vec<Predicate>,
    static_functions: Vec<FunctionSkeleton>,
    fluent_functions: Vec<FunctionSkeleton>,
    constants: Vec<ObjectDecl>,
    action_schemas: Vec<ActionSchema>,
    axiom_schemas: Vec<AxiomSchema>,
}

impl Domain {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn types(&self) -> &[Type] {
        &self.types
    }

    pub fn predicates(&self, category: PredicateCategory) -> &[Predicate] {
        match category {
            PredicateCategory::Static => &self.static_predicates,
            PredicateCategory::Fluent => &self.fluent_predicates,
            PredicateCategory::Derived => &self.derived_predicates,
        }
    }

    pub fn functions(&self, category: FunctionCategory) -> &[FunctionSkeleton] {
        match category {
            FunctionCategory::Static => &self.static_functions,
            FunctionCategory::Fluent => &self.fluent_functions,
        }
    }

    pub fn constants(&self) -> &[ObjectDecl] {
        &self.constants
    }

    pub fn action_schemas(&self) -> &[ActionSchema] {
        &self.action_schemas
    }

    pub fn axiom_schemas(&self) -> &[AxiomSchema] {
        &self.axiom_schemas
    }
}

/// Assigns dense indices while the domain is assembled. The index returned
/// by each `add_*` call is the one the finished entity carries.
#[derive(Debug)]
pub struct DomainBuilder {
    name: String,
    types: Vec<Type>,
    static_predicates: Vec<Predicate>,
    fluent_predicates: Vec<Predicate>,
    derived_predicates: Vec<Predicate>,
    static_functions: Vec<FunctionSkeleton>,
    fluent_functions: Vec<FunctionSkeleton>,
    constants: Vec<ObjectDecl>,
    action_schemas: Vec<ActionSchema>,
    axiom_schemas: Vec<AxiomSchema>,
}

impl DomainBuilder {
    /// Start a domain. The root type `object` is created with index 0.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: vec![Type::new(0, "object", None)],
            static_predicates: Vec::new(),
            fluent_predicates: Vec::new(),
            derived_predicates: Vec::new(),
            static_functions: Vec::new(),
            fluent_functions: Vec::new(),
            constants: Vec::new(),
            action_schemas: Vec::new(),
            axiom_schemas: Vec::new(),
        }
    }

    /// The index of the root type `object`.
    pub fn object_type(&self) -> usize {
        0
    }

    pub fn add_type(&mut self, name: impl Into<String>, parent: Option<usize>) -> usize {
        let index = self.types.len();
        self.types.push(Type::new(index, name, parent));
        index
    }

    pub fn add_predicate(
        &mut self,
        category: PredicateCategory,
        name: impl Into<String>,
        parameter_types: &[usize],
    ) -> usize {
        let list = match category {
            PredicateCategory::Static => &mut self.static_predicates,
            PredicateCategory::Fluent => &mut self.fluent_predicates,
            PredicateCategory::Derived => &mut self.derived_predicates,
        };
        let index = list.len();
        list.push(Predicate::new(index, name, category, parameter_types.to_vec()));
        index
    }

    pub fn add_function(
        &mut self,
        category: FunctionCategory,
        name: impl Into<String>,
        parameter_types: &[usize],
    ) -> usize {
        let list = match category {
            FunctionCategory::Static => &mut self.static_functions,
            FunctionCategory::Fluent => &mut self.fluent_functions,
        };
        let index = list.len();
        list.push(FunctionSkeleton::new(
            index,
            name,
            category,
            parameter_types.to_vec(),
        ));
        index
    }

    /// Domain constants come before problem objects in the object index
    /// space, so the returned index is final.
    pub fn add_constant(&mut self, name: impl Into<String>, types: Vec<usize>) -> usize {
        let index = self.constants.len();
        self.constants.push(ObjectDecl::new(name, types));
        index
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_action_schema(
        &mut self,
        name: impl Into<String>,
        precondition: ConjunctiveCondition,
        effect: ConjunctiveEffect,
        conditional_effects: Vec<ConditionalEffect>,
        universal_effects: Vec<UniversalEffect>,
        cost: FunctionExpression,
    ) -> usize {
        let index = self.action_schemas.len();
        self.action_schemas.push(ActionSchema::new(
            index,
            name,
            precondition,
            effect,
            conditional_effects,
            universal_effects,
            cost,
        ));
        index
    }

    pub fn add_axiom_schema(&mut self, body: ConjunctiveCondition, head: Literal) -> usize {
        let index = self.axiom_schemas.len();
        self.axiom_schemas.push(AxiomSchema::new(index, body, head));
        index
    }

    pub fn finish(self) -> Domain {
        Domain {
            name: self.name,
            types: self.types,
            static_predicates: self.static_predicates,
            fluent_predicates: self.fluent_predicates,
            derived_predicates: self.derived_predicates,
            static_functions: self.static_functions,
            fluent_functions: self.fluent_functions,
            constants: self.constants,
            action_schemas: self.action_schemas,
            axiom_schemas: self.axiom_schemas,
        }
    }
}
