use crate::formalism::{
    AxiomSchema, ConjunctiveCondition, Domain, FunctionCategory, FunctionSkeleton, GroundAtom,
    GroundLiteral, Literal, NumericConstraint, Object, Predicate, PredicateCategory, RawBinding,
    Repositories,
};
use fixedbitset::FixedBitSet;
use std::cell::RefCell;
use std::rc::Rc;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::info;

/// Load-time errors. Any of these makes the problem instance unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("negative literals in the initial state are not supported")]
    NegativeInitialLiteral,
    #[error("negative literals in axiom heads are not supported")]
    NegativeAxiomHead,
    #[error("the axiom set admits no stratification")]
    Unstratifiable,
}

/// A ground problem instance: the domain plus objects, initial state, goal
/// and problem-level axioms. Owns the interning repositories for ground atoms
/// and ground functions; these are append-only and single-writer, which is
/// why they sit behind a [`RefCell`] rather than a lock.
#[derive(Debug)]
pub struct Problem {
    name: String,
    domain: Rc<Domain>,
    /// Domain constants first, then the problem objects.
    objects: Vec<Object>,
    /// Object indices per type index, sorted. Supertype membership is
    /// already resolved.
    objects_per_type: Vec<Vec<usize>>,
    /// Domain-level derived predicates followed by problem-level ones.
    derived_predicates: Vec<Predicate>,
    /// Domain-level axioms followed by problem-level ones.
    axiom_schemas: Vec<AxiomSchema>,
    repositories: RefCell<Repositories>,
    fluent_initial_atoms: Vec<usize>,
    positive_static_atoms: FixedBitSet,
    /// Values of static ground functions, indexed by their dense index.
    /// `NaN` marks a function without a defined value.
    static_function_values: Vec<f64>,
    /// Initial values of fluent ground functions, the numeric part of the
    /// initial state.
    initial_numeric_values: Vec<f64>,
    goal: ConjunctiveCondition,
}

impl Problem {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> &Rc<Domain> {
        &self.domain
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    #[inline(always)]
    pub fn object(&self, index: usize) -> &Object {
        &self.objects[index]
    }

    pub fn num_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn objects_per_type(&self, type_index: usize) -> &[usize] {
        &self.objects_per_type[type_index]
    }

    /// Predicates of a category. For derived predicates this is the union of
    /// the domain-level and problem-level lists.
    pub fn predicates(&self, category: PredicateCategory) -> &[Predicate] {
        match category {
            PredicateCategory::Derived => &self.derived_predicates,
            _ => self.domain.predicates(category),
        }
    }

    pub fn functions(&self, category: FunctionCategory) -> &[FunctionSkeleton] {
        self.domain.functions(category)
    }

    /// Domain-level axioms followed by problem-level ones, the list the
    /// axiom evaluator stratifies.
    pub fn axiom_schemas(&self) -> &[AxiomSchema] {
        &self.axiom_schemas
    }

    /// Run a closure against the interning repositories. The borrow must not
    /// escape the closure, which keeps the single-writer discipline visible
    /// at the call sites.
    pub fn with_repositories<R>(&self, f: impl FnOnce(&Repositories) -> R) -> R {
        f(&self.repositories.borrow())
    }

    pub fn num_ground_atoms(&self, category: PredicateCategory) -> usize {
        self.repositories.borrow().atoms(category).len()
    }

    pub fn num_ground_functions(&self, category: FunctionCategory) -> usize {
        self.repositories.borrow().functions(category).len()
    }

    /// Intern a ground atom and return its dense index.
    pub fn ground_atom_index(
        &self,
        category: PredicateCategory,
        predicate_index: usize,
        objects: RawBinding,
    ) -> usize {
        self.repositories
            .borrow_mut()
            .atoms_mut(category)
            .get_or_intern(predicate_index, objects)
    }

    /// Look up a ground atom without interning it.
    pub fn find_ground_atom(
        &self,
        category: PredicateCategory,
        predicate_index: usize,
        objects: &[usize],
    ) -> Option<usize> {
        self.repositories
            .borrow()
            .atoms(category)
            .get(predicate_index, objects)
    }

    pub fn ground_atom(&self, category: PredicateCategory, index: usize) -> GroundAtom {
        self.repositories.borrow().atoms(category).atom(index).clone()
    }

    /// Substitute the binding into the literal and intern the resulting
    /// ground atom. Memoised through the atom repository: equal atoms share
    /// one record and one index.
    pub fn ground_literal(&self, literal: &Literal, binding: &[usize]) -> GroundLiteral {
        let objects = literal.underlying().substitute(binding);
        let index = self
            .repositories
            .borrow_mut()
            .atoms_mut(literal.category())
            .get_or_intern(literal.predicate_index(), objects);
        GroundLiteral::new(literal.is_negated(), index)
    }

    pub fn find_ground_function(
        &self,
        category: FunctionCategory,
        skeleton_index: usize,
        objects: &[usize],
    ) -> Option<usize> {
        self.repositories
            .borrow()
            .functions(category)
            .get(skeleton_index, objects)
    }

    /// The indices of the positive fluent atoms of the initial state.
    pub fn fluent_initial_atoms(&self) -> &[usize] {
        &self.fluent_initial_atoms
    }

    /// The positive static atoms of the initial state as a bitset. Static
    /// ground atoms interned after problem construction are never members.
    pub fn static_initial_positive_atoms(&self) -> &FixedBitSet {
        &self.positive_static_atoms
    }

    pub fn static_function_values(&self) -> &[f64] {
        &self.static_function_values
    }

    pub fn initial_numeric_values(&self) -> &[f64] {
        &self.initial_numeric_values
    }

    /// The goal as an arity-0 conjunctive condition.
    pub fn goal(&self) -> &ConjunctiveCondition {
        &self.goal
    }
}

/// Assembles a [`Problem`]: objects, initial state, goal, problem-level
/// axioms. `finish` performs the load-time structural checks and the eager
/// interning that gives initial atoms their dense indices.
#[derive(Debug)]
pub struct ProblemBuilder {
    name: String,
    domain: Rc<Domain>,
    objects: Vec<Object>,
    initial_literals: Vec<(bool, PredicateCategory, usize, RawBinding)>,
    static_function_values: Vec<(usize, RawBinding, f64)>,
    fluent_function_values: Vec<(usize, RawBinding, f64)>,
    goal_literals: Vec<Literal>,
    goal_numeric_constraints: Vec<NumericConstraint>,
    derived_predicates: Vec<Predicate>,
    axiom_schemas: Vec<AxiomSchema>,
}

impl ProblemBuilder {
    pub fn new(domain: Rc<Domain>, name: impl Into<String>) -> Self {
        let objects = domain
            .constants()
            .iter()
            .enumerate()
            .map(|(index, constant)| Object::new(index, constant.name.clone(), constant.types.clone()))
            .collect();
        Self {
            name: name.into(),
            domain,
            objects,
            initial_literals: Vec::new(),
            static_function_values: Vec::new(),
            fluent_function_values: Vec::new(),
            goal_literals: Vec::new(),
            goal_numeric_constraints: Vec::new(),
            derived_predicates: Vec::new(),
            axiom_schemas: Vec::new(),
        }
    }

    pub fn add_object(&mut self, name: impl Into<String>, types: Vec<usize>) -> usize {
        let index = self.objects.len();
        self.objects.push(Object::new(index, name, types));
        index
    }

    /// Add a positive initial atom. Derived atoms are computed by the axiom
    /// evaluator and cannot be part of the initial state.
    pub fn add_initial_atom(
        &mut self,
        category: PredicateCategory,
        predicate_index: usize,
        objects: RawBinding,
    ) {
        assert_ne!(category, PredicateCategory::Derived);
        self.initial_literals
            .push((false, category, predicate_index, objects));
    }

    /// Add an initial literal with explicit polarity. Negative literals are
    /// rejected by `finish`; the closed-world initial state is the set of
    /// positive literals.
    pub fn add_initial_literal(
        &mut self,
        negated: bool,
        category: PredicateCategory,
        predicate_index: usize,
        objects: RawBinding,
    ) {
        assert_ne!(category, PredicateCategory::Derived);
        self.initial_literals
            .push((negated, category, predicate_index, objects));
    }

    pub fn set_static_function_value(
        &mut self,
        skeleton_index: usize,
        objects: RawBinding,
        value: f64,
    ) {
        self.static_function_values
            .push((skeleton_index, objects, value));
    }

    pub fn set_fluent_function_value(
        &mut self,
        skeleton_index: usize,
        objects: RawBinding,
        value: f64,
    ) {
        self.fluent_function_values
            .push((skeleton_index, objects, value));
    }

    /// Set the goal. Goal literals are ground: their terms are objects.
    pub fn set_goal(
        &mut self,
        literals: Vec<Literal>,
        numeric_constraints: Vec<NumericConstraint>,
    ) {
        debug_assert!(literals
            .iter()
            .all(|literal| literal.terms().iter().all(|term| term.is_object())));
        self.goal_literals = literals;
        self.goal_numeric_constraints = numeric_constraints;
    }

    /// Add a problem-level derived predicate. Its index continues the
    /// domain's derived predicate numbering.
    pub fn add_derived_predicate(
        &mut self,
        name: impl Into<String>,
        parameter_types: &[usize],
    ) -> usize {
        let index =
            self.domain.predicates(PredicateCategory::Derived).len() + self.derived_predicates.len();
        self.derived_predicates.push(Predicate::new(
            index,
            name,
            PredicateCategory::Derived,
            parameter_types.to_vec(),
        ));
        index
    }

    /// Add a problem-level axiom. Its index continues the domain's axiom
    /// numbering; the evaluator stratifies domain and problem axioms as one
    /// set.
    pub fn add_axiom_schema(&mut self, body: ConjunctiveCondition, head: Literal) -> usize {
        let index = self.domain.axiom_schemas().len() + self.axiom_schemas.len();
        self.axiom_schemas.push(AxiomSchema::new(index, body, head));
        index
    }

    pub fn finish(self) -> Result<Problem, StructuralError> {
        if self.initial_literals.iter().any(|(negated, ..)| *negated) {
            return Err(StructuralError::NegativeInitialLiteral);
        }

        let objects_per_type = compute_objects_per_type(&self.domain, &self.objects);

        let mut derived_predicates = self.domain.predicates(PredicateCategory::Derived).to_vec();
        derived_predicates.extend(self.derived_predicates);

        let mut axiom_schemas = self.domain.axiom_schemas().to_vec();
        axiom_schemas.extend(self.axiom_schemas);

        let mut repositories = Repositories::new();

        let mut fluent_initial_atoms = Vec::new();
        let mut static_initial_atoms = Vec::new();
        for (_, category, predicate_index, objects) in self.initial_literals {
            let index = repositories
                .atoms_mut(category)
                .get_or_intern(predicate_index, objects);
            match category {
                PredicateCategory::Static => static_initial_atoms.push(index),
                PredicateCategory::Fluent => fluent_initial_atoms.push(index),
                PredicateCategory::Derived => unreachable!(),
            }
        }

        // Arity-0 atoms get their indices up front so that nullary condition
        // checks are pure lookups.
        for category in PredicateCategory::iter() {
            let predicates: &[Predicate] = match category {
                PredicateCategory::Derived => &derived_predicates,
                _ => self.domain.predicates(category),
            };
            for predicate in predicates {
                if predicate.is_nullary() {
                    repositories
                        .atoms_mut(category)
                        .get_or_intern(predicate.index, RawBinding::new());
                }
            }
        }

        let mut positive_static_atoms =
            FixedBitSet::with_capacity(repositories.static_atoms.len());
        for index in static_initial_atoms {
            positive_static_atoms.insert(index);
        }

        let static_function_values = intern_function_values(
            repositories.functions_mut(FunctionCategory::Static),
            self.static_function_values,
        );
        let initial_numeric_values = intern_function_values(
            repositories.functions_mut(FunctionCategory::Fluent),
            self.fluent_function_values,
        );

        let goal = ConjunctiveCondition::new(
            Vec::new(),
            self.goal_literals,
            self.goal_numeric_constraints,
        );

        info!(
            "Built problem {} with {} objects, {} initial fluent atoms, {} axioms",
            self.name,
            self.objects.len(),
            fluent_initial_atoms.len(),
            axiom_schemas.len()
        );

        Ok(Problem {
            name: self.name,
            domain: self.domain,
            objects: self.objects,
            objects_per_type,
            derived_predicates,
            axiom_schemas,
            repositories: RefCell::new(repositories),
            fluent_initial_atoms,
            positive_static_atoms,
            static_function_values,
            initial_numeric_values,
            goal,
        })
    }
}

fn intern_function_values(
    repository: &mut crate::formalism::GroundFunctionRepository,
    values: Vec<(usize, RawBinding, f64)>,
) -> Vec<f64> {
    let mut interned = Vec::new();
    for (skeleton_index, objects, value) in values {
        let index = repository.get_or_intern(skeleton_index, objects);
        if interned.len() <= index {
            interned.resize(index + 1, f64::NAN);
        }
        interned[index] = value;
    }
    interned
}

fn compute_objects_per_type(domain: &Domain, objects: &[Object]) -> Vec<Vec<usize>> {
    let types = domain.types();
    let mut objects_per_type = vec![Vec::new(); types.len()];

    for object in objects {
        for &type_index in &object.types {
            let mut current = type_index;
            loop {
                if !objects_per_type[current].contains(&object.index) {
                    objects_per_type[current].push(object.index);
                }
                match types[current].parent {
                    Some(parent) if parent != current => current = parent,
                    _ => break,
                }
            }
        }
    }

    for members in &mut objects_per_type {
        members.sort_unstable();
    }

    objects_per_type
}
