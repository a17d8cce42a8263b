use crate::formalism::{
    Binding, FunctionCategory, GroundAtom, GroundFunction, PredicateCategory, RawBinding,
};
use std::collections::HashMap;

/// Append-only interning repository for ground atoms of one predicate
/// category. Indices are dense and never change; two structurally equal
/// atoms always share one record.
#[derive(Debug)]
pub struct GroundAtomRepository {
    category: PredicateCategory,
    index_by_key: HashMap<(usize, Binding), usize>,
    atoms: Vec<GroundAtom>,
}

impl GroundAtomRepository {
    pub fn new(category: PredicateCategory) -> Self {
        Self {
            category,
            index_by_key: HashMap::new(),
            atoms: Vec::new(),
        }
    }

    pub fn get_or_intern(&mut self, predicate_index: usize, objects: RawBinding) -> usize {
        let key = (predicate_index, Binding::new(objects.clone()));
        if let Some(&index) = self.index_by_key.get(&key) {
            return index;
        }
        let index = self.atoms.len();
        self.atoms.push(GroundAtom {
            category: self.category,
            predicate_index,
            index,
            objects,
        });
        self.index_by_key.insert(key, index);
        index
    }

    /// Pure lookup, does not intern.
    pub fn get(&self, predicate_index: usize, objects: &[usize]) -> Option<usize> {
        self.index_by_key
            .get(&(predicate_index, Binding::from(objects)))
            .copied()
    }

    #[inline(always)]
    pub fn atom(&self, index: usize) -> &GroundAtom {
        &self.atoms[index]
    }

    pub fn atoms(&self) -> &[GroundAtom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Append-only interning repository for ground functions of one category.
#[derive(Debug)]
pub struct GroundFunctionRepository {
    category: FunctionCategory,
    index_by_key: HashMap<(usize, Binding), usize>,
    functions: Vec<GroundFunction>,
}

impl GroundFunctionRepository {
    pub fn new(category: FunctionCategory) -> Self {
        Self {
            category,
            index_by_key: HashMap::new(),
            functions: Vec::new(),
        }
    }

    pub fn get_or_intern(&mut self, skeleton_index: usize, objects: RawBinding) -> usize {
        let key = (skeleton_index, Binding::new(objects.clone()));
        if let Some(&index) = self.index_by_key.get(&key) {
            return index;
        }
        let index = self.functions.len();
        self.functions.push(GroundFunction {
            category: self.category,
            skeleton_index,
            index,
            objects,
        });
        self.index_by_key.insert(key, index);
        index
    }

    /// Pure lookup, does not intern.
    pub fn get(&self, skeleton_index: usize, objects: &[usize]) -> Option<usize> {
        self.index_by_key
            .get(&(skeleton_index, Binding::from(objects)))
            .copied()
    }

    #[inline(always)]
    pub fn function(&self, index: usize) -> &GroundFunction {
        &self.functions[index]
    }

    pub fn functions(&self) -> &[GroundFunction] {
        &self.functions
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// The interning repositories of a problem, one per category of ground atom
/// and ground function. Created once per problem; append-only for the run.
#[derive(Debug)]
pub struct Repositories {
    pub static_atoms: GroundAtomRepository,
    pub fluent_atoms: GroundAtomRepository,
    pub derived_atoms: GroundAtomRepository,
    pub static_functions: GroundFunctionRepository,
    pub fluent_functions: GroundFunctionRepository,
}

impl Repositories {
    pub fn new() -> Self {
        Self {
            static_atoms: GroundAtomRepository::new(PredicateCategory::Static),
            fluent_atoms: GroundAtomRepository::new(PredicateCategory::Fluent),
            derived_atoms: GroundAtomRepository::new(PredicateCategory::Derived),
            static_functions: GroundFunctionRepository::new(FunctionCategory::Static),
            fluent_functions: GroundFunctionRepository::new(FunctionCategory::Fluent),
        }
    }

    pub fn atoms(&self, category: PredicateCategory) -> &GroundAtomRepository {
        match category {
            PredicateCategory::Static => &self.static_atoms,
            PredicateCategory::Fluent => &self.fluent_atoms,
            PredicateCategory::Derived => &self.derived_atoms,
        }
    }

    pub fn atoms_mut(&mut self, category: PredicateCategory) -> &mut GroundAtomRepository {
        match category {
            PredicateCategory::Static => &mut self.static_atoms,
            PredicateCategory::Fluent => &mut self.fluent_atoms,
            PredicateCategory::Derived => &mut self.derived_atoms,
        }
    }

    pub fn functions(&self, category: FunctionCategory) -> &GroundFunctionRepository {
        match category {
            FunctionCategory::Static => &self.static_functions,
            FunctionCategory::Fluent => &self.fluent_functions,
        }
    }

    pub fn functions_mut(&mut self, category: FunctionCategory) -> &mut GroundFunctionRepository {
        match category {
            FunctionCategory::Static => &mut self.static_functions,
            FunctionCategory::Fluent => &mut self.fluent_functions,
        }
    }
}

impl Default for Repositories {
    fn default() -> Self {
        Self::new()
    }
}
