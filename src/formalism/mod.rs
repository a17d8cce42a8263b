//! The interned entity model of a planning task: predicates, objects, terms,
//! atoms, numeric functions, conditions, effects, schemas, and the domain and
//! problem records that own them. Everything is identified by a dense index
//! within its kind; equality is index equality.

mod action;
mod atom;
mod axiom;
mod binding;
mod condition;
mod domain;
mod effect;
mod function;
mod negatable;
mod numeric;
mod object;
mod predicate;
mod problem;
mod repository;
mod term;
mod types;

pub use action::ActionSchema;
pub use atom::{Atom, GroundAtom, GroundLiteral, Literal};
pub use axiom::AxiomSchema;
pub use binding::{Binding, RawBinding, TYPICAL_NUM_PARAMETERS};
pub(crate) use binding::raw_binding;
pub use condition::{ConjunctiveCondition, Parameter};
pub use domain::{Domain, DomainBuilder};
pub use effect::{ConditionalEffect, ConjunctiveEffect, UniversalEffect};
pub use function::{
    evaluate_binary, evaluate_multi, BinaryOp, Function, FunctionCategory, FunctionExpression,
    FunctionSkeleton, GroundFunction, GroundFunctionExpression, MultiOp, NumericError,
};
pub use negatable::Negatable;
pub use numeric::{Comparator, NumericConstraint, NumericEffect, NumericEffectOp};
pub use object::{Object, ObjectDecl};
pub use predicate::{Predicate, PredicateCategory};
pub use problem::{Problem, ProblemBuilder, StructuralError};
pub use repository::{GroundAtomRepository, GroundFunctionRepository, Repositories};
pub use term::{Term, Variable};
pub use types::Type;
