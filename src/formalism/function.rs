use crate::formalism::{RawBinding, Term};
use strum_macros::Display;
use thiserror::Error;

/// Numeric functions come in two categories: static functions keep their
/// initial value for the whole run, fluent functions are the numeric
/// variables of the state. There are no derived functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FunctionCategory {
    Static,
    Fluent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSkeleton {
    pub name: String,
    /// Dense index within the skeleton's category.
    pub index: usize,
    pub category: FunctionCategory,
    pub parameter_types: Vec<usize>,
}

impl FunctionSkeleton {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        category: FunctionCategory,
        parameter_types: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            category,
            parameter_types,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

/// A possibly lifted function term: a function skeleton applied to terms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub category: FunctionCategory,
    pub skeleton_index: usize,
    pub terms: Vec<Term>,
}

impl Function {
    pub fn new(category: FunctionCategory, skeleton_index: usize, terms: Vec<Term>) -> Self {
        Self {
            category,
            skeleton_index,
            terms,
        }
    }

    pub fn substitute(&self, binding: &[usize]) -> RawBinding {
        self.terms.iter().map(|term| term.resolve(binding)).collect()
    }
}

/// A fully grounded function, interned in the problem repositories. Its
/// `index` is dense within the function's category; for fluent functions it
/// is the position in the numeric variable vector of the state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundFunction {
    pub category: FunctionCategory,
    pub skeleton_index: usize,
    pub index: usize,
    pub objects: RawBinding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MultiOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "*")]
    Mul,
}

/// Errors raised while evaluating numeric expressions. These are runtime
/// errors: the binding that triggered one is reported as invalid, the search
/// itself continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NumericError {
    #[error("reference to a numeric function without a defined value")]
    UndefinedFunction,
    #[error("division by zero in a numeric expression")]
    DivisionByZero,
}

/// An arithmetic expression tree over numeric functions and constants.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionExpression {
    Number(f64),
    BinaryOperation {
        op: BinaryOp,
        left: Box<FunctionExpression>,
        right: Box<FunctionExpression>,
    },
    MultiOperation {
        op: MultiOp,
        operands: Vec<FunctionExpression>,
    },
    Minus(Box<FunctionExpression>),
    Function(Function),
}

impl FunctionExpression {
    /// Collect the function references of the expression in depth-first
    /// order.
    pub fn collect_functions<'a>(&'a self, out: &mut Vec<&'a Function>) {
        match self {
            Self::Number(_) => {}
            Self::BinaryOperation { left, right, .. } => {
                left.collect_functions(out);
                right.collect_functions(out);
            }
            Self::MultiOperation { operands, .. } => {
                for operand in operands {
                    operand.collect_functions(out);
                }
            }
            Self::Minus(inner) => inner.collect_functions(out),
            Self::Function(function) => out.push(function),
        }
    }
}

/// The grounded form of a [`FunctionExpression`]: function references are
/// resolved to dense ground function indices. A reference that has no ground
/// record is kept as `None` and surfaces as [`NumericError::UndefinedFunction`]
/// on evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum GroundFunctionExpression {
    Number(f64),
    BinaryOperation {
        op: BinaryOp,
        left: Box<GroundFunctionExpression>,
        right: Box<GroundFunctionExpression>,
    },
    MultiOperation {
        op: MultiOp,
        operands: Vec<GroundFunctionExpression>,
    },
    Minus(Box<GroundFunctionExpression>),
    Function {
        category: FunctionCategory,
        index: Option<usize>,
    },
}

pub fn evaluate_binary(op: BinaryOp, left: f64, right: f64) -> Result<f64, NumericError> {
    match op {
        BinaryOp::Add => Ok(left + right),
        BinaryOp::Sub => Ok(left - right),
        BinaryOp::Mul => Ok(left * right),
        BinaryOp::Div => {
            if right == 0.0 {
                Err(NumericError::DivisionByZero)
            } else {
                Ok(left / right)
            }
        }
    }
}

pub fn evaluate_multi(op: MultiOp, left: f64, right: f64) -> f64 {
    match op {
        MultiOp::Add => left + right,
        MultiOp::Mul => left * right,
    }
}

impl GroundFunctionExpression {
    /// Evaluate against the static function values and the given fluent
    /// function values. A `NaN` slot means the function has no defined value.
    pub fn evaluate(
        &self,
        static_values: &[f64],
        fluent_values: &[f64],
    ) -> Result<f64, NumericError> {
        match self {
            Self::Number(number) => Ok(*number),
            Self::BinaryOperation { op, left, right } => evaluate_binary(
                *op,
                left.evaluate(static_values, fluent_values)?,
                right.evaluate(static_values, fluent_values)?,
            ),
            Self::MultiOperation { op, operands } => {
                debug_assert!(!operands.is_empty());
                let mut result = operands[0].evaluate(static_values, fluent_values)?;
                for operand in &operands[1..] {
                    result =
                        evaluate_multi(*op, result, operand.evaluate(static_values, fluent_values)?);
                }
                Ok(result)
            }
            Self::Minus(inner) => Ok(-inner.evaluate(static_values, fluent_values)?),
            Self::Function { category, index } => {
                let values = match category {
                    FunctionCategory::Static => static_values,
                    FunctionCategory::Fluent => fluent_values,
                };
                let value = index
                    .and_then(|index| values.get(index).copied())
                    .ok_or(NumericError::UndefinedFunction)?;
                if value.is_nan() {
                    return Err(NumericError::UndefinedFunction);
                }
                Ok(value)
            }
        }
    }
}
