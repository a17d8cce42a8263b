use crate::formalism::{Function, FunctionExpression};
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Comparator {
    #[strum(serialize = "=")]
    Equal,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
}

impl Comparator {
    #[inline(always)]
    pub fn compare(&self, left: f64, right: f64) -> bool {
        match self {
            Self::Equal => left == right,
            Self::Less => left < right,
            Self::LessEqual => left <= right,
            Self::Greater => left > right,
            Self::GreaterEqual => left >= right,
        }
    }
}

/// A comparison between two arithmetic expressions, used as a conjunct of a
/// condition. Grounded by substituting the binding into both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericConstraint {
    pub comparator: Comparator,
    pub left: FunctionExpression,
    pub right: FunctionExpression,
}

impl NumericConstraint {
    pub fn new(
        comparator: Comparator,
        left: FunctionExpression,
        right: FunctionExpression,
    ) -> Self {
        Self {
            comparator,
            left,
            right,
        }
    }

    pub fn collect_functions<'a>(&'a self, out: &mut Vec<&'a Function>) {
        self.left.collect_functions(out);
        self.right.collect_functions(out);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum NumericEffectOp {
    Assign,
    Increase,
    Decrease,
    ScaleUp,
    ScaleDown,
}

impl NumericEffectOp {
    /// Combine the previous value of the target with the evaluated operand.
    /// `Assign` ignores the previous value, so it is also the only op that is
    /// well-defined on a previously undefined target.
    pub fn apply(&self, previous: f64, operand: f64) -> f64 {
        match self {
            Self::Assign => operand,
            Self::Increase => previous + operand,
            Self::Decrease => previous - operand,
            Self::ScaleUp => previous * operand,
            Self::ScaleDown => previous / operand,
        }
    }
}

/// An update to a fluent numeric function, applied in declaration order when
/// the owning action's effects fire.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericEffect {
    pub op: NumericEffectOp,
    pub function: Function,
    pub expression: FunctionExpression,
}

impl NumericEffect {
    pub fn new(op: NumericEffectOp, function: Function, expression: FunctionExpression) -> Self {
        Self {
            op,
            function,
            expression,
        }
    }
}
