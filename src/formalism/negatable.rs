/// Wrapper around a type to indicate that it can be negated. The types that
/// are wrapped inside a [`Negatable`] in this crate are [`crate::formalism::Atom`]
/// and [`crate::formalism::GroundAtom`]. When wrapping a type `T` it is often
/// useful to implement some wrapper functions for [`Negatable<T>`] as well,
/// see [`crate::formalism::Atom`] for an example.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Negatable<T> {
    Positive(T),
    Negative(T),
}

impl<T> Negatable<T> {
    pub fn new(negated: bool, value: T) -> Self {
        if negated {
            Self::Negative(value)
        } else {
            Self::Positive(value)
        }
    }

    #[inline(always)]
    pub fn is_negated(&self) -> bool {
        match self {
            Self::Positive(_) => false,
            Self::Negative(_) => true,
        }
    }

    #[inline(always)]
    pub fn underlying(&self) -> &T {
        match self {
            Self::Positive(value) => value,
            Self::Negative(value) => value,
        }
    }
}

impl<T> From<T> for Negatable<T> {
    fn from(value: T) -> Self {
        Self::Positive(value)
    }
}
