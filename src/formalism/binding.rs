use std::{
    fmt::{Debug, Formatter},
    ops::Index,
};

use internment::Intern;
use smallvec::SmallVec;

pub const TYPICAL_NUM_PARAMETERS: usize = 5;

/// A [`RawBinding`] is a small vector of object indices, positionally mapping
/// the parameters of a schema or condition to objects. Use this type while
/// the binding is still being assembled, afterwards convert it to a
/// [`Binding`].
pub type RawBinding = SmallVec<[usize; TYPICAL_NUM_PARAMETERS]>;

/// A [`Binding`] is an interned [`RawBinding`]. Interning makes it cheap to
/// store and compare, which matters because bindings are the keys of the
/// grounding tables, but it can no longer be modified.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Binding {
    inner: Intern<RawBinding>,
}

impl Binding {
    pub fn new(inner: RawBinding) -> Self {
        Self {
            inner: Intern::new(inner),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &usize> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn raw(&self) -> &RawBinding {
        &self.inner
    }

    pub fn as_slice(&self) -> &[usize] {
        self.inner.as_slice()
    }
}

impl From<RawBinding> for Binding {
    fn from(inner: RawBinding) -> Self {
        Self::new(inner)
    }
}

impl From<&[usize]> for Binding {
    fn from(inner: &[usize]) -> Self {
        Self::new(inner.into())
    }
}

impl From<Vec<usize>> for Binding {
    fn from(inner: Vec<usize>) -> Self {
        Self::new(inner.into())
    }
}

impl Index<usize> for Binding {
    type Output = usize;

    fn index(&self, index: usize) -> &Self::Output {
        &self.inner[index]
    }
}

// This custom implementation hides the internment details from the user.
impl Debug for Binding {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self.inner)
    }
}

// based on [`smallvec::smallvec`]
macro_rules! raw_binding {
    // count helper: transform any expression into 1
    (@one $x:expr) => (1usize);
    ($elem:expr; $n:expr) => ({
        $crate::formalism::RawBinding::from_elem($elem, $n)
    });
    ($($x:expr),*$(,)*) => ({
        let count = 0usize $(+ $crate::formalism::raw_binding!(@one $x))*;
        #[allow(unused_mut)]
        let mut vec = $crate::formalism::RawBinding::new();
        if count <= vec.inline_size() {
            $(vec.push($x);)*
            vec
        } else {
            $crate::formalism::RawBinding::from_vec(smallvec::alloc::vec![$($x,)*])
        }
    });
}
pub(crate) use raw_binding;
