#![forbid(unsafe_code)]

//! Comparator plumbing for the ordered collections.
//!
//! Every set in this crate carries its comparator explicitly; there is no
//! hidden global default. [`Natural`] is the zero-sized comparator for types
//! that are already [`Ord`], and any `Fn(&T, &T) -> Ordering` closure works
//! directly for custom orderings.

use std::cmp::Ordering;

/// Total order over `T`, threaded through set construction.
pub trait Comparator<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// The natural ordering of `T: Ord`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}
