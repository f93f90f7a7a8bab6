#![forbid(unsafe_code)]

//! A dense ordered set over an explicit comparator.
//!
//! Backing storage is a `Vec<T>` kept strictly increasing under the
//! comparator, favoring fast in-order iteration over fast mutation: lookups
//! are one binary search, inserts and removals pay the `Vec` shift.
//!
//! # Invariants
//!
//! 1. For every adjacent pair, `compare(items[i], items[i + 1]) == Less`;
//!    in particular there are no duplicate keys.
//! 2. Inserting an existing key is a no-op, not an error.
//! 3. The comparator is fixed at construction and never changes.
//!
//! # Failure Modes
//!
//! - An inverted range (`min > max`) passed to [`OrderedSet::remove_range`]
//!   returns [`SetError::InvertedRange`].
//! - The reserved set-algebra operations return [`SetError::Unsupported`]
//!   deterministically; their semantics are intentionally unassigned.

use std::cmp::Ordering;

use thiserror::Error;

use crate::compare::{Comparator, Natural};

/// Errors raised by ordered-set operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetError {
    /// A range operation was given `min > max`.
    #[error("inverted range: min must not exceed max")]
    InvertedRange,

    /// A reserved set-algebra operation with no assigned semantics.
    #[error("set operation not implemented: {0}")]
    Unsupported(&'static str),
}

/// Endpoint inclusivity for range removal.
///
/// `Open` excludes the endpoint, `Closed` includes it; the first word is the
/// lower endpoint. `ClosedClosed` over `(min, max)` removes
/// `{x : min <= x <= max}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bounds {
    OpenOpen,
    OpenClosed,
    ClosedOpen,
    ClosedClosed,
}

impl Bounds {
    #[inline]
    #[must_use]
    pub fn lower_closed(self) -> bool {
        matches!(self, Bounds::ClosedOpen | Bounds::ClosedClosed)
    }

    #[inline]
    #[must_use]
    pub fn upper_closed(self) -> bool {
        matches!(self, Bounds::OpenClosed | Bounds::ClosedClosed)
    }
}

/// A sorted, duplicate-free sequence of `T` under comparator `C`.
pub struct OrderedSet<T, C = Natural> {
    items: Vec<T>,
    comparator: C,
}

impl<T: Clone, C: Clone> Clone for OrderedSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for OrderedSet<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(&self.items).finish()
    }
}

impl<T: Ord> OrderedSet<T, Natural> {
    /// An empty set ordered by `T`'s natural ordering.
    #[must_use]
    pub fn natural() -> Self {
        Self::new(Natural)
    }

    /// A set built from `iter` under the natural ordering; duplicates are
    /// dropped.
    pub fn natural_from_iter(iter: impl IntoIterator<Item = T>) -> Self {
        Self::from_iter_with(iter, Natural)
    }
}

impl<T: Ord> FromIterator<T> for OrderedSet<T, Natural> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::natural_from_iter(iter)
    }
}

// Read access needs no comparator bound; generic wrappers over an
// arbitrary `C` rely on that.
impl<T, C> OrderedSet<T, C> {
    /// The comparator this set orders by.
    #[inline]
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items in ascending order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Smallest element, or `None` if the set is empty.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.items.first()
    }

    /// Largest element, or `None` if the set is empty.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.items.last()
    }
}

impl<T, C: Comparator<T>> OrderedSet<T, C> {
    /// An empty set ordered by `comparator`.
    #[must_use]
    pub fn new(comparator: C) -> Self {
        Self {
            items: Vec::new(),
            comparator,
        }
    }

    /// An empty set with room for `capacity` items.
    #[must_use]
    pub fn with_capacity(capacity: usize, comparator: C) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            comparator,
        }
    }

    /// Build a set by inserting every element of `iter` in turn.
    ///
    /// Duplicates under the comparator are dropped (set semantics).
    pub fn from_iter_with(iter: impl IntoIterator<Item = T>, comparator: C) -> Self {
        let mut set = Self::new(comparator);
        set.union_with(iter);
        set
    }

    fn search(&self, item: &T) -> Result<usize, usize> {
        self.items
            .binary_search_by(|probe| self.comparator.compare(probe, item))
    }

    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.search(item).is_ok()
    }

    /// Index of `item`, or `None` if absent.
    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.search(item).ok()
    }

    /// Insert `item` at its sorted position.
    ///
    /// Returns the insertion index, or `None` if an equal item was already
    /// present (the set is unchanged).
    pub fn insert(&mut self, item: T) -> Option<usize> {
        match self.search(&item) {
            Ok(_) => None,
            Err(index) => {
                self.items.insert(index, item);
                Some(index)
            }
        }
    }

    /// Remove the item equal to `item`, if present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.search(item) {
            Ok(index) => {
                self.items.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    /// Remove and return the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_at(&mut self, index: usize) -> T {
        self.items.remove(index)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Insert every element of `iter` (duplicates dropped).
    pub fn union_with(&mut self, iter: impl IntoIterator<Item = T>) {
        for item in iter {
            self.insert(item);
        }
    }

    /// Remove every element of `iter` that is present.
    pub fn except_with<'a>(&mut self, iter: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for item in iter {
            self.remove(item);
        }
    }

    /// Keep only items satisfying `predicate`; returns how many were removed.
    pub fn retain(&mut self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(|item| predicate(item));
        before - self.items.len()
    }

    /// Leftmost index whose item is `>= value`; `len()` if none is.
    #[must_use]
    pub fn left_closed(&self, value: &T) -> usize {
        match self.search(value) {
            Ok(index) => index,
            Err(insertion) => insertion,
        }
    }

    /// Leftmost index whose item is `> value`; `len()` if none is.
    #[must_use]
    pub fn left_open(&self, value: &T) -> usize {
        match self.search(value) {
            Ok(index) => index + 1,
            Err(insertion) => insertion,
        }
    }

    /// Rightmost index whose item is `<= value`; `None` if none is.
    #[must_use]
    pub fn right_closed(&self, value: &T) -> Option<usize> {
        match self.search(value) {
            Ok(index) => Some(index),
            Err(insertion) => insertion.checked_sub(1),
        }
    }

    /// Rightmost index whose item is `< value`; `None` if none is.
    #[must_use]
    pub fn right_open(&self, value: &T) -> Option<usize> {
        match self.search(value) {
            Ok(index) => index.checked_sub(1),
            Err(insertion) => insertion.checked_sub(1),
        }
    }

    /// Index range `[left, right]` selected by `(min, max, bounds)`, or
    /// `None` when the range selects nothing.
    pub(crate) fn range_indices(
        &self,
        min: &T,
        max: &T,
        bounds: Bounds,
    ) -> Result<Option<(usize, usize)>, SetError> {
        if self.comparator.compare(min, max) == Ordering::Greater {
            return Err(SetError::InvertedRange);
        }
        let left = if bounds.lower_closed() {
            self.left_closed(min)
        } else {
            self.left_open(min)
        };
        let right = if bounds.upper_closed() {
            self.right_closed(max)
        } else {
            self.right_open(max)
        };
        Ok(match right {
            Some(right) if left <= right => Some((left, right)),
            _ => None,
        })
    }

    /// Remove every item inside the `(min, max)` interval selected by
    /// `bounds`; returns how many were removed.
    ///
    /// `min > max` is an [`SetError::InvertedRange`] error. An interval that
    /// selects nothing removes nothing and returns `Ok(0)`.
    pub fn remove_range(&mut self, min: &T, max: &T, bounds: Bounds) -> Result<usize, SetError> {
        match self.range_indices(min, max, bounds)? {
            Some((left, right)) => {
                self.items.drain(left..=right);
                Ok(right - left + 1)
            }
            None => Ok(0),
        }
    }
}

/// Reserved set-algebra surface.
///
/// These operations exist so callers get a deterministic "no assigned
/// semantics" failure instead of silently wrong results; none of them
/// inspects its arguments.
impl<T, C: Comparator<T>> OrderedSet<T, C> {
    pub fn intersect_with(&mut self, _other: &[T]) -> Result<(), SetError> {
        Err(SetError::Unsupported("intersect_with"))
    }

    pub fn symmetric_except_with(&mut self, _other: &[T]) -> Result<(), SetError> {
        Err(SetError::Unsupported("symmetric_except_with"))
    }

    pub fn is_subset_of(&self, _other: &[T]) -> Result<bool, SetError> {
        Err(SetError::Unsupported("is_subset_of"))
    }

    pub fn is_superset_of(&self, _other: &[T]) -> Result<bool, SetError> {
        Err(SetError::Unsupported("is_superset_of"))
    }

    pub fn is_proper_subset_of(&self, _other: &[T]) -> Result<bool, SetError> {
        Err(SetError::Unsupported("is_proper_subset_of"))
    }

    pub fn is_proper_superset_of(&self, _other: &[T]) -> Result<bool, SetError> {
        Err(SetError::Unsupported("is_proper_superset_of"))
    }

    pub fn overlaps(&self, _other: &[T]) -> Result<bool, SetError> {
        Err(SetError::Unsupported("overlaps"))
    }

    pub fn set_equals(&self, _other: &[T]) -> Result<bool, SetError> {
        Err(SetError::Unsupported("set_equals"))
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedSet<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
