#![forbid(unsafe_code)]

//! An ordered set that announces its structural changes.
//!
//! [`ObservableOrderedSet`] is a cloneable handle (`Rc<RefCell<..>>`,
//! single-threaded shared ownership) around an [`OrderedSet`] plus a
//! subscriber registry. Every structural mutation emits exactly one
//! [`SetEvent`] per changed element, dispatched synchronously after the new
//! state is visible, in subscriber registration order.
//!
//! The reconcile family exists to keep that event stream minimal: instead of
//! clearing and rebuilding, the set is merged in place against a target
//! sequence so that only genuinely differing elements produce events. This
//! is what keeps downstream recomputation (and ultimately any view bound to
//! the set) from churning.
//!
//! # Invariants
//!
//! 1. Subscribers observe a state that already includes the change the
//!    event describes.
//! 2. While any [`SuspendGuard`] is live, no events are emitted; when the
//!    outermost guard drops, a single `Reset` is emitted unconditionally.
//! 3. Reconciliation emits one `Added`/`Removed` per element of the
//!    symmetric difference within the reconciled range, never a `Reset`.
//!
//! # Failure Modes
//!
//! - A subscriber that mutates the set it is being notified about can
//!   invalidate indices held by an in-progress bulk operation. Mutation is
//!   reserved for the owning code path; subscribers read.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use tracing::trace;

use crate::compare::{Comparator, Natural};
use crate::event::SetEvent;
use crate::notify::{DispatchGuard, Notifiable, Subscription};
use crate::ordered_set::{Bounds, OrderedSet, SetError};

/// Add/remove counts produced by one reconciliation pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub removed: usize,
}

impl ReconcileStats {
    /// Total number of change events the pass emitted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.removed
    }
}

struct Inner<T, C> {
    set: OrderedSet<T, C>,
    subscribers: Vec<(u64, Rc<dyn Fn(&SetEvent<T>)>)>,
    next_token: u64,
    suspend_depth: usize,
}

/// Cloneable handle to a shared, observable ordered set.
pub struct ObservableOrderedSet<T, C = Natural> {
    inner: Rc<RefCell<Inner<T, C>>>,
}

impl<T, C> Clone for ObservableOrderedSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for ObservableOrderedSet<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ObservableOrderedSet")
            .field("set", &inner.set)
            .field("subscribers", &inner.subscribers.len())
            .field("suspend_depth", &inner.suspend_depth)
            .finish()
    }
}

/// One step of a two-pointer merge against a target sequence.
enum MergeStep {
    /// Current set element is unwanted; remove it in place.
    RemoveCurrent,
    /// Target element is missing; insert it.
    InsertWanted,
    /// Both sides agree; advance past the match.
    AdvanceBoth,
    Done,
}

impl<T: Ord> ObservableOrderedSet<T, Natural> {
    /// An empty observable set under `T`'s natural ordering.
    #[must_use]
    pub fn natural() -> Self {
        Self::new(Natural)
    }

    /// An observable set seeded from `iter` under the natural ordering.
    pub fn natural_from_iter(iter: impl IntoIterator<Item = T>) -> Self {
        Self::from_iter_with(iter, Natural)
    }
}

impl<T, C: Comparator<T>> ObservableOrderedSet<T, C> {
    /// An empty observable set ordered by `comparator`.
    #[must_use]
    pub fn new(comparator: C) -> Self {
        Self::from_set(OrderedSet::new(comparator))
    }

    /// An observable set seeded from `iter` (duplicates dropped).
    ///
    /// Seeding emits no events; nothing can have subscribed yet.
    pub fn from_iter_with(iter: impl IntoIterator<Item = T>, comparator: C) -> Self {
        Self::from_set(OrderedSet::from_iter_with(iter, comparator))
    }

    /// Wrap an existing [`OrderedSet`].
    #[must_use]
    pub fn from_set(set: OrderedSet<T, C>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                set,
                subscribers: Vec::new(),
                next_token: 0,
                suspend_depth: 0,
            })),
        }
    }
}

// Read access and subscription need neither a comparator nor `T: Clone`.
impl<T, C> ObservableOrderedSet<T, C> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().set.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().set.is_empty()
    }

    /// Run `f` against the underlying set without cloning.
    ///
    /// # Panics
    ///
    /// Panics if `f` mutates this same set re-entrantly (`RefCell` borrow).
    pub fn with<R>(&self, f: impl FnOnce(&OrderedSet<T, C>) -> R) -> R {
        f(&self.inner.borrow().set)
    }

    /// Register a callback for structural change events.
    ///
    /// Callbacks run synchronously, in registration order. Drop the returned
    /// [`Subscription`] to unsubscribe.
    pub fn subscribe(&self, callback: impl Fn(&SetEvent<T>) + 'static) -> Subscription
    where
        T: 'static,
        C: 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let token = inner.next_token;
        inner.next_token += 1;
        inner.subscribers.push((token, Rc::new(callback)));

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(strong) = weak.upgrade() {
                strong.borrow_mut().subscribers.retain(|(t, _)| *t != token);
            }
        })
    }

    /// Suppress event emission until the returned guard (and any nested
    /// guards) drop, then emit one `Reset`.
    #[must_use]
    pub fn suspend(&self) -> SuspendGuard<T, C> {
        self.inner.borrow_mut().suspend_depth += 1;
        SuspendGuard { set: self.clone() }
    }

    fn emit(&self, event: &SetEvent<T>) {
        if self.inner.borrow().suspend_depth > 0 {
            return;
        }
        self.dispatch(event);
    }

    /// Dispatch regardless of suspension; used by the resume path.
    fn dispatch(&self, event: &SetEvent<T>) {
        let callbacks: Vec<Rc<dyn Fn(&SetEvent<T>)>> = {
            let inner = self.inner.borrow();
            inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect()
        };
        if callbacks.is_empty() {
            return;
        }
        let _depth = DispatchGuard::enter();
        for callback in callbacks {
            callback(event);
        }
    }
}

impl<T: Clone, C> ObservableOrderedSet<T, C> {
    /// Clone of the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.inner.borrow().set.get(index).cloned()
    }

    /// Clone of the smallest element.
    #[must_use]
    pub fn min(&self) -> Option<T> {
        self.inner.borrow().set.min().cloned()
    }

    /// Clone of the largest element.
    #[must_use]
    pub fn max(&self) -> Option<T> {
        self.inner.borrow().set.max().cloned()
    }

    /// The contents as a sorted `Vec`.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.borrow().set.as_slice().to_vec()
    }
}

impl<T: Clone + 'static, C: Comparator<T> + 'static> ObservableOrderedSet<T, C> {
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.inner.borrow().set.contains(item)
    }

    #[must_use]
    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.inner.borrow().set.index_of(item)
    }

    /// Insert `item`; emits `Added` and returns the index if it was new.
    pub fn insert(&self, item: T) -> Option<usize> {
        let for_event = item.clone();
        let inserted = { self.inner.borrow_mut().set.insert(item) };
        if let Some(index) = inserted {
            self.emit(&SetEvent::Added {
                item: for_event,
                index,
            });
        }
        inserted
    }

    /// Remove the item equal to `item`; emits `Removed` if it was present.
    pub fn remove(&self, item: &T) -> bool {
        let index = { self.inner.borrow().set.index_of(item) };
        match index {
            Some(index) => {
                self.remove_at(index);
                true
            }
            None => false,
        }
    }

    /// Remove and return the item at `index`, emitting `Removed`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_at(&self, index: usize) -> T {
        let item = { self.inner.borrow_mut().set.remove_at(index) };
        self.emit(&SetEvent::Removed {
            item: item.clone(),
            index,
        });
        item
    }

    /// Remove everything; emits one `Reset`.
    pub fn clear(&self) {
        self.inner.borrow_mut().set.clear();
        self.emit(&SetEvent::Reset);
    }

    /// Replace the contents wholesale with `iter`; emits one `Reset`.
    pub fn reset_contents(&self, iter: impl IntoIterator<Item = T>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.set.clear();
            inner.set.union_with(iter);
        }
        self.emit(&SetEvent::Reset);
    }

    /// Insert every element of `iter`, emitting `Added` per new element.
    pub fn union_with(&self, iter: impl IntoIterator<Item = T>) {
        for item in iter {
            self.insert(item);
        }
    }

    /// Remove every present element of `iter`, emitting `Removed` each.
    pub fn except_with<'a>(&self, iter: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for item in iter {
            self.remove(item);
        }
    }

    /// Keep only items satisfying `predicate`, emitting `Removed` per
    /// dropped item; returns how many were removed.
    pub fn retain(&self, mut predicate: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut index = 0;
        loop {
            let item = { self.inner.borrow().set.get(index).cloned() };
            match item {
                None => break,
                Some(item) if predicate(&item) => index += 1,
                Some(_) => {
                    self.remove_at(index);
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Remove every item inside the `(min, max)` interval selected by
    /// `bounds`, emitting `Removed` per item; returns how many were removed.
    pub fn remove_range(&self, min: &T, max: &T, bounds: Bounds) -> Result<usize, SetError> {
        let range = { self.inner.borrow().set.range_indices(min, max, bounds)? };
        let Some((left, right)) = range else {
            return Ok(0);
        };
        let count = right - left + 1;
        for _ in 0..count {
            self.remove_at(left);
        }
        Ok(count)
    }

    /// Merge `sorted_other` into the `[start, end]` window of this set.
    ///
    /// Afterwards, the window's contents match `sorted_other`'s elements
    /// (elements of `sorted_other` beyond `end` are inserted as well, per
    /// the trailing-insert rule); content outside the window is untouched
    /// except where `sorted_other` reaches past it. Emits one event per
    /// structurally differing element and nothing else.
    ///
    /// `sorted_other` must be ascending under this set's comparator; use
    /// [`reconcile_unsorted`](Self::reconcile_unsorted) otherwise.
    pub fn reconcile_sorted(
        &self,
        sorted_other: &[T],
        start: &T,
        end: &T,
    ) -> Result<ReconcileStats, SetError> {
        {
            let inner = self.inner.borrow();
            if inner.set.comparator().compare(start, end) == Ordering::Greater {
                return Err(SetError::InvertedRange);
            }
        }

        let mut stats = ReconcileStats::default();

        if sorted_other.is_empty() {
            stats.removed = self.remove_range(start, end, Bounds::ClosedClosed)?;
            return Ok(stats);
        }

        let start_index = {
            let inner = self.inner.borrow();
            if inner.set.is_empty() {
                None
            } else {
                Some(inner.set.left_closed(start))
            }
        };
        let Some(start_index) = start_index.filter(|&i| i < self.len()) else {
            // Nothing in range to merge against.
            stats.added = self.insert_all(sorted_other);
            return Ok(stats);
        };

        let mut this_i = start_index;
        let mut other_i = 0;

        loop {
            let step = {
                let inner = self.inner.borrow();
                let set = &inner.set;
                match set.get(this_i) {
                    None => MergeStep::Done,
                    Some(cur) if set.comparator().compare(cur, end) != Ordering::Less => {
                        MergeStep::Done
                    }
                    Some(cur) => match sorted_other.get(other_i) {
                        // Target exhausted: everything left in the window is
                        // unwanted.
                        None => MergeStep::RemoveCurrent,
                        Some(want) => match set.comparator().compare(cur, want) {
                            Ordering::Less => MergeStep::RemoveCurrent,
                            Ordering::Greater => MergeStep::InsertWanted,
                            Ordering::Equal => MergeStep::AdvanceBoth,
                        },
                    },
                }
            };
            match step {
                MergeStep::Done => break,
                MergeStep::RemoveCurrent => {
                    // The next element shifts into this slot; do not advance.
                    self.remove_at(this_i);
                    stats.removed += 1;
                }
                MergeStep::InsertWanted => {
                    if self.insert(sorted_other[other_i].clone()).is_some() {
                        // Insertion shifted everything at and after this_i.
                        this_i += 1;
                        stats.added += 1;
                    }
                    other_i += 1;
                }
                MergeStep::AdvanceBoth => {
                    this_i += 1;
                    other_i += 1;
                }
            }
        }

        // Elements of the target beyond `end` (or past the scanned window).
        stats.added += self.insert_all(&sorted_other[other_i..]);

        trace!(
            added = stats.added,
            removed = stats.removed,
            "reconciled sorted range"
        );
        Ok(stats)
    }

    /// [`reconcile_sorted`](Self::reconcile_sorted) bounded by the target's
    /// own first and last element. Empty input is a no-op.
    pub fn reconcile_sorted_full(&self, sorted_other: &[T]) -> ReconcileStats {
        match (sorted_other.first(), sorted_other.last()) {
            (Some(first), Some(last)) => self
                .reconcile_sorted(sorted_other, first, last)
                .unwrap_or_default(),
            _ => ReconcileStats::default(),
        }
    }

    /// Sort `items` under this set's comparator, then reconcile the
    /// `[start, end]` window against the result.
    pub fn reconcile_unsorted(
        &self,
        mut items: Vec<T>,
        start: &T,
        end: &T,
    ) -> Result<ReconcileStats, SetError> {
        self.sort_dedup(&mut items);
        self.reconcile_sorted(&items, start, end)
    }

    /// Make the set's entire contents equal `sorted_other`, emitting one
    /// event per element of the symmetric difference and nothing else.
    ///
    /// This is the full-range counterpart of
    /// [`reconcile_sorted`](Self::reconcile_sorted), used by derived
    /// collections: unlike clear-and-rebuild it leaves matching elements
    /// (and their indices' stability) alone.
    pub fn reconcile_all(&self, sorted_other: &[T]) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        let mut this_i = 0;
        let mut other_i = 0;

        loop {
            let step = {
                let inner = self.inner.borrow();
                let set = &inner.set;
                match (set.get(this_i), sorted_other.get(other_i)) {
                    (None, None) => MergeStep::Done,
                    (Some(_), None) => MergeStep::RemoveCurrent,
                    (None, Some(_)) => MergeStep::InsertWanted,
                    (Some(cur), Some(want)) => match set.comparator().compare(cur, want) {
                        Ordering::Less => MergeStep::RemoveCurrent,
                        Ordering::Greater => MergeStep::InsertWanted,
                        Ordering::Equal => MergeStep::AdvanceBoth,
                    },
                }
            };
            match step {
                MergeStep::Done => break,
                MergeStep::RemoveCurrent => {
                    self.remove_at(this_i);
                    stats.removed += 1;
                }
                MergeStep::InsertWanted => {
                    if self.insert(sorted_other[other_i].clone()).is_some() {
                        this_i += 1;
                        stats.added += 1;
                    }
                    other_i += 1;
                }
                MergeStep::AdvanceBoth => {
                    this_i += 1;
                    other_i += 1;
                }
            }
        }

        trace!(
            added = stats.added,
            removed = stats.removed,
            "reconciled full contents"
        );
        stats
    }

    /// Sort and dedupe `items` under this set's comparator, then
    /// [`reconcile_all`](Self::reconcile_all) against the result.
    pub fn reconcile_all_unsorted(&self, mut items: Vec<T>) -> ReconcileStats {
        self.sort_dedup(&mut items);
        self.reconcile_all(&items)
    }

    fn insert_all(&self, items: &[T]) -> usize {
        let mut added = 0;
        for item in items {
            if self.insert(item.clone()).is_some() {
                added += 1;
            }
        }
        added
    }

    fn sort_dedup(&self, items: &mut Vec<T>) {
        let inner = self.inner.borrow();
        let comparator = inner.set.comparator();
        items.sort_by(|a, b| comparator.compare(a, b));
        items.dedup_by(|a, b| comparator.compare(a, b) == Ordering::Equal);
    }
}

impl<T: 'static, C: 'static> Notifiable for ObservableOrderedSet<T, C> {
    fn subscribe_changed(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| callback())
    }
}

/// RAII scope during which the set emits no events.
///
/// When the outermost guard drops, one `Reset` is emitted unconditionally,
/// whether or not anything changed while suspended. Resumption happens on
/// every exit path, including unwinding.
pub struct SuspendGuard<T, C> {
    set: ObservableOrderedSet<T, C>,
}

impl<T, C> Drop for SuspendGuard<T, C> {
    fn drop(&mut self) {
        let resumed = {
            let mut inner = self.set.inner.borrow_mut();
            inner.suspend_depth -= 1;
            inner.suspend_depth == 0
        };
        if resumed {
            self.set.dispatch(&SetEvent::Reset);
        }
    }
}

impl<T, C> std::fmt::Debug for SuspendGuard<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspendGuard").finish_non_exhaustive()
    }
}
