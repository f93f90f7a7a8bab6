#![forbid(unsafe_code)]

//! Derived collections: observable sets kept equal to a function of other
//! observables.
//!
//! Every variant recomputes its full result sequence and then *reconciles*
//! it into the target with
//! [`reconcile_all_unsorted`](ObservableOrderedSet::reconcile_all_unsorted):
//! elements already present stay put and only genuine differences produce
//! events. A recompute whose result matches the target emits nothing.

use std::rc::Rc;

use ripple_collections::compare::Comparator;
use ripple_collections::notify::Notifiable;
use ripple_collections::observable_set::ObservableOrderedSet;
use ripple_collections::ordered_set::OrderedSet;

use crate::derived::Derived;

/// Keeps a target observable set equal to the sequence `function` returns.
#[derive(Debug)]
pub struct DerivedCollection {
    node: Derived,
}

impl DerivedCollection {
    /// Derive `target` from `function`, recomputing whenever any of
    /// `dependencies` changes.
    ///
    /// `function` may return its items in any order and with duplicates;
    /// they are sorted and deduped under the target's comparator before
    /// reconciliation.
    pub fn new<T, C, F>(
        target: ObservableOrderedSet<T, C>,
        function: F,
        dependencies: &[&dyn Notifiable],
    ) -> Self
    where
        T: Clone + 'static,
        C: Comparator<T> + 'static,
        F: Fn() -> Vec<T> + 'static,
    {
        let recompute: Rc<dyn Fn()> = Rc::new(move || {
            target.reconcile_all_unsorted(function());
        });
        Self {
            node: Derived::new(recompute, dependencies),
        }
    }

    pub fn dispose(&self) {
        self.node.dispose();
    }
}

/// One-to-one element mapping from an input observable set to a target.
///
/// Any change to the input re-maps every element; the target still only
/// sees the minimal diff.
#[derive(Debug)]
pub struct CollectionConverter {
    node: Derived,
}

impl CollectionConverter {
    pub fn new<In, Out, CIn, COut, F>(
        target: ObservableOrderedSet<Out, COut>,
        convert: F,
        input: ObservableOrderedSet<In, CIn>,
    ) -> Self
    where
        In: Clone + 'static,
        Out: Clone + 'static,
        CIn: Comparator<In> + 'static,
        COut: Comparator<Out> + 'static,
        F: Fn(&In) -> Out + 'static,
    {
        let source = input.clone();
        let recompute: Rc<dyn Fn()> = Rc::new(move || {
            let mapped = source.with(|set| set.iter().map(&convert).collect::<Vec<_>>());
            target.reconcile_all_unsorted(mapped);
        });
        Self {
            node: Derived::new(recompute, &[&input]),
        }
    }

    pub fn dispose(&self) {
        self.node.dispose();
    }
}

/// A binary set operation over two input observable sets, reconciled into a
/// target.
#[derive(Debug)]
pub struct BinarySetFunction {
    node: Derived,
}

impl BinarySetFunction {
    /// Derive `target` as `function(left, right)` over current snapshots of
    /// both operands, recomputing when either operand changes.
    pub fn new<T, CL, CR, CT, F>(
        target: ObservableOrderedSet<T, CT>,
        function: F,
        left: ObservableOrderedSet<T, CL>,
        right: ObservableOrderedSet<T, CR>,
    ) -> Self
    where
        T: Clone + 'static,
        CL: Comparator<T> + 'static,
        CR: Comparator<T> + 'static,
        CT: Comparator<T> + 'static,
        F: Fn(&OrderedSet<T, CL>, &OrderedSet<T, CR>) -> Vec<T> + 'static,
    {
        let left_dep = left.clone();
        let right_dep = right.clone();
        let recompute: Rc<dyn Fn()> = Rc::new(move || {
            let result = left.with(|l| right.with(|r| function(l, r)));
            target.reconcile_all_unsorted(result);
        });
        Self {
            node: Derived::new(recompute, &[&left_dep, &right_dep]),
        }
    }

    /// Set difference: `target = left - right` by element presence.
    pub fn subtract<T, CL, CR, CT>(
        target: ObservableOrderedSet<T, CT>,
        left: ObservableOrderedSet<T, CL>,
        right: ObservableOrderedSet<T, CR>,
    ) -> Self
    where
        T: Clone + 'static,
        CL: Comparator<T> + 'static,
        CR: Comparator<T> + 'static,
        CT: Comparator<T> + 'static,
    {
        Self::new(
            target,
            |l, r| l.iter().filter(|item| !r.contains(item)).cloned().collect(),
            left,
            right,
        )
    }

    pub fn dispose(&self) {
        self.node.dispose();
    }
}
