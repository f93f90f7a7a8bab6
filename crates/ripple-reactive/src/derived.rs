#![forbid(unsafe_code)]

//! Derived nodes: recomputation units wired to notifying dependencies.
//!
//! A [`Derived`] captures a fixed dependency list at construction,
//! subscribes to each, and re-runs its recompute closure synchronously every
//! time any dependency announces a change. Dependencies are anything
//! implementing [`Notifiable`], so "depending on something that can't
//! notify" is a type error, not a runtime one.
//!
//! Lifecycle: subscribed at construction (with one initial recompute for
//! the value-producing variants), active until [`Derived::dispose`] or
//! drop, inert afterwards. There is no way back from disposed.
//!
//! Propagation is depth-first: a recompute that mutates a dependency of
//! another live node triggers that node inline, before the original
//! notification dispatch returns. There is no batching and no cycle
//! detection beyond the debug-build dispatch-depth assertion.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::debug;

use ripple_collections::notify::{Notifiable, Subscription};

use crate::property::Property;

/// Wiring core shared by every derived-node variant.
///
/// Holds the dependency subscriptions; dropping them is what makes the node
/// inert.
pub struct Derived {
    subscriptions: RefCell<Vec<Subscription>>,
    disposed: Cell<bool>,
}

impl Derived {
    /// Subscribe `recompute` to every dependency, then run it once.
    ///
    /// The initial run happens before this returns, so the node's target is
    /// consistent with its dependencies from the moment it exists.
    pub fn new(recompute: Rc<dyn Fn()>, dependencies: &[&dyn Notifiable]) -> Self {
        let node = Self::subscribe_only(Rc::clone(&recompute), dependencies);
        recompute();
        node
    }

    /// Subscribe `recompute` to every dependency without an initial run.
    ///
    /// Used by [`OnChanged`], whose action only makes sense as a reaction.
    pub fn subscribe_only(recompute: Rc<dyn Fn()>, dependencies: &[&dyn Notifiable]) -> Self {
        let subscriptions = dependencies
            .iter()
            .map(|dependency| dependency.subscribe_changed(Rc::clone(&recompute)))
            .collect::<Vec<_>>();
        debug!(dependencies = subscriptions.len(), "derived node wired");
        Self {
            subscriptions: RefCell::new(subscriptions),
            disposed: Cell::new(false),
        }
    }

    /// Unsubscribe from every dependency. Idempotent; the node never
    /// recomputes again.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.subscriptions.borrow_mut().clear();
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }
}

impl std::fmt::Debug for Derived {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derived")
            .field("subscriptions", &self.subscriptions.borrow().len())
            .field("disposed", &self.disposed.get())
            .finish()
    }
}

/// Keeps a target [`Property`] equal to a function of its dependencies.
#[derive(Debug)]
pub struct DerivedProperty {
    node: Derived,
}

impl DerivedProperty {
    /// Derive `target` from `function`, recomputing whenever any of
    /// `dependencies` changes.
    ///
    /// `function`'s inputs must all appear in `dependencies`; a missed one
    /// silently yields stale values. The target's own equality gate decides
    /// whether downstream subscribers fire.
    pub fn new<T, F>(
        target: Property<T>,
        function: F,
        dependencies: &[&dyn Notifiable],
    ) -> Self
    where
        T: PartialEq + 'static,
        F: Fn() -> T + 'static,
    {
        let recompute: Rc<dyn Fn()> = Rc::new(move || target.set(function()));
        Self {
            node: Derived::new(recompute, dependencies),
        }
    }

    pub fn dispose(&self) {
        self.node.dispose();
    }
}

/// Runs a side-effecting action whenever any dependency changes.
///
/// Unlike the value-producing variants, construction does **not** run the
/// action; it fires only in reaction to changes.
#[derive(Debug)]
pub struct OnChanged {
    node: Derived,
}

impl OnChanged {
    pub fn new(action: impl Fn() + 'static, dependencies: &[&dyn Notifiable]) -> Self {
        Self {
            node: Derived::subscribe_only(Rc::new(action), dependencies),
        }
    }

    pub fn dispose(&self) {
        self.node.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_collections::ObservableOrderedSet;
    use std::cell::Cell;

    #[test]
    fn derived_property_recomputes_on_each_dependency() {
        let target = Property::new(0);
        let change_count = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&change_count);
        let _watch = target.subscribe(move |_| counter.set(counter.get() + 1));

        let collection = ObservableOrderedSet::natural();
        let prop = Property::new(0);

        let recompute_count = Rc::new(Cell::new(0));
        let recompute_counter = Rc::clone(&recompute_count);

        let derived = DerivedProperty::new(
            target.clone(),
            move || {
                recompute_counter.set(recompute_counter.get() + 1);
                recompute_counter.get()
            },
            &[&collection, &prop],
        );

        // Exactly one initial recompute before the constructor returned.
        assert_eq!(target.get(), 1);

        collection.insert(5);
        assert_eq!(target.get(), 2);

        prop.set(5);
        assert_eq!(target.get(), 3);

        // Target fired once per recompute (every value differed).
        assert_eq!(change_count.get(), recompute_count.get() as u32);
        drop(derived);
    }

    #[test]
    fn initial_recompute_runs_exactly_once() {
        let target = Property::new(0);
        let runs = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&runs);

        let prop = Property::new(1);
        let _derived = DerivedProperty::new(
            target,
            move || {
                counter.set(counter.get() + 1);
                99
            },
            &[&prop],
        );
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn disposal_stops_recomputation() {
        let target = Property::new(0);
        let prop = Property::new(1);

        let derived = DerivedProperty::new(target.clone(), {
            let prop = prop.clone();
            move || prop.get() * 2
        }, &[&prop]);

        prop.set(5);
        assert_eq!(target.get(), 10);

        derived.dispose();
        prop.set(100);
        assert_eq!(target.get(), 10);

        // Idempotent.
        derived.dispose();
    }

    #[test]
    fn zero_dependency_node_is_live_until_disposed() {
        let runs = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&runs);
        let node = Derived::new(Rc::new(move || counter.set(counter.get() + 1)), &[]);

        assert_eq!(runs.get(), 1);
        assert!(!node.is_disposed());

        node.dispose();
        assert!(node.is_disposed());
    }

    #[test]
    fn drop_unsubscribes() {
        let target = Property::new(0);
        let prop = Property::new(1);
        {
            let _derived = DerivedProperty::new(target.clone(), {
                let prop = prop.clone();
                move || prop.get()
            }, &[&prop]);
            prop.set(2);
            assert_eq!(target.get(), 2);
        }
        prop.set(3);
        assert_eq!(target.get(), 2);
    }

    #[test]
    fn on_changed_does_not_run_initially() {
        let collection = ObservableOrderedSet::natural();
        let prop = Property::new(0);

        let runs = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&runs);

        let _hook = OnChanged::new(
            move || counter.set(counter.get() + 1),
            &[&collection, &prop],
        );
        assert_eq!(runs.get(), 0);

        collection.insert(5);
        assert_eq!(runs.get(), 1);

        prop.set(5);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn equal_recompute_result_does_not_fire_downstream() {
        let target = Property::new(0);
        let fired = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&fired);
        let _watch = target.subscribe(move |_| counter.set(counter.get() + 1));

        let prop = Property::new(1);
        let _derived = DerivedProperty::new(target, {
            let prop = prop.clone();
            move || prop.get() % 2
        }, &[&prop]);

        assert_eq!(fired.get(), 1); // initial: 0 -> 1
        prop.set(3); // 3 % 2 == 1: no downstream change
        assert_eq!(fired.get(), 1);
        prop.set(4); // 0: changes
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn chained_derived_properties_propagate_depth_first() {
        let source = Property::new(1);
        let mid = Property::new(0);
        let last = Property::new(0);

        let _a = DerivedProperty::new(mid.clone(), {
            let source = source.clone();
            move || source.get() * 10
        }, &[&source]);
        let _b = DerivedProperty::new(last.clone(), {
            let mid = mid.clone();
            move || mid.get() + 1
        }, &[&mid]);

        assert_eq!(last.get(), 11);

        source.set(2);
        // Both hops resolved before set() returned.
        assert_eq!(mid.get(), 20);
        assert_eq!(last.get(), 21);
    }
}
