#![forbid(unsafe_code)]

//! Subscription tokens and the change-notification capability.
//!
//! Observables in this workspace keep an explicit registry of subscribers:
//! each callback is stored under a monotonically assigned token, and the
//! [`Subscription`] returned from `subscribe` removes that token when
//! dropped. The observable never owns the subscriber's lifetime; dropping
//! the subscription is the only way to unsubscribe, and it always works,
//! even if the observable itself is already gone.
//!
//! [`Notifiable`] is the capability interface that lets a derived node treat
//! a value cell and an observable collection uniformly: anything that can
//! announce "I changed" implements it. Dependency lists are slices of
//! `&dyn Notifiable`, so depending on a non-notifying object is a compile
//! error rather than a runtime check.
//!
//! # Invariants
//!
//! 1. Dropping a `Subscription` removes the callback before the next
//!    notification cycle.
//! 2. Subscribers are notified in registration order.
//! 3. Notification dispatch is synchronous and depth-first; a callback that
//!    mutates another observable triggers that observable's subscribers
//!    before the callback returns.
//!
//! # Failure Modes
//!
//! - Cyclic dependency graphs recompute forever. Debug builds panic once
//!   the dispatch depth passes [`MAX_DISPATCH_DEPTH`]; release builds retain
//!   the unguarded synchronous contract and will overflow the stack.

use std::cell::Cell;
use std::rc::Rc;

/// Dispatch depth at which debug builds assume the graph is cyclic.
///
/// Legitimate chains are shallow (each hop is one derived node); hundreds of
/// nested dispatches almost certainly mean a cycle.
pub const MAX_DISPATCH_DEPTH: usize = 512;

thread_local! {
    static DISPATCH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// RAII marker for one level of synchronous notification dispatch.
///
/// Observables acquire one of these around subscriber invocation. The depth
/// check only fires in debug builds; release builds pay one thread-local
/// increment per dispatch.
#[derive(Debug)]
pub struct DispatchGuard(());

impl DispatchGuard {
    pub fn enter() -> Self {
        let depth = DISPATCH_DEPTH.with(|d| {
            let depth = d.get() + 1;
            d.set(depth);
            depth
        });
        debug_assert!(
            depth <= MAX_DISPATCH_DEPTH,
            "notification dispatch depth exceeded {MAX_DISPATCH_DEPTH}; \
             the dependency graph almost certainly contains a cycle"
        );
        Self(())
    }

    /// Current nesting depth of notification dispatch on this thread.
    #[must_use]
    pub fn depth() -> usize {
        DISPATCH_DEPTH.with(Cell::get)
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCH_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// RAII handle for a registered callback.
///
/// Dropping the subscription removes the callback from its observable's
/// registry. If the observable has already been dropped, the removal is a
/// silent no-op.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap a cancellation action. Called by observables from `subscribe`.
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription that does nothing when dropped.
    #[must_use]
    pub fn noop() -> Self {
        Self { cancel: None }
    }

    /// Keep the callback registered forever.
    pub fn leak(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}

/// Capability of announcing "something about me changed".
///
/// Implemented by `Property<T>` and [`ObservableOrderedSet`]; derived nodes
/// accept dependencies only through this trait.
///
/// [`ObservableOrderedSet`]: crate::ObservableOrderedSet
pub trait Notifiable {
    /// Register a payload-free change callback.
    ///
    /// The callback runs synchronously on every state-changing mutation,
    /// after the new state is visible.
    fn subscribe_changed(&self, callback: Rc<dyn Fn()>) -> Subscription;
}
