#![forbid(unsafe_code)]

//! Observable value cells.
//!
//! [`Property<T>`] is a shared, single-threaded cell (`Rc<RefCell<..>>`)
//! whose subscribers are told when the value changes. Cloning a `Property`
//! clones the handle, not the value.
//!
//! # Invariants
//!
//! 1. Setting a value equal to the current value (per `PartialEq`) is a
//!    no-op: no store, no notification.
//! 2. Setting an unequal value notifies every live subscriber exactly once,
//!    synchronously, in registration order, after the new value is stored.
//! 3. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//!
//! # Failure Modes
//!
//! - The value stays borrowed for the duration of each callback, so a
//!   subscriber that calls [`Property::set`] on the property it is being
//!   notified about panics on the `RefCell` borrow. Subscribers may set
//!   *other* properties freely; that is how derived chains propagate.

use std::cell::RefCell;
use std::rc::Rc;

use ripple_collections::notify::{DispatchGuard, Notifiable, Subscription};

struct PropertyInner<T> {
    value: T,
    subscribers: Vec<(u64, Rc<dyn Fn(&T)>)>,
    next_token: u64,
}

/// A mutable observable cell holding a single `T`.
pub struct Property<T> {
    inner: Rc<RefCell<PropertyInner<T>>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Property")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Property<T> {
    /// A property holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(PropertyInner {
                value,
                subscribers: Vec::new(),
                next_token: 0,
            })),
        }
    }

    /// Access the current value by reference.
    ///
    /// # Panics
    ///
    /// Panics if `f` sets this same property re-entrantly (`RefCell`
    /// borrow).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Register a callback invoked with the new value after each change.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription
    where
        T: 'static,
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

    fn notify(&self) {
        let (callbacks, value_holder) = {
            let inner = self.inner.borrow();
            if inner.subscribers.is_empty() {
                return;
            }
            let callbacks: Vec<Rc<dyn Fn(&T)>> =
                inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect();
            (callbacks, Rc::clone(&self.inner))
        };
        let _depth = DispatchGuard::enter();
        for callback in callbacks {
            // Re-borrow per callback: a subscriber may read (not set) this
            // property, and earlier subscribers may have changed others.
            let value = value_holder.borrow();
            callback(&value.value);
        }
    }
}

impl<T: Clone> Property<T> {
    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }
}

impl<T: PartialEq> Property<T> {
    /// Store `value` and notify subscribers, unless it equals the current
    /// value, in which case nothing happens.
    ///
    /// # Panics
    ///
    /// Panics if called from one of this property's own subscribers
    /// (`RefCell` borrow).
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
        }
        self.notify();
    }
}

impl<T: 'static> Notifiable for Property<T> {
    fn subscribe_changed(&self, callback: Rc<dyn Fn()>) -> Subscription {
        self.subscribe(move |_| callback())
    }
}
