#![forbid(unsafe_code)]

//! Ordered-set collections with structural change events.
//!
//! This crate is the collection layer of the ripple workspace:
//!
//! - [`OrderedSet`]: a dense sorted set over an explicit [`Comparator`],
//!   favoring fast in-order iteration.
//! - [`ObservableOrderedSet`]: the same set behind a cloneable handle that
//!   emits one [`SetEvent`] per structural change, with scoped suspension
//!   and a minimal-diff reconcile family that updates contents in place
//!   while emitting the fewest possible events.
//! - [`Subscription`] / [`Notifiable`]: the token-based observer registry
//!   and the change-notification capability the reactive layer builds on.
//!
//! All types are single-threaded; notification dispatch is synchronous and
//! depth-first on the mutating thread.

pub mod compare;
pub mod event;
pub mod notify;
pub mod observable_set;
pub mod ordered_set;

pub use compare::{Comparator, Natural};
pub use event::SetEvent;
pub use notify::{MAX_DISPATCH_DEPTH, DispatchGuard, Notifiable, Subscription};
pub use observable_set::{ObservableOrderedSet, ReconcileStats, SuspendGuard};
pub use ordered_set::{Bounds, OrderedSet, SetError};
