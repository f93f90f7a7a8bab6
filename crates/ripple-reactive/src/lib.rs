#![forbid(unsafe_code)]

//! Reactive dependency graph: properties, derived values, and derived
//! collections.
//!
//! The graph is built from two kinds of node:
//!
//! - Sources: [`Property`] (a single observable value) and
//!   [`ObservableOrderedSet`](ripple_collections::ObservableOrderedSet)
//!   (an observable sorted set, from the collections crate). Anything
//!   implementing [`Notifiable`] can be a dependency.
//! - Derived nodes: [`DerivedProperty`], [`DerivedCollection`],
//!   [`CollectionConverter`], [`BinarySetFunction`], and the
//!   side-effect-only [`OnChanged`]. Each subscribes to a fixed dependency
//!   list at construction and recomputes synchronously when any dependency
//!   changes.
//!
//! Propagation is depth-first and unbatched on the mutating thread. Derived
//! collection updates go through minimal-diff reconciliation, so downstream
//! subscribers see only the elements that actually changed.
//!
//! Everything here is single-threaded (`Rc`-based handles, no `Send`).

pub mod collection;
pub mod derived;
pub mod property;

pub use collection::{BinarySetFunction, CollectionConverter, DerivedCollection};
pub use derived::{Derived, DerivedProperty, OnChanged};
pub use property::Property;

pub use ripple_collections::notify::{Notifiable, Subscription};
