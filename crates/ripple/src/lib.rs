#![forbid(unsafe_code)]

//! Ripple public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.

pub mod prelude {
    pub use ripple_collections as collections;
    pub use ripple_reactive as reactive;

    pub use ripple_collections::{
        Bounds, Comparator, Natural, Notifiable, ObservableOrderedSet, OrderedSet, SetError,
        SetEvent, Subscription,
    };
    pub use ripple_reactive::{
        BinarySetFunction, CollectionConverter, DerivedCollection, DerivedProperty, OnChanged,
        Property,
    };
}
