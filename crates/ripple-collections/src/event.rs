#![forbid(unsafe_code)]

//! Structural change events emitted by [`ObservableOrderedSet`].
//!
//! Each structural mutation emits exactly one event. `Added` and `Removed`
//! carry the affected item and the index it was inserted at or removed from;
//! `Reset` signals that subscribers must re-read the whole set.
//!
//! [`ObservableOrderedSet`]: crate::ObservableOrderedSet

/// A single structural change to an observable ordered set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetEvent<T> {
    /// `item` was inserted at `index`.
    Added { item: T, index: usize },
    /// `item` was removed from `index`.
    Removed { item: T, index: usize },
    /// The set changed wholesale; subscribers should re-read its contents.
    Reset,
}

impl<T> SetEvent<T> {
    /// Whether this event is an `Added` or `Removed` (carries an item).
    #[must_use]
    pub fn is_incremental(&self) -> bool {
        !matches!(self, SetEvent::Reset)
    }
}
