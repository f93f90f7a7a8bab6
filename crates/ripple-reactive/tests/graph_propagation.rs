//! End-to-end propagation tests over multi-node reactive graphs.
//!
//! These build the kinds of graphs the crate exists for (source sets and
//! properties feeding chained derived collections and values) and assert
//! that every hop settles synchronously, that derived collections emit
//! only minimal diffs, and that disposal severs exactly the disposed node.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ripple_collections::{ObservableOrderedSet, SetEvent};
use ripple_reactive::{
    BinarySetFunction, CollectionConverter, DerivedCollection, DerivedProperty, OnChanged,
    Property,
};

fn event_log<T: Clone + 'static, C: 'static>(
    set: &ObservableOrderedSet<T, C>,
) -> Rc<RefCell<Vec<SetEvent<T>>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    set.subscribe(move |event| sink.borrow_mut().push(event.clone()))
        .leak();
    log
}

/// Source set -> converter -> subtraction -> derived summary property.
///
/// The classic pipeline: one upstream insert ripples through three derived
/// nodes before the mutating call returns.
#[test]
fn four_stage_pipeline_settles_synchronously() {
    let raw = ObservableOrderedSet::natural_from_iter([1, 2, 3]);
    let scaled = ObservableOrderedSet::natural();
    let excluded = ObservableOrderedSet::natural_from_iter([20]);
    let visible = ObservableOrderedSet::natural();
    let count = Property::new(0usize);

    let _convert = CollectionConverter::new(scaled.clone(), |n: &i32| n * 10, raw.clone());
    let _subtract =
        BinarySetFunction::subtract(visible.clone(), scaled.clone(), excluded.clone());
    let _count = DerivedProperty::new(count.clone(), {
        let visible = visible.clone();
        move || visible.len()
    }, &[&visible]);

    assert_eq!(scaled.to_vec(), vec![10, 20, 30]);
    assert_eq!(visible.to_vec(), vec![10, 30]);
    assert_eq!(count.get(), 2);

    raw.insert(4);
    assert_eq!(visible.to_vec(), vec![10, 30, 40]);
    assert_eq!(count.get(), 3);

    excluded.insert(10);
    assert_eq!(visible.to_vec(), vec![30, 40]);
    assert_eq!(count.get(), 2);
}

#[test]
fn downstream_sets_see_only_minimal_diffs() {
    let raw = ObservableOrderedSet::natural_from_iter([1, 2, 3]);
    let scaled = ObservableOrderedSet::natural();
    let _convert = CollectionConverter::new(scaled.clone(), |n: &i32| n * 10, raw.clone());

    let log = event_log(&scaled);
    raw.insert(4);
    raw.remove(&1);

    assert_eq!(
        log.borrow().as_slice(),
        &[
            SetEvent::Added { item: 40, index: 3 },
            SetEvent::Removed { item: 10, index: 0 },
        ]
    );
}

#[test]
fn derived_collection_over_mixed_dependencies() {
    let base = ObservableOrderedSet::natural_from_iter([1, 2, 3, 4, 5]);
    let threshold = Property::new(3);
    let filtered = ObservableOrderedSet::natural();

    let _filter = DerivedCollection::new(filtered.clone(), {
        let base = base.clone();
        let threshold = threshold.clone();
        move || {
            let min = threshold.get();
            base.with(|set| set.iter().filter(|v| **v >= min).cloned().collect())
        }
    }, &[&base, &threshold]);

    assert_eq!(filtered.to_vec(), vec![3, 4, 5]);

    threshold.set(5);
    assert_eq!(filtered.to_vec(), vec![5]);

    base.insert(9);
    assert_eq!(filtered.to_vec(), vec![5, 9]);

    threshold.set(0);
    assert_eq!(filtered.to_vec(), vec![1, 2, 3, 4, 5, 9]);
}

#[test]
fn on_changed_observes_settled_downstream_state() {
    let raw = ObservableOrderedSet::natural_from_iter([1]);
    let scaled = ObservableOrderedSet::natural();
    let _convert = CollectionConverter::new(scaled.clone(), |n: &i32| n * 10, raw.clone());

    let observed = Rc::new(Cell::new(0usize));
    let sink = Rc::clone(&observed);
    // Hooked on the source: by the time the source notifies this hook, the
    // converter registered earlier has already updated the target.
    let _hook = OnChanged::new({
        let scaled = scaled.clone();
        move || sink.set(scaled.len())
    }, &[&raw]);

    raw.insert(2);
    assert_eq!(observed.get(), 2);
    raw.insert(3);
    assert_eq!(observed.get(), 3);
}

#[test]
fn disposing_a_middle_node_freezes_only_its_segment() {
    let raw = ObservableOrderedSet::natural_from_iter([1]);
    let scaled = ObservableOrderedSet::natural();
    let count = Property::new(0usize);

    let convert = CollectionConverter::new(scaled.clone(), |n: &i32| n * 10, raw.clone());
    let _count = DerivedProperty::new(count.clone(), {
        let scaled = scaled.clone();
        move || scaled.len()
    }, &[&scaled]);

    raw.insert(2);
    assert_eq!(count.get(), 2);

    convert.dispose();
    raw.insert(3);
    // The converter is inert, so the count node never heard anything.
    assert_eq!(scaled.to_vec(), vec![10, 20]);
    assert_eq!(count.get(), 2);

    // The count node itself is still live.
    scaled.insert(99);
    assert_eq!(count.get(), 3);
}

#[test]
fn diamond_dependencies_settle_consistently() {
    let source = Property::new(2);
    let doubled = Property::new(0);
    let squared = Property::new(0);
    let sum = Property::new(0);

    let _a = DerivedProperty::new(doubled.clone(), {
        let source = source.clone();
        move || source.get() * 2
    }, &[&source]);
    let _b = DerivedProperty::new(squared.clone(), {
        let source = source.clone();
        move || source.get() * source.get()
    }, &[&source]);
    let _c = DerivedProperty::new(sum.clone(), {
        let doubled = doubled.clone();
        let squared = squared.clone();
        move || doubled.get() + squared.get()
    }, &[&doubled, &squared]);

    assert_eq!(sum.get(), 8);

    source.set(3);
    // Depth-first: sum recomputes once per arm, but ends consistent.
    assert_eq!(sum.get(), 15);
}

#[test]
fn suspension_collapses_upstream_burst_into_one_reset() {
    let raw = ObservableOrderedSet::natural_from_iter([1, 2]);
    let scaled = ObservableOrderedSet::natural();
    let _convert = CollectionConverter::new(scaled.clone(), |n: &i32| n * 10, raw.clone());

    let log = event_log(&scaled);
    {
        let _quiet = scaled.suspend();
        raw.insert(3);
        raw.insert(4);
        assert!(log.borrow().is_empty());
    }
    assert_eq!(log.borrow().as_slice(), &[SetEvent::Reset]);
    assert_eq!(scaled.to_vec(), vec![10, 20, 30, 40]);
}

#[test]
fn converter_feeding_binary_function_feeding_property() {
    let lhs = ObservableOrderedSet::natural_from_iter([1, 2, 3]);
    let rhs_raw = ObservableOrderedSet::natural_from_iter([6]);
    let rhs = ObservableOrderedSet::natural();
    let difference = ObservableOrderedSet::natural();
    let smallest = Property::new(None::<i32>);

    let _half = CollectionConverter::new(rhs.clone(), |n: &i32| n / 2, rhs_raw.clone());
    let _diff = BinarySetFunction::subtract(difference.clone(), lhs.clone(), rhs.clone());
    let _min = DerivedProperty::new(smallest.clone(), {
        let difference = difference.clone();
        move || difference.min()
    }, &[&difference]);

    assert_eq!(rhs.to_vec(), vec![3]);
    assert_eq!(difference.to_vec(), vec![1, 2]);
    assert_eq!(smallest.get(), Some(1));

    rhs_raw.insert(2); // rhs gains 1
    assert_eq!(difference.to_vec(), vec![2]);
    assert_eq!(smallest.get(), Some(2));

    lhs.clear();
    assert_eq!(smallest.get(), None);
}
