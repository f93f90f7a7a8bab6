//! Property-based tests for derived-node pipelines.
//!
//! Invariants checked for **any** sequence of upstream mutations:
//!
//! 1. A converter's target always equals the mapped image of its input.
//! 2. A subtraction's target always equals left-minus-right membership.
//! 3. A derived property over a set always reflects the settled set.
//! 4. Settling is synchronous: the invariants hold after every single
//!    mutation, not just at the end.

use std::collections::BTreeSet;

use proptest::prelude::*;

use ripple_collections::ObservableOrderedSet;
use ripple_reactive::{BinarySetFunction, CollectionConverter, DerivedProperty, Property};

#[derive(Clone, Debug)]
enum Op {
    InsertLeft(i32),
    RemoveLeft(i32),
    InsertRight(i32),
    RemoveRight(i32),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    proptest::collection::vec(
        prop_oneof![
            (0i32..40).prop_map(Op::InsertLeft),
            (0i32..40).prop_map(Op::RemoveLeft),
            (0i32..40).prop_map(Op::InsertRight),
            (0i32..40).prop_map(Op::RemoveRight),
        ],
        0..40,
    )
}

proptest! {
    #[test]
    fn converter_target_is_always_the_mapped_image(
        seed in proptest::collection::vec(0i32..40, 0..15),
        script in ops(),
    ) {
        let input = ObservableOrderedSet::natural_from_iter(seed);
        let target = ObservableOrderedSet::natural();
        let _convert = CollectionConverter::new(target.clone(), |n: &i32| n * 3, input.clone());

        for op in script {
            match op {
                Op::InsertLeft(v) | Op::InsertRight(v) => { input.insert(v); }
                Op::RemoveLeft(v) | Op::RemoveRight(v) => { input.remove(&v); }
            }
            let expected: Vec<i32> = input.to_vec().into_iter().map(|n| n * 3).collect();
            prop_assert_eq!(target.to_vec(), expected);
        }
    }

    #[test]
    fn subtraction_and_summary_settle_after_every_mutation(
        left_seed in proptest::collection::vec(0i32..40, 0..15),
        right_seed in proptest::collection::vec(0i32..40, 0..15),
        script in ops(),
    ) {
        let left = ObservableOrderedSet::natural_from_iter(left_seed);
        let right = ObservableOrderedSet::natural_from_iter(right_seed);
        let difference = ObservableOrderedSet::natural();
        let count = Property::new(0usize);

        let _diff =
            BinarySetFunction::subtract(difference.clone(), left.clone(), right.clone());
        let _count = DerivedProperty::new(count.clone(), {
            let difference = difference.clone();
            move || difference.len()
        }, &[&difference]);

        for op in script {
            match op {
                Op::InsertLeft(v) => { left.insert(v); }
                Op::RemoveLeft(v) => { left.remove(&v); }
                Op::InsertRight(v) => { right.insert(v); }
                Op::RemoveRight(v) => { right.remove(&v); }
            }
            let rhs: BTreeSet<i32> = right.to_vec().into_iter().collect();
            let expected: Vec<i32> = left
                .to_vec()
                .into_iter()
                .filter(|v| !rhs.contains(v))
                .collect();
            prop_assert_eq!(difference.to_vec(), expected.clone());
            prop_assert_eq!(count.get(), expected.len());
        }
    }
}
