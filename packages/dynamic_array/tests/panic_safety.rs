//! Tests for the panic behavior of element code running inside the array.
//!
//! Element constructors, clones, and default constructors are the only places user
//! code runs while the array's bookkeeping is mid-flight. These tests pin down what
//! survives such a panic: which elements still exist, what the length reports, and
//! that nothing leaks or double-drops.

use std::panic::{AssertUnwindSafe, catch_unwind};

use dynamic_array::DynamicArray;
use testing::{CloneBudget, DropTracker, FailingClone, FailingDefault, Tracked};

#[test]
fn push_constructor_panic_leaves_the_array_untouched() {
    let tracker = DropTracker::new();
    let mut array = DynamicArray::with_capacity(4);
    for value in 0..3 {
        array.push(tracker.track(value));
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.push_with(|| panic!("constructor failed"));
    }));
    assert!(result.is_err());

    // Nothing changed: same length, same capacity, same elements.
    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 4);
    assert_eq!(tracker.live(), 3);

    let values: Vec<_> = array.iter().map(Tracked::value).collect();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn push_constructor_panic_during_growth_keeps_the_old_storage() {
    let tracker = DropTracker::new();
    let mut array = DynamicArray::with_capacity(2);
    array.push(tracker.track(0));
    array.push(tracker.track(1));
    assert_eq!(array.len(), array.capacity());

    // The constructor runs against the doubled buffer before anything relocates,
    // so its panic releases only that fresh, element-free storage.
    let result = catch_unwind(AssertUnwindSafe(|| {
        array.push_with(|| panic!("constructor failed"));
    }));
    assert!(result.is_err());

    assert_eq!(array.len(), 2);
    assert_eq!(array.capacity(), 2);
    assert_eq!(tracker.live(), 2);

    // The array remains fully usable afterwards.
    array.push(tracker.track(2));
    assert_eq!(array.capacity(), 4);
    assert_eq!(tracker.live(), 3);
}

#[test]
fn insert_constructor_panic_below_capacity_changes_nothing() {
    let tracker = DropTracker::new();
    let mut array = DynamicArray::with_capacity(4);
    for value in 0..3 {
        array.push(tracker.track(value));
    }

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.insert_with(1, || panic!("constructor failed"));
    }));
    assert!(result.is_err());

    assert_eq!(array.len(), 3);
    assert_eq!(tracker.live(), 3);

    let values: Vec<_> = array.iter().map(Tracked::value).collect();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn insert_constructor_panic_during_growth_keeps_the_old_storage() {
    let tracker = DropTracker::new();
    let mut array = DynamicArray::with_capacity(2);
    array.push(tracker.track(0));
    array.push(tracker.track(1));

    let result = catch_unwind(AssertUnwindSafe(|| {
        array.insert_with(1, || panic!("constructor failed"));
    }));
    assert!(result.is_err());

    assert_eq!(array.len(), 2);
    assert_eq!(array.capacity(), 2);
    assert_eq!(tracker.live(), 2);

    let values: Vec<_> = array.iter().map(Tracked::value).collect();
    assert_eq!(values, vec![0, 1]);
}

#[test]
fn clone_panic_midway_releases_the_partial_copy() {
    let tracker = DropTracker::new();
    let budget = CloneBudget::new(2);

    let mut array = DynamicArray::new();
    for value in 0..4 {
        array.push(FailingClone::new(tracker.track(value), &budget));
    }

    // The third clone exhausts the budget and panics.
    let result = catch_unwind(AssertUnwindSafe(|| array.clone()));
    assert!(result.is_err());
    assert_eq!(budget.remaining(), 0);

    // The two elements the copy managed to clone were dropped during unwind; the
    // source is intact.
    assert_eq!(array.len(), 4);
    assert_eq!(tracker.live(), 4);

    drop(array);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn clone_from_panic_in_the_reallocating_branch_keeps_the_target() {
    let tracker = DropTracker::new();
    let budget = CloneBudget::new(2);

    let mut target = DynamicArray::new();
    target.push(FailingClone::new(tracker.track(0), &budget));

    let mut source = DynamicArray::new();
    for value in 10..14 {
        source.push(FailingClone::new(tracker.track(value), &budget));
    }

    // The source does not fit in the target's capacity, so assignment builds a
    // complete copy first. Its failure leaves the target exactly as it was.
    let result = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));
    assert!(result.is_err());

    assert_eq!(target.len(), 1);
    let values: Vec<_> = target.iter().map(FailingClone::value).collect();
    assert_eq!(values, vec![0]);

    assert_eq!(source.len(), 4);
    assert_eq!(tracker.live(), 5);

    drop(target);
    drop(source);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn clone_from_panic_in_the_tail_branch_keeps_the_assigned_prefix() {
    let tracker = DropTracker::new();
    let budget = CloneBudget::new(4);

    let mut target = DynamicArray::with_capacity(10);
    for value in 0..2 {
        target.push(FailingClone::new(tracker.track(value), &budget));
    }

    let mut source = DynamicArray::new();
    for value in 10..16 {
        source.push(FailingClone::new(tracker.track(value), &budget));
    }

    // The source fits in place: the two prefix elements are assigned (two clones),
    // then tail construction panics on its third clone.
    let result = catch_unwind(AssertUnwindSafe(|| target.clone_from(&source)));
    assert!(result.is_err());

    // The target keeps its previous length and stays fully usable; the prefix now
    // holds the source's leading values and the partial tail was dropped.
    assert_eq!(target.len(), 2);
    assert_eq!(target.capacity(), 10);
    let values: Vec<_> = target.iter().map(FailingClone::value).collect();
    assert_eq!(values, vec![10, 11]);

    assert_eq!(source.len(), 6);
    assert_eq!(tracker.live(), 8);

    drop(target);
    drop(source);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn with_len_panic_drops_every_partially_built_element() {
    FailingDefault::arm(2);

    let result = catch_unwind(|| DynamicArray::<FailingDefault>::with_len(4));
    assert!(result.is_err());

    // The two elements built before the failure were dropped during unwind.
    assert_eq!(FailingDefault::live(), 0);

    FailingDefault::disarm();
}

#[test]
fn resize_panic_drops_the_partial_tail_and_keeps_the_length() {
    FailingDefault::arm(5);

    let mut array = DynamicArray::<FailingDefault>::with_len(3);
    assert_eq!(FailingDefault::live(), 3);

    // Growing to 8 needs five more elements; the budget allows two.
    let result = catch_unwind(AssertUnwindSafe(|| array.resize(8)));
    assert!(result.is_err());

    // The partial tail was dropped, the length kept its previous value and the
    // storage growth is retained.
    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 8);
    assert_eq!(FailingDefault::live(), 3);

    drop(array);
    assert_eq!(FailingDefault::live(), 0);

    FailingDefault::disarm();
}
