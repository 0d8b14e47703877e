//! Integration tests for the `dynamic_array` package.
//!
//! These tests exercise whole-container scenarios: ordering across mixed edits,
//! the relocation policy during growth, element lifetime accounting, and storage
//! reuse across assignments.

use dynamic_array::DynamicArray;
use testing::{DropTracker, MoveOnly};

#[test]
fn ordering_survives_mixed_edits() {
    let mut array = DynamicArray::new();
    for value in [10, 20, 30, 40, 50] {
        array.push(value);
    }

    // Removing from the middle closes the gap.
    assert_eq!(array.remove(1), Some(20));
    assert_eq!(array.as_slice(), &[10, 30, 40, 50]);

    // Inserting in the middle reopens it.
    array.insert(1, 20);
    assert_eq!(array.as_slice(), &[10, 20, 30, 40, 50]);

    // Inserting at the length appends.
    array.insert(5, 60);
    assert_eq!(array.as_slice(), &[10, 20, 30, 40, 50, 60]);

    assert_eq!(array.remove(0), Some(10));
    assert_eq!(array.pop(), Some(60));
    assert_eq!(array.as_slice(), &[20, 30, 40, 50]);
}

#[test]
fn growth_relocates_without_running_element_code() {
    let tracker = DropTracker::new();
    let mut array = DynamicArray::new();

    // 64 appends cross six capacity doublings.
    for value in 0..64 {
        array.push(tracker.track(value));
    }

    assert_eq!(array.capacity(), 64);

    // Every element was created exactly once: relocation never cloned anything.
    assert_eq!(tracker.created(), 64);
    assert_eq!(tracker.dropped(), 0);

    drop(array);
    assert_eq!(tracker.dropped(), 64);
}

#[test]
fn move_only_elements_grow_through_a_full_buffer() {
    let mut array = DynamicArray::with_capacity(2);
    array.push(MoveOnly::new(1));
    array.push(MoveOnly::new(2));
    assert_eq!(array.len(), array.capacity());

    // The append that finds the buffer full doubles it and relocates by moving.
    array.push(MoveOnly::new(3));

    assert_eq!(array.capacity(), 4);
    let values: Vec<_> = array.iter().map(MoveOnly::value).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn move_only_elements_support_positional_insert_at_capacity() {
    let mut array = DynamicArray::with_capacity(2);
    array.push(MoveOnly::new(1));
    array.push(MoveOnly::new(3));
    assert_eq!(array.len(), array.capacity());

    array.insert(1, MoveOnly::new(2));

    assert_eq!(array.capacity(), 4);
    let values: Vec<_> = array.iter().map(MoveOnly::value).collect();
    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn move_only_elements_drain_by_value() {
    let mut array = DynamicArray::new();
    for value in 1..=3 {
        array.push(MoveOnly::new(value));
    }

    let values: Vec<_> = array.into_iter().map(|item| item.value()).collect();

    assert_eq!(values, vec![1, 2, 3]);
}

#[test]
fn element_lifetimes_balance_across_mixed_operations() {
    let tracker = DropTracker::new();
    let mut array = DynamicArray::new();

    for value in 0..6 {
        array.push(tracker.track(value));
    }
    assert_eq!(tracker.live(), 6);

    // Removal hands the element out; dropping it closes the account.
    let removed = array.remove(2);
    drop(removed);
    assert_eq!(tracker.live(), 5);

    let popped = array.pop();
    drop(popped);
    assert_eq!(tracker.live(), 4);

    array.truncate(2);
    assert_eq!(tracker.live(), 2);

    array.insert(1, tracker.track(100));
    assert_eq!(tracker.live(), 3);

    array.clear();
    assert_eq!(tracker.live(), 0);
    assert_eq!(tracker.created(), 7);
}

#[test]
fn copy_assignment_reuses_storage_when_the_source_fits() {
    let tracker = DropTracker::new();

    let mut target = DynamicArray::with_capacity(10);
    for value in 0..5 {
        target.push(tracker.track(value));
    }

    let mut source = DynamicArray::new();
    for value in [100, 101, 102] {
        source.push(tracker.track(value));
    }

    target.clone_from(&source);

    // The target kept its storage and holds copies of the source's elements.
    assert_eq!(target.capacity(), 10);
    assert_eq!(target, source);
    assert_eq!(tracker.live(), 6);

    drop(target);
    drop(source);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn copy_assignment_reallocates_when_the_source_does_not_fit() {
    let tracker = DropTracker::new();

    let mut target = DynamicArray::with_capacity(2);
    target.push(tracker.track(0));

    let mut source = DynamicArray::new();
    for value in 10..15 {
        source.push(tracker.track(value));
    }

    target.clone_from(&source);

    assert_eq!(target.capacity(), 5);
    assert_eq!(target, source);
    assert_eq!(tracker.live(), 10);

    drop(target);
    drop(source);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn clone_produces_an_independent_copy() {
    let tracker = DropTracker::new();

    let mut original = DynamicArray::new();
    for value in 0..4 {
        original.push(tracker.track(value));
    }

    let copy = original.clone();
    assert_eq!(copy, original);
    assert_eq!(copy.capacity(), 4);
    assert_eq!(tracker.live(), 8);

    // Editing the original leaves the copy alone.
    drop(original.pop());
    assert_eq!(copy.len(), 4);
    assert_eq!(tracker.live(), 7);

    drop(original);
    drop(copy);
    assert_eq!(tracker.live(), 0);
}

#[test]
fn reserve_is_exact_and_growth_doubles_from_it() {
    let mut array = DynamicArray::new();

    array.reserve(7);
    assert_eq!(array.capacity(), 7);

    for value in 0..7 {
        array.push(value);
    }
    assert_eq!(array.capacity(), 7);

    array.push(7);
    assert_eq!(array.capacity(), 14);
}

#[test]
fn resize_grows_and_shrinks_with_default_values() {
    let mut names = DynamicArray::<String>::new();

    names.resize(3);
    assert_eq!(names.as_slice(), &["", "", ""]);
    assert_eq!(names.capacity(), 3);

    for (name, text) in names.iter_mut().zip(["first", "second"]) {
        name.push_str(text);
    }

    names.resize(1);
    assert_eq!(names.as_slice(), &["first"]);
    assert_eq!(names.capacity(), 3);
}

#[test]
fn empty_array_tolerates_every_removal_operation() {
    let mut array = DynamicArray::<String>::new();

    assert_eq!(array.pop(), None);
    assert_eq!(array.remove(0), None);
    array.truncate(5);
    array.clear();

    assert!(array.is_empty());
    assert_eq!(array.iter().count(), 0);
    assert!(array.clone().is_empty());
}

#[test]
#[should_panic(expected = "insert index (is 2) must not exceed length (is 1)")]
fn insert_past_the_length_is_rejected() {
    let mut array = DynamicArray::new();
    array.push(1);

    array.insert(2, 9);
}

#[test]
fn zero_sized_elements_run_the_full_lifecycle() {
    let mut array = DynamicArray::new();

    for _ in 0..6 {
        array.push(());
    }
    assert_eq!(array.len(), 6);
    assert_eq!(array.capacity(), 8);

    array.insert(3, ());
    assert_eq!(array.remove(0), Some(()));
    assert_eq!(array.pop(), Some(()));
    assert_eq!(array.len(), 5);

    let copy = array.clone();
    assert_eq!(copy.len(), 5);
    assert_eq!(array.into_iter().count(), 5);
}

#[test]
fn long_push_sequences_stay_consistent() {
    let mut array = DynamicArray::new();

    for value in 0..1000 {
        array.push(value);
    }

    assert_eq!(array.len(), 1000);
    assert_eq!(array.capacity(), 1024);
    assert_eq!(array.first(), Some(&0));
    assert_eq!(array.get(499), Some(&499));
    assert_eq!(array.last(), Some(&999));

    let mut countdown = 1000;
    while let Some(value) = array.pop() {
        countdown -= 1;
        assert_eq!(value, countdown);
    }

    assert!(array.is_empty());
}
