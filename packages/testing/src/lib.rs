#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for testing and examples in this workspace's packages.
//!
//! The element types here are instrumented so container tests can prove lifecycle
//! invariants: every constructed value is dropped exactly once, relocation never
//! clones, and operations that panic midway leave no value leaked or dropped twice.

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Issues [`Tracked`] values and counts their constructions and destructions.
///
/// Every value issued by [`track()`](Self::track) and every clone made of such a value
/// increments the created count; every drop increments the dropped count. Comparing the
/// two proves that a container neither leaks elements nor drops them twice.
///
/// # Example
///
/// ```rust
/// use testing::DropTracker;
///
/// let tracker = DropTracker::new();
///
/// let value = tracker.track(1);
/// assert_eq!(tracker.created(), 1);
/// assert_eq!(tracker.live(), 1);
///
/// drop(value);
/// assert_eq!(tracker.dropped(), 1);
/// assert_eq!(tracker.live(), 0);
/// ```
#[derive(Debug, Default)]
pub struct DropTracker {
    counters: Arc<TrackerCounters>,
}

#[derive(Debug, Default)]
struct TrackerCounters {
    created: AtomicUsize,
    dropped: AtomicUsize,
}

impl DropTracker {
    /// Creates a tracker with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a tracked value carrying the given marker, counting it as created.
    #[must_use]
    pub fn track(&self, value: usize) -> Tracked {
        self.counters.created.fetch_add(1, Ordering::SeqCst);

        Tracked {
            value,
            counters: Arc::clone(&self.counters),
        }
    }

    /// Total number of values constructed under this tracker, clones included.
    #[must_use]
    pub fn created(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    /// Total number of values dropped under this tracker.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.counters.dropped.load(Ordering::SeqCst)
    }

    /// Number of values currently alive under this tracker.
    ///
    /// # Panics
    ///
    /// Panics if more values were dropped than created, which would indicate a
    /// double drop in the code under test.
    #[must_use]
    pub fn live(&self) -> usize {
        self.created()
            .checked_sub(self.dropped())
            .expect("dropped count exceeds created count - some value was dropped twice")
    }
}

/// A value whose constructions, clones, and drops are counted by a [`DropTracker`].
///
/// Equality and ordering consider only the marker value, so containers of tracked
/// values can be compared against expected contents.
#[derive(Debug)]
pub struct Tracked {
    value: usize,
    counters: Arc<TrackerCounters>,
}

impl Tracked {
    /// The marker value this instance carries.
    #[must_use]
    pub fn value(&self) -> usize {
        self.value
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.counters.created.fetch_add(1, Ordering::SeqCst);

        Self {
            value: self.value,
            counters: Arc::clone(&self.counters),
        }
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Tracked {}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

/// A value that can be moved but not cloned or copied.
///
/// Storing these in a container proves that the container relocates elements by move
/// and never requires `Clone`.
#[derive(Debug, Eq, PartialEq)]
pub struct MoveOnly {
    value: usize,
}

impl MoveOnly {
    /// Creates a move-only value carrying the given marker.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    /// The marker value this instance carries.
    #[must_use]
    pub fn value(&self) -> usize {
        self.value
    }
}

/// A shared allowance of clone operations, consumed by [`FailingClone`].
///
/// Cloning a [`FailingClone`] draws one unit from the budget; the clone that finds the
/// budget empty panics. This lets tests trigger a failure at an exact point inside a
/// multi-element copy operation.
#[derive(Clone, Debug)]
pub struct CloneBudget {
    remaining: Arc<AtomicUsize>,
}

impl CloneBudget {
    /// Creates a budget allowing exactly `allowed_clones` successful clones.
    #[must_use]
    pub fn new(allowed_clones: usize) -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(allowed_clones)),
        }
    }

    /// Number of successful clones still allowed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::SeqCst)
    }

    fn consume(&self) {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .expect("clone budget exhausted");
    }
}

/// A value whose `Clone` panics once its [`CloneBudget`] runs out.
///
/// The payload is a [`Tracked`] value, so drop accounting keeps working through the
/// panic: the tracker sees exactly the clones that completed before the failure.
#[derive(Debug)]
pub struct FailingClone {
    value: Tracked,
    budget: CloneBudget,
}

impl FailingClone {
    /// Creates a value whose clones draw from the given budget.
    #[must_use]
    pub fn new(value: Tracked, budget: &CloneBudget) -> Self {
        Self {
            value,
            budget: budget.clone(),
        }
    }

    /// The marker value this instance carries.
    #[must_use]
    pub fn value(&self) -> usize {
        self.value.value()
    }
}

impl Clone for FailingClone {
    fn clone(&self) -> Self {
        // Draw from the budget before counting the clone, so a failing clone leaves
        // the created count untouched.
        self.budget.consume();

        Self {
            value: self.value.clone(),
            budget: self.budget.clone(),
        }
    }
}

thread_local! {
    static DEFAULT_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
    static LIVE_DEFAULTS: Cell<usize> = const { Cell::new(0) };
}

/// A value whose `Default` panics once a per-thread budget runs out.
///
/// Tests that drive default-construction paths (sized constructors, resize) arm the
/// budget first; the construction that finds it empty panics. [`live()`](Self::live)
/// reports how many instances currently exist on this thread, for leak checking after
/// the panic is caught.
#[derive(Debug)]
pub struct FailingDefault {
    _private: (),
}

impl FailingDefault {
    /// Allows exactly `allowed_defaults` successful constructions on this thread
    /// before `default()` panics.
    pub fn arm(allowed_defaults: usize) {
        DEFAULT_BUDGET.set(Some(allowed_defaults));
    }

    /// Removes the budget, making construction succeed unconditionally again.
    pub fn disarm() {
        DEFAULT_BUDGET.set(None);
    }

    /// Number of instances currently alive on this thread.
    #[must_use]
    pub fn live() -> usize {
        LIVE_DEFAULTS.get()
    }
}

impl Default for FailingDefault {
    fn default() -> Self {
        if let Some(remaining) = DEFAULT_BUDGET.get() {
            let next = remaining
                .checked_sub(1)
                .expect("default budget exhausted");
            DEFAULT_BUDGET.set(Some(next));
        }

        LIVE_DEFAULTS.set(
            LIVE_DEFAULTS
                .get()
                .checked_add(1)
                .expect("live instance count cannot overflow"),
        );

        Self { _private: () }
    }
}

impl Drop for FailingDefault {
    fn drop(&mut self) {
        LIVE_DEFAULTS.set(
            LIVE_DEFAULTS
                .get()
                .checked_sub(1)
                .expect("dropped more instances than were created"),
        );
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn tracker_counts_creations_and_drops() {
        let tracker = DropTracker::new();

        let first = tracker.track(1);
        let second = tracker.track(2);
        assert_eq!(tracker.created(), 2);
        assert_eq!(tracker.live(), 2);

        let copy = first.clone();
        assert_eq!(tracker.created(), 3);
        assert_eq!(copy.value(), 1);

        drop(first);
        drop(second);
        drop(copy);
        assert_eq!(tracker.dropped(), 3);
        assert_eq!(tracker.live(), 0);
    }

    #[test]
    fn tracked_equality_ignores_tracker_identity() {
        let a = DropTracker::new();
        let b = DropTracker::new();

        assert_eq!(a.track(7), b.track(7));
        assert_ne!(a.track(7), b.track(8));
    }

    #[test]
    fn clone_budget_allows_exactly_the_configured_count() {
        let tracker = DropTracker::new();
        let budget = CloneBudget::new(2);
        let original = FailingClone::new(tracker.track(9), &budget);

        let first = original.clone();
        let second = original.clone();
        assert_eq!(budget.remaining(), 0);
        assert_eq!(first.value(), 9);
        assert_eq!(second.value(), 9);
    }

    #[test]
    #[should_panic(expected = "clone budget exhausted")]
    fn clone_beyond_budget_panics() {
        let tracker = DropTracker::new();
        let budget = CloneBudget::new(0);
        let original = FailingClone::new(tracker.track(1), &budget);

        let _copy = original.clone();
    }

    #[test]
    fn failing_default_counts_live_instances() {
        FailingDefault::disarm();
        assert_eq!(FailingDefault::live(), 0);

        let one = FailingDefault::default();
        let two = FailingDefault::default();
        assert_eq!(FailingDefault::live(), 2);

        drop(one);
        drop(two);
        assert_eq!(FailingDefault::live(), 0);
    }

    #[test]
    fn armed_default_panics_when_budget_runs_out() {
        FailingDefault::arm(1);

        let one = FailingDefault::default();

        let result = std::panic::catch_unwind(FailingDefault::default);
        result.expect_err("construction past the budget must panic");

        drop(one);
        FailingDefault::disarm();
        assert_eq!(FailingDefault::live(), 0);
    }
}
