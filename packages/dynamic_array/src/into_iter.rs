use std::iter::FusedIterator;
use std::{fmt, ptr, slice};

use crate::{DynamicArray, RawBuffer};

/// By-value iterator over the elements of a [`DynamicArray`].
///
/// The iterator takes over the array's storage without moving any element; each call
/// to [`next()`](Iterator::next) or [`next_back()`](DoubleEndedIterator::next_back)
/// reads one value out of its slot. Elements never yielded are dropped together with
/// the iterator, and the storage is released afterwards.
///
/// # Example
///
/// ```rust
/// use dynamic_array::DynamicArray;
///
/// let array: DynamicArray<_> = [1, 2, 3].into_iter().collect();
///
/// let doubled: Vec<_> = array.into_iter().map(|value| value * 2).collect();
/// assert_eq!(doubled, vec![2, 4, 6]);
/// ```
pub struct IntoIter<T> {
    /// Storage taken over from the array. Slots `[start, end)` hold the values not
    /// yet yielded; everything outside that range is vacated.
    buf: RawBuffer<T>,

    /// First slot not yet yielded from the front.
    start: usize,

    /// One past the last slot not yet yielded from the rear.
    end: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(array: DynamicArray<T>) -> Self {
        let (buf, len) = array.into_raw_parts();

        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    /// Borrows the elements not yet yielded as a slice.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let array: DynamicArray<_> = [1, 2, 3].into_iter().collect();
    ///
    /// let mut iter = array.into_iter();
    /// assert_eq!(iter.next(), Some(1));
    /// assert_eq!(iter.as_slice(), &[2, 3]);
    /// ```
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // Cannot underflow because start never exceeds end.
        let remaining = self.end.wrapping_sub(self.start);

        // SAFETY: start <= end, which is at most the capacity, so the address is
        // within the buffer (or its one-past-the-end boundary when nothing remains).
        let first = unsafe { self.buf.slot_ptr(self.start) };

        // SAFETY: [start, end) hold live values; the shared borrow of self keeps
        // them alive and unmodified for the slice's lifetime.
        unsafe { slice::from_raw_parts(first.as_ptr(), remaining) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }

        // SAFETY: start < end, which is at most the capacity, so the slot is within
        // the buffer.
        let slot = unsafe { self.buf.slot_ptr(self.start) };

        // Cannot overflow because start is strictly below end here.
        self.start = self.start.wrapping_add(1);

        // SAFETY: The slot holds a live value that the advanced range no longer
        // covers; reading it transfers ownership to the caller exactly once.
        let value = unsafe { slot.read() };

        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // Cannot underflow because start never exceeds end.
        let remaining = self.end.wrapping_sub(self.start);

        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }

        // Cannot underflow because end is strictly above start here.
        self.end = self.end.wrapping_sub(1);

        // SAFETY: end < capacity after the decrement, so the slot is within the
        // buffer.
        let slot = unsafe { self.buf.slot_ptr(self.end) };

        // SAFETY: The slot holds a live value that the shortened range no longer
        // covers; reading it transfers ownership to the caller exactly once.
        let value = unsafe { slot.read() };

        Some(value)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // Cannot underflow because start never exceeds end.
        let remaining = self.end.wrapping_sub(self.start);

        // SAFETY: start <= end, which is at most the capacity, so the address is
        // within the buffer (or its one-past-the-end boundary when nothing remains).
        let first = unsafe { self.buf.slot_ptr(self.start) };

        // SAFETY: The slots [start, end) hold live values nothing else will touch;
        // each is dropped exactly once, then the buffer releases the storage.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(first.as_ptr(), remaining));
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use std::rc::Rc;

    use testing::DropTracker;

    use super::*;

    #[test]
    fn yields_elements_in_order() {
        let array: DynamicArray<_> = [1, 2, 3].into_iter().collect();

        let values: Vec<_> = array.into_iter().collect();

        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn empty_array_yields_nothing() {
        let array = DynamicArray::<String>::new();

        assert_eq!(array.into_iter().next(), None);
    }

    #[test]
    fn next_back_consumes_from_the_rear() {
        let array: DynamicArray<_> = [1, 2, 3].into_iter().collect();

        let reversed: Vec<_> = array.into_iter().rev().collect();

        assert_eq!(reversed, vec![3, 2, 1]);
    }

    #[test]
    fn alternating_ends_meet_in_the_middle() {
        let array: DynamicArray<_> = (1..=4).collect();
        let mut iter = array.into_iter();

        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next_back(), Some(4));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn size_hint_and_len_track_the_remaining_count() {
        let array: DynamicArray<_> = (1..=3).collect();
        let mut iter = array.into_iter();

        assert_eq!(iter.size_hint(), (3, Some(3)));
        assert_eq!(iter.len(), 3);

        _ = iter.next();
        assert_eq!(iter.len(), 2);

        _ = iter.next_back();
        assert_eq!(iter.len(), 1);
    }

    #[test]
    fn exhausted_iterator_stays_exhausted() {
        let array: DynamicArray<_> = (1..=2).collect();
        let mut iter = array.into_iter();

        assert_eq!(iter.next(), Some(1));
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn as_slice_views_the_remaining_elements() {
        let array: DynamicArray<_> = (1..=4).collect();
        let mut iter = array.into_iter();

        assert_eq!(iter.as_slice(), &[1, 2, 3, 4]);

        _ = iter.next();
        _ = iter.next_back();

        assert_eq!(iter.as_slice(), &[2, 3]);
    }

    #[test]
    fn debug_shows_the_remaining_elements() {
        let array: DynamicArray<_> = (1..=3).collect();
        let mut iter = array.into_iter();
        _ = iter.next();

        assert_eq!(format!("{iter:?}"), "IntoIter([2, 3])");
    }

    #[test]
    fn dropping_midway_drops_the_unyielded_elements() {
        let tracker = DropTracker::new();

        let mut array = DynamicArray::new();
        for value in 0..4 {
            array.push(tracker.track(value));
        }

        let mut iter = array.into_iter();
        let yielded = iter.next().unwrap();
        assert_eq!(yielded.value(), 0);

        drop(iter);
        drop(yielded);

        assert_eq!(tracker.created(), 4);
        assert_eq!(tracker.dropped(), 4);
    }

    #[test]
    fn zero_sized_elements_iterate_by_count() {
        let mut array = DynamicArray::new();
        for _ in 0..3 {
            array.push(());
        }

        assert_eq!(array.into_iter().count(), 3);
    }

    static_assertions::assert_impl_all!(IntoIter<u32>: Send, Sync);
    static_assertions::assert_not_impl_any!(IntoIter<Rc<u8>>: Send, Sync);
}
