use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::{fmt, mem, ptr, slice};

use crate::{IntoIter, RawBuffer};

/// A growable contiguous array built directly on raw storage.
///
/// The array owns one [`RawBuffer`] plus a count of live elements. Slots below the
/// count hold constructed values; slots between the count and the capacity are
/// uninitialized storage waiting to be used. Every operation maintains that split
/// exactly, including when element code panics partway through.
///
/// # Key Features
///
/// - **Contiguous storage**: Elements live in one block, exposed as a slice via
///   [`std::ops::Deref`], so the whole slice API (indexing, `get`, `first`, `last`,
///   iterators, sorting) applies directly
/// - **Amortized appends**: Capacity doubles when an append finds the buffer full,
///   so long push sequences cost linear time in total
/// - **Move-based growth**: Growing relocates elements bitwise; element code such as
///   `Clone` never runs during relocation, and move-only element types are fully
///   supported
/// - **Exact reservation**: [`reserve()`](Self::reserve) allocates precisely the
///   requested total capacity, never more
/// - **Positional operations**: [`insert()`](Self::insert) and
///   [`remove()`](Self::remove) shift the tail by one slot;
///   [`push_with()`](Self::push_with) and [`insert_with()`](Self::insert_with)
///   construct the element in place from a closure
/// - **Panic safety**: Operations that run element code specify what survives a
///   panic; growth paths leave the array untouched, in-place assignment keeps the
///   array valid and destructible
///
/// Capacity never shrinks. [`truncate()`](Self::truncate) and
/// [`clear()`](Self::clear) destroy elements but keep the storage for reuse.
///
/// Swapping two arrays is [`std::mem::swap`]; moving an array out of a binding while
/// leaving an empty one behind is [`std::mem::take`]. Both are constant-time and
/// touch no element state.
///
/// # Examples
///
/// ```rust
/// use dynamic_array::DynamicArray;
///
/// let mut numbers = DynamicArray::new();
/// numbers.push(10);
/// numbers.push(20);
/// numbers.push(30);
///
/// assert_eq!(numbers.len(), 3);
/// assert_eq!(numbers[1], 20);
///
/// numbers.insert(1, 15);
/// assert_eq!(numbers.as_slice(), &[10, 15, 20, 30]);
///
/// assert_eq!(numbers.remove(0), Some(10));
/// assert_eq!(numbers.pop(), Some(30));
/// assert_eq!(numbers.as_slice(), &[15, 20]);
/// ```
///
/// The `_with` variants construct the element directly in its final slot:
///
/// ```rust
/// use dynamic_array::DynamicArray;
///
/// let mut labels = DynamicArray::new();
/// let label = labels.push_with(|| String::from("first"));
/// label.push_str(" entry");
///
/// assert_eq!(labels[0], "first entry");
/// ```
///
/// # Thread Safety
///
/// The array is thread-mobile ([`Send`]) and shareable for reads ([`Sync`]) exactly
/// when the element type is. All mutation goes through `&mut self`, so concurrent
/// modification is ruled out by the borrow checker rather than by locks.
pub struct DynamicArray<T> {
    /// Storage for the elements. Slots `[0, len)` hold live values; the rest of the
    /// block is uninitialized.
    buf: RawBuffer<T>,

    /// Number of live elements. Never exceeds the buffer capacity.
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array without allocating.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let array = DynamicArray::<String>::new();
    /// assert!(array.is_empty());
    /// assert_eq!(array.capacity(), 0);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Creates an empty array with storage for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let array = DynamicArray::<u64>::with_capacity(8);
    /// assert!(array.is_empty());
    /// assert_eq!(array.capacity(), 8);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawBuffer::with_capacity(capacity),
            len: 0,
        }
    }

    /// Creates an array of `len` default-constructed elements.
    ///
    /// The storage is sized for exactly `len` elements. If one of the constructions
    /// panics, every element built so far is dropped before the panic continues.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated or if `T::default()` panics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let zeroes = DynamicArray::<u32>::with_len(4);
    /// assert_eq!(zeroes.as_slice(), &[0, 0, 0, 0]);
    /// ```
    #[must_use]
    pub fn with_len(len: usize) -> Self
    where
        T: Default,
    {
        let mut array = Self::with_capacity(len);
        array.append_defaults(len);
        array
    }

    /// Number of live elements in the array.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the array can hold without reallocating.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Grows the storage to exactly `min_capacity` total slots.
    ///
    /// Does nothing when the current capacity is already sufficient. Note that the
    /// argument is the desired **total** capacity, not an additional amount on top of
    /// the current length; this differs from [`Vec::reserve`].
    ///
    /// Growing relocates the live elements bitwise into the new storage. Element code
    /// never runs, so reservation cannot be interrupted by a panicking element type.
    /// Capacity never shrinks.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    /// array.push(1);
    ///
    /// array.reserve(10);
    /// assert_eq!(array.capacity(), 10);
    ///
    /// // Already satisfied, so this does nothing.
    /// array.reserve(5);
    /// assert_eq!(array.capacity(), 10);
    /// ```
    pub fn reserve(&mut self, min_capacity: usize) {
        if min_capacity <= self.buf.capacity() {
            return;
        }

        let mut new_buf = RawBuffer::with_capacity(min_capacity);

        // SAFETY: [0, len) are live in our buffer; the fresh buffer has capacity for
        // at least len elements and its slots are uninitialized.
        unsafe { self.relocate_into(0, &mut new_buf, 0, self.len) };

        self.buf.swap(&mut new_buf);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Resizes the array to exactly `new_len` elements.
    ///
    /// Growing default-constructs the new tail, first extending the storage to
    /// exactly `new_len` slots if needed. Shrinking drops the surplus elements in
    /// place and keeps the capacity.
    ///
    /// If a `T::default()` call panics partway through growth, the elements built so
    /// far are dropped and the length keeps its previous value; storage growth that
    /// already happened is retained.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated or if `T::default()` panics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    /// array.push(7);
    ///
    /// array.resize(3);
    /// assert_eq!(array.as_slice(), &[7, 0, 0]);
    ///
    /// array.resize(1);
    /// assert_eq!(array.as_slice(), &[7]);
    /// ```
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }

        self.reserve(new_len);

        // Cannot underflow because new_len exceeds len on this path.
        let additional = new_len.wrapping_sub(self.len);
        self.append_defaults(additional);

        #[cfg(debug_assertions)]
        self.integrity_check();
    }

    /// Drops every element past the first `new_len`, keeping the capacity.
    ///
    /// Does nothing when `new_len` is at or beyond the current length.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array: DynamicArray<_> = (1..=5).collect();
    /// array.truncate(2);
    ///
    /// assert_eq!(array.as_slice(), &[1, 2]);
    /// assert!(array.capacity() >= 5);
    /// ```
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }

        // Cannot underflow because new_len is below len here.
        let removed = self.len.wrapping_sub(new_len);

        // SAFETY: new_len < len <= capacity, so the slot is within the buffer.
        let tail_start = unsafe { self.buf.slot_ptr(new_len) };

        // Shorten the live range before dropping so a panicking element drop cannot
        // leave an already-dropped value inside it.
        self.len = new_len;

        // SAFETY: The removed slots hold live values that the live range no longer
        // covers; each is dropped exactly once.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(tail_start.as_ptr(), removed));
        }
    }

    /// Drops every element, keeping the capacity.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array: DynamicArray<_> = (1..=3).collect();
    /// array.clear();
    ///
    /// assert!(array.is_empty());
    /// assert_eq!(array.capacity(), 3);
    /// ```
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Appends an element, doubling the capacity if the buffer is full.
    ///
    /// # Panics
    ///
    /// Panics if grown storage cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    /// array.push(1);
    /// array.push(2);
    ///
    /// assert_eq!(array.as_slice(), &[1, 2]);
    /// ```
    #[inline]
    pub fn push(&mut self, value: T) {
        self.push_with(move || value);
    }

    /// Appends an element constructed by `make`, returning a reference to it.
    ///
    /// When the buffer is full, the doubled buffer is allocated and the new element
    /// is constructed into its final slot **before** any existing element relocates.
    /// A panicking constructor therefore leaves the array completely untouched; only
    /// the fresh, element-free storage is released during unwind. Below capacity the
    /// constructor runs before the length changes, with the same outcome.
    ///
    /// # Panics
    ///
    /// Panics if grown storage cannot be allocated or if `make` panics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    /// let text = array.push_with(|| "abc".to_string());
    /// text.make_ascii_uppercase();
    ///
    /// assert_eq!(array[0], "ABC");
    /// ```
    pub fn push_with(&mut self, make: impl FnOnce() -> T) -> &mut T {
        let index = self.len;

        if index == self.buf.capacity() {
            let mut new_buf = RawBuffer::with_capacity(self.grown_capacity());
            debug_assert!(
                index < new_buf.capacity(),
                "grown capacity (is {capacity}) must exceed the current length (is {index})",
                capacity = new_buf.capacity()
            );

            // SAFETY: index < grown capacity, so the slot is a valid vacant slot of
            // the fresh buffer.
            let slot = unsafe { new_buf.slot_ptr(index) };

            // Construct before relocating anything. If make() panics here, the array
            // has not changed and only the fresh storage is released.
            // SAFETY: The slot is uninitialized storage reserved for exactly one T.
            unsafe { slot.write(make()) };

            // SAFETY: [0, len) are live in our buffer; the destination slots [0, len)
            // of the fresh buffer are uninitialized.
            unsafe { self.relocate_into(0, &mut new_buf, 0, index) };

            self.buf.swap(&mut new_buf);
        } else {
            // SAFETY: len < capacity, so the trailing slot is within the buffer.
            let slot = unsafe { self.buf.slot_ptr(index) };

            // SAFETY: The slot is vacant storage; if make() panics the length is
            // still unchanged and the array is untouched.
            unsafe { slot.write(make()) };
        }

        // Cannot overflow because index is strictly below the (grown) capacity,
        // which is at most usize::MAX.
        self.len = index.wrapping_add(1);

        #[cfg(debug_assertions)]
        self.integrity_check();

        // SAFETY: The slot now holds a live value inside the live range.
        let mut slot = unsafe { self.buf.slot_ptr(index) };

        // SAFETY: We hold the exclusive reference to the array, so no other
        // reference observes the slot for the lifetime of the returned borrow.
        unsafe { slot.as_mut() }
    }

    /// Removes and returns the last element, or `None` if the array is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array: DynamicArray<_> = (1..=2).collect();
    ///
    /// assert_eq!(array.pop(), Some(2));
    /// assert_eq!(array.pop(), Some(1));
    /// assert_eq!(array.pop(), None);
    /// ```
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        // Cannot underflow because len is non-zero.
        self.len = self.len.wrapping_sub(1);

        // SAFETY: The shortened live range makes this the first vacated slot, which
        // is within the buffer.
        let slot = unsafe { self.buf.slot_ptr(self.len) };

        // SAFETY: The slot holds a live value that the live range no longer covers;
        // reading it transfers ownership to the caller exactly once.
        let value = unsafe { slot.read() };

        Some(value)
    }

    /// Inserts an element at `index`, shifting everything from `index` onward one
    /// slot to the right. Returns a reference to the inserted element.
    ///
    /// Inserting at `index == len` appends without shifting anything.
    ///
    /// # Panics
    ///
    /// Panics if `index > len` or if grown storage cannot be allocated.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array: DynamicArray<_> = [10, 30].into_iter().collect();
    /// array.insert(1, 20);
    ///
    /// assert_eq!(array.as_slice(), &[10, 20, 30]);
    /// ```
    #[inline]
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.insert_with(index, move || value)
    }

    /// Inserts an element constructed by `make` at `index`, shifting everything from
    /// `index` onward one slot to the right. Returns a reference to the new element.
    ///
    /// The constructor runs before any element moves: when the buffer is full the
    /// element is built into its final slot of the doubled buffer and the neighbors
    /// relocate around it afterwards; below capacity the value is built first and the
    /// tail shifts after. Either way, a panicking constructor leaves the array
    /// untouched.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`, if grown storage cannot be allocated, or if `make`
    /// panics.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array: DynamicArray<_> = ["a", "c"].into_iter().collect();
    /// array.insert_with(1, || "b");
    ///
    /// assert_eq!(array.as_slice(), &["a", "b", "c"]);
    /// ```
    pub fn insert_with(&mut self, index: usize, make: impl FnOnce() -> T) -> &mut T {
        assert!(
            index <= self.len,
            "insert index (is {index}) must not exceed length (is {len})",
            len = self.len
        );

        if self.len == self.buf.capacity() {
            self.insert_at_capacity(index, make);
        } else {
            self.insert_below_capacity(index, make);
        }

        #[cfg(debug_assertions)]
        self.integrity_check();

        // SAFETY: The slot now holds the just-inserted value inside the live range.
        let mut slot = unsafe { self.buf.slot_ptr(index) };

        // SAFETY: We hold the exclusive reference to the array, so no other
        // reference observes the slot for the lifetime of the returned borrow.
        unsafe { slot.as_mut() }
    }

    /// Removes and returns the element at `index`, shifting everything after it one
    /// slot to the left.
    ///
    /// Returns `None` without changing anything when `index` is out of range, which
    /// includes every call on an empty array. After a successful removal, `index`
    /// addresses the element that used to follow the removed one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::DynamicArray;
    ///
    /// let mut array: DynamicArray<_> = [10, 20, 30].into_iter().collect();
    ///
    /// assert_eq!(array.remove(1), Some(20));
    /// assert_eq!(array.as_slice(), &[10, 30]);
    /// assert_eq!(array.remove(5), None);
    /// ```
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }

        // SAFETY: index < len, so the slot holds a live value.
        let slot = unsafe { self.buf.slot_ptr(index) };

        // SAFETY: Reading transfers the value out; the slot is treated as vacated
        // until the shift below refills it.
        let value = unsafe { slot.read() };

        // Cannot underflow because index < len.
        let tail = self.len.wrapping_sub(index).wrapping_sub(1);

        // SAFETY: index + 1 <= len <= capacity, so the address is within the buffer
        // (or on its one-past-the-end boundary when the tail is empty).
        let after = unsafe { slot.add(1) };

        // SAFETY: The tail slots [index + 1, len) hold live values; shifting them one
        // slot left stays within the buffer, and ptr::copy permits the overlap. The
        // bitwise duplicate left in the last slot falls outside the shortened live
        // range below.
        unsafe { ptr::copy(after.as_ptr(), slot.as_ptr(), tail) };

        // Cannot underflow because len is non-zero when index < len.
        self.len = self.len.wrapping_sub(1);

        Some(value)
    }

    /// Borrows the live elements as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: [0, len) hold live values and the pointer is valid for len reads;
        // the shared borrow of self keeps the storage alive and unmodified.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Borrows the live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: [0, len) hold live values; the exclusive borrow of self makes this
        // the only access path for the slice's lifetime.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Pointer to the first slot of the storage.
    ///
    /// Dangling (well-aligned, not backed by an allocation) when the capacity is
    /// zero or `T` is zero-sized.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Mutable pointer to the first slot of the storage.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Iterates over the elements front to back.
    ///
    /// The iterator is double-ended and exact-size, like every slice iterator.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates over the elements front to back with mutable access.
    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Decomposes the array into its buffer and length without dropping anything.
    pub(crate) fn into_raw_parts(self) -> (RawBuffer<T>, usize) {
        let mut this = ManuallyDrop::new(self);
        let buf = mem::take(&mut this.buf);
        let len = this.len;
        (buf, len)
    }

    /// Capacity to allocate when an append or insert finds the buffer full.
    ///
    /// # Panics
    ///
    /// Panics if the doubled capacity does not fit in `usize`, which requires more
    /// live zero-sized elements than any program can construct.
    fn grown_capacity(&self) -> usize {
        let capacity = self.buf.capacity();

        if capacity == 0 {
            1
        } else {
            capacity
                .checked_mul(2)
                .expect("capacity cannot double beyond usize::MAX")
        }
    }

    /// Relocates `count` live elements from this array's buffer into vacant slots of
    /// another buffer, without running any element code.
    ///
    /// The source slots become vacated storage; the caller takes over the length
    /// bookkeeping on both sides.
    ///
    /// # Safety
    ///
    /// `src_index + count` must not exceed the live range, `dst_index + count` must
    /// not exceed the destination capacity, the destination slots must be
    /// uninitialized, and `dst` must be a different buffer than this array's own.
    unsafe fn relocate_into(
        &self,
        src_index: usize,
        dst: &mut RawBuffer<T>,
        dst_index: usize,
        count: usize,
    ) {
        // SAFETY: The caller guarantees src_index + count stays within the live
        // range, so the start address is within the buffer.
        let src = unsafe { self.buf.slot_ptr(src_index) };

        // SAFETY: The caller guarantees dst_index + count stays within the
        // destination capacity.
        let dst_slot = unsafe { dst.slot_ptr(dst_index) };

        // SAFETY: Source and destination are distinct allocations (caller contract),
        // the source slots hold live values being moved out, and the destination
        // slots are uninitialized storage for the same element type.
        unsafe { ptr::copy_nonoverlapping(src.as_ptr(), dst_slot.as_ptr(), count) };
    }

    /// Constructs `additional` default elements onto the end of the live range.
    ///
    /// The caller must have reserved capacity. If a construction panics, the
    /// elements built by this call are dropped and the length stays unchanged.
    fn append_defaults(&mut self, additional: usize)
    where
        T: Default,
    {
        // Cannot underflow because the live range never exceeds capacity.
        let free_slots = self.buf.capacity().wrapping_sub(self.len);
        debug_assert!(
            additional <= free_slots,
            "appending {additional} defaults requires more than the {free_slots} free slots"
        );

        // SAFETY: len <= capacity, so this addresses the first vacant slot (or the
        // one-past-the-end boundary when there is none to fill).
        let start = unsafe { self.buf.slot_ptr(self.len) };

        let mut guard = TailGuard {
            start: start.as_ptr(),
            initialized: 0,
        };

        for offset in 0..additional {
            let value = T::default();

            // SAFETY: offset < additional, which fits in the free slots checked
            // above, so the slot is vacant storage within capacity.
            let slot = unsafe { guard.start.add(offset) };

            // SAFETY: The slot is uninitialized and receives exactly one value.
            unsafe { slot.write(value) };

            // Cannot overflow because offset is strictly below additional.
            guard.initialized = offset.wrapping_add(1);
        }

        mem::forget(guard);

        // Cannot overflow because len + additional is bounded by capacity.
        self.len = self.len.wrapping_add(additional);
    }

    /// Clones every element of `source` onto the end of the live range.
    ///
    /// The caller must have reserved capacity. If a clone panics, the clones made by
    /// this call are dropped and the length stays unchanged.
    fn append_clones(&mut self, source: &[T])
    where
        T: Clone,
    {
        // Cannot underflow because the live range never exceeds capacity.
        let free_slots = self.buf.capacity().wrapping_sub(self.len);
        debug_assert!(
            source.len() <= free_slots,
            "appending {count} clones requires more than the {free_slots} free slots",
            count = source.len()
        );

        // SAFETY: len <= capacity, so this addresses the first vacant slot (or the
        // one-past-the-end boundary when there is none to fill).
        let start = unsafe { self.buf.slot_ptr(self.len) };

        let mut guard = TailGuard {
            start: start.as_ptr(),
            initialized: 0,
        };

        for (offset, value) in source.iter().enumerate() {
            let cloned = value.clone();

            // SAFETY: offset < source.len(), which fits in the free slots checked
            // above, so the slot is vacant storage within capacity.
            let slot = unsafe { guard.start.add(offset) };

            // SAFETY: The slot is uninitialized and receives exactly one value.
            unsafe { slot.write(cloned) };

            // Cannot overflow because offset is strictly below the source length.
            guard.initialized = offset.wrapping_add(1);
        }

        mem::forget(guard);

        // Cannot overflow because len + source.len() is bounded by capacity.
        self.len = self.len.wrapping_add(source.len());
    }

    fn insert_at_capacity(&mut self, index: usize, make: impl FnOnce() -> T) {
        let mut new_buf = RawBuffer::with_capacity(self.grown_capacity());
        debug_assert!(
            self.len < new_buf.capacity(),
            "grown capacity (is {capacity}) must exceed the current length (is {len})",
            capacity = new_buf.capacity(),
            len = self.len
        );

        // SAFETY: index <= len < grown capacity, so the slot is a valid vacant slot
        // of the fresh buffer.
        let slot = unsafe { new_buf.slot_ptr(index) };

        // Construct before relocating anything. If make() panics here, the array has
        // not changed and only the fresh storage is released.
        // SAFETY: The slot is uninitialized storage reserved for exactly one T.
        unsafe { slot.write(make()) };

        // SAFETY: [0, index) are live in our buffer; the destination slots [0, index)
        // of the fresh buffer are uninitialized.
        unsafe { self.relocate_into(0, &mut new_buf, 0, index) };

        // Cannot overflow because index is at most len, which is below capacity.
        let after = index.wrapping_add(1);

        // Cannot underflow because index is at most len.
        let suffix = self.len.wrapping_sub(index);

        // SAFETY: [index, len) are live in our buffer; the destination slots
        // [index + 1, len + 1) fit in the grown capacity and are uninitialized.
        unsafe { self.relocate_into(index, &mut new_buf, after, suffix) };

        self.buf.swap(&mut new_buf);

        // Cannot overflow because the new length is bounded by the grown capacity.
        self.len = self.len.wrapping_add(1);
    }

    fn insert_below_capacity(&mut self, index: usize, make: impl FnOnce() -> T) {
        // Run the constructor before anything moves, so a panic in it cannot leave a
        // hole in the live range.
        let value = make();

        // SAFETY: index <= len <= capacity, so the slot address is within the buffer.
        let slot = unsafe { self.buf.slot_ptr(index) };

        // Cannot underflow because index is at most len.
        let tail = self.len.wrapping_sub(index);

        // SAFETY: index + 1 <= len + 1 <= capacity because the buffer is not full.
        let shifted = unsafe { slot.add(1) };

        // SAFETY: The tail slots [index, len) hold live values; the shifted range
        // ends at len + 1, within capacity, and ptr::copy permits the overlap. The
        // vacated slot keeps a bitwise duplicate until the write below replaces it.
        unsafe { ptr::copy(slot.as_ptr(), shifted.as_ptr(), tail) };

        // SAFETY: The slot's previous value now lives one slot to the right; writing
        // the new value replaces the duplicate without reading it.
        unsafe { slot.write(value) };

        // Cannot overflow because the length was strictly below capacity.
        self.len = self.len.wrapping_add(1);
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    /// Verifies the structural invariant between the live range and the storage.
    ///
    /// This method is only available in debug builds and is used for testing and validation.
    fn integrity_check(&self) {
        assert!(
            self.len <= self.buf.capacity(),
            "live element count {len} exceeds the buffer capacity {capacity}",
            len = self.len,
            capacity = self.buf.capacity()
        );
    }
}

/// Drops the constructed prefix of a partially built tail during unwind.
///
/// Operations that construct elements one by one into vacant slots hold one of these
/// while element code runs; on success the guard is forgotten and the length
/// bookkeeping takes over.
struct TailGuard<T> {
    /// First slot of the tail being constructed.
    start: *mut T,

    /// Number of elements constructed so far.
    initialized: usize,
}

impl<T> Drop for TailGuard<T> {
    fn drop(&mut self) {
        // SAFETY: The first `initialized` slots from `start` hold live values that no
        // length bookkeeping covers; each is dropped exactly once.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.initialized));
        }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: The live range holds exactly len constructed values; each is
        // dropped once, then the buffer itself releases the storage.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr(), self.len));
        }
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    /// Copies the array element by element.
    ///
    /// The copy's storage is sized for exactly the source's element count. If a
    /// clone panics partway, the elements copied so far are dropped before the panic
    /// continues; the source is never affected.
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len);
        copy.append_clones(self.as_slice());
        copy
    }

    /// Reuses the existing storage when the source fits.
    ///
    /// When the source has more elements than this array has capacity, a fresh copy
    /// replaces `self` wholesale, so a panicking clone leaves `self` untouched.
    /// Otherwise no reallocation happens: the common prefix is assigned element by
    /// element with `clone_from` (a panic there may leave those elements partially
    /// updated, but the array stays valid), then surplus elements are dropped or the
    /// source's extra elements are clone-constructed onto the tail.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.buf.capacity() {
            *self = source.clone();
            return;
        }

        for (own, other) in self.as_mut_slice().iter_mut().zip(source.as_slice()) {
            own.clone_from(other);
        }

        if source.len < self.len {
            self.truncate(source.len);
        } else {
            let (_, fresh) = source.as_slice().split_at(self.len);
            self.append_clones(fresh);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, U> PartialEq<DynamicArray<U>> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U> PartialEq<[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T> Extend<T> for DynamicArray<T> {
    /// Appends every element the iterator yields.
    ///
    /// Capacity doubles as needed, so extending stays amortized linear even without
    /// a useful size hint.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();

        let (lower_bound, _) = iter.size_hint();
        let mut array = Self::with_capacity(lower_bound);

        for value in iter {
            array.push(value);
        }

        array
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Converts the array into an iterator that yields the elements by value.
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::indexing_slicing,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn new_is_empty_without_allocation() {
        let array = DynamicArray::<u32>::new();

        assert_eq!(array.len(), 0);
        assert!(array.is_empty());
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn default_is_empty() {
        let array = DynamicArray::<String>::default();

        assert!(array.is_empty());
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn with_capacity_preallocates_without_elements() {
        let array = DynamicArray::<u32>::with_capacity(10);

        assert!(array.is_empty());
        assert_eq!(array.capacity(), 10);
    }

    #[test]
    fn with_len_default_constructs_every_slot() {
        let array = DynamicArray::<u32>::with_len(3);

        assert_eq!(array.as_slice(), &[0, 0, 0]);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn with_len_zero_is_empty() {
        let array = DynamicArray::<String>::with_len(0);

        assert!(array.is_empty());
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn push_appends_in_order() {
        let mut array = DynamicArray::new();
        array.push(1);
        array.push(2);
        array.push(3);

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn push_doubles_capacity_from_a_floor_of_one() {
        let mut array = DynamicArray::new();
        let mut observed = Vec::new();

        for value in 0..8 {
            array.push(value);
            observed.push(array.capacity());
        }

        assert_eq!(observed, vec![1, 2, 4, 4, 8, 8, 8, 8]);
    }

    #[test]
    fn push_works_with_heap_owning_elements() {
        let mut array = DynamicArray::new();
        array.push("alpha".to_string());
        array.push("beta".to_string());

        assert_eq!(array[0], "alpha");
        assert_eq!(array[1], "beta");
    }

    #[test]
    fn push_with_returns_usable_reference() {
        let mut array = DynamicArray::new();

        let value = array.push_with(|| 41);
        *value += 1;

        assert_eq!(array.as_slice(), &[42]);
    }

    #[test]
    fn pop_returns_elements_in_reverse() {
        let mut array: DynamicArray<_> = (1..=3).collect();

        assert_eq!(array.pop(), Some(3));
        assert_eq!(array.pop(), Some(2));
        assert_eq!(array.pop(), Some(1));
        assert_eq!(array.pop(), None);
    }

    #[test]
    fn pop_keeps_capacity() {
        let mut array: DynamicArray<_> = (1..=4).collect();
        let capacity = array.capacity();

        while array.pop().is_some() {}

        assert_eq!(array.capacity(), capacity);
    }

    #[test]
    fn indexing_and_slice_views_expose_elements() {
        let mut array: DynamicArray<_> = [10, 20, 30].into_iter().collect();

        assert_eq!(array[0], 10);
        assert_eq!(array.first(), Some(&10));
        assert_eq!(array.last(), Some(&30));
        assert_eq!(array.get(2), Some(&30));
        assert_eq!(array.get(3), None);

        array[1] = 25;
        assert_eq!(array.as_slice(), &[10, 25, 30]);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn indexing_past_the_end_panics() {
        let array: DynamicArray<_> = [1, 2].into_iter().collect();

        let _value = array[5];
    }

    #[test]
    fn reserve_allocates_exactly_the_requested_capacity() {
        let mut array = DynamicArray::<u32>::new();
        array.reserve(10);

        assert_eq!(array.capacity(), 10);
    }

    #[test]
    fn reserve_is_a_no_op_when_satisfied() {
        let mut array = DynamicArray::with_capacity(10);
        array.push(7_u32);
        let address_before = array.as_ptr();

        array.reserve(5);

        assert_eq!(array.capacity(), 10);
        assert_eq!(array.as_ptr(), address_before);
        assert_eq!(array.as_slice(), &[7]);
    }

    #[test]
    fn reserve_preserves_elements() {
        let mut array: DynamicArray<_> = (1..=5).collect();
        array.reserve(100);

        assert_eq!(array.capacity(), 100);
        assert_eq!(array.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn growth_after_reserve_doubles_the_reserved_capacity() {
        let mut array = DynamicArray::new();
        array.reserve(10);

        for value in 0..11 {
            array.push(value);
        }

        assert_eq!(array.capacity(), 20);
    }

    #[test]
    fn resize_grows_with_default_values() {
        let mut array = DynamicArray::new();
        array.push(7);
        array.resize(4);

        assert_eq!(array.as_slice(), &[7, 0, 0, 0]);
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    fn resize_shrinks_and_keeps_capacity() {
        let mut array: DynamicArray<_> = (1..=5).collect();
        let capacity = array.capacity();
        array.resize(2);

        assert_eq!(array.as_slice(), &[1, 2]);
        assert_eq!(array.capacity(), capacity);
    }

    #[test]
    fn resize_to_current_length_changes_nothing() {
        let mut array: DynamicArray<_> = (1..=3).collect();
        array.resize(3);

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn truncate_drops_the_tail() {
        let mut array: DynamicArray<_> = (1..=5).collect();
        array.truncate(2);

        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    fn truncate_beyond_length_is_a_no_op() {
        let mut array: DynamicArray<_> = (1..=3).collect();
        array.truncate(10);

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn clear_removes_everything_but_keeps_storage() {
        let mut array: DynamicArray<_> = (1..=3).collect();
        let capacity = array.capacity();
        array.clear();

        assert!(array.is_empty());
        assert_eq!(array.capacity(), capacity);
    }

    #[test]
    fn insert_shifts_the_tail_right() {
        let mut array: DynamicArray<_> = [1, 2, 4, 5].into_iter().collect();
        array.insert(2, 3);

        assert_eq!(array.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn insert_at_front_moves_every_element() {
        let mut array: DynamicArray<_> = [2, 3].into_iter().collect();
        array.insert(0, 1);

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn insert_at_length_appends() {
        let mut array: DynamicArray<_> = [1, 2].into_iter().collect();
        array.insert(2, 3);

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn insert_into_empty_array_works() {
        let mut array = DynamicArray::new();
        array.insert(0, 1);

        assert_eq!(array.as_slice(), &[1]);
    }

    #[test]
    fn insert_returns_reference_to_the_new_element() {
        let mut array: DynamicArray<_> = [1, 3].into_iter().collect();

        let inserted = array.insert(1, 0);
        *inserted = 2;

        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn insert_at_capacity_grows_and_preserves_order() {
        let mut array = DynamicArray::with_capacity(2);
        array.push(1);
        array.push(3);
        assert_eq!(array.len(), array.capacity());

        array.insert(1, 2);

        assert_eq!(array.as_slice(), &[1, 2, 3]);
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    #[should_panic(expected = "insert index (is 3) must not exceed length (is 2)")]
    fn insert_past_the_length_panics() {
        let mut array: DynamicArray<_> = [1, 2].into_iter().collect();

        array.insert(3, 9);
    }

    #[test]
    fn remove_shifts_the_tail_left() {
        let mut array: DynamicArray<_> = [10, 20, 30].into_iter().collect();

        assert_eq!(array.remove(1), Some(20));
        assert_eq!(array.as_slice(), &[10, 30]);
        assert_eq!(array[1], 30);
    }

    #[test]
    fn remove_out_of_range_returns_none_and_changes_nothing() {
        let mut array: DynamicArray<_> = [1, 2].into_iter().collect();

        assert_eq!(array.remove(2), None);
        assert_eq!(array.as_slice(), &[1, 2]);
    }

    #[test]
    fn remove_from_empty_array_returns_none() {
        let mut array = DynamicArray::<u32>::new();

        assert_eq!(array.remove(0), None);
        assert!(array.is_empty());
    }

    #[test]
    fn clone_copies_elements_with_capacity_equal_to_length() {
        let mut array = DynamicArray::with_capacity(10);
        array.push(1);
        array.push(2);
        array.push(3);

        let copy = array.clone();

        assert_eq!(copy, array);
        assert_eq!(copy.capacity(), 3);
        assert_eq!(array.capacity(), 10);
    }

    #[test]
    fn clone_from_reallocates_when_source_exceeds_capacity() {
        let mut target: DynamicArray<_> = [9, 9].into_iter().collect();
        let source: DynamicArray<_> = (1..=5).collect();

        target.clone_from(&source);

        assert_eq!(target, source);
        assert_eq!(target.capacity(), 5);
    }

    #[test]
    fn clone_from_shrinking_reuses_storage() {
        let mut target = DynamicArray::with_capacity(10);
        for value in 1..=5 {
            target.push(value);
        }
        let source: DynamicArray<_> = [7, 8, 9].into_iter().collect();

        target.clone_from(&source);

        assert_eq!(target.as_slice(), &[7, 8, 9]);
        assert_eq!(target.capacity(), 10);
    }

    #[test]
    fn clone_from_growing_within_capacity_reuses_storage() {
        let mut target = DynamicArray::with_capacity(10);
        target.push(1);
        target.push(2);
        let source: DynamicArray<_> = (10..=15).collect();

        target.clone_from(&source);

        assert_eq!(target, source);
        assert_eq!(target.capacity(), 10);
    }

    #[test]
    fn extend_appends_all_yielded_elements() {
        let mut array: DynamicArray<_> = [1, 2].into_iter().collect();
        array.extend([3, 4, 5]);

        assert_eq!(array.as_slice(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn from_iterator_preallocates_from_the_size_hint() {
        let array: DynamicArray<_> = vec![1, 2, 3].into_iter().collect();

        assert_eq!(array.as_slice(), &[1, 2, 3]);
        assert_eq!(array.capacity(), 3);
    }

    #[test]
    fn equality_compares_contents_across_representations() {
        let array: DynamicArray<_> = [1, 2, 3].into_iter().collect();
        let same: DynamicArray<_> = [1, 2, 3].into_iter().collect();
        let different: DynamicArray<_> = [1, 2].into_iter().collect();

        assert_eq!(array, same);
        assert_ne!(array, different);
        assert_eq!(array, [1, 2, 3]);
        assert_eq!(array, *[1, 2, 3].as_slice());
        assert_eq!(array, [1, 2, 3].as_slice());
    }

    #[test]
    fn debug_formats_as_a_list() {
        let array: DynamicArray<_> = [1, 2, 3].into_iter().collect();

        assert_eq!(format!("{array:?}"), "[1, 2, 3]");
    }

    #[test]
    fn iteration_visits_elements_in_both_directions() {
        let array: DynamicArray<_> = (1..=4).collect();

        let forward: Vec<_> = array.iter().copied().collect();
        assert_eq!(forward, vec![1, 2, 3, 4]);

        let backward: Vec<_> = array.iter().rev().copied().collect();
        assert_eq!(backward, vec![4, 3, 2, 1]);
    }

    #[test]
    fn iter_mut_allows_updating_in_place() {
        let mut array: DynamicArray<_> = (1..=3).collect();

        for value in array.iter_mut() {
            *value *= 10;
        }

        assert_eq!(array.as_slice(), &[10, 20, 30]);
    }

    #[test]
    fn for_loop_over_references_works() {
        let array: DynamicArray<_> = (1..=3).collect();
        let mut total = 0;

        for value in &array {
            total += value;
        }

        assert_eq!(total, 6);
    }

    #[test]
    fn deref_exposes_the_slice_api() {
        let mut array: DynamicArray<_> = [3, 1, 2].into_iter().collect();

        assert!(array.contains(&3));

        array.sort_unstable();
        assert_eq!(array.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn mem_take_leaves_an_empty_array_behind() {
        let mut array: DynamicArray<_> = (1..=3).collect();

        let taken = mem::take(&mut array);

        assert_eq!(taken.as_slice(), &[1, 2, 3]);
        assert!(array.is_empty());
        assert_eq!(array.capacity(), 0);
    }

    #[test]
    fn mem_swap_exchanges_contents_in_constant_time() {
        let mut a: DynamicArray<_> = (1..=2).collect();
        let mut b: DynamicArray<_> = (10..=13).collect();

        mem::swap(&mut a, &mut b);

        assert_eq!(a.as_slice(), &[10, 11, 12, 13]);
        assert_eq!(b.as_slice(), &[1, 2]);
    }

    #[test]
    fn zero_sized_elements_are_fully_supported() {
        let mut array = DynamicArray::new();

        for _ in 0..5 {
            array.push(());
        }

        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 8);
        assert_eq!(array.iter().count(), 5);

        assert_eq!(array.pop(), Some(()));
        assert_eq!(array.remove(0), Some(()));
        assert_eq!(array.len(), 3);
    }

    #[test]
    fn zero_sized_elements_support_positional_operations() {
        let mut array = DynamicArray::with_capacity(2);
        array.push(());
        array.push(());

        array.insert(1, ());
        assert_eq!(array.len(), 3);
        assert_eq!(array.capacity(), 4);
    }

    static_assertions::assert_impl_all!(DynamicArray<u32>: Send, Sync);
    static_assertions::assert_not_impl_any!(DynamicArray<Rc<u8>>: Send, Sync);
    static_assertions::assert_not_impl_any!(DynamicArray<u32>: Copy);
}
