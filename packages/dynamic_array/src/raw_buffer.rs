use std::alloc::{Layout, alloc, dealloc};
use std::mem;
use std::ptr::NonNull;

/// Owns a block of raw memory sized for a fixed number of elements of `T`.
///
/// The buffer is pure storage: it allocates on creation and releases on drop, but it
/// never constructs or destroys elements. Whoever places values into the slots is
/// responsible for destroying them before the buffer goes away; dropping the buffer
/// runs no element destructors.
///
/// The type is move-only. Duplicating it would duplicate release responsibility for
/// the same allocation, so it implements neither [`Clone`] nor [`Copy`]. Ownership
/// changes hands through Rust moves or [`swap()`](Self::swap).
///
/// Zero capacity and zero-sized element types occupy no memory at all; the buffer
/// then carries a well-aligned dangling pointer and the requested capacity, keeping
/// the caller's bookkeeping uniform.
#[derive(Debug)]
pub struct RawBuffer<T> {
    /// Start of the allocated block, or the aligned dangling sentinel when nothing
    /// is allocated. Points at storage, never at values the buffer knows about.
    ptr: NonNull<T>,

    /// Number of element slots the block is sized for. Slots are storage only; how
    /// many of them hold live values is the owner's business.
    capacity: usize,
}

impl<T> RawBuffer<T> {
    /// Creates a buffer with no allocation and zero capacity.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::RawBuffer;
    ///
    /// let buffer = RawBuffer::<u64>::new();
    /// assert_eq!(buffer.capacity(), 0);
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
        }
    }

    /// Allocates a buffer sized for exactly `capacity` elements.
    ///
    /// The slots start out as uninitialized storage. Requesting zero capacity, or any
    /// capacity of a zero-sized element type, performs no allocation.
    ///
    /// # Panics
    ///
    /// Panics if the required layout overflows or if the allocator fails to provide
    /// the memory.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynamic_array::RawBuffer;
    ///
    /// let buffer = RawBuffer::<u64>::with_capacity(16);
    /// assert_eq!(buffer.capacity(), 16);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 || size_of::<T>() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                capacity,
            };
        }

        let layout = Layout::array::<T>(capacity)
            .expect("buffer layout calculation cannot overflow for reasonable capacity values");

        // SAFETY: The layout has non-zero size because both capacity and the element
        // size are non-zero on this path.
        let ptr = NonNull::new(unsafe { alloc(layout) })
            .expect("we do not intend to handle allocation failure as a real possibility - OOM results in panic")
            .cast::<T>();

        Self { ptr, capacity }
    }

    /// Number of element slots the buffer is sized for.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to the start of the block.
    ///
    /// The pointer is dangling (well-aligned but not backed by an allocation) when
    /// the capacity is zero or `T` is zero-sized.
    #[inline]
    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to the start of the block.
    #[inline]
    #[must_use]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of the slot at `index`.
    ///
    /// The one-past-the-end address (`index == capacity`) is valid for arithmetic but
    /// must never be read from or written to.
    ///
    /// # Safety
    ///
    /// `index` must not exceed the capacity. Writing through the returned pointer
    /// additionally requires that no other reference observes the slot.
    #[inline]
    #[must_use]
    pub unsafe fn slot_ptr(&self, index: usize) -> NonNull<T> {
        debug_assert!(
            index <= self.capacity,
            "slot index (is {index}) must not exceed capacity (is {capacity})",
            capacity = self.capacity
        );

        // SAFETY: The caller guarantees index <= capacity, so the offset stays within
        // the allocated block (or on its one-past-the-end boundary).
        unsafe { self.ptr.add(index) }
    }

    /// Exchanges the allocations of two buffers in constant time.
    ///
    /// Only ownership of the blocks and the recorded capacities move; element state
    /// inside the slots is untouched.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if self.capacity == 0 || size_of::<T>() == 0 {
            return;
        }

        let layout = Layout::array::<T>(self.capacity)
            .expect("layout was already computed successfully when the buffer was allocated");

        // SAFETY: The block was allocated in with_capacity() with this exact layout
        // and has not been released yet; after this the pointer is never used again.
        unsafe {
            dealloc(self.ptr.as_ptr().cast(), layout);
        }
    }
}

// SAFETY: The buffer owns its allocation exclusively and the pointer refers to
// storage, not to shared state. Sending the buffer to another thread sends storage
// for values of T, which is safe whenever T itself may be sent.
unsafe impl<T: Send> Send for RawBuffer<T> {}

// SAFETY: Shared references expose only the capacity and raw addresses; the buffer
// never reads or writes element state through them.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

#[cfg(test)]
#[allow(
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    reason = "test code doesn't need the same safety rigor as production code"
)]
mod tests {
    use std::rc::Rc;

    use super::*;

    #[test]
    fn new_has_zero_capacity_and_dangling_pointer() {
        let buffer = RawBuffer::<u32>::new();

        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.as_ptr(), NonNull::<u32>::dangling().as_ptr());
    }

    #[test]
    fn default_is_empty() {
        let buffer = RawBuffer::<String>::default();

        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn with_capacity_records_requested_capacity() {
        let buffer = RawBuffer::<u64>::with_capacity(7);

        assert_eq!(buffer.capacity(), 7);
    }

    #[test]
    fn with_capacity_zero_does_not_allocate() {
        let buffer = RawBuffer::<u64>::with_capacity(0);

        assert_eq!(buffer.capacity(), 0);
        assert_eq!(buffer.as_ptr(), NonNull::<u64>::dangling().as_ptr());
    }

    #[test]
    fn zero_sized_elements_never_allocate() {
        let buffer = RawBuffer::<()>::with_capacity(1000);

        assert_eq!(buffer.capacity(), 1000);
        assert_eq!(buffer.as_ptr(), NonNull::<()>::dangling().as_ptr());
    }

    #[test]
    fn slots_hold_written_values() {
        let buffer = RawBuffer::<u64>::with_capacity(4);

        for (index, value) in [10_u64, 20, 30, 40].into_iter().enumerate() {
            unsafe {
                buffer.slot_ptr(index).write(value);
            }
        }

        for (index, expected) in [10_u64, 20, 30, 40].into_iter().enumerate() {
            let value = unsafe { buffer.slot_ptr(index).read() };
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn slot_ptr_allows_one_past_the_end_address() {
        let buffer = RawBuffer::<u8>::with_capacity(3);

        let end = unsafe { buffer.slot_ptr(3) };
        assert_eq!(end.as_ptr(), unsafe { buffer.as_ptr().add(3).cast_mut() });
    }

    #[test]
    fn swap_exchanges_blocks_and_capacities() {
        let mut a = RawBuffer::<u32>::with_capacity(2);
        let mut b = RawBuffer::<u32>::with_capacity(5);

        unsafe {
            a.slot_ptr(0).write(11);
            b.slot_ptr(0).write(22);
        }

        a.swap(&mut b);

        assert_eq!(a.capacity(), 5);
        assert_eq!(b.capacity(), 2);
        unsafe {
            assert_eq!(a.slot_ptr(0).read(), 22);
            assert_eq!(b.slot_ptr(0).read(), 11);
        }
    }

    #[test]
    fn moving_transfers_the_allocation() {
        let buffer = RawBuffer::<u32>::with_capacity(1);
        unsafe {
            buffer.slot_ptr(0).write(99);
        }

        let moved = buffer;

        assert_eq!(moved.capacity(), 1);
        assert_eq!(unsafe { moved.slot_ptr(0).read() }, 99);
    }

    static_assertions::assert_not_impl_any!(RawBuffer<u32>: Clone, Copy);
    static_assertions::assert_impl_all!(RawBuffer<u32>: Send, Sync);
    static_assertions::assert_not_impl_any!(RawBuffer<Rc<u8>>: Send, Sync);
}
