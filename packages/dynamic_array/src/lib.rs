//! A growable contiguous array built directly on raw, untyped storage.
//!
//! This crate provides [`DynamicArray`], a sequence container that keeps its elements
//! in one contiguous allocation and grows by doubling, and [`RawBuffer`], the
//! allocation primitive underneath it that owns capacity without knowing which slots
//! hold live values. The split mirrors how such containers are built from first
//! principles: the buffer manages memory, the array manages element lifetimes.
//!
//! # Key Features
//!
//! - **Contiguous storage**: Elements form a single slice, available through
//!   [`std::ops::Deref`], so the entire slice API applies directly
//! - **Exact reservation**: [`DynamicArray::reserve()`] allocates precisely the
//!   requested total capacity; doubling happens only when an append or insert finds
//!   the buffer full
//! - **Move-based growth**: Relocation to grown storage is a bitwise move, so element
//!   code never runs during growth and move-only element types are fully supported
//! - **In-place construction**: [`DynamicArray::push_with()`] and
//!   [`DynamicArray::insert_with()`] build the element directly in its final slot
//!   from a closure
//! - **Positional operations**: Insert and remove at any index, shifting the tail by
//!   one slot
//! - **Panic safety**: Growth paths leave the array untouched when element code
//!   panics; partially built tails are dropped before a panic continues
//! - **Zero-sized element support**: Arrays of zero-sized types never allocate while
//!   keeping full length and capacity bookkeeping
//!
//! # Storage Model
//!
//! A [`RawBuffer`] owns a block of uninitialized slots and nothing else; it never
//! constructs or drops elements. A [`DynamicArray`] pairs one buffer with a count of
//! live elements: slots below the count are constructed, slots above it are spare
//! capacity. Destruction runs element drops for exactly the live range and then
//! releases the block.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```rust
//! use dynamic_array::DynamicArray;
//!
//! let mut numbers = DynamicArray::new();
//! numbers.push(10);
//! numbers.push(20);
//! numbers.push(30);
//!
//! // The whole slice API is available through Deref.
//! assert_eq!(numbers.len(), 3);
//! assert_eq!(numbers[0], 10);
//! assert_eq!(numbers.iter().sum::<i32>(), 60);
//!
//! assert_eq!(numbers.pop(), Some(30));
//! ```
//!
//! ## Positional Insert and Remove
//!
//! ```rust
//! use dynamic_array::DynamicArray;
//!
//! let mut letters: DynamicArray<_> = ["a", "c", "d"].into_iter().collect();
//!
//! letters.insert(1, "b");
//! assert_eq!(letters.as_slice(), &["a", "b", "c", "d"]);
//!
//! assert_eq!(letters.remove(2), Some("c"));
//! assert_eq!(letters.as_slice(), &["a", "b", "d"]);
//! ```
//!
//! ## Reserving and Reusing Storage
//!
//! ```rust
//! use dynamic_array::DynamicArray;
//!
//! let mut log = DynamicArray::with_capacity(4);
//!
//! for round in 0..3 {
//!     for step in 0..4 {
//!         log.push((round, step));
//!     }
//!
//!     // Clearing drops the entries but keeps the storage for the next round.
//!     log.clear();
//!     assert_eq!(log.capacity(), 4);
//! }
//! ```

mod array;
mod into_iter;
mod raw_buffer;

pub use array::DynamicArray;
pub use into_iter::IntoIter;
pub use raw_buffer::RawBuffer;
