//! # Storage Vec
//!
//! A growable vector whose backing memory is a pluggable strategy, plus a
//! bit-packed boolean specialization.
//!
//! [`Vector<T, S>`] owns one [`Storage`] and exposes checked, exception-safe
//! operations on top of it. Three strategies ship with the crate:
//!
//! * **[`HeapStorage`]:** one heap block. Capacity starts at 8 and doubles,
//!   so `n` pushes cost `O(log n)` allocations.
//! * **[`InlineStorage`]:** `N` slots embedded in the value. Never allocates;
//!   asking for more than `N` is an [`Error::CapacityExceeded`].
//! * **[`SegmentedStorage`]:** fixed-size heap segments of at least 1 KiB.
//!   Elements never move once pushed.
//!
//! [`BitVector<S, O>`] packs booleans eight per byte on any `Storage<u8>` and
//! hands out [`BitRef`] proxies for single-bit writes (feature `bitvec`).
//!
//! ## Failure model
//!
//! Every fallible operation returns [`Result`]. A failed operation leaves the
//! container exactly as it was: allocation failure, a full inline buffer, or
//! a panicking element constructor all roll back before the error or the
//! panic reaches the caller. Indexing with `v[i]` and cursor arithmetic with
//! `+`/`-` panic instead, carrying the same error message.
//!
//! Allocation goes through the [`RawAlloc`] trait; [`Global`] forwards to the
//! system allocator. Slow paths (relocation, segment creation, capacity
//! errors) emit `tracing` events at `trace`/`debug` level.
//!
//! ## Examples
//!
//! ```rust
//! use storage_vec::{HeapVector, InlineVector, SegmentedVector, Error};
//!
//! let mut v: HeapVector<i32> = HeapVector::new();
//! for i in 0..=8 {
//!     v.push_back(i).unwrap();
//! }
//! assert_eq!(v.capacity(), 16);
//! assert_eq!(v.back(), Ok(&8));
//!
//! let mut small: InlineVector<i32, 4> = InlineVector::new();
//! assert_eq!(small.resize(5), Err(Error::CapacityExceeded { requested: 5, max: 4 }));
//! assert!(small.is_empty());
//!
//! let mut stable: SegmentedVector<String> = SegmentedVector::new();
//! stable.push_back("first".to_string()).unwrap();
//! let first: *const String = stable.front().unwrap();
//! stable.try_extend((0..5_000).map(|i| i.to_string())).unwrap();
//! assert!(std::ptr::eq(first, stable.front().unwrap()));
//! ```
//!
//! ```rust
//! # #[cfg(feature = "bitvec")] {
//! use storage_vec::HeapBitVector;
//!
//! let mut flags: HeapBitVector = HeapBitVector::with_len(10).unwrap();
//! flags.bit_mut(3).unwrap().set(true);
//! assert_eq!(flags.get(3), Some(true));
//! assert_eq!(flags.count_ones(), 1);
//! # }
//! ```

// --- Module Declarations ---

pub mod cursor;
pub mod error;
pub mod storage;
pub mod vecs;

// --- Re-exports ---

pub use cursor::{Cursor, CursorMut, Iter, Sequence, SequenceMut};
pub use error::{Error, Result};
pub use storage::{
    ContiguousStorage, Global, HeapStorage, InlineStorage, RawAlloc, SegmentedStorage, Storage,
};
#[cfg(feature = "bitvec")]
pub use vecs::bit_vector::{
    BitRef, BitVector, HeapBitVector, InlineBitVector, SegmentedBitVector,
};
pub use vecs::vector::{HeapVector, InlineVector, SegmentedVector, Vector};
