//! Backing-memory strategies for [`Vector`](crate::Vector).
//!
//! A strategy owns a region of slots and tracks how many of them, counted
//! from the front, hold live elements. Slots at or past `len()` are raw
//! memory. The facade never touches that memory itself; it goes through the
//! [`Storage`] contract below.
//!
//! | Strategy | Memory | Growth | Element addresses |
//! |----------|--------|--------|-------------------|
//! | [`HeapStorage`] | one heap block | doubles, relocates | change on growth |
//! | [`InlineStorage`] | embedded `N` slots | never | fixed |
//! | [`SegmentedStorage`] | list of fixed-size heap blocks | adds blocks | never change |

pub mod alloc;
pub(crate) mod lifecycle;

mod heap;
mod inline;
mod segmented;

pub use self::alloc::{Global, RawAlloc};
pub use heap::HeapStorage;
pub use inline::InlineStorage;
pub use segmented::SegmentedStorage;

use core::ptr::NonNull;

use crate::error::Result;

/// The contract every backing strategy satisfies.
///
/// Invariants every implementation upholds:
/// - `len() <= capacity()`;
/// - slots `0..len()` hold live elements, in insertion order;
/// - a failed operation leaves `len()`, `capacity()` and every element exactly
///   as they were.
pub trait Storage<T>: Sized {
    /// Number of live elements.
    fn len(&self) -> usize;

    /// Returns `true` if no element is live.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of addressable slots currently owned.
    fn capacity(&self) -> usize;

    /// Grows to `new_len` with elements produced by `f`, or shrinks to it by
    /// destructing the tail.
    ///
    /// If `f` panics the elements built so far are destructed and the storage
    /// is left as before the call.
    fn resize_with<F>(&mut self, new_len: usize, f: F) -> Result<()>
    where
        F: FnMut() -> T;

    /// [`resize_with`](Storage::resize_with) using `T::default`.
    #[inline]
    fn resize(&mut self, new_len: usize) -> Result<()>
    where
        T: Default,
    {
        self.resize_with(new_len, T::default)
    }

    /// Destructs every element at or past `new_len`. No-op when `new_len >= len()`.
    fn truncate(&mut self, new_len: usize);

    /// Returns the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    unsafe fn get_unchecked(&self, index: usize) -> &T;

    /// Returns the element at `index` mutably without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T;

    /// Reserves the slot at the back, growing if needed, and counts it as
    /// live before anything is written to it.
    ///
    /// The length is raised first so that a failing constructor only has to
    /// call [`rollback_back`](Storage::rollback_back); nothing leaks either way.
    ///
    /// # Safety
    ///
    /// Until the returned slot is written, the storage holds an uninitialized
    /// slot inside its live range: the caller must either write the slot or
    /// call `rollback_back` before any other use of the storage, including
    /// dropping it.
    unsafe fn reserve_back(&mut self) -> Result<NonNull<T>>;

    /// Undoes the most recent [`reserve_back`](Storage::reserve_back) without
    /// destructing the slot.
    ///
    /// # Safety
    ///
    /// Must directly follow a successful `reserve_back` whose slot was not
    /// written.
    unsafe fn rollback_back(&mut self);

    /// Moves the last element out.
    fn pop(&mut self) -> Option<T>;

    /// Releases slack memory without changing the live elements.
    fn shrink_to_fit(&mut self) -> Result<()>;

    /// Deep-copies every live element into a new storage of the same strategy.
    fn try_clone(&self) -> Result<Self>
    where
        T: Clone;
}

/// Strategies whose live elements occupy one contiguous range.
pub trait ContiguousStorage<T>: Storage<T> {
    /// The live elements as a slice.
    fn as_slice(&self) -> &[T];

    /// The live elements as a mutable slice.
    fn as_mut_slice(&mut self) -> &mut [T];
}
