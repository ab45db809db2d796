//! Growable vector over a pluggable backing strategy.
//!
//! [`Vector<T, S>`] is a thin facade: it owns one [`Storage`] and turns its
//! unchecked primitives into the checked, exception-safe operations callers
//! use. The strategy decides where elements live and how capacity grows:
//!
//! - [`HeapVector`]: one heap block, doubling from a minimum of 8 slots.
//! - [`InlineVector`]: `N` slots embedded in the value, never reallocated.
//! - [`SegmentedVector`]: fixed-size heap segments, elements never move.
//!
//! # Pseudo-code Implementation
//!
//! ```text
//! push_back(value):
//!     slot = storage.reserve_back()?        // failure: value dropped, nothing changed
//!     write(slot, value)                    // cannot fail
//!
//! emplace_back_with(f):
//!     value = f()                           // panic or Err: storage never touched
//!     push_back(value)?
//! ```
//!
//! # Design Considerations
//!
//! - **Checked vs unchecked access:** [`get`](Vector::get) and
//!   [`try_get`](Vector::try_get) check bounds; [`at`](Vector::at) is
//!   `unsafe` and trusts the caller. `v[i]` panics with the
//!   [`Error::OutOfRange`] message.
//! - **Copy and assign:** [`try_clone`](Vector::try_clone) deep-copies into
//!   the same strategy and reports allocation failure instead of aborting.
//!   [`assign_from`](Vector::assign_from) builds the copy first and only then
//!   replaces `self`.
//! - **Contiguous strategies** additionally `Deref` to `[T]`, so slice methods
//!   (`sort`, `binary_search`, `chunks`) work without conversion.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut, Index, IndexMut};

use crate::cursor::{Cursor, CursorMut, Iter, Sequence, SequenceMut};
use crate::error::{Error, Result};
use crate::storage::{ContiguousStorage, HeapStorage, InlineStorage, SegmentedStorage, Storage};

/// Growable sequence of `T` backed by the strategy `S`.
pub struct Vector<T, S: Storage<T> = HeapStorage<T>> {
    storage: S,
    _marker: PhantomData<T>,
}

/// Vector on a single doubling heap block.
pub type HeapVector<T> = Vector<T, HeapStorage<T>>;

/// Vector holding at most `N` elements inline.
pub type InlineVector<T, const N: usize> = Vector<T, InlineStorage<T, N>>;

/// Vector whose elements never move once pushed.
pub type SegmentedVector<T> = Vector<T, SegmentedStorage<T>>;

// ─── Construction ────────────────────────────────────────────────────────────

impl<T, S: Storage<T> + Default> Vector<T, S> {
    /// Creates an empty vector.
    #[inline]
    pub fn new() -> Self {
        Self::with_storage(S::default())
    }

    /// Creates a vector of `len` default elements.
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        let mut vector = Self::new();
        vector.resize(len)?;
        Ok(vector)
    }

    /// Creates a vector of `len` clones of `value`.
    pub fn from_elem(len: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        let mut vector = Self::new();
        vector.resize_with(len, || value.clone())?;
        Ok(vector)
    }

    /// Creates a vector holding clones of `items`.
    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        Self::try_from_iter(items.iter().cloned())
    }

    /// Collects `iter`, reporting the first storage failure.
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut vector = Self::new();
        vector.try_extend(iter)?;
        Ok(vector)
    }

    /// Moves the contents out, leaving an empty vector behind.
    #[inline]
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

impl<T, S: Storage<T>> Vector<T, S> {
    /// Wraps an existing storage, keeping its elements.
    #[inline]
    pub fn with_storage(storage: S) -> Self {
        Self {
            storage,
            _marker: PhantomData,
        }
    }

    /// The backing storage.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Unwraps the backing storage.
    #[inline]
    pub fn into_storage(self) -> S {
        self.storage
    }

    // ─── Size and capacity ───────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Slots owned by the storage; pushes below this never allocate.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    // ─── Element access ──────────────────────────────────────────────────────

    /// Returns the element at `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    pub unsafe fn at(&self, index: usize) -> &T {
        unsafe { self.storage.get_unchecked(index) }
    }

    /// Returns the element at `index` mutably without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    pub unsafe fn at_mut(&mut self, index: usize) -> &mut T {
        unsafe { self.storage.get_unchecked_mut(index) }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        (index < self.len()).then(|| unsafe { self.at(index) })
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len() {
            Some(unsafe { self.at_mut(index) })
        } else {
            None
        }
    }

    /// Bounds-checked access reporting [`Error::OutOfRange`].
    pub fn try_get(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.get(index).ok_or(Error::OutOfRange { index, len })
    }

    /// Bounds-checked mutable access reporting [`Error::OutOfRange`].
    pub fn try_get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.get_mut(index).ok_or(Error::OutOfRange { index, len })
    }

    pub fn front(&self) -> Result<&T> {
        self.get(0).ok_or(Error::Empty { operation: "front" })
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.get_mut(0).ok_or(Error::Empty { operation: "front" })
    }

    pub fn back(&self) -> Result<&T> {
        match self.len() {
            0 => Err(Error::Empty { operation: "back" }),
            len => Ok(unsafe { self.at(len - 1) }),
        }
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        match self.len() {
            0 => Err(Error::Empty { operation: "back" }),
            len => Ok(unsafe { self.at_mut(len - 1) }),
        }
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Grows with default elements or truncates to `new_len`.
    #[inline]
    pub fn resize(&mut self, new_len: usize) -> Result<()>
    where
        T: Default,
    {
        self.storage.resize(new_len)
    }

    /// Grows with elements produced by `f` or truncates to `new_len`.
    #[inline]
    pub fn resize_with<F>(&mut self, new_len: usize, f: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        self.storage.resize_with(new_len, f)
    }

    /// Appends `value`. On failure `value` is dropped and the vector is
    /// unchanged.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        let slot = unsafe { self.storage.reserve_back()? };
        unsafe { slot.as_ptr().write(value) };
        Ok(())
    }

    /// Appends the element built by `f` and returns it.
    ///
    /// `f` runs before the storage is touched, so if it panics neither the
    /// length nor the capacity has changed. If the storage then cannot take
    /// the element, it is dropped and the error returned.
    pub fn emplace_back_with<F>(&mut self, f: F) -> Result<&mut T>
    where
        F: FnOnce() -> T,
    {
        self.push_back(f())?;
        self.back_mut()
    }

    /// Like [`emplace_back_with`](Vector::emplace_back_with) for a fallible
    /// constructor. An `Err` from `f` leaves the vector untouched and is
    /// returned as is.
    pub fn try_emplace_back_with<F, E>(&mut self, f: F) -> Result<&mut T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: From<Error>,
    {
        self.push_back(f()?)?;
        Ok(self.back_mut()?)
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Result<T> {
        self.storage.pop().ok_or(Error::Empty {
            operation: "pop_back",
        })
    }

    /// Destructs every element at or past `len`.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.storage.truncate(len);
    }

    #[inline]
    pub fn clear(&mut self) {
        self.storage.truncate(0);
    }

    /// Releases slack memory held by the storage.
    #[inline]
    pub fn shrink(&mut self) -> Result<()> {
        self.storage.shrink_to_fit()
    }

    /// Appends every item of `iter`.
    ///
    /// If the storage fails part way, the items appended by this call are
    /// destructed and the error is returned.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let old_len = self.len();
        for value in iter {
            if let Err(err) = self.push_back(value) {
                self.storage.truncate(old_len);
                return Err(err);
            }
        }
        Ok(())
    }

    // ─── Copy, assign, swap ──────────────────────────────────────────────────

    /// Deep copy on the same strategy.
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        Ok(Self::with_storage(self.storage.try_clone()?))
    }

    /// Replaces the contents with a deep copy of `other`.
    ///
    /// The copy is built before anything is released, so on failure `self`
    /// keeps its old contents.
    pub fn assign_from(&mut self, other: &Self) -> Result<()>
    where
        T: Clone,
    {
        *self = other.try_clone()?;
        Ok(())
    }

    /// Exchanges the contents of two vectors without copying elements.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    // ─── Iteration ───────────────────────────────────────────────────────────

    #[inline]
    pub fn iter(&self) -> Iter<'_, Self> {
        Iter::new(self)
    }

    /// Cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, Self> {
        Cursor::new(self, 0)
    }

    /// Cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, Self> {
        Cursor::new(self, self.len())
    }

    #[inline]
    pub fn begin_mut(&mut self) -> CursorMut<'_, Self> {
        CursorMut::new(self, 0)
    }

    #[inline]
    pub fn end_mut(&mut self) -> CursorMut<'_, Self> {
        let len = self.len();
        CursorMut::new(self, len)
    }
}

impl<T, S: ContiguousStorage<T>> Vector<T, S> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.storage.as_slice()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }
}

// ─── Trait impls ─────────────────────────────────────────────────────────────

impl<T, S: Storage<T>> Sequence for Vector<T, S> {
    type Item<'a>
        = &'a T
    where
        Self: 'a;

    #[inline]
    fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    unsafe fn item(&self, index: usize) -> &T {
        unsafe { self.storage.get_unchecked(index) }
    }
}

impl<T, S: Storage<T>> SequenceMut for Vector<T, S> {
    type ItemMut<'a>
        = &'a mut T
    where
        Self: 'a;

    #[inline]
    unsafe fn item_mut(&mut self, index: usize) -> &mut T {
        unsafe { self.storage.get_unchecked_mut(index) }
    }
}

impl<T, S: Storage<T> + Default> Default for Vector<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Panics if the storage cannot allocate the copy; use
/// [`try_clone`](Vector::try_clone) to handle that case.
impl<T: Clone, S: Storage<T>> Clone for Vector<T, S> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T: fmt::Debug, S: Storage<T>> fmt::Debug for Vector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U, S, S2> PartialEq<Vector<U, S2>> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Storage<T>,
    S2: Storage<U>,
{
    fn eq(&self, other: &Vector<U, S2>) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T, U, S, const N: usize> PartialEq<[U; N]> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Storage<T>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.len() == N && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T, U, S> PartialEq<[U]> for Vector<T, S>
where
    T: PartialEq<U>,
    S: Storage<T>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<T: Eq, S: Storage<T>> Eq for Vector<T, S> {}

impl<T: PartialOrd, S: Storage<T>> PartialOrd for Vector<T, S> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, S: Storage<T>> Ord for Vector<T, S> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash, S: Storage<T>> Hash for Vector<T, S> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for item in self.iter() {
            item.hash(state);
        }
    }
}

impl<T, S: Storage<T>> Index<usize> for Vector<T, S> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.try_get(index) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, S: Storage<T>> IndexMut<usize> for Vector<T, S> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.try_get_mut(index) {
            Ok(item) => item,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, S: ContiguousStorage<T>> Deref for Vector<T, S> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.storage.as_slice()
    }
}

impl<T, S: ContiguousStorage<T>> DerefMut for Vector<T, S> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }
}

impl<T, S: ContiguousStorage<T>> AsRef<[T]> for Vector<T, S> {
    fn as_ref(&self) -> &[T] {
        self.storage.as_slice()
    }
}

impl<'a, T, S: Storage<T>> IntoIterator for &'a Vector<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, Vector<T, S>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Panics on storage failure; use [`try_extend`](Vector::try_extend) to
/// handle it.
impl<T, S: Storage<T>> Extend<T> for Vector<T, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("{err}");
        }
    }
}

/// Panics on storage failure; use [`try_from_iter`](Vector::try_from_iter)
/// to handle it.
impl<T, S: Storage<T> + Default> FromIterator<T> for Vector<T, S> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        match Self::try_from_iter(iter) {
            Ok(vector) => vector,
            Err(err) => panic!("{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::alloc::testing::CountingAlloc;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    #[test]
    fn test_vector_heap_push_and_pop() {
        let mut v: HeapVector<i32> = Vector::new();
        for i in 0..=8 {
            v.push_back(i).unwrap();
        }
        assert_eq!(v.len(), 9);
        assert_eq!(v.capacity(), 16);
        assert_eq!(v.front(), Ok(&0));
        assert_eq!(v.back(), Ok(&8));

        assert_eq!(v.pop_back(), Ok(8));
        assert_eq!(v.len(), 8);
        assert_eq!(v.back(), Ok(&7));
    }

    #[test]
    fn test_vector_inline_resize_past_max() {
        let mut v: InlineVector<u32, 4> = Vector::from_slice(&[1, 2]).unwrap();
        assert_eq!(
            v.resize(5),
            Err(Error::CapacityExceeded { requested: 5, max: 4 })
        );
        assert_eq!(v, [1, 2]);
        v.push_back(3).unwrap();
        v.push_back(4).unwrap();
        assert!(v.push_back(5).unwrap_err().is_out_of_range());
        assert_eq!(v.len(), 4);
    }

    #[test]
    fn test_vector_empty_access() {
        let mut v: HeapVector<String> = Vector::new();
        assert_eq!(v.front(), Err(Error::Empty { operation: "front" }));
        assert_eq!(v.back(), Err(Error::Empty { operation: "back" }));
        assert_eq!(v.pop_back(), Err(Error::Empty { operation: "pop_back" }));
        assert_eq!(v.try_get(0), Err(Error::OutOfRange { index: 0, len: 0 }));
        assert!(v.get_mut(0).is_none());
        assert_eq!(v.capacity(), 8);
        v.shrink().unwrap();
        assert_eq!(v.capacity(), 8);
    }

    #[test]
    fn test_vector_checked_and_unchecked_access() {
        let mut v: HeapVector<i32> = Vector::from_slice(&[10, 20, 30]).unwrap();
        assert_eq!(v.try_get(2), Ok(&30));
        assert_eq!(v.try_get(3), Err(Error::OutOfRange { index: 3, len: 3 }));
        *v.try_get_mut(1).unwrap() += 1;
        *v.front_mut().unwrap() += 1;
        *v.back_mut().unwrap() += 1;
        v[0] += 1;
        assert_eq!(unsafe { *v.at(1) }, 21);
        unsafe { *v.at_mut(2) = 0 };
        assert_eq!(v, [12, 21, 0]);
    }

    #[test]
    #[should_panic(expected = "attempt to access index 5 of a container of length 2")]
    fn test_vector_index_out_of_range_panics() {
        let v: SegmentedVector<u8> = Vector::from_elem(2, 7).unwrap();
        let _ = v[5];
    }

    #[test]
    fn test_vector_emplace_panic_rolls_back() {
        let mut v: InlineVector<String, 4> = Vector::new();
        v.emplace_back_with(|| "a".to_string()).unwrap();
        let result = catch_unwind(AssertUnwindSafe(|| {
            let _ = v.emplace_back_with(|| panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!(v.len(), 1);
        assert_eq!(v.back().map(String::as_str), Ok("a"));
        v.push_back("b".to_string()).unwrap();
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn test_vector_try_emplace_error_rolls_back() {
        #[derive(Debug, PartialEq)]
        enum BuildError {
            Storage(Error),
            Rejected,
        }
        impl From<Error> for BuildError {
            fn from(err: Error) -> Self {
                BuildError::Storage(err)
            }
        }

        let mut v: SegmentedVector<u64> = Vector::new();
        *v.try_emplace_back_with(|| Ok::<_, BuildError>(1)).unwrap() += 10;
        assert_eq!(
            v.try_emplace_back_with(|| Err::<u64, _>(BuildError::Rejected)),
            Err(BuildError::Rejected)
        );
        assert_eq!(v, [11]);

        let mut full: InlineVector<u64, 1> = Vector::from_slice(&[0]).unwrap();
        assert_eq!(
            full.try_emplace_back_with(|| Ok::<_, BuildError>(1)),
            Err(BuildError::Storage(Error::CapacityExceeded { requested: 2, max: 1 }))
        );
    }

    #[test]
    fn test_vector_failed_emplace_keeps_capacity() {
        #[derive(Debug, PartialEq)]
        struct Rejected;
        impl From<Error> for Rejected {
            fn from(_: Error) -> Self {
                Rejected
            }
        }

        let alloc = CountingAlloc::new();
        let mut v: Vector<i32, HeapStorage<i32, CountingAlloc>> =
            Vector::with_storage(HeapStorage::new_in(alloc.clone()));
        v.try_extend(0..8).unwrap();
        assert_eq!((v.len(), v.capacity()), (8, 8));
        let acquired = alloc.acquired();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let _ = v.emplace_back_with(|| panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!((v.len(), v.capacity()), (8, 8));

        assert_eq!(
            v.try_emplace_back_with(|| Err::<i32, _>(Rejected)),
            Err(Rejected)
        );
        assert_eq!((v.len(), v.capacity()), (8, 8));
        assert_eq!(alloc.acquired(), acquired);
        assert!(v.iter().copied().eq(0..8));

        *v.emplace_back_with(|| 8).unwrap() += 1;
        assert_eq!((v.len(), v.capacity()), (9, 16));
        assert_eq!(v.back(), Ok(&9));
    }

    #[test]
    fn test_vector_alloc_failure_keeps_contents() {
        let alloc = CountingAlloc::new();
        let mut v: Vector<i32, HeapStorage<i32, CountingAlloc>> =
            Vector::with_storage(HeapStorage::new_in(alloc.clone()));
        for i in 0..8 {
            v.push_back(i).unwrap();
        }
        alloc.fail_from_now();
        assert!(v.push_back(8).unwrap_err().is_alloc_failure());
        assert_eq!(v.len(), 8);
        assert_eq!(v.capacity(), 8);
        assert_eq!(v.as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(v.try_clone().is_err());
        drop(v);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn test_vector_try_extend_is_all_or_nothing() {
        let mut v: InlineVector<u8, 4> = Vector::from_slice(&[1]).unwrap();
        assert!(v.try_extend([2, 3, 4, 5]).is_err());
        assert_eq!(v, [1]);
        v.try_extend([2, 3]).unwrap();
        assert_eq!(v, [1, 2, 3]);
    }

    #[test]
    fn test_vector_cursor_bounds() {
        let v: HeapVector<i32> = (0..5).collect();
        let begin = v.begin();
        let mut end = v.end();
        assert_eq!(begin + 5, end);
        assert_eq!(end - begin, 5);
        assert_eq!(begin.at(4), Ok(&4));
        assert!(end.get().is_err());
        assert!(end.inc().is_err());
        assert_eq!(end.dec().unwrap().get(), Ok(&4));
        assert!(begin.offset(-1).is_err());
    }

    #[test]
    fn test_vector_cursor_foreign_container() {
        let a: HeapVector<i32> = Vector::from_elem(3, 0).unwrap();
        let b: HeapVector<i32> = Vector::from_elem(3, 0).unwrap();
        assert_ne!(a.begin(), b.begin());
        assert_eq!(a.begin().try_cmp(&b.begin()), Err(Error::ForeignCursor));
        assert_eq!(a.end().distance(&b.begin()), Err(Error::ForeignCursor));
        assert!(a.begin() < a.end());
    }

    #[test]
    fn test_vector_cursor_mut_writes() {
        let mut v: SegmentedVector<i32> = Vector::from_elem(4, 1).unwrap();
        let mut cursor = v.begin_mut();
        while let Ok(item) = cursor.get_mut() {
            *item *= 2;
            cursor += 1;
        }
        assert_eq!(cursor.position(), 4);
        let read: Cursor<'_, _> = v.end_mut().into();
        assert_eq!(read.at(-1), Ok(&2));
        assert_eq!(v, [2, 2, 2, 2]);
    }

    #[test]
    fn test_vector_segmented_addresses_stable() {
        let mut v: SegmentedVector<u64> = Vector::new();
        v.push_back(42).unwrap();
        let first: *const u64 = v.front().unwrap();
        for i in 0..10_000 {
            v.push_back(i).unwrap();
        }
        assert!(core::ptr::eq(first, v.front().unwrap()));
        assert_eq!(v.len(), 10_001);
        assert_eq!(v[10_000], 9_999);
    }

    #[test]
    fn test_vector_iter_both_ends() {
        let v: SegmentedVector<u16> = (0..300).collect();
        assert_eq!(v.iter().len(), 300);
        assert_eq!(v.iter().rev().next(), Some(&299));
        assert_eq!(v.iter().copied().sum::<u16>(), (0..300).sum());
        let mut seen = 0;
        for item in &v {
            assert_eq!(*item, seen);
            seen += 1;
        }
    }

    #[test]
    fn test_vector_clone_assign_swap_take() {
        let mut a: HeapVector<Vec<u8>> = Vector::from_elem(2, vec![1]).unwrap();
        let mut b = a.try_clone().unwrap();
        b[0].push(2);
        assert_eq!(a[0], [1]);

        a.assign_from(&b).unwrap();
        assert_eq!(a, b);

        let mut c: HeapVector<Vec<u8>> = Vector::new();
        c.swap(&mut a);
        assert!(a.is_empty());
        assert_eq!(c.len(), 2);

        let d = c.take();
        assert!(c.is_empty());
        assert_eq!(d[0], [1, 2]);
        assert_eq!(d.clone(), d);
    }

    #[test]
    fn test_vector_compare_across_strategies() {
        let heap: HeapVector<i32> = Vector::from_slice(&[1, 2, 3]).unwrap();
        let inline: InlineVector<i32, 8> = Vector::from_slice(&[1, 2, 3]).unwrap();
        let segmented: SegmentedVector<i32> = Vector::from_slice(&[1, 2, 4]).unwrap();
        assert_eq!(heap, inline);
        assert_ne!(heap, segmented);
        assert!(heap == [1, 2, 3][..]);
        let shorter: HeapVector<i32> = Vector::from_slice(&[1, 2]).unwrap();
        assert!(shorter < heap);
        assert_eq!(heap.cmp(&heap.clone()), Ordering::Equal);
    }

    #[test]
    fn test_vector_contiguous_deref() {
        let mut v: HeapVector<i32> = Vector::from_slice(&[3, 1, 2]).unwrap();
        v.sort();
        assert_eq!(v.as_slice(), &[1, 2, 3]);
        assert_eq!(v.binary_search(&2), Ok(1));
        assert_eq!(format!("{v:?}"), "[1, 2, 3]");
    }

    #[test]
    fn test_vector_clear_truncate_shrink() {
        let drops = Rc::new(Cell::new(0));
        struct Noisy(Rc<Cell<usize>>);
        impl Drop for Noisy {
            fn drop(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }

        let mut v: HeapVector<Noisy> = Vector::new();
        v.resize_with(20, || Noisy(drops.clone())).unwrap();
        assert_eq!(v.capacity(), 32);
        v.truncate(5);
        assert_eq!(drops.get(), 15);
        v.shrink().unwrap();
        assert_eq!(v.capacity(), 8);
        v.clear();
        assert_eq!(drops.get(), 20);
        assert!(v.is_empty());
    }

    #[test]
    fn test_vector_with_len_defaults() {
        let v: InlineVector<i32, 4> = Vector::with_len(3).unwrap();
        assert_eq!(v, [0, 0, 0]);
        assert!(InlineVector::<i32, 4>::with_len(5).is_err());
    }
}
