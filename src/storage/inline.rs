//! Fixed-capacity storage embedded in its owner.
//!
//! The slots live in a `heapless::Vec<T, N>`, which provides the
//! `[MaybeUninit<T>; N]` buffer and the live-prefix length. Nothing is ever
//! reallocated: asking for more than `N` elements is reported as
//! [`Error::CapacityExceeded`] and leaves the storage untouched.

use core::fmt;
use core::ptr::NonNull;

use heapless::Vec as HVec;

use super::{ContiguousStorage, Storage, lifecycle};
use crate::error::{Error, Result};

/// Storage for at most `N` elements, held inline.
pub struct InlineStorage<T, const N: usize> {
    slots: HVec<T, N>,
}

impl<T, const N: usize> InlineStorage<T, N> {
    /// Upper bound on the embedded buffer, checked at compile time.
    pub const MAX_INLINE_BYTES: usize = 16 * 1024;

    /// Creates empty storage.
    pub fn new() -> Self {
        const {
            assert!(
                core::mem::size_of::<Self>() <= InlineStorage::<T, N>::MAX_INLINE_BYTES,
                "InlineStorage is too large! Reduce N."
            );
        }
        Self { slots: HVec::new() }
    }

    /// Creates storage holding `len` default elements.
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        let mut storage = Self::new();
        storage.resize(len)?;
        Ok(storage)
    }

    #[inline]
    fn exceeded(requested: usize) -> Error {
        tracing::debug!(requested, max = N, "inline storage capacity exceeded");
        Error::CapacityExceeded { requested, max: N }
    }
}

impl<T, const N: usize> Storage<T> for InlineStorage<T, N> {
    #[inline]
    fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn capacity(&self) -> usize {
        N
    }

    fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        if new_len > N {
            return Err(Self::exceeded(new_len));
        }
        let len = self.slots.len();
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }
        unsafe {
            lifecycle::construct_with(self.slots.as_mut_ptr().add(len), new_len - len, &mut f);
            self.slots.set_len(new_len);
        }
        Ok(())
    }

    #[inline]
    fn truncate(&mut self, new_len: usize) {
        self.slots.truncate(new_len);
    }

    #[inline]
    unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.slots.len());
        unsafe { self.slots.get_unchecked(index) }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.slots.len());
        unsafe { self.slots.get_unchecked_mut(index) }
    }

    unsafe fn reserve_back(&mut self) -> Result<NonNull<T>> {
        let len = self.slots.len();
        if len == N {
            return Err(Self::exceeded(len + 1));
        }
        unsafe {
            let slot = NonNull::new_unchecked(self.slots.as_mut_ptr().add(len));
            self.slots.set_len(len + 1);
            Ok(slot)
        }
    }

    #[inline]
    unsafe fn rollback_back(&mut self) {
        let len = self.slots.len();
        debug_assert!(len > 0);
        unsafe { self.slots.set_len(len - 1) };
    }

    #[inline]
    fn pop(&mut self) -> Option<T> {
        self.slots.pop()
    }

    #[inline]
    fn shrink_to_fit(&mut self) -> Result<()> {
        Ok(())
    }

    fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        Ok(Self {
            slots: self.slots.clone(),
        })
    }
}

impl<T, const N: usize> ContiguousStorage<T> for InlineStorage<T, N> {
    #[inline]
    fn as_slice(&self) -> &[T] {
        self.slots.as_slice()
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        self.slots.as_mut_slice()
    }
}

impl<T, const N: usize> Default for InlineStorage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for InlineStorage<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineStorage")
            .field("capacity", &N)
            .field("elements", &self.slots.as_slice())
            .finish()
    }
}
