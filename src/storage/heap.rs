//! Single heap block that doubles when full.
//!
//! # Pseudo-code Implementation
//!
//! ```text
//! capacity_for(n) = next_power_of_two(max(n, MIN_CAPACITY))
//!
//! // 1. Resize (resize_with)
//! if n <= len: destruct [n, len); len = n
//! elif n <= capacity: construct [len, n) in place; len = n
//! else:
//!     fresh = allocate(capacity_for(n))     // failure: nothing changed
//!     construct [len, n) in fresh           // panic: fresh released, nothing changed
//!     move [0, len) old -> fresh            // cannot fail
//!     release old; adopt fresh
//!
//! // 2. Reserve (reserve_back)
//! if len == capacity: relocate(capacity_for(len + 1))
//! len += 1; return slot len - 1
//! ```
//!
//! Growth always doubles, so `k` pushes from empty relocate `O(log k)` times
//! and move `O(k)` elements in total.

use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

use super::alloc::{Global, RawAlloc, SlotsGuard, release_slots};
use super::{ContiguousStorage, Storage, lifecycle};
use crate::error::{Error, Result};

/// Growable storage backed by one heap block.
///
/// Capacity is either zero (nothing allocated yet) or a power of two no
/// smaller than [`MIN_CAPACITY`](Self::MIN_CAPACITY). It grows on demand and
/// only shrinks through [`shrink_to_fit`](Storage::shrink_to_fit).
pub struct HeapStorage<T, A: RawAlloc = Global> {
    ptr: NonNull<T>,
    capacity: usize,
    len: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T> HeapStorage<T> {
    /// Creates empty storage on the global allocator without allocating.
    #[inline]
    pub const fn new() -> Self {
        Self::new_in(Global)
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
}

impl<T, A: RawAlloc> HeapStorage<T, A> {
    /// Smallest capacity ever allocated.
    pub const MIN_CAPACITY: usize = 8;

    /// Creates empty storage on `alloc` without allocating.
    #[inline]
    pub const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Creates empty storage with room for at least `capacity` elements.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let mut storage = Self::new_in(alloc);
        if capacity > 0 {
            storage.relocate(Self::capacity_for(capacity)?)?;
        }
        Ok(storage)
    }

    /// The allocator this storage draws from.
    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Capacity needed to hold `len` elements.
    #[inline]
    pub fn capacity_for(len: usize) -> Result<usize> {
        len.max(Self::MIN_CAPACITY)
            .checked_next_power_of_two()
            .ok_or(Error::CapacityOverflow)
    }

    /// Moves the live elements into a fresh block of `new_capacity` slots.
    ///
    /// Leaves `self` untouched if the allocation fails.
    fn relocate(&mut self, new_capacity: usize) -> Result<()> {
        let fresh = unsafe {
            lifecycle::safe_move(&self.alloc, self.ptr.as_ptr(), self.len, new_capacity)?
        };
        unsafe { release_slots::<T, A>(&self.alloc, self.ptr, self.capacity) };
        tracing::trace!(
            len = self.len,
            old_capacity = self.capacity,
            new_capacity,
            "relocated heap storage"
        );
        self.ptr = fresh;
        self.capacity = new_capacity;
        Ok(())
    }
}

impl<T, A: RawAlloc + Clone> Storage<T> for HeapStorage<T, A> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    /// Never below [`MIN_CAPACITY`](HeapStorage::MIN_CAPACITY): storage that
    /// has not allocated yet acquires exactly that many slots on first growth.
    #[inline]
    fn capacity(&self) -> usize {
        self.capacity.max(Self::MIN_CAPACITY)
    }

    fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        let len = self.len;
        if new_len <= len {
            self.truncate(new_len);
            return Ok(());
        }

        if new_len <= self.capacity {
            unsafe { lifecycle::construct_with(self.ptr.as_ptr().add(len), new_len - len, &mut f) };
            self.len = new_len;
            return Ok(());
        }

        let new_capacity = Self::capacity_for(new_len)?;
        let fresh = SlotsGuard::<T, A>::allocate(&self.alloc, new_capacity)?;
        unsafe {
            // The tail goes first: if a constructor panics, the old block
            // still owns every existing element.
            lifecycle::construct_with(fresh.as_ptr().add(len), new_len - len, &mut f);
            lifecycle::move_into(self.ptr.as_ptr(), fresh.as_ptr(), len);
        }
        let fresh = fresh.adopt();
        unsafe { release_slots::<T, A>(&self.alloc, self.ptr, self.capacity) };
        tracing::trace!(
            len,
            new_len,
            old_capacity = self.capacity,
            new_capacity,
            "grew heap storage"
        );
        self.ptr = fresh;
        self.capacity = new_capacity;
        self.len = new_len;
        Ok(())
    }

    fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = self.len - new_len;
        self.len = new_len;
        unsafe { lifecycle::destruct(self.ptr.as_ptr().add(new_len), tail) };
    }

    #[inline]
    unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        unsafe { &*self.ptr.as_ptr().add(index) }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        unsafe { &mut *self.ptr.as_ptr().add(index) }
    }

    unsafe fn reserve_back(&mut self) -> Result<NonNull<T>> {
        if self.len == self.capacity {
            let wanted = self.len.checked_add(1).ok_or(Error::CapacityOverflow)?;
            self.relocate(Self::capacity_for(wanted)?)?;
        }
        let slot = unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(self.len)) };
        self.len += 1;
        Ok(slot)
    }

    #[inline]
    unsafe fn rollback_back(&mut self) {
        debug_assert!(self.len > 0);
        self.len -= 1;
    }

    fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.ptr.as_ptr().add(self.len).read() })
    }

    /// Reallocates to `capacity_for(len)`, the smallest power of two that is
    /// at least `max(len, MIN_CAPACITY)`, rather than to exactly `len`, so
    /// capacity stays a power of two. No-op when already there or when
    /// nothing was ever allocated.
    fn shrink_to_fit(&mut self) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        let target = Self::capacity_for(self.len)?;
        if target >= self.capacity {
            return Ok(());
        }
        self.relocate(target)
    }

    fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let alloc = self.alloc.clone();
        if self.capacity == 0 {
            return Ok(Self::new_in(alloc));
        }
        let ptr = lifecycle::safe_copy(&alloc, self.as_slice(), self.capacity)?;
        Ok(Self {
            ptr,
            capacity: self.capacity,
            len: self.len,
            alloc,
            _marker: PhantomData,
        })
    }
}

impl<T, A: RawAlloc + Clone> ContiguousStorage<T> for HeapStorage<T, A> {
    #[inline]
    fn as_slice(&self) -> &[T] {
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

// The storage owns its elements like a `Box<[T]>` does.
unsafe impl<T: Send, A: RawAlloc + Send> Send for HeapStorage<T, A> {}
unsafe impl<T: Sync, A: RawAlloc + Sync> Sync for HeapStorage<T, A> {}

impl<T, A: RawAlloc> Drop for HeapStorage<T, A> {
    fn drop(&mut self) {
        unsafe {
            lifecycle::destruct(self.ptr.as_ptr(), self.len);
            release_slots::<T, A>(&self.alloc, self.ptr, self.capacity);
        }
    }
}

impl<T, A: RawAlloc + Default> Default for HeapStorage<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: RawAlloc + Clone> fmt::Debug for HeapStorage<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapStorage")
            .field("capacity", &self.capacity)
            .field("elements", &self.as_slice())
            .finish()
    }
}
