//! Raw memory acquisition and release.
//!
//! [`RawAlloc`] is the single allocation primitive the heap and segmented
//! strategies are written against. The crate never asks it for zero-sized
//! blocks: buffers of zero-sized types (or of capacity zero) use a dangling,
//! well-aligned pointer instead.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::{Error, Result};

/// A source of raw, uninitialized memory blocks.
///
/// # Safety
///
/// A non-null pointer returned by `acquire` must be valid for reads and
/// writes of `layout.size()` bytes, aligned to `layout.align()`, and remain
/// so until passed to `release` with the same layout.
pub unsafe trait RawAlloc {
    /// Acquires a block for `layout`, returning null on failure.
    ///
    /// `layout.size()` is never zero.
    fn acquire(&self, layout: Layout) -> *mut u8;

    /// Releases a block previously returned by `acquire`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `acquire` on this allocator with the same `layout`
    /// and must not have been released already.
    unsafe fn release(&self, ptr: *mut u8, layout: Layout);
}

/// The process-wide allocator from `std::alloc`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Global;

unsafe impl RawAlloc for Global {
    #[inline]
    fn acquire(&self, layout: Layout) -> *mut u8 {
        unsafe { std::alloc::alloc(layout) }
    }

    #[inline]
    unsafe fn release(&self, ptr: *mut u8, layout: Layout) {
        unsafe { std::alloc::dealloc(ptr, layout) }
    }
}

unsafe impl<A: RawAlloc + ?Sized> RawAlloc for &A {
    #[inline]
    fn acquire(&self, layout: Layout) -> *mut u8 {
        (**self).acquire(layout)
    }

    #[inline]
    unsafe fn release(&self, ptr: *mut u8, layout: Layout) {
        unsafe { (**self).release(ptr, layout) }
    }
}

/// Layout of `capacity` consecutive `T` slots.
#[inline]
pub(crate) fn slots_layout<T>(capacity: usize) -> Result<Layout> {
    Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)
}

/// Acquires uninitialized memory for `capacity` slots of `T`.
pub(crate) fn allocate_slots<T, A: RawAlloc>(alloc: &A, capacity: usize) -> Result<NonNull<T>> {
    let layout = slots_layout::<T>(capacity)?;
    if layout.size() == 0 {
        return Ok(NonNull::dangling());
    }
    match NonNull::new(alloc.acquire(layout)) {
        Some(ptr) => Ok(ptr.cast()),
        None => {
            tracing::debug!(size = layout.size(), align = layout.align(), "raw allocation failed");
            Err(Error::AllocFailed {
                size: layout.size(),
                align: layout.align(),
            })
        }
    }
}

/// Releases memory obtained from [`allocate_slots`].
///
/// # Safety
///
/// `ptr` must have been returned by `allocate_slots::<T, A>(alloc, capacity)`
/// and every slot must already be destructed or moved out.
pub(crate) unsafe fn release_slots<T, A: RawAlloc>(alloc: &A, ptr: NonNull<T>, capacity: usize) {
    // The layout was valid when the block was acquired.
    let Ok(layout) = slots_layout::<T>(capacity) else {
        return;
    };
    if layout.size() != 0 {
        unsafe { alloc.release(ptr.as_ptr().cast(), layout) };
    }
}

/// Owns a freshly acquired block until it is adopted by a storage.
///
/// Dropping the guard (normally while unwinding) releases the block. The
/// slots themselves are never touched; whoever constructs elements in them is
/// responsible for destructing those first.
pub(crate) struct SlotsGuard<'a, T, A: RawAlloc> {
    alloc: &'a A,
    ptr: NonNull<T>,
    capacity: usize,
}

impl<'a, T, A: RawAlloc> SlotsGuard<'a, T, A> {
    pub(crate) fn allocate(alloc: &'a A, capacity: usize) -> Result<Self> {
        let ptr = allocate_slots::<T, A>(alloc, capacity)?;
        Ok(Self { alloc, ptr, capacity })
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Hands the block over to the caller without releasing it.
    #[inline]
    pub(crate) fn adopt(self) -> NonNull<T> {
        let ptr = self.ptr;
        core::mem::forget(self);
        ptr
    }
}

impl<T, A: RawAlloc> Drop for SlotsGuard<'_, T, A> {
    fn drop(&mut self) {
        unsafe { release_slots::<T, A>(self.alloc, self.ptr, self.capacity) };
    }
}
