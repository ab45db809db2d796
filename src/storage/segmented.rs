//! Storage split into independently allocated, fixed-size segments.
//!
//! Growth appends segments and never moves an element, so a reference taken
//! before an append that only adds elements past it stays valid. Indexing
//! costs a divide and a modulo instead of a single offset.
//!
//! # Layout
//!
//! ```text
//! segments: [ seg0 | seg1 | seg2 ]       // table of block pointers (a HeapStorage)
//!             full   full   partial      // only the last live segment may be partial
//!
//! element i lives at segments[i / SEGMENT_CAPACITY][i % SEGMENT_CAPACITY]
//! ```
//!
//! Table entries are appended first and backed by a block right after. Every
//! entry in the table is backed once an operation returns. Segments past the
//! last live element may be backed but empty (left behind by `pop`) until
//! `truncate`, `resize` or `shrink_to_fit` releases them.

use core::fmt;
use core::ptr::NonNull;

use super::alloc::{Global, RawAlloc, allocate_slots, release_slots};
use super::{ContiguousStorage, HeapStorage, Storage, lifecycle};
use crate::error::Result;

/// One entry of the segment table.
struct Segment<T> {
    slots: Option<NonNull<T>>,
}

impl<T> Default for Segment<T> {
    fn default() -> Self {
        Self { slots: None }
    }
}

/// Growable storage that never relocates its elements.
pub struct SegmentedStorage<T, A: RawAlloc + Clone = Global> {
    segments: HeapStorage<Segment<T>, A>,
    len: usize,
    alloc: A,
}

impl<T> SegmentedStorage<T> {
    /// Creates empty storage on the global allocator without allocating.
    #[inline]
    pub fn new() -> Self {
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

impl<T, A: RawAlloc + Clone> SegmentedStorage<T, A> {
    /// Byte budget a segment is sized from.
    pub const MIN_SEGMENT_BYTES: usize = 1024;

    /// Floor on elements per segment, for large element types.
    pub const MIN_SEGMENT_LEN: usize = 8;

    /// Elements per segment.
    pub const SEGMENT_CAPACITY: usize = {
        let size = core::mem::size_of::<T>();
        let size = if size == 0 { 1 } else { size };
        let fit = Self::MIN_SEGMENT_BYTES / size;
        if fit < Self::MIN_SEGMENT_LEN {
            Self::MIN_SEGMENT_LEN
        } else {
            fit
        }
    };

    /// Creates empty storage on `alloc` without allocating.
    pub fn new_in(alloc: A) -> Self {
        Self {
            segments: HeapStorage::new_in(alloc.clone()),
            len: 0,
            alloc,
        }
    }

    /// Number of segments currently backed by memory.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    fn locate(index: usize) -> (usize, usize) {
        (index / Self::SEGMENT_CAPACITY, index % Self::SEGMENT_CAPACITY)
    }

    /// Segments needed to hold `len` elements.
    #[inline]
    fn segments_for(len: usize) -> usize {
        len.div_ceil(Self::SEGMENT_CAPACITY)
    }

    /// Address of slot `index`.
    ///
    /// # Safety
    ///
    /// The segment holding `index` must be backed.
    #[inline]
    unsafe fn slot(&self, index: usize) -> *mut T {
        let (segment, offset) = Self::locate(index);
        unsafe {
            let base = self.segments.as_slice().get_unchecked(segment).slots.unwrap_unchecked();
            base.as_ptr().add(offset)
        }
    }

    /// Backs segments until there are at least `count`.
    ///
    /// On failure every segment added by this call is released again.
    fn ensure_segments(&mut self, count: usize) -> Result<()> {
        let old_count = self.segments.len();
        if count <= old_count {
            return Ok(());
        }
        self.segments.resize_with(count, Segment::default)?;
        for index in old_count..count {
            match allocate_slots::<T, A>(&self.alloc, Self::SEGMENT_CAPACITY) {
                Ok(block) => self.segments.as_mut_slice()[index].slots = Some(block),
                Err(err) => {
                    self.release_segments(old_count);
                    return Err(err);
                }
            }
        }
        tracing::trace!(
            from = old_count,
            to = count,
            segment_capacity = Self::SEGMENT_CAPACITY,
            "allocated segments"
        );
        Ok(())
    }

    /// Releases every segment from `keep` on and drops their table entries.
    ///
    /// The released segments must hold no live element.
    fn release_segments(&mut self, keep: usize) {
        let count = self.segments.len();
        if keep >= count {
            return;
        }
        for segment in &mut self.segments.as_mut_slice()[keep..] {
            if let Some(block) = segment.slots.take() {
                unsafe { release_slots::<T, A>(&self.alloc, block, Self::SEGMENT_CAPACITY) };
            }
        }
        self.segments.truncate(keep);
        tracing::trace!(from = count, to = keep, "released segments");
    }

    /// Destructs the live elements in `from..to`, one segment run at a time.
    fn destruct_range(&mut self, from: usize, to: usize) {
        let mut index = from;
        while index < to {
            let (_, offset) = Self::locate(index);
            let run = (Self::SEGMENT_CAPACITY - offset).min(to - index);
            unsafe { lifecycle::destruct(self.slot(index), run) };
            index += run;
        }
    }
}

/// Undoes a partially applied growth when dropped.
struct Growth<'a, T, A: RawAlloc + Clone> {
    storage: &'a mut SegmentedStorage<T, A>,
    old_len: usize,
    old_segments: usize,
}

impl<T, A: RawAlloc + Clone> Drop for Growth<'_, T, A> {
    fn drop(&mut self) {
        let built = self.storage.len;
        self.storage.len = self.old_len;
        self.storage.destruct_range(self.old_len, built);
        self.storage.release_segments(self.old_segments);
    }
}

impl<T, A: RawAlloc + Clone> Storage<T> for SegmentedStorage<T, A> {
    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.segments.len() * Self::SEGMENT_CAPACITY
    }

    fn resize_with<F>(&mut self, new_len: usize, mut f: F) -> Result<()>
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }

        let old_len = self.len;
        let old_segments = self.segments.len();
        self.ensure_segments(Self::segments_for(new_len))?;

        let mut growth = Growth {
            storage: self,
            old_len,
            old_segments,
        };
        while growth.storage.len < new_len {
            let start = growth.storage.len;
            let (_, offset) = Self::locate(start);
            let run = (Self::SEGMENT_CAPACITY - offset).min(new_len - start);
            unsafe { lifecycle::construct_with(growth.storage.slot(start), run, &mut f) };
            growth.storage.len += run;
        }
        core::mem::forget(growth);
        Ok(())
    }

    fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let old_len = self.len;
        self.len = new_len;
        self.destruct_range(new_len, old_len);
        self.release_segments(Self::segments_for(new_len));
    }

    #[inline]
    unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        unsafe { &*self.slot(index) }
    }

    #[inline]
    unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        unsafe { &mut *self.slot(index) }
    }

    unsafe fn reserve_back(&mut self) -> Result<NonNull<T>> {
        let index = self.len;
        let (segment, _) = Self::locate(index);
        if segment >= self.segments.len() {
            self.ensure_segments(segment + 1)?;
        }
        let slot = unsafe { NonNull::new_unchecked(self.slot(index)) };
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
        Some(unsafe { self.slot(self.len).read() })
    }

    fn shrink_to_fit(&mut self) -> Result<()> {
        self.release_segments(Self::segments_for(self.len));
        self.segments.shrink_to_fit()
    }

    fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        let mut copy = Self::new_in(self.alloc.clone());
        copy.ensure_segments(Self::segments_for(self.len))?;
        for index in 0..self.len {
            let value = unsafe { (*self.slot(index)).clone() };
            // Segments are already backed, so this cannot fail.
            let slot = unsafe { copy.reserve_back()? };
            unsafe { slot.as_ptr().write(value) };
        }
        Ok(copy)
    }
}

unsafe impl<T: Send, A: RawAlloc + Clone + Send> Send for SegmentedStorage<T, A> {}
unsafe impl<T: Sync, A: RawAlloc + Clone + Sync> Sync for SegmentedStorage<T, A> {}

impl<T, A: RawAlloc + Clone> Drop for SegmentedStorage<T, A> {
    fn drop(&mut self) {
        let len = self.len;
        self.len = 0;
        self.destruct_range(0, len);
        self.release_segments(0);
    }
}

impl<T, A: RawAlloc + Clone + Default> Default for SegmentedStorage<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T: fmt::Debug, A: RawAlloc + Clone> fmt::Debug for SegmentedStorage<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        struct Elements<'a, T, A: RawAlloc + Clone>(&'a SegmentedStorage<T, A>);

        impl<T: fmt::Debug, A: RawAlloc + Clone> fmt::Debug for Elements<'_, T, A> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_list()
                    .entries((0..self.0.len).map(|i| unsafe { self.0.get_unchecked(i) }))
                    .finish()
            }
        }

        f.debug_struct("SegmentedStorage")
            .field("segments", &self.segments.len())
            .field("segment_capacity", &Self::SEGMENT_CAPACITY)
            .field("elements", &Elements(self))
            .finish()
    }
}
