//! Element lifecycle on raw slots.
//!
//! These helpers construct and destruct elements in memory the strategies own
//! but have not initialized. They are the only place where partially built
//! ranges are cleaned up after a constructor panics, so every strategy shares
//! the same rollback behaviour:
//!
//! ```text
//! construct_with(dst, n, f):
//!     done = 0
//!     on unwind: destruct(dst, done)      // only what this call built
//!     while done < n: dst[done] = f(); done += 1
//!
//! safe_copy(src, len, cap):
//!     dst = allocate(cap)                 // failure: nothing touched
//!     on unwind: release(dst)             // construct_with already destructed
//!     construct_with(dst, len, clone of src[i])
//!     return dst                          // src untouched either way
//! ```
//!
//! Moves are bitwise in Rust and cannot fail, so relocating a live range is a
//! plain `copy_nonoverlapping` and the "move if it cannot fail" choice is
//! always the move.

use core::ptr::{self, NonNull};

use super::alloc::{RawAlloc, SlotsGuard};
use crate::error::Result;

/// Destructs the first `done` slots of `dst` when dropped.
struct PartialRange<T> {
    dst: *mut T,
    done: usize,
}

impl<T> Drop for PartialRange<T> {
    fn drop(&mut self) {
        unsafe { destruct(self.dst, self.done) };
    }
}

/// Constructs `count` elements at `dst`, each produced by `f`.
///
/// If `f` panics, the elements this call already constructed are destructed
/// before the panic continues, so the caller observes no new live slots.
///
/// # Safety
///
/// `dst` must be valid for writes of `count` elements and those slots must be
/// uninitialized.
pub(crate) unsafe fn construct_with<T, F>(dst: *mut T, count: usize, f: &mut F)
where
    F: FnMut() -> T,
{
    let mut partial = PartialRange { dst, done: 0 };
    while partial.done < count {
        let value = f();
        unsafe { dst.add(partial.done).write(value) };
        partial.done += 1;
    }
    core::mem::forget(partial);
}

/// Clones `count` elements from `src` into the uninitialized slots at `dst`.
///
/// # Safety
///
/// `src` must point to `count` live elements; `dst` must be valid for writes
/// of `count` elements and must not overlap `src`.
pub(crate) unsafe fn clone_into<T: Clone>(src: *const T, dst: *mut T, count: usize) {
    let mut next = 0;
    let mut clone_next = || {
        let value = unsafe { (*src.add(next)).clone() };
        next += 1;
        value
    };
    unsafe { construct_with(dst, count, &mut clone_next) };
}

/// Moves `count` live elements from `src` to `dst`.
///
/// Afterwards the `src` slots are logically uninitialized and must not be
/// destructed.
///
/// # Safety
///
/// Both ranges must be valid for `count` elements and must not overlap.
#[inline]
pub(crate) unsafe fn move_into<T>(src: *const T, dst: *mut T, count: usize) {
    unsafe { ptr::copy_nonoverlapping(src, dst, count) };
}

/// Drops `count` live elements starting at `ptr`.
///
/// # Safety
///
/// The range must hold `count` live elements that are not used afterwards.
#[inline]
pub(crate) unsafe fn destruct<T>(ptr: *mut T, count: usize) {
    if count != 0 {
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(ptr, count)) };
    }
}

/// Allocates `dst_capacity` slots and clones `src` into the front of them.
///
/// On allocation failure or a panicking `clone`, every clone already made is
/// destructed and the new block released; `src` is never modified.
pub(crate) fn safe_copy<T: Clone, A: RawAlloc>(
    alloc: &A,
    src: &[T],
    dst_capacity: usize,
) -> Result<NonNull<T>> {
    debug_assert!(src.len() <= dst_capacity);
    let dst = SlotsGuard::<T, A>::allocate(alloc, dst_capacity)?;
    unsafe { clone_into(src.as_ptr(), dst.as_ptr(), src.len()) };
    Ok(dst.adopt())
}

/// Allocates `dst_capacity` slots and moves `len` elements from `src` into
/// the front of them.
///
/// On allocation failure nothing has moved and `src` still owns its elements.
/// On success `src` no longer owns them and only its memory remains to be
/// released.
///
/// # Safety
///
/// `src` must point to `len` live elements and `len <= dst_capacity`.
pub(crate) unsafe fn safe_move<T, A: RawAlloc>(
    alloc: &A,
    src: *const T,
    len: usize,
    dst_capacity: usize,
) -> Result<NonNull<T>> {
    debug_assert!(len <= dst_capacity);
    let dst = SlotsGuard::<T, A>::allocate(alloc, dst_capacity)?;
    unsafe { move_into(src, dst.as_ptr(), len) };
    Ok(dst.adopt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::alloc::testing::CountingAlloc;
    use crate::storage::alloc::{Global, release_slots};
    use core::mem::MaybeUninit;
    use std::cell::Cell;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    struct Tracked {
        drops: Rc<Cell<usize>>,
        value: u32,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    /// Clones fine until the shared fuse reaches zero, then panics.
    struct Fused {
        fuse: Rc<Cell<usize>>,
        drops: Rc<Cell<usize>>,
    }

    impl Clone for Fused {
        fn clone(&self) -> Self {
            let left = self.fuse.get();
            if left == 0 {
                panic!("clone fuse blown");
            }
            self.fuse.set(left - 1);
            Fused {
                fuse: self.fuse.clone(),
                drops: self.drops.clone(),
            }
        }
    }

    impl Drop for Fused {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    #[test]
    fn test_lifecycle_construct_and_destruct() {
        let drops = Rc::new(Cell::new(0));
        let mut slots: [MaybeUninit<Tracked>; 4] = [const { MaybeUninit::uninit() }; 4];
        let dst = slots.as_mut_ptr() as *mut Tracked;
        let mut n = 0;
        unsafe {
            construct_with(dst, 4, &mut || {
                n += 1;
                Tracked { drops: drops.clone(), value: n }
            });
            assert_eq!((*dst.add(3)).value, 4);
            destruct(dst, 4);
        }
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn test_lifecycle_construct_rolls_back_on_panic() {
        let drops = Rc::new(Cell::new(0));
        let mut slots: [MaybeUninit<Tracked>; 5] = [const { MaybeUninit::uninit() }; 5];
        let dst = slots.as_mut_ptr() as *mut Tracked;
        let mut n = 0;
        let result = catch_unwind(AssertUnwindSafe(|| unsafe {
            construct_with(dst, 5, &mut || {
                n += 1;
                if n == 4 {
                    panic!("constructor failed");
                }
                Tracked { drops: drops.clone(), value: n }
            })
        }));
        assert!(result.is_err());
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn test_lifecycle_safe_copy_leaves_source_untouched_on_panic() {
        let fuse = Rc::new(Cell::new(usize::MAX));
        let drops = Rc::new(Cell::new(0));
        let src: Vec<Fused> = (0..6)
            .map(|_| Fused {
                fuse: fuse.clone(),
                drops: drops.clone(),
            })
            .collect();
        let alloc = CountingAlloc::new();

        fuse.set(3);
        let result = catch_unwind(AssertUnwindSafe(|| safe_copy(&alloc, &src, 8)));
        assert!(result.is_err());
        // Three clones were built and destructed; the originals are intact.
        assert_eq!(drops.get(), 3);
        assert_eq!(src.len(), 6);
        assert_eq!(alloc.live(), 0);
    }

    #[test]
    fn test_lifecycle_safe_copy_success() {
        let src = vec![String::from("a"), String::from("b")];
        let dst = safe_copy(&Global, &src, 4).unwrap();
        unsafe {
            assert_eq!(*dst.as_ptr().add(1), "b");
            destruct(dst.as_ptr(), 2);
            release_slots::<String, _>(&Global, dst, 4);
        }
        assert_eq!(src, ["a", "b"]);
    }

    #[test]
    fn test_lifecycle_safe_move_failure_keeps_source() {
        let alloc = CountingAlloc::failing_after(0);
        let src = [1u32, 2, 3];
        let err = unsafe { safe_move(&alloc, src.as_ptr(), 3, 8) };
        assert!(err.is_err());
        assert_eq!(src, [1, 2, 3]);
    }
}
