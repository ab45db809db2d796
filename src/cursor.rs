//! Random-access cursors and iterators over the container facades.
//!
//! A [`Cursor`] is a signed position bound to one container by a shared
//! borrow; a [`CursorMut`] holds an exclusive borrow and can write through.
//! The borrow checker keeps both from outliving the container or observing a
//! mutation made behind their back, so the only runtime checks are the ones
//! the position itself needs:
//!
//! - arithmetic may land anywhere in `0..=len` (one past the end included);
//! - dereferencing and subscripting need `0..len`;
//! - comparing or subtracting needs both cursors bound to the same container.
//!
//! The `+`, `-`, `+=` and `-=` operators panic where the `try`-style methods
//! return an [`Error`].

use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use crate::error::{Error, Result};

/// Indexed read access shared by the container facades.
pub trait Sequence {
    /// What reading one position yields.
    type Item<'a>
    where
        Self: 'a;

    /// Number of positions that can be read.
    fn len(&self) -> usize;

    /// Returns `true` if there is nothing to read.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads position `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    unsafe fn item(&self, index: usize) -> Self::Item<'_>;
}

/// Indexed write access shared by the container facades.
pub trait SequenceMut: Sequence {
    /// Writable view of one position.
    type ItemMut<'a>
    where
        Self: 'a;

    /// Writable view of position `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    unsafe fn item_mut(&mut self, index: usize) -> Self::ItemMut<'_>;
}

// ─── Position checks ─────────────────────────────────────────────────────────

#[inline]
fn to_position(index: usize) -> isize {
    isize::try_from(index).unwrap_or(isize::MAX)
}

#[inline]
fn shift(position: isize, offset: isize, len: usize) -> Result<isize> {
    position.checked_add(offset).ok_or(Error::CursorOutOfRange {
        position: if offset < 0 { isize::MIN } else { isize::MAX },
        len,
    })
}

/// Validates a position reached by arithmetic.
#[inline]
fn check_position(position: isize, len: usize) -> Result<isize> {
    match usize::try_from(position) {
        Ok(index) if index <= len => Ok(position),
        _ => Err(Error::CursorOutOfRange { position, len }),
    }
}

/// Validates a position about to be dereferenced.
#[inline]
fn check_element(position: isize, len: usize) -> Result<usize> {
    match usize::try_from(position) {
        Ok(index) if index < len => Ok(index),
        _ => Err(Error::CursorOutOfRange { position, len }),
    }
}

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Read-only random-access position in a container.
///
/// `==` and `<` treat cursors on different containers as unequal and
/// unordered; use [`try_cmp`](Cursor::try_cmp) or
/// [`distance`](Cursor::distance) to get [`Error::ForeignCursor`] instead.
/// Subtracting them with `-` panics.
pub struct Cursor<'a, C: Sequence> {
    seq: &'a C,
    position: isize,
}

impl<'a, C: Sequence> Cursor<'a, C> {
    pub(crate) fn new(seq: &'a C, index: usize) -> Self {
        Self {
            seq,
            position: to_position(index),
        }
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> isize {
        self.position
    }

    /// Returns `true` if both cursors are bound to the same container.
    #[inline]
    pub fn same_container(&self, other: &Cursor<'_, C>) -> bool {
        core::ptr::eq(self.seq, other.seq)
    }

    /// Reads the element under the cursor.
    pub fn get(&self) -> Result<C::Item<'a>> {
        let index = check_element(self.position, self.seq.len())?;
        Ok(unsafe { self.seq.item(index) })
    }

    /// Reads the element `offset` positions away without moving.
    pub fn at(&self, offset: isize) -> Result<C::Item<'a>> {
        let len = self.seq.len();
        let index = check_element(shift(self.position, offset, len)?, len)?;
        Ok(unsafe { self.seq.item(index) })
    }

    /// A new cursor `offset` positions away.
    pub fn offset(&self, offset: isize) -> Result<Self> {
        let len = self.seq.len();
        let position = check_position(shift(self.position, offset, len)?, len)?;
        Ok(Self {
            seq: self.seq,
            position,
        })
    }

    /// Moves `offset` positions; stays put on failure.
    pub fn advance(&mut self, offset: isize) -> Result<()> {
        *self = self.offset(offset)?;
        Ok(())
    }

    /// Moves `offset` positions back; stays put on failure.
    pub fn retreat(&mut self, offset: isize) -> Result<()> {
        let back = offset.checked_neg().ok_or(Error::CursorOutOfRange {
            position: isize::MIN,
            len: self.seq.len(),
        })?;
        self.advance(back)
    }

    /// Moves forward one position and returns the moved cursor.
    pub fn inc(&mut self) -> Result<&mut Self> {
        self.advance(1)?;
        Ok(self)
    }

    /// Moves back one position and returns the moved cursor.
    pub fn dec(&mut self) -> Result<&mut Self> {
        self.advance(-1)?;
        Ok(self)
    }

    /// Moves forward one position and returns the cursor as it was.
    pub fn post_inc(&mut self) -> Result<Self> {
        let old = *self;
        self.advance(1)?;
        Ok(old)
    }

    /// Moves back one position and returns the cursor as it was.
    pub fn post_dec(&mut self) -> Result<Self> {
        let old = *self;
        self.advance(-1)?;
        Ok(old)
    }

    /// Signed number of positions from `other` to `self`.
    pub fn distance(&self, other: &Cursor<'_, C>) -> Result<isize> {
        if !self.same_container(other) {
            return Err(Error::ForeignCursor);
        }
        Ok(self.position - other.position)
    }

    /// Orders two cursors bound to the same container.
    pub fn try_cmp(&self, other: &Cursor<'_, C>) -> Result<Ordering> {
        if !self.same_container(other) {
            return Err(Error::ForeignCursor);
        }
        Ok(self.position.cmp(&other.position))
    }
}

impl<C: Sequence> Clone for Cursor<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Sequence> Copy for Cursor<'_, C> {}

/// Cursors on different containers are never equal.
impl<C: Sequence> PartialEq for Cursor<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.same_container(other) && self.position == other.position
    }
}

/// Cursors on different containers are unordered.
impl<C: Sequence> PartialOrd for Cursor<'_, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl<C: Sequence> Add<isize> for Cursor<'_, C> {
    type Output = Self;

    fn add(self, rhs: isize) -> Self {
        match self.offset(rhs) {
            Ok(cursor) => cursor,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<C: Sequence> Sub<isize> for Cursor<'_, C> {
    type Output = Self;

    fn sub(self, rhs: isize) -> Self {
        let mut cursor = self;
        cursor -= rhs;
        cursor
    }
}

impl<C: Sequence> Sub for Cursor<'_, C> {
    type Output = isize;

    fn sub(self, rhs: Self) -> isize {
        match self.distance(&rhs) {
            Ok(distance) => distance,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<C: Sequence> AddAssign<isize> for Cursor<'_, C> {
    fn add_assign(&mut self, rhs: isize) {
        if let Err(err) = self.advance(rhs) {
            panic!("{err}");
        }
    }
}

impl<C: Sequence> SubAssign<isize> for Cursor<'_, C> {
    fn sub_assign(&mut self, rhs: isize) {
        if let Err(err) = self.retreat(rhs) {
            panic!("{err}");
        }
    }
}

impl<C: Sequence> fmt::Debug for Cursor<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .field("len", &self.seq.len())
            .finish()
    }
}

// ─── CursorMut ───────────────────────────────────────────────────────────────

/// Random-access position that can write through to its container.
///
/// Converts into a [`Cursor`]; there is no way back.
pub struct CursorMut<'a, C: SequenceMut> {
    seq: &'a mut C,
    position: isize,
}

impl<'a, C: SequenceMut> CursorMut<'a, C> {
    pub(crate) fn new(seq: &'a mut C, index: usize) -> Self {
        Self {
            seq,
            position: to_position(index),
        }
    }

    /// Current position.
    #[inline]
    pub fn position(&self) -> isize {
        self.position
    }

    /// A read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, C> {
        Cursor {
            seq: &*self.seq,
            position: self.position,
        }
    }

    /// Reads the element under the cursor.
    pub fn get(&self) -> Result<C::Item<'_>> {
        let index = check_element(self.position, self.seq.len())?;
        Ok(unsafe { self.seq.item(index) })
    }

    /// Writable view of the element under the cursor.
    pub fn get_mut(&mut self) -> Result<C::ItemMut<'_>> {
        let index = check_element(self.position, self.seq.len())?;
        Ok(unsafe { self.seq.item_mut(index) })
    }

    /// Reads the element `offset` positions away without moving.
    pub fn at(&self, offset: isize) -> Result<C::Item<'_>> {
        let len = self.seq.len();
        let index = check_element(shift(self.position, offset, len)?, len)?;
        Ok(unsafe { self.seq.item(index) })
    }

    /// Writable view of the element `offset` positions away.
    pub fn at_mut(&mut self, offset: isize) -> Result<C::ItemMut<'_>> {
        let len = self.seq.len();
        let index = check_element(shift(self.position, offset, len)?, len)?;
        Ok(unsafe { self.seq.item_mut(index) })
    }

    /// Moves `offset` positions; stays put on failure.
    pub fn advance(&mut self, offset: isize) -> Result<()> {
        let len = self.seq.len();
        self.position = check_position(shift(self.position, offset, len)?, len)?;
        Ok(())
    }

    /// Moves `offset` positions back; stays put on failure.
    pub fn retreat(&mut self, offset: isize) -> Result<()> {
        let back = offset.checked_neg().ok_or(Error::CursorOutOfRange {
            position: isize::MIN,
            len: self.seq.len(),
        })?;
        self.advance(back)
    }

    /// Moves forward one position.
    pub fn inc(&mut self) -> Result<&mut Self> {
        self.advance(1)?;
        Ok(self)
    }

    /// Moves back one position.
    pub fn dec(&mut self) -> Result<&mut Self> {
        self.advance(-1)?;
        Ok(self)
    }
}

impl<'a, C: SequenceMut> From<CursorMut<'a, C>> for Cursor<'a, C> {
    fn from(cursor: CursorMut<'a, C>) -> Self {
        Cursor {
            seq: cursor.seq,
            position: cursor.position,
        }
    }
}

impl<C: SequenceMut> AddAssign<isize> for CursorMut<'_, C> {
    fn add_assign(&mut self, rhs: isize) {
        if let Err(err) = self.advance(rhs) {
            panic!("{err}");
        }
    }
}

impl<C: SequenceMut> SubAssign<isize> for CursorMut<'_, C> {
    fn sub_assign(&mut self, rhs: isize) {
        if let Err(err) = self.retreat(rhs) {
            panic!("{err}");
        }
    }
}

impl<C: SequenceMut> fmt::Debug for CursorMut<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("position", &self.position)
            .field("len", &self.seq.len())
            .finish()
    }
}

// ─── Iter ────────────────────────────────────────────────────────────────────

/// Double-ended iterator over every position of a container.
pub struct Iter<'a, C: Sequence> {
    seq: &'a C,
    front: usize,
    back: usize,
}

impl<'a, C: Sequence> Iter<'a, C> {
    pub(crate) fn new(seq: &'a C) -> Self {
        Self {
            seq,
            front: 0,
            back: seq.len(),
        }
    }
}

impl<C: Sequence> Clone for Iter<'_, C> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, C: Sequence + 'a> Iterator for Iter<'a, C> {
    type Item = C::Item<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let index = self.front;
        self.front += 1;
        Some(unsafe { self.seq.item(index) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<'a, C: Sequence + 'a> DoubleEndedIterator for Iter<'a, C> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.seq.item(self.back) })
    }
}

impl<'a, C: Sequence + 'a> ExactSizeIterator for Iter<'a, C> {}

impl<'a, C: Sequence + 'a> FusedIterator for Iter<'a, C> {}

impl<C: Sequence> fmt::Debug for Iter<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("front", &self.front)
            .field("back", &self.back)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal sequence: positions read as their own index.
    struct Counting(usize, Vec<u32>);

    impl Sequence for Counting {
        type Item<'a> = usize;

        fn len(&self) -> usize {
            self.0
        }

        unsafe fn item(&self, index: usize) -> usize {
            index
        }
    }

    impl SequenceMut for Counting {
        type ItemMut<'a> = &'a mut u32;

        unsafe fn item_mut(&mut self, index: usize) -> &mut u32 {
            &mut self.1[index]
        }
    }

    #[test]
    fn test_cursor_arithmetic_allows_one_past_end() {
        let seq = Counting(3, vec![]);
        let begin = Cursor::new(&seq, 0);
        let end = begin + 3;
        assert_eq!(end, Cursor::new(&seq, 3));
        assert_eq!(end - begin, 3);
        assert_eq!(
            begin.offset(4),
            Err(Error::CursorOutOfRange { position: 4, len: 3 })
        );
        assert_eq!(
            begin.offset(-1),
            Err(Error::CursorOutOfRange { position: -1, len: 3 })
        );
    }

    #[test]
    fn test_cursor_deref_checks_element_range() {
        let seq = Counting(3, vec![]);
        let mut cursor = Cursor::new(&seq, 0);
        assert_eq!(cursor.get(), Ok(0));
        assert_eq!(cursor.at(2), Ok(2));
        assert_eq!(cursor.at(3), Err(Error::CursorOutOfRange { position: 3, len: 3 }));
        cursor.advance(3).unwrap();
        assert_eq!(cursor.get(), Err(Error::CursorOutOfRange { position: 3, len: 3 }));
        assert!(cursor.inc().is_err());
        assert_eq!(cursor.position(), 3);
    }

    #[test]
    fn test_cursor_inc_dec_pre_and_post() {
        let seq = Counting(5, vec![]);
        let mut cursor = Cursor::new(&seq, 1);
        assert_eq!(cursor.inc().unwrap().position(), 2);
        let old = cursor.post_inc().unwrap();
        assert_eq!(old.position(), 2);
        assert_eq!(cursor.position(), 3);
        let old = cursor.post_dec().unwrap();
        assert_eq!(old.position(), 3);
        assert_eq!(cursor.dec().unwrap().position(), 1);
        cursor.retreat(1).unwrap();
        assert!(cursor.dec().is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_cursor_foreign_comparisons() {
        let a = Counting(3, vec![]);
        let b = Counting(3, vec![]);
        let ca = Cursor::new(&a, 1);
        let cb = Cursor::new(&b, 1);
        assert_ne!(ca, cb);
        assert_eq!(ca.partial_cmp(&cb), None);
        assert_eq!(ca.try_cmp(&cb), Err(Error::ForeignCursor));
        assert_eq!(ca.distance(&cb), Err(Error::ForeignCursor));
        assert!(ca < Cursor::new(&a, 2));
        assert!(ca >= Cursor::new(&a, 0));
    }

    #[test]
    #[should_panic(expected = "cursors of different containers")]
    fn test_cursor_sub_foreign_panics() {
        let a = Counting(3, vec![]);
        let b = Counting(3, vec![]);
        let _ = Cursor::new(&a, 0) - Cursor::new(&b, 0);
    }

    #[test]
    #[should_panic(expected = "cursor position 4 is out of range for length 3")]
    fn test_cursor_add_past_end_panics() {
        let seq = Counting(3, vec![]);
        let _ = Cursor::new(&seq, 0) + 4;
    }

    #[test]
    fn test_cursor_mut_writes_and_converts() {
        let mut seq = Counting(3, vec![10, 20, 30]);
        let mut cursor = CursorMut::new(&mut seq, 0);
        *cursor.get_mut().unwrap() += 1;
        cursor += 2;
        *cursor.at_mut(-1).unwrap() += 2;
        assert!(cursor.at_mut(1).is_err());
        let read: Cursor<'_, Counting> = cursor.into();
        assert_eq!(read.position(), 2);
        assert_eq!(seq.1, [11, 22, 30]);
    }

    #[test]
    fn test_iter_both_ends() {
        let seq = Counting(4, vec![]);
        let mut iter = Iter::new(&seq);
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(0));
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.collect::<Vec<_>>(), [1, 2]);
    }
}
