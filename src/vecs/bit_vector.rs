#![cfg(feature = "bitvec")]
//! Bit-packed vector of booleans over a pluggable byte storage.
//!
//! [`BitVector<S, O>`] keeps eight flags per byte in any [`Storage<u8>`] and
//! tracks its logical length in bits. Bits within a byte are addressed
//! through `bitvec`'s [`BitSlice`], so the `O: BitOrder` parameter picks the
//! in-byte layout (`Lsb0` by default).
//!
//! A single flag is not addressable, so mutable access goes through the
//! [`BitRef`] proxy: it borrows the containing byte and rewrites exactly one
//! bit of it.
//!
//! # Pseudo-code Implementation
//!
//! ```text
//! push_back(bit):
//!     if len % 8 == 0: bytes.resize(bytes.len() + 1)?   // new byte is zero
//!     write(len, bit); len += 1
//!
//! pop_back():
//!     bit = read(len - 1); write(len - 1, false); len -= 1
//!     bytes.truncate(ceil(len / 8))
//! ```
//!
//! Bits past `len` in the last byte are always zero, so growing never has to
//! clear them and byte-level equality matches bit-level equality.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use bitvec::prelude::{BitOrder, BitSlice, Lsb0};

use crate::cursor::{Cursor, CursorMut, Iter, Sequence, SequenceMut};
use crate::error::{Error, Result};
use crate::storage::{ContiguousStorage, HeapStorage, InlineStorage, SegmentedStorage, Storage};

/// Packed booleans backed by the byte strategy `S`.
pub struct BitVector<S: Storage<u8> = HeapStorage<u8>, O: BitOrder = Lsb0> {
    bytes: S,
    len: usize,
    _order: PhantomData<O>,
}

/// Bit vector on a single doubling heap block.
pub type HeapBitVector<O = Lsb0> = BitVector<HeapStorage<u8>, O>;

/// Bit vector holding at most `N` bytes (`N * 8` bits) inline.
pub type InlineBitVector<const N: usize, O = Lsb0> = BitVector<InlineStorage<u8, N>, O>;

/// Bit vector on stable heap segments.
pub type SegmentedBitVector<O = Lsb0> = BitVector<SegmentedStorage<u8>, O>;

// ─── BitRef ──────────────────────────────────────────────────────────────────

/// Writable view of one bit.
pub struct BitRef<'a, O: BitOrder = Lsb0> {
    byte: &'a mut u8,
    bit: usize,
    _order: PhantomData<O>,
}

impl<'a, O: BitOrder> BitRef<'a, O> {
    #[inline]
    fn new(byte: &'a mut u8, bit: usize) -> Self {
        debug_assert!(bit < 8);
        Self {
            byte,
            bit,
            _order: PhantomData,
        }
    }

    /// Reads the bit.
    #[inline]
    pub fn get(&self) -> bool {
        BitSlice::<u8, O>::from_element(&*self.byte)[self.bit]
    }

    /// Writes the bit, leaving the other seven bits of the byte alone.
    #[inline]
    pub fn set(&mut self, value: bool) {
        BitSlice::<u8, O>::from_element_mut(&mut *self.byte).set(self.bit, value);
    }

    /// Writes `value` and returns the previous bit.
    #[inline]
    pub fn replace(&mut self, value: bool) -> bool {
        let old = self.get();
        self.set(value);
        old
    }

    #[inline]
    pub fn toggle(&mut self) {
        let value = self.get();
        self.set(!value);
    }
}

impl<O: BitOrder> From<BitRef<'_, O>> for bool {
    fn from(bit: BitRef<'_, O>) -> bool {
        bit.get()
    }
}

impl<O: BitOrder> PartialEq<bool> for BitRef<'_, O> {
    fn eq(&self, other: &bool) -> bool {
        self.get() == *other
    }
}

impl<O: BitOrder> fmt::Debug for BitRef<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

// ─── BitVector ───────────────────────────────────────────────────────────────

impl<S: Storage<u8> + Default, O: BitOrder> BitVector<S, O> {
    /// Creates an empty bit vector.
    #[inline]
    pub fn new() -> Self {
        Self {
            bytes: S::default(),
            len: 0,
            _order: PhantomData,
        }
    }

    /// Creates a bit vector of `len` cleared bits.
    pub fn with_len(len: usize) -> Result<Self> {
        let mut bits = Self::new();
        bits.resize(len)?;
        Ok(bits)
    }

    /// Creates a bit vector holding `values`.
    pub fn from_bools(values: &[bool]) -> Result<Self> {
        Self::try_from_iter(values.iter().copied())
    }

    /// Collects `iter`, reporting the first storage failure.
    pub fn try_from_iter<I>(iter: I) -> Result<Self>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bits = Self::new();
        bits.try_extend(iter)?;
        Ok(bits)
    }

    /// Moves the contents out, leaving an empty bit vector behind.
    #[inline]
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

impl<S: Storage<u8>, O: BitOrder> BitVector<S, O> {
    #[inline]
    fn bytes_for(bits: usize) -> usize {
        bits.div_ceil(8)
    }

    /// Reads bit `index`; its byte must be live.
    #[inline]
    unsafe fn read(&self, index: usize) -> bool {
        let byte = unsafe { self.bytes.get_unchecked(index / 8) };
        BitSlice::<u8, O>::from_element(byte)[index % 8]
    }

    /// Writes bit `index`; its byte must be live.
    #[inline]
    unsafe fn write(&mut self, index: usize, value: bool) {
        let byte = unsafe { self.bytes.get_unchecked_mut(index / 8) };
        BitSlice::<u8, O>::from_element_mut(byte).set(index % 8, value);
    }

    #[inline]
    fn check(&self, index: usize) -> Result<usize> {
        if index < self.len {
            Ok(index)
        } else {
            Err(Error::OutOfRange {
                index,
                len: self.len,
            })
        }
    }

    /// The byte storage. Bits past [`len`](BitVector::len) are zero.
    #[inline]
    pub fn storage(&self) -> &S {
        &self.bytes
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bits that fit in the bytes the storage owns.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.capacity().saturating_mul(8)
    }

    // ─── Bit access ──────────────────────────────────────────────────────────

    /// Reads bit `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    pub unsafe fn at(&self, index: usize) -> bool {
        debug_assert!(index < self.len);
        unsafe { self.read(index) }
    }

    /// Proxy for bit `index` without bounds checking.
    ///
    /// # Safety
    ///
    /// `index < self.len()`.
    #[inline]
    pub unsafe fn at_mut(&mut self, index: usize) -> BitRef<'_, O> {
        debug_assert!(index < self.len);
        let byte = unsafe { self.bytes.get_unchecked_mut(index / 8) };
        BitRef::new(byte, index % 8)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| unsafe { self.read(index) })
    }

    /// Bounds-checked read reporting [`Error::OutOfRange`].
    pub fn try_get(&self, index: usize) -> Result<bool> {
        let index = self.check(index)?;
        Ok(unsafe { self.read(index) })
    }

    /// Bounds-checked proxy for bit `index`.
    pub fn bit_mut(&mut self, index: usize) -> Result<BitRef<'_, O>> {
        let index = self.check(index)?;
        Ok(unsafe { self.at_mut(index) })
    }

    /// Writes bit `index`.
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        let index = self.check(index)?;
        unsafe { self.write(index, value) };
        Ok(())
    }

    /// Flips bit `index`.
    pub fn toggle(&mut self, index: usize) -> Result<()> {
        self.bit_mut(index)?.toggle();
        Ok(())
    }

    /// Exchanges bits `a` and `b`.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let a = self.check(a)?;
        let b = self.check(b)?;
        unsafe {
            let (bit_a, bit_b) = (self.read(a), self.read(b));
            self.write(a, bit_b);
            self.write(b, bit_a);
        }
        Ok(())
    }

    pub fn front(&self) -> Result<bool> {
        self.get(0).ok_or(Error::Empty { operation: "front" })
    }

    pub fn front_mut(&mut self) -> Result<BitRef<'_, O>> {
        if self.is_empty() {
            return Err(Error::Empty { operation: "front" });
        }
        Ok(unsafe { self.at_mut(0) })
    }

    pub fn back(&self) -> Result<bool> {
        match self.len {
            0 => Err(Error::Empty { operation: "back" }),
            len => Ok(unsafe { self.read(len - 1) }),
        }
    }

    pub fn back_mut(&mut self) -> Result<BitRef<'_, O>> {
        match self.len {
            0 => Err(Error::Empty { operation: "back" }),
            len => Ok(unsafe { self.at_mut(len - 1) }),
        }
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.iter().filter(|bit| *bit).count()
    }

    // ─── Mutation ────────────────────────────────────────────────────────────

    /// Grows with cleared bits or truncates to `new_len`.
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.bytes.resize(Self::bytes_for(new_len))?;
        self.len = new_len;
        Ok(())
    }

    /// Drops every bit at or past `new_len`.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let kept_bytes = Self::bytes_for(new_len);
        let padding_end = self.len.min(kept_bytes * 8);
        for index in new_len..padding_end {
            unsafe { self.write(index, false) };
        }
        self.bytes.truncate(kept_bytes);
        self.len = new_len;
    }

    #[inline]
    pub fn clear(&mut self) {
        self.bytes.truncate(0);
        self.len = 0;
    }

    /// Appends `value`.
    pub fn push_back(&mut self, value: bool) -> Result<()> {
        let index = self.len;
        if index % 8 == 0 {
            self.bytes.resize(Self::bytes_for(index + 1))?;
        }
        unsafe { self.write(index, value) };
        self.len = index + 1;
        Ok(())
    }

    /// Removes and returns the last bit.
    pub fn pop_back(&mut self) -> Result<bool> {
        let index = match self.len {
            0 => {
                return Err(Error::Empty {
                    operation: "pop_back",
                });
            }
            len => len - 1,
        };
        let value = unsafe { self.read(index) };
        self.truncate(index);
        Ok(value)
    }

    /// Appends every bit of `iter`; on failure the bits appended by this call
    /// are dropped again.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = bool>,
    {
        let old_len = self.len;
        for value in iter {
            if let Err(err) = self.push_back(value) {
                self.truncate(old_len);
                return Err(err);
            }
        }
        Ok(())
    }

    /// Releases slack bytes held by the storage.
    #[inline]
    pub fn shrink(&mut self) -> Result<()> {
        self.bytes.shrink_to_fit()
    }

    /// Deep copy on the same strategy.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            bytes: self.bytes.try_clone()?,
            len: self.len,
            _order: PhantomData,
        })
    }

    /// Replaces the contents with a copy of `other`; keeps the old contents
    /// if the copy fails.
    pub fn assign_from(&mut self, other: &Self) -> Result<()> {
        *self = other.try_clone()?;
        Ok(())
    }

    /// Exchanges the contents of two bit vectors.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Self) {
        core::mem::swap(self, other);
    }

    // ─── Iteration ───────────────────────────────────────────────────────────

    #[inline]
    pub fn iter(&self) -> Iter<'_, Self> {
        Iter::new(self)
    }

    #[inline]
    pub fn begin(&self) -> Cursor<'_, Self> {
        Cursor::new(self, 0)
    }

    #[inline]
    pub fn end(&self) -> Cursor<'_, Self> {
        Cursor::new(self, self.len)
    }

    #[inline]
    pub fn begin_mut(&mut self) -> CursorMut<'_, Self> {
        CursorMut::new(self, 0)
    }

    #[inline]
    pub fn end_mut(&mut self) -> CursorMut<'_, Self> {
        let len = self.len;
        CursorMut::new(self, len)
    }
}

impl<S: ContiguousStorage<u8>, O: BitOrder> BitVector<S, O> {
    /// The packed bytes, padding included.
    #[inline]
    pub fn as_raw_slice(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// The live bits as a `bitvec` slice.
    pub fn as_bitslice(&self) -> &BitSlice<u8, O> {
        &BitSlice::from_slice(self.bytes.as_slice())[..self.len]
    }

    /// The live bits as a mutable `bitvec` slice. Padding stays out of reach.
    pub fn as_mut_bitslice(&mut self) -> &mut BitSlice<u8, O> {
        let len = self.len;
        &mut BitSlice::from_slice_mut(self.bytes.as_mut_slice())[..len]
    }
}

impl<S: Storage<u8>, O: BitOrder> Sequence for BitVector<S, O> {
    type Item<'a>
        = bool
    where
        Self: 'a;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    unsafe fn item(&self, index: usize) -> bool {
        unsafe { self.read(index) }
    }
}

impl<S: Storage<u8>, O: BitOrder> SequenceMut for BitVector<S, O> {
    type ItemMut<'a>
        = BitRef<'a, O>
    where
        Self: 'a;

    #[inline]
    unsafe fn item_mut(&mut self, index: usize) -> BitRef<'_, O> {
        unsafe { self.at_mut(index) }
    }
}

impl<S: Storage<u8> + Default, O: BitOrder> Default for BitVector<S, O> {
    fn default() -> Self {
        Self::new()
    }
}

/// Panics if the storage cannot allocate the copy.
impl<S: Storage<u8>, O: BitOrder> Clone for BitVector<S, O> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<S: Storage<u8>, O: BitOrder> fmt::Debug for BitVector<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BitVector[")?;
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        f.write_str("]")
    }
}

impl<S, S2, O> PartialEq<BitVector<S2, O>> for BitVector<S, O>
where
    S: Storage<u8>,
    S2: Storage<u8>,
    O: BitOrder,
{
    fn eq(&self, other: &BitVector<S2, O>) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<S: Storage<u8>, O: BitOrder, const N: usize> PartialEq<[bool; N]> for BitVector<S, O> {
    fn eq(&self, other: &[bool; N]) -> bool {
        self.len == N && self.iter().eq(other.iter().copied())
    }
}

impl<S: Storage<u8>, O: BitOrder> Eq for BitVector<S, O> {}

impl<S: Storage<u8>, O: BitOrder> Hash for BitVector<S, O> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for index in 0..Self::bytes_for(self.len) {
            state.write_u8(unsafe { *self.bytes.get_unchecked(index) });
        }
    }
}

impl<'a, S: Storage<u8>, O: BitOrder> IntoIterator for &'a BitVector<S, O> {
    type Item = bool;
    type IntoIter = Iter<'a, BitVector<S, O>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Panics on storage failure.
impl<S: Storage<u8>, O: BitOrder> Extend<bool> for BitVector<S, O> {
    fn extend<I: IntoIterator<Item = bool>>(&mut self, iter: I) {
        if let Err(err) = self.try_extend(iter) {
            panic!("{err}");
        }
    }
}

/// Panics on storage failure.
impl<S: Storage<u8> + Default, O: BitOrder> FromIterator<bool> for BitVector<S, O> {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        match Self::try_from_iter(iter) {
            Ok(bits) => bits,
            Err(err) => panic!("{err}"),
        }
    }
}
