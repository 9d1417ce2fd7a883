//! Parameter descriptors and the ordered side table that holds them.
//!
//! The table lives in the scratch half of an arena reservation. Each slot is
//! three native-endian `u64`s (`val`, `val_len`, `cmp_len`), so no unsafe
//! casting of the byte region is needed.

use std::cmp::Ordering;
use std::mem;

use byteorder::{ByteOrder, NativeEndian};

use crate::arena::Exhausted;
use crate::sort::span;

/// Size in bytes of one descriptor slot.
pub const SLOT: usize = 3 * mem::size_of::<u64>();

/// One `name[=value]` token of a query string, as offsets into the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Offset of the token in the URL.
    pub val: usize,
    /// Length of the whole token.
    pub val_len: usize,
    /// Length of the span used for matching and ordering. Zero means the
    /// name is empty.
    pub cmp_len: usize,
}

impl Param {
    /// Bytes copied to the output.
    #[inline]
    pub fn token<'u>(&self, url: &'u [u8]) -> &'u [u8] {
        &url[self.val..self.val + self.val_len]
    }

    /// Bytes used for matching and ordering.
    #[inline]
    pub fn cmp_span<'u>(&self, url: &'u [u8]) -> &'u [u8] {
        &url[self.val..self.val + self.cmp_len]
    }

    /// Same as [`Param::cmp_span`], as text. Token boundaries always fall on
    /// ASCII delimiters, so the slice is on char boundaries.
    #[inline]
    pub fn cmp_str<'u>(&self, url: &'u str) -> &'u str {
        &url[self.val..self.val + self.cmp_len]
    }
}

/// Outcome of [`ParamTable::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Inserted(usize),
    Duplicate,
}

/// Ordered, optionally unique array of [`Param`] backed by a byte region.
pub struct ParamTable<'t> {
    slots: &'t mut [u8],
    len: usize,
}

impl<'t> ParamTable<'t> {
    pub fn new(slots: &'t mut [u8]) -> Self {
        Self { slots, len: 0 }
    }

    /// Number of descriptors the region can hold.
    pub fn capacity(&self) -> usize {
        self.slots.len() / SLOT
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, idx: usize) -> Option<Param> {
        (idx < self.len).then(|| self.load(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = Param> + '_ {
        (0..self.len).map(move |i| self.load(i))
    }

    /// Places `param` according to `sort` and `uniq`.
    ///
    /// Equal spans keep their arrival order. With `uniq`, the new element is
    /// dropped when the element just before its position is equal; without
    /// `sort` that is only ever the last appended element.
    ///
    /// Fails when there is no room left for one more slot, even if the
    /// element would have been a duplicate.
    pub fn insert(
        &mut self,
        url: &[u8],
        param: Param,
        sort: bool,
        uniq: bool,
    ) -> Result<Placement, Exhausted> {
        if self.len >= self.capacity() {
            return Err(Exhausted {
                requested: (self.len + 1) * SLOT,
                available: self.slots.len(),
            });
        }

        let key = param.cmp_span(url);
        let pos = if sort && self.len > 0 {
            self.search(url, key)
        } else {
            self.len
        };

        if uniq && pos > 0 && span::is_equal(key, self.load(pos - 1).cmp_span(url)) {
            return Ok(Placement::Duplicate);
        }

        if pos < self.len {
            self.slots
                .copy_within(pos * SLOT..self.len * SLOT, (pos + 1) * SLOT);
        }
        self.store(pos, param);
        self.len += 1;
        Ok(Placement::Inserted(pos))
    }

    /// Binary search for an insertion point, then walk forward past every
    /// element the key does not sort before.
    fn search(&self, url: &[u8], key: &[u8]) -> usize {
        let (mut lo, mut hi) = (0, self.len);
        let mut i;
        let mut ord;
        loop {
            i = (lo + hi) / 2;
            ord = span::compare(key, self.load(i).cmp_span(url));
            match ord {
                Ordering::Less => hi = i,
                Ordering::Greater => lo = i + 1,
                Ordering::Equal => break,
            }
            if lo >= hi {
                break;
            }
        }

        while ord != Ordering::Less {
            i += 1;
            if i >= self.len {
                break;
            }
            ord = span::compare(key, self.load(i).cmp_span(url));
        }
        i
    }

    fn load(&self, idx: usize) -> Param {
        let s = &self.slots[idx * SLOT..(idx + 1) * SLOT];
        Param {
            val: NativeEndian::read_u64(&s[0..8]) as usize,
            val_len: NativeEndian::read_u64(&s[8..16]) as usize,
            cmp_len: NativeEndian::read_u64(&s[16..24]) as usize,
        }
    }

    fn store(&mut self, idx: usize, p: Param) {
        let s = &mut self.slots[idx * SLOT..(idx + 1) * SLOT];
        NativeEndian::write_u64(&mut s[0..8], p.val as u64);
        NativeEndian::write_u64(&mut s[8..16], p.val_len as u64);
        NativeEndian::write_u64(&mut s[16..24], p.cmp_len as u64);
    }
}
