//! Bounded bump arena over a caller-provided byte buffer.
//!
//! ## Memory Layout
//!
//! ```text
//! [committed][ reservation: text ... | pad | descriptor slots ... ][free]
//!             ^                       ^                            ^
//!             cursor                  align_up(max text len)       end
//! ```
//!
//! A rewrite reserves every free byte, writes its output from the front,
//! keeps scratch data behind an aligned offset, then commits only the text.
//! Nothing here allocates; running out of room is reported as [`Exhausted`]
//! and the caller falls back to its input.

use std::mem;


/// Alignment of descriptor regions and committed lengths.
pub const ALIGN: usize = mem::align_of::<usize>();

/// Rounds `n` up to the next multiple of [`ALIGN`], `None` on overflow.
#[inline]
pub const fn align_up(n: usize) -> Option<usize> {
    match n.checked_add(ALIGN - 1) {
        Some(v) => Some(v & !(ALIGN - 1)),
        None => None,
    }
}

/// Returned when a write or a reservation would pass the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("arena exhausted: {requested} bytes requested, {available} available")]
pub struct Exhausted {
    pub requested: usize,
    pub available: usize,
}

/// Fixed-capacity arena. Never grows.
pub struct Arena<'a> {
    free: &'a mut [u8],
    capacity: usize,
}

impl<'a> Arena<'a> {
    /// Wraps `buf`; its whole length is the arena capacity.
    pub fn new(buf: &'a mut [u8]) -> Self {
        let capacity = buf.len();
        Self { free: buf, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes handed out by committed reservations, alignment padding included.
    pub fn used(&self) -> usize {
        self.capacity - self.free.len()
    }

    pub fn remaining(&self) -> usize {
        self.free.len()
    }

    /// Reserves all free space. Dropping the reservation without
    /// [`Reservation::commit`] gives every byte back.
    pub fn reserve(&mut self) -> Reservation<'_, 'a> {
        let region = mem::take(&mut self.free);
        Reservation {
            arena: self,
            region,
            committed: false,
        }
    }
}

/// Exclusive view over the arena's free space while a rewrite is running.
pub struct Reservation<'r, 'a> {
    arena: &'r mut Arena<'a>,
    region: &'a mut [u8],
    committed: bool,
}

impl<'r, 'a> Reservation<'r, 'a> {
    /// End boundary of the reservation.
    pub fn len(&self) -> usize {
        self.region.len()
    }

    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// Splits the reserved space into a text region `[0, mid)` and a scratch
    /// region `[mid, end)`.
    pub fn split_at_mut(&mut self, mid: usize) -> Result<(&mut [u8], &mut [u8]), Exhausted> {
        if mid > self.region.len() {
            return Err(Exhausted {
                requested: mid,
                available: self.region.len(),
            });
        }
        Ok(self.region.split_at_mut(mid))
    }

    /// Keeps the first `used` bytes. The arena cursor moves by `used` rounded
    /// up to [`ALIGN`], capped at the end of the reservation.
    pub fn commit(mut self, used: usize) -> Result<&'a mut [u8], Exhausted> {
        let len = self.region.len();
        if used > len {
            return Err(Exhausted {
                requested: used,
                available: len,
            });
        }
        let keep = align_up(used).map_or(len, |n| n.min(len));
        let region = mem::take(&mut self.region);
        let (head, tail) = region.split_at_mut(keep);
        self.arena.free = tail;
        self.committed = true;
        Ok(&mut head[..used])
    }
}

impl Drop for Reservation<'_, '_> {
    fn drop(&mut self) {
        if !self.committed {
            self.arena.free = mem::take(&mut self.region);
        }
    }
}

/// Bounds-checked forward writer over a byte region.
pub struct Cursor<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> Cursor<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Appends `src`, or writes nothing at all if it does not fit.
    pub fn put(&mut self, src: &[u8]) -> Result<(), Exhausted> {
        if src.len() > self.remaining() {
            return Err(Exhausted {
                requested: src.len(),
                available: self.remaining(),
            });
        }
        let end = self.pos + src.len();
        self.buf[self.pos..end].copy_from_slice(src);
        self.pos = end;
        Ok(())
    }

    pub fn put_byte(&mut self, b: u8) -> Result<(), Exhausted> {
        self.put(&[b])
    }
}
