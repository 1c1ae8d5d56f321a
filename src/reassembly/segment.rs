//! Stored runs of contiguous stream bytes.
//!
//! A [`Segment`] never changes once built. Merging produces a new segment in
//! a fresh buffer and trimming produces a cheap [`Bytes`] slice of the old
//! one.

use bytes::{Bytes, BytesMut};

use super::{InvalidArgument, StreamOffset};

/// Contiguous byte range `[start, end)` together with its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    start: u64,
    data: Bytes,
}

impl Segment {
    /// Build a segment starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidArgument::RangeOverflow`] when `start + data.len()`
    /// does not fit in a `u64`.
    pub fn new(start: StreamOffset, data: Bytes) -> Result<Self, InvalidArgument> {
        if start.checked_add(data.len()).is_none() {
            return Err(InvalidArgument::RangeOverflow {
                offset: start,
                len: data.len(),
            });
        }
        Ok(Self {
            start: start.get(),
            data,
        })
    }

    /// First offset held by this segment.
    #[must_use]
    pub const fn start(&self) -> StreamOffset { StreamOffset::new(self.start) }

    /// Offset one past the last byte held by this segment.
    #[must_use]
    pub fn end(&self) -> StreamOffset { StreamOffset::new(self.end_raw()) }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize { self.data.len() }

    /// Whether the segment holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Borrow the stored bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes { &self.data }

    /// Whether `offset` falls inside `[start, end)`.
    #[must_use]
    pub fn covers(&self, offset: StreamOffset) -> bool {
        self.start <= offset.get() && offset.get() < self.end_raw()
    }

    pub(crate) const fn start_raw(&self) -> u64 { self.start }

    // Construction guarantees the sum fits.
    pub(crate) fn end_raw(&self) -> u64 { self.start + self.data.len() as u64 }

    /// Position of `offset` relative to `start`.
    ///
    /// Callers only pass offsets within `[start, end]`, so the distance is
    /// bounded by `data.len()` and fits a `usize`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "distance is bounded by the segment length"
    )]
    fn relative(&self, offset: u64) -> usize {
        debug_assert!(offset >= self.start && offset <= self.end_raw());
        (offset - self.start) as usize
    }

    /// Bytes from `offset` up to the end of the segment.
    pub(crate) fn bytes_from(&self, offset: u64) -> &[u8] {
        &self.data[self.relative(offset)..]
    }

    /// Share `len` bytes starting at `offset`, or `None` when they run past
    /// the end of the segment.
    pub(crate) fn slice_from(&self, offset: u64, len: usize) -> Option<Bytes> {
        let at = self.relative(offset);
        let end = at.checked_add(len)?;
        (end <= self.data.len()).then(|| self.data.slice(at..end))
    }

    /// Return the unread suffix `[offset, end)` as a new segment.
    ///
    /// The returned segment shares storage with `self`.
    pub(crate) fn suffix_from(&self, offset: u64) -> Self {
        Self {
            start: offset,
            data: self.data.slice(self.relative(offset)..),
        }
    }

    /// Drop any bytes that lie below `offset`, returning `None` when nothing
    /// remains.
    pub(crate) fn clip_below(self, offset: u64) -> Option<Self> {
        if self.end_raw() <= offset {
            return None;
        }
        if self.start >= offset {
            return Some(self);
        }
        Some(self.suffix_from(offset))
    }

    /// Combine `incoming` with the stored segments it overlaps or touches.
    ///
    /// The result spans `[start, end)` and is built in a fresh buffer. The
    /// absorbed segments are written first and `incoming` last, so bytes
    /// covered by `incoming` always come from it no matter which side the
    /// stored data sits on.
    pub(crate) fn compose(start: u64, end: u64, absorbed: &[Self], incoming: &Self) -> Self {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "span is the union of in-memory buffers"
        )]
        let span = (end - start) as usize;
        let mut buf = BytesMut::zeroed(span);
        for segment in absorbed.iter().chain(std::iter::once(incoming)) {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "segment lies within the span"
            )]
            let at = (segment.start - start) as usize;
            buf[at..at + segment.len()].copy_from_slice(&segment.data);
        }
        Self {
            start,
            data: buf.freeze(),
        }
    }
}
