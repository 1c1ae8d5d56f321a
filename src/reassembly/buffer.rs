//! Public reassembly buffer exposing the contiguous prefix of a stream.
//!
//! [`ReassemblyBuffer`] accepts chunks at arbitrary offsets in any order and
//! hands out bytes strictly in stream order from a read cursor. Reading never
//! waits: when the byte at the cursor has not arrived yet the read returns
//! zero and the caller polls again later.

use bytes::{Bytes, BytesMut};
use log::debug;

use super::{
    MergeOutcome,
    ReassemblyConfig,
    ReassemblyError,
    Segment,
    SegmentIndex,
    StreamOffset,
};
use crate::metrics;

/// Point-in-time view of a buffer's occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BufferStats {
    /// Offset of the next byte a read returns.
    pub cursor: StreamOffset,
    /// Bytes held but not yet read.
    pub buffered_bytes: usize,
    /// Number of disjoint stored segments.
    pub segment_count: usize,
    /// Bytes a read could return right now.
    pub readable_len: usize,
}

/// In-memory reconstruction of a single logical byte stream.
///
/// # Examples
///
/// ```
/// use stream_reassembly::ReassemblyBuffer;
///
/// let mut buffer = ReassemblyBuffer::new();
/// buffer.ingest(5_u64, b"World").expect("valid chunk");
/// let mut out = [0_u8; 10];
/// assert_eq!(buffer.read(&mut out), 0);
///
/// buffer.ingest(0_u64, b"Hello").expect("valid chunk");
/// assert_eq!(buffer.read(&mut out), 10);
/// assert_eq!(&out, b"HelloWorld");
/// ```
#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    index: SegmentIndex,
    cursor: u64,
    config: ReassemblyConfig,
}

impl ReassemblyBuffer {
    /// Create an empty, unbounded buffer with its cursor at offset zero.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty buffer enforcing `config`.
    #[must_use]
    pub fn with_config(config: ReassemblyConfig) -> Self {
        Self {
            index: SegmentIndex::new(),
            cursor: 0,
            config,
        }
    }

    /// Limits this buffer enforces.
    #[must_use]
    pub const fn config(&self) -> &ReassemblyConfig { &self.config }

    /// Offset of the next byte [`read`](Self::read) will return.
    #[must_use]
    pub const fn cursor(&self) -> StreamOffset { StreamOffset::new(self.cursor) }

    /// Bytes held but not yet read.
    #[must_use]
    pub const fn buffered_bytes(&self) -> usize { self.index.buffered_bytes() }

    /// Number of disjoint stored segments.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.index.len() }

    /// Whether nothing is buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.index.is_empty() }

    /// Iterate stored segments in stream order.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> { self.index.iter() }

    /// Number of bytes a read could return right now.
    #[must_use]
    pub fn readable_len(&self) -> usize {
        self.index
            .contiguous_from(self.cursor)
            .map(|segment| segment.bytes_from(self.cursor.max(segment.start_raw())).len())
            .sum()
    }

    /// Snapshot the cursor and occupancy counters.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            cursor: self.cursor(),
            buffered_bytes: self.buffered_bytes(),
            segment_count: self.segment_count(),
            readable_len: self.readable_len(),
        }
    }

    /// Store a chunk of the stream starting at `offset`.
    ///
    /// Empty chunks are ignored. Bytes below the cursor were already
    /// delivered and are discarded. Where the chunk overlaps buffered data
    /// its own bytes replace the stored ones.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::InvalidArgument`] when the chunk would end
    /// beyond `u64::MAX`, and [`ReassemblyError::BufferLimitExceeded`] or
    /// [`ReassemblyError::SegmentLimitExceeded`] when a configured limit
    /// would be breached. A rejected chunk leaves the buffer unchanged.
    pub fn ingest(
        &mut self,
        offset: impl Into<StreamOffset>,
        data: impl AsRef<[u8]>,
    ) -> Result<(), ReassemblyError> {
        let data = data.as_ref();
        if data.is_empty() {
            return Ok(());
        }
        self.ingest_bytes(offset, Bytes::copy_from_slice(data))
    }

    /// Store an owned chunk, avoiding a copy when it merges with nothing.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`ingest`](Self::ingest).
    pub fn ingest_bytes(
        &mut self,
        offset: impl Into<StreamOffset>,
        data: Bytes,
    ) -> Result<(), ReassemblyError> {
        let offset = offset.into();
        if data.is_empty() {
            return Ok(());
        }
        let len = data.len();
        match self.store(offset, data) {
            Ok(outcome) => {
                if outcome.added_bytes == 0 {
                    debug!("chunk of {len} bytes at offset {offset} carried no new data");
                }
                metrics::record_ingest(len, outcome.overlap_bytes, outcome.added_bytes);
                Ok(())
            }
            Err(err) => {
                metrics::inc_rejections(err.reason());
                Err(err)
            }
        }
    }

    /// Merge a chunk into the index. Bytes clipped below the cursor count as
    /// overlap in the returned outcome.
    fn store(
        &mut self,
        offset: StreamOffset,
        data: Bytes,
    ) -> Result<MergeOutcome, ReassemblyError> {
        let incoming = Segment::new(offset, data)?;
        let len = incoming.len();
        let Some(incoming) = incoming.clip_below(self.cursor) else {
            return Ok(MergeOutcome {
                absorbed_segments: 0,
                overlap_bytes: len,
                added_bytes: 0,
            });
        };
        let clipped = len - incoming.len();
        let plan = self.index.plan_merge(&incoming);
        let attempted_bytes =
            self.index.buffered_bytes() - plan.absorbed_bytes() + plan.merged_len();
        let attempted_segments = self.index.len() - plan.absorbed_segments() + 1;
        self.config.check(attempted_bytes, attempted_segments)?;
        let mut outcome = self.index.apply(plan, incoming);
        outcome.overlap_bytes += clipped;
        Ok(outcome)
    }

    /// Copy contiguous bytes from the cursor into `dest`.
    ///
    /// Returns how many bytes were written, which is zero when `dest` is
    /// empty or the byte at the cursor has not arrived. A zero return does
    /// not signal end of stream. Delivered bytes are released from the
    /// buffer.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        if dest.is_empty() {
            return 0;
        }
        let mut position = self.cursor;
        let mut copied = 0;
        for segment in self.index.contiguous_from(self.cursor) {
            let source = segment.bytes_from(position.max(segment.start_raw()));
            let n = source.len().min(dest.len() - copied);
            dest[copied..copied + n].copy_from_slice(&source[..n]);
            copied += n;
            position += n as u64;
            if copied == dest.len() {
                break;
            }
        }
        self.advance(position, copied);
        copied
    }

    /// Take up to `max` contiguous bytes from the cursor as owned [`Bytes`].
    ///
    /// Returns an empty value when nothing is readable. Bytes served from a
    /// single stored segment share its storage.
    pub fn read_bytes(&mut self, max: usize) -> Bytes {
        let want = max.min(self.readable_len());
        if want == 0 {
            return Bytes::new();
        }
        if let Some(bytes) = self
            .index
            .covering(self.cursor)
            .and_then(|segment| segment.slice_from(self.cursor, want))
        {
            self.advance(self.cursor + want as u64, want);
            return bytes;
        }
        let mut out = BytesMut::zeroed(want);
        let copied = self.read(&mut out);
        out.truncate(copied);
        out.freeze()
    }

    fn advance(&mut self, position: u64, copied: usize) {
        if copied == 0 {
            return;
        }
        self.cursor = position;
        self.index.trim_below(position);
        metrics::record_delivery(copied);
    }
}

impl Drop for ReassemblyBuffer {
    fn drop(&mut self) { metrics::release_buffered(self.index.buffered_bytes()); }
}
