//! Replay a complete byte stream through a [`ReassemblyBuffer`] as
//! out-of-order, overlapping and duplicated chunks.
//!
//! The planner mimics what a lossy transport hands a receiver so the buffer
//! can be exercised end to end without any networking. It backs the
//! `stream-reassembly` binary and the integration tests.

use std::num::NonZeroUsize;

use bytes::Bytes;
use log::debug;

use crate::reassembly::{ReassemblyBuffer, ReassemblyError, StreamOffset};

/// Order in which planned chunks are delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChunkOrder {
    /// Lowest offset first.
    #[default]
    Forward,
    /// Highest offset first, so nothing is readable until the last chunk.
    Reverse,
    /// Even-numbered chunks first, then the odd-numbered ones.
    Interleaved,
}

/// One delivery: a run of stream bytes at an absolute offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Offset of the first byte.
    pub offset: StreamOffset,
    /// Chunk bytes.
    pub data: Bytes,
}

/// Describes how a stream is cut into chunks and in which order they arrive.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use bytes::Bytes;
/// use stream_reassembly::replay::{ChunkOrder, ReplayPlan};
///
/// let plan = ReplayPlan::new(NonZeroUsize::new(4).expect("non-zero"))
///     .with_overlap(1)
///     .with_order(ChunkOrder::Reverse);
/// let chunks = plan.chunks(&Bytes::from_static(b"abcdefghij"));
/// let offsets: Vec<u64> = chunks.iter().map(|c| c.offset.get()).collect();
/// assert_eq!(offsets, vec![7, 3, 0]);
/// assert_eq!(&chunks[0].data[..], b"hij");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayPlan {
    /// Fresh bytes carried by each chunk.
    pub chunk_size: NonZeroUsize,
    /// Bytes each chunk repeats from the end of its predecessor.
    pub overlap: usize,
    /// Delivery order.
    pub order: ChunkOrder,
    /// Deliver every Nth chunk twice.
    pub duplicate_every: Option<NonZeroUsize>,
}

impl ReplayPlan {
    /// Plan in-order, non-overlapping chunks of `chunk_size` bytes.
    #[must_use]
    pub const fn new(chunk_size: NonZeroUsize) -> Self {
        Self {
            chunk_size,
            overlap: 0,
            order: ChunkOrder::Forward,
            duplicate_every: None,
        }
    }

    /// Extend every chunk backwards by `overlap` bytes.
    #[must_use]
    pub const fn with_overlap(mut self, overlap: usize) -> Self {
        self.overlap = overlap;
        self
    }

    /// Deliver chunks in `order`.
    #[must_use]
    pub const fn with_order(mut self, order: ChunkOrder) -> Self {
        self.order = order;
        self
    }

    /// Repeat every `n`th delivered chunk.
    #[must_use]
    pub const fn with_duplicate_every(mut self, n: Option<NonZeroUsize>) -> Self {
        self.duplicate_every = n;
        self
    }

    /// Cut `stream` into chunks in delivery order.
    ///
    /// Chunks share storage with `stream`.
    #[must_use]
    pub fn chunks(&self, stream: &Bytes) -> Vec<Chunk> {
        let mut chunks: Vec<Chunk> = (0..stream.len())
            .step_by(self.chunk_size.get())
            .map(|start| {
                let lo = start.saturating_sub(self.overlap);
                let hi = start.saturating_add(self.chunk_size.get()).min(stream.len());
                Chunk {
                    offset: StreamOffset::new(lo as u64),
                    data: stream.slice(lo..hi),
                }
            })
            .collect();

        match self.order {
            ChunkOrder::Forward => {}
            ChunkOrder::Reverse => chunks.reverse(),
            ChunkOrder::Interleaved => {
                let (even, odd): (Vec<_>, Vec<_>) = chunks
                    .into_iter()
                    .enumerate()
                    .partition(|(position, _)| position % 2 == 0);
                chunks = even
                    .into_iter()
                    .chain(odd)
                    .map(|(_, chunk)| chunk)
                    .collect();
            }
        }

        let Some(every) = self.duplicate_every else {
            return chunks;
        };
        let mut delivered = Vec::with_capacity(chunks.len() + chunks.len() / every.get());
        for (position, chunk) in chunks.into_iter().enumerate() {
            let repeat = (position + 1) % every.get() == 0;
            if repeat {
                delivered.push(chunk.clone());
            }
            delivered.push(chunk);
        }
        delivered
    }
}

/// Summary of a replay run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Chunks delivered, including duplicates.
    pub chunks: usize,
    /// Reads that returned data.
    pub reads: usize,
    /// Deliveries after which nothing was readable.
    pub stalled_polls: usize,
    /// Largest number of stored segments seen.
    pub peak_segments: usize,
    /// Largest number of buffered bytes seen.
    pub peak_buffered_bytes: usize,
    /// Bytes read back, in order.
    pub output: Vec<u8>,
}

/// Feed `chunks` into `buffer`, draining it with reads of `read_size` bytes
/// after every delivery.
///
/// # Errors
///
/// Returns the first [`ReassemblyError`] raised by the buffer, typically a
/// configured capacity limit.
pub fn replay(
    chunks: impl IntoIterator<Item = Chunk>,
    buffer: &mut ReassemblyBuffer,
    read_size: NonZeroUsize,
) -> Result<ReplayReport, ReassemblyError> {
    let mut report = ReplayReport::default();
    let mut scratch = vec![0_u8; read_size.get()];

    for chunk in chunks {
        buffer.ingest_bytes(chunk.offset, chunk.data)?;
        report.chunks += 1;
        report.peak_segments = report.peak_segments.max(buffer.segment_count());
        report.peak_buffered_bytes = report.peak_buffered_bytes.max(buffer.buffered_bytes());

        let mut drained = 0;
        loop {
            let n = buffer.read(&mut scratch);
            if n == 0 {
                break;
            }
            report.reads += 1;
            drained += n;
            report.output.extend_from_slice(&scratch[..n]);
        }
        if drained == 0 {
            report.stalled_polls += 1;
        }
    }

    debug!(
        "replayed {} chunks in {} reads, cursor now {}",
        report.chunks,
        report.reads,
        buffer.cursor()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use bytes::Bytes;
    use rstest::rstest;

    use super::{ChunkOrder, ReplayPlan, replay};
    use crate::reassembly::{ReassemblyBuffer, ReassemblyConfig, ReassemblyError};

    fn size(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

    fn offsets(plan: ReplayPlan, stream: &'static [u8]) -> Vec<u64> {
        plan.chunks(&Bytes::from_static(stream))
            .iter()
            .map(|chunk| chunk.offset.get())
            .collect()
    }

    #[rstest]
    #[case::forward(ChunkOrder::Forward, vec![0, 2, 4, 6])]
    #[case::reverse(ChunkOrder::Reverse, vec![6, 4, 2, 0])]
    #[case::interleaved(ChunkOrder::Interleaved, vec![0, 4, 2, 6])]
    fn chunks_follow_requested_order(#[case] order: ChunkOrder, #[case] expected: Vec<u64>) {
        let plan = ReplayPlan::new(size(2)).with_order(order);
        assert_eq!(offsets(plan, b"abcdefgh"), expected);
    }

    #[test]
    fn every_nth_chunk_is_repeated() {
        let plan = ReplayPlan::new(size(2)).with_duplicate_every(Some(size(2)));
        assert_eq!(offsets(plan, b"abcdef"), vec![0, 2, 2, 4]);
    }

    #[test]
    fn overlap_reaches_back_into_previous_chunk() {
        let plan = ReplayPlan::new(size(3)).with_overlap(2);
        let chunks = plan.chunks(&Bytes::from_static(b"abcdefg"));
        let data: Vec<&[u8]> = chunks.iter().map(|c| &c.data[..]).collect();
        assert_eq!(data, vec![&b"abc"[..], &b"bcdef"[..], &b"efg"[..]]);
    }

    #[test]
    fn empty_stream_has_no_chunks() {
        assert!(ReplayPlan::new(size(4)).chunks(&Bytes::new()).is_empty());
    }

    #[test]
    fn reverse_replay_stalls_until_first_chunk() {
        let stream = Bytes::from_static(b"abcdefgh");
        let plan = ReplayPlan::new(size(2)).with_order(ChunkOrder::Reverse);
        let mut buffer = ReassemblyBuffer::new();

        let report = replay(plan.chunks(&stream), &mut buffer, size(3)).expect("unbounded replay");

        assert_eq!(report.output, stream.to_vec());
        assert_eq!(report.chunks, 4);
        assert_eq!(report.stalled_polls, 3);
        assert_eq!(report.reads, 3);
        assert_eq!(report.peak_segments, 1);
        assert_eq!(report.peak_buffered_bytes, 8);
    }

    #[test]
    fn replay_surfaces_capacity_errors() {
        let stream = Bytes::from_static(b"abcdefghij");
        let plan = ReplayPlan::new(size(2)).with_order(ChunkOrder::Interleaved);
        let config = ReassemblyConfig::default().with_max_segments(size(1));
        let mut buffer = ReassemblyBuffer::with_config(config);

        let err = replay(plan.chunks(&stream), &mut buffer, size(8))
            .expect_err("second disjoint segment exceeds the cap");
        assert!(matches!(err, ReassemblyError::SegmentLimitExceeded { .. }));
    }
}
