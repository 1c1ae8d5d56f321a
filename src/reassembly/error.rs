//! Error types emitted by the reassembly layer.
//!
//! Gaps, duplicates and overlaps are normal operating conditions and never
//! surface here. Only malformed arguments and opt-in capacity limits do.

use std::num::NonZeroUsize;

use thiserror::Error;

use super::StreamOffset;

/// Malformed input rejected synchronously by
/// [`ReassemblyBuffer::ingest`](crate::reassembly::ReassemblyBuffer::ingest).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum InvalidArgument {
    /// A signed offset below zero was supplied.
    #[error("stream offset {offset} is negative")]
    NegativeOffset { offset: i64 },
    /// The chunk would extend past the largest representable offset.
    #[error("chunk of {len} bytes at offset {offset} overflows the stream offset space")]
    RangeOverflow { offset: StreamOffset, len: usize },
}

/// Errors produced while feeding chunks into a reassembly buffer.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The caller supplied an unusable offset or length.
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] InvalidArgument),
    /// Accepting the chunk would exceed the buffered byte cap.
    #[error("buffered bytes would reach {attempted}, exceeding the limit of {limit}")]
    BufferLimitExceeded {
        attempted: usize,
        limit: NonZeroUsize,
    },
    /// Accepting the chunk would exceed the stored segment cap.
    #[error("segment count would reach {attempted}, exceeding the limit of {limit}")]
    SegmentLimitExceeded {
        attempted: usize,
        limit: NonZeroUsize,
    },
    /// The task owning the buffer has shut down.
    #[error("reassembly actor closed")]
    Closed,
}

impl ReassemblyError {
    /// Short label used when recording rejection metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::BufferLimitExceeded { .. } => "buffer_limit",
            Self::SegmentLimitExceeded { .. } => "segment_limit",
            Self::Closed => "closed",
        }
    }
}
