#![doc(html_root_url = "https://docs.rs/stream_reassembly/latest")]
//! Public API for the `stream_reassembly` library.
//!
//! This crate rebuilds a logical byte stream from chunks delivered at
//! arbitrary offsets, out of order, duplicated or overlapping, and exposes
//! only the contiguous prefix through a non-blocking read cursor.

#[cfg(not(loom))]
pub mod actor;
pub mod metrics;
pub mod reassembly;
pub mod replay;

#[cfg(not(loom))]
pub use actor::{DEFAULT_COMMAND_CAPACITY, ReassemblyActor, ReassemblyHandle};
pub use reassembly::{
    BufferStats,
    InvalidArgument,
    MergeOutcome,
    MergePlan,
    ReassemblyBuffer,
    ReassemblyConfig,
    ReassemblyError,
    Segment,
    SegmentIndex,
    SharedReassemblyBuffer,
    StreamOffset,
};
