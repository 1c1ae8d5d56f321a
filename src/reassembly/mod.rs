//! In-memory reassembly of out-of-order byte streams.
//!
//! This module collects the types used to rebuild a logical byte stream from
//! chunks that arrive at arbitrary offsets, possibly duplicated or
//! overlapping. Each sub-module focuses on a single concept; the crate root
//! re-exports the cohesive API.

pub mod buffer;
pub mod config;
pub mod error;
pub mod index;
pub mod offset;
pub mod segment;
pub mod shared;

pub use buffer::{BufferStats, ReassemblyBuffer};
pub use config::ReassemblyConfig;
pub use error::{InvalidArgument, ReassemblyError};
pub use index::{MergeOutcome, MergePlan, SegmentIndex};
pub use offset::StreamOffset;
pub use segment::Segment;
pub use shared::SharedReassemblyBuffer;
