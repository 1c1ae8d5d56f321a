//! Command line interface for the `stream-reassembly` binary.
//!
//! The binary replays a file through a reassembly buffer as out-of-order
//! chunks and checks that the original bytes come back out.

use std::{num::NonZeroUsize, path::PathBuf};

use clap::{Parser, ValueEnum};

/// Command line arguments for the `stream-reassembly` binary.
#[derive(Debug, Parser)]
#[command(
    name = "stream-reassembly",
    version,
    about = "Replay a file through a reassembly buffer as out-of-order chunks"
)]
pub struct Cli {
    /// File whose bytes form the stream.
    pub input: PathBuf,

    /// Write the reassembled stream here.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fresh bytes carried by each chunk.
    #[arg(long, default_value = "1024")]
    pub chunk_size: NonZeroUsize,

    /// Bytes each chunk repeats from its predecessor.
    #[arg(long, default_value_t = 0)]
    pub overlap: usize,

    /// Delivery order of the chunks.
    #[arg(long, value_enum, default_value_t = Order::Forward)]
    pub order: Order,

    /// Deliver every Nth chunk twice.
    #[arg(long)]
    pub duplicate_every: Option<NonZeroUsize>,

    /// Capacity of each read.
    #[arg(long, default_value = "4096")]
    pub read_size: NonZeroUsize,

    /// Reject chunks once this many unread bytes are buffered.
    #[arg(long)]
    pub max_buffered_bytes: Option<NonZeroUsize>,

    /// Reject chunks once this many disjoint segments are stored.
    #[arg(long)]
    pub max_segments: Option<NonZeroUsize>,
}

/// Chunk delivery orders selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Order {
    /// Lowest offset first.
    Forward,
    /// Highest offset first.
    Reverse,
    /// Even-numbered chunks, then odd-numbered ones.
    Interleaved,
}
