//! Messages exchanged between [`ReassemblyHandle`](super::ReassemblyHandle)
//! and the actor task.

use bytes::Bytes;
use tokio::sync::oneshot;

use crate::reassembly::{BufferStats, ReassemblyError, StreamOffset};

/// Request processed by the task owning the buffer.
///
/// Every variant carries a reply channel; the actor answers each command
/// before taking the next one, so commands from one handle apply in the
/// order they were sent.
#[derive(Debug)]
pub(crate) enum Command {
    /// Store a chunk.
    Ingest {
        offset: StreamOffset,
        data: Bytes,
        reply: oneshot::Sender<Result<(), ReassemblyError>>,
    },
    /// Take up to `max` contiguous bytes.
    Read {
        max: usize,
        reply: oneshot::Sender<Bytes>,
    },
    /// Report occupancy.
    Stats { reply: oneshot::Sender<BufferStats> },
}
