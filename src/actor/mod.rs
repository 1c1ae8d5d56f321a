//! Single-owner alternative to [`SharedReassemblyBuffer`](crate::SharedReassemblyBuffer).
//!
//! A Tokio task owns the [`ReassemblyBuffer`] outright and applies commands
//! sent through cloneable [`ReassemblyHandle`]s one at a time, so no lock is
//! needed. The task stops when every handle is dropped or its shutdown token
//! is cancelled, and hands the buffer back through its join handle.

mod command;
mod handle;

use std::num::NonZeroUsize;

use command::Command;
pub use handle::ReassemblyHandle;
use static_assertions::const_assert;
use bytes::Bytes;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::reassembly::ReassemblyBuffer;

/// Command queue depth used by [`ReassemblyActor::spawn`].
pub const DEFAULT_COMMAND_CAPACITY: usize = 64;

const_assert!(DEFAULT_COMMAND_CAPACITY > 0);

/// Task that owns a reassembly buffer and serves [`ReassemblyHandle`]s.
///
/// # Examples
///
/// ```
/// use stream_reassembly::{ReassemblyActor, ReassemblyBuffer};
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (handle, task) = ReassemblyActor::spawn(ReassemblyBuffer::new(), CancellationToken::new());
/// handle.ingest(3_u64, &b"lo"[..]).await.expect("actor running");
/// handle.ingest(0_u64, &b"hel"[..]).await.expect("actor running");
/// assert_eq!(&handle.read(16).await.expect("actor running")[..], b"hello");
///
/// drop(handle);
/// let buffer = task.await.expect("actor task panicked");
/// assert_eq!(buffer.cursor().get(), 5);
/// # }
/// ```
#[derive(Debug)]
pub struct ReassemblyActor {
    buffer: ReassemblyBuffer,
    commands: mpsc::Receiver<Command>,
    shutdown: CancellationToken,
}

impl ReassemblyActor {
    /// Build an actor around `buffer` with a command queue of `capacity`.
    ///
    /// The actor does nothing until [`run`](Self::run) is awaited.
    #[must_use]
    pub fn new(
        buffer: ReassemblyBuffer,
        capacity: NonZeroUsize,
        shutdown: CancellationToken,
    ) -> (Self, ReassemblyHandle) {
        let (tx, commands) = mpsc::channel(capacity.get());
        (
            Self {
                buffer,
                commands,
                shutdown,
            },
            ReassemblyHandle::new(tx),
        )
    }

    /// Spawn an actor on the current Tokio runtime using
    /// [`DEFAULT_COMMAND_CAPACITY`].
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(
        buffer: ReassemblyBuffer,
        shutdown: CancellationToken,
    ) -> (ReassemblyHandle, JoinHandle<ReassemblyBuffer>) {
        let capacity = NonZeroUsize::new(DEFAULT_COMMAND_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        let (actor, handle) = Self::new(buffer, capacity, shutdown);
        (handle, tokio::spawn(actor.run()))
    }

    /// Serve commands until every handle is dropped or shutdown is
    /// requested, then return the buffer.
    pub async fn run(mut self) -> ReassemblyBuffer {
        loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => {
                    debug!("reassembly actor cancelled");
                    break;
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => {
                        debug!("all reassembly handles dropped");
                        break;
                    }
                },
            }
        }
        self.buffer
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Ingest {
                offset,
                data,
                reply,
            } => {
                let len = data.len();
                let result = self.buffer.ingest_bytes(offset, data);
                match &result {
                    Ok(()) => debug!(%offset, len, "chunk ingested"),
                    Err(error) => warn!(%offset, len, %error, "chunk rejected"),
                }
                // The caller may have given up waiting; the chunk is applied
                // either way.
                let _ = reply.send(result);
            }
            Command::Read { max, reply } => {
                // Reading consumes bytes, so skip callers that already left.
                if reply.is_closed() {
                    return;
                }
                let bytes = self.buffer.read_bytes(max);
                Self::deliver(bytes, reply);
            }
            Command::Stats { reply } => {
                let _ = reply.send(self.buffer.stats());
            }
        }
    }

    // The cursor has already moved past `bytes`, so a reader that vanished
    // after the closed check loses them.
    fn deliver(bytes: Bytes, reply: oneshot::Sender<Bytes>) {
        if let Err(bytes) = reply.send(bytes)
            && !bytes.is_empty()
        {
            warn!(len = bytes.len(), "read reply dropped, delivered bytes discarded");
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tokio::sync::oneshot;
    use tracing_test::traced_test;

    use super::ReassemblyActor;

    #[traced_test]
    #[test]
    fn discarded_read_is_logged() {
        let (reply, rx) = oneshot::channel();
        drop(rx);
        ReassemblyActor::deliver(Bytes::from_static(b"lost"), reply);
        assert!(logs_contain("read reply dropped"));
    }

    #[traced_test]
    #[test]
    fn delivered_read_is_not_logged() {
        let (reply, mut rx) = oneshot::channel();
        ReassemblyActor::deliver(Bytes::from_static(b"kept"), reply);
        assert_eq!(rx.try_recv().expect("reply sent"), Bytes::from_static(b"kept"));
        assert!(!logs_contain("read reply dropped"));
    }
}
