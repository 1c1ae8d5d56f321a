//! Cloneable handle used by producers and the consumer to reach the actor.

use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};

use super::command::Command;
use crate::reassembly::{BufferStats, ReassemblyError, StreamOffset};

/// Cloneable handle sending commands to a [`ReassemblyActor`](super::ReassemblyActor).
///
/// The actor stops once every handle is dropped.
#[derive(Clone, Debug)]
pub struct ReassemblyHandle {
    tx: mpsc::Sender<Command>,
}

impl ReassemblyHandle {
    pub(super) fn new(tx: mpsc::Sender<Command>) -> Self { Self { tx } }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, ReassemblyError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| ReassemblyError::Closed)?;
        response.await.map_err(|_| ReassemblyError::Closed)
    }

    /// Store a chunk of the stream starting at `offset`.
    ///
    /// Waits for queue capacity, never for missing data. Empty chunks return
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Closed`] when the actor has stopped, or any
    /// error raised by [`ReassemblyBuffer::ingest_bytes`](crate::ReassemblyBuffer::ingest_bytes).
    pub async fn ingest(
        &self,
        offset: impl Into<StreamOffset>,
        data: impl Into<Bytes>,
    ) -> Result<(), ReassemblyError> {
        let data = data.into();
        if data.is_empty() {
            return Ok(());
        }
        let offset = offset.into();
        self.request(|reply| Command::Ingest {
            offset,
            data,
            reply,
        })
        .await?
    }

    /// Take up to `max` contiguous bytes from the cursor.
    ///
    /// An empty result means no data is readable yet, not end of stream.
    /// Dropping the future once the actor has taken the bytes discards them;
    /// the actor logs a warning when that happens.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Closed`] when the actor has stopped.
    pub async fn read(&self, max: usize) -> Result<Bytes, ReassemblyError> {
        if max == 0 {
            return Ok(Bytes::new());
        }
        self.request(|reply| Command::Read { max, reply }).await
    }

    /// Copy up to `dest.len()` contiguous bytes into `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Closed`] when the actor has stopped.
    pub async fn read_into(&self, dest: &mut [u8]) -> Result<usize, ReassemblyError> {
        let bytes = self.read(dest.len()).await?;
        dest[..bytes.len()].copy_from_slice(&bytes);
        Ok(bytes.len())
    }

    /// Snapshot the buffer's occupancy.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Closed`] when the actor has stopped.
    pub async fn stats(&self) -> Result<BufferStats, ReassemblyError> {
        self.request(|reply| Command::Stats { reply }).await
    }

    /// Whether the actor has stopped accepting commands.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}
