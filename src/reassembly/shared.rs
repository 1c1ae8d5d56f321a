//! Thread-safe handle around a [`ReassemblyBuffer`].
//!
//! Producers and the consumer share one buffer behind a single mutex. Each
//! `ingest` and each `read` holds the lock for its whole duration so merges
//! and trims are never observed half done.

#[cfg(not(loom))]
use std::sync::{Arc, Mutex, MutexGuard};
use std::{fmt, sync::PoisonError};

use bytes::Bytes;
#[cfg(loom)]
use loom::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

use super::{ReassemblyBuffer, ReassemblyConfig, ReassemblyError, StreamOffset};

/// Cloneable handle sharing one reassembly buffer between threads.
///
/// # Examples
///
/// ```
/// use std::thread;
///
/// use stream_reassembly::SharedReassemblyBuffer;
///
/// let shared = SharedReassemblyBuffer::new();
/// let producer = shared.clone();
/// thread::spawn(move || producer.ingest(0_u64, b"ping").expect("valid chunk"))
///     .join()
///     .expect("producer panicked");
///
/// let mut out = [0_u8; 4];
/// assert_eq!(shared.read(&mut out), 4);
/// assert_eq!(&out, b"ping");
/// ```
#[derive(Clone)]
pub struct SharedReassemblyBuffer(Arc<Mutex<ReassemblyBuffer>>);

impl Default for SharedReassemblyBuffer {
    fn default() -> Self { Self::new() }
}

impl fmt::Debug for SharedReassemblyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedReassemblyBuffer").finish_non_exhaustive()
    }
}

impl SharedReassemblyBuffer {
    /// Share a new unbounded buffer.
    #[must_use]
    pub fn new() -> Self { Self::from_buffer(ReassemblyBuffer::new()) }

    /// Share a new buffer enforcing `config`.
    #[must_use]
    pub fn with_config(config: ReassemblyConfig) -> Self {
        Self::from_buffer(ReassemblyBuffer::with_config(config))
    }

    /// Share an existing buffer.
    #[must_use]
    pub fn from_buffer(buffer: ReassemblyBuffer) -> Self { Self(Arc::new(Mutex::new(buffer))) }

    // Every critical section leaves the index consistent before anything
    // that could panic, so a poisoned lock still guards valid state.
    fn lock(&self) -> MutexGuard<'_, ReassemblyBuffer> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a chunk; see [`ReassemblyBuffer::ingest`].
    ///
    /// # Errors
    ///
    /// Propagates any [`ReassemblyError`] from the underlying buffer.
    pub fn ingest(
        &self,
        offset: impl Into<StreamOffset>,
        data: impl AsRef<[u8]>,
    ) -> Result<(), ReassemblyError> {
        let offset = offset.into();
        let data = data.as_ref();
        let result = self.lock().ingest(offset, data);
        Self::trace_ingest(offset, data.len(), result)
    }

    /// Store an owned chunk; see [`ReassemblyBuffer::ingest_bytes`].
    ///
    /// # Errors
    ///
    /// Propagates any [`ReassemblyError`] from the underlying buffer.
    pub fn ingest_bytes(
        &self,
        offset: impl Into<StreamOffset>,
        data: Bytes,
    ) -> Result<(), ReassemblyError> {
        let offset = offset.into();
        let len = data.len();
        let result = self.lock().ingest_bytes(offset, data);
        Self::trace_ingest(offset, len, result)
    }

    fn trace_ingest(
        offset: StreamOffset,
        len: usize,
        result: Result<(), ReassemblyError>,
    ) -> Result<(), ReassemblyError> {
        match &result {
            Ok(()) => debug!(%offset, len, "chunk ingested"),
            Err(error) => warn!(%offset, len, %error, "chunk rejected"),
        }
        result
    }

    /// Copy contiguous bytes into `dest`; see [`ReassemblyBuffer::read`].
    pub fn read(&self, dest: &mut [u8]) -> usize { self.lock().read(dest) }

    /// Take up to `max` contiguous bytes; see
    /// [`ReassemblyBuffer::read_bytes`].
    pub fn read_bytes(&self, max: usize) -> Bytes { self.lock().read_bytes(max) }

    /// Offset of the next byte a read will return.
    #[must_use]
    pub fn cursor(&self) -> StreamOffset { self.lock().cursor() }

    /// Bytes held but not yet read.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize { self.lock().buffered_bytes() }

    /// Number of disjoint stored segments.
    #[must_use]
    pub fn segment_count(&self) -> usize { self.lock().segment_count() }

    /// Number of bytes a read could return right now.
    #[must_use]
    pub fn readable_len(&self) -> usize { self.lock().readable_len() }

    /// Run `f` with exclusive access to the buffer.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&mut ReassemblyBuffer) -> R) -> R {
        f(&mut self.lock())
    }
}
