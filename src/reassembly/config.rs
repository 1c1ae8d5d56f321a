//! Resource limits applied by [`ReassemblyBuffer`](super::ReassemblyBuffer).

use std::num::NonZeroUsize;

use super::ReassemblyError;

/// Optional caps on what a buffer may hold before it is read.
///
/// Both limits are disabled by default, leaving memory bounded only by what
/// producers send. Chunks that would push a buffer past a configured limit
/// are rejected whole and leave the buffer unchanged.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use stream_reassembly::ReassemblyConfig;
///
/// let config = ReassemblyConfig::default()
///     .with_max_buffered_bytes(NonZeroUsize::new(64 * 1024).expect("non-zero"))
///     .with_max_segments(NonZeroUsize::new(128).expect("non-zero"));
/// assert_eq!(config.max_segments.map(NonZeroUsize::get), Some(128));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReassemblyConfig {
    /// Ceiling on buffered but unread bytes.
    pub max_buffered_bytes: Option<NonZeroUsize>,
    /// Ceiling on the number of disjoint stored segments.
    pub max_segments: Option<NonZeroUsize>,
}

impl ReassemblyConfig {
    /// Configuration with no limits.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            max_buffered_bytes: None,
            max_segments: None,
        }
    }

    /// Cap the number of buffered but unread bytes.
    #[must_use]
    pub const fn with_max_buffered_bytes(mut self, limit: NonZeroUsize) -> Self {
        self.max_buffered_bytes = Some(limit);
        self
    }

    /// Cap the number of stored segments.
    #[must_use]
    pub const fn with_max_segments(mut self, limit: NonZeroUsize) -> Self {
        self.max_segments = Some(limit);
        self
    }

    /// Check the totals a pending merge would produce.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::BufferLimitExceeded`] or
    /// [`ReassemblyError::SegmentLimitExceeded`] when the respective limit
    /// would be exceeded.
    pub(crate) fn check(
        &self,
        attempted_bytes: usize,
        attempted_segments: usize,
    ) -> Result<(), ReassemblyError> {
        if let Some(limit) = self.max_buffered_bytes
            && attempted_bytes > limit.get()
        {
            return Err(ReassemblyError::BufferLimitExceeded {
                attempted: attempted_bytes,
                limit,
            });
        }

        if let Some(limit) = self.max_segments
            && attempted_segments > limit.get()
        {
            return Err(ReassemblyError::SegmentLimitExceeded {
                attempted: attempted_segments,
                limit,
            });
        }

        Ok(())
    }
}
