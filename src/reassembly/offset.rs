//! Absolute byte positions within a logical stream.
//!
//! Provides [`StreamOffset`], a type-safe wrapper around `u64` with
//! overflow-checked arithmetic for computing chunk end offsets.

use derive_more::{Display, From, Into};

use super::InvalidArgument;

/// Absolute position of a byte within a reassembled stream.
///
/// # Examples
///
/// ```
/// use stream_reassembly::StreamOffset;
/// let offset = StreamOffset::new(5);
/// assert_eq!(offset.get(), 5);
/// assert_eq!(offset.checked_add(3), Some(StreamOffset::new(8)));
/// assert!(StreamOffset::try_from(-1_i64).is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
#[display("{_0}")]
pub struct StreamOffset(u64);

impl StreamOffset {
    /// Construct an offset from a `u64` value.
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    /// The first byte of every stream.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }

    /// Advance the offset by `len` bytes, returning `None` on overflow.
    #[must_use]
    pub fn checked_add(self, len: usize) -> Option<Self> {
        let len = u64::try_from(len).ok()?;
        self.0.checked_add(len).map(Self)
    }
}

impl TryFrom<i64> for StreamOffset {
    type Error = InvalidArgument;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value)
            .map(Self)
            .map_err(|_| InvalidArgument::NegativeOffset { offset: value })
    }
}
