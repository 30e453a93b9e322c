use thiserror::Error;

/// Errors reported while building or reading a blob.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum BlobError {
    /// The input ended before a value could be fully decoded.
    #[error("unexpected end of blob at offset {offset}: {needed} more byte(s) needed")]
    UnexpectedEndOfBlob {
        /// Offset at which the value started.
        offset: usize,
        /// Number of bytes missing.
        needed: usize,
    },

    /// The first byte of a compressed integer has the reserved `111` prefix.
    #[error("invalid compressed integer header 0x{header:02x} at offset {offset}")]
    InvalidCompressedInteger {
        /// Offset of the header byte.
        offset: usize,
        /// The header byte.
        header: u8,
    },

    /// A string in the blob is not valid UTF-8.
    #[error("invalid UTF-8 string at offset {offset}")]
    InvalidUtf8 {
        /// Offset of the first byte of the string.
        offset: usize,
    },

    /// The value cannot be represented as a compressed integer.
    #[error("value {0} is out of range for a compressed integer")]
    CompressedIntegerOutOfRange(i64),

    /// The builder has already handed its contents to a caller.
    #[error("the blob builder has already been finalized")]
    AlreadyFinalized,

    /// `offset + len` does not fit within the source slice.
    #[error("range {offset}+{len} is out of bounds of a {source_len} byte slice")]
    RangeOutOfBounds {
        /// Start of the requested range.
        offset: usize,
        /// Length of the requested range.
        len: usize,
        /// Length of the slice that was indexed.
        source_len: usize,
    },

    /// A NUL-terminated string contains a NUL before its end.
    #[error("string contains an embedded NUL character")]
    EmbeddedNul,
}

impl BlobError {
    /// Returns `true` if the error indicates a bug in the caller rather than malformed input.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::CompressedIntegerOutOfRange(_)
                | Self::AlreadyFinalized
                | Self::RangeOutOfBounds { .. }
                | Self::EmbeddedNul
        )
    }

    /// Constructor for `UnexpectedEndOfBlob`, also logs an event. This is useful for setting
    /// breakpoints.
    #[cfg_attr(debug_assertions, inline(never))]
    pub(crate) fn end_of_blob(offset: usize, needed: usize) -> Self {
        tracing::debug!(offset, needed, "unexpected end of blob");
        Self::UnexpectedEndOfBlob { offset, needed }
    }
}
