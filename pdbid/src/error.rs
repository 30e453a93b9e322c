use crate::DebugDirectoryEntryType;
use pdbid_blob::BlobError;
use thiserror::Error;

/// Errors reported by the readers and the builder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The image violates a structural rule of the PE or CodeView format.
    #[error("bad image format: {0}")]
    BadImageFormat(#[from] BadImageFormat),

    /// The stream could not be read, or it ended in the middle of a structure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A blob could not be encoded or decoded.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// The entry passed to a payload reader has a different type than the reader decodes.
    #[error("expected a debug directory entry of type {expected}, found {actual}")]
    WrongEntryType {
        /// The type the reader decodes.
        expected: DebugDirectoryEntryType,
        /// The type of the entry that was passed.
        actual: DebugDirectoryEntryType,
    },

    /// An argument passed to the builder cannot be represented.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

impl Error {
    /// Constructor for `BadImageFormat`, also logs an event. This is useful for setting
    /// breakpoints.
    #[cfg_attr(debug_assertions, inline(never))]
    pub(crate) fn bad_image(reason: BadImageFormat) -> Self {
        tracing::debug!(%reason, "bad image format");
        Self::BadImageFormat(reason)
    }

    /// Returns `true` if the error means that the image (or a payload within it) is malformed.
    ///
    /// Callers typically report these as "could not load debug information" rather than as a
    /// failure of the tool itself. A stream that ends early is also treated as malformed.
    pub fn is_bad_image_format(&self) -> bool {
        match self {
            Self::BadImageFormat(_) => true,
            Self::Io(e) => e.kind() == std::io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

/// The structural rule that a malformed image violates.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum BadImageFormat {
    /// The image does not start with `MZ`.
    #[error("missing MS-DOS signature")]
    MissingDosSignature,

    /// `e_lfanew` does not point at `PE\0\0`.
    #[error("missing PE signature")]
    MissingPeSignature,

    /// The optional header is too small for its own fixed fields.
    #[error("optional header is too small ({size} bytes)")]
    OptionalHeaderTooSmall {
        /// `SizeOfOptionalHeader`
        size: u16,
    },

    /// The optional header magic is neither PE32 nor PE32+.
    #[error("unknown optional header magic 0x{0:04x}")]
    UnknownOptionalHeaderMagic(u16),

    /// `NumberOfRvaAndSizes` describes more directories than the optional header holds.
    #[error("{count} data directories do not fit in the optional header")]
    DataDirectoriesOutOfBounds {
        /// `NumberOfRvaAndSizes`
        count: u32,
    },

    /// The debug directory's RVA does not fall within the raw data of any section.
    #[error("debug directory at RVA 0x{rva:x} (size 0x{size:x}) is not mapped by any section")]
    DebugDirectoryNotMapped {
        /// RVA of the debug directory.
        rva: u32,
        /// Size of the debug directory.
        size: u32,
    },

    /// The debug directory size is not a multiple of the entry size.
    #[error("debug directory size {size} is not a multiple of 28")]
    InvalidDirectorySize {
        /// Size of the debug directory.
        size: u32,
    },

    /// The debug directory has more entries than [`ReaderOptions`](crate::ReaderOptions) allows.
    #[error("debug directory has {count} entries; at most {max} are allowed")]
    TooManyEntries {
        /// Number of entries in the directory.
        count: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The reserved `Characteristics` field of an entry is not zero.
    #[error("debug directory entry {index} has non-zero reserved field 0x{value:x}")]
    NonZeroReserved {
        /// Index of the entry within the directory.
        index: u32,
        /// Value of the reserved field.
        value: u32,
    },

    /// An entry's payload is larger than [`ReaderOptions`](crate::ReaderOptions) allows.
    #[error("debug directory entry data is too large ({size} bytes; at most {max} allowed)")]
    EntryDataTooLarge {
        /// `SizeOfData`
        size: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The CodeView record is shorter than its fixed header.
    #[error("CodeView record is too small ({size} bytes)")]
    CodeViewTooSmall {
        /// `SizeOfData`
        size: u32,
    },

    /// The CodeView record is larger than [`ReaderOptions`](crate::ReaderOptions) allows.
    #[error("CodeView record is too large ({size} bytes; at most {max} allowed)")]
    CodeViewTooLarge {
        /// `SizeOfData`
        size: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The CodeView record does not start with `RSDS`.
    #[error("unexpected CodeView signature {0:02x?}")]
    BadCodeViewSignature([u8; 4]),

    /// The PDB path is not NUL terminated.
    #[error("PDB path should be NUL terminated")]
    PathNotNulTerminated,

    /// A byte after the PDB path's NUL terminator is not zero.
    #[error("non-zero padding byte after the PDB path at offset {offset}")]
    NonZeroPadding {
        /// Offset of the byte within the CodeView record.
        offset: usize,
    },

    /// The PDB path is not valid UTF-8.
    #[error("PDB path is not valid UTF-8")]
    InvalidPathEncoding,

    /// The PDB checksum payload is malformed.
    #[error("invalid PDB checksum data")]
    InvalidPdbChecksum,

    /// The embedded Portable PDB payload does not start with `MPDB`.
    #[error("unexpected embedded Portable PDB signature {0:02x?}")]
    BadEmbeddedPdbSignature([u8; 4]),

    /// The embedded Portable PDB payload is shorter than its header.
    #[error("embedded Portable PDB data is too small ({size} bytes)")]
    EmbeddedPdbTooSmall {
        /// `SizeOfData`
        size: u32,
    },

    /// The declared decompressed size exceeds the configured limit.
    #[error("embedded Portable PDB is too large ({size} bytes; at most {max} allowed)")]
    EmbeddedPdbTooLarge {
        /// Declared decompressed size.
        size: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The Deflate stream of an embedded Portable PDB could not be decoded.
    #[error("embedded Portable PDB data is corrupt")]
    EmbeddedPdbCorrupt,

    /// The decompressed size of an embedded Portable PDB does not match its header.
    #[error("embedded Portable PDB decompressed to {actual} bytes, expected {expected}")]
    EmbeddedPdbSizeMismatch {
        /// Declared decompressed size.
        expected: u32,
        /// Actual decompressed size, or `expected + 1` if there was more data.
        actual: u64,
    },

    /// A Reproducible entry has data.
    #[error("reproducible debug directory entry has {size} bytes of data; expected none")]
    ReproducibleEntryHasData {
        /// `SizeOfData`
        size: u32,
    },
}
