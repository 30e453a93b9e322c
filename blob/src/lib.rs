//! Reads and writes metadata blobs.
//!
//! Metadata blobs (custom attribute values, marshalling descriptors, signatures, Portable PDB
//! records) are tightly packed byte sequences that mix raw bytes with ECMA-335 _compressed
//! integers_. A compressed integer stores an unsigned value in `[0, 0x1FFF_FFFF]` using 1, 2 or
//! 4 bytes, with the length selected by the high bits of the first byte:
//!
//! ```text
//! 0xxxxxxx                              0 ..= 0x7F
//! 10xxxxxx xxxxxxxx                     0x80 ..= 0x3FFF
//! 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx   0x4000 ..= 0x1FFF_FFFF
//! ```
//!
//! [`BlobBuilder`] is the write side: an append-only buffer that is handed to its caller exactly
//! once. [`BlobReader`] is the read side: a cursor over a byte slice that never reads past the
//! end of its input.
//!
//! # References
//! * ECMA-335, Partition II, 23.2 "Blobs and signatures"

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

mod builder;
mod compressed;
mod error;
mod reader;


pub use builder::BlobBuilder;
pub use compressed::*;
pub use error::BlobError;
pub use reader::BlobReader;
