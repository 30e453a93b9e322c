//! Reads the debug directory of Portable Executable (PE) images.
//!
//! A PE image may contain a _debug directory_: a table of fixed-size entries, each of which
//! describes one piece of debug information. The most important entry is the CodeView entry,
//! which identifies the PDB that matches the image by GUID, age and the path the PDB had when
//! the image was built. Debuggers and symbol servers use this identity to find symbols.
//!
//! The usual flow is:
//!
//! ```ignore
//! let mut f = File::open("foo.dll")?;
//! let headers = PeHeaders::read(&mut f)?;
//! let entries = read_debug_directory(&headers, &mut f, &ReaderOptions::default())?;
//! for entry in entries.iter().filter(|e| e.entry_type == DebugDirectoryEntryType::CODEVIEW) {
//!     let cv = read_code_view_record(&mut f, entry)?;
//!     println!("{} {} {}", cv.guid, cv.age, cv.path);
//! }
//! ```
//!
//! or simply [`read_debug_info`].
//!
//! All readers borrow the stream; they move its position but never close it. Every structural
//! problem is reported as [`Error::BadImageFormat`]; nothing is skipped or guessed.
//!
//! [`DebugDirectoryBuilder`] is the inverse: it produces the bytes of a debug directory and its
//! payloads, for embedding into an image.
//!
//! # References
//! * <https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#the-debug-section>
//! * <https://github.com/dotnet/runtime/blob/main/docs/design/specs/PE-COFF.md>

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

mod builder;
mod codeview;
mod debug_directory;
mod error;
mod info;
mod io;
mod options;
mod payloads;
mod pe;


pub use builder::DebugDirectoryBuilder;
pub use codeview::*;
pub use debug_directory::*;
pub use error::{BadImageFormat, Error};
pub use info::{read_debug_info, DebugInfo};
pub use options::{ImageLayout, ReaderOptions};
pub use payloads::*;
pub use pe::{OptionalHeader, PeHeaders};

pub use pdbid_blob as blob;
pub use pdbid_coff as coff;

/// The type code of a debug directory entry.
pub use pdbid_coff::IMAGE_DEBUG_TYPE as DebugDirectoryEntryType;
