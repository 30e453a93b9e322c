//! Definitions for Portable Executable (PE) COFF binaries (Windows binaries)
//!
//! This crate only describes the on-disk layout of the structures. It does not perform any I/O;
//! see the `pdbid` crate for reading the debug directory of an image.
//!
//! All multi-byte fields are stored as little-endian, unaligned zerocopy types, so every
//! structure can be read directly from an arbitrary byte offset.
//!
//! # References
//! * <https://learn.microsoft.com/en-us/windows/win32/debug/pe-format>

#![allow(non_camel_case_types)]
#![forbid(unsafe_code)]

mod debug;
mod image;
mod machine;
mod section;

pub use debug::*;
pub use image::*;
pub use machine::*;
pub use section::*;
