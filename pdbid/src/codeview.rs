//! Decodes the CodeView (`RSDS`) record that identifies the PDB of an image.
//!
//! The record has this layout:
//!
//! ```text
//! offset  size  field
//! 0       4     signature, "RSDS"
//! 4       16    GUID (first three fields little-endian)
//! 20      4     age, u32 LE
//! 24      n     PDB path, UTF-8, NUL terminated
//! 24+n    ...   zero padding, up to SizeOfData
//! ```

#[cfg(test)]
mod tests;

use crate::debug_directory::expect_entry_type;
use crate::io::read_vec_at;
use crate::{BadImageFormat, DebugDirectoryEntry, DebugDirectoryEntryType, Error, ReaderOptions};
use pdbid_blob::BlobReader;
use pdbid_coff::{CODEVIEW_RSDS_HEADER_SIZE, CODEVIEW_SIGNATURE_RSDS};
use std::io::{Read, Seek};
use tracing::{debug, trace};
use uuid::Uuid;

/// The identity of the PDB that matches an image.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CodeViewDebugDirectoryData {
    /// The GUID of the PDB.
    pub guid: Uuid,
    /// The age of the PDB. It is incremented each time the PDB is updated.
    pub age: u32,
    /// The path of the PDB when the image was built.
    pub path: String,
}

impl CodeViewDebugDirectoryData {
    /// Decodes the payload of a CodeView entry.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < CODEVIEW_RSDS_HEADER_SIZE {
            return Err(Error::bad_image(BadImageFormat::CodeViewTooSmall {
                size: u32::try_from(bytes.len()).unwrap_or(u32::MAX),
            }));
        }

        let mut r = BlobReader::new(bytes);
        let signature: [u8; 4] = r.array()?;
        if signature != CODEVIEW_SIGNATURE_RSDS {
            return Err(Error::bad_image(BadImageFormat::BadCodeViewSignature(
                signature,
            )));
        }

        let guid = r.guid()?;
        let age = r.u32()?;

        let path_blob = r.take_rest();
        let Some(nul) = path_blob.iter().position(|&b| b == 0) else {
            return Err(Error::bad_image(BadImageFormat::PathNotNulTerminated));
        };

        if let Some(i) = path_blob[nul + 1..].iter().position(|&b| b != 0) {
            return Err(Error::bad_image(BadImageFormat::NonZeroPadding {
                offset: CODEVIEW_RSDS_HEADER_SIZE + nul + 1 + i,
            }));
        }

        let Ok(path) = core::str::from_utf8(&path_blob[..nul]) else {
            return Err(Error::bad_image(BadImageFormat::InvalidPathEncoding));
        };

        trace!(%guid, age, path, "decoded CodeView record");

        Ok(Self {
            guid,
            age,
            path: path.to_string(),
        })
    }

    /// The key under which a symbol server stores the PDB: the GUID as 32 uppercase hex digits
    /// followed by the age in uppercase hex, without leading zeros.
    pub fn symbol_server_key(&self) -> String {
        format!("{:X}{:X}", self.guid.as_simple(), self.age)
    }

    /// The file name of the PDB, without its directory.
    pub fn pdb_file_name(&self) -> &str {
        match self.path.rfind(['\\', '/']) {
            Some(i) => &self.path[i + 1..],
            None => &self.path,
        }
    }
}

/// Reads the CodeView record of an image file.
///
/// The payload is read from `entry.data_pointer`, so `stream` must contain the image as it is
/// stored on disk. The size of the record is not limited; use [`read_code_view_record_with`]
/// to bound it or to read a mapped image.
pub fn read_code_view_record<R: Read + Seek>(
    stream: &mut R,
    entry: &DebugDirectoryEntry,
) -> Result<CodeViewDebugDirectoryData, Error> {
    let options = ReaderOptions {
        max_code_view_size: u32::MAX,
        ..ReaderOptions::default()
    };
    read_code_view_record_with(stream, entry, &options)
}

/// Reads the CodeView record that `entry` points to.
///
/// `entry` must be a CodeView entry; passing any other type is a caller bug and is reported as
/// [`Error::WrongEntryType`].
pub fn read_code_view_record_with<R: Read + Seek>(
    stream: &mut R,
    entry: &DebugDirectoryEntry,
    options: &ReaderOptions,
) -> Result<CodeViewDebugDirectoryData, Error> {
    expect_entry_type(entry, DebugDirectoryEntryType::CODEVIEW)?;

    if (entry.data_size as usize) < CODEVIEW_RSDS_HEADER_SIZE {
        return Err(Error::bad_image(BadImageFormat::CodeViewTooSmall {
            size: entry.data_size,
        }));
    }

    if entry.data_size > options.max_code_view_size {
        return Err(Error::bad_image(BadImageFormat::CodeViewTooLarge {
            size: entry.data_size,
            max: options.max_code_view_size,
        }));
    }

    let offset = entry.data_offset(options.layout);
    debug!(offset, size = entry.data_size, "reading CodeView record");
    let bytes = read_vec_at(stream, offset, entry.data_size as usize)?;
    CodeViewDebugDirectoryData::parse(&bytes)
}
