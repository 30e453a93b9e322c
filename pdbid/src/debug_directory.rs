//! Reads the entries of the debug directory.

#[cfg(test)]
mod tests;

use crate::io::read_vec_at;
use crate::{BadImageFormat, DebugDirectoryEntryType, Error, ImageLayout, PeHeaders, ReaderOptions};
use pdbid_coff::{
    IMAGE_DEBUG_DIRECTORY, IMAGE_DEBUG_TYPE, IMAGE_SIZEOF_DEBUG_DIRECTORY,
    PORTABLE_CODEVIEW_MINOR_VERSION,
};
use std::io::{Read, Seek};
use tracing::{debug, debug_span, trace};
use zerocopy::byteorder::{LE, U16, U32};
use zerocopy::FromBytes;

/// One entry of the debug directory.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DebugDirectoryEntry {
    /// `TimeDateStamp`. For deterministic builds this is derived from content, not time.
    pub stamp: u32,
    /// `MajorVersion`
    pub major_version: u16,
    /// `MinorVersion`
    pub minor_version: u16,
    /// `Type`
    pub entry_type: DebugDirectoryEntryType,
    /// `SizeOfData`
    pub data_size: u32,
    /// `AddressOfRawData`: RVA of the payload, or 0 if it is not mapped.
    pub data_relative_virtual_address: u32,
    /// `PointerToRawData`: file offset of the payload.
    pub data_pointer: u32,
}

impl DebugDirectoryEntry {
    /// Converts the on-disk form, checking that the reserved field is zero.
    pub fn from_raw(raw: &IMAGE_DEBUG_DIRECTORY, index: u32) -> Result<Self, Error> {
        let reserved = raw.characteristics.get();
        if reserved != 0 {
            return Err(Error::bad_image(BadImageFormat::NonZeroReserved {
                index,
                value: reserved,
            }));
        }

        Ok(Self {
            stamp: raw.time_date_stamp.get(),
            major_version: raw.major_version.get(),
            minor_version: raw.minor_version.get(),
            entry_type: IMAGE_DEBUG_TYPE(raw.type_.get()),
            data_size: raw.size_of_data.get(),
            data_relative_virtual_address: raw.address_of_raw_data.get(),
            data_pointer: raw.pointer_to_raw_data.get(),
        })
    }

    /// Converts to the on-disk form.
    pub fn to_raw(&self) -> IMAGE_DEBUG_DIRECTORY {
        IMAGE_DEBUG_DIRECTORY {
            characteristics: U32::new(0),
            time_date_stamp: U32::new(self.stamp),
            major_version: U16::<LE>::new(self.major_version),
            minor_version: U16::new(self.minor_version),
            type_: U32::new(self.entry_type.0),
            size_of_data: U32::new(self.data_size),
            address_of_raw_data: U32::new(self.data_relative_virtual_address),
            pointer_to_raw_data: U32::new(self.data_pointer),
        }
    }

    /// Indicates whether this is a CodeView entry that refers to a Portable PDB.
    pub fn is_portable_code_view(&self) -> bool {
        self.entry_type == DebugDirectoryEntryType::CODEVIEW
            && self.minor_version == PORTABLE_CODEVIEW_MINOR_VERSION
    }

    /// The stream offset of the payload for the given layout.
    pub fn data_offset(&self, layout: ImageLayout) -> u64 {
        match layout {
            ImageLayout::File => self.data_pointer.into(),
            ImageLayout::Mapped => self.data_relative_virtual_address.into(),
        }
    }
}

/// Reads the debug directory of an image.
///
/// Returns an empty list if the image has no debug directory. The entries are returned in the
/// order in which they are stored. The stream position is moved; the stream is not closed.
///
/// Any structural problem fails the whole operation; there is no partial result.
pub fn read_debug_directory<R: Read + Seek>(
    headers: &PeHeaders,
    stream: &mut R,
    options: &ReaderOptions,
) -> Result<Vec<DebugDirectoryEntry>, Error> {
    let Some(dir) = headers.debug_directory() else {
        debug!("image has no debug directory");
        return Ok(Vec::new());
    };

    let rva = dir.virtual_address.get();
    let size = dir.size.get();
    let Some(offset) = headers.try_get_directory_offset(dir, options.layout) else {
        return Err(Error::bad_image(BadImageFormat::DebugDirectoryNotMapped {
            rva,
            size,
        }));
    };

    read_debug_directory_at(stream, offset, size, options)
}

/// Reads `size` bytes of debug directory entries from `offset` in `stream`.
///
/// This is the part of [`read_debug_directory`] that runs once the directory has been located.
pub fn read_debug_directory_at<R: Read + Seek>(
    stream: &mut R,
    offset: u64,
    size: u32,
    options: &ReaderOptions,
) -> Result<Vec<DebugDirectoryEntry>, Error> {
    let _span = debug_span!("read_debug_directory", offset, size).entered();

    if size as usize % IMAGE_SIZEOF_DEBUG_DIRECTORY != 0 {
        return Err(Error::bad_image(BadImageFormat::InvalidDirectorySize {
            size,
        }));
    }

    let count = size / IMAGE_SIZEOF_DEBUG_DIRECTORY as u32;
    if count > options.max_debug_directory_entries {
        return Err(Error::bad_image(BadImageFormat::TooManyEntries {
            count,
            max: options.max_debug_directory_entries,
        }));
    }

    let table = read_vec_at(stream, offset, size as usize)?;

    let mut entries = Vec::with_capacity(count as usize);
    let mut rest: &[u8] = &table;
    for index in 0..count {
        let Ok((raw, after)) = IMAGE_DEBUG_DIRECTORY::ref_from_prefix(rest) else {
            // The table holds exactly `count` entries; this cannot happen.
            return Err(Error::bad_image(BadImageFormat::InvalidDirectorySize {
                size,
            }));
        };
        rest = after;

        let entry = DebugDirectoryEntry::from_raw(raw, index)?;
        trace!(
            index,
            entry_type = ?entry.entry_type,
            data_size = entry.data_size,
            data_pointer = entry.data_pointer,
            "debug directory entry"
        );
        entries.push(entry);
    }

    debug!(count, "read debug directory");
    Ok(entries)
}

/// Reads the payload of any entry.
///
/// Entries with a `SizeOfData` above [`ReaderOptions::max_entry_data_size`] are rejected.
pub fn read_entry_data<R: Read + Seek>(
    stream: &mut R,
    entry: &DebugDirectoryEntry,
    options: &ReaderOptions,
) -> Result<Vec<u8>, Error> {
    if entry.data_size > options.max_entry_data_size {
        return Err(Error::bad_image(BadImageFormat::EntryDataTooLarge {
            size: entry.data_size,
            max: options.max_entry_data_size,
        }));
    }

    let offset = entry.data_offset(options.layout);
    trace!(offset, size = entry.data_size, "reading debug directory entry data");
    Ok(read_vec_at(stream, offset, entry.data_size as usize)?)
}

/// Checks that `entry` has the type that a payload reader expects.
pub(crate) fn expect_entry_type(
    entry: &DebugDirectoryEntry,
    expected: DebugDirectoryEntryType,
) -> Result<(), Error> {
    if entry.entry_type != expected {
        return Err(Error::WrongEntryType {
            expected,
            actual: entry.entry_type,
        });
    }
    Ok(())
}
