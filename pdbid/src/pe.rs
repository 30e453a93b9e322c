//! Locates the headers, data directories and sections of a PE image.

use crate::io::{read_struct, read_struct_at};
use crate::{BadImageFormat, Error, ImageLayout};
use pdbid_coff::*;
use std::io::{Read, Seek};
use tracing::{debug, trace};
use zerocopy::byteorder::{LE, U32};
use zerocopy::FromBytes;

/// The fixed part of the optional header, in either of its two forms.
#[derive(Clone, Debug)]
pub enum OptionalHeader {
    /// A 32-bit image.
    Pe32(IMAGE_OPTIONAL_HEADER32),
    /// A 64-bit image.
    Pe32Plus(IMAGE_OPTIONAL_HEADER64),
}

impl OptionalHeader {
    fn number_of_rva_and_sizes(&self) -> u32 {
        match self {
            Self::Pe32(h) => h.number_of_rva_and_sizes.get(),
            Self::Pe32Plus(h) => h.number_of_rva_and_sizes.get(),
        }
    }

    /// `SizeOfImage`
    pub fn size_of_image(&self) -> u32 {
        match self {
            Self::Pe32(h) => h.size_of_image.get(),
            Self::Pe32Plus(h) => h.size_of_image.get(),
        }
    }

    /// `ImageBase`
    pub fn image_base(&self) -> u64 {
        match self {
            Self::Pe32(h) => h.image_base.get().into(),
            Self::Pe32Plus(h) => h.image_base.get(),
        }
    }
}

/// The headers of a PE image.
///
/// All file offsets are relative to the start of the stream, which must be the start of the
/// image.
#[derive(Clone, Debug)]
pub struct PeHeaders {
    pe_header_offset: u32,
    file_header: IMAGE_FILE_HEADER,
    optional_header: OptionalHeader,
    data_directories: Vec<IMAGE_DATA_DIRECTORY>,
    sections: Vec<IMAGE_SECTION_HEADER>,
}

impl PeHeaders {
    /// Reads the headers of the image at the start of `stream`.
    pub fn read<R: Read + Seek>(stream: &mut R) -> Result<Self, Error> {
        let dos_header: IMAGE_DOS_HEADER = read_struct_at(stream, 0)?;
        if dos_header.e_magic.get() != IMAGE_DOS_SIGNATURE {
            return Err(Error::bad_image(BadImageFormat::MissingDosSignature));
        }

        let pe_header_offset = dos_header.e_lfanew.get();
        let signature: U32<LE> = read_struct_at(stream, pe_header_offset.into())?;
        if signature.get() != IMAGE_NT_SIGNATURE {
            return Err(Error::bad_image(BadImageFormat::MissingPeSignature));
        }

        let file_header: IMAGE_FILE_HEADER = read_struct(stream)?;
        let optional_header_size = file_header.size_of_optional_header.get();
        debug!(
            pe_header_offset,
            machine = ?IMAGE_FILE_MACHINE(file_header.machine.get()),
            num_sections = file_header.number_of_sections.get(),
            optional_header_size,
            "read file header"
        );

        let mut optional_header_bytes = vec![0u8; optional_header_size as usize];
        stream.read_exact(&mut optional_header_bytes)?;
        let (optional_header, directory_bytes) =
            parse_optional_header(&optional_header_bytes, optional_header_size)?;

        let num_directories = optional_header.number_of_rva_and_sizes();
        let mut data_directories = Vec::new();
        let mut rest = directory_bytes;
        for _ in 0..num_directories {
            let Ok((dir, after)) = IMAGE_DATA_DIRECTORY::read_from_prefix(rest) else {
                return Err(Error::bad_image(
                    BadImageFormat::DataDirectoriesOutOfBounds {
                        count: num_directories,
                    },
                ));
            };
            data_directories.push(dir);
            rest = after;
        }

        // The section table immediately follows the optional header.
        let num_sections = file_header.number_of_sections.get() as usize;
        let mut sections = Vec::with_capacity(num_sections);
        for _ in 0..num_sections {
            let section: IMAGE_SECTION_HEADER = read_struct(stream)?;
            trace!(
                name = %section.name(),
                va = section.virtual_address.get(),
                raw = section.pointer_to_raw_data.get(),
                raw_size = section.size_of_raw_data.get(),
                "section"
            );
            sections.push(section);
        }

        Ok(Self {
            pe_header_offset,
            file_header,
            optional_header,
            data_directories,
            sections,
        })
    }

    /// File offset of the `PE\0\0` signature.
    pub fn pe_header_offset(&self) -> u32 {
        self.pe_header_offset
    }

    /// The COFF file header.
    pub fn file_header(&self) -> &IMAGE_FILE_HEADER {
        &self.file_header
    }

    /// The fixed part of the optional header.
    pub fn optional_header(&self) -> &OptionalHeader {
        &self.optional_header
    }

    /// The target machine.
    pub fn machine(&self) -> IMAGE_FILE_MACHINE {
        IMAGE_FILE_MACHINE(self.file_header.machine.get())
    }

    /// The link time stamp of the image.
    pub fn time_date_stamp(&self) -> u32 {
        self.file_header.time_date_stamp.get()
    }

    /// Indicates whether this is a PE32+ (64-bit) image.
    pub fn is_pe32_plus(&self) -> bool {
        matches!(self.optional_header, OptionalHeader::Pe32Plus(_))
    }

    /// The data directories that are present in the optional header.
    pub fn data_directories(&self) -> &[IMAGE_DATA_DIRECTORY] {
        &self.data_directories
    }

    /// Gets a data directory by its `IMAGE_DIRECTORY_ENTRY_*` index.
    pub fn data_directory(&self, index: usize) -> Option<&IMAGE_DATA_DIRECTORY> {
        self.data_directories.get(index)
    }

    /// Gets the debug data directory, if the image has a non-empty one.
    pub fn debug_directory(&self) -> Option<&IMAGE_DATA_DIRECTORY> {
        self.data_directory(IMAGE_DIRECTORY_ENTRY_DEBUG)
            .filter(|dir| dir.size.get() != 0)
    }

    /// The section table.
    pub fn sections(&self) -> &[IMAGE_SECTION_HEADER] {
        &self.sections
    }

    /// Finds the index of the section whose raw data contains `rva`.
    pub fn section_containing(&self, rva: u32) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.rva_to_file_offset(rva).is_some())
    }

    /// Translates an RVA to a file offset.
    pub fn rva_to_file_offset(&self, rva: u32) -> Option<u32> {
        self.sections.iter().find_map(|s| s.rva_to_file_offset(rva))
    }

    /// Finds the stream offset of a data directory.
    ///
    /// For [`ImageLayout::File`], the whole directory must lie within the raw data of a single
    /// section. For [`ImageLayout::Mapped`], the RVA is the offset.
    pub fn try_get_directory_offset(
        &self,
        dir: &IMAGE_DATA_DIRECTORY,
        layout: ImageLayout,
    ) -> Option<u64> {
        let rva = dir.virtual_address.get();
        match layout {
            ImageLayout::Mapped => Some(rva.into()),
            ImageLayout::File => {
                let section = &self.sections[self.section_containing(rva)?];
                let relative = rva - section.virtual_address.get();
                let available = section
                    .size_of_raw_data
                    .get()
                    .min(section.mapped_size())
                    - relative;
                if dir.size.get() > available {
                    debug!(rva, size = dir.size.get(), available, "directory crosses section end");
                    return None;
                }
                section.rva_to_file_offset(rva).map(u64::from)
            }
        }
    }
}

fn parse_optional_header(
    bytes: &[u8],
    size: u16,
) -> Result<(OptionalHeader, &[u8]), Error> {
    let too_small = || Error::bad_image(BadImageFormat::OptionalHeaderTooSmall { size });

    let magic = match bytes {
        [lo, hi, ..] => u16::from_le_bytes([*lo, *hi]),
        _ => return Err(too_small()),
    };

    match magic {
        IMAGE_NT_OPTIONAL_HDR32_MAGIC => {
            let (h, rest) =
                IMAGE_OPTIONAL_HEADER32::read_from_prefix(bytes).map_err(|_| too_small())?;
            Ok((OptionalHeader::Pe32(h), rest))
        }
        IMAGE_NT_OPTIONAL_HDR64_MAGIC => {
            let (h, rest) =
                IMAGE_OPTIONAL_HEADER64::read_from_prefix(bytes).map_err(|_| too_small())?;
            Ok((OptionalHeader::Pe32Plus(h), rest))
        }
        _ => Err(Error::bad_image(
            BadImageFormat::UnknownOptionalHeaderMagic(magic),
        )),
    }
}
