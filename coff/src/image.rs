use core::mem::size_of;
use static_assertions::const_assert_eq;
use zerocopy::byteorder::{LE, U16, U32, U64};
use zerocopy_derive::*;

/// `MZ`
pub const IMAGE_DOS_SIGNATURE: u16 = 0x5a4d;

/// `PE\0\0`
pub const IMAGE_NT_SIGNATURE: u32 = 0x0000_4550;

/// The MS-DOS stub header at file offset 0. Only `e_magic` and `e_lfanew` matter to us.
#[repr(C)]
#[derive(Clone, Default, Eq, PartialEq, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct IMAGE_DOS_HEADER {
    pub e_magic: U16<LE>,
    pub e_cblp: U16<LE>,
    pub e_cp: U16<LE>,
    pub e_crlc: U16<LE>,
    pub e_cparhdr: U16<LE>,
    pub e_minalloc: U16<LE>,
    pub e_maxalloc: U16<LE>,
    pub e_ss: U16<LE>,
    pub e_sp: U16<LE>,
    pub e_csum: U16<LE>,
    pub e_ip: U16<LE>,
    pub e_cs: U16<LE>,
    pub e_lfarlc: U16<LE>,
    pub e_ovno: U16<LE>,
    pub e_res: [u8; 8],
    pub e_oemid: U16<LE>,
    pub e_oeminfo: U16<LE>,
    pub e_res2: [u8; 20],
    /// File offset of the `PE\0\0` signature.
    pub e_lfanew: U32<LE>,
}

pub const IMAGE_SIZEOF_DOS_HEADER: usize = 64;
const_assert_eq!(size_of::<IMAGE_DOS_HEADER>(), IMAGE_SIZEOF_DOS_HEADER);

#[repr(C)]
#[derive(Clone, Default, Eq, PartialEq, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct IMAGE_FILE_HEADER {
    pub machine: U16<LE>,
    pub number_of_sections: U16<LE>,
    pub time_date_stamp: U32<LE>,
    pub pointer_to_symbol_table: U32<LE>,
    pub number_of_symbols: U32<LE>,
    pub size_of_optional_header: U16<LE>,
    pub characteristics: U16<LE>,
}

pub const IMAGE_SIZEOF_FILE_HEADER: usize = 20;
const_assert_eq!(size_of::<IMAGE_FILE_HEADER>(), IMAGE_SIZEOF_FILE_HEADER);

#[repr(C)]
#[derive(
    Clone, Default, Eq, PartialEq, Hash, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct IMAGE_DATA_DIRECTORY {
    pub virtual_address: U32<LE>,
    pub size: U32<LE>,
}

pub const IMAGE_SIZEOF_DATA_DIRECTORY: usize = 8;
const_assert_eq!(size_of::<IMAGE_DATA_DIRECTORY>(), IMAGE_SIZEOF_DATA_DIRECTORY);

pub const IMAGE_NUMBEROF_DIRECTORY_ENTRIES: usize = 16;

pub const IMAGE_DIRECTORY_ENTRY_EXPORT: usize = 0;
pub const IMAGE_DIRECTORY_ENTRY_IMPORT: usize = 1;
pub const IMAGE_DIRECTORY_ENTRY_RESOURCE: usize = 2;
pub const IMAGE_DIRECTORY_ENTRY_EXCEPTION: usize = 3;
pub const IMAGE_DIRECTORY_ENTRY_SECURITY: usize = 4;
pub const IMAGE_DIRECTORY_ENTRY_BASERELOC: usize = 5;
pub const IMAGE_DIRECTORY_ENTRY_DEBUG: usize = 6;
pub const IMAGE_DIRECTORY_ENTRY_ARCHITECTURE: usize = 7;
pub const IMAGE_DIRECTORY_ENTRY_GLOBALPTR: usize = 8;
pub const IMAGE_DIRECTORY_ENTRY_TLS: usize = 9;
pub const IMAGE_DIRECTORY_ENTRY_LOAD_CONFIG: usize = 10;
pub const IMAGE_DIRECTORY_ENTRY_BOUND_IMPORT: usize = 11;
pub const IMAGE_DIRECTORY_ENTRY_IAT: usize = 12;
pub const IMAGE_DIRECTORY_ENTRY_DELAY_IMPORT: usize = 13;
pub const IMAGE_DIRECTORY_ENTRY_COM_DESCRIPTOR: usize = 14;

pub const IMAGE_NT_OPTIONAL_HDR32_MAGIC: u16 = 0x10b;
pub const IMAGE_NT_OPTIONAL_HDR64_MAGIC: u16 = 0x20b;

/// The fixed part of the PE32 optional header. The data directory array follows it and holds
/// `number_of_rva_and_sizes` entries, which may be fewer than
/// [`IMAGE_NUMBEROF_DIRECTORY_ENTRIES`].
#[repr(C)]
#[derive(Clone, Default, Eq, PartialEq, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct IMAGE_OPTIONAL_HEADER32 {
    pub magic: U16<LE>,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: U32<LE>,
    pub size_of_initialized_data: U32<LE>,
    pub size_of_uninitialized_data: U32<LE>,
    pub address_of_entry_point: U32<LE>,
    pub base_of_code: U32<LE>,
    pub base_of_data: U32<LE>,
    pub image_base: U32<LE>,
    pub section_alignment: U32<LE>,
    pub file_alignment: U32<LE>,
    pub major_operating_system_version: U16<LE>,
    pub minor_operating_system_version: U16<LE>,
    pub major_image_version: U16<LE>,
    pub minor_image_version: U16<LE>,
    pub major_subsystem_version: U16<LE>,
    pub minor_subsystem_version: U16<LE>,
    pub win32_version_value: U32<LE>,
    pub size_of_image: U32<LE>,
    pub size_of_headers: U32<LE>,
    pub check_sum: U32<LE>,
    pub subsystem: U16<LE>,
    pub dll_characteristics: U16<LE>,
    pub size_of_stack_reserve: U32<LE>,
    pub size_of_stack_commit: U32<LE>,
    pub size_of_heap_reserve: U32<LE>,
    pub size_of_heap_commit: U32<LE>,
    pub loader_flags: U32<LE>,
    pub number_of_rva_and_sizes: U32<LE>,
}

pub const IMAGE_SIZEOF_OPTIONAL_HEADER32_FIXED: usize = 96;
const_assert_eq!(
    size_of::<IMAGE_OPTIONAL_HEADER32>(),
    IMAGE_SIZEOF_OPTIONAL_HEADER32_FIXED
);

/// The fixed part of the PE32+ optional header. See [`IMAGE_OPTIONAL_HEADER32`].
#[repr(C)]
#[derive(Clone, Default, Eq, PartialEq, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct IMAGE_OPTIONAL_HEADER64 {
    pub magic: U16<LE>,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: U32<LE>,
    pub size_of_initialized_data: U32<LE>,
    pub size_of_uninitialized_data: U32<LE>,
    pub address_of_entry_point: U32<LE>,
    pub base_of_code: U32<LE>,
    pub image_base: U64<LE>,
    pub section_alignment: U32<LE>,
    pub file_alignment: U32<LE>,
    pub major_operating_system_version: U16<LE>,
    pub minor_operating_system_version: U16<LE>,
    pub major_image_version: U16<LE>,
    pub minor_image_version: U16<LE>,
    pub major_subsystem_version: U16<LE>,
    pub minor_subsystem_version: U16<LE>,
    pub win32_version_value: U32<LE>,
    pub size_of_image: U32<LE>,
    pub size_of_headers: U32<LE>,
    pub check_sum: U32<LE>,
    pub subsystem: U16<LE>,
    pub dll_characteristics: U16<LE>,
    pub size_of_stack_reserve: U64<LE>,
    pub size_of_stack_commit: U64<LE>,
    pub size_of_heap_reserve: U64<LE>,
    pub size_of_heap_commit: U64<LE>,
    pub loader_flags: U32<LE>,
    pub number_of_rva_and_sizes: U32<LE>,
}

pub const IMAGE_SIZEOF_OPTIONAL_HEADER64_FIXED: usize = 112;
const_assert_eq!(
    size_of::<IMAGE_OPTIONAL_HEADER64>(),
    IMAGE_SIZEOF_OPTIONAL_HEADER64_FIXED
);
