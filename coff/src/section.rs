//! Image section
//!
//! # References
//! * <https://learn.microsoft.com/en-us/windows/win32/api/winnt/ns-winnt-image_section_header>

use bstr::BStr;
use core::fmt::Debug;
use core::mem::size_of;
use static_assertions::const_assert_eq;
use zerocopy::byteorder::{LE, U16, U32};
use zerocopy_derive::*;

#[derive(Copy, Clone, Eq, PartialEq, Default, Hash)]
#[repr(transparent)]
pub struct SectionCharacteristics(pub u32);

bitflags::bitflags! {
    impl SectionCharacteristics: u32 {
        const IMAGE_SCN_CNT_CODE                   = 0x00000020;
        const IMAGE_SCN_CNT_INITIALIZED_DATA       = 0x00000040;
        const IMAGE_SCN_CNT_UNINITIALIZED_DATA     = 0x00000080;
        const IMAGE_SCN_LNK_INFO                   = 0x00000200;
        const IMAGE_SCN_LNK_REMOVE                 = 0x00000800;
        const IMAGE_SCN_MEM_DISCARDABLE            = 0x02000000;
        const IMAGE_SCN_MEM_NOT_CACHED             = 0x04000000;
        const IMAGE_SCN_MEM_NOT_PAGED              = 0x08000000;
        const IMAGE_SCN_MEM_SHARED                 = 0x10000000;
        const IMAGE_SCN_MEM_EXECUTE                = 0x20000000;
        const IMAGE_SCN_MEM_READ                   = 0x40000000;
        const IMAGE_SCN_MEM_WRITE                  = 0x80000000;

        const _ = !0;
    }
}

impl SectionCharacteristics {
    /// Returns true if this contains `IMAGE_SCN_MEM_READ`
    pub fn is_read(self) -> bool {
        self.intersects(Self::IMAGE_SCN_MEM_READ)
    }

    /// Returns true if this contains `IMAGE_SCN_MEM_WRITE`
    pub fn is_write(self) -> bool {
        self.intersects(Self::IMAGE_SCN_MEM_WRITE)
    }

    /// Returns true if this contains `IMAGE_SCN_MEM_EXECUTE`
    pub fn is_exec(self) -> bool {
        self.intersects(Self::IMAGE_SCN_MEM_EXECUTE)
    }
}

impl Debug for SectionCharacteristics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "[{:08x} {}{}{}]",
            self.0,
            if self.is_read() { 'r' } else { '-' },
            if self.is_write() { 'w' } else { '-' },
            if self.is_exec() { 'x' } else { '-' },
        )
    }
}

pub const IMAGE_SIZEOF_SHORT_NAME: usize = 8;

#[repr(C)]
#[derive(Clone, Default, Eq, PartialEq, Hash, Debug, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
pub struct IMAGE_SECTION_HEADER {
    pub name: [u8; IMAGE_SIZEOF_SHORT_NAME],
    pub physical_address_or_virtual_size: U32<LE>,
    pub virtual_address: U32<LE>,
    pub size_of_raw_data: U32<LE>,
    pub pointer_to_raw_data: U32<LE>,
    pub pointer_to_relocations: U32<LE>,
    pub pointer_to_linenumbers: U32<LE>,
    pub number_of_relocations: U16<LE>,
    pub number_of_linenumbers: U16<LE>,
    pub characteristics: U32<LE>,
}

impl IMAGE_SECTION_HEADER {
    pub fn name(&self) -> &BStr {
        BStr::new(if let Some(i) = self.name.iter().position(|&b| b == 0) {
            &self.name[..i]
        } else {
            &self.name
        })
    }

    pub fn characteristics(&self) -> SectionCharacteristics {
        SectionCharacteristics(self.characteristics.get())
    }

    /// The number of bytes of the section that are mapped at `virtual_address`. Linkers
    /// sometimes leave `VirtualSize` as zero, in which case the raw data size is used.
    pub fn mapped_size(&self) -> u32 {
        let virtual_size = self.physical_address_or_virtual_size.get();
        if virtual_size == 0 {
            self.size_of_raw_data.get()
        } else {
            virtual_size
        }
    }

    /// Translates `rva` to a file offset, if `rva` falls within this section's raw data.
    pub fn rva_to_file_offset(&self, rva: u32) -> Option<u32> {
        let start = self.virtual_address.get();
        let relative = rva.checked_sub(start)?;
        if relative >= self.mapped_size() || relative >= self.size_of_raw_data.get() {
            return None;
        }
        self.pointer_to_raw_data.get().checked_add(relative)
    }
}

pub const IMAGE_SIZEOF_SECTION_HEADER: usize = 40;

const_assert_eq!(
    size_of::<IMAGE_SECTION_HEADER>(),
    IMAGE_SIZEOF_SECTION_HEADER
);
