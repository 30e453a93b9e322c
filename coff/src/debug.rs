//! The PE debug directory
//!
//! The debug directory is an array of fixed-size [`IMAGE_DEBUG_DIRECTORY`] entries. It is
//! located by the [`IMAGE_DIRECTORY_ENTRY_DEBUG`](crate::IMAGE_DIRECTORY_ENTRY_DEBUG) data
//! directory. Each entry points at a payload whose format depends on its type.
//!
//! # References
//! * <https://learn.microsoft.com/en-us/windows/win32/debug/pe-format#the-debug-section>
//! * <https://github.com/dotnet/runtime/blob/main/docs/design/specs/PE-COFF.md>

use core::mem::size_of;
use static_assertions::const_assert_eq;
use zerocopy::byteorder::{LE, U16, U32};
use zerocopy_derive::*;

#[repr(C)]
#[derive(Clone, Default, Eq, PartialEq, Hash, Debug, IntoBytes, FromBytes, Immutable, KnownLayout, Unaligned)]
pub struct IMAGE_DEBUG_DIRECTORY {
    /// Reserved. Must be zero.
    pub characteristics: U32<LE>,
    pub time_date_stamp: U32<LE>,
    pub major_version: U16<LE>,
    pub minor_version: U16<LE>,
    /// One of the [`IMAGE_DEBUG_TYPE`] values.
    pub type_: U32<LE>,
    pub size_of_data: U32<LE>,
    /// RVA of the payload when the image is mapped. Zero if the payload is not mapped.
    pub address_of_raw_data: U32<LE>,
    /// File offset of the payload.
    pub pointer_to_raw_data: U32<LE>,
}

pub const IMAGE_SIZEOF_DEBUG_DIRECTORY: usize = 28;
const_assert_eq!(
    size_of::<IMAGE_DEBUG_DIRECTORY>(),
    IMAGE_SIZEOF_DEBUG_DIRECTORY
);

/// The type code of a debug directory entry. Values that are not named below are preserved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct IMAGE_DEBUG_TYPE(pub u32);

impl IMAGE_DEBUG_TYPE {
    pub const UNKNOWN: Self = Self(0);
    pub const COFF: Self = Self(1);
    pub const CODEVIEW: Self = Self(2);
    pub const FPO: Self = Self(3);
    pub const MISC: Self = Self(4);
    pub const EXCEPTION: Self = Self(5);
    pub const FIXUP: Self = Self(6);
    pub const OMAP_TO_SRC: Self = Self(7);
    pub const OMAP_FROM_SRC: Self = Self(8);
    pub const BORLAND: Self = Self(9);
    pub const CLSID: Self = Self(11);
    pub const VC_FEATURE: Self = Self(12);
    pub const POGO: Self = Self(13);
    pub const ILTCG: Self = Self(14);
    pub const MPX: Self = Self(15);
    /// The image was built deterministically. Carries no data.
    pub const REPRO: Self = Self(16);
    /// A Portable PDB, Deflate-compressed and stored in the image.
    pub const EMBEDDED_PORTABLE_PDB: Self = Self(17);
    /// Checksum of the PDB associated with the image.
    pub const PDB_CHECKSUM: Self = Self(19);
    pub const EX_DLLCHARACTERISTICS: Self = Self(20);

    pub fn to_str_opt(self) -> Option<&'static str> {
        Some(match self {
            Self::UNKNOWN => "Unknown",
            Self::COFF => "Coff",
            Self::CODEVIEW => "CodeView",
            Self::FPO => "Fpo",
            Self::MISC => "Misc",
            Self::EXCEPTION => "Exception",
            Self::FIXUP => "Fixup",
            Self::OMAP_TO_SRC => "OmapToSrc",
            Self::OMAP_FROM_SRC => "OmapFromSrc",
            Self::BORLAND => "Borland",
            Self::CLSID => "Clsid",
            Self::VC_FEATURE => "VcFeature",
            Self::POGO => "Pogo",
            Self::ILTCG => "Iltcg",
            Self::MPX => "Mpx",
            Self::REPRO => "Reproducible",
            Self::EMBEDDED_PORTABLE_PDB => "EmbeddedPortablePdb",
            Self::PDB_CHECKSUM => "PdbChecksum",
            Self::EX_DLLCHARACTERISTICS => "ExDllCharacteristics",
            _ => return None,
        })
    }
}

impl core::fmt::Debug for IMAGE_DEBUG_TYPE {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if let Some(s) = self.to_str_opt() {
            f.write_str(s)
        } else {
            write!(f, "??{}", self.0)
        }
    }
}

impl core::fmt::Display for IMAGE_DEBUG_TYPE {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

/// `RSDS`, the signature of a PDB 7.0 CodeView record.
pub const CODEVIEW_SIGNATURE_RSDS: [u8; 4] = *b"RSDS";

/// Size of the fixed part of an `RSDS` record: signature, GUID, age.
pub const CODEVIEW_RSDS_HEADER_SIZE: usize = 24;

/// `MPDB`, the signature of an embedded Portable PDB payload.
pub const EMBEDDED_PORTABLE_PDB_SIGNATURE: [u8; 4] = *b"MPDB";

/// Size of the `MPDB` header: signature and decompressed size.
pub const EMBEDDED_PORTABLE_PDB_HEADER_SIZE: usize = 8;

/// `MinorVersion` of a CodeView entry that refers to a Portable PDB (`"PM"`).
pub const PORTABLE_CODEVIEW_MINOR_VERSION: u16 = 0x504d;

/// `MajorVersion` written for CodeView entries that refer to Portable PDB v1.0.
pub const PORTABLE_PDB_VERSION_1_0: u16 = 0x0100;
