#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct IMAGE_FILE_MACHINE(pub u16);

impl IMAGE_FILE_MACHINE {
    pub const IMAGE_FILE_MACHINE_UNKNOWN: Self = Self(0);
    /// Intel 386.
    pub const IMAGE_FILE_MACHINE_I386: Self = Self(0x014c);
    /// ARM Little-Endian
    pub const IMAGE_FILE_MACHINE_ARM: Self = Self(0x01c0);
    /// ARM Thumb-2 Little-Endian
    pub const IMAGE_FILE_MACHINE_ARMNT: Self = Self(0x01c4);
    /// Intel 64
    pub const IMAGE_FILE_MACHINE_IA64: Self = Self(0x0200);
    /// EFI Byte Code
    pub const IMAGE_FILE_MACHINE_EBC: Self = Self(0x0EBC);
    /// AMD64 (K8)
    pub const IMAGE_FILE_MACHINE_AMD64: Self = Self(0x8664);
    /// ARM64 Little-Endian
    pub const IMAGE_FILE_MACHINE_ARM64: Self = Self(0xAA64);
    /// Used by IL-only images that were not compiled for a specific CPU.
    pub const IMAGE_FILE_MACHINE_CEE: Self = Self(0xC0EE);

    pub fn to_str_opt(self) -> Option<&'static str> {
        Some(match self {
            Self::IMAGE_FILE_MACHINE_UNKNOWN => "IMAGE_FILE_MACHINE_UNKNOWN",
            Self::IMAGE_FILE_MACHINE_I386 => "IMAGE_FILE_MACHINE_I386",
            Self::IMAGE_FILE_MACHINE_ARM => "IMAGE_FILE_MACHINE_ARM",
            Self::IMAGE_FILE_MACHINE_ARMNT => "IMAGE_FILE_MACHINE_ARMNT",
            Self::IMAGE_FILE_MACHINE_IA64 => "IMAGE_FILE_MACHINE_IA64",
            Self::IMAGE_FILE_MACHINE_EBC => "IMAGE_FILE_MACHINE_EBC",
            Self::IMAGE_FILE_MACHINE_AMD64 => "IMAGE_FILE_MACHINE_AMD64",
            Self::IMAGE_FILE_MACHINE_ARM64 => "IMAGE_FILE_MACHINE_ARM64",
            Self::IMAGE_FILE_MACHINE_CEE => "IMAGE_FILE_MACHINE_CEE",
            _ => return None,
        })
    }
}

impl core::fmt::Debug for IMAGE_FILE_MACHINE {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if let Some(s) = self.to_str_opt() {
            f.write_str(s)
        } else {
            write!(f, "??0x{:x}", self.0)
        }
    }
}
