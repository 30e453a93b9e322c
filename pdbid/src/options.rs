/// How the image is laid out in the stream that is being read.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum ImageLayout {
    /// The stream contains the image file as it is stored on disk. RVAs are translated to file
    /// offsets through the section table, and payloads are found at `PointerToRawData`.
    #[default]
    File,
    /// The stream contains the image as mapped by a loader, so that every RVA is also a stream
    /// offset. Payloads are found at `AddressOfRawData`.
    Mapped,
}

/// Options that control how debug information is read.
///
/// The limits bound how much memory a reader will allocate on behalf of untrusted input. Inputs
/// that exceed them are rejected as malformed.
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    /// The layout of the image within the stream.
    pub layout: ImageLayout,

    /// Maximum number of entries in the debug directory.
    pub max_debug_directory_entries: u32,

    /// Maximum `SizeOfData` of a CodeView entry.
    pub max_code_view_size: u32,

    /// Maximum `SizeOfData` of any entry whose payload is read.
    pub max_entry_data_size: u32,

    /// Maximum decompressed size of an embedded Portable PDB.
    pub max_embedded_pdb_size: u32,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            layout: ImageLayout::File,
            max_debug_directory_entries: 0x1000,
            max_code_view_size: 0x1_0000,
            max_entry_data_size: 0x1000_0000,
            max_embedded_pdb_size: 0x1000_0000,
        }
    }
}

impl ReaderOptions {
    /// Options for reading an image that has been mapped by a loader.
    pub fn mapped() -> Self {
        Self {
            layout: ImageLayout::Mapped,
            ..Self::default()
        }
    }
}
