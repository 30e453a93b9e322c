//! Builds a debug directory and the payloads of its entries.

use crate::{DebugDirectoryEntry, DebugDirectoryEntryType, Error};
use flate2::write::DeflateEncoder;
use flate2::Compression;
use pdbid_blob::BlobBuilder;
use pdbid_coff::{
    CODEVIEW_SIGNATURE_RSDS, EMBEDDED_PORTABLE_PDB_SIGNATURE, IMAGE_SIZEOF_DEBUG_DIRECTORY,
    PORTABLE_CODEVIEW_MINOR_VERSION,
};
use std::io::Write;
use tracing::debug;
use uuid::Uuid;
use zerocopy::IntoBytes;

/// `MinorVersion` of an Embedded Portable PDB entry; the version of the `MPDB` format.
const EMBEDDED_PORTABLE_PDB_FORMAT_VERSION: u16 = 0x0100;

const DATA_ALIGNMENT: usize = 4;

struct PendingEntry {
    stamp: u32,
    major_version: u16,
    minor_version: u16,
    entry_type: DebugDirectoryEntryType,
    data: Vec<u8>,
}

/// Collects debug directory entries and serializes them.
///
/// The serialized form is the table of entries, followed by the payload of each entry that has
/// one, in the order in which the entries were added. Each payload starts on a 4-byte boundary.
#[derive(Default)]
pub struct DebugDirectoryBuilder {
    entries: Vec<PendingEntry>,
}

impl DebugDirectoryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries added so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether no entries have been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds an entry of any type, with an arbitrary payload.
    pub fn add_entry(
        &mut self,
        stamp: u32,
        major_version: u16,
        minor_version: u16,
        entry_type: DebugDirectoryEntryType,
        data: &[u8],
    ) {
        self.entries.push(PendingEntry {
            stamp,
            major_version,
            minor_version,
            entry_type,
            data: data.to_vec(),
        });
    }

    /// Adds a CodeView entry that identifies the PDB by `guid`, `age` and `path`.
    ///
    /// If `portable_pdb_version` is given, the entry refers to a Portable PDB of that version:
    /// `MajorVersion` is set to the version and `MinorVersion` to `0x504D`.
    pub fn add_code_view_entry(
        &mut self,
        path: &str,
        guid: &Uuid,
        age: u32,
        stamp: u32,
        portable_pdb_version: Option<u16>,
    ) -> Result<(), Error> {
        let mut data = BlobBuilder::with_capacity(24 + path.len() + 1);
        data.write_bytes(&CODEVIEW_SIGNATURE_RSDS)?;
        data.write_guid(guid)?;
        data.write_u32(age)?;
        data.write_utf8_nul(path)?;

        let (major_version, minor_version) = match portable_pdb_version {
            Some(version) => (version, PORTABLE_CODEVIEW_MINOR_VERSION),
            None => (0, 0),
        };

        self.entries.push(PendingEntry {
            stamp,
            major_version,
            minor_version,
            entry_type: DebugDirectoryEntryType::CODEVIEW,
            data: data.into_bytes()?,
        });
        Ok(())
    }

    /// Adds a Reproducible entry, which marks the image as built deterministically.
    pub fn add_reproducible_entry(&mut self) {
        self.add_entry(0, 0, 0, DebugDirectoryEntryType::REPRO, &[]);
    }

    /// Adds a PdbChecksum entry.
    pub fn add_pdb_checksum_entry(
        &mut self,
        algorithm_name: &str,
        checksum: &[u8],
    ) -> Result<(), Error> {
        if algorithm_name.is_empty() {
            return Err(Error::InvalidArgument("algorithm name must not be empty"));
        }
        if checksum.is_empty() {
            return Err(Error::InvalidArgument("checksum must not be empty"));
        }

        let mut data = BlobBuilder::with_capacity(algorithm_name.len() + 1 + checksum.len());
        data.write_utf8_nul(algorithm_name)?;
        data.write_bytes(checksum)?;

        self.entries.push(PendingEntry {
            stamp: 0,
            major_version: 1,
            minor_version: 0,
            entry_type: DebugDirectoryEntryType::PDB_CHECKSUM,
            data: data.into_bytes()?,
        });
        Ok(())
    }

    /// Adds an Embedded Portable PDB entry that holds `pdb`, compressed with Deflate.
    pub fn add_embedded_portable_pdb_entry(
        &mut self,
        pdb: &[u8],
        portable_pdb_version: u16,
    ) -> Result<(), Error> {
        let Ok(size) = u32::try_from(pdb.len()) else {
            return Err(Error::InvalidArgument("embedded PDB is too large"));
        };

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(pdb)?;
        let compressed = encoder.finish()?;

        let mut data = BlobBuilder::with_capacity(8 + compressed.len());
        data.write_bytes(&EMBEDDED_PORTABLE_PDB_SIGNATURE)?;
        data.write_u32(size)?;
        data.write_bytes(&compressed)?;

        self.entries.push(PendingEntry {
            stamp: 0,
            major_version: portable_pdb_version,
            minor_version: EMBEDDED_PORTABLE_PDB_FORMAT_VERSION,
            entry_type: DebugDirectoryEntryType::EMBEDDED_PORTABLE_PDB,
            data: data.into_bytes()?,
        });
        Ok(())
    }

    /// The size of the table of entries. This is the size to store in the debug data directory.
    pub fn table_size(&self) -> u32 {
        (self.entries.len() * IMAGE_SIZEOF_DEBUG_DIRECTORY) as u32
    }

    /// Serializes the table and the payloads.
    ///
    /// `rva` and `file_offset` are the locations at which the caller will place the returned
    /// bytes. They are used to compute `AddressOfRawData` and `PointerToRawData` of each entry.
    /// Entries without a payload have both set to zero.
    pub fn serialize(&self, rva: u32, file_offset: u32) -> Result<Vec<u8>, Error> {
        let entries = self.layout(rva, file_offset)?;

        let mut out = BlobBuilder::new();
        for entry in &entries {
            out.write_bytes(entry.to_raw().as_bytes())?;
        }

        for pending in &self.entries {
            if !pending.data.is_empty() {
                out.align(DATA_ALIGNMENT)?;
                out.write_bytes(&pending.data)?;
            }
        }

        debug!(
            num_entries = entries.len(),
            size = out.len(),
            "serialized debug directory"
        );
        Ok(out.finalize()?)
    }

    /// Computes the entries as they will be stored, with the locations of their payloads.
    pub fn layout(&self, rva: u32, file_offset: u32) -> Result<Vec<DebugDirectoryEntry>, Error> {
        let mut pos = self.table_size() as usize;
        let mut entries = Vec::with_capacity(self.entries.len());

        for pending in &self.entries {
            let (data_relative_virtual_address, data_pointer) = if pending.data.is_empty() {
                (0, 0)
            } else {
                pos = pos.next_multiple_of(DATA_ALIGNMENT);
                let (Ok(relative), Ok(data_size)) =
                    (u32::try_from(pos), u32::try_from(pending.data.len()))
                else {
                    return Err(Error::InvalidArgument("debug directory is too large"));
                };
                let (Some(at_rva), Some(at_offset), Some(_)) = (
                    rva.checked_add(relative),
                    file_offset.checked_add(relative),
                    relative.checked_add(data_size),
                ) else {
                    return Err(Error::InvalidArgument("debug directory is too large"));
                };
                pos += pending.data.len();
                (at_rva, at_offset)
            };

            entries.push(DebugDirectoryEntry {
                stamp: pending.stamp,
                major_version: pending.major_version,
                minor_version: pending.minor_version,
                entry_type: pending.entry_type,
                data_size: pending.data.len() as u32,
                data_relative_virtual_address,
                data_pointer,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        check_reproducible_entry, read_code_view_record, read_debug_directory_at,
        read_embedded_portable_pdb, read_entry_data, read_pdb_checksum, ImageLayout,
        ReaderOptions,
    };
    use pdbid_coff::PORTABLE_PDB_VERSION_1_0;
    use std::io::Cursor;

    const GUID: Uuid = Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);

    #[test]
    fn empty() {
        let b = DebugDirectoryBuilder::new();
        assert!(b.is_empty());
        assert_eq!(b.table_size(), 0);
        assert!(b.serialize(0x2000, 0x400).unwrap().is_empty());
    }

    #[test]
    fn code_view_bytes() {
        let mut b = DebugDirectoryBuilder::new();
        b.add_code_view_entry("a.pdb", &GUID, 1, 0xaabb_ccdd, None)
            .unwrap();
        let bytes = b.serialize(0x2000, 0x400).unwrap();
        assert_eq!(bytes.len(), 28 + 24 + 6);

        // The payload follows the table; 28 is already 4-byte aligned.
        assert_eq!(&bytes[4..8], &0xaabb_ccddu32.to_le_bytes());
        assert_eq!(&bytes[12..16], &2u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &30u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &(0x2000u32 + 28).to_le_bytes());
        assert_eq!(&bytes[24..28], &(0x400u32 + 28).to_le_bytes());
        assert_eq!(&bytes[28..32], b"RSDS");
        assert_eq!(
            &bytes[32..48],
            &[
                0x33, 0x22, 0x11, 0x00, 0x55, 0x44, 0x77, 0x66, 0x88, 0x99, 0xaa, 0xbb, 0xcc,
                0xdd, 0xee, 0xff
            ]
        );
        assert_eq!(&bytes[48..52], &1u32.to_le_bytes());
        assert_eq!(&bytes[52..], b"a.pdb\0");
    }

    #[test]
    fn round_trip() {
        let pdb = b"BSJB".repeat(100);

        let mut b = DebugDirectoryBuilder::new();
        b.add_code_view_entry(
            "C:\\out\\lib.pdb",
            &GUID,
            1,
            0x1234_5678,
            Some(PORTABLE_PDB_VERSION_1_0),
        )
        .unwrap();
        b.add_reproducible_entry();
        b.add_pdb_checksum_entry("SHA256", &[0xab; 32]).unwrap();
        b.add_embedded_portable_pdb_entry(&pdb, PORTABLE_PDB_VERSION_1_0)
            .unwrap();
        b.add_entry(7, 0, 0, DebugDirectoryEntryType(0x99), &[1, 2, 3]);
        assert_eq!(b.len(), 5);

        // Place the directory at the start of the stream, so that the file offsets are valid.
        let bytes = b.serialize(0x2000, 0).unwrap();
        let options = ReaderOptions::default();
        let mut stream = Cursor::new(bytes);
        let entries = read_debug_directory_at(&mut stream, 0, b.table_size(), &options).unwrap();
        assert_eq!(entries, b.layout(0x2000, 0).unwrap());

        for e in &entries {
            if e.data_size != 0 {
                assert_eq!(e.data_pointer % 4, 0);
                assert_eq!(e.data_relative_virtual_address, 0x2000 + e.data_pointer);
            }
        }

        assert!(entries[0].is_portable_code_view());
        assert_eq!(entries[0].major_version, PORTABLE_PDB_VERSION_1_0);
        let cv = read_code_view_record(&mut stream, &entries[0]).unwrap();
        assert_eq!(cv.guid, GUID);
        assert_eq!(cv.age, 1);
        assert_eq!(cv.path, "C:\\out\\lib.pdb");

        assert_eq!(entries[1].entry_type, DebugDirectoryEntryType::REPRO);
        assert_eq!(entries[1].data_pointer, 0);
        check_reproducible_entry(&entries[1]).unwrap();

        let checksum = read_pdb_checksum(&mut stream, &entries[2], &options).unwrap();
        assert_eq!(checksum.algorithm_name, "SHA256");
        assert_eq!(checksum.checksum, [0xab; 32]);

        assert_eq!(entries[3].minor_version, 0x0100);
        let embedded = read_embedded_portable_pdb(&mut stream, &entries[3], &options).unwrap();
        assert_eq!(embedded, pdb);

        assert_eq!(entries[4].entry_type, DebugDirectoryEntryType(0x99));
        let data = read_entry_data(&mut stream, &entries[4], &options).unwrap();
        assert_eq!(data, [1, 2, 3]);
    }

    #[test]
    fn mapped_layout() {
        let mut b = DebugDirectoryBuilder::new();
        b.add_code_view_entry("x.pdb", &GUID, 3, 0, None).unwrap();

        // A mapped image, where the directory lives at RVA 0.
        let bytes = b.serialize(0, 0x1000).unwrap();
        let options = ReaderOptions {
            layout: ImageLayout::Mapped,
            ..ReaderOptions::default()
        };
        let mut stream = Cursor::new(bytes);
        let entries = read_debug_directory_at(&mut stream, 0, b.table_size(), &options).unwrap();
        assert_eq!(entries[0].data_pointer, 0x1000 + 28);
        let cv = crate::read_code_view_record_with(&mut stream, &entries[0], &options).unwrap();
        assert_eq!(cv.path, "x.pdb");
        assert_eq!(cv.age, 3);
    }

    #[test]
    fn invalid_arguments() {
        let mut b = DebugDirectoryBuilder::new();
        assert!(matches!(
            b.add_pdb_checksum_entry("", &[1]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            b.add_pdb_checksum_entry("SHA256", &[]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            b.add_code_view_entry("a\0b.pdb", &GUID, 1, 0, None),
            Err(Error::Blob(pdbid_blob::BlobError::EmbeddedNul))
        ));
        assert!(b.is_empty());
    }

    #[test]
    fn offset_overflow() {
        let mut b = DebugDirectoryBuilder::new();
        b.add_code_view_entry("a.pdb", &GUID, 1, 0, None).unwrap();
        assert!(matches!(
            b.serialize(u32::MAX - 8, 0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
