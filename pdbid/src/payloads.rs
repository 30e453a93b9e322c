//! Decoders for the payloads of PdbChecksum, Embedded Portable PDB and Reproducible entries.

use crate::debug_directory::{expect_entry_type, read_entry_data};
use crate::{BadImageFormat, DebugDirectoryEntry, DebugDirectoryEntryType, Error, ReaderOptions};
use flate2::read::DeflateDecoder;
use pdbid_blob::BlobReader;
use pdbid_coff::{EMBEDDED_PORTABLE_PDB_HEADER_SIZE, EMBEDDED_PORTABLE_PDB_SIGNATURE};
use std::io::{Read, Seek};
use tracing::{debug, trace};

/// The checksum of the PDB associated with an image.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PdbChecksumDebugDirectoryData {
    /// The name of the hash algorithm, such as `SHA256`.
    pub algorithm_name: String,
    /// The checksum.
    pub checksum: Vec<u8>,
}

impl PdbChecksumDebugDirectoryData {
    /// Decodes the payload of a PdbChecksum entry: a NUL-terminated UTF-8 algorithm name,
    /// followed by the checksum. Neither part may be empty.
    pub fn parse(bytes: &[u8]) -> Result<Self, Error> {
        let mut r = BlobReader::new(bytes);
        let Ok(algorithm_name) = r.utf8_nul() else {
            return Err(Error::bad_image(BadImageFormat::InvalidPdbChecksum));
        };
        let checksum = r.take_rest();

        if algorithm_name.is_empty() || checksum.is_empty() {
            return Err(Error::bad_image(BadImageFormat::InvalidPdbChecksum));
        }

        Ok(Self {
            algorithm_name: algorithm_name.to_string(),
            checksum: checksum.to_vec(),
        })
    }
}

/// Reads the payload of a PdbChecksum entry.
pub fn read_pdb_checksum<R: Read + Seek>(
    stream: &mut R,
    entry: &DebugDirectoryEntry,
    options: &ReaderOptions,
) -> Result<PdbChecksumDebugDirectoryData, Error> {
    expect_entry_type(entry, DebugDirectoryEntryType::PDB_CHECKSUM)?;
    let bytes = read_entry_data(stream, entry, options)?;
    PdbChecksumDebugDirectoryData::parse(&bytes)
}

/// Decompresses the payload of an Embedded Portable PDB entry.
///
/// The payload is the signature `MPDB`, the decompressed size as a `u32` LE, and then a raw
/// Deflate stream. The decompressed size must not exceed `max_size`, and the stream must
/// decompress to exactly the declared size.
pub fn parse_embedded_portable_pdb(bytes: &[u8], max_size: u32) -> Result<Vec<u8>, Error> {
    if bytes.len() < EMBEDDED_PORTABLE_PDB_HEADER_SIZE {
        return Err(Error::bad_image(BadImageFormat::EmbeddedPdbTooSmall {
            size: u32::try_from(bytes.len()).unwrap_or(u32::MAX),
        }));
    }

    let mut r = BlobReader::new(bytes);
    let signature: [u8; 4] = r.array()?;
    if signature != EMBEDDED_PORTABLE_PDB_SIGNATURE {
        return Err(Error::bad_image(BadImageFormat::BadEmbeddedPdbSignature(
            signature,
        )));
    }

    let size = r.u32()?;
    if size > max_size {
        return Err(Error::bad_image(BadImageFormat::EmbeddedPdbTooLarge {
            size,
            max: max_size,
        }));
    }

    // Read one byte more than declared, so that trailing data is detected.
    let compressed = r.take_rest();
    let mut pdb = Vec::with_capacity(size as usize);
    let mut decoder = DeflateDecoder::new(compressed).take(u64::from(size) + 1);
    if let Err(e) = decoder.read_to_end(&mut pdb) {
        debug!(%e, "failed to inflate embedded Portable PDB");
        return Err(Error::bad_image(BadImageFormat::EmbeddedPdbCorrupt));
    }

    if pdb.len() as u64 != u64::from(size) {
        return Err(Error::bad_image(BadImageFormat::EmbeddedPdbSizeMismatch {
            expected: size,
            actual: pdb.len() as u64,
        }));
    }

    trace!(compressed = compressed.len(), size, "inflated embedded Portable PDB");
    Ok(pdb)
}

/// Reads and decompresses the Portable PDB stored in an Embedded Portable PDB entry.
pub fn read_embedded_portable_pdb<R: Read + Seek>(
    stream: &mut R,
    entry: &DebugDirectoryEntry,
    options: &ReaderOptions,
) -> Result<Vec<u8>, Error> {
    expect_entry_type(entry, DebugDirectoryEntryType::EMBEDDED_PORTABLE_PDB)?;
    let bytes = read_entry_data(stream, entry, options)?;
    parse_embedded_portable_pdb(&bytes, options.max_embedded_pdb_size)
}

/// Checks that a Reproducible entry carries no data.
pub fn check_reproducible_entry(entry: &DebugDirectoryEntry) -> Result<(), Error> {
    expect_entry_type(entry, DebugDirectoryEntryType::REPRO)?;
    if entry.data_size != 0 {
        return Err(Error::bad_image(BadImageFormat::ReproducibleEntryHasData {
            size: entry.data_size,
        }));
    }
    Ok(())
}
