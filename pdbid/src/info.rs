use crate::{
    read_code_view_record_with, read_debug_directory, CodeViewDebugDirectoryData,
    DebugDirectoryEntry, DebugDirectoryEntryType, Error, PeHeaders, ReaderOptions,
};
use std::io::{Read, Seek};
use tracing::debug;

/// The debug information of an image: its headers, its debug directory, and the decoded
/// CodeView records.
#[derive(Clone, Debug)]
pub struct DebugInfo {
    /// The headers of the image.
    pub headers: PeHeaders,
    /// The entries of the debug directory, in the order in which they are stored.
    pub entries: Vec<DebugDirectoryEntry>,
    /// The CodeView records, in the order of their entries.
    pub code_views: Vec<CodeViewDebugDirectoryData>,
}

impl DebugInfo {
    /// Indicates whether the image has a Reproducible entry.
    pub fn is_deterministic(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.entry_type == DebugDirectoryEntryType::REPRO)
    }

    /// The first CodeView record that refers to a Windows PDB, or failing that, the first
    /// CodeView record.
    pub fn primary_code_view(&self) -> Option<&CodeViewDebugDirectoryData> {
        let code_view_entries = self
            .entries
            .iter()
            .filter(|e| e.entry_type == DebugDirectoryEntryType::CODEVIEW);
        code_view_entries
            .zip(&self.code_views)
            .find(|(e, _)| !e.is_portable_code_view())
            .map(|(_, cv)| cv)
            .or(self.code_views.first())
    }
}

/// Reads the headers and debug directory of an image, and decodes every CodeView entry.
///
/// A malformed CodeView record fails the whole operation.
pub fn read_debug_info<R: Read + Seek>(
    stream: &mut R,
    options: &ReaderOptions,
) -> Result<DebugInfo, Error> {
    let headers = PeHeaders::read(stream)?;
    let entries = read_debug_directory(&headers, stream, options)?;

    let mut code_views = Vec::new();
    for entry in entries
        .iter()
        .filter(|e| e.entry_type == DebugDirectoryEntryType::CODEVIEW)
    {
        code_views.push(read_code_view_record_with(stream, entry, options)?);
    }

    debug!(
        num_entries = entries.len(),
        num_code_views = code_views.len(),
        "read debug info"
    );

    Ok(DebugInfo {
        headers,
        entries,
        code_views,
    })
}
