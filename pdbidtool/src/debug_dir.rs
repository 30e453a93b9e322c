use anyhow::{Context, Result};
use pdbid::coff::IMAGE_FILE_MACHINE;
use pdbid::{
    check_reproducible_entry, read_code_view_record_with, read_debug_directory,
    read_embedded_portable_pdb, read_entry_data, read_pdb_checksum, DebugDirectoryEntry,
    DebugDirectoryEntryType, PeHeaders, ReaderOptions,
};
use pretty_hex::PrettyHex;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::warn;

use crate::util::hex_string;

/// Displays the debug directory of a PE image.
#[derive(clap::Parser)]
pub struct DebugDirOptions {
    /// The image to read (an EXE, DLL or SYS file).
    pub file: PathBuf,

    /// Hex-dump the payload of every entry.
    #[arg(long)]
    pub hex: bool,

    /// Also list the section table.
    #[arg(long)]
    pub sections: bool,
}

pub fn command(options: &DebugDirOptions) -> Result<()> {
    let f = File::open(&options.file)
        .with_context(|| format!("failed to open {}", options.file.display()))?;
    let mut stream = BufReader::new(f);

    let reader_options = ReaderOptions::default();
    let headers = PeHeaders::read(&mut stream)
        .with_context(|| format!("failed to read PE headers of {}", options.file.display()))?;
    show_headers(&headers, options.sections);

    let entries = read_debug_directory(&headers, &mut stream, &reader_options)?;
    if entries.is_empty() {
        println!("The image has no debug directory.");
        return Ok(());
    }

    println!("Debug directory: {} entries", entries.len());
    println!();

    for (i, entry) in entries.iter().enumerate() {
        show_entry(i, entry);

        // A malformed payload is reported, but the other entries are still shown.
        if let Err(e) = show_payload(&mut stream, entry, &reader_options) {
            warn!("entry #{i}: {e:#}");
        }

        if options.hex && entry.data_size != 0 {
            match read_entry_data(&mut stream, entry, &reader_options) {
                Ok(data) => println!("{:?}", data.hex_dump()),
                Err(e) => warn!("entry #{i}: {e}"),
            }
        }

        println!();
    }

    Ok(())
}

fn show_headers(headers: &PeHeaders, show_sections: bool) {
    let machine = headers.machine();
    println!(
        "Image: {}, machine {}, time stamp 0x{:08x}, size of image 0x{:x}",
        if headers.is_pe32_plus() { "PE32+" } else { "PE32" },
        machine_name(machine),
        headers.time_date_stamp(),
        headers.optional_header().size_of_image(),
    );

    if show_sections {
        println!("Sections:");
        for s in headers.sections() {
            println!(
                "    {:<8} va 0x{:08x} size 0x{:08x} raw 0x{:08x} @ 0x{:08x} {:?}",
                s.name(),
                s.virtual_address.get(),
                s.mapped_size(),
                s.size_of_raw_data.get(),
                s.pointer_to_raw_data.get(),
                s.characteristics(),
            );
        }
    }

    println!();
}

fn machine_name(machine: IMAGE_FILE_MACHINE) -> String {
    match machine.to_str_opt() {
        Some(s) => s.strip_prefix("IMAGE_FILE_MACHINE_").unwrap_or(s).to_string(),
        None => format!("0x{:04x}", machine.0),
    }
}

fn show_entry(i: usize, entry: &DebugDirectoryEntry) {
    println!(
        "#{i} {:<20} stamp 0x{:08x}  version {}.{}  size 0x{:x}  rva 0x{:x}  pointer 0x{:x}",
        entry.entry_type.to_string(),
        entry.stamp,
        entry.major_version,
        entry.minor_version,
        entry.data_size,
        entry.data_relative_virtual_address,
        entry.data_pointer,
    );
}

fn show_payload(
    stream: &mut BufReader<File>,
    entry: &DebugDirectoryEntry,
    options: &ReaderOptions,
) -> Result<()> {
    match entry.entry_type {
        DebugDirectoryEntryType::CODEVIEW => {
            let cv = read_code_view_record_with(stream, entry, options)?;
            if entry.is_portable_code_view() {
                println!("    Portable PDB");
            }
            println!("    GUID: {}", cv.guid);
            println!("    Age:  {}", cv.age);
            println!("    Path: {}", cv.path);
            println!(
                "    Key:  {}/{}/{}",
                cv.pdb_file_name(),
                cv.symbol_server_key(),
                cv.pdb_file_name()
            );
        }

        DebugDirectoryEntryType::PDB_CHECKSUM => {
            let checksum = read_pdb_checksum(stream, entry, options)?;
            println!(
                "    {}: {}",
                checksum.algorithm_name,
                hex_string(&checksum.checksum)
            );
        }

        DebugDirectoryEntryType::EMBEDDED_PORTABLE_PDB => {
            let pdb = read_embedded_portable_pdb(stream, entry, options)?;
            println!(
                "    Embedded Portable PDB: {} bytes stored, {} bytes decompressed",
                entry.data_size,
                pdb.len()
            );
        }

        DebugDirectoryEntryType::REPRO => {
            check_reproducible_entry(entry)?;
            println!("    The image was built deterministically.");
        }

        _ => {}
    }

    Ok(())
}
