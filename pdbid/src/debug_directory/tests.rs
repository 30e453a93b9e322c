use super::*;
use crate::tests::bad_image;
use hex_literal::hex;
use std::io::Cursor;
use zerocopy::IntoBytes;

// A CodeView entry and a Reproducible entry.
const TWO_ENTRIES: [u8; 56] = hex!(
    "00000000 78563412 0000 0000 02000000 30000000 1c200000 1c040000"
    "00000000 78563412 0000 0000 10000000 00000000 00000000 00000000"
);

fn read(bytes: &[u8], options: &ReaderOptions) -> Result<Vec<DebugDirectoryEntry>, Error> {
    read_debug_directory_at(&mut Cursor::new(bytes), 0, bytes.len() as u32, options)
}

#[test]
fn entries_in_slot_order() {
    let entries = read(&TWO_ENTRIES, &ReaderOptions::default()).unwrap();
    assert_eq!(
        entries,
        [
            DebugDirectoryEntry {
                stamp: 0x1234_5678,
                major_version: 0,
                minor_version: 0,
                entry_type: DebugDirectoryEntryType::CODEVIEW,
                data_size: 0x30,
                data_relative_virtual_address: 0x201c,
                data_pointer: 0x41c,
            },
            DebugDirectoryEntry {
                stamp: 0x1234_5678,
                major_version: 0,
                minor_version: 0,
                entry_type: DebugDirectoryEntryType::REPRO,
                data_size: 0,
                data_relative_virtual_address: 0,
                data_pointer: 0,
            },
        ]
    );
}

#[test]
fn raw_conversion() {
    let entries = read(&TWO_ENTRIES, &ReaderOptions::default()).unwrap();
    let raw = entries[0].to_raw();
    assert_eq!(raw.as_bytes(), &TWO_ENTRIES[..28]);
    assert_eq!(DebugDirectoryEntry::from_raw(&raw, 0).unwrap(), entries[0]);
}

#[test]
fn empty_directory() {
    let entries = read(&[], &ReaderOptions::default()).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn size_not_multiple_of_entry_size() {
    let e = read(&TWO_ENTRIES[..30], &ReaderOptions::default()).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::InvalidDirectorySize { size: 30 });
}

#[test]
fn non_zero_reserved_field() {
    let mut bytes = TWO_ENTRIES;
    bytes[28] = 1;
    let e = read(&bytes, &ReaderOptions::default()).unwrap_err();
    assert_eq!(
        bad_image(e),
        BadImageFormat::NonZeroReserved { index: 1, value: 1 }
    );
}

#[test]
fn too_many_entries() {
    let options = ReaderOptions {
        max_debug_directory_entries: 1,
        ..ReaderOptions::default()
    };
    let e = read(&TWO_ENTRIES, &options).unwrap_err();
    assert_eq!(
        bad_image(e),
        BadImageFormat::TooManyEntries { count: 2, max: 1 }
    );
}

#[test]
fn unknown_types_are_preserved() {
    let mut bytes = TWO_ENTRIES;
    bytes[40] = 0x42;
    let entries = read(&bytes, &ReaderOptions::default()).unwrap();
    assert_eq!(entries[1].entry_type, DebugDirectoryEntryType(0x42));
    assert_eq!(format!("{:?}", entries[1].entry_type), "??66");
}

#[test]
fn short_stream() {
    // The directory claims two entries, but the stream ends inside the second one.
    let e = read_debug_directory_at(
        &mut Cursor::new(&TWO_ENTRIES[..40]),
        0,
        56,
        &ReaderOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(&e, Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof));
}

#[test]
fn portable_code_view() {
    let mut entries = read(&TWO_ENTRIES, &ReaderOptions::default()).unwrap();
    assert!(!entries[0].is_portable_code_view());
    entries[0].minor_version = PORTABLE_CODEVIEW_MINOR_VERSION;
    assert!(entries[0].is_portable_code_view());
    entries[1].minor_version = PORTABLE_CODEVIEW_MINOR_VERSION;
    assert!(!entries[1].is_portable_code_view());
}

#[test]
fn data_offset_by_layout() {
    let entries = read(&TWO_ENTRIES, &ReaderOptions::default()).unwrap();
    assert_eq!(entries[0].data_offset(ImageLayout::File), 0x41c);
    assert_eq!(entries[0].data_offset(ImageLayout::Mapped), 0x201c);
}

#[test]
fn entry_data() {
    let mut stream = TWO_ENTRIES.to_vec();
    stream.resize(0x41c, 0);
    stream.extend_from_slice(&[0xcc; 0x30]);

    let entries = read(&TWO_ENTRIES, &ReaderOptions::default()).unwrap();
    let data = read_entry_data(
        &mut Cursor::new(&stream),
        &entries[0],
        &ReaderOptions::default(),
    )
    .unwrap();
    assert_eq!(data, [0xcc; 0x30]);

    let options = ReaderOptions {
        max_entry_data_size: 0x20,
        ..ReaderOptions::default()
    };
    let e = read_entry_data(&mut Cursor::new(&stream), &entries[0], &options).unwrap_err();
    assert_eq!(
        bad_image(e),
        BadImageFormat::EntryDataTooLarge {
            size: 0x30,
            max: 0x20
        }
    );
}

#[test]
fn directory_in_image() {
    let image = crate::tests::synth_image(false, &crate::tests::typical_debug_directory());
    let mut stream = Cursor::new(&image);
    let headers = PeHeaders::read(&mut stream).unwrap();
    let entries = read_debug_directory(&headers, &mut stream, &ReaderOptions::default()).unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1].entry_type, DebugDirectoryEntryType::POGO);
    assert_eq!(
        read_entry_data(&mut stream, &entries[1], &ReaderOptions::default()).unwrap(),
        b"PGU\0"
    );
}
