use super::*;
use crate::tests::bad_image;
use hex_literal::hex;
use std::io::Cursor;

const GUID: Uuid = Uuid::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);

fn payload(path: &[u8], size: usize) -> Vec<u8> {
    let mut bytes = b"RSDS".to_vec();
    bytes.extend_from_slice(&GUID.to_bytes_le());
    bytes.extend_from_slice(&7u32.to_le_bytes());
    bytes.extend_from_slice(path);
    bytes.resize(size, 0);
    bytes
}

fn code_view_entry(data_size: u32, data_pointer: u32) -> DebugDirectoryEntry {
    DebugDirectoryEntry {
        stamp: 0,
        major_version: 0,
        minor_version: 0,
        entry_type: DebugDirectoryEntryType::CODEVIEW,
        data_size,
        data_relative_virtual_address: 0x3000 + data_pointer,
        data_pointer,
    }
}

#[test]
fn parse_padded() {
    let bytes = payload(b"c:\\x.pdb\0", 64);
    let cv = CodeViewDebugDirectoryData::parse(&bytes).unwrap();
    assert_eq!(cv.guid, GUID);
    assert_eq!(cv.age, 7);
    assert_eq!(cv.path, "c:\\x.pdb");
}

#[test]
fn parse_wire_form() {
    let bytes = hex!(
        "52534453"                          // RSDS
        "67452301 ab89 efcd fedcba9876543210" // GUID
        "07000000"                          // age
        "612e70646200"                      // "a.pdb\0"
    );
    let cv = CodeViewDebugDirectoryData::parse(&bytes).unwrap();
    assert_eq!(cv.guid, GUID);
    assert_eq!(cv.age, 7);
    assert_eq!(cv.path, "a.pdb");
    assert_eq!(cv.symbol_server_key(), "0123456789ABCDEFFEDCBA98765432107");
}

#[test]
fn parse_empty_path() {
    let cv = CodeViewDebugDirectoryData::parse(&payload(b"\0", 25)).unwrap();
    assert_eq!(cv.path, "");
}

#[test]
fn parse_non_ascii_path() {
    let bytes = payload("c:\\sym\\bücher.pdb\0".as_bytes(), 48);
    let cv = CodeViewDebugDirectoryData::parse(&bytes).unwrap();
    assert_eq!(cv.path, "c:\\sym\\bücher.pdb");
    assert_eq!(cv.pdb_file_name(), "bücher.pdb");
}

#[test]
fn wrong_signature() {
    let mut bytes = payload(b"x.pdb\0", 32);
    bytes[..4].copy_from_slice(b"XXXX");
    let e = CodeViewDebugDirectoryData::parse(&bytes).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::BadCodeViewSignature(*b"XXXX"));

    // NB10 records refer to PDB 2.0 files, which are not supported.
    bytes[..4].copy_from_slice(b"NB10");
    let e = CodeViewDebugDirectoryData::parse(&bytes).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::BadCodeViewSignature(*b"NB10"));
}

#[test]
fn no_nul_terminator() {
    let e = CodeViewDebugDirectoryData::parse(&payload(b"x.pdb", 29)).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::PathNotNulTerminated);

    // A header with no path at all.
    let e = CodeViewDebugDirectoryData::parse(&payload(b"", 24)).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::PathNotNulTerminated);
}

#[test]
fn non_zero_padding() {
    let mut bytes = payload(b"x.pdb\0", 40);
    bytes[35] = b'!';
    let e = CodeViewDebugDirectoryData::parse(&bytes).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::NonZeroPadding { offset: 35 });
}

#[test]
fn invalid_path_encoding() {
    let e = CodeViewDebugDirectoryData::parse(&payload(b"x\xff.pdb\0", 40)).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::InvalidPathEncoding);
}

#[test]
fn too_small() {
    let e = CodeViewDebugDirectoryData::parse(&payload(b"", 20)).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::CodeViewTooSmall { size: 20 });
}

#[test]
fn read_from_stream() {
    let mut stream = vec![0xee; 0x100];
    stream.extend_from_slice(&payload(b"c:\\x.pdb\0", 40));
    stream.extend_from_slice(&[0xee; 0x10]);

    let cv = read_code_view_record(&mut Cursor::new(&stream), &code_view_entry(40, 0x100)).unwrap();
    assert_eq!(cv.guid, GUID);
    assert_eq!(cv.age, 7);
    assert_eq!(cv.path, "c:\\x.pdb");
}

#[test]
fn read_rejects_bad_sizes() {
    let mut stream = Cursor::new(vec![0u8; 0x200]);

    let e = read_code_view_record(&mut stream, &code_view_entry(23, 0)).unwrap_err();
    assert_eq!(bad_image(e), BadImageFormat::CodeViewTooSmall { size: 23 });

    let options = ReaderOptions {
        max_code_view_size: 0x100,
        ..ReaderOptions::default()
    };
    let e = read_code_view_record_with(&mut stream, &code_view_entry(0x101, 0), &options)
        .unwrap_err();
    assert_eq!(
        bad_image(e),
        BadImageFormat::CodeViewTooLarge {
            size: 0x101,
            max: 0x100
        }
    );
}

#[test]
fn read_long_path() {
    let mut path = vec![b'a'; 0x10008];
    path.push(0);
    let bytes = payload(&path, 24 + path.len());
    let entry = code_view_entry(bytes.len() as u32, 0);
    let mut stream = Cursor::new(&bytes);

    let cv = read_code_view_record(&mut stream, &entry).unwrap();
    assert_eq!(cv.path.len(), 0x10008);
    assert_eq!(cv, CodeViewDebugDirectoryData::parse(&bytes).unwrap());

    let e = read_code_view_record_with(&mut stream, &entry, &ReaderOptions::default())
        .unwrap_err();
    assert_eq!(
        bad_image(e),
        BadImageFormat::CodeViewTooLarge {
            size: bytes.len() as u32,
            max: 0x1_0000
        }
    );
}

#[test]
fn read_past_end_of_stream() {
    let stream = payload(b"c:\\x.pdb\0", 40);
    let e = read_code_view_record(&mut Cursor::new(&stream), &code_view_entry(64, 0)).unwrap_err();
    assert!(matches!(e, Error::Io(_)), "{e:?}");
}

#[test]
fn read_wrong_entry_type() {
    let mut entry = code_view_entry(40, 0);
    entry.entry_type = DebugDirectoryEntryType::POGO;
    let e = read_code_view_record(&mut Cursor::new(vec![0u8; 64]), &entry).unwrap_err();
    assert!(matches!(
        e,
        Error::WrongEntryType {
            expected: DebugDirectoryEntryType::CODEVIEW,
            actual: DebugDirectoryEntryType::POGO,
        }
    ));
    assert!(!e.is_bad_image_format());
}

#[test]
fn read_mapped() {
    let mut stream = vec![0u8; 0x3100];
    stream[0x3100 - 0x100..].fill(0xee);
    let bytes = payload(b"m.pdb\0", 32);
    stream[0x3010..0x3010 + bytes.len()].copy_from_slice(&bytes);

    let cv = read_code_view_record_with(
        &mut Cursor::new(&stream),
        &code_view_entry(32, 0x10),
        &ReaderOptions::mapped(),
    )
    .unwrap();
    assert_eq!(cv.path, "m.pdb");
}
