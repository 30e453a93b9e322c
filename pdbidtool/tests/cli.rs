use pdbid::coff::*;
use pdbid::DebugDirectoryBuilder;
use std::path::{Path, PathBuf};
use std::process::Command;
use uuid::Uuid;
use zerocopy::{FromZeros, IntoBytes};

const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");
const PDBIDTOOL: &str = env!("CARGO_BIN_EXE_pdbidtool");

const GUID: Uuid = Uuid::from_u128(0x4f3e_2d1c_0b0a_0908_0706_0504_0302_0100);

/// Writes a PE32+ image with one section, whose debug directory is at the start of the section.
fn write_image(name: &str, debug: &DebugDirectoryBuilder) -> PathBuf {
    const SECTION_RVA: u32 = 0x1000;
    const SECTION_OFFSET: u32 = 0x200;
    const SECTION_SIZE: u32 = 0x600;

    let mut image = vec![0u8; (SECTION_OFFSET + SECTION_SIZE) as usize];

    let mut dos = IMAGE_DOS_HEADER::new_zeroed();
    dos.e_magic.set(IMAGE_DOS_SIGNATURE);
    dos.e_lfanew.set(0x40);

    let mut optional = IMAGE_OPTIONAL_HEADER64::new_zeroed();
    optional.magic.set(IMAGE_NT_OPTIONAL_HDR64_MAGIC);
    optional.size_of_image.set(0x2000);
    optional
        .number_of_rva_and_sizes
        .set(IMAGE_NUMBEROF_DIRECTORY_ENTRIES as u32);

    let mut directories =
        vec![IMAGE_DATA_DIRECTORY::new_zeroed(); IMAGE_NUMBEROF_DIRECTORY_ENTRIES];
    directories[IMAGE_DIRECTORY_ENTRY_DEBUG]
        .virtual_address
        .set(SECTION_RVA);
    directories[IMAGE_DIRECTORY_ENTRY_DEBUG]
        .size
        .set(debug.table_size());

    let mut file_header = IMAGE_FILE_HEADER::new_zeroed();
    file_header.machine.set(IMAGE_FILE_MACHINE::IMAGE_FILE_MACHINE_ARM64.0);
    file_header.number_of_sections.set(1);
    file_header
        .size_of_optional_header
        .set((optional.as_bytes().len() + directories.as_bytes().len()) as u16);

    let mut section = IMAGE_SECTION_HEADER::new_zeroed();
    section.name[..5].copy_from_slice(b".data");
    section.virtual_address.set(SECTION_RVA);
    section.physical_address_or_virtual_size.set(SECTION_SIZE);
    section.size_of_raw_data.set(SECTION_SIZE);
    section.pointer_to_raw_data.set(SECTION_OFFSET);

    let mut headers = dos.as_bytes().to_vec();
    headers.extend_from_slice(b"PE\0\0");
    headers.extend_from_slice(file_header.as_bytes());
    headers.extend_from_slice(optional.as_bytes());
    headers.extend_from_slice(directories.as_bytes());
    headers.extend_from_slice(section.as_bytes());
    image[..headers.len()].copy_from_slice(&headers);

    let debug_bytes = debug.serialize(SECTION_RVA, SECTION_OFFSET).unwrap();
    let start = SECTION_OFFSET as usize;
    image[start..start + debug_bytes.len()].copy_from_slice(&debug_bytes);

    let dir = Path::new(TMP_DIR).join("cli");
    _ = std::fs::create_dir_all(&dir);
    let path = dir.join(name);
    std::fs::write(&path, &image).unwrap();
    path
}

fn run(args: &[&str]) -> (bool, String) {
    let output = Command::new(PDBIDTOOL).args(args).output().unwrap();
    (
        output.status.success(),
        String::from_utf8(output.stdout).unwrap(),
    )
}

#[test]
fn debug_dir() {
    let mut debug = DebugDirectoryBuilder::new();
    debug
        .add_code_view_entry("c:\\src\\obj\\tool.pdb", &GUID, 5, 0x1234_5678, None)
        .unwrap();
    debug.add_pdb_checksum_entry("SHA256", &[0x5a; 32]).unwrap();
    debug.add_reproducible_entry();
    let path = write_image("debug_dir.dll", &debug);

    let (ok, out) = run(&["--quiet", "debug-dir", path.to_str().unwrap(), "--sections"]);
    assert!(ok, "{out}");
    println!("{out}");

    assert!(out.contains("Image: PE32+, machine ARM64"));
    assert!(out.contains(".data"));
    assert!(out.contains("Debug directory: 3 entries"));
    assert!(out.contains("CodeView"));
    assert!(out.contains("GUID: 4f3e2d1c-0b0a-0908-0706-050403020100"));
    assert!(out.contains("Age:  5"));
    assert!(out.contains("Path: c:\\src\\obj\\tool.pdb"));
    assert!(out.contains("Key:  tool.pdb/4F3E2D1C0B0A090807060504030201005/tool.pdb"));
    assert!(out.contains("SHA256: 5a 5a"));
    assert!(out.contains("The image was built deterministically."));
}

#[test]
fn debug_dir_hex() {
    let mut debug = DebugDirectoryBuilder::new();
    debug
        .add_code_view_entry("a.pdb", &GUID, 1, 0, None)
        .unwrap();
    let path = write_image("debug_dir_hex.dll", &debug);

    let (ok, out) = run(&["debug-dir", path.to_str().unwrap(), "--hex"]);
    assert!(ok, "{out}");
    println!("{out}");
    assert!(out.contains("52 53 44 53"));
}

#[test]
fn debug_dir_not_an_image() {
    let dir = Path::new(TMP_DIR).join("cli");
    _ = std::fs::create_dir_all(&dir);
    let path = dir.join("not_an_image.txt");
    std::fs::write(&path, [b'x'; 0x100]).unwrap();

    let (ok, _) = run(&["--quiet", "debug-dir", path.to_str().unwrap()]);
    assert!(!ok);
}

#[test]
fn compress() {
    let (ok, out) = run(&["compress", "3", "0x80", "0x2e57", "0x4000", "0x1fffffff"]);
    assert!(ok, "{out}");
    assert_eq!(
        out,
        "0x00000003 : 03\n\
         0x00000080 : 80 80\n\
         0x00002e57 : ae 57\n\
         0x00004000 : c0 00 40 00\n\
         0x1fffffff : df ff ff ff\n"
    );

    let (ok, _) = run(&["compress", "0x20000000"]);
    assert!(!ok);
}

#[test]
fn decompress() {
    let (ok, out) = run(&["decompress", "03 8080 ae57 c0004000"]);
    assert!(ok, "{out}");
    assert_eq!(
        out,
        "0x00000003 : 03\n\
         0x00000080 : 80 80\n\
         0x00002e57 : ae 57\n\
         0x00004000 : c0 00 40 00\n"
    );

    let (ok, _) = run(&["decompress", "ff"]);
    assert!(!ok);
    let (ok, _) = run(&["decompress", "c000"]);
    assert!(!ok);
}
