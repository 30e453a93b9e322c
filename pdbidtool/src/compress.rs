use crate::util::{hex_string, parse_hex_bytes, HexU32};
use anyhow::{Context, Result};
use pdbid::blob::{encode_compressed_integer, BlobReader};

#[derive(clap::Parser)]
pub struct CompressOptions {
    /// The values to encode, in decimal or as `0x` hex.
    #[arg(required = true)]
    pub values: Vec<HexU32>,
}

#[derive(clap::Parser)]
pub struct DecompressOptions {
    /// The encoded bytes, as hex digits. Spaces are allowed.
    pub hex: String,
}

pub fn compress_command(options: &CompressOptions) -> Result<()> {
    for value in &options.values {
        let encoded = encode_compressed_integer(value.0)
            .with_context(|| format!("cannot encode 0x{:x}", value.0))?;
        println!("0x{:08x} : {}", value.0, hex_string(encoded.as_bytes()));
    }
    Ok(())
}

pub fn decompress_command(options: &DecompressOptions) -> Result<()> {
    let bytes = parse_hex_bytes(&options.hex)?;
    let mut r = BlobReader::new(&bytes);
    while !r.is_empty() {
        let start = r.offset();
        let value = r.compressed_integer()?;
        println!(
            "0x{:08x} : {}",
            value,
            hex_string(&bytes[start..r.offset()])
        );
    }
    Ok(())
}
