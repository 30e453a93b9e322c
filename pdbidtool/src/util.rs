use anyhow::Context;
use std::str::FromStr;

/// A `u32` that may be written in decimal or, with a `0x` prefix, in hex.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct HexU32(pub u32);

impl FromStr for HexU32 {
    type Err = <u32 as FromStr>::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = if let Some(suffix) = s.strip_prefix("0x") {
            u32::from_str_radix(suffix, 0x10)?
        } else if let Some(suffix) = s.strip_prefix("0X") {
            u32::from_str_radix(suffix, 0x10)?
        } else {
            u32::from_str(s)?
        };
        Ok(Self(value))
    }
}

/// Parses a string of hex digits into bytes. Whitespace between digits is ignored.
pub fn parse_hex_bytes(s: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    hex::decode(&digits).with_context(|| format!("invalid hex string {s:?}"))
}

/// Formats bytes as space-separated hex.
pub fn hex_string(bytes: &[u8]) -> String {
    pretty_hex::simple_hex(&bytes)
}
