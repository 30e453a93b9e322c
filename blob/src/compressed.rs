//! Encoding and decoding of ECMA-335 compressed integers.

use crate::BlobError;

/// The largest value that fits in the 1-byte form.
pub const MAX_ONE_BYTE_COMPRESSED_INTEGER: u32 = 0x7f;

/// The largest value that fits in the 2-byte form.
pub const MAX_TWO_BYTE_COMPRESSED_INTEGER: u32 = 0x3fff;

/// The largest value that can be stored as a compressed integer.
pub const MAX_COMPRESSED_INTEGER: u32 = 0x1fff_ffff;

/// The smallest value that can be stored as a signed compressed integer.
pub const MIN_COMPRESSED_SIGNED_INTEGER: i32 = -(1 << 28);

/// The largest value that can be stored as a signed compressed integer.
pub const MAX_COMPRESSED_SIGNED_INTEGER: i32 = (1 << 28) - 1;

/// The encoded form of a compressed integer: 1, 2 or 4 bytes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct EncodedInteger {
    bytes: [u8; 4],
    len: u8,
}

impl EncodedInteger {
    fn one(b0: u8) -> Self {
        Self {
            bytes: [b0, 0, 0, 0],
            len: 1,
        }
    }

    fn two(n: u16) -> Self {
        let [b0, b1] = n.to_be_bytes();
        Self {
            bytes: [b0, b1, 0, 0],
            len: 2,
        }
    }

    fn four(n: u32) -> Self {
        Self {
            bytes: n.to_be_bytes(),
            len: 4,
        }
    }

    /// The encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// The number of encoded bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len as usize
    }
}

/// Returns the number of bytes needed to encode `value` as a compressed integer.
pub fn compressed_integer_size(value: u32) -> Result<usize, BlobError> {
    if value <= MAX_ONE_BYTE_COMPRESSED_INTEGER {
        Ok(1)
    } else if value <= MAX_TWO_BYTE_COMPRESSED_INTEGER {
        Ok(2)
    } else if value <= MAX_COMPRESSED_INTEGER {
        Ok(4)
    } else {
        Err(BlobError::CompressedIntegerOutOfRange(value.into()))
    }
}

/// Encodes `value` as a compressed unsigned integer.
pub fn encode_compressed_integer(value: u32) -> Result<EncodedInteger, BlobError> {
    Ok(match compressed_integer_size(value)? {
        1 => EncodedInteger::one(value as u8),
        2 => EncodedInteger::two(0x8000 | value as u16),
        _ => EncodedInteger::four(0xc000_0000 | value),
    })
}

/// Encodes `value` as a compressed signed integer.
///
/// The value is rotated left by one bit, so that the sign ends up in bit 0, and then stored in
/// the smallest form whose payload (7, 14 or 29 bits) can hold it.
pub fn encode_compressed_signed_integer(value: i32) -> Result<EncodedInteger, BlobError> {
    const B6: i32 = (1 << 6) - 1;
    const B13: i32 = (1 << 13) - 1;
    const B28: i32 = (1 << 28) - 1;

    // all ones for negative values, all zeroes otherwise
    let sign_mask = value >> 31;

    if (value & !B6) == (sign_mask & !B6) {
        let n = ((value & B6) << 1) | (sign_mask & 1);
        Ok(EncodedInteger::one(n as u8))
    } else if (value & !B13) == (sign_mask & !B13) {
        let n = ((value & B13) << 1) | (sign_mask & 1);
        Ok(EncodedInteger::two(0x8000 | n as u16))
    } else if (value & !B28) == (sign_mask & !B28) {
        let n = ((value & B28) << 1) | (sign_mask & 1);
        Ok(EncodedInteger::four(0xc000_0000 | n as u32))
    } else {
        Err(BlobError::CompressedIntegerOutOfRange(value.into()))
    }
}

/// Decodes a compressed unsigned integer from the start of `bytes`.
///
/// Returns the value and the number of bytes it occupied. `base_offset` is only used for error
/// reporting.
///
/// The 4-byte form keeps the low 5 bits of its first byte. A first byte of the form `111xxxxx`
/// has no valid meaning and is rejected with [`BlobError::InvalidCompressedInteger`].
pub fn decode_compressed_integer(bytes: &[u8], base_offset: usize) -> Result<(u32, usize), BlobError> {
    let Some(&header) = bytes.first() else {
        return Err(BlobError::end_of_blob(base_offset, 1));
    };

    let len = if header & 0x80 == 0 {
        return Ok((header as u32, 1));
    } else if header & 0x40 == 0 {
        2
    } else if header & 0x20 == 0 {
        4
    } else {
        tracing::debug!(header, offset = base_offset, "invalid compressed integer header");
        return Err(BlobError::InvalidCompressedInteger {
            offset: base_offset,
            header,
        });
    };

    if bytes.len() < len {
        return Err(BlobError::end_of_blob(base_offset, len - bytes.len()));
    }

    let value = if len == 2 {
        ((header as u32 & 0x3f) << 8) | bytes[1] as u32
    } else {
        ((header as u32 & 0x1f) << 24)
            | ((bytes[1] as u32) << 16)
            | ((bytes[2] as u32) << 8)
            | bytes[3] as u32
    };

    Ok((value, len))
}

/// Decodes a compressed signed integer from the start of `bytes`.
pub fn decode_compressed_signed_integer(
    bytes: &[u8],
    base_offset: usize,
) -> Result<(i32, usize), BlobError> {
    let (raw, len) = decode_compressed_integer(bytes, base_offset)?;

    let mut value = (raw >> 1) as i32;
    if raw & 1 != 0 {
        value |= match len {
            1 => 0xffff_ffc0_u32 as i32,
            2 => 0xffff_e000_u32 as i32,
            _ => 0xf000_0000_u32 as i32,
        };
    }

    Ok((value, len))
}
