//! Bounds-checked decoding of blobs.


use crate::compressed::{decode_compressed_integer, decode_compressed_signed_integer};
use crate::BlobError;
use uuid::Uuid;

/// A cursor over the bytes of a blob.
///
/// Every read either succeeds and advances the cursor, or fails and leaves the cursor where it
/// was.
#[derive(Clone)]
pub struct BlobReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> BlobReader<'a> {
    /// Starts a new reader at the beginning of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// The number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The number of unread bytes.
    pub fn len(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Indicates whether all bytes have been read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the unread bytes without advancing.
    pub fn peek_rest(&self) -> &'a [u8] {
        &self.bytes[self.offset..]
    }

    /// Gets the unread bytes and advances to the end.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let rest = self.peek_rest();
        self.offset = self.bytes.len();
        rest
    }

    /// Checks that at least `n` bytes remain.
    #[inline(always)]
    pub fn needs(&self, n: usize) -> Result<(), BlobError> {
        if n <= self.len() {
            Ok(())
        } else {
            Err(BlobError::end_of_blob(self.offset, n - self.len()))
        }
    }

    /// Takes the next `n` bytes.
    #[inline(always)]
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], BlobError> {
        self.needs(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&self.bytes[start..self.offset])
    }

    /// Skips `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<(), BlobError> {
        self.bytes(n).map(|_| ())
    }

    /// Copies an array of bytes with a constant size.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], BlobError> {
        let mut a = [0u8; N];
        a.copy_from_slice(self.bytes(N)?);
        Ok(a)
    }

    /// Reads one byte.
    pub fn u8(&mut self) -> Result<u8, BlobError> {
        Ok(self.bytes(1)?[0])
    }

    /// Reads a little-endian `u16`.
    pub fn u16(&mut self) -> Result<u16, BlobError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    /// Reads a little-endian `u32`.
    pub fn u32(&mut self) -> Result<u32, BlobError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Reads a big-endian `u16`.
    pub fn u16_be(&mut self) -> Result<u16, BlobError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    /// Reads a big-endian `u32`.
    pub fn u32_be(&mut self) -> Result<u32, BlobError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    /// Reads a GUID in its 16-byte wire form.
    pub fn guid(&mut self) -> Result<Uuid, BlobError> {
        Ok(Uuid::from_bytes_le(self.array()?))
    }

    /// Reads a compressed unsigned integer.
    pub fn compressed_integer(&mut self) -> Result<u32, BlobError> {
        let (value, len) = decode_compressed_integer(self.peek_rest(), self.offset)?;
        self.offset += len;
        Ok(value)
    }

    /// Reads a compressed signed integer.
    pub fn compressed_signed_integer(&mut self) -> Result<i32, BlobError> {
        let (value, len) = decode_compressed_signed_integer(self.peek_rest(), self.offset)?;
        self.offset += len;
        Ok(value)
    }

    /// Reads a serialized string. The single byte `0xFF` denotes a null string.
    pub fn serialized_string(&mut self) -> Result<Option<&'a str>, BlobError> {
        let start = self.offset;
        if self.peek_rest().first() == Some(&0xff) {
            self.offset += 1;
            return Ok(None);
        }

        let len = self.compressed_integer()? as usize;
        let bytes = match self.bytes(len) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.offset = start;
                return Err(e);
            }
        };

        match core::str::from_utf8(bytes) {
            Ok(s) => Ok(Some(s)),
            Err(_) => {
                self.offset = start;
                Err(BlobError::InvalidUtf8 { offset: start })
            }
        }
    }

    /// Reads a NUL-terminated UTF-8 string. The terminator is consumed but not returned.
    pub fn utf8_nul(&mut self) -> Result<&'a str, BlobError> {
        let start = self.offset;
        let rest = self.peek_rest();
        let Some(nul) = rest.iter().position(|&b| b == 0) else {
            return Err(BlobError::end_of_blob(start, 1));
        };

        let s = core::str::from_utf8(&rest[..nul])
            .map_err(|_| BlobError::InvalidUtf8 { offset: start })?;
        self.offset += nul + 1;
        Ok(s)
    }
}
