//! Append-only blob construction.

use crate::compressed::{encode_compressed_integer, encode_compressed_signed_integer};
use crate::BlobError;
use uuid::Uuid;

/// The capacity used by [`BlobBuilder::new`].
const DEFAULT_CAPACITY: usize = 16;

/// An append-only byte buffer that produces a blob.
///
/// The builder owns its storage exclusively. When a write does not fit, the storage grows to
/// `max(needed, capacity * 2 + 1)` bytes, so that a single large write always fits.
///
/// [`BlobBuilder::finalize`] hands the written bytes to the caller. It succeeds exactly once;
/// after that, every write and every further `finalize` fails with
/// [`BlobError::AlreadyFinalized`].
#[derive(Debug)]
pub struct BlobBuilder {
    /// Backing storage. `buffer.len()` is the capacity; only `buffer[..position]` is written.
    buffer: Vec<u8>,
    position: usize,
    finalized: bool,
}

impl Default for BlobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobBuilder {
    /// Creates an empty builder with the default capacity of 16 bytes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty builder with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            position: 0,
            finalized: false,
        }
    }

    /// The number of bytes written so far. Zero once finalized.
    pub fn len(&self) -> usize {
        self.position
    }

    /// Indicates whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.position == 0
    }

    /// The number of bytes that can be held without growing.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Indicates whether [`Self::finalize`] has already been called.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.position]
    }

    /// Reserves `size` bytes at the end of the blob and returns them for writing.
    fn reserve(&mut self, size: usize) -> Result<&mut [u8], BlobError> {
        if self.finalized {
            tracing::warn!("write to a finalized blob builder");
            return Err(BlobError::AlreadyFinalized);
        }

        let start = self.position;
        let end = start + size;
        if end > self.buffer.len() {
            let new_capacity = end.max(self.buffer.len() * 2 + 1);
            tracing::trace!(
                old_capacity = self.buffer.len(),
                new_capacity,
                "growing blob builder"
            );
            self.buffer.resize(new_capacity, 0);
        }

        self.position = end;
        Ok(&mut self.buffer[start..end])
    }

    /// Appends one byte.
    pub fn write_u8(&mut self, b: u8) -> Result<(), BlobError> {
        self.reserve(1)?[0] = b;
        Ok(())
    }

    /// Appends two bytes, in order.
    pub fn write_u8x2(&mut self, b0: u8, b1: u8) -> Result<(), BlobError> {
        self.reserve(2)?.copy_from_slice(&[b0, b1]);
        Ok(())
    }

    /// Appends four bytes, in order.
    pub fn write_u8x4(&mut self, b0: u8, b1: u8, b2: u8, b3: u8) -> Result<(), BlobError> {
        self.reserve(4)?.copy_from_slice(&[b0, b1, b2, b3]);
        Ok(())
    }

    /// Appends a byte slice.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), BlobError> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Appends `len` bytes of `bytes`, starting at `offset`.
    pub fn write_bytes_range(
        &mut self,
        bytes: &[u8],
        offset: usize,
        len: usize,
    ) -> Result<(), BlobError> {
        let range = offset
            .checked_add(len)
            .and_then(|end| bytes.get(offset..end))
            .ok_or(BlobError::RangeOutOfBounds {
                offset,
                len,
                source_len: bytes.len(),
            })?;
        self.write_bytes(range)
    }

    /// Appends `n` zero bytes.
    pub fn write_zeroes(&mut self, n: usize) -> Result<(), BlobError> {
        self.reserve(n)?.fill(0);
        Ok(())
    }

    /// Appends a `u16` in little-endian order.
    pub fn write_u16(&mut self, x: u16) -> Result<(), BlobError> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Appends a `u32` in little-endian order.
    pub fn write_u32(&mut self, x: u32) -> Result<(), BlobError> {
        self.write_bytes(&x.to_le_bytes())
    }

    /// Appends a `u16` in big-endian order.
    pub fn write_u16_be(&mut self, x: u16) -> Result<(), BlobError> {
        self.write_bytes(&x.to_be_bytes())
    }

    /// Appends a `u32` in big-endian order.
    pub fn write_u32_be(&mut self, x: u32) -> Result<(), BlobError> {
        self.write_bytes(&x.to_be_bytes())
    }

    /// Appends a GUID in its 16-byte wire form (`Data1`..`Data3` little-endian).
    pub fn write_guid(&mut self, guid: &Uuid) -> Result<(), BlobError> {
        self.write_bytes(&guid.to_bytes_le())
    }

    /// Appends `value` as a compressed unsigned integer.
    ///
    /// Values above [`MAX_COMPRESSED_INTEGER`](crate::MAX_COMPRESSED_INTEGER) are rejected;
    /// nothing is written in that case.
    pub fn write_compressed_integer(&mut self, value: u32) -> Result<(), BlobError> {
        let encoded = encode_compressed_integer(value)?;
        self.write_bytes(encoded.as_bytes())
    }

    /// Appends `value` as a compressed signed integer.
    pub fn write_compressed_signed_integer(&mut self, value: i32) -> Result<(), BlobError> {
        let encoded = encode_compressed_signed_integer(value)?;
        self.write_bytes(encoded.as_bytes())
    }

    /// Appends a serialized string: its UTF-8 byte length as a compressed integer, followed by
    /// the bytes. `None` is written as the single byte `0xFF`.
    pub fn write_serialized_string(&mut self, s: Option<&str>) -> Result<(), BlobError> {
        match s {
            None => self.write_u8(0xff),
            Some(s) => {
                let len = u32::try_from(s.len())
                    .map_err(|_| BlobError::CompressedIntegerOutOfRange(s.len() as i64))?;
                self.write_compressed_integer(len)?;
                self.write_bytes(s.as_bytes())
            }
        }
    }

    /// Appends a UTF-8 string followed by a NUL terminator.
    pub fn write_utf8_nul(&mut self, s: &str) -> Result<(), BlobError> {
        if s.as_bytes().contains(&0) {
            return Err(BlobError::EmbeddedNul);
        }
        self.write_bytes(s.as_bytes())?;
        self.write_u8(0)
    }

    /// Appends zero bytes until the length is a multiple of `alignment`.
    pub fn align(&mut self, alignment: usize) -> Result<(), BlobError> {
        assert!(alignment.is_power_of_two());
        let padding = self.position.wrapping_neg() & (alignment - 1);
        self.write_zeroes(padding)
    }

    /// Hands the written bytes to the caller.
    ///
    /// The returned vector holds exactly the bytes written, with no spare capacity. The builder
    /// keeps no reference to it; a second call fails with [`BlobError::AlreadyFinalized`].
    pub fn finalize(&mut self) -> Result<Vec<u8>, BlobError> {
        if self.finalized {
            tracing::warn!("blob builder finalized twice");
            return Err(BlobError::AlreadyFinalized);
        }

        self.finalized = true;
        let mut bytes = std::mem::take(&mut self.buffer);
        bytes.truncate(self.position);
        bytes.shrink_to_fit();
        self.position = 0;
        Ok(bytes)
    }

    /// Consumes the builder and returns the written bytes.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, BlobError> {
        self.finalize()
    }
}
