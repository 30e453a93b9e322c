use std::io::{Read, Seek, SeekFrom};
use zerocopy::{FromBytes, IntoBytes};

pub(crate) fn read_struct<T: FromBytes + IntoBytes, R: Read>(r: &mut R) -> std::io::Result<T> {
    let mut value = T::new_zeroed();
    r.read_exact(value.as_mut_bytes())?;
    Ok(value)
}

pub(crate) fn read_struct_at<T: FromBytes + IntoBytes, R: Read + Seek>(
    r: &mut R,
    offset: u64,
) -> std::io::Result<T> {
    r.seek(SeekFrom::Start(offset))?;
    read_struct(r)
}

/// Reads exactly `len` bytes at `offset`. A stream that ends early is an error.
pub(crate) fn read_vec_at<R: Read + Seek>(
    r: &mut R,
    offset: u64,
    len: usize,
) -> std::io::Result<Vec<u8>> {
    r.seek(SeekFrom::Start(offset))?;
    let mut bytes = vec![0; len];
    r.read_exact(&mut bytes)?;
    Ok(bytes)
}
