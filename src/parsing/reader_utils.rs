use std::io::{self, ErrorKind, Read};

use trait_gen::trait_gen;

/// A value with a fixed big-endian encoding in the class-file format.
pub(crate) trait FromBytes: Sized {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>;
}

/// Turns `reader.read_value()` into the one verb the parsers need.
pub(crate) trait ValueReader: Read {
    fn read_value<T: FromBytes>(&mut self) -> io::Result<T>;
}

impl<R: Read + ?Sized> ValueReader for R {
    fn read_value<T: FromBytes>(&mut self) -> io::Result<T> {
        T::from_reader(self)
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut buf = [0u8; N];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[trait_gen(T -> u8, u16, u32, i32, i64, f32, f64)]
impl FromBytes for T {
    fn from_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let buf = reader.read_value()?;
        Ok(Self::from_be_bytes(buf))
    }
}

/// Reads exactly `len` bytes.
///
/// Length fields come straight from the input, so the buffer grows by
/// reading instead of pre-allocating the declared length.
pub(crate) fn read_byte_chunk<R>(reader: &mut R, len: usize) -> io::Result<Vec<u8>>
where
    R: Read + ?Sized,
{
    let mut buf = Vec::new();
    let read = reader.take(len as u64).read_to_end(&mut buf)?;
    if read < len {
        return Err(ErrorKind::UnexpectedEof.into());
    }
    Ok(buf)
}
