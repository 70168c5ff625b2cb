//! Little-endian wire primitives shared by all three codecs (§4.1).
//!
//! Mirrors the reader/writer trait split used throughout the protocol: any
//! `io::Read`/`io::Write` gets `read_bytes`/`write_bytes` for free, and each
//! wire-level shape (cstr, length-prefixed string) implements
//! `ReadFromBytes`/`WriteToBytes` once.

pub use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use crate::value::Id;
use std::io;

/// Types that can be written to little-endian bytes.
pub trait WriteToBytes {
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()>;
}

/// Types that can be read from little-endian bytes.
pub trait ReadFromBytes: Sized {
    fn read_from_bytes<R: ReadBytesExt>(reader: R) -> io::Result<Self>;
}

/// Convenience entry point for writing any `WriteToBytes` value.
pub trait WriteBytes {
    fn write_bytes<P: WriteToBytes>(&mut self, value: P) -> io::Result<()>;
}

/// Convenience entry point for reading any `ReadFromBytes` value.
pub trait ReadBytes {
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P>;
}

impl<W> WriteBytes for W
where
    W: WriteBytesExt,
{
    fn write_bytes<P: WriteToBytes>(&mut self, value: P) -> io::Result<()> {
        value.write_to_bytes(self)
    }
}

impl<R> ReadBytes for R
where
    R: ReadBytesExt,
{
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P> {
        P::read_from_bytes(self)
    }
}

/// A NUL-terminated string, read byte-by-byte until `0x00` (exclusive) and
/// written as its UTF-8 bytes followed by a single `0x00`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CStr(pub String);

impl WriteToBytes for CStr {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.0.as_bytes())?;
        writer.write_u8(0)
    }
}

impl ReadFromBytes for CStr {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        loop {
            match reader.read_u8()? {
                0 => break,
                byte => bytes.push(byte),
            }
        }
        let string = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(CStr(string))
    }
}

impl From<&str> for CStr {
    fn from(s: &str) -> Self {
        CStr(s.to_owned())
    }
}

impl From<String> for CStr {
    fn from(s: String) -> Self {
        CStr(s)
    }
}

/// A `u32`-length-prefixed UTF-8 string, used by AppFormat (§4.1, §4.3).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LengthPrefixedStr(pub String);

impl WriteToBytes for LengthPrefixedStr {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        let bytes = self.0.as_bytes();
        writer.write_u32::<LE>(bytes.len() as u32)?;
        writer.write_all(bytes)
    }
}

impl ReadFromBytes for LengthPrefixedStr {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        let len = reader.read_u32::<LE>()? as usize;
        let mut bytes = vec![0u8; len];
        reader.read_exact(&mut bytes)?;
        let string = String::from_utf8(bytes)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(LengthPrefixedStr(string))
    }
}

impl WriteToBytes for Id {
    fn write_to_bytes<W: WriteBytesExt>(&self, mut writer: W) -> io::Result<()> {
        writer.write_u32::<LE>(self.0)
    }
}

impl ReadFromBytes for Id {
    fn read_from_bytes<R: ReadBytesExt>(mut reader: R) -> io::Result<Self> {
        Ok(Id(reader.read_u32::<LE>()?))
    }
}

/// Read `len` elements of type `T` into a new `Vec`.
pub fn read_new_vec<R, T>(mut reader: R, len: usize) -> io::Result<Vec<T>>
where
    R: ReadBytesExt,
    T: ReadFromBytes,
{
    let mut vec = Vec::with_capacity(len);
    for _ in 0..len {
        vec.push(reader.read_bytes()?);
    }
    Ok(vec)
}
