//! Binary encoding of the values stored in leaf chunks.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use glam::DVec3;

use crate::util::{Error, Result};

/// A value that can be written to and read from a chunk payload.
///
/// Readers receive a cursor limited to the current chunk, so reading past
/// the chunk surfaces as [`Error::UnexpectedEof`].
pub trait ArchiveValue: Sized {
    /// Append the encoded value.
    fn encode(&self, buf: &mut Vec<u8>);

    /// Decode a value, advancing the cursor.
    fn decode(cur: &mut &[u8]) -> Result<Self>;
}

fn eof(e: io::Error) -> Error {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        // the caller rewrites the position
        Error::UnexpectedEof(0)
    } else {
        Error::Io(e)
    }
}

// Writes into a Vec<u8> cannot fail.
impl ArchiveValue for i32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        let _ = buf.write_i32::<LittleEndian>(*self);
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        cur.read_i32::<LittleEndian>().map_err(eof)
    }
}

impl ArchiveValue for u32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        let _ = buf.write_u32::<LittleEndian>(*self);
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        cur.read_u32::<LittleEndian>().map_err(eof)
    }
}

impl ArchiveValue for f64 {
    fn encode(&self, buf: &mut Vec<u8>) {
        let _ = buf.write_f64::<LittleEndian>(*self);
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        cur.read_f64::<LittleEndian>().map_err(eof)
    }
}

impl ArchiveValue for bool {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(u8::from(*self));
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        Ok(cur.read_u8().map_err(eof)? != 0)
    }
}

impl ArchiveValue for DVec3 {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.x.encode(buf);
        self.y.encode(buf);
        self.z.encode(buf);
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        let x = f64::decode(cur)?;
        let y = f64::decode(cur)?;
        let z = f64::decode(cur)?;
        Ok(DVec3::new(x, y, z))
    }
}

impl ArchiveValue for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        (self.len() as u32).encode(buf);
        buf.extend_from_slice(self.as_bytes());
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        let len = u32::decode(cur)? as usize;
        if len > cur.len() {
            return Err(Error::UnexpectedEof(0));
        }
        let (bytes, rest) = cur.split_at(len);
        *cur = rest;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}

/// A (time, value) pair as stored in a load curve point chunk.
impl ArchiveValue for (f64, f64) {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.0.encode(buf);
        self.1.encode(buf);
    }

    fn decode(cur: &mut &[u8]) -> Result<Self> {
        Ok((f64::decode(cur)?, f64::decode(cur)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_encoding_layout() {
        let mut buf = Vec::new();
        "abc".to_string().encode(&mut buf);
        assert_eq!(buf, vec![3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_truncated_string() {
        let buf = [5u8, 0, 0, 0, b'a'];
        let mut cur = &buf[..];
        assert!(matches!(String::decode(&mut cur), Err(Error::UnexpectedEof(_))));
    }

    #[test]
    fn test_vec3_layout() {
        let mut buf = Vec::new();
        DVec3::new(1.0, 2.0, 3.0).encode(&mut buf);
        assert_eq!(buf.len(), 24);
        assert_eq!(&buf[8..16], &2.0f64.to_le_bytes());
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let buf = [7u8];
        let mut cur = &buf[..];
        assert!(bool::decode(&mut cur).unwrap());
        assert!(cur.is_empty());
    }
}
