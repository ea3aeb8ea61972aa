//! Chunk archive writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use tracing::trace;

use super::format::*;
use super::value::ArchiveValue;
use crate::util::{Error, Result};

/// Output archive built in memory.
///
/// Chunk sizes are unknown until a chunk is closed, so each `begin_chunk`
/// writes a placeholder size that `end_chunk` back-patches.
pub struct OArchive {
    buf: Vec<u8>,
    /// Header offsets of the currently open chunks.
    open: Vec<usize>,
    version: u32,
}

impl OArchive {
    /// Create an archive stamped with [`CURRENT_VERSION`].
    pub fn new() -> Self {
        Self::with_version(CURRENT_VERSION)
    }

    /// Create an archive stamped with an explicit format version.
    pub fn with_version(version: u32) -> Self {
        let mut buf = Vec::with_capacity(4096);
        buf.extend_from_slice(ARCHIVE_MAGIC);
        buf.extend_from_slice(&version.to_le_bytes());
        Self {
            buf,
            open: Vec::new(),
            version,
        }
    }

    /// Format version written in the header.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Get the current write position.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.buf.len() as u64
    }

    /// Number of currently open chunks.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Open a compound chunk.
    pub fn begin_chunk(&mut self, id: u32) -> Result<()> {
        self.open.push(self.buf.len());
        self.buf.extend_from_slice(&id.to_le_bytes());
        self.buf.extend_from_slice(&0u32.to_le_bytes());
        Ok(())
    }

    /// Close the innermost chunk and patch its size.
    pub fn end_chunk(&mut self) -> Result<()> {
        let start = self
            .open
            .pop()
            .ok_or_else(|| Error::UnbalancedChunk("end_chunk without begin_chunk".into()))?;
        let size = self.buf.len() - start - CHUNK_HEADER_SIZE;
        let size = u32::try_from(size)
            .map_err(|_| Error::other(format!("chunk at {} exceeds 4 GiB", start)))?;
        LittleEndian::write_u32(&mut self.buf[start + 4..start + 8], size);
        trace!(size, depth = self.open.len(), "end chunk");
        Ok(())
    }

    /// Write a raw value into the current chunk.
    pub fn write<T: ArchiveValue>(&mut self, value: &T) -> Result<()> {
        value.encode(&mut self.buf);
        Ok(())
    }

    /// Write a leaf chunk holding a single value.
    pub fn write_chunk<T: ArchiveValue>(&mut self, id: u32, value: &T) -> Result<()> {
        self.begin_chunk(id)?;
        self.write(value)?;
        self.end_chunk()
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        if !self.open.is_empty() {
            return Err(Error::UnbalancedChunk(format!(
                "{} chunk(s) still open at finish",
                self.open.len()
            )));
        }
        Ok(self.buf)
    }

    /// Finish the archive and write it to a file.
    pub fn write_file(self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.finish()?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }
}

impl Default for OArchive {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_written() {
        let bytes = OArchive::with_version(0x0001_0000).finish().unwrap();
        assert_eq!(&bytes[0..4], ARCHIVE_MAGIC);
        assert_eq!(&bytes[4..8], &0x0001_0000u32.to_le_bytes());
    }

    #[test]
    fn test_size_backpatch() {
        let mut ar = OArchive::new();
        ar.begin_chunk(10).unwrap();
        ar.write_chunk(11, &3i32).unwrap();
        ar.end_chunk().unwrap();
        let bytes = ar.finish().unwrap();

        // outer: header(8) + inner chunk (8 + 4)
        assert_eq!(&bytes[HEADER_SIZE..HEADER_SIZE + 4], &10u32.to_le_bytes());
        assert_eq!(&bytes[HEADER_SIZE + 4..HEADER_SIZE + 8], &12u32.to_le_bytes());
        assert_eq!(&bytes[HEADER_SIZE + 12..HEADER_SIZE + 16], &4u32.to_le_bytes());
    }

    #[test]
    fn test_unbalanced() {
        let mut ar = OArchive::new();
        assert!(ar.end_chunk().is_err());
        ar.begin_chunk(1).unwrap();
        assert!(matches!(ar.finish(), Err(Error::UnbalancedChunk(_))));
    }
}
