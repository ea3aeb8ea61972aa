//! Chunk archive reader.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use tracing::trace;

use super::format::*;
use super::value::ArchiveValue;
use crate::util::{Error, Result};

/// Backing storage of an input archive.
enum Source {
    /// Memory-mapped file (preferred for files on disk)
    Mmap(Mmap),
    /// Owned bytes (in-memory archives, tests)
    Bytes(Vec<u8>),
}

impl Source {
    #[inline]
    fn bytes(&self) -> &[u8] {
        match self {
            Source::Mmap(m) => m,
            Source::Bytes(b) => b,
        }
    }
}

/// One open chunk.
#[derive(Clone, Copy, Debug)]
struct Frame {
    id: u32,
    /// First payload byte.
    start: usize,
    /// One past the last payload byte.
    end: usize,
}

/// Sequential reader over a nested chunk archive.
///
/// Reading is a single forward pass: [`open_chunk`](Self::open_chunk) pushes a
/// frame, [`close_chunk`](Self::close_chunk) pops it and skips whatever the
/// caller did not consume, which is how unknown chunks are tolerated.
pub struct IArchive {
    source: Source,
    version: u32,
    pos: usize,
    frames: Vec<Frame>,
}

impl IArchive {
    /// Open an archive file for reading with memory mapping.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        let size = file.metadata()?.len();
        if size < HEADER_SIZE as u64 {
            return Err(Error::UnexpectedEof(size));
        }

        // Safety: the file is opened read-only and the map is never written.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
        Self::with_source(Source::Mmap(mmap))
    }

    /// Read an archive from an in-memory buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::with_source(Source::Bytes(bytes))
    }

    fn with_source(source: Source) -> Result<Self> {
        let version = Self::parse_header(source.bytes())?;
        trace!(version = %format_version(version), "archive opened");
        Ok(Self {
            source,
            version,
            pos: HEADER_SIZE,
            frames: Vec::new(),
        })
    }

    /// Parse and validate the header, returning the version.
    fn parse_header(data: &[u8]) -> Result<u32> {
        if data.len() < HEADER_SIZE {
            return Err(Error::UnexpectedEof(data.len() as u64));
        }
        if &data[0..4] != ARCHIVE_MAGIC {
            return Err(Error::InvalidMagic);
        }
        let mut v = [0u8; 4];
        v.copy_from_slice(&data[VERSION_OFFSET..VERSION_OFFSET + 4]);
        Ok(u32::from_le_bytes(v))
    }

    /// Archive format version from the header.
    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// True when the archive predates the current parameter layout.
    #[inline]
    pub fn is_legacy(&self) -> bool {
        self.version < LEGACY_VERSION_LIMIT
    }

    /// Current read position in bytes from the start of the archive.
    #[inline]
    pub fn pos(&self) -> u64 {
        self.pos as u64
    }

    /// Number of currently open chunks.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Id of the innermost open chunk.
    pub fn chunk_id(&self) -> Option<u32> {
        self.frames.last().map(|f| f.id)
    }

    /// Payload size of the innermost open chunk.
    pub fn chunk_size(&self) -> Option<u64> {
        self.frames.last().map(|f| (f.end - f.start) as u64)
    }

    /// End of the region the next chunk or value must fit in.
    #[inline]
    fn limit(&self) -> usize {
        match self.frames.last() {
            Some(f) => f.end,
            None => self.source.bytes().len(),
        }
    }

    /// Open the next chunk inside the current one.
    ///
    /// Returns `Ok(None)` once the enclosing chunk (or the archive) has no
    /// more children.
    pub fn open_chunk(&mut self) -> Result<Option<u32>> {
        let limit = self.limit();
        if self.pos >= limit {
            return Ok(None);
        }
        if limit - self.pos < CHUNK_HEADER_SIZE {
            return Err(Error::UnexpectedEof(limit as u64));
        }

        let data = self.source.bytes();
        let mut word = [0u8; 4];
        word.copy_from_slice(&data[self.pos..self.pos + 4]);
        let id = u32::from_le_bytes(word);
        word.copy_from_slice(&data[self.pos + 4..self.pos + 8]);
        let size = u32::from_le_bytes(word) as usize;

        let start = self.pos + CHUNK_HEADER_SIZE;
        let available = limit - start;
        if size > available {
            return Err(Error::MalformedChunk {
                id,
                pos: self.pos as u64,
                size: size as u64,
                available: available as u64,
            });
        }

        trace!(id, size, depth = self.frames.len(), "open chunk");
        self.frames.push(Frame { id, start, end: start + size });
        self.pos = start;
        Ok(Some(id))
    }

    /// Close the innermost chunk, skipping any unread payload.
    pub fn close_chunk(&mut self) -> Result<()> {
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| Error::UnbalancedChunk("close_chunk without open chunk".into()))?;
        if self.pos < frame.end {
            trace!(id = frame.id, skipped = frame.end - self.pos, "skip unread chunk bytes");
        }
        self.pos = frame.end;
        Ok(())
    }

    /// Read a value from the current chunk payload.
    pub fn read<T: ArchiveValue>(&mut self) -> Result<T> {
        let limit = self.limit();
        let slice = &self.source.bytes()[self.pos..limit];
        let mut cur = slice;
        let value = T::decode(&mut cur).map_err(|e| match e {
            Error::UnexpectedEof(_) => Error::UnexpectedEof(limit as u64),
            other => other,
        })?;
        let consumed = slice.len() - cur.len();
        self.pos += consumed;
        Ok(value)
    }

    /// Unread payload bytes of the current chunk.
    pub fn remaining(&self) -> usize {
        self.limit() - self.pos
    }
}
