//! Error types for the fscore library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for parameter, archive, mesh and regression operations.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid magic bytes at start of an archive
    #[error("Invalid archive: expected FSAR magic bytes")]
    InvalidMagic,

    /// Stream ended in the middle of a header, chunk or value
    #[error("Unexpected end of archive at position {0}")]
    UnexpectedEof(u64),

    /// Chunk size does not fit inside its enclosing chunk
    #[error("Malformed chunk 0x{id:04x} at position {pos}: size {size} exceeds {available} available bytes")]
    MalformedChunk {
        id: u32,
        pos: u64,
        size: u64,
        available: u64,
    },

    /// `end_chunk`/`close_chunk` without a matching open, or chunks left open
    #[error("Unbalanced chunk nesting: {0}")]
    UnbalancedChunk(String),

    /// Invalid data structure in an archive
    #[error("Invalid archive structure: {0}")]
    InvalidStructure(String),

    /// Archive declares a parameter type tag that is not known
    #[error("Unknown parameter type tag: {0}")]
    UnknownParamType(i32),

    /// Typed access or assignment with the wrong type tag
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Archive type differs from a live parameter that is not variable
    #[error("Parameter {id} has type {live} but archive stores {stored}, and it is not variable")]
    ParamTypeMismatch {
        id: i32,
        live: String,
        stored: String,
    },

    /// Mesh does not satisfy a modifier's preconditions
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Shared edge or face could not be resolved from its owner
    #[error("Inconsistent topology: {0}")]
    InconsistentTopology(String),

    /// Regression could not produce a fit
    #[error("Regression failed: {0}")]
    Regression(String),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create an invalid mesh error.
    pub fn mesh(msg: impl Into<String>) -> Self {
        Self::InvalidMesh(msg.into())
    }

    /// Create a regression error.
    pub fn regression(msg: impl Into<String>) -> Self {
        Self::Regression(msg.into())
    }

    /// True for errors raised by a truncated or corrupted archive stream.
    pub fn is_io_fault(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof(_) | Self::MalformedChunk { .. } | Self::Io(_) | Self::Utf8(_)
        )
    }
}

/// Result type alias for fscore operations.
pub type Result<T> = std::result::Result<T, Error>;
