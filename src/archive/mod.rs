//! Nested, self-describing binary chunk archives.
//!
//! ## File Structure
//!
//! ```text
//! +------------------+
//! | Magic: "FSAR"    |  4 bytes
//! +------------------+
//! | Version          |  4 bytes (u32 LE, 0xMMMMmmmm)
//! +------------------+
//! | Chunk            |  id u32 LE | size u32 LE | payload
//! | Chunk            |  payload is raw values or nested chunks
//! | ...              |
//! +------------------+
//! ```
//!
//! Readers skip chunk ids they do not recognise, so newer writers can add
//! sub-chunks without breaking older readers.

mod format;
mod reader;
mod value;
mod writer;

pub use format::*;
pub use reader::*;
pub use value::*;
pub use writer::*;
