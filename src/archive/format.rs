//! Archive format constants and chunk ids.

/// Magic bytes at the start of an archive.
pub const ARCHIVE_MAGIC: &[u8; 4] = b"FSAR";

/// Size of the file header in bytes (magic + version).
pub const HEADER_SIZE: usize = 8;

/// Offset of the version in the header.
pub const VERSION_OFFSET: usize = 4;

/// Size of a chunk header in bytes (id + size).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Archives older than this use the legacy parameter load path.
pub const LEGACY_VERSION_LIMIT: u32 = 0x0002_0000;

/// Version written by default.
pub const CURRENT_VERSION: u32 = 0x0002_0000;

/// One parameter (compound).
pub const CID_PARAM: u32 = 0x0100;
/// Parameter id (i32).
pub const CID_PARAM_ID: u32 = 0x0101;
/// Parameter type tag (i32).
pub const CID_PARAM_TYPE: u32 = 0x0102;
/// Parameter value, encoded according to the preceding type tag.
pub const CID_PARAM_VALUE: u32 = 0x0103;
/// Attached time curve (compound).
pub const CID_LOAD_CURVE: u32 = 0x0104;

/// Load curve interpolation (i32).
pub const CID_LC_INTERPOLATION: u32 = 0x0110;
/// Load curve extend mode (i32).
pub const CID_LC_EXTEND: u32 = 0x0111;
/// One load curve point (f64 time, f64 value).
pub const CID_LC_POINT: u32 = 0x0112;

/// Human readable name of a known chunk id.
pub fn chunk_name(id: u32) -> Option<&'static str> {
    Some(match id {
        CID_PARAM => "PARAM",
        CID_PARAM_ID => "PARAM_ID",
        CID_PARAM_TYPE => "PARAM_TYPE",
        CID_PARAM_VALUE => "PARAM_VALUE",
        CID_LOAD_CURVE => "LOAD_CURVE",
        CID_LC_INTERPOLATION => "LC_INTERPOLATION",
        CID_LC_EXTEND => "LC_EXTEND",
        CID_LC_POINT => "LC_POINT",
        _ => return None,
    })
}

/// Format a packed `0xMMMMmmmm` version as `major.minor`.
pub fn format_version(version: u32) -> String {
    format!("{}.{}", version >> 16, version & 0xFFFF)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic() {
        assert_eq!(ARCHIVE_MAGIC, b"FSAR");
        assert_eq!(HEADER_SIZE, ARCHIVE_MAGIC.len() + 4);
    }

    #[test]
    fn test_version_gate() {
        assert!(CURRENT_VERSION >= LEGACY_VERSION_LIMIT);
        assert_eq!(format_version(0x0001_0002), "1.2");
        assert_eq!(format_version(CURRENT_VERSION), "2.0");
    }

    #[test]
    fn test_chunk_names() {
        assert_eq!(chunk_name(CID_PARAM), Some("PARAM"));
        assert_eq!(chunk_name(0xdead), None);
    }
}
