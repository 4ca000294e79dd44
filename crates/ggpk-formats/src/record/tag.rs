//! Four-byte record tags

use std::fmt;

/// Record kind, decoded from the 4-byte ASCII tag of a record header
///
/// Unknown tags are preserved verbatim so that readers can skip records
/// written by newer tools without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordTag {
    /// `GGPK` superblock
    Superblock,
    /// `PDIR` packed directory
    Directory,
    /// `FILE` file record followed by content bytes
    File,
    /// `FREE` free-space list node
    Free,
    /// Any other tag
    Unknown([u8; 4]),
}

impl RecordTag {
    /// Magic bytes for the superblock
    pub const SUPERBLOCK_BYTES: [u8; 4] = *b"GGPK";
    /// Magic bytes for a packed directory
    pub const DIRECTORY_BYTES: [u8; 4] = *b"PDIR";
    /// Magic bytes for a file
    pub const FILE_BYTES: [u8; 4] = *b"FILE";
    /// Magic bytes for free space
    pub const FREE_BYTES: [u8; 4] = *b"FREE";

    /// Parse from raw tag bytes
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        match bytes {
            Self::SUPERBLOCK_BYTES => Self::Superblock,
            Self::DIRECTORY_BYTES => Self::Directory,
            Self::FILE_BYTES => Self::File,
            Self::FREE_BYTES => Self::Free,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw tag bytes
    pub const fn to_bytes(self) -> [u8; 4] {
        match self {
            Self::Superblock => Self::SUPERBLOCK_BYTES,
            Self::Directory => Self::DIRECTORY_BYTES,
            Self::File => Self::FILE_BYTES,
            Self::Free => Self::FREE_BYTES,
            Self::Unknown(bytes) => bytes,
        }
    }
}

impl fmt::Display for RecordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.to_bytes();
        if bytes.iter().all(u8::is_ascii_graphic) {
            write!(f, "{}", String::from_utf8_lossy(&bytes))
        } else {
            write!(f, "0x{}", hex::encode_upper(bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(RecordTag::from_bytes(*b"GGPK"), RecordTag::Superblock);
        assert_eq!(RecordTag::from_bytes(*b"PDIR"), RecordTag::Directory);
        assert_eq!(RecordTag::from_bytes(*b"FILE"), RecordTag::File);
        assert_eq!(RecordTag::from_bytes(*b"FREE"), RecordTag::Free);
        assert_eq!(RecordTag::Directory.to_bytes(), *b"PDIR");
    }

    #[test]
    fn test_unknown_tag_preserves_bytes() {
        let tag = RecordTag::from_bytes(*b"XTRA");
        assert_eq!(tag, RecordTag::Unknown(*b"XTRA"));
        assert_eq!(tag.to_bytes(), *b"XTRA");
        assert_eq!(tag.to_string(), "XTRA");
        assert_eq!(RecordTag::Unknown([0, 1, 2, 3]).to_string(), "0x00010203");
    }
}
