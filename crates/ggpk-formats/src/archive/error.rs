//! Error types for archive scanning and tree building

use std::path::PathBuf;
use thiserror::Error;

use crate::record::{RecordError, RecordTag};

/// Archive operation result type
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors raised while scanning an archive or reading content through it
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The first record is not a `GGPK` superblock
    #[error("not a GGPK archive: superblock tag is {0}")]
    BadSignature(RecordTag),

    /// None of the superblock's top-level nodes is a directory
    #[error("no root directory among the superblock's top-level nodes")]
    NoRootDirectory,

    /// The root directory must have an empty name
    #[error("root directory has a non-empty name: {0:?}")]
    NonEmptyRootName(String),

    /// A record of the wrong kind was found where another was required
    #[error("unexpected record at offset {offset}: expected {expected}, got {found}")]
    UnexpectedTag {
        /// Offset of the offending header
        offset: u64,
        /// Tag required at this position
        expected: RecordTag,
        /// Tag actually found
        found: RecordTag,
    },

    /// A directory entry points back at one of its ancestors
    #[error("directory cycle: record at offset {0} is its own ancestor")]
    DirectoryCycle(u64),

    /// The free list revisits an offset
    #[error("free list cycle at offset {0}")]
    FreeListCycle(u64),

    /// A record failed to decode
    #[error("malformed record at offset {offset}: {source}")]
    Record {
        /// Offset the read was attempted at
        offset: u64,
        /// Underlying codec error
        #[source]
        source: RecordError,
    },

    /// A raw read from the archive stream failed
    #[error("I/O error at offset {offset}: {source}")]
    Io {
        /// Offset the read was attempted at
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A local file or directory could not be read
    #[error("I/O error on {}: {source}", path.display())]
    LocalIo {
        /// Path being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Walking a local directory failed
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Attach the attempted offset to a codec error
pub(crate) trait AtOffset<T> {
    fn at(self, offset: u64) -> ArchiveResult<T>;
}

impl<T> AtOffset<T> for Result<T, RecordError> {
    fn at(self, offset: u64) -> ArchiveResult<T> {
        self.map_err(|source| ArchiveError::Record { offset, source })
    }
}
