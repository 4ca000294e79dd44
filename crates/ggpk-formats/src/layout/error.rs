//! Layout and serialization error types

use std::path::PathBuf;
use thiserror::Error;

use crate::archive::ArchiveError;
use crate::record::RecordError;

/// Result type for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Errors raised while planning or writing an archive
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Flattening emitted a different number of children than the
    /// directory record has entry slots. This is a bug in the planner, not
    /// bad input.
    #[error("slot mismatch in {path}: record has {expected} slots, flattening filled {actual}")]
    SlotCountMismatch {
        /// Directory being flattened
        path: String,
        /// Slots in the directory record
        expected: usize,
        /// Children emitted
        actual: usize,
    },

    /// A non-root directory descriptor has no parent slot
    #[error("directory {0} has no parent entry slot")]
    Unanchored(String),

    /// A record does not fit the 32-bit length field
    #[error("record for {path} is too large: {length} bytes")]
    RecordTooLarge {
        /// Virtual path of the node
        path: String,
        /// Total record length that overflowed
        length: u64,
    },

    /// The bytes read from a file's source differ from its planned size
    #[error("content size of {path} changed: planned {expected} bytes, read {actual}")]
    ContentSizeMismatch {
        /// Virtual path of the file
        path: String,
        /// Size used for layout
        expected: u64,
        /// Size actually read
        actual: u64,
    },

    /// Reading a file's content from its source failed
    #[error("cannot read content of {path}: {source}")]
    Content {
        /// Virtual path of the file
        path: String,
        /// Underlying read error
        #[source]
        source: ArchiveError,
    },

    /// Encoding a record failed
    #[error("cannot encode record at offset {offset}: {source}")]
    Record {
        /// Offset the record was being written to
        offset: u64,
        /// Underlying codec error
        #[source]
        source: RecordError,
    },

    /// Writing to the destination failed
    #[error("write failed at offset {offset}: {source}")]
    Io {
        /// Offset being written
        offset: u64,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The destination file could not be created or moved into place
    #[error("cannot create {}: {source}", path.display())]
    Persist {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
