//! Record codec error types

use thiserror::Error;

use crate::record::RecordTag;

/// Errors raised while decoding or encoding a single record
#[derive(Debug, Error)]
pub enum RecordError {
    /// The stream ended before the record was complete
    #[error("record truncated: unexpected end of stream")]
    Truncated,

    /// Declared record length disagrees with the bytes the record occupies
    #[error("record length mismatch: header declares {declared} bytes, record occupies {actual}")]
    LengthMismatch {
        /// Length stored in the record header
        declared: u32,
        /// Length implied by the decoded fields, or the bytes left in the
        /// stream when the record runs past its end
        actual: u64,
    },

    /// A record of one kind was expected but another tag was found
    #[error("unexpected record tag: expected {expected}, got {found}")]
    UnexpectedTag {
        /// Tag the caller asked for
        expected: RecordTag,
        /// Tag actually present in the stream
        found: RecordTag,
    },

    /// Digests are always SHA-256 sized
    #[error("invalid digest length: expected 32, got {0}")]
    InvalidDigestLength(usize),

    /// A stored name with `name_length == 0` has no room for its terminator
    #[error("name length is zero")]
    EmptyName,

    /// The last UTF-16 unit of a stored name is not a null terminator
    #[error("name is not null-terminated")]
    MissingTerminator,

    /// The stored name is not valid UTF-16
    #[error("name is not valid UTF-16: {0}")]
    InvalidName(#[from] std::string::FromUtf16Error),

    /// Name (or entry list) does not fit the `u32` count fields
    #[error("{what} too large for the record format: {count}")]
    CountOverflow {
        /// Which field overflowed
        what: &'static str,
        /// The count that did not fit
        count: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(binrw::Error),
}

impl From<binrw::Error> for RecordError {
    fn from(err: binrw::Error) -> Self {
        match err {
            binrw::Error::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::Truncated
            }
            binrw::Error::Io(io) => Self::Io(io),
            other => Self::BinRw(other),
        }
    }
}

/// Result type for record codec operations
pub type RecordResult<T> = Result<T, RecordError>;
