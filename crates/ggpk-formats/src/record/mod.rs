//! Record codec for the five GGPK record kinds
//!
//! Every record on disk starts with a [`RecordHeader`] (`length:u32`,
//! `tag:[u8; 4]`); the tag selects how the payload is read. All integers are
//! little-endian and names are null-terminated UTF-16LE.
//!
//! | Record | Layout |
//! |---|---|
//! | Header | `length:u32, tag:[u8; 4]` |
//! | Superblock | header, `node_count:u32`, `offsets:u64[node_count]` |
//! | Directory entry | `timestamp:u32, offset:u64` |
//! | File | header, `name_length:u32, digest:[u8; 32], name`, content |
//! | Directory | header, `name_length:u32, child_count:u32, digest:[u8; 32], name, entries` |
//! | Free | header, `next_offset:u64`, unused space |
//!
//! The codec knows nothing about tree structure. Decoding a header only
//! reads its eight fixed bytes; interpreting the payload is up to the caller.

mod digest;
mod directory;
mod error;
mod file;
mod free;
mod header;
pub(crate) mod name;
mod superblock;
mod tag;

pub use digest::{DIGEST_LEN, Digest};
pub use directory::{DirectoryEntry, DirectoryRecord, ENTRY_LEN};
pub use error::{RecordError, RecordResult};
pub use file::FileRecord;
pub use free::FreeRecord;
pub use header::{HEADER_LEN, RecordHeader};
pub use superblock::Superblock;
pub use tag::RecordTag;

use std::io::{Cursor, Read, Seek, Write};

/// Symmetric binary codec implemented by every record kind
pub trait Record: Sized {
    /// Decode the record at the reader's current position
    fn decode<R: Read + Seek>(reader: &mut R) -> RecordResult<Self>;

    /// Encode the record at the writer's current position
    fn encode<W: Write + Seek>(&self, writer: &mut W) -> RecordResult<()>;

    /// Exact number of bytes [`Record::encode`] writes, saturating at
    /// `u32::MAX` for records too large for the format
    fn byte_length(&self) -> u32;

    /// Decode from a byte slice
    fn from_bytes(data: &[u8]) -> RecordResult<Self> {
        Self::decode(&mut Cursor::new(data))
    }

    /// Encode to a new buffer
    fn to_bytes(&self) -> RecordResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(self.byte_length() as usize));
        self.encode(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
