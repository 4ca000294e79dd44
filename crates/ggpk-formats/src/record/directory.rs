//! `PDIR` packed directory record

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, Write};

use crate::record::{
    DIGEST_LEN, Digest, Record, RecordError, RecordResult,
    name::{name_length, name_units, read_name, write_name},
};

/// Encoded size of a directory entry
pub const ENTRY_LEN: u32 = 12;

/// Child pointer stored inline in a directory record
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[brw(little)]
pub struct DirectoryEntry {
    /// Modification time of the child, Unix seconds
    pub timestamp: u32,
    /// Absolute offset of the child's record header
    pub offset: u64,
}

impl DirectoryEntry {
    /// Create a new entry
    pub const fn new(timestamp: u32, offset: u64) -> Self {
        Self { timestamp, offset }
    }
}

/// Directory record: name, subtree digest and child entries
///
/// `name_length` and `child_count` are derived from `name` and `entries`
/// when encoding, so a decoded record always re-encodes to the same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectoryRecord {
    /// Directory name (empty for the root)
    pub name: String,
    /// Digest over the children's digests
    pub digest: Digest,
    /// Child pointers, in stored order
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryRecord {
    /// Create a directory record
    pub fn new(name: impl Into<String>, digest: Digest, entries: Vec<DirectoryEntry>) -> Self {
        Self {
            name: name.into(),
            digest,
            entries,
        }
    }

    /// Name length in UTF-16 units, terminator included
    pub fn name_length(&self) -> RecordResult<u32> {
        name_length(&self.name)
    }

    /// Exact encoded size, computed without narrowing
    pub fn encoded_len(&self) -> u64 {
        4 + 4
            + DIGEST_LEN as u64
            + 2 * name_units(&self.name)
            + u64::from(ENTRY_LEN) * self.entries.len() as u64
    }

    /// Number of child entries
    pub fn child_count(&self) -> RecordResult<u32> {
        u32::try_from(self.entries.len()).map_err(|_| RecordError::CountOverflow {
            what: "directory entries",
            count: self.entries.len(),
        })
    }
}

impl Record for DirectoryRecord {
    fn decode<R: Read + Seek>(reader: &mut R) -> RecordResult<Self> {
        let name_len = u32::read_options(reader, Endian::Little, ())?;
        let child_count = u32::read_options(reader, Endian::Little, ())?;
        let digest = Digest::read_options(reader, Endian::Little, ())?;
        let name = read_name(reader, name_len)?;

        let mut entries = Vec::new();
        for _ in 0..child_count {
            entries.push(DirectoryEntry::read_options(reader, Endian::Little, ())?);
        }

        Ok(Self {
            name,
            digest,
            entries,
        })
    }

    fn encode<W: Write + Seek>(&self, writer: &mut W) -> RecordResult<()> {
        let child_count = self.child_count()?;
        name_length(&self.name)?.write_options(writer, Endian::Little, ())?;
        child_count.write_options(writer, Endian::Little, ())?;
        self.digest.write_options(writer, Endian::Little, ())?;
        write_name(writer, &self.name)?;
        for entry in &self.entries {
            entry.write_options(writer, Endian::Little, ())?;
        }
        Ok(())
    }

    fn byte_length(&self) -> u32 {
        u32::try_from(self.encoded_len()).unwrap_or(u32::MAX)
    }
}
