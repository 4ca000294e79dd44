//! `FILE` record

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, Write};

use crate::record::{
    DIGEST_LEN, Digest, HEADER_LEN, Record, RecordHeader, RecordResult, RecordTag,
    name::{name_length, name_units, read_name, write_name},
};

/// File metadata; the raw content bytes follow it directly on disk
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileRecord {
    /// File name
    pub name: String,
    /// SHA-256 of the content bytes
    pub digest: Digest,
}

impl FileRecord {
    /// Create a file record
    pub fn new(name: impl Into<String>, digest: Digest) -> Self {
        Self {
            name: name.into(),
            digest,
        }
    }

    /// Name length in UTF-16 units, terminator included
    pub fn name_length(&self) -> RecordResult<u32> {
        name_length(&self.name)
    }

    /// Exact encoded size of the metadata, computed without narrowing
    pub fn encoded_len(&self) -> u64 {
        4 + DIGEST_LEN as u64 + 2 * name_units(&self.name)
    }

    /// Content size of a file record stored under `header`
    pub fn content_size(&self, header: &RecordHeader) -> u64 {
        u64::from(header.length).saturating_sub(u64::from(HEADER_LEN) + self.encoded_len())
    }

    /// Absolute content offset of a file record stored under a resolved
    /// `header`
    pub fn content_offset(&self, header: &RecordHeader) -> u64 {
        header.data_offset + self.encoded_len()
    }

    /// Header for this record followed by `content_size` bytes, or `None`
    /// when the total does not fit the header's length field
    pub fn header_for(&self, content_size: u64) -> Option<RecordHeader> {
        let length = (u64::from(HEADER_LEN) + self.encoded_len()).checked_add(content_size)?;
        u32::try_from(length)
            .ok()
            .map(|length| RecordHeader::new(RecordTag::File, length))
    }
}

impl Record for FileRecord {
    fn decode<R: Read + Seek>(reader: &mut R) -> RecordResult<Self> {
        let name_len = u32::read_options(reader, Endian::Little, ())?;
        let digest = Digest::read_options(reader, Endian::Little, ())?;
        let name = read_name(reader, name_len)?;
        Ok(Self { name, digest })
    }

    fn encode<W: Write + Seek>(&self, writer: &mut W) -> RecordResult<()> {
        name_length(&self.name)?.write_options(writer, Endian::Little, ())?;
        self.digest.write_options(writer, Endian::Little, ())?;
        write_name(writer, &self.name)?;
        Ok(())
    }

    fn byte_length(&self) -> u32 {
        u32::try_from(self.encoded_len()).unwrap_or(u32::MAX)
    }
}
