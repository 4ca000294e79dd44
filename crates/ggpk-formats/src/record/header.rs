//! Record header shared by every on-disk record

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, SeekFrom, Write};

use crate::record::{Record, RecordResult, RecordTag};

/// Encoded size of a record header
pub const HEADER_LEN: u32 = 8;

/// Length and tag prefix of every record
///
/// `length` covers the header itself plus everything that follows it,
/// including raw file content. `data_offset` is not stored on disk: once a
/// header has been read at a known position it is resolved to the byte just
/// past the header, where the record payload begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Total byte span of the record, header included
    pub length: u32,
    /// Record kind
    pub tag: RecordTag,
    /// Absolute offset of the payload (0 until resolved)
    pub data_offset: u64,
}

impl RecordHeader {
    /// Create an unresolved header
    pub const fn new(tag: RecordTag, length: u32) -> Self {
        Self {
            length,
            tag,
            data_offset: 0,
        }
    }

    /// Seek to `offset` and read the header stored there, resolving its
    /// payload offset
    pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64) -> RecordResult<Self> {
        reader.seek(SeekFrom::Start(offset))?;
        let header = Self::decode(reader)?;
        Ok(header.resolved(offset))
    }

    /// Return a copy whose payload offset points past a header located at
    /// `offset`
    pub const fn resolved(mut self, offset: u64) -> Self {
        self.data_offset = offset + HEADER_LEN as u64;
        self
    }

    /// Absolute offset of the header itself (only meaningful once resolved)
    pub const fn offset(&self) -> u64 {
        self.data_offset.saturating_sub(HEADER_LEN as u64)
    }

    /// Number of bytes following the header
    pub const fn payload_len(&self) -> u64 {
        self.length.saturating_sub(HEADER_LEN) as u64
    }
}

impl Record for RecordHeader {
    fn decode<R: Read + Seek>(reader: &mut R) -> RecordResult<Self> {
        let length = u32::read_options(reader, Endian::Little, ())?;
        let tag = <[u8; 4]>::read_options(reader, Endian::Little, ())?;
        Ok(Self::new(RecordTag::from_bytes(tag), length))
    }

    fn encode<W: Write + Seek>(&self, writer: &mut W) -> RecordResult<()> {
        self.length.write_options(writer, Endian::Little, ())?;
        self.tag.to_bytes().write_options(writer, Endian::Little, ())?;
        Ok(())
    }

    fn byte_length(&self) -> u32 {
        HEADER_LEN
    }
}
