//! `GGPK` superblock record

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, Write};

use crate::record::{HEADER_LEN, Record, RecordError, RecordHeader, RecordResult, RecordTag};

/// Root record of an archive, always stored at offset 0
///
/// Holds the absolute offsets of the top-level nodes. Archives written by
/// this crate carry a single node (the root directory); archives produced by
/// the game client usually add a second one for the head of the free list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Superblock {
    /// Absolute offsets of top-level record headers
    pub offsets: Vec<u64>,
}

impl Superblock {
    /// Create a superblock pointing at `offsets`
    pub fn new(offsets: Vec<u64>) -> Self {
        Self { offsets }
    }

    /// Number of top-level nodes
    pub fn node_count(&self) -> u32 {
        self.offsets.len() as u32
    }

    /// Encoded length of a superblock holding `node_count` offsets
    pub const fn length_for(node_count: u32) -> u32 {
        HEADER_LEN + 4 + 8 * node_count
    }

    /// Header that precedes this superblock's body
    pub fn header(&self) -> RecordHeader {
        RecordHeader::new(RecordTag::Superblock, self.byte_length())
    }
}

impl Record for Superblock {
    /// Decode a superblock, header included
    ///
    /// The tag is checked before anything else is read so that foreign files
    /// are rejected without trusting their node count.
    fn decode<R: Read + Seek>(reader: &mut R) -> RecordResult<Self> {
        let header = RecordHeader::decode(reader)?;
        if header.tag != RecordTag::Superblock {
            return Err(RecordError::UnexpectedTag {
                expected: RecordTag::Superblock,
                found: header.tag,
            });
        }

        let node_count = u32::read_options(reader, Endian::Little, ())?;
        let expected = u64::from(HEADER_LEN) + 4 + 8 * u64::from(node_count);
        if u64::from(header.length) != expected {
            return Err(RecordError::LengthMismatch {
                declared: header.length,
                actual: expected,
            });
        }

        let mut offsets = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            offsets.push(u64::read_options(reader, Endian::Little, ())?);
        }
        Ok(Self { offsets })
    }

    fn encode<W: Write + Seek>(&self, writer: &mut W) -> RecordResult<()> {
        let node_count = u32::try_from(self.offsets.len()).map_err(|_| {
            RecordError::CountOverflow {
                what: "superblock nodes",
                count: self.offsets.len(),
            }
        })?;
        self.header().encode(writer)?;
        node_count.write_options(writer, Endian::Little, ())?;
        for offset in &self.offsets {
            offset.write_options(writer, Endian::Little, ())?;
        }
        Ok(())
    }

    fn byte_length(&self) -> u32 {
        Self::length_for(self.node_count())
    }
}
