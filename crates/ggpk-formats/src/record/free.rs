//! `FREE` free-space list node

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, Write};

use crate::record::{Record, RecordResult};

/// Payload of a `FREE` record: the offset of the next free record, or 0 at
/// the end of the list
///
/// The rest of the record's declared length is unused space. Free records
/// are only ever read; rewritten archives are fully compacted.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[brw(little)]
pub struct FreeRecord {
    /// Absolute offset of the next `FREE` record header
    pub next_offset: u64,
}

impl FreeRecord {
    /// Whether this node terminates the list
    pub const fn is_last(&self) -> bool {
        self.next_offset == 0
    }
}

impl Record for FreeRecord {
    fn decode<R: Read + Seek>(reader: &mut R) -> RecordResult<Self> {
        Ok(Self::read_options(reader, Endian::Little, ())?)
    }

    fn encode<W: Write + Seek>(&self, writer: &mut W) -> RecordResult<()> {
        self.write_options(writer, Endian::Little, ())?;
        Ok(())
    }

    fn byte_length(&self) -> u32 {
        8
    }
}
