//! Null-terminated UTF-16LE names

use binrw::{BinRead, BinWrite, Endian};
use std::io::{Read, Seek, Write};

use crate::record::{RecordError, RecordResult};

/// Number of UTF-16 units `name` occupies on disk, terminator included
/// UTF-16 code units `name` occupies on disk, terminator included
pub fn name_units(name: &str) -> u64 {
    name.encode_utf16().count() as u64 + 1
}

pub fn name_length(name: &str) -> RecordResult<u32> {
    let units = name_units(name);
    u32::try_from(units).map_err(|_| RecordError::CountOverflow {
        what: "name",
        count: units as usize,
    })
}

pub fn decode_name(units: &[u16]) -> RecordResult<String> {
    match units {
        [] => Err(RecordError::EmptyName),
        // A lone terminator is the root directory's empty name.
        // TODO: settle whether empty names are legal below the root; the tree
        // builder loads them with a warning for now.
        [0] => Ok(String::new()),
        [name @ .., 0] => Ok(String::from_utf16(name)?),
        _ => Err(RecordError::MissingTerminator),
    }
}

/// Read `name_length` UTF-16LE units and decode them
pub fn read_name<R: Read + Seek>(reader: &mut R, name_length: u32) -> RecordResult<String> {
    let mut units = Vec::new();
    for _ in 0..name_length {
        units.push(u16::read_options(reader, Endian::Little, ())?);
    }
    decode_name(&units)
}

/// Write `name` as UTF-16LE followed by the null terminator
pub fn write_name<W: Write + Seek>(writer: &mut W, name: &str) -> RecordResult<()> {
    for unit in name.encode_utf16().chain(std::iter::once(0)) {
        unit.write_options(writer, Endian::Little, ())?;
    }
    Ok(())
}
