//! Pointer resolution over raw records
//!
//! Free functions over any `Read + Seek`, so they can run under a single lock
//! of a [`SharedStream`](super::SharedStream) or on a plain cursor.

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

use crate::archive::error::{ArchiveError, ArchiveResult, AtOffset};
use crate::record::{
    DirectoryRecord, FileRecord, FreeRecord, HEADER_LEN, Record, RecordError, RecordHeader,
    RecordTag, Superblock,
};

/// A node of the free-space list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
    /// Absolute offset of the `FREE` record header
    pub offset: u64,
    /// Total span of the record, header included
    pub length: u32,
}

/// Read the superblock at offset 0
pub fn read_superblock<R: Read + Seek>(reader: &mut R) -> ArchiveResult<Superblock> {
    reader
        .seek(SeekFrom::Start(0))
        .map_err(|source| ArchiveError::Io { offset: 0, source })?;
    match Superblock::decode(reader) {
        Ok(superblock) => Ok(superblock),
        Err(RecordError::UnexpectedTag { found, .. }) => Err(ArchiveError::BadSignature(found)),
        Err(source) => Err(ArchiveError::Record { offset: 0, source }),
    }
}

/// Resolve the header of every top-level node
pub fn top_level<R: Read + Seek>(
    reader: &mut R,
    superblock: &Superblock,
) -> ArchiveResult<Vec<RecordHeader>> {
    superblock
        .offsets
        .iter()
        .map(|&offset| RecordHeader::read_at(reader, offset).at(offset))
        .collect()
}

/// Resolve the header each entry of `directory` points at
pub fn children_of<R: Read + Seek>(
    reader: &mut R,
    directory: &DirectoryRecord,
) -> ArchiveResult<Vec<RecordHeader>> {
    directory
        .entries
        .iter()
        .map(|entry| RecordHeader::read_at(reader, entry.offset).at(entry.offset))
        .collect()
}

/// First top-level node tagged as a directory
pub fn find_root(nodes: &[RecordHeader]) -> ArchiveResult<RecordHeader> {
    nodes
        .iter()
        .find(|header| header.tag == RecordTag::Directory)
        .copied()
        .ok_or(ArchiveError::NoRootDirectory)
}

fn expect_tag(header: &RecordHeader, expected: RecordTag) -> ArchiveResult<()> {
    if header.tag == expected {
        Ok(())
    } else {
        Err(ArchiveError::UnexpectedTag {
            offset: header.offset(),
            expected,
            found: header.tag,
        })
    }
}

/// Decode the directory record behind a resolved header
///
/// The header's declared length must equal exactly what the record occupies.
pub fn read_directory<R: Read + Seek>(
    reader: &mut R,
    header: &RecordHeader,
) -> ArchiveResult<DirectoryRecord> {
    expect_tag(header, RecordTag::Directory)?;
    let offset = header.offset();
    reader
        .seek(SeekFrom::Start(header.data_offset))
        .map_err(|source| ArchiveError::Io { offset, source })?;
    let record = DirectoryRecord::decode(reader).at(offset)?;

    let actual = u64::from(HEADER_LEN) + record.encoded_len();
    if u64::from(header.length) != actual {
        return Err(ArchiveError::Record {
            offset,
            source: RecordError::LengthMismatch {
                declared: header.length,
                actual,
            },
        });
    }
    debug!(offset, name = %record.name, children = record.entries.len(), "read directory");
    Ok(record)
}

/// Decode the file record behind a resolved header
///
/// The header's declared length must leave room for the record itself, and
/// the content it declares must lie within the stream.
pub fn read_file<R: Read + Seek>(
    reader: &mut R,
    header: &RecordHeader,
) -> ArchiveResult<FileRecord> {
    expect_tag(header, RecordTag::File)?;
    let offset = header.offset();
    reader
        .seek(SeekFrom::Start(header.data_offset))
        .map_err(|source| ArchiveError::Io { offset, source })?;
    let record = FileRecord::decode(reader).at(offset)?;

    let minimum = u64::from(HEADER_LEN) + record.encoded_len();
    if u64::from(header.length) < minimum {
        return Err(ArchiveError::Record {
            offset,
            source: RecordError::LengthMismatch {
                declared: header.length,
                actual: minimum,
            },
        });
    }

    let end = reader
        .seek(SeekFrom::End(0))
        .map_err(|source| ArchiveError::Io { offset, source })?;
    let available = end.saturating_sub(offset);
    if u64::from(header.length) > available {
        return Err(ArchiveError::Record {
            offset,
            source: RecordError::LengthMismatch {
                declared: header.length,
                actual: available,
            },
        });
    }
    Ok(record)
}

/// Decode the root directory and check that its name is empty
pub fn read_root<R: Read + Seek>(
    reader: &mut R,
    header: &RecordHeader,
) -> ArchiveResult<DirectoryRecord> {
    let record = read_directory(reader, header)?;
    if record.name.is_empty() {
        Ok(record)
    } else {
        Err(ArchiveError::NonEmptyRootName(record.name))
    }
}

/// Follow the free list starting at the `FREE` record at `first`
pub fn free_list<R: Read + Seek>(reader: &mut R, first: u64) -> ArchiveResult<Vec<FreeBlock>> {
    let mut blocks = Vec::new();
    let mut seen = HashSet::new();
    let mut offset = first;

    while offset != 0 {
        if !seen.insert(offset) {
            return Err(ArchiveError::FreeListCycle(offset));
        }
        let header = RecordHeader::read_at(reader, offset).at(offset)?;
        expect_tag(&header, RecordTag::Free)?;
        let node = FreeRecord::decode(reader).at(offset)?;
        blocks.push(FreeBlock {
            offset,
            length: header.length,
        });
        offset = node.next_offset;
    }
    Ok(blocks)
}
