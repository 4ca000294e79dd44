//! Planned records awaiting their final offsets

use crate::layout::error::{LayoutError, LayoutResult};
use crate::record::{
    DirectoryEntry, DirectoryRecord, FileRecord, HEADER_LEN, RecordHeader, RecordTag,
};
use crate::vfs::{VirtualDirectory, VirtualFile};

/// Address of one entry inside a planned directory record
///
/// Stands in for a pointer into the parent's entry list: the planner patches
/// `directories[parent].record.entries[entry].offset` once the child's final
/// position is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index of the parent in the plan's directory sequence
    pub parent: usize,
    /// Index of the entry inside the parent record
    pub entry: usize,
}

/// A directory record to be written
#[derive(Debug, Clone)]
pub struct DirDescriptor {
    /// Virtual path of the source directory
    pub path: String,
    /// Record header
    pub header: RecordHeader,
    /// Record with one entry per child; offsets are 0 until planned
    pub record: DirectoryRecord,
    /// Entry in the parent that must point here (`None` for the root)
    pub slot: Option<Slot>,
    /// Final offset of the header, assigned by the planner
    pub offset: u64,
}

impl DirDescriptor {
    /// Describe `directory`, with placeholder entries for its files followed
    /// by its subdirectories
    pub fn new(directory: &VirtualDirectory, slot: Option<Slot>) -> LayoutResult<Self> {
        let entries = directory
            .files
            .iter()
            .map(|file| DirectoryEntry::new(file.timestamp, 0))
            .chain(
                directory
                    .children
                    .iter()
                    .map(|child| DirectoryEntry::new(child.timestamp, 0)),
            )
            .collect();
        let record = DirectoryRecord::new(directory.name.clone(), directory.digest(), entries);

        let length = u64::from(HEADER_LEN) + record.encoded_len();
        let length = u32::try_from(length).map_err(|_| LayoutError::RecordTooLarge {
            path: directory.path.clone(),
            length,
        })?;

        Ok(Self {
            path: directory.path.clone(),
            header: RecordHeader::new(RecordTag::Directory, length),
            record,
            slot,
            offset: 0,
        })
    }

    /// Total bytes this descriptor occupies in the output
    pub fn length(&self) -> u64 {
        u64::from(self.header.length)
    }
}

/// A file record (plus content) to be written
#[derive(Debug, Clone)]
pub struct FileDescriptor<'a> {
    /// Record header; its length covers the content
    pub header: RecordHeader,
    /// File metadata record
    pub record: FileRecord,
    /// Entry in the parent directory that must point here
    pub slot: Slot,
    /// Source of the content bytes
    pub source: &'a VirtualFile,
    /// Final offset of the header, assigned by the planner
    pub offset: u64,
}

impl<'a> FileDescriptor<'a> {
    /// Describe `file`, owned by the entry at `slot`
    pub fn new(file: &'a VirtualFile, slot: Slot) -> LayoutResult<Self> {
        let record = FileRecord::new(file.name.clone(), file.digest);
        let header = record
            .header_for(file.size)
            .ok_or_else(|| LayoutError::RecordTooLarge {
                path: file.path.clone(),
                length: u64::from(HEADER_LEN) + record.encoded_len() + file.size,
            })?;
        Ok(Self {
            header,
            record,
            slot,
            source: file,
            offset: 0,
        })
    }

    /// Total bytes this descriptor occupies in the output, content included
    pub fn length(&self) -> u64 {
        u64::from(self.header.length)
    }

    /// Number of content bytes following the record
    pub fn content_size(&self) -> u64 {
        self.record.content_size(&self.header)
    }
}
