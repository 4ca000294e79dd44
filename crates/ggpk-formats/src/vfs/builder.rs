//! Virtual tree builder
//!
//! Depth-first walk from the root directory record. Directory entries are
//! resolved one at a time and dispatched on their tag; free space and
//! unknown records are skipped so that archives carrying newer record kinds
//! still load.

use std::collections::HashSet;
use std::io::{Read, Seek};
use tracing::{debug, info, warn};

use crate::archive::{ArchiveError, ArchiveResult, AtOffset, SharedStream, scanner};
use crate::record::{DirectoryRecord, RecordHeader, RecordTag};
use crate::vfs::{VirtualDirectory, VirtualFile};

/// Build the virtual tree rooted at the directory behind `root_header`
///
/// The whole walk runs under one lock of `stream`; every file in the
/// resulting tree keeps a clone of `stream` for later content reads.
pub fn build_tree(
    stream: &SharedStream,
    root_header: &RecordHeader,
) -> ArchiveResult<VirtualDirectory> {
    let root = stream.with(|reader| {
        let record = scanner::read_root(reader, root_header)?;
        let mut builder = TreeBuilder {
            reader,
            stream,
            ancestors: HashSet::from([root_header.offset()]),
        };
        let mut root = VirtualDirectory::loaded("/", "", 0, record.digest);
        builder.populate(&record, &mut root)?;
        Ok::<_, ArchiveError>(root)
    })?;

    info!(
        directories = root.directory_count(),
        files = root.file_count(),
        "built virtual tree"
    );
    Ok(root)
}

fn warn_empty_name(name: &str, offset: u64) {
    if name.is_empty() {
        warn!(offset, "empty name below the root directory");
    }
}

struct TreeBuilder<'a, R> {
    reader: &'a mut R,
    stream: &'a SharedStream,
    ancestors: HashSet<u64>,
}

impl<R: Read + Seek> TreeBuilder<'_, R> {
    fn populate(
        &mut self,
        record: &DirectoryRecord,
        directory: &mut VirtualDirectory,
    ) -> ArchiveResult<()> {
        for entry in &record.entries {
            let header = RecordHeader::read_at(self.reader, entry.offset).at(entry.offset)?;
            match header.tag {
                RecordTag::Directory => {
                    if !self.ancestors.insert(entry.offset) {
                        return Err(ArchiveError::DirectoryCycle(entry.offset));
                    }
                    let child_record = scanner::read_directory(self.reader, &header)?;
                    warn_empty_name(&child_record.name, entry.offset);
                    let mut child = VirtualDirectory::loaded(
                        directory.child_path(&child_record.name),
                        child_record.name.clone(),
                        entry.timestamp,
                        child_record.digest,
                    );
                    self.populate(&child_record, &mut child)?;
                    self.ancestors.remove(&entry.offset);
                    directory.children.push(child);
                }
                RecordTag::File => {
                    let file_record = scanner::read_file(self.reader, &header)?;
                    warn_empty_name(&file_record.name, entry.offset);
                    directory.files.push(VirtualFile::from_record(
                        &header,
                        file_record,
                        entry.timestamp,
                        &directory.path,
                        self.stream.clone(),
                    ));
                }
                RecordTag::Free => {
                    debug!(offset = entry.offset, "skipping free space entry");
                }
                RecordTag::Superblock | RecordTag::Unknown(_) => {
                    warn!(offset = entry.offset, tag = %header.tag, "skipping unknown record");
                }
            }
        }
        directory.sort();
        Ok(())
    }
}
