//! Two-pass layout planning
//!
//! Pass one flattens the tree in pre-order into a directory sequence and a
//! file sequence, each descriptor remembering the parent entry slot that
//! must hold its final offset. A directory's own files precede the files of
//! its subdirectories.
//!
//! Pass two walks the directories and then the files, assigning offsets by
//! prefix sum and writing each one into its parent's slot. The resulting
//! layout is
//!
//! ```text
//! [superblock][dir 0 = root][dir 1]...[dir n][file 0]...[file m]
//! ```
//!
//! with no gaps and no free space.

use tracing::debug;

use crate::layout::descriptor::{DirDescriptor, FileDescriptor, Slot};
use crate::layout::error::{LayoutError, LayoutResult};
use crate::vfs::VirtualDirectory;

/// Flattened, fully linked archive layout
#[derive(Debug, Clone)]
pub struct LayoutPlan<'a> {
    /// Offset of the root directory, right after the superblock
    pub base_offset: u64,
    /// Directory records in pre-order; index 0 is the root
    pub directories: Vec<DirDescriptor>,
    /// File records in emission order
    pub files: Vec<FileDescriptor<'a>>,
    /// Offset one past the last planned byte
    pub end_offset: u64,
}

impl LayoutPlan<'_> {
    /// Bytes covered by the planned records, superblock excluded
    pub fn records_len(&self) -> u64 {
        self.end_offset - self.base_offset
    }
}

/// Plan the layout of `root` with the root directory anchored at
/// `base_offset`
pub fn plan(root: &VirtualDirectory, base_offset: u64) -> LayoutResult<LayoutPlan<'_>> {
    let mut directories = Vec::new();
    let mut files = Vec::new();
    flatten(root, None, &mut directories, &mut files)?;

    let end_offset = assign_offsets(&mut directories, &mut files, base_offset)?;
    debug!(
        directories = directories.len(),
        files = files.len(),
        base_offset,
        end_offset,
        "planned layout"
    );

    Ok(LayoutPlan {
        base_offset,
        directories,
        files,
        end_offset,
    })
}

fn flatten<'a>(
    directory: &'a VirtualDirectory,
    slot: Option<Slot>,
    directories: &mut Vec<DirDescriptor>,
    files: &mut Vec<FileDescriptor<'a>>,
) -> LayoutResult<()> {
    let parent = directories.len();
    directories.push(DirDescriptor::new(directory, slot)?);

    let mut entry = 0;
    for file in &directory.files {
        files.push(FileDescriptor::new(file, Slot { parent, entry })?);
        entry += 1;
    }
    for child in &directory.children {
        flatten(child, Some(Slot { parent, entry }), directories, files)?;
        entry += 1;
    }

    let expected = directories[parent].record.entries.len();
    if entry != expected {
        return Err(LayoutError::SlotCountMismatch {
            path: directory.path.clone(),
            expected,
            actual: entry,
        });
    }
    Ok(())
}

fn patch(directories: &mut [DirDescriptor], slot: Slot, offset: u64) {
    directories[slot.parent].record.entries[slot.entry].offset = offset;
}

fn assign_offsets(
    directories: &mut [DirDescriptor],
    files: &mut [FileDescriptor<'_>],
    base_offset: u64,
) -> LayoutResult<u64> {
    let Some(root) = directories.first_mut() else {
        return Ok(base_offset);
    };
    // The root is reached through the superblock, not a parent slot.
    root.offset = base_offset;
    let mut cursor = base_offset + root.length();

    for index in 1..directories.len() {
        let descriptor = &mut directories[index];
        let slot = descriptor
            .slot
            .ok_or_else(|| LayoutError::Unanchored(descriptor.path.clone()))?;
        descriptor.offset = cursor;
        let length = descriptor.length();
        patch(directories, slot, cursor);
        cursor += length;
    }

    for file in files.iter_mut() {
        file.offset = cursor;
        patch(directories, file.slot, cursor);
        cursor += file.length();
    }
    Ok(cursor)
}
