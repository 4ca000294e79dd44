//! Archive serialization
//!
//! Streams a planned layout: superblock, directory records, then file
//! records with their content read lazily from each file's source. Any
//! failure aborts the whole write; a partially written destination is never a
//! valid archive.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::layout::error::{LayoutError, LayoutResult};
use crate::layout::planner;
use crate::record::{Record, Superblock};
use crate::vfs::VirtualDirectory;

/// What a completed write produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Directory records written
    pub directories: usize,
    /// File records written
    pub files: usize,
    /// Total archive size in bytes
    pub bytes_written: u64,
}

fn encode<R: Record, W: Write + Seek>(writer: &mut W, record: &R, offset: u64) -> LayoutResult<()> {
    record
        .encode(writer)
        .map_err(|source| LayoutError::Record { offset, source })
}

/// Write `root` as a complete, compacted archive starting at offset 0 of
/// `writer`
///
/// The writer is not truncated: it should start out empty, since any bytes
/// it already holds past [`WriteSummary::bytes_written`] stay in place after
/// the archive. [`defragment`] always writes into a fresh file.
pub fn write_archive<W: Write + Seek>(
    root: &VirtualDirectory,
    writer: &mut W,
) -> LayoutResult<WriteSummary> {
    let superblock_len = Superblock::length_for(1);
    let plan = planner::plan(root, u64::from(superblock_len))?;

    writer
        .seek(SeekFrom::Start(0))
        .map_err(|source| LayoutError::Io { offset: 0, source })?;
    encode(writer, &Superblock::new(vec![plan.base_offset]), 0)?;

    for directory in &plan.directories {
        encode(writer, &directory.header, directory.offset)?;
        encode(writer, &directory.record, directory.offset)?;
    }
    debug!(count = plan.directories.len(), "wrote directory records");

    for file in &plan.files {
        let path = &file.source.path;
        encode(writer, &file.header, file.offset)?;
        encode(writer, &file.record, file.offset)?;

        let content = file.source.content().map_err(|source| LayoutError::Content {
            path: path.clone(),
            source,
        })?;
        if content.len() as u64 != file.content_size() {
            return Err(LayoutError::ContentSizeMismatch {
                path: path.clone(),
                expected: file.content_size(),
                actual: content.len() as u64,
            });
        }
        writer
            .write_all(&content)
            .map_err(|source| LayoutError::Io {
                offset: file.offset,
                source,
            })?;
    }
    writer.flush().map_err(|source| LayoutError::Io {
        offset: plan.end_offset,
        source,
    })?;

    let summary = WriteSummary {
        directories: plan.directories.len(),
        files: plan.files.len(),
        bytes_written: plan.end_offset,
    };
    info!(
        directories = summary.directories,
        files = summary.files,
        bytes = summary.bytes_written,
        "wrote archive"
    );
    Ok(summary)
}

/// Write `root` as a new compacted archive at `destination`
///
/// Output goes to a temporary file next to the destination, which replaces
/// the destination only once every record has been written and synced.
pub fn defragment(
    root: &VirtualDirectory,
    destination: impl AsRef<Path>,
) -> LayoutResult<WriteSummary> {
    let destination = destination.as_ref();
    let persist_error = |source| LayoutError::Persist {
        path: destination.to_path_buf(),
        source,
    };
    let directory = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let temp = NamedTempFile::new_in(directory).map_err(persist_error)?;
    let mut writer = BufWriter::new(temp.as_file());
    let summary = write_archive(root, &mut writer)?;
    let file: &File = writer
        .into_inner()
        .map_err(|err| LayoutError::Io {
            offset: summary.bytes_written,
            source: err.into_error(),
        })?;
    file.sync_all().map_err(persist_error)?;

    temp.persist(destination)
        .map_err(|err| persist_error(err.error))?;
    info!(destination = %destination.display(), "defragmented archive persisted");
    Ok(summary)
}
