//! Archive scanner
//!
//! Opens a GGPK stream, validates the superblock signature and resolves the
//! pointers stored in the superblock and in directory entries. Resolved
//! headers carry the absolute offset of their payload, so follow-up reads
//! need no further arithmetic.
//!
//! # Example
//!
//! ```no_run
//! use ggpk_formats::archive::Archive;
//!
//! let archive = Archive::open_path("Content.ggpk")?;
//! for header in archive.top_level()? {
//!     println!("{} at {}", header.tag, header.offset());
//! }
//! let root = archive.build_tree()?;
//! println!("{} files at the top level", root.files.len());
//! # Ok::<(), ggpk_formats::archive::ArchiveError>(())
//! ```

mod error;
pub mod scanner;
mod stream;

pub use error::{ArchiveError, ArchiveResult};
pub(crate) use error::AtOffset;
pub use scanner::FreeBlock;
pub use stream::{ReadSeek, SharedStream};

use std::path::Path;
use tracing::debug;

use crate::record::{DirectoryRecord, FileRecord, RecordHeader, RecordTag, Superblock};
use crate::vfs::{self, VirtualDirectory};

/// An opened archive: the origin stream plus its validated superblock
#[derive(Debug, Clone)]
pub struct Archive {
    stream: SharedStream,
    superblock: Superblock,
}

impl Archive {
    /// Open an archive from any seekable reader
    pub fn open<R: ReadSeek + 'static>(reader: R) -> ArchiveResult<Self> {
        Self::from_stream(SharedStream::new(reader))
    }

    /// Open an archive file
    pub fn open_path(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let path = path.as_ref();
        let stream = SharedStream::open(path).map_err(|source| ArchiveError::LocalIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_stream(stream)
    }

    /// Open an archive over an existing shared stream
    pub fn from_stream(stream: SharedStream) -> ArchiveResult<Self> {
        let superblock = stream.with(|reader| scanner::read_superblock(reader))?;
        debug!(nodes = superblock.node_count(), "read superblock");
        Ok(Self { stream, superblock })
    }

    /// The validated superblock
    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    /// The origin stream shared with every file loaded from this archive
    pub fn stream(&self) -> &SharedStream {
        &self.stream
    }

    /// Resolved headers of all top-level nodes
    pub fn top_level(&self) -> ArchiveResult<Vec<RecordHeader>> {
        self.stream.with(|reader| scanner::top_level(reader, &self.superblock))
    }

    /// Header of the root directory
    pub fn root_header(&self) -> ArchiveResult<RecordHeader> {
        scanner::find_root(&self.top_level()?)
    }

    /// Decoded root directory record
    pub fn root_record(&self) -> ArchiveResult<DirectoryRecord> {
        let header = self.root_header()?;
        self.stream.with(|reader| scanner::read_root(reader, &header))
    }

    /// Resolved headers of every entry of `directory`
    pub fn children_of(&self, directory: &DirectoryRecord) -> ArchiveResult<Vec<RecordHeader>> {
        self.stream.with(|reader| scanner::children_of(reader, directory))
    }

    /// Decode the directory record behind a resolved header
    pub fn read_directory(&self, header: &RecordHeader) -> ArchiveResult<DirectoryRecord> {
        self.stream.with(|reader| scanner::read_directory(reader, header))
    }

    /// Decode the file record behind a resolved header
    pub fn read_file(&self, header: &RecordHeader) -> ArchiveResult<FileRecord> {
        self.stream.with(|reader| scanner::read_file(reader, header))
    }

    /// Walk the free list from the first top-level `FREE` node
    ///
    /// Archives without a free node have an empty free list.
    pub fn free_list(&self) -> ArchiveResult<Vec<FreeBlock>> {
        let Some(head) = self
            .top_level()?
            .into_iter()
            .find(|header| header.tag == RecordTag::Free)
        else {
            return Ok(Vec::new());
        };
        self.stream.with(|reader| scanner::free_list(reader, head.offset()))
    }

    /// Build the virtual tree rooted at the root directory
    pub fn build_tree(&self) -> ArchiveResult<VirtualDirectory> {
        let header = self.root_header()?;
        vfs::build_tree(&self.stream, &header)
    }
}

/// Open the archive at `path` and build its virtual tree
pub fn open_archive(path: impl AsRef<Path>) -> ArchiveResult<VirtualDirectory> {
    Archive::open_path(path)?.build_tree()
}
