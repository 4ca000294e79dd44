//! Virtual files and where their content lives

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::{ArchiveError, ArchiveResult, SharedStream};
use crate::record::{Digest, FileRecord, RecordHeader};

/// Where a virtual file's content bytes can be read from
///
/// The source never owns the archive's lifetime in any way callers can
/// observe: it records where to seek when content is requested.
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A region of an archive's shared origin stream
    Stream(SharedStream),
    /// A file on the local filesystem, opened on every read
    Path(PathBuf),
    /// An in-memory buffer
    Memory(Arc<[u8]>),
}

/// A file in the virtual tree
#[derive(Debug, Clone)]
pub struct VirtualFile {
    /// Absolute virtual path, e.g. `/Art/a.dds`
    pub path: String,
    /// File name
    pub name: String,
    /// Modification time, Unix seconds
    pub timestamp: u32,
    /// Stored SHA-256 of the content
    pub digest: Digest,
    /// Content size in bytes
    pub size: u64,
    /// Offset of the content inside its source
    pub content_offset: u64,
    /// Content source
    pub source: ContentSource,
}

impl VirtualFile {
    /// Create a file from a record read out of an archive
    pub fn from_record(
        header: &RecordHeader,
        record: FileRecord,
        timestamp: u32,
        parent_path: &str,
        stream: SharedStream,
    ) -> Self {
        Self {
            path: format!("{parent_path}{}", record.name),
            size: record.content_size(header),
            content_offset: record.content_offset(header),
            name: record.name,
            timestamp,
            digest: record.digest,
            source: ContentSource::Stream(stream),
        }
    }

    /// Create a file backed by an in-memory buffer, hashing its content
    pub fn from_memory(
        parent_path: &str,
        name: &str,
        timestamp: u32,
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        let data: Arc<[u8]> = data.into();
        Self {
            path: format!("{parent_path}{name}"),
            name: name.to_string(),
            timestamp,
            digest: Digest::from_data(&data),
            size: data.len() as u64,
            content_offset: 0,
            source: ContentSource::Memory(data),
        }
    }

    /// Read the content bytes from the file's source
    pub fn content(&self) -> ArchiveResult<Vec<u8>> {
        match &self.source {
            ContentSource::Stream(stream) => stream
                .read_at(self.content_offset, self.size)
                .map_err(|source| ArchiveError::Io {
                    offset: self.content_offset,
                    source,
                }),
            ContentSource::Path(path) => {
                let local_io = |source| ArchiveError::LocalIo {
                    path: path.clone(),
                    source,
                };
                let mut file = File::open(path).map_err(local_io)?;
                file.seek(SeekFrom::Start(self.content_offset))
                    .map_err(local_io)?;
                let mut data = Vec::new();
                file.take(self.size)
                    .read_to_end(&mut data)
                    .map_err(local_io)?;
                if data.len() as u64 == self.size {
                    Ok(data)
                } else {
                    Err(local_io(std::io::ErrorKind::UnexpectedEof.into()))
                }
            }
            ContentSource::Memory(buffer) => {
                let start = usize::try_from(self.content_offset).unwrap_or(usize::MAX);
                let end = start.saturating_add(usize::try_from(self.size).unwrap_or(usize::MAX));
                buffer
                    .get(start..end)
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| ArchiveError::Io {
                        offset: self.content_offset,
                        source: std::io::ErrorKind::UnexpectedEof.into(),
                    })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_memory_file() {
        let file = VirtualFile::from_memory("/docs/", "a.txt", 42, b"hello".to_vec());
        assert_eq!(file.path, "/docs/a.txt");
        assert_eq!(file.size, 5);
        assert_eq!(file.digest, Digest::from_data(b"hello"));
        assert_eq!(file.content().unwrap(), b"hello");
    }

    #[test]
    fn test_stream_file_reads_region() {
        let stream = SharedStream::new(Cursor::new(b"....hello....".to_vec()));
        let file = VirtualFile {
            path: "/a.txt".to_string(),
            name: "a.txt".to_string(),
            timestamp: 0,
            digest: Digest::from_data(b"hello"),
            size: 5,
            content_offset: 4,
            source: ContentSource::Stream(stream),
        };
        assert_eq!(file.content().unwrap(), b"hello");
    }

    #[test]
    fn test_region_past_end_is_an_error() {
        let stream = SharedStream::new(Cursor::new(b"abc".to_vec()));
        let file = VirtualFile {
            path: "/x".to_string(),
            name: "x".to_string(),
            timestamp: 0,
            digest: Digest::default(),
            size: 10,
            content_offset: 1,
            source: ContentSource::Stream(stream),
        };
        assert!(matches!(
            file.content(),
            Err(ArchiveError::Io { offset: 1, .. })
        ));
    }
}
