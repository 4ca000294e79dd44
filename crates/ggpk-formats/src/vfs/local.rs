//! Freshly assembled trees from a local directory
//!
//! File digests are computed from the bytes on disk; directory digests are
//! never stored and are recomputed from the children on demand.

use std::fs::{self, File, Metadata};
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::archive::{ArchiveError, ArchiveResult};
use crate::record::Digest;
use crate::vfs::{ContentSource, VirtualDirectory, VirtualFile};

/// Build a virtual tree mirroring the directory at `path`
///
/// Symlinks and special files are skipped.
pub fn from_local_dir(path: impl AsRef<Path>) -> ArchiveResult<VirtualDirectory> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|source| ArchiveError::LocalIo {
        path: path.to_path_buf(),
        source,
    })?;
    let mut root = VirtualDirectory::root(unix_mtime(&metadata));
    // Directories still being filled; entry `i` sits at walk depth `i + 1`.
    let mut open = Vec::new();

    for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        close_to(&mut root, &mut open, entry.depth() - 1);
        let parent = open.last_mut().unwrap_or(&mut root);

        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_name().to_str().is_none() {
            warn!(path = %entry.path().display(), "non UTF-8 file name stored lossily");
        }

        if metadata.is_dir() {
            let child_path = parent.child_path(&name);
            open.push(VirtualDirectory::new(child_path, name, unix_mtime(&metadata)));
        } else if metadata.is_file() {
            let local_io = |source| ArchiveError::LocalIo {
                path: entry.path().to_path_buf(),
                source,
            };
            let mut file = File::open(entry.path()).map_err(local_io)?;
            let digest = Digest::from_reader(&mut file).map_err(local_io)?;
            parent.files.push(VirtualFile {
                path: format!("{}{name}", parent.path),
                name,
                timestamp: unix_mtime(&metadata),
                digest,
                size: metadata.len(),
                content_offset: 0,
                source: ContentSource::Path(entry.path().to_path_buf()),
            });
        } else {
            debug!(path = %entry.path().display(), "skipping special file");
        }
    }
    close_to(&mut root, &mut open, 0);
    root.sort();

    info!(
        source = %path.display(),
        directories = root.directory_count(),
        files = root.file_count(),
        "assembled tree from local directory"
    );
    Ok(root)
}

/// Finish open directories until only `depth` remain, attaching each to its
/// parent
fn close_to(root: &mut VirtualDirectory, open: &mut Vec<VirtualDirectory>, depth: usize) {
    while open.len() > depth {
        let Some(mut done) = open.pop() else {
            break;
        };
        done.sort();
        open.last_mut().unwrap_or(&mut *root).children.push(done);
    }
}

fn unix_mtime(metadata: &Metadata) -> u32 {
    metadata
        .modified()
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |elapsed| {
            u32::try_from(elapsed.as_secs()).unwrap_or(u32::MAX)
        })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::vfs::VirtualNode;

    #[test]
    fn test_from_local_dir() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join("b.txt"), b"bee").unwrap();
        fs::write(temp.path().join("a.txt"), b"hello").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();
        fs::write(temp.path().join("sub").join("c.bin"), [1u8, 2, 3]).unwrap();

        let root = from_local_dir(temp.path()).unwrap();
        assert_eq!(root.path, "/");
        assert!(root.stored_digest().is_none());

        let names: Vec<_> = root.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.txt", "b.txt"]);
        assert_eq!(root.files[0].digest, Digest::from_data(b"hello"));
        assert_eq!(root.files[0].content().unwrap(), b"hello");

        let Some(VirtualNode::File(nested)) = root.find("/sub/c.bin") else {
            panic!("nested file missing");
        };
        assert_eq!(nested.size, 3);
        assert_eq!(nested.content().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn test_deep_tree_returns_to_shallower_levels() {
        let temp = tempfile::tempdir().unwrap();
        fs::create_dir_all(temp.path().join("a/b/c")).unwrap();
        fs::write(temp.path().join("a/b/c/deep.bin"), b"deep").unwrap();
        fs::write(temp.path().join("a/mid.bin"), b"mid").unwrap();
        fs::create_dir(temp.path().join("z")).unwrap();
        fs::write(temp.path().join("z/last.bin"), b"last").unwrap();
        fs::write(temp.path().join("top.bin"), b"top").unwrap();

        let root = from_local_dir(temp.path()).unwrap();
        let paths: Vec<_> = root.walk_files().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            ["/top.bin", "/a/mid.bin", "/a/b/c/deep.bin", "/z/last.bin"]
        );
        let dirs: Vec<_> = root.children.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(dirs, ["/a/", "/z/"]);
        assert_eq!(root.directory_count(), 5);
    }

    #[test]
    fn test_missing_directory() {
        let temp = tempfile::tempdir().unwrap();
        let result = from_local_dir(temp.path().join("absent"));
        assert!(matches!(result, Err(ArchiveError::LocalIo { .. })));
    }
}
