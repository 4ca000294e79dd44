//! Command handlers
//!
//! Each handler opens what it needs, runs one library operation and prints a
//! short report on stdout. Errors carry the path they concern.

use anyhow::{Context, Result, bail};
use ggpk_formats::archive::Archive;
use ggpk_formats::vfs::{VirtualDirectory, VirtualFile, VirtualNode};
use ggpk_formats::{VerifyMode, defragment, from_local_dir, verify};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn open(path: &Path) -> Result<Archive> {
    Archive::open_path(path).with_context(|| format!("cannot open archive {}", path.display()))
}

fn open_tree(path: &Path) -> Result<VirtualDirectory> {
    open(path)?
        .build_tree()
        .with_context(|| format!("cannot read the directory tree of {}", path.display()))
}

/// Print the top-level records and free space, plus every file with `tree`
pub fn list(path: &Path, tree: bool) -> Result<()> {
    let archive = open(path)?;
    for header in archive.top_level()? {
        println!("{:>12}  {}  {} bytes", header.offset(), header.tag, header.length);
    }

    let free = archive.free_list()?;
    let free_bytes: u64 = free.iter().map(|block| u64::from(block.length)).sum();
    println!("{} free blocks, {free_bytes} bytes", free.len());

    if tree {
        let root = archive.build_tree()?;
        for file in root.walk_files() {
            println!("{}  {:>10}  {}", file.digest, file.size, file.path);
        }
        println!(
            "{} directories, {} files, {} bytes",
            root.directory_count(),
            root.file_count(),
            root.total_size()
        );
    }
    Ok(())
}

/// Copy the node at `virtual_path` into `destination`
///
/// A directory's files land in a subdirectory named after it (the root's
/// directly in `destination`); subdirectories are only followed with
/// `recursive`.
pub fn extract(path: &Path, virtual_path: &str, destination: &Path, recursive: bool) -> Result<()> {
    let root = open_tree(path)?;
    let node = root
        .find(virtual_path)
        .with_context(|| format!("{virtual_path} not found in {}", path.display()))?;

    let count = match node {
        VirtualNode::File(file) => {
            create_dir(destination)?;
            write_file(file, destination)?;
            1
        }
        VirtualNode::Directory(directory) => extract_directory(directory, destination, recursive)?,
    };
    info!(files = count, destination = %destination.display(), "extraction complete");
    Ok(())
}

fn extract_directory(
    directory: &VirtualDirectory,
    destination: &Path,
    recursive: bool,
) -> Result<usize> {
    let target = if directory.is_root() {
        destination.to_path_buf()
    } else {
        destination.join(safe_name(&directory.name)?)
    };
    create_dir(&target)?;

    let mut count = 0;
    for file in &directory.files {
        write_file(file, &target)?;
        count += 1;
    }
    if recursive {
        for child in &directory.children {
            count += extract_directory(child, &target, true)?;
        }
    }
    Ok(count)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("cannot create {}", path.display()))
}

fn write_file(file: &VirtualFile, directory: &Path) -> Result<()> {
    let target = directory.join(safe_name(&file.name)?);
    let content = file
        .content()
        .with_context(|| format!("cannot read {}", file.path))?;
    fs::write(&target, content).with_context(|| format!("cannot write {}", target.display()))?;
    debug!(path = %file.path, target = %target.display(), "extracted");
    Ok(())
}

/// Reject names that would escape the extraction directory
fn safe_name(name: &str) -> Result<&str> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!("refusing to extract entry named {name:?}");
    }
    Ok(name)
}

/// Verify every digest in the archive; fails if any mismatch was found
pub fn check(path: &Path, fail_fast: bool) -> Result<()> {
    let root = open_tree(path)?;
    let mode = if fail_fast {
        VerifyMode::FailFast
    } else {
        VerifyMode::CollectAll
    };
    let report = verify(&root, mode)
        .with_context(|| format!("verification of {} failed", path.display()))?;

    for mismatch in &report.mismatches {
        println!("{mismatch}");
    }
    println!(
        "{} files, {} directories checked, {} mismatches",
        report.files_checked,
        report.directories_checked,
        report.mismatches.len()
    );
    if !report.is_ok() {
        bail!("{} has {} digest mismatches", path.display(), report.mismatches.len());
    }
    Ok(())
}

/// Write a compacted copy of the archive at `path` to `output`
pub fn defrag(path: &Path, output: &Path) -> Result<()> {
    let root = open_tree(path)?;
    let summary =
        defragment(&root, output).with_context(|| format!("cannot write {}", output.display()))?;
    println!(
        "{}: {} directories, {} files, {} bytes",
        output.display(),
        summary.directories,
        summary.files,
        summary.bytes_written
    );
    Ok(())
}

/// Build a new archive at `output` from the directory `source`
pub fn pack(source: &Path, output: &Path) -> Result<()> {
    let root = from_local_dir(source).with_context(|| format!("cannot read {}", source.display()))?;
    let summary =
        defragment(&root, output).with_context(|| format!("cannot write {}", output.display()))?;
    println!(
        "{}: {} directories, {} files, {} bytes",
        output.display(),
        summary.directories,
        summary.files,
        summary.bytes_written
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn packed() -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("source");
        fs::create_dir_all(source.join("Data/Sub")).unwrap();
        fs::write(source.join("top.txt"), b"top").unwrap();
        fs::write(source.join("Data/a.dat"), b"alpha").unwrap();
        fs::write(source.join("Data/Sub/b.dat"), b"beta").unwrap();

        let archive = dir.path().join("packed.ggpk");
        pack(&source, &archive).unwrap();
        (dir, archive)
    }

    #[test]
    fn test_pack_then_check() {
        let (_dir, archive) = packed();
        check(&archive, false).unwrap();
        check(&archive, true).unwrap();
        list(&archive, true).unwrap();
    }

    #[test]
    fn test_check_reports_corruption() {
        let (_dir, archive) = packed();
        let mut bytes = fs::read(&archive).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        fs::write(&archive, bytes).unwrap();

        assert!(check(&archive, false).is_err());
        assert!(check(&archive, true).is_err());
    }

    #[test]
    fn test_extract_directory() {
        let (dir, archive) = packed();
        let out = dir.path().join("out");

        extract(&archive, "/Data/", &out, false).unwrap();
        assert_eq!(fs::read(out.join("Data/a.dat")).unwrap(), b"alpha");
        assert!(!out.join("Data/Sub").exists());

        extract(&archive, "/", &out, true).unwrap();
        assert_eq!(fs::read(out.join("top.txt")).unwrap(), b"top");
        assert_eq!(fs::read(out.join("Data/Sub/b.dat")).unwrap(), b"beta");
    }

    #[test]
    fn test_extract_single_file() {
        let (dir, archive) = packed();
        let out = dir.path().join("single");
        extract(&archive, "/Data/Sub/b.dat", &out, false).unwrap();
        assert_eq!(fs::read(out.join("b.dat")).unwrap(), b"beta");
        assert!(extract(&archive, "/missing", &out, false).is_err());
    }

    #[test]
    fn test_defrag_round_trip() {
        let (dir, archive) = packed();
        let output = dir.path().join("defrag.ggpk");
        defrag(&archive, &output).unwrap();
        assert_eq!(fs::read(&output).unwrap(), fs::read(&archive).unwrap());
    }

    #[test]
    fn test_extract_refuses_unnamed_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let mut root = VirtualDirectory::root(0);
        let mut unnamed = VirtualDirectory::new(root.child_path(""), "", 0);
        unnamed.insert_file(VirtualFile::from_memory(&unnamed.path, "x.dat", 0, b"x".to_vec()));
        root.insert_directory(unnamed);
        let archive = dir.path().join("unnamed.ggpk");
        defragment(&root, &archive).unwrap();

        let out = dir.path().join("out");
        assert!(extract(&archive, "/", &out, true).is_err());
        assert!(!out.join("x.dat").exists());
    }

    #[test]
    fn test_safe_name() {
        assert!(safe_name("a.dat").is_ok());
        assert!(safe_name("..").is_err());
        assert!(safe_name("a/b").is_err());
        assert!(safe_name("").is_err());
    }
}
