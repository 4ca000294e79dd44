#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for writing compacted archives
//!
//! Archives are scanned, relinked and written back, then re-opened to check
//! that every pointer lands on the right record and no space is wasted.

mod common;

use common::{ArchiveBuilder, directory, file, flat_digest, free, minimal_archive, unknown};
use ggpk_formats::archive::Archive;
use ggpk_formats::layout::LayoutError;
use ggpk_formats::record::{DirectoryRecord, RecordTag};
use ggpk_formats::vfs::VirtualNode;
use ggpk_formats::{
    Digest, VerifyMode, VirtualDirectory, defragment, from_local_dir, open_archive, verify,
    write_archive,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Cursor;

const BIG: [u8; 100] = [0x5A; 100];

/// An archive full of holes: garbage records, free space and out-of-order
/// nodes around a small tree
fn fragmented_archive() -> Vec<u8> {
    let mut builder = ArchiveBuilder::new(2);
    builder.push(&unknown(b"JUNK", &[0; 50]));
    let second_hole = builder.push(&free(0, 64));
    let b = builder.push(&file("b.bin", &BIG));
    let first_hole = builder.push(&free(second_hole, 32));
    let sub_digest = flat_digest(&[&BIG]);
    let sub = builder.push(&directory("sub", sub_digest, &[(22, b)]));
    let a = builder.push(&file("a.txt", b"alpha"));

    let mut root_data = Vec::new();
    root_data.extend_from_slice(Digest::from_data(b"alpha").as_bytes());
    root_data.extend_from_slice(sub_digest.as_bytes());
    let root = builder.push(&directory(
        "",
        Digest::from_data(&root_data),
        &[(21, sub), (11, a)],
    ));
    builder.finish(&[root, first_hole])
}

fn compact(bytes: Vec<u8>) -> Vec<u8> {
    let root = Archive::open(Cursor::new(bytes))
        .unwrap()
        .build_tree()
        .unwrap();
    let mut out = Cursor::new(Vec::new());
    write_archive(&root, &mut out).unwrap();
    out.into_inner()
}

/// Count records reachable from `record`, checking each entry's tag
fn check_links(archive: &Archive, record: &DirectoryRecord, tree: &VirtualDirectory) -> usize {
    let mut reached = 0;
    for header in archive.children_of(record).unwrap() {
        reached += 1;
        match header.tag {
            RecordTag::Directory => {
                let child = archive.read_directory(&header).unwrap();
                let Some(VirtualNode::Directory(node)) =
                    tree.find(&format!("{}/", child.name))
                else {
                    panic!("{} is not a directory in the tree", child.name);
                };
                reached += check_links(archive, &child, node);
            }
            RecordTag::File => {
                let child = archive.read_file(&header).unwrap();
                assert!(tree.files.iter().any(|f| f.name == child.name));
            }
            other => panic!("unexpected {other} record in a compacted archive"),
        }
    }
    reached
}

#[test]
fn minimal_archive_is_already_compact() {
    let original = minimal_archive();
    assert_eq!(compact(original.clone()), original);
}

#[test]
fn write_archive_leaves_existing_tail() {
    let root = Archive::open(Cursor::new(minimal_archive()))
        .unwrap()
        .build_tree()
        .unwrap();
    let mut out = Cursor::new(vec![0xCC; 1000]);
    let summary = write_archive(&root, &mut out).unwrap();

    let bytes = out.into_inner();
    let written = usize::try_from(summary.bytes_written).unwrap();
    assert_eq!(written, 143);
    assert_eq!(bytes.len(), 1000);
    assert_eq!(bytes[..written], minimal_archive()[..]);
    assert!(bytes[written..].iter().all(|&b| b == 0xCC));
}

#[test]
fn defragment_replaces_longer_destination() {
    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("out.ggpk");
    fs::write(&destination, vec![0xCC; 4096]).unwrap();

    let root = Archive::open(Cursor::new(minimal_archive()))
        .unwrap()
        .build_tree()
        .unwrap();
    let summary = defragment(&root, &destination).unwrap();
    assert_eq!(summary.bytes_written, 143);
    assert_eq!(fs::read(&destination).unwrap(), minimal_archive());
}

#[test]
fn compacted_size_is_sum_of_records() {
    let compacted = compact(fragmented_archive());

    let expected = 20
        + directory("", Digest::default(), &[(0, 0); 2]).len()
        + directory("sub", Digest::default(), &[(0, 0)]).len()
        + file("a.txt", b"alpha").len()
        + file("b.bin", &BIG).len();
    assert_eq!(compacted.len(), expected);
}

#[test]
fn compacted_pointers_resolve() {
    let archive = Archive::open(Cursor::new(compact(fragmented_archive()))).unwrap();
    assert_eq!(archive.superblock().offsets, vec![20]);
    assert!(archive.free_list().unwrap().is_empty());

    let tree = archive.build_tree().unwrap();
    let root_record = archive.root_record().unwrap();
    assert_eq!(check_links(&archive, &root_record, &tree), 3);

    // Root files first, then subdirectories.
    assert_eq!(root_record.entries[0].timestamp, 11);
    assert_eq!(root_record.entries[1].timestamp, 21);

    let Some(VirtualNode::File(b)) = tree.find("/sub/b.bin") else {
        panic!("b.bin should resolve");
    };
    assert_eq!(b.timestamp, 22);
    assert_eq!(b.content().unwrap(), BIG);
    assert!(verify(&tree, VerifyMode::CollectAll).unwrap().is_ok());
}

#[test]
fn compacted_layout_order() {
    let archive = Archive::open(Cursor::new(compact(fragmented_archive()))).unwrap();
    let root_record = archive.root_record().unwrap();
    let children = archive.children_of(&root_record).unwrap();
    let sub = archive.read_directory(&children[1]).unwrap();
    let b = archive.children_of(&sub).unwrap()[0];

    let root_end = 20 + directory("", Digest::default(), &[(0, 0); 2]).len() as u64;
    assert_eq!(children[1].offset(), root_end);
    let dirs_end = root_end + u64::from(children[1].length);
    assert_eq!(children[0].offset(), dirs_end);
    assert_eq!(b.offset(), dirs_end + u64::from(children[0].length));
}

#[test]
fn defragmentation_is_idempotent() {
    let once = compact(fragmented_archive());
    let twice = compact(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn defragment_persists_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("in.ggpk");
    let destination = dir.path().join("out.ggpk");
    fs::write(&source, fragmented_archive()).unwrap();

    let root = open_archive(&source).unwrap();
    let summary = defragment(&root, &destination).unwrap();
    assert_eq!(summary.directories, 2);
    assert_eq!(summary.files, 2);
    assert_eq!(summary.bytes_written, fs::metadata(&destination).unwrap().len());

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, ["in.ggpk", "out.ggpk"]);

    let reopened = open_archive(&destination).unwrap();
    assert_eq!(reopened.digest(), root.digest());
    assert!(verify(&reopened, VerifyMode::CollectAll).unwrap().is_ok());
}

#[cfg(unix)]
#[test]
fn defragment_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("content.ggpk");
    fs::write(&path, fragmented_archive()).unwrap();

    let root = open_archive(&path).unwrap();
    defragment(&root, &path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), compact(fragmented_archive()));
}

#[test]
fn failed_write_leaves_no_destination() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("data.bin"), b"0123456789").unwrap();
    let root = from_local_dir(&source).unwrap();

    fs::write(source.join("data.bin"), b"01234").unwrap();
    let destination = dir.path().join("out.ggpk");
    let err = defragment(&root, &destination).unwrap_err();
    assert!(matches!(err, LayoutError::Content { ref path, .. } if path == "/data.bin"));
    assert!(!destination.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn pack_local_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    fs::create_dir_all(source.join("data/nested")).unwrap();
    fs::create_dir_all(source.join("empty")).unwrap();
    fs::write(source.join("readme.txt"), b"read me").unwrap();
    fs::write(source.join("data/x.bin"), [1u8, 2, 3]).unwrap();
    fs::write(source.join("data/nested/y.bin"), vec![9u8; 1000]).unwrap();

    let local = from_local_dir(&source).unwrap();
    let destination = dir.path().join("packed.ggpk");
    defragment(&local, &destination).unwrap();

    let packed = open_archive(&destination).unwrap();
    assert_eq!(packed.directory_count(), 4);
    assert_eq!(packed.file_count(), 3);
    assert_eq!(packed.stored_digest(), Some(local.computed_digest()));
    assert!(verify(&packed, VerifyMode::CollectAll).unwrap().is_ok());

    let Some(VirtualNode::File(y)) = packed.find("/data/nested/y.bin") else {
        panic!("y.bin should resolve");
    };
    assert_eq!(y.content().unwrap(), vec![9u8; 1000]);
    assert!(matches!(
        packed.find("/empty/"),
        Some(VirtualNode::Directory(d)) if d.files.is_empty()
    ));
}
