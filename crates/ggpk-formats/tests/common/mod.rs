//! Byte-level archive assembly for integration tests
//!
//! Records are laid out by hand so tests do not depend on the crate's own
//! encoder to produce their inputs.

#![allow(dead_code)]

use ggpk_formats::Digest;

/// Null-terminated UTF-16LE name bytes
pub fn name_bytes(name: &str) -> Vec<u8> {
    name.encode_utf16()
        .chain(std::iter::once(0))
        .flat_map(u16::to_le_bytes)
        .collect()
}

fn record(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8 + payload.len());
    bytes.extend_from_slice(&(8 + payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(tag);
    bytes.extend_from_slice(payload);
    bytes
}

pub fn superblock(offsets: &[u64]) -> Vec<u8> {
    let mut payload = (offsets.len() as u32).to_le_bytes().to_vec();
    for offset in offsets {
        payload.extend_from_slice(&offset.to_le_bytes());
    }
    record(b"GGPK", &payload)
}

pub fn directory(name: &str, digest: Digest, entries: &[(u32, u64)]) -> Vec<u8> {
    let name_units = name.encode_utf16().count() as u32 + 1;
    let mut payload = name_units.to_le_bytes().to_vec();
    payload.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    payload.extend_from_slice(digest.as_bytes());
    payload.extend_from_slice(&name_bytes(name));
    for (timestamp, offset) in entries {
        payload.extend_from_slice(&timestamp.to_le_bytes());
        payload.extend_from_slice(&offset.to_le_bytes());
    }
    record(b"PDIR", &payload)
}

pub fn file(name: &str, content: &[u8]) -> Vec<u8> {
    let name_units = name.encode_utf16().count() as u32 + 1;
    let mut payload = name_units.to_le_bytes().to_vec();
    payload.extend_from_slice(Digest::from_data(content).as_bytes());
    payload.extend_from_slice(&name_bytes(name));
    payload.extend_from_slice(content);
    record(b"FILE", &payload)
}

/// A `FREE` record spanning `length` bytes in total
pub fn free(next: u64, length: usize) -> Vec<u8> {
    let mut payload = next.to_le_bytes().to_vec();
    payload.resize(length - 8, 0xEE);
    record(b"FREE", &payload)
}

pub fn unknown(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    record(tag, payload)
}

/// Overwrite the declared length of the record at `offset`
pub fn set_length(bytes: &mut [u8], offset: u64, length: u32) {
    let offset = offset as usize;
    bytes[offset..offset + 4].copy_from_slice(&length.to_le_bytes());
}

/// Digest of a directory holding files with the given contents, in name
/// order, and no subdirectories
pub fn flat_digest(contents: &[&[u8]]) -> Digest {
    let mut data = Vec::new();
    for content in contents {
        data.extend_from_slice(Digest::from_data(content).as_bytes());
    }
    Digest::from_data(&data)
}

/// Appends records after a superblock with a fixed node count
pub struct ArchiveBuilder {
    bytes: Vec<u8>,
    node_count: usize,
}

impl ArchiveBuilder {
    pub fn new(node_count: usize) -> Self {
        Self {
            bytes: vec![0; 12 + 8 * node_count],
            node_count,
        }
    }

    /// Offset the next pushed record will land at
    pub fn next_offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn push(&mut self, record: &[u8]) -> u64 {
        let offset = self.next_offset();
        self.bytes.extend_from_slice(record);
        offset
    }

    pub fn finish(mut self, offsets: &[u64]) -> Vec<u8> {
        assert_eq!(offsets.len(), self.node_count);
        let header = superblock(offsets);
        self.bytes[..header.len()].copy_from_slice(&header);
        self.bytes
    }
}

/// Superblock, root and a single file `a.txt` holding `hello`
pub fn minimal_archive() -> Vec<u8> {
    let root_offset = 20;
    let root_len = 8 + 4 + 4 + 32 + 2 + 12;
    let mut builder = ArchiveBuilder::new(1);
    builder.push(&directory(
        "",
        flat_digest(&[b"hello"]),
        &[(7, root_offset + root_len)],
    ));
    builder.push(&file("a.txt", b"hello"));
    builder.finish(&[root_offset])
}

/// Offset of the `hello` content inside [`minimal_archive`]
pub const MINIMAL_CONTENT_OFFSET: usize = 82 + 8 + 4 + 32 + 12;
