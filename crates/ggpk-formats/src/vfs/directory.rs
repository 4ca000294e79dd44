//! Virtual directories

use std::sync::OnceLock;

use crate::integrity;
use crate::record::Digest;
use crate::vfs::{VirtualFile, VirtualNode};

/// A directory in the virtual tree
///
/// Subdirectories and files are each kept sorted by name, so iteration and
/// digesting never depend on the order entries had on disk.
#[derive(Debug, Clone)]
pub struct VirtualDirectory {
    /// Absolute virtual path with a trailing slash; `/` for the root
    pub path: String,
    /// Directory name (empty for the root)
    pub name: String,
    /// Modification time, Unix seconds
    pub timestamp: u32,
    /// Subdirectories, sorted by name
    pub children: Vec<VirtualDirectory>,
    /// Files, sorted by name
    pub files: Vec<VirtualFile>,
    stored_digest: Option<Digest>,
    computed_digest: OnceLock<Digest>,
}

impl VirtualDirectory {
    /// Create an empty, freshly assembled directory; its digest is computed
    /// from its children on demand
    pub fn new(path: impl Into<String>, name: impl Into<String>, timestamp: u32) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            timestamp,
            children: Vec::new(),
            files: Vec::new(),
            stored_digest: None,
            computed_digest: OnceLock::new(),
        }
    }

    /// Create an empty directory whose digest was loaded from an archive
    pub fn loaded(
        path: impl Into<String>,
        name: impl Into<String>,
        timestamp: u32,
        digest: Digest,
    ) -> Self {
        Self {
            stored_digest: Some(digest),
            ..Self::new(path, name, timestamp)
        }
    }

    /// Create an empty root directory
    pub fn root(timestamp: u32) -> Self {
        Self::new("/", "", timestamp)
    }

    /// Whether this is the root directory
    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    /// Virtual path of a subdirectory called `name`
    pub fn child_path(&self, name: &str) -> String {
        format!("{}{name}/", self.path)
    }

    /// Add a file and keep files sorted
    pub fn insert_file(&mut self, file: VirtualFile) {
        self.files.push(file);
        self.sort();
    }

    /// Add a subdirectory and keep subdirectories sorted
    pub fn insert_directory(&mut self, directory: Self) {
        self.children.push(directory);
        self.sort();
    }

    /// Sort subdirectories and files by name
    pub fn sort(&mut self) {
        self.children.sort_by(|a, b| a.name.cmp(&b.name));
        self.files.sort_by(|a, b| a.name.cmp(&b.name));
        self.computed_digest = OnceLock::new();
    }

    /// Digest loaded from the archive, if this directory came from one
    pub fn stored_digest(&self) -> Option<Digest> {
        self.stored_digest
    }

    /// Authoritative digest: the stored one when loaded from an archive,
    /// otherwise the computed one
    pub fn digest(&self) -> Digest {
        self.stored_digest.unwrap_or_else(|| self.computed_digest())
    }

    /// Digest recomputed over the current children, memoized
    pub fn computed_digest(&self) -> Digest {
        *self
            .computed_digest
            .get_or_init(|| integrity::directory_digest(self))
    }

    /// Resolve an absolute virtual path
    ///
    /// Paths ending in `/` (or the root `/`) only match directories.
    pub fn find(&self, path: &str) -> Option<VirtualNode<'_>> {
        let relative = path.strip_prefix('/').unwrap_or(path);
        if relative.is_empty() {
            return Some(VirtualNode::Directory(self));
        }

        let wants_directory = relative.ends_with('/');
        let mut components = relative.trim_end_matches('/').split('/').peekable();
        let mut current = self;

        while let Some(component) = components.next() {
            if components.peek().is_none() {
                if !wants_directory
                    && let Some(file) = current.files.iter().find(|f| f.name == component)
                {
                    return Some(VirtualNode::File(file));
                }
                return current
                    .children
                    .iter()
                    .find(|d| d.name == component)
                    .map(VirtualNode::Directory);
            }
            current = current.children.iter().find(|d| d.name == component)?;
        }
        None
    }

    /// Depth-first iterator over every file below this directory, a
    /// directory's own files before those of its subdirectories
    pub fn walk_files(&self) -> impl Iterator<Item = &VirtualFile> {
        let mut stack = vec![self];
        let mut pending: std::slice::Iter<'_, VirtualFile> = Default::default();
        std::iter::from_fn(move || {
            loop {
                if let Some(file) = pending.next() {
                    return Some(file);
                }
                let directory = stack.pop()?;
                stack.extend(directory.children.iter().rev());
                pending = directory.files.iter();
            }
        })
    }

    /// Number of directories in this subtree, itself included
    pub fn directory_count(&self) -> usize {
        1 + self.children.iter().map(Self::directory_count).sum::<usize>()
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(Self::file_count).sum::<usize>()
    }

    /// Total content size of this subtree
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum::<u64>()
            + self.children.iter().map(Self::total_size).sum::<u64>()
    }
}
