//! In-memory virtual tree
//!
//! A [`VirtualDirectory`] is built either from a parsed archive
//! ([`build_tree`]) or freshly assembled from local files
//! ([`from_local_dir`]). Loaded directories keep the digest stored in the
//! archive; freshly assembled ones compute theirs from their children.

mod builder;
mod directory;
mod file;
mod local;

pub use builder::build_tree;
pub use directory::VirtualDirectory;
pub use file::{ContentSource, VirtualFile};
pub use local::from_local_dir;

/// Borrowed reference to either kind of tree node
#[derive(Debug, Clone, Copy)]
pub enum VirtualNode<'a> {
    /// A directory
    Directory(&'a VirtualDirectory),
    /// A file
    File(&'a VirtualFile),
}

impl VirtualNode<'_> {
    /// Virtual path of the node
    pub fn path(&self) -> &str {
        match self {
            Self::Directory(directory) => &directory.path,
            Self::File(file) => &file.path,
        }
    }
}

impl<'a> From<&'a VirtualDirectory> for VirtualNode<'a> {
    fn from(directory: &'a VirtualDirectory) -> Self {
        Self::Directory(directory)
    }
}

impl<'a> From<&'a VirtualFile> for VirtualNode<'a> {
    fn from(file: &'a VirtualFile) -> Self {
        Self::File(file)
    }
}
