//! Reader, verifier and defragmenting writer for GGPK packed archives
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::missing_errors_doc)] // Error enums document their variants
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! A GGPK archive is a single file holding a tree of directories and files
//! as a flat sequence of length-prefixed records. Directory records point at
//! their children by absolute offset; deleting or replacing content leaves
//! holes that are chained into a free list.
//!
//! # Modules
//!
//! - **record**: Symmetric codec for the five record kinds
//! - **archive**: Scanner that walks an archive from its superblock
//! - **vfs**: In-memory virtual tree with lazy file content
//! - **integrity**: SHA-256 digests and tree verification
//! - **layout**: Two-pass planner that writes a fresh, compacted archive
//!
//! # Example
//!
//! ```no_run
//! use ggpk_formats::{VerifyMode, defragment, open_archive, verify};
//!
//! let root = open_archive("Content.ggpk")?;
//! let report = verify(&root, VerifyMode::CollectAll)?;
//! if report.is_ok() {
//!     defragment(&root, "Content.compact.ggpk")?;
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

/// Archive scanning from the superblock down
pub mod archive;
/// Content digests and tree verification
pub mod integrity;
/// Two-pass layout planning and archive writing
pub mod layout;
/// Binary record codec
pub mod record;
/// In-memory virtual file tree
pub mod vfs;

pub use archive::{Archive, ArchiveError, ArchiveResult, open_archive};
pub use integrity::{VerificationReport, VerifyError, VerifyMode, verify};
pub use layout::{LayoutError, LayoutResult, WriteSummary, defragment, write_archive};
pub use record::{Digest, RecordTag};
pub use vfs::{VirtualDirectory, VirtualFile, VirtualNode, from_local_dir};
