//! Content digests and verification
//!
//! File digests are SHA-256 over the raw content, computed once when the file
//! is first ingested. A directory digest is SHA-256 over the concatenation of
//! its files' digests followed by its subdirectories' recomputed digests,
//! both in name order.

use sha2::{Digest as _, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use crate::archive::ArchiveError;
use crate::record::{DIGEST_LEN, Digest};
use crate::vfs::{VirtualDirectory, VirtualFile, VirtualNode};

/// Recompute a directory digest from its children
///
/// Subdirectory digests come from their memoized recomputation, never from
/// stored values.
pub fn directory_digest(directory: &VirtualDirectory) -> Digest {
    let mut hasher = Sha256::new();
    for file in &directory.files {
        hasher.update(file.digest.as_bytes());
    }
    for child in &directory.children {
        hasher.update(child.computed_digest().as_bytes());
    }
    let result = hasher.finalize();
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&result);
    Digest::from_bytes(bytes)
}

/// A node whose content does not match its stored digest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("digest mismatch for {path}: expected {expected}, got {actual}")]
pub struct DigestMismatch {
    /// Virtual path of the offending node
    pub path: String,
    /// Stored digest
    pub expected: Digest,
    /// Digest recomputed from content
    pub actual: Digest,
}

/// Verification failures
#[derive(Debug, Error)]
pub enum VerifyError {
    /// A digest did not match (fail-fast mode only)
    #[error(transparent)]
    DigestMismatch(#[from] DigestMismatch),

    /// Content could not be read
    #[error("cannot read content: {0}")]
    Archive(#[from] ArchiveError),
}

/// Verification result type
pub type VerifyResult<T> = Result<T, VerifyError>;

/// How verification reacts to a mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Stop at the first mismatch
    FailFast,
    /// Check every node and report all mismatches
    #[default]
    CollectAll,
}

/// Outcome of verifying a subtree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Number of files whose content was hashed
    pub files_checked: usize,
    /// Number of directories checked
    pub directories_checked: usize,
    /// Every mismatch found, in visiting order
    pub mismatches: Vec<DigestMismatch>,
}

impl VerificationReport {
    /// Whether every checked node matched
    pub fn is_ok(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Verify a file or directory subtree
///
/// Files are re-hashed from their content. Directories verify their files and
/// subdirectories first, then compare their stored digest (when loaded from an
/// archive) with the recomputed one. A mismatch never stops sibling checks in
/// [`VerifyMode::CollectAll`]; read errors always abort.
pub fn verify<'a>(
    node: impl Into<VirtualNode<'a>>,
    mode: VerifyMode,
) -> VerifyResult<VerificationReport> {
    let mut verifier = Verifier {
        mode,
        report: VerificationReport::default(),
    };
    match node.into() {
        VirtualNode::File(file) => verifier.file(file)?,
        VirtualNode::Directory(directory) => verifier.directory(directory)?,
    }
    Ok(verifier.report)
}

/// Re-hash one file's content against its stored digest
pub fn verify_file(file: &VirtualFile) -> VerifyResult<()> {
    let actual = Digest::from_data(&file.content()?);
    if actual == file.digest {
        Ok(())
    } else {
        Err(DigestMismatch {
            path: file.path.clone(),
            expected: file.digest,
            actual,
        }
        .into())
    }
}

struct Verifier {
    mode: VerifyMode,
    report: VerificationReport,
}

impl Verifier {
    fn record(&mut self, mismatch: DigestMismatch) -> VerifyResult<()> {
        warn!(
            path = %mismatch.path,
            expected = %mismatch.expected,
            actual = %mismatch.actual,
            "digest mismatch"
        );
        match self.mode {
            VerifyMode::FailFast => Err(mismatch.into()),
            VerifyMode::CollectAll => {
                self.report.mismatches.push(mismatch);
                Ok(())
            }
        }
    }

    fn file(&mut self, file: &VirtualFile) -> VerifyResult<()> {
        self.report.files_checked += 1;
        match verify_file(file) {
            Ok(()) => {
                debug!(path = %file.path, "ok");
                Ok(())
            }
            Err(VerifyError::DigestMismatch(mismatch)) => self.record(mismatch),
            Err(err) => Err(err),
        }
    }

    fn directory(&mut self, directory: &VirtualDirectory) -> VerifyResult<()> {
        for file in &directory.files {
            self.file(file)?;
        }
        for child in &directory.children {
            self.directory(child)?;
        }

        self.report.directories_checked += 1;
        if let Some(expected) = directory.stored_digest() {
            let actual = directory.computed_digest();
            if actual != expected {
                return self.record(DigestMismatch {
                    path: directory.path.clone(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
