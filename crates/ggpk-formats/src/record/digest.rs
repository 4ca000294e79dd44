//! SHA-256 content digests

use binrw::{BinRead, BinWrite};
use sha2::{Digest as _, Sha256};
use std::fmt;

use crate::record::error::{RecordError, RecordResult};

/// Size of every digest stored in the archive
pub const DIGEST_LEN: usize = 32;

/// SHA-256 digest identifying file content or a directory subtree
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Create digest from raw bytes
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Create digest from a slice, rejecting anything that is not 32 bytes
    pub fn from_slice(bytes: &[u8]) -> RecordResult<Self> {
        let array: [u8; DIGEST_LEN] = bytes
            .try_into()
            .map_err(|_| RecordError::InvalidDigestLength(bytes.len()))?;
        Ok(Self(array))
    }

    /// Compute the digest of `data`
    pub fn from_data(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        let result = hasher.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Compute the digest of everything `reader` yields
    pub fn from_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut hasher = Sha256::new();
        std::io::copy(reader, &mut hasher)?;
        let result = hasher.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&result);
        Ok(Self(bytes))
    }

    /// Parse digest from hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
