//! Shared origin stream
//!
//! Every virtual file loaded from one archive reads its content through the
//! same underlying handle. Content reads are seek-then-read pairs, so the
//! handle lives behind a mutex and each pair runs under a single lock
//! acquisition.

use parking_lot::Mutex;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// Object-safe `Read + Seek`
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Cheaply cloneable handle onto one seekable byte stream
#[derive(Clone)]
pub struct SharedStream {
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
}

impl SharedStream {
    /// Wrap a reader
    pub fn new<R: ReadSeek + 'static>(reader: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(reader))),
        }
    }

    /// Open a file for buffered reading
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }

    /// Run `f` with exclusive access to the stream
    pub fn with<T>(&self, f: impl FnOnce(&mut Box<dyn ReadSeek>) -> T) -> T {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Read exactly `len` bytes starting at `offset`
    pub fn read_at(&self, offset: u64, len: u64) -> io::Result<Vec<u8>> {
        self.with(|reader| {
            reader.seek(SeekFrom::Start(offset))?;
            let mut data = Vec::new();
            reader.by_ref().take(len).read_to_end(&mut data)?;
            if data.len() as u64 == len {
                Ok(data)
            } else {
                Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("wanted {len} bytes, stream ended after {}", data.len()),
                ))
            }
        })
    }

    /// Whether two handles share the same underlying stream
    pub fn same_stream(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SharedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStream")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
