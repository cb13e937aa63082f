//! Whole-file documents loaded through a storage collaborator.

use alloc::{string::String, vec::Vec};
use core::fmt;

use log::{debug, warn};

use crate::layout::DisplayLine;

/// Minimal file API the viewer needs from the board's filesystem.
pub trait Storage {
    type Handle;
    type Error;

    fn open(&mut self, path: &str) -> Result<Self::Handle, Self::Error>;

    /// File size in bytes.
    fn size(&mut self, handle: &Self::Handle) -> usize;

    /// Reads up to `buf.len()` bytes from the start of the file.
    fn read(&mut self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize, Self::Error>;

    fn close(&mut self, handle: Self::Handle);
}

/// Reasons a document could not be loaded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadError {
    NotFound,
    Empty,
    Io,
    ShortRead { expected: usize, read: usize },
    OutOfMemory,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
            Self::Empty => f.write_str("file is empty"),
            Self::Io => f.write_str("read error"),
            Self::ShortRead { expected, read } => {
                write!(f, "short read {}/{}", read, expected)
            }
            Self::OutOfMemory => f.write_str("out of memory"),
        }
    }
}

/// Immutable file contents for one viewing session.
///
/// A `0` byte is kept after the contents so scanners can look one past the
/// end; it is never part of [`Document::as_bytes`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    bytes: Vec<u8>,
    path: String,
}

impl Document {
    /// Reads the whole file at `path`.
    ///
    /// Zero-length files and partial reads are load failures. The handle is
    /// always closed.
    pub fn load<S: Storage>(storage: &mut S, path: &str) -> Result<Self, LoadError> {
        let mut handle = storage.open(path).map_err(|_| LoadError::NotFound)?;
        let loaded = Self::read_all(storage, &mut handle, path);
        storage.close(handle);

        match &loaded {
            Ok(document) => debug!("document: loaded {} ({} bytes)", path, document.len()),
            Err(err) => warn!("document: load {} failed: {}", path, err),
        }
        loaded
    }

    /// Wraps bytes that are already in memory.
    pub fn from_bytes(path: &str, contents: &[u8]) -> Result<Self, LoadError> {
        let mut bytes = reserve(contents.len() + 1)?;
        bytes.extend_from_slice(contents);
        bytes.push(0);

        Ok(Self {
            bytes,
            path: copy_path(path)?,
        })
    }

    fn read_all<S: Storage>(
        storage: &mut S,
        handle: &mut S::Handle,
        path: &str,
    ) -> Result<Self, LoadError> {
        let size = storage.size(handle);
        if size == 0 {
            return Err(LoadError::Empty);
        }

        let mut bytes = reserve(size + 1)?;
        bytes.resize(size, 0);

        let read = storage
            .read(handle, &mut bytes[..size])
            .map_err(|_| LoadError::Io)?;
        if read != size {
            return Err(LoadError::ShortRead {
                expected: size,
                read,
            });
        }
        bytes.push(0);

        Ok(Self {
            bytes,
            path: copy_path(path)?,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Content length, terminator excluded.
    pub fn len(&self) -> usize {
        self.bytes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Bytes covered by a display line, empty when the view does not fit.
    pub fn line_bytes(&self, line: &DisplayLine) -> &[u8] {
        self.as_bytes().get(line.start..line.end()).unwrap_or(&[])
    }
}

fn reserve(len: usize) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| LoadError::OutOfMemory)?;
    Ok(bytes)
}

fn copy_path(path: &str) -> Result<String, LoadError> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(path.len())
        .map_err(|_| LoadError::OutOfMemory)?;
    owned.push_str(path);
    Ok(owned)
}
