//! Byte buffers backing regular files and symlink targets

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{FsError, FsResult};

/// Result of a positional read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadAt {
    /// Bytes copied into the destination.
    pub bytes: usize,
    /// The end of the data was reached at or before the end of the destination.
    pub end_of_stream: bool,
}

/// Resizable byte sequence; its length is the file size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Content {
    name: String,
    bytes: Vec<u8>,
}

impl Content {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn read_at(&self, dst: &mut [u8], offset: i64) -> FsResult<ReadAt> {
        if offset < 0 {
            return Err(FsError::NegativeOffset(offset));
        }

        let len = self.bytes.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= len {
            return Ok(ReadAt {
                bytes: 0,
                end_of_stream: true,
            });
        }

        let available = len - start;
        let n = dst.len().min(available);
        dst[..n].copy_from_slice(&self.bytes[start..start + n]);
        Ok(ReadAt {
            bytes: n,
            end_of_stream: n == available,
        })
    }

    pub fn write_at(&mut self, src: &[u8], offset: i64) -> FsResult<usize> {
        if offset < 0 {
            return Err(FsError::NegativeOffset(offset));
        }

        let start = usize::try_from(offset)
            .map_err(|_| FsError::InvalidArgument(format!("offset {offset} out of range")))?;
        let end = start
            .checked_add(src.len())
            .ok_or_else(|| FsError::InvalidArgument(format!("offset {offset} out of range")))?;

        // Sparse writes zero-fill the gap
        if end > self.bytes.len() {
            self.resize(end)?;
        }

        self.bytes[start..end].copy_from_slice(src);
        Ok(src.len())
    }

    pub fn truncate(&mut self, size: i64) -> FsResult<()> {
        if size < 0 {
            return Err(FsError::InvalidArgument(format!(
                "{}: negative truncate size {size}",
                self.name
            )));
        }
        let size = usize::try_from(size)
            .map_err(|_| FsError::InvalidArgument(format!("truncate size {size} out of range")))?;
        self.resize(size)
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Grows with zeros or shrinks to `size`. Growth is reserved first; a
    /// failed reservation is `NoSpace`.
    fn resize(&mut self, size: usize) -> FsResult<()> {
        if let Some(extra) = size.checked_sub(self.bytes.len()) {
            self.bytes.try_reserve(extra).map_err(|err| {
                FsError::NoSpace(format!("{}: cannot grow to {size} bytes: {err}", self.name))
            })?;
        }
        self.bytes.resize(size, 0);
        Ok(())
    }
}

/// Reference-counted content shared by a node and every handle opened on it.
#[derive(Clone, Debug, Default)]
pub struct SharedContent(Arc<Mutex<Content>>);

impl SharedContent {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(Content::new(name))))
    }

    /// A poisoned lock only means a panic happened mid-operation elsewhere;
    /// the buffer itself is always a valid byte vector.
    pub fn lock(&self) -> MutexGuard<'_, Content> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The stored bytes interpreted as text (symlink targets).
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(self.lock().as_bytes()).into_owned()
    }

    pub fn ptr_eq(&self, other: &SharedContent) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
