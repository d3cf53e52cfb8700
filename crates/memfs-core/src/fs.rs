//! Filesystem and file-handle contracts

use crate::error::FsResult;
use crate::types::{Capability, FileInfo, FileMode, OpenFlags, Whence};

/// An open file.
pub trait File {
    fn name(&self) -> &str;
    /// Reads at the cursor and advances it. `Ok(0)` means end of data.
    fn read(&mut self, buf: &mut [u8]) -> FsResult<usize>;
    /// Reads at `offset` without touching the cursor.
    fn read_at(&self, buf: &mut [u8], offset: i64) -> FsResult<usize>;
    fn seek(&mut self, offset: i64, whence: Whence) -> FsResult<i64>;
    fn write(&mut self, buf: &[u8]) -> FsResult<usize>;
    /// Fails if the file was already closed.
    fn close(&mut self) -> FsResult<()>;
    fn truncate(&mut self, size: i64) -> FsResult<()>;
    fn stat(&self) -> FsResult<FileInfo>;
    fn lock(&mut self) -> FsResult<()>;
    fn unlock(&mut self) -> FsResult<()>;
}

/// The operations a filesystem exposes to its callers.
pub trait Filesystem {
    type File: File;

    /// Creates or truncates `filename` and opens it read-write.
    fn create(&mut self, filename: &str) -> FsResult<Self::File>;
    /// Opens `filename` read-only.
    fn open(&mut self, filename: &str) -> FsResult<Self::File>;
    fn open_file(
        &mut self,
        filename: &str,
        flags: OpenFlags,
        perm: FileMode,
    ) -> FsResult<Self::File>;
    /// Follows symlinks; the reported name is always the requested one.
    fn stat(&self, filename: &str) -> FsResult<FileInfo>;
    /// Like `stat` but describes a symlink itself.
    fn lstat(&self, filename: &str) -> FsResult<FileInfo>;
    /// Entries sorted by name.
    fn read_dir(&self, path: &str) -> FsResult<Vec<FileInfo>>;
    fn mkdir_all(&mut self, path: &str, perm: FileMode) -> FsResult<()>;
    fn rename(&mut self, from: &str, to: &str) -> FsResult<()>;
    fn remove(&mut self, filename: &str) -> FsResult<()>;
    fn join(&self, elems: &[&str]) -> String;
    fn symlink(&mut self, target: &str, link: &str) -> FsResult<()>;
    fn readlink(&self, link: &str) -> FsResult<String>;
    fn capabilities(&self) -> Capability;
}
