//! Open file handles
//!
//! A [`MemFile`] is one open view over a node's content: its own cursor,
//! flags and closed state, with the byte buffer shared by reference. Writes
//! through one handle are visible to every other handle on the same node.

use std::io;

use crate::content::SharedContent;
use crate::error::{FsError, FsResult};
use crate::fs::File;
use crate::types::{FileInfo, FileMode, OpenFlags, Whence};

#[derive(Debug)]
pub struct MemFile {
    name: String,
    content: SharedContent,
    position: i64,
    flags: OpenFlags,
    mode: FileMode,
    closed: bool,
}

impl MemFile {
    /// Templates a handle over `content`. Create together with truncate
    /// empties the buffer, then append starts the cursor at its end.
    pub(crate) fn open(
        name: &str,
        content: SharedContent,
        mode: FileMode,
        flags: OpenFlags,
    ) -> Self {
        let mut position = 0;
        {
            let mut buf = content.lock();
            if flags.is_create() && flags.is_truncate() {
                buf.clear();
            }
            if flags.is_append() {
                position = buf.len() as i64;
            }
        }

        Self {
            name: name.to_string(),
            content,
            position,
            flags,
            mode,
            closed: false,
        }
    }

    /// A new, independent handle over the same content.
    pub fn duplicate(&self, name: &str, mode: FileMode, flags: OpenFlags) -> MemFile {
        MemFile::open(name, self.content.clone(), mode, flags)
    }

    pub fn content(&self) -> &SharedContent {
        &self.content
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> FsResult<()> {
        if self.closed {
            return Err(FsError::Closed(self.name.clone()));
        }
        Ok(())
    }
}

impl File for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&mut self, buf: &mut [u8]) -> FsResult<usize> {
        let n = self.read_at(buf, self.position)?;
        self.position += n as i64;
        Ok(n)
    }

    fn read_at(&self, buf: &mut [u8], offset: i64) -> FsResult<usize> {
        self.ensure_open()?;
        if !self.flags.can_read() {
            return Err(FsError::ReadNotSupported);
        }

        let read = self.content.lock().read_at(buf, offset)?;
        Ok(read.bytes)
    }

    fn seek(&mut self, offset: i64, whence: Whence) -> FsResult<i64> {
        self.ensure_open()?;

        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.position,
            Whence::End => self.content.len() as i64,
        };
        let position = base
            .checked_add(offset)
            .ok_or_else(|| FsError::InvalidArgument(format!("seek offset {offset} overflows")))?;
        if position < 0 {
            return Err(FsError::NegativeOffset(position));
        }

        self.position = position;
        Ok(position)
    }

    fn write(&mut self, buf: &[u8]) -> FsResult<usize> {
        self.ensure_open()?;
        if !self.flags.can_write() {
            return Err(FsError::WriteNotSupported);
        }

        let n = self.content.lock().write_at(buf, self.position)?;
        self.position += n as i64;
        Ok(n)
    }

    fn close(&mut self) -> FsResult<()> {
        self.ensure_open()?;
        self.closed = true;
        Ok(())
    }

    fn truncate(&mut self, size: i64) -> FsResult<()> {
        self.ensure_open()?;
        self.content.lock().truncate(size)
    }

    fn stat(&self) -> FsResult<FileInfo> {
        Ok(FileInfo {
            name: self.name.clone(),
            size: self.content.len() as u64,
            mode: self.mode,
        })
    }

    fn lock(&mut self) -> FsResult<()> {
        Ok(())
    }

    fn unlock(&mut self) -> FsResult<()> {
        Ok(())
    }
}

impl io::Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(File::read(self, buf)?)
    }
}

impl io::Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(File::write(self, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.ensure_open()?;
        Ok(())
    }
}

impl io::Seek for MemFile {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(n) => {
                let n = i64::try_from(n).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
                })?;
                (n, Whence::Start)
            }
            io::SeekFrom::Current(n) => (n, Whence::Current),
            io::SeekFrom::End(n) => (n, Whence::End),
        };
        let position = File::seek(self, offset, whence)?;
        Ok(position as u64)
    }
}
