//! Core type definitions for the in-memory filesystem

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// File type and permission bits, laid out like POSIX `st_mode`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileMode(pub u32);

impl FileMode {
    pub const TYPE_MASK: u32 = 0o170000;
    pub const DIR: u32 = 0o040000;
    pub const SYMLINK: u32 = 0o120000;
    pub const REGULAR: u32 = 0o100000;
    pub const PERM_MASK: u32 = 0o7777;

    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Directory mode with the given permission bits.
    pub fn dir(perm: u32) -> Self {
        Self(Self::DIR | (perm & Self::PERM_MASK))
    }

    /// Symlink mode with the given permission bits.
    pub fn symlink(perm: u32) -> Self {
        Self(Self::SYMLINK | (perm & Self::PERM_MASK))
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_dir(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::DIR
    }

    pub fn is_symlink(self) -> bool {
        self.0 & Self::TYPE_MASK == Self::SYMLINK
    }

    /// Regular file; bare permission bits with no type count as one.
    pub fn is_regular(self) -> bool {
        matches!(self.0 & Self::TYPE_MASK, 0 | Self::REGULAR)
    }

    pub fn perm(self) -> u32 {
        self.0 & Self::PERM_MASK
    }

    /// Keeps the permission bits and forces the directory type.
    pub fn as_dir(self) -> Self {
        Self::dir(self.perm())
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_dir() {
            'd'
        } else if self.is_symlink() {
            'L'
        } else {
            '-'
        };
        write!(f, "{}{:04o}", kind, self.perm())
    }
}

/// Open flags using the host's standard (Linux) bit values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenFlags(pub u32);

impl OpenFlags {
    pub const RDONLY: OpenFlags = OpenFlags(0);
    pub const WRONLY: OpenFlags = OpenFlags(0o1);
    pub const RDWR: OpenFlags = OpenFlags(0o2);
    pub const CREATE: OpenFlags = OpenFlags(0o100);
    pub const EXCL: OpenFlags = OpenFlags(0o200);
    pub const TRUNC: OpenFlags = OpenFlags(0o1000);
    pub const APPEND: OpenFlags = OpenFlags(0o2000);

    const ACCESS_MASK: u32 = 0o3;

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_create(self) -> bool {
        self.contains(Self::CREATE)
    }

    pub fn is_exclusive(self) -> bool {
        self.contains(Self::EXCL)
    }

    pub fn is_append(self) -> bool {
        self.contains(Self::APPEND)
    }

    pub fn is_truncate(self) -> bool {
        self.contains(Self::TRUNC)
    }

    /// Plain read-only: no other bits set at all.
    pub fn is_read_only(self) -> bool {
        self.0 == Self::RDONLY.0
    }

    pub fn is_write_only(self) -> bool {
        self.0 & Self::ACCESS_MASK == Self::WRONLY.0
    }

    /// Any set RDWR bit grants both directions, WRONLY alongside it included.
    pub fn is_read_write(self) -> bool {
        self.0 & Self::RDWR.0 != 0
    }

    pub fn can_read(self) -> bool {
        self.is_read_only() || self.is_read_write()
    }

    pub fn can_write(self) -> bool {
        self.is_write_only() || self.is_read_write()
    }
}

impl BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for OpenFlags {
    fn bitor_assign(&mut self, rhs: OpenFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for OpenFlags {
    type Output = OpenFlags;

    fn bitand(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 & rhs.0)
    }
}

/// File open options
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OpenOptions {
    pub read: bool,
    pub write: bool,
    pub create: bool,
    pub exclusive: bool,
    pub truncate: bool,
    pub append: bool,
}

impl OpenOptions {
    pub fn flags(&self) -> OpenFlags {
        let mut flags = match (self.read, self.write) {
            (_, false) => OpenFlags::RDONLY,
            (false, true) => OpenFlags::WRONLY,
            (true, true) => OpenFlags::RDWR,
        };
        if self.create {
            flags |= OpenFlags::CREATE;
        }
        if self.exclusive {
            flags |= OpenFlags::EXCL;
        }
        if self.truncate {
            flags |= OpenFlags::TRUNC;
        }
        if self.append {
            flags |= OpenFlags::APPEND;
        }
        flags
    }
}

impl From<&OpenOptions> for OpenFlags {
    fn from(opts: &OpenOptions) -> Self {
        opts.flags()
    }
}

/// Reference point for [`crate::File::seek`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Whence {
    Start,
    Current,
    End,
}

/// Metadata reported by `stat`, `lstat`, `read_dir` and handle `stat`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub mode: FileMode,
}

impl FileInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    pub fn is_symlink(&self) -> bool {
        self.mode.is_symlink()
    }
}

/// Capability bit set advertised by a filesystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capability(u32);

impl Capability {
    pub const WRITE: Capability = Capability(1 << 0);
    pub const READ: Capability = Capability(1 << 1);
    pub const READ_AND_WRITE: Capability = Capability(1 << 2);
    pub const SEEK: Capability = Capability(1 << 3);
    pub const TRUNCATE: Capability = Capability(1 << 4);
    pub const LOCK: Capability = Capability(1 << 5);

    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Capability) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capability {
    type Output = Capability;

    fn bitor(self, rhs: Capability) -> Capability {
        Capability(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_bits() {
        let dir = FileMode::dir(0o755);
        assert!(dir.is_dir());
        assert!(!dir.is_symlink());
        assert_eq!(dir.perm(), 0o755);

        let link = FileMode::symlink(0o777);
        assert!(link.is_symlink());
        assert!(!link.is_dir());
        assert!(!link.is_regular());

        let file = FileMode::new(0o644);
        assert!(file.is_regular());
        assert!(FileMode::new(FileMode::REGULAR | 0o600).is_regular());
        // fifo
        assert!(!FileMode::new(0o010000 | 0o644).is_regular());
        assert!(file.as_dir().is_dir());
        assert_eq!(file.as_dir().perm(), 0o644);
        assert_eq!(link.as_dir().perm(), 0o777);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(FileMode::dir(0o755).to_string(), "d0755");
        assert_eq!(FileMode::new(0o644).to_string(), "-0644");
    }

    #[test]
    fn test_access_modes() {
        assert!(OpenFlags::RDONLY.can_read());
        assert!(!OpenFlags::RDONLY.can_write());
        assert!(OpenFlags::WRONLY.can_write());
        assert!(!OpenFlags::WRONLY.can_read());
        assert!(OpenFlags::RDWR.can_read());
        assert!(OpenFlags::RDWR.can_write());

        // read-only means no other bits at all
        let append = OpenFlags::RDONLY | OpenFlags::APPEND;
        assert!(!append.can_read());

        let both = OpenFlags::WRONLY | OpenFlags::RDWR;
        assert!(both.is_read_write());
        assert!(!both.is_write_only());
        assert!(both.can_read());
        assert!(both.can_write());
    }

    #[test]
    fn test_open_options_to_flags() {
        let opts = OpenOptions {
            read: true,
            write: true,
            create: true,
            truncate: true,
            ..Default::default()
        };
        let flags = OpenFlags::from(&opts);
        assert!(flags.is_read_write());
        assert!(flags.is_create());
        assert!(flags.is_truncate());
        assert!(!flags.is_exclusive());
        assert!(!flags.is_append());

        let wo = OpenOptions {
            write: true,
            append: true,
            ..Default::default()
        };
        assert_eq!(wo.flags(), OpenFlags::WRONLY | OpenFlags::APPEND);
    }
}
