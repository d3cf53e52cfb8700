//! Tree entries

use crate::content::SharedContent;
use crate::handle::MemFile;
use crate::types::{FileInfo, FileMode, OpenFlags};

/// Filesystem node: a file, directory or symlink stored in the tree.
///
/// The content buffer is shared by reference with every handle opened on the
/// node. For symlinks it holds the UTF-8 target text.
#[derive(Clone, Debug)]
pub struct Node {
    name: String,
    mode: FileMode,
    flags: OpenFlags,
    content: SharedContent,
}

impl Node {
    pub fn new(name: impl Into<String>, mode: FileMode, flags: OpenFlags) -> Self {
        let name = name.into();
        Self {
            content: SharedContent::new(name.clone()),
            name,
            mode,
            flags,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the node and the content it shares with open handles.
    pub(crate) fn set_name(&mut self, name: String) {
        self.content.lock().set_name(name.as_str());
        self.name = name;
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Flags the node was created with.
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    pub fn content(&self) -> &SharedContent {
        &self.content
    }

    pub fn is_dir(&self) -> bool {
        self.mode.is_dir()
    }

    pub fn is_symlink(&self) -> bool {
        self.mode.is_symlink()
    }

    pub fn stat(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            size: self.content.len() as u64,
            mode: self.mode,
        }
    }

    /// Opens a new handle over this node's content.
    pub fn duplicate(&self, name: &str, mode: FileMode, flags: OpenFlags) -> MemFile {
        MemFile::open(name, self.content.clone(), mode, flags)
    }
}
