//! In-memory filesystem
//!
//! [`MemoryFs`] orchestrates the storage tree: it looks nodes up, follows
//! symlinks lazily at use time and hands out [`MemFile`] handles that share
//! the node's content buffer.

use tracing::{debug, trace};

use crate::config::FsConfig;
use crate::error::{FsError, FsResult};
use crate::fs::Filesystem;
use crate::handle::MemFile;
use crate::node::Node;
use crate::path;
use crate::storage::{MemoryStorage, Storage};
use crate::types::{Capability, FileInfo, FileMode, OpenFlags};
use crate::util;

/// The main filesystem implementation
#[derive(Debug)]
pub struct MemoryFs {
    config: FsConfig,
    storage: MemoryStorage,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::with_config(FsConfig::default())
    }

    pub fn with_config(config: FsConfig) -> Self {
        Self {
            storage: MemoryStorage::with_rename_parent_perm(config.rename_parent_perm),
            config,
        }
    }

    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    /// Where a symlink at `fullpath` points, or `None` when `node` is not a
    /// link. Relative targets are taken from the link's own directory.
    pub fn resolve_link(&self, fullpath: &str, node: &Node) -> Option<String> {
        if !node.is_symlink() {
            return None;
        }

        let target = node.content().to_string_lossy();
        if path::is_abs(&target) {
            return Some(target);
        }
        let dir = path::dir(&path::normalize(fullpath));
        Some(path::join(&[dir.as_str(), target.as_str()]))
    }

    fn follow(&self, link: &str, target: &str, hops: u32) -> FsResult<()> {
        if hops >= self.config.max_symlink_hops {
            return Err(FsError::TooManySymlinks(path::normalize(link)));
        }
        trace!(link = %link, target = %target, hops, "following symlink");
        Ok(())
    }

    fn open_file_at(
        &mut self,
        filename: &str,
        flags: OpenFlags,
        perm: FileMode,
        hops: u32,
    ) -> FsResult<MemFile> {
        let node = match self.storage.get(filename) {
            None => {
                if !flags.is_create() {
                    return Err(FsError::NotFound(path::normalize(filename)));
                }
                self.storage.new(filename, perm, flags)?.clone()
            }
            Some(node) => {
                if flags.is_exclusive() {
                    return Err(FsError::AlreadyExists(path::normalize(filename)));
                }
                if let Some(target) = self.resolve_link(filename, node) {
                    self.follow(filename, &target, hops)?;
                    return self.open_file_at(&target, flags, perm, hops + 1);
                }
                node.clone()
            }
        };

        if node.is_dir() {
            return Err(FsError::IsADirectory(path::normalize(filename)));
        }

        Ok(node.duplicate(filename, perm, flags))
    }

    fn stat_at(&self, filename: &str, hops: u32) -> FsResult<FileInfo> {
        let node = self
            .storage
            .get(filename)
            .ok_or_else(|| FsError::NotFound(path::normalize(filename)))?;

        let mut info = match self.resolve_link(filename, node) {
            Some(target) => {
                self.follow(filename, &target, hops)?;
                self.stat_at(&target, hops + 1)?
            }
            None => node.stat(),
        };

        // A link reports its own name with its target's metadata
        info.name = path::base(&path::normalize(filename));
        Ok(info)
    }

    fn read_dir_at(&self, dir: &str, hops: u32) -> FsResult<Vec<FileInfo>> {
        if let Some(node) = self.storage.get(dir) {
            if let Some(target) = self.resolve_link(dir, node) {
                self.follow(dir, &target, hops)?;
                return self.read_dir_at(&target, hops + 1);
            }
        }

        let mut entries: Vec<FileInfo> = self
            .storage
            .children(dir)
            .into_iter()
            .map(Node::stat)
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

impl Default for MemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFs {
    type File = MemFile;

    fn create(&mut self, filename: &str) -> FsResult<MemFile> {
        let perm = FileMode::new(self.config.create_perm);
        self.open_file(
            filename,
            OpenFlags::RDWR | OpenFlags::CREATE | OpenFlags::TRUNC,
            perm,
        )
    }

    fn open(&mut self, filename: &str) -> FsResult<MemFile> {
        self.open_file(filename, OpenFlags::RDONLY, FileMode::new(0))
    }

    fn open_file(
        &mut self,
        filename: &str,
        flags: OpenFlags,
        perm: FileMode,
    ) -> FsResult<MemFile> {
        self.open_file_at(filename, flags, perm, 0)
    }

    fn stat(&self, filename: &str) -> FsResult<FileInfo> {
        self.stat_at(filename, 0)
    }

    fn lstat(&self, filename: &str) -> FsResult<FileInfo> {
        self.storage
            .get(filename)
            .map(Node::stat)
            .ok_or_else(|| FsError::NotFound(path::normalize(filename)))
    }

    fn read_dir(&self, dir: &str) -> FsResult<Vec<FileInfo>> {
        self.read_dir_at(dir, 0)
    }

    fn mkdir_all(&mut self, dir: &str, perm: FileMode) -> FsResult<()> {
        self.storage.new(dir, FileMode::dir(perm.perm()), OpenFlags::RDONLY)?;
        Ok(())
    }

    fn rename(&mut self, from: &str, to: &str) -> FsResult<()> {
        self.storage.rename(from, to)
    }

    fn remove(&mut self, filename: &str) -> FsResult<()> {
        self.storage.remove(filename)
    }

    fn join(&self, elems: &[&str]) -> String {
        path::join(elems)
    }

    fn symlink(&mut self, target: &str, link: &str) -> FsResult<()> {
        match self.stat(link) {
            Ok(_) => return Err(FsError::AlreadyExists(path::normalize(link))),
            Err(err) if err.is_not_found() => {}
            Err(err) => return Err(err),
        }
        // A dangling link stats as missing but still occupies the path
        if self.storage.has(link) {
            return Err(FsError::AlreadyExists(path::normalize(link)));
        }

        let perm = FileMode::symlink(self.config.symlink_perm);
        util::write_file(self, link, target.as_bytes(), perm)?;
        debug!(link = %link, target = %target, "created symlink");
        Ok(())
    }

    fn readlink(&self, link: &str) -> FsResult<String> {
        let node = self
            .storage
            .get(link)
            .ok_or_else(|| FsError::NotFound(path::normalize(link)))?;
        if !node.is_symlink() {
            return Err(FsError::NotASymlink(path::normalize(link)));
        }
        Ok(node.content().to_string_lossy())
    }

    fn capabilities(&self) -> Capability {
        Capability::WRITE
            | Capability::READ
            | Capability::READ_AND_WRITE
            | Capability::SEEK
            | Capability::TRUNCATE
    }
}
