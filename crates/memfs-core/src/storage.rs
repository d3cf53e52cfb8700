//! Path-keyed node storage
//!
//! Nodes live in a flat map keyed by normalized absolute path. A second map
//! indexes the names of each directory's direct children; it owns nothing and
//! is kept in step with the path map by every mutation below.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace};

use crate::error::{FsError, FsResult};
use crate::node::Node;
use crate::path::{self, ROOT};
use crate::types::{FileMode, OpenFlags};

/// Storage backend trait for the node tree
pub trait Storage {
    fn has(&self, path: &str) -> bool;
    fn get(&self, path: &str) -> Option<&Node>;
    /// Creates a node, materializing missing parent directories. Creating an
    /// existing directory returns it unchanged.
    fn new(&mut self, path: &str, mode: FileMode, flags: OpenFlags) -> FsResult<&Node>;
    /// Direct children of `path`, in no particular order.
    fn children(&self, path: &str) -> Vec<&Node>;
    /// Moves `from` and everything below it to `to`.
    fn rename(&mut self, from: &str, to: &str) -> FsResult<()>;
    fn remove(&mut self, path: &str) -> FsResult<()>;
}

/// In-memory storage implementation
#[derive(Debug)]
pub struct MemoryStorage {
    files: HashMap<String, Node>,
    children: HashMap<String, BTreeSet<String>>,
    rename_parent_perm: u32,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_rename_parent_perm(0o644)
    }

    pub fn with_rename_parent_perm(rename_parent_perm: u32) -> Self {
        let mut files = HashMap::new();
        files.insert(
            ROOT.to_string(),
            Node::new(ROOT, FileMode::dir(0o755), OpenFlags::RDONLY),
        );
        Self {
            files,
            children: HashMap::new(),
            rename_parent_perm,
        }
    }

    /// Lookup for call sites that already proved the path exists.
    pub fn must_get(&self, path: &str) -> FsResult<&Node> {
        let path = path::normalize(path);
        self.files
            .get(&path)
            .ok_or_else(|| FsError::Internal(format!("couldn't find {path:?}")))
    }

    /// Number of nodes, the root included.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn has_children(&self, path: &str) -> bool {
        self.children.get(path).is_some_and(|kids| !kids.is_empty())
    }

    /// Fails if an existing ancestor of `path` is not a directory. Stops at
    /// the first directory found; everything above it exists already.
    fn check_ancestors(&self, path: &str) -> FsResult<()> {
        let mut current = path.to_string();
        while current != ROOT {
            current = path::dir(&current);
            if let Some(node) = self.files.get(&current) {
                if !node.is_dir() {
                    return Err(FsError::AlreadyExists(current));
                }
                break;
            }
        }
        Ok(())
    }

    /// Creates every missing ancestor directory of `path`, top-down.
    fn materialize_parents(&mut self, path: &str, mode: FileMode) -> FsResult<()> {
        self.check_ancestors(path)?;

        let mut missing = Vec::new();
        let mut current = path.to_string();
        while current != ROOT {
            current = path::dir(&current);
            if self.files.contains_key(&current) {
                break;
            }
            missing.push(current.clone());
        }

        for dir in missing.into_iter().rev() {
            trace!(path = %dir, "materializing parent directory");
            let node = Node::new(path::base(&dir), mode.as_dir(), OpenFlags::RDONLY);
            self.files.insert(dir.clone(), node);
            self.link(&dir);
        }
        Ok(())
    }

    fn link(&mut self, path: &str) {
        if path == ROOT {
            return;
        }
        self.children
            .entry(path::dir(path))
            .or_default()
            .insert(path::base(path));
    }

    fn unlink(&mut self, path: &str) {
        let parent = path::dir(path);
        if let Some(kids) = self.children.get_mut(&parent) {
            kids.remove(&path::base(path));
            if kids.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    fn move_node(&mut self, from: &str, to: &str) -> FsResult<()> {
        self.materialize_parents(to, FileMode::dir(self.rename_parent_perm))?;

        let mut node = self
            .files
            .remove(from)
            .ok_or_else(|| FsError::Internal(format!("couldn't find {from:?}")))?;
        node.set_name(path::base(to));
        self.unlink(from);

        if let Some(kids) = self.children.remove(from) {
            self.children.insert(to.to_string(), kids);
        }
        self.files.insert(to.to_string(), node);
        self.link(to);

        trace!(from = %from, to = %to, "moved node");
        Ok(())
    }

    /// Drops whatever sits at `path` so a rename can take its place.
    fn evict(&mut self, path: &str) -> FsResult<()> {
        if self.has_children(path) {
            return Err(FsError::DirectoryNotEmpty(path.to_string()));
        }
        self.files.remove(path);
        self.children.remove(path);
        self.unlink(path);
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn has(&self, path: &str) -> bool {
        self.files.contains_key(&path::normalize(path))
    }

    fn get(&self, path: &str) -> Option<&Node> {
        self.files.get(&path::normalize(path))
    }

    fn new(&mut self, path: &str, mode: FileMode, flags: OpenFlags) -> FsResult<&Node> {
        let path = path::normalize(path);

        match self.files.get(&path).map(Node::is_dir) {
            Some(true) => return self.must_get(&path),
            Some(false) => return Err(FsError::AlreadyExists(path)),
            None => {}
        }

        self.materialize_parents(&path, mode)?;

        let node = Node::new(path::base(&path), mode, flags);
        self.files.insert(path.clone(), node);
        self.link(&path);
        debug!(path = %path, mode = %mode, "created node");

        self.must_get(&path)
    }

    fn children(&self, path: &str) -> Vec<&Node> {
        let path = path::normalize(path);
        let Some(names) = self.children.get(&path) else {
            return Vec::new();
        };
        names
            .iter()
            .filter_map(|name| self.files.get(&path::join(&[path.as_str(), name.as_str()])))
            .collect()
    }

    fn rename(&mut self, from: &str, to: &str) -> FsResult<()> {
        let from = path::normalize(from);
        let to = path::normalize(to);

        if !self.files.contains_key(&from) {
            return Err(FsError::NotFound(from));
        }
        if from == to {
            return Ok(());
        }
        if from == ROOT {
            return Err(FsError::InvalidArgument("cannot rename the root".to_string()));
        }
        if path::has_prefix(&to, &from) {
            return Err(FsError::InvalidArgument(format!(
                "cannot move {from:?} into its own subtree {to:?}"
            )));
        }

        self.check_ancestors(&to)?;
        if self.files.contains_key(&to) {
            self.evict(&to)?;
        }

        let mut moves: Vec<(String, String)> = self
            .files
            .keys()
            .filter_map(|old| path::rebase(old, &from, &to).map(|new| (old.clone(), new)))
            .collect();
        moves.sort_by(|a, b| {
            path::depth(&a.0)
                .cmp(&path::depth(&b.0))
                .then_with(|| a.0.cmp(&b.0))
        });

        // Not transactional: a failure leaves earlier moves in place.
        for (old, new) in &moves {
            self.move_node(old, new)?;
        }

        debug!(from = %from, to = %to, moved = moves.len(), "renamed");
        Ok(())
    }

    fn remove(&mut self, path: &str) -> FsResult<()> {
        let path = path::normalize(path);

        let node = self
            .files
            .get(&path)
            .ok_or_else(|| FsError::NotFound(path.clone()))?;
        if path == ROOT {
            return Err(FsError::InvalidArgument("cannot remove the root".to_string()));
        }
        if node.is_dir() && self.has_children(&path) {
            return Err(FsError::DirectoryNotEmpty(path));
        }

        self.files.remove(&path);
        self.children.remove(&path);
        self.unlink(&path);
        debug!(path = %path, "removed node");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_mode() -> FileMode {
        FileMode::new(0o644)
    }

    #[test]
    fn test_root_exists() {
        let storage = MemoryStorage::new();
        assert!(storage.has("/"));
        assert!(storage.get("/").unwrap().is_dir());
        assert!(storage.children("/").is_empty());
    }

    #[test]
    fn test_new_materializes_parents() {
        let mut storage = MemoryStorage::new();
        storage.new("/a/b/c", file_mode(), OpenFlags::RDWR).unwrap();

        for dir in ["/a", "/a/b"] {
            let node = storage.get(dir).unwrap();
            assert!(node.is_dir(), "{dir} should be a directory");
            assert_eq!(node.mode().perm(), 0o644);
            assert_eq!(node.flags(), OpenFlags::RDONLY);
        }
        assert!(!storage.get("/a/b/c").unwrap().is_dir());
        assert_eq!(storage.children("/a/b").len(), 1);
        assert_eq!(storage.children("/").len(), 1);
    }

    #[test]
    fn test_normalized_lookup() {
        let mut storage = MemoryStorage::new();
        storage.new("/a/b", file_mode(), OpenFlags::RDWR).unwrap();

        let canonical = storage.get("/a/b").unwrap().content().clone();
        for spelling in ["/a/./b/", "//a//b", "/a/x/../b", "a/b"] {
            let node = storage.get(spelling).unwrap();
            assert!(node.content().ptr_eq(&canonical), "{spelling}");
        }
    }

    #[test]
    fn test_new_existing() {
        let mut storage = MemoryStorage::new();
        storage.new("/f", file_mode(), OpenFlags::RDWR).unwrap();
        assert!(matches!(
            storage.new("/f", file_mode(), OpenFlags::RDWR),
            Err(FsError::AlreadyExists(_))
        ));

        storage.new("/d", FileMode::dir(0o755), OpenFlags::RDONLY).unwrap();
        let again = storage.new("/d", FileMode::dir(0o700), OpenFlags::RDONLY).unwrap();
        assert!(again.is_dir());
        assert_eq!(again.mode().perm(), 0o755);
    }

    #[test]
    fn test_new_under_file_fails_cleanly() {
        let mut storage = MemoryStorage::new();
        storage.new("/f", file_mode(), OpenFlags::RDWR).unwrap();
        let before = storage.len();

        let err = storage.new("/f/x/y", file_mode(), OpenFlags::RDWR).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(ref p) if p == "/f"));
        assert_eq!(storage.len(), before);
        assert!(!storage.has("/f/x"));
    }

    #[test]
    fn test_children_of_missing_path() {
        let storage = MemoryStorage::new();
        assert!(storage.children("/nope").is_empty());
    }

    #[test]
    fn test_must_get_missing_is_internal() {
        let storage = MemoryStorage::new();
        let err = storage.must_get("/missing").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InternalInvariantViolation);
    }

    #[test]
    fn test_rename_moves_subtree() {
        let mut storage = MemoryStorage::new();
        storage.new("/a", FileMode::dir(0o755), OpenFlags::RDONLY).unwrap();
        storage.new("/a/x", file_mode(), OpenFlags::RDWR).unwrap();
        storage.new("/a/y/z", file_mode(), OpenFlags::RDWR).unwrap();

        storage.rename("/a", "/b").unwrap();

        for gone in ["/a", "/a/x", "/a/y", "/a/y/z"] {
            assert!(!storage.has(gone), "{gone} should be gone");
        }
        for present in ["/b", "/b/x", "/b/y", "/b/y/z"] {
            assert!(storage.has(present), "{present} should exist");
        }
        assert_eq!(storage.get("/b/y/z").unwrap().name(), "z");
        assert_eq!(storage.get("/b").unwrap().name(), "b");

        let mut names: Vec<_> = storage
            .children("/b")
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["x", "y"]);
        assert!(storage.children("/a").is_empty());

        let root: Vec<_> = storage.children("/").iter().map(|n| n.name().to_string()).collect();
        assert_eq!(root, vec!["b"]);
    }

    #[test]
    fn test_rename_keeps_content_and_materializes_parent() {
        let mut storage = MemoryStorage::new();
        let content = storage
            .new("/src/file", file_mode(), OpenFlags::RDWR)
            .unwrap()
            .content()
            .clone();

        storage.rename("/src/file", "/dst/deep/file2").unwrap();

        let moved = storage.get("/dst/deep/file2").unwrap();
        assert_eq!(moved.name(), "file2");
        assert!(moved.content().ptr_eq(&content));
        assert_eq!(content.lock().name(), "file2");

        let parent = storage.get("/dst/deep").unwrap();
        assert!(parent.is_dir());
        assert_eq!(parent.mode().perm(), 0o644);
        assert!(storage.children("/src").is_empty());
    }

    #[test]
    fn test_rename_prefix_is_component_wise() {
        let mut storage = MemoryStorage::new();
        storage.new("/a", file_mode(), OpenFlags::RDWR).unwrap();
        storage.new("/ab", file_mode(), OpenFlags::RDWR).unwrap();

        storage.rename("/a", "/c").unwrap();
        assert!(storage.has("/ab"));
        assert!(storage.has("/c"));
        assert!(!storage.has("/a"));
    }

    #[test]
    fn test_rename_errors() {
        let mut storage = MemoryStorage::new();
        assert!(matches!(
            storage.rename("/missing", "/x"),
            Err(FsError::NotFound(_))
        ));

        storage.new("/d/f", file_mode(), OpenFlags::RDWR).unwrap();
        assert!(matches!(
            storage.rename("/d", "/d/sub"),
            Err(FsError::InvalidArgument(_))
        ));

        storage.new("/busy/child", file_mode(), OpenFlags::RDWR).unwrap();
        assert!(matches!(
            storage.rename("/d", "/busy"),
            Err(FsError::DirectoryNotEmpty(_))
        ));

        storage.new("/file", file_mode(), OpenFlags::RDWR).unwrap();
        assert!(matches!(
            storage.rename("/d/f", "/file/below"),
            Err(FsError::AlreadyExists(_))
        ));
        assert!(storage.has("/d/f"));
    }

    #[test]
    fn test_rename_over_file_replaces_it() {
        let mut storage = MemoryStorage::new();
        let src = storage
            .new("/a", file_mode(), OpenFlags::RDWR)
            .unwrap()
            .content()
            .clone();
        storage.new("/b", file_mode(), OpenFlags::RDWR).unwrap();

        storage.rename("/a", "/b").unwrap();
        assert!(storage.get("/b").unwrap().content().ptr_eq(&src));
        assert_eq!(storage.children("/").len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut storage = MemoryStorage::new();
        storage.new("/d", FileMode::dir(0o755), OpenFlags::RDONLY).unwrap();
        storage.new("/d/f", file_mode(), OpenFlags::RDWR).unwrap();

        assert!(matches!(
            storage.remove("/d"),
            Err(FsError::DirectoryNotEmpty(_))
        ));
        storage.remove("/d/f").unwrap();
        storage.remove("/d").unwrap();
        assert!(!storage.has("/d"));
        assert!(storage.children("/").is_empty());

        assert!(matches!(storage.remove("/d"), Err(FsError::NotFound(_))));
        assert!(storage.remove("/").is_err());
    }
}
