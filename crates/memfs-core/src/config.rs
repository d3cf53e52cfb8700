//! Configuration types for the in-memory filesystem

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FsResult;

/// Main filesystem configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Symlinks followed by a single open/stat/read_dir call before giving up.
    pub max_symlink_hops: u32,
    /// Permission bits of parent directories materialized by a rename.
    pub rename_parent_perm: u32,
    /// Permission bits used by `create`.
    pub create_perm: u32,
    /// Permission bits stored on new symlinks.
    pub symlink_perm: u32,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            max_symlink_hops: 40,
            rename_parent_perm: 0o644,
            create_perm: 0o666,
            symlink_perm: 0o777,
        }
    }
}

impl FsConfig {
    pub fn from_json_str(json: &str) -> FsResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> FsResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
