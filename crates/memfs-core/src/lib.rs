//! memfs: an in-memory filesystem
//!
//! This crate provides a filesystem backed entirely by process memory: a
//! path-keyed node tree, shared byte buffers and cursor-bearing file handles,
//! behind the [`Filesystem`] and [`File`] contracts. Nothing is persisted.

pub mod config;
pub mod content;
pub mod error;
pub mod fs;
pub mod handle;
pub mod memory;
pub mod node;
pub mod path;
pub mod storage;
pub mod types;
pub mod util;

// Re-export key types for convenience
pub use config::FsConfig;
pub use content::{Content, ReadAt, SharedContent};
pub use error::{ErrorKind, FsError, FsResult};
pub use fs::{File, Filesystem};
pub use handle::MemFile;
pub use memory::MemoryFs;
pub use node::Node;
pub use storage::{MemoryStorage, Storage};
pub use types::*;
