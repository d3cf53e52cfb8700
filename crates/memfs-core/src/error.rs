//! Error types for the in-memory filesystem

use std::io;

/// Coarse classification of [`FsError`] values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    NotASymlink,
    DirectoryNotEmpty,
    InvalidOperation,
    NoSpace,
    UseAfterClose,
    TooManySymlinks,
    InternalInvariantViolation,
    Io,
    Config,
}

/// Core filesystem error type
#[derive(thiserror::Error, Debug)]
pub enum FsError {
    #[error("file does not exist: {0}")]
    NotFound(String),
    #[error("file already exists: {0}")]
    AlreadyExists(String),
    #[error("not a symlink: {0}")]
    NotASymlink(String),
    #[error("directory not empty: {0}")]
    DirectoryNotEmpty(String),
    #[error("cannot open a directory: {0}")]
    IsADirectory(String),
    #[error("read not supported")]
    ReadNotSupported,
    #[error("write not supported")]
    WriteNotSupported,
    #[error("negative offset: {0}")]
    NegativeOffset(i64),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no space left: {0}")]
    NoSpace(String),
    #[error("file already closed: {0}")]
    Closed(String),
    #[error("too many levels of symbolic links: {0}")]
    TooManySymlinks(String),
    #[error("internal invariant violated: {0}")]
    Internal(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl FsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FsError::NotFound(_) => ErrorKind::NotFound,
            FsError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            FsError::NotASymlink(_) => ErrorKind::NotASymlink,
            FsError::DirectoryNotEmpty(_) => ErrorKind::DirectoryNotEmpty,
            FsError::IsADirectory(_)
            | FsError::ReadNotSupported
            | FsError::WriteNotSupported
            | FsError::NegativeOffset(_)
            | FsError::InvalidArgument(_) => ErrorKind::InvalidOperation,
            FsError::NoSpace(_) => ErrorKind::NoSpace,
            FsError::Closed(_) => ErrorKind::UseAfterClose,
            FsError::TooManySymlinks(_) => ErrorKind::TooManySymlinks,
            FsError::Internal(_) => ErrorKind::InternalInvariantViolation,
            FsError::Io(_) => ErrorKind::Io,
            FsError::Config(_) => ErrorKind::Config,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match &err {
            FsError::Io(inner) => return io::Error::new(inner.kind(), err.to_string()),
            FsError::NotFound(_) => io::ErrorKind::NotFound,
            FsError::AlreadyExists(_) => io::ErrorKind::AlreadyExists,
            FsError::ReadNotSupported | FsError::WriteNotSupported => {
                io::ErrorKind::PermissionDenied
            }
            FsError::NegativeOffset(_)
            | FsError::InvalidArgument(_)
            | FsError::NotASymlink(_)
            | FsError::Config(_) => io::ErrorKind::InvalidInput,
            FsError::NoSpace(_) => io::ErrorKind::OutOfMemory,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

pub type FsResult<T> = Result<T, FsError>;
