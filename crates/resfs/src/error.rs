//! Error types for the embedded filesystem.

use std::io;

/// Errors reported by registries, the path resolver and handles.
///
/// Every failure is returned to the caller; nothing here aborts the process.
#[derive(Debug, thiserror::Error)]
pub enum VfsError {
    /// The path resolves to nothing
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// A directory operation was attempted on a file
    #[error("Not a directory: {path}")]
    NotADirectory { path: String },

    /// A file operation was attempted on a directory
    #[error("Not a file: {path}")]
    NotAFile { path: String },

    /// The compressed payload could not be inflated
    #[error("Failed to decode {path}: {source}")]
    DecodeFailure {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The requested offset cannot be represented
    #[error("Invalid seek on {path}: {reason}")]
    InvalidSeek { path: String, reason: String },

    /// Two different sources registered the same name in one directory
    #[error("Duplicate registration of `{name}` in `{unit}`: {first} collides with {second}")]
    DuplicateRegistration {
        unit: String,
        name: String,
        first: String,
        second: String,
    },

    /// A `..` component climbs above the filesystem root
    #[error("Path escapes the filesystem root: {path}")]
    OutsideRoot { path: String },

    /// The entry name cannot be addressed by a path
    #[error("Invalid entry name: {name:?}")]
    InvalidName { name: String },

    /// A new entry arrived after the registry stopped accepting writes
    #[error("Registry `{unit}` is sealed, cannot register `{name}`")]
    Sealed { unit: String, name: String },

    /// The handle was closed
    #[error("Handle is closed: {path}")]
    Closed { path: String },

    /// A listing was requested after the directory was exhausted
    #[error("End of directory: {path}")]
    EndOfDirectory { path: String },
}

impl VfsError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        VfsError::NotFound { path: path.into() }
    }

    /// The closest `std::io` error kind.
    pub fn kind(&self) -> io::ErrorKind {
        match self {
            VfsError::NotFound { .. } => io::ErrorKind::NotFound,
            VfsError::NotADirectory { .. } => io::ErrorKind::NotADirectory,
            VfsError::NotAFile { .. } => io::ErrorKind::IsADirectory,
            VfsError::DecodeFailure { .. } => io::ErrorKind::InvalidData,
            VfsError::InvalidSeek { .. }
            | VfsError::OutsideRoot { .. }
            | VfsError::InvalidName { .. } => io::ErrorKind::InvalidInput,
            VfsError::DuplicateRegistration { .. } | VfsError::Sealed { .. } => {
                io::ErrorKind::AlreadyExists
            }
            VfsError::Closed { .. } => io::ErrorKind::BrokenPipe,
            VfsError::EndOfDirectory { .. } => io::ErrorKind::UnexpectedEof,
        }
    }
}

impl From<VfsError> for io::Error {
    fn from(err: VfsError) -> Self {
        io::Error::new(err.kind(), err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, VfsError>;
