//! Error types for the resource compiler.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while selecting, translating or emitting resources
#[derive(Debug, Error)]
pub enum CompileError {
    /// Reading a source or writing generated output failed
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid TOML for the expected schema
    #[error("Failed to parse config: {0}")]
    Config(#[from] toml::de::Error),

    /// The config parsed but holds an unusable value
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// An include or exclude pattern does not compile
    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The source root is missing or not a directory
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Registering compiled resources into a registry failed
    #[error(transparent)]
    Vfs(#[from] resfs::VfsError),
}

impl CompileError {
    /// Wrap an I/O failure on `path`, for use with `map_err`.
    pub(crate) fn io(path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> CompileError {
        let path = path.as_ref().to_path_buf();
        move |source| CompileError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
