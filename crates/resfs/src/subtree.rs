//! A filesystem rooted at a directory of another filesystem.

use crate::delegate::FileSystem;
use crate::descriptor::Metadata;
use crate::error::{Result, VfsError};
use crate::handle::Handle;
use crate::path::{join, normalize};

/// Serves `base` of the wrapped filesystem as its root. Paths cannot climb
/// above `base`.
#[derive(Debug, Clone)]
pub struct Subtree<F> {
    fs: F,
    base: String,
}

impl<F: FileSystem> Subtree<F> {
    /// Fails unless `base` names a directory of `fs`.
    pub fn new(fs: F, base: &str) -> Result<Self> {
        let base = normalize(base)?;
        if !fs.stat(&base)?.is_dir() {
            return Err(VfsError::NotADirectory { path: base });
        }
        Ok(Self { fs, base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn inner(&self) -> &F {
        &self.fs
    }

    fn translate(&self, path: &str) -> Result<String> {
        Ok(join(&self.base, &normalize(path)?))
    }
}

impl<F: FileSystem> FileSystem for Subtree<F> {
    fn open(&self, path: &str) -> Result<Handle> {
        self.fs.open(&self.translate(path)?)
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        self.fs.stat(&self.translate(path)?)
    }
}
