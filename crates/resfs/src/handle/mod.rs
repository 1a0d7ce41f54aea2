//! Handles returned by `open`
//!
//! - **file**: offset-based reads and seeks, inflating compressed payloads on
//!   demand
//! - **dir**: cursor-based paged listings

pub mod dir;
pub mod file;

pub use dir::DirHandle;
pub use file::FileHandle;

use std::io::{self, SeekFrom};

use crate::delegate::Listing;
use crate::descriptor::Metadata;
use crate::error::{Result, VfsError};

/// An open file or directory.
#[derive(Debug)]
pub enum Handle {
    File(FileHandle),
    Dir(DirHandle),
}

impl Handle {
    pub fn name(&self) -> &str {
        match self {
            Handle::File(file) => file.name(),
            Handle::Dir(dir) => dir.name(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Handle::Dir(_))
    }

    pub fn stat(&self) -> Result<Metadata> {
        match self {
            Handle::File(file) => Ok(file.stat()),
            Handle::Dir(dir) => dir.stat(),
        }
    }

    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self {
            Handle::File(file) => file.read(buf),
            Handle::Dir(dir) => Err(VfsError::NotAFile {
                path: dir.name().to_string(),
            }),
        }
    }

    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64> {
        match self {
            Handle::File(file) => file.seek(pos),
            Handle::Dir(dir) => Err(VfsError::NotAFile {
                path: dir.name().to_string(),
            }),
        }
    }

    pub fn list(&mut self, max_entries: isize) -> Result<Listing> {
        match self {
            Handle::File(file) => Err(VfsError::NotADirectory {
                path: file.name().to_string(),
            }),
            Handle::Dir(dir) => dir.list(max_entries),
        }
    }

    /// Release the handle's resources. Closing twice is fine.
    pub fn close(&mut self) {
        match self {
            Handle::File(file) => file.close(),
            Handle::Dir(dir) => dir.close(),
        }
    }

    pub fn into_file(self) -> Result<FileHandle> {
        match self {
            Handle::File(file) => Ok(file),
            Handle::Dir(dir) => Err(VfsError::NotAFile {
                path: dir.name().to_string(),
            }),
        }
    }

    pub fn into_dir(self) -> Result<DirHandle> {
        match self {
            Handle::File(file) => Err(VfsError::NotADirectory {
                path: file.name().to_string(),
            }),
            Handle::Dir(dir) => Ok(dir),
        }
    }
}

impl io::Read for Handle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Handle::read(self, buf).map_err(io::Error::from)
    }
}

impl io::Seek for Handle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Handle::seek(self, pos).map_err(io::Error::from)
    }
}
