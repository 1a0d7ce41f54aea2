//! Capabilities that cross unit boundaries.
//!
//! Each compiled directory is its own unit. A parent refers to a child unit
//! only through a [`DirectoryDelegate`], so the parent never needs to know how
//! the child stores its entries, or whether the child registered at all.

use std::fmt;
use std::sync::Arc;

use crate::descriptor::Metadata;
use crate::error::Result;
use crate::handle::Handle;

/// One page of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub entries: Vec<Metadata>,
    /// The cursor reached the end with this page
    pub exhausted: bool,
}

/// Entry points into another unit's root directory.
pub trait DirectoryDelegate: Send + Sync + fmt::Debug {
    /// Open a path relative to the delegate's root. `""` and `"."` open the
    /// root itself.
    fn open(&self, path: &str) -> Result<Handle>;

    /// Metadata of the delegate's root.
    fn stat(&self) -> Result<Metadata>;

    /// Up to `max_entries` root entries starting at `cursor`;
    /// `max_entries <= 0` returns everything from `cursor` on.
    fn list(&self, cursor: usize, max_entries: isize) -> Result<Listing>;

    /// Address of the unit behind this delegate. Wrappers forward it, so two
    /// mounts of the same unit compare equal.
    fn identity(&self) -> usize {
        self as *const Self as *const () as usize
    }
}

impl<T: DirectoryDelegate + ?Sized> DirectoryDelegate for &'static T {
    fn open(&self, path: &str) -> Result<Handle> {
        (**self).open(path)
    }

    fn stat(&self) -> Result<Metadata> {
        (**self).stat()
    }

    fn list(&self, cursor: usize, max_entries: isize) -> Result<Listing> {
        (**self).list(cursor, max_entries)
    }

    fn identity(&self) -> usize {
        (**self).identity()
    }
}

impl<T: DirectoryDelegate + ?Sized> DirectoryDelegate for Arc<T> {
    fn open(&self, path: &str) -> Result<Handle> {
        (**self).open(path)
    }

    fn stat(&self) -> Result<Metadata> {
        (**self).stat()
    }

    fn list(&self, cursor: usize, max_entries: isize) -> Result<Listing> {
        (**self).list(cursor, max_entries)
    }

    fn identity(&self) -> usize {
        (**self).identity()
    }
}

/// The filesystem capability handed to embedding applications.
pub trait FileSystem: Send + Sync {
    fn open(&self, path: &str) -> Result<Handle>;

    fn stat(&self, path: &str) -> Result<Metadata>;

    /// Handle on the root directory.
    fn mount(&self) -> Result<Handle> {
        self.open(".")
    }
}

impl<T: FileSystem + ?Sized> FileSystem for &T {
    fn open(&self, path: &str) -> Result<Handle> {
        (**self).open(path)
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        (**self).stat(path)
    }

    fn mount(&self) -> Result<Handle> {
        (**self).mount()
    }
}

impl<T: FileSystem + ?Sized> FileSystem for Arc<T> {
    fn open(&self, path: &str) -> Result<Handle> {
        (**self).open(path)
    }

    fn stat(&self, path: &str) -> Result<Metadata> {
        (**self).stat(path)
    }

    fn mount(&self) -> Result<Handle> {
        (**self).mount()
    }
}
