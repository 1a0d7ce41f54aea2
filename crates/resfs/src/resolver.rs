//! Path resolution over a sealed registry table.
//!
//! A table only knows its own children. When the first component of a path
//! names a mounted unit, the rest of the path is handed to that unit's
//! delegate as-is; the resolver never looks inside the foreign unit.

use std::collections::HashMap;
use std::sync::Arc;

use crate::delegate::Listing;
use crate::descriptor::{Metadata, ResourceDescriptor};
use crate::error::{Result, VfsError};
use crate::handle::{DirHandle, FileHandle, Handle};
use crate::node::{DirectoryNode, Entry, Mount};
use crate::path::{join, normalize, split_first};

/// Two sources that registered the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Conflict {
    pub first: String,
    pub second: String,
}

/// What a path names inside one unit.
#[derive(Debug)]
pub(crate) enum Resolved {
    File(Arc<ResourceDescriptor>),
    Dir(Arc<DirectoryNode>),
    /// Continue in another unit with the remaining path
    Mount { mount: Mount, rest: String },
}

/// The frozen view of a registry.
#[derive(Debug)]
pub(crate) struct Table {
    pub root: Arc<DirectoryNode>,
    pub conflicts: HashMap<String, Conflict>,
    /// The unit received at least one registration
    pub present: bool,
}

impl Table {
    pub fn resolve(&self, requested: &str) -> Result<Resolved> {
        if !self.present {
            return Err(VfsError::not_found(requested));
        }
        let path = normalize(requested)?;
        if path.is_empty() {
            return Ok(Resolved::Dir(Arc::clone(&self.root)));
        }

        let (head, rest) = split_first(&path);
        if let Some(conflict) = self.conflicts.get(head) {
            return Err(VfsError::DuplicateRegistration {
                unit: self.root.name().to_string(),
                name: head.to_string(),
                first: conflict.first.clone(),
                second: conflict.second.clone(),
            });
        }
        match self.root.get(head) {
            Some(Entry::File(desc)) if rest.is_empty() => Ok(Resolved::File(Arc::clone(desc))),
            Some(Entry::File(_)) => Err(VfsError::NotADirectory {
                path: head.to_string(),
            }),
            Some(Entry::Dir(mount)) => Ok(Resolved::Mount {
                mount: mount.clone(),
                rest: rest.to_string(),
            }),
            None => Err(VfsError::not_found(path)),
        }
    }

    pub fn open(&self, path: &str) -> Result<Handle> {
        match self.resolve(path)? {
            Resolved::File(desc) => Ok(Handle::File(FileHandle::new(desc))),
            Resolved::Dir(node) => Ok(Handle::Dir(DirHandle::new(node))),
            Resolved::Mount { mount, rest } if rest.is_empty() => {
                // A dangling mount must fail here, not on the first listing
                mount.stat()?;
                Ok(Handle::Dir(DirHandle::mounted(mount)))
            }
            Resolved::Mount { mount, rest } => mount
                .delegate()
                .open(&rest)
                .map_err(|err| err.within(mount.name())),
        }
    }

    pub fn stat(&self, path: &str) -> Result<Metadata> {
        match self.resolve(path)? {
            Resolved::File(desc) => Ok(desc.metadata()),
            Resolved::Dir(node) => Ok(node.metadata()),
            Resolved::Mount { mount, rest } if rest.is_empty() => mount.stat(),
            Resolved::Mount { mount, rest } => mount
                .delegate()
                .open(&rest)
                .and_then(|handle| handle.stat())
                .map_err(|err| err.within(mount.name())),
        }
    }

    pub fn stat_root(&self) -> Result<Metadata> {
        if !self.present {
            return Err(VfsError::not_found(self.root.name()));
        }
        Ok(self.root.metadata())
    }

    pub fn list(&self, cursor: usize, max_entries: isize) -> Result<Listing> {
        if !self.present {
            return Err(VfsError::not_found(self.root.name()));
        }
        Ok(self.root.list_from(cursor, max_entries))
    }
}

impl VfsError {
    /// Report a path error from a mounted unit relative to the mount's parent.
    pub(crate) fn within(self, mount: &str) -> Self {
        match self {
            VfsError::NotFound { path } => VfsError::NotFound {
                path: join(mount, &path),
            },
            VfsError::NotADirectory { path } => VfsError::NotADirectory {
                path: join(mount, &path),
            },
            VfsError::NotAFile { path } => VfsError::NotAFile {
                path: join(mount, &path),
            },
            other => other,
        }
    }
}
