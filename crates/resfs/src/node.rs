//! Directory nodes.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::delegate::{DirectoryDelegate, Listing};
use crate::descriptor::{Metadata, ResourceDescriptor};
use crate::error::{Result, VfsError};

/// A child directory served by another unit.
#[derive(Clone)]
pub struct Mount {
    name: String,
    delegate: Arc<dyn DirectoryDelegate>,
}

impl Mount {
    pub fn new(name: impl Into<String>, delegate: Arc<dyn DirectoryDelegate>) -> Self {
        Self {
            name: name.into(),
            delegate,
        }
    }

    /// Name the foreign subtree appears under.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn delegate(&self) -> &Arc<dyn DirectoryDelegate> {
        &self.delegate
    }

    /// Metadata of the foreign root, reported under the mount name. A
    /// dangling delegate is `NotFound` at the mount name, not its own.
    pub fn stat(&self) -> Result<Metadata> {
        match self.delegate.stat() {
            Ok(meta) => Ok(meta.renamed(self.name.as_str())),
            Err(VfsError::NotFound { .. }) => Err(VfsError::not_found(self.name.as_str())),
            Err(err) => Err(err),
        }
    }

    /// Like [`Mount::stat`], but a dangling delegate yields a placeholder
    /// instead of an error so that listings of the parent still succeed.
    pub(crate) fn listing_metadata(&self) -> Metadata {
        match self.stat() {
            Ok(meta) => meta,
            Err(err) => {
                debug!(mount = %self.name, error = %err, "listing unresolved mount");
                Metadata::directory(self.name.as_str(), UNIX_EPOCH)
            }
        }
    }

    pub(crate) fn is_same(&self, other: &Mount) -> bool {
        self.name == other.name && self.delegate.identity() == other.delegate.identity()
    }
}

impl fmt::Debug for Mount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mount")
            .field("name", &self.name)
            .field("delegate", &self.delegate)
            .finish()
    }
}

/// A child of a directory node.
#[derive(Debug, Clone)]
pub enum Entry {
    File(Arc<ResourceDescriptor>),
    Dir(Mount),
}

impl Entry {
    pub fn file(descriptor: ResourceDescriptor) -> Self {
        Entry::File(Arc::new(descriptor))
    }

    pub fn dir<D>(name: impl Into<String>, delegate: D) -> Self
    where
        D: DirectoryDelegate + 'static,
    {
        Entry::Dir(Mount::new(name, Arc::new(delegate)))
    }

    /// Where the entry came from, as reported on name collisions.
    pub fn source(&self) -> String {
        match self {
            Entry::File(desc) => desc.original_path().to_string(),
            Entry::Dir(mount) => format!("directory `{}` ({:?})", mount.name(), mount.delegate()),
        }
    }

    /// Two registrations describe the same thing.
    pub(crate) fn is_same(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::File(a), Entry::File(b)) => {
                Arc::ptr_eq(a, b)
                    || (a.original_path() == b.original_path()
                        && a.size() == b.size()
                        && a.encoding() == b.encoding()
                        && a.payload() == b.payload())
            }
            (Entry::Dir(a), Entry::Dir(b)) => a.is_same(b),
            _ => false,
        }
    }

    pub fn metadata(&self) -> Metadata {
        match self {
            Entry::File(desc) => desc.metadata(),
            Entry::Dir(mount) => mount.listing_metadata(),
        }
    }
}

/// A directory: named children, each a file or a mounted unit.
///
/// Children are ordered by name so paged listings are stable.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    name: String,
    modified_at: SystemTime,
    /// Sorted by name; pages are slices of it
    children: Vec<(String, Entry)>,
}

impl DirectoryNode {
    pub fn new(
        name: impl Into<String>,
        modified_at: SystemTime,
        children: BTreeMap<String, Entry>,
    ) -> Self {
        Self {
            name: name.into(),
            modified_at,
            children: children.into_iter().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modified_at(&self) -> SystemTime {
        self.modified_at
    }

    pub fn get(&self, name: &str) -> Option<&Entry> {
        self.children
            .binary_search_by(|(child, _)| child.as_str().cmp(name))
            .ok()
            .map(|index| &self.children[index].1)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.children.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn metadata(&self) -> Metadata {
        Metadata::directory(self.name.as_str(), self.modified_at)
    }

    /// A page of child metadata beginning at `cursor`.
    pub fn list_from(&self, cursor: usize, max_entries: isize) -> Listing {
        let remaining = self.children.len().saturating_sub(cursor);
        let take = if max_entries <= 0 {
            remaining
        } else {
            remaining.min(max_entries as usize)
        };
        let start = cursor.min(self.children.len());
        let entries = self.children[start..start + take]
            .iter()
            .map(|(_, entry)| entry.metadata())
            .collect::<Vec<_>>();
        Listing {
            exhausted: cursor + entries.len() >= self.children.len(),
            entries,
        }
    }
}
