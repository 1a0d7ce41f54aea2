//! Directory handles: paged listings.

use std::sync::Arc;

use crate::delegate::Listing;
use crate::descriptor::Metadata;
use crate::error::{Result, VfsError};
use crate::node::{DirectoryNode, Mount};

#[derive(Debug)]
enum Source {
    Node(Arc<DirectoryNode>),
    /// A directory owned by another unit; listings go through its delegate
    Mount(Mount),
}

/// An open directory.
#[derive(Debug)]
pub struct DirHandle {
    source: Source,
    cursor: usize,
    exhausted: bool,
    closed: bool,
}

impl DirHandle {
    pub fn new(node: Arc<DirectoryNode>) -> Self {
        Self::with_source(Source::Node(node))
    }

    pub fn mounted(mount: Mount) -> Self {
        Self::with_source(Source::Mount(mount))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            cursor: 0,
            exhausted: false,
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        match &self.source {
            Source::Node(node) => node.name(),
            Source::Mount(mount) => mount.name(),
        }
    }

    pub fn stat(&self) -> Result<Metadata> {
        match &self.source {
            Source::Node(node) => Ok(node.metadata()),
            Source::Mount(mount) => mount.stat(),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Next page of at most `max_entries` entries, or everything left when
    /// `max_entries <= 0`.
    ///
    /// The page that reaches the end has `exhausted` set; asking again after
    /// that is [`VfsError::EndOfDirectory`].
    pub fn list(&mut self, max_entries: isize) -> Result<Listing> {
        if self.closed {
            return Err(VfsError::Closed {
                path: self.name().to_string(),
            });
        }
        if self.exhausted {
            return Err(VfsError::EndOfDirectory {
                path: self.name().to_string(),
            });
        }
        let listing = match &self.source {
            Source::Node(node) => node.list_from(self.cursor, max_entries),
            Source::Mount(mount) => mount.delegate().list(self.cursor, max_entries)?,
        };
        self.cursor += listing.entries.len();
        self.exhausted = listing.exhausted;
        Ok(listing)
    }

    /// Start listing from the first entry again.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.exhausted = false;
    }

    /// Closing twice is fine.
    pub fn close(&mut self) {
        self.closed = true;
    }
}
