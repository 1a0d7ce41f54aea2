//! Resource descriptors and the metadata reported for entries.

use std::borrow::Cow;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::policy::Encoding;

/// Build a timestamp from seconds and nanoseconds since the Unix epoch.
///
/// Generated code uses this to carry source modification times.
pub fn timestamp(secs: u64, nanos: u32) -> SystemTime {
    UNIX_EPOCH + Duration::new(secs, nanos)
}

/// One embedded file.
///
/// The payload is never mutated. `size` is the number of bytes a reader
/// observes after decoding, whatever the encoding.
#[derive(Clone)]
pub struct ResourceDescriptor {
    name: String,
    original_path: String,
    encoding: Encoding,
    payload: Cow<'static, [u8]>,
    size: u64,
    modified_at: SystemTime,
}

impl ResourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        original_path: impl Into<String>,
        encoding: Encoding,
        payload: impl Into<Cow<'static, [u8]>>,
        size: u64,
        modified_at: SystemTime,
    ) -> Self {
        Self {
            name: name.into(),
            original_path: original_path.into(),
            encoding,
            payload: payload.into(),
            size,
            modified_at,
        }
    }

    /// A raw descriptor whose size is the payload length.
    pub fn raw(
        name: impl Into<String>,
        payload: impl Into<Cow<'static, [u8]>>,
        modified_at: SystemTime,
    ) -> Self {
        let name = name.into();
        let payload = payload.into();
        let size = payload.len() as u64;
        Self {
            original_path: name.clone(),
            name,
            encoding: Encoding::Raw,
            payload,
            size,
            modified_at,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path in the source tree this resource was compiled from.
    pub fn original_path(&self) -> &str {
        &self.original_path
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Stored bytes, compressed or not.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Uncompressed size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified_at(&self) -> SystemTime {
        self.modified_at
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            size: self.size,
            modified: self.modified_at,
            kind: EntryKind::File,
            encoding: Some(self.encoding),
        }
    }
}

impl fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("name", &self.name)
            .field("original_path", &self.original_path)
            .field("encoding", &self.encoding)
            .field("payload_len", &self.payload.len())
            .field("size", &self.size)
            .finish()
    }
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// What `stat` and directory listings report for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    name: String,
    size: u64,
    modified: SystemTime,
    kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<Encoding>,
}

impl Metadata {
    pub fn directory(name: impl Into<String>, modified: SystemTime) -> Self {
        Self {
            name: name.into(),
            size: 0,
            modified,
            kind: EntryKind::Directory,
            encoding: None,
        }
    }

    /// The same metadata under another name.
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Storage encoding, for files.
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Unix permission bits; everything is read-only.
    pub fn mode(&self) -> u32 {
        match self.kind {
            EntryKind::File => 0o444,
            EntryKind::Directory => 0o555,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_descriptor_size_is_payload_len() {
        let desc = ResourceDescriptor::raw("a.txt", &b"hello world!"[..], timestamp(10, 0));
        assert_eq!(desc.size(), 12);
        assert_eq!(desc.encoding(), Encoding::Raw);
        assert_eq!(desc.original_path(), "a.txt");
    }

    #[test]
    fn test_metadata_reports_uncompressed_size() {
        let desc = ResourceDescriptor::new(
            "b.css",
            "pkg/b.css",
            Encoding::Compressed,
            vec![0u8; 10],
            9000,
            timestamp(0, 0),
        );
        let meta = desc.metadata();
        assert_eq!(meta.size(), 9000);
        assert!(meta.is_file());
        assert_eq!(meta.mode(), 0o444);
        assert_eq!(meta.encoding(), Some(Encoding::Compressed));
    }

    #[test]
    fn test_directory_metadata() {
        let meta = Metadata::directory("css", timestamp(5, 0)).renamed("styles");
        assert!(meta.is_dir());
        assert_eq!(meta.name(), "styles");
        assert_eq!(meta.size(), 0);
        assert_eq!(meta.mode(), 0o555);
    }
}
