//! Per-file translation: read, compress, decide.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use resfs::{timestamp, CompressionPolicy, Encoding, ResourceDescriptor};
use tracing::trace;

use crate::error::{CompileError, Result};
use crate::select::slash_path;

/// One source file, ready to be embedded.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledResource {
    /// File name inside its directory
    pub name: String,
    /// Root-relative source path, `/`-separated
    pub source_path: String,
    pub encoding: Encoding,
    /// Raw bytes or the zlib stream, per `encoding`
    pub payload: Vec<u8>,
    /// Uncompressed size in bytes
    pub size: u64,
    pub modified_at: SystemTime,
}

impl CompiledResource {
    /// Build from in-memory contents.
    pub fn from_bytes(
        name: impl Into<String>,
        source_path: impl Into<String>,
        data: Vec<u8>,
        modified_at: SystemTime,
        policy: &CompressionPolicy,
    ) -> io::Result<Self> {
        let compressed = compress(&data)?;
        let size = data.len() as u64;
        let encoding = policy.decide(size, compressed.len() as u64);
        let payload = match encoding {
            Encoding::Raw => data,
            Encoding::Compressed => compressed,
        };
        Ok(Self {
            name: name.into(),
            source_path: source_path.into(),
            encoding,
            payload,
            size,
            modified_at,
        })
    }

    /// Stored size over original size; 1.0 for raw and empty files.
    pub fn ratio(&self) -> f64 {
        if self.size == 0 {
            1.0
        } else {
            self.payload.len() as f64 / self.size as f64
        }
    }

    /// Modification time as `(seconds, nanoseconds)` since the epoch.
    pub fn modified_parts(&self) -> (u64, u32) {
        epoch_parts(self.modified_at)
    }

    pub fn to_descriptor(&self) -> ResourceDescriptor {
        let (secs, nanos) = self.modified_parts();
        ResourceDescriptor::new(
            self.name.clone(),
            self.source_path.clone(),
            self.encoding,
            self.payload.clone(),
            self.size,
            timestamp(secs, nanos),
        )
    }
}

/// zlib at the default level.
pub fn compress(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

/// Times before the epoch are clamped to it.
pub fn epoch_parts(time: SystemTime) -> (u64, u32) {
    time.duration_since(UNIX_EPOCH)
        .map(|d| (d.as_secs(), d.subsec_nanos()))
        .unwrap_or((0, 0))
}

/// Translate `root/relative` into a [`CompiledResource`].
pub fn translate(
    root: &Path,
    relative: &Path,
    policy: &CompressionPolicy,
) -> Result<CompiledResource> {
    let path = root.join(relative);
    let data = fs::read(&path).map_err(CompileError::io(&path))?;
    let modified_at = fs::metadata(&path)
        .and_then(|meta| meta.modified())
        .map_err(CompileError::io(&path))?;
    let name = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let resource =
        CompiledResource::from_bytes(name, slash_path(relative), data, modified_at, policy)
            .map_err(CompileError::io(&path))?;
    trace!(
        file = %resource.source_path,
        size = resource.size,
        stored = resource.payload.len(),
        encoding = ?resource.encoding,
        "translated"
    );
    Ok(resource)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn text(len: usize) -> Vec<u8> {
        b"body { margin: 0; padding: 0; }\n"
            .iter()
            .cycle()
            .take(len)
            .copied()
            .collect()
    }

    #[test]
    fn test_small_file_stays_raw() {
        let data = text(100);
        let resource = CompiledResource::from_bytes(
            "a.css",
            "a.css",
            data.clone(),
            UNIX_EPOCH,
            &CompressionPolicy::default(),
        )
        .unwrap();
        assert_eq!(resource.encoding, Encoding::Raw);
        assert_eq!(resource.payload, data);
        assert_eq!(resource.ratio(), 1.0);
    }

    #[test]
    fn test_large_repetitive_file_is_compressed() {
        let data = text(20_000);
        let resource = CompiledResource::from_bytes(
            "big.css",
            "css/big.css",
            data.clone(),
            UNIX_EPOCH,
            &CompressionPolicy::default(),
        )
        .unwrap();
        assert_eq!(resource.encoding, Encoding::Compressed);
        assert_eq!(resource.size, 20_000);
        assert!(resource.ratio() < 0.5);

        let mut inflated = Vec::new();
        flate2::read::ZlibDecoder::new(&resource.payload[..])
            .read_to_end(&mut inflated)
            .unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn test_incompressible_file_stays_raw() {
        // xorshift noise does not shrink
        let mut state = 0x2545_f491_u32;
        let data: Vec<u8> = (0..10_000)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let resource = CompiledResource::from_bytes(
            "noise.png",
            "noise.png",
            data,
            UNIX_EPOCH,
            &CompressionPolicy::default(),
        )
        .unwrap();
        assert_eq!(resource.encoding, Encoding::Raw);
    }

    #[test]
    fn test_descriptor_keeps_uncompressed_size() {
        let resource = CompiledResource::from_bytes(
            "big.css",
            "css/big.css",
            text(8_000),
            timestamp(1_000, 5),
            &CompressionPolicy::default(),
        )
        .unwrap();
        let descriptor = resource.to_descriptor();
        assert_eq!(descriptor.size(), 8_000);
        assert_eq!(descriptor.original_path(), "css/big.css");
        assert_eq!(descriptor.modified_at(), timestamp(1_000, 5));
        assert_eq!(descriptor.encoding(), Encoding::Compressed);
    }
}
