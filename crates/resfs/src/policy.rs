//! Raw vs compressed storage decision
//!
//! Small files and files that barely shrink are stored raw so that reading
//! them never pays for inflation. The decision is made once per file by the
//! resource compiler and recorded in the descriptor.

use serde::{Deserialize, Serialize};

/// Files smaller than this many bytes are always stored raw (5 KiB).
pub const DEFAULT_MAX_UNCOMPRESSED: u64 = 5 << 10;

/// Files whose compressed/raw ratio exceeds this are stored raw.
pub const DEFAULT_MIN_RATIO: f64 = 0.5;

/// How a payload is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Payload holds the original bytes
    Raw,
    /// Payload holds a zlib stream
    Compressed,
}

impl Encoding {
    pub fn is_compressed(self) -> bool {
        matches!(self, Encoding::Compressed)
    }
}

/// Thresholds for [`decide`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompressionPolicy {
    /// Size in bytes below which files stay raw
    pub max_uncompressed: u64,
    /// Compressed/raw ratio above which compression is not worth it
    pub min_ratio: f64,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            max_uncompressed: DEFAULT_MAX_UNCOMPRESSED,
            min_ratio: DEFAULT_MIN_RATIO,
        }
    }
}

impl CompressionPolicy {
    pub fn new(max_uncompressed: u64, min_ratio: f64) -> Self {
        Self {
            max_uncompressed,
            min_ratio,
        }
    }

    pub fn decide(&self, raw_size: u64, compressed_size: u64) -> Encoding {
        decide(
            raw_size,
            compressed_size,
            self.max_uncompressed,
            self.min_ratio,
        )
    }
}

/// Choose the encoding for a file of `raw_size` bytes that compresses to
/// `compressed_size` bytes.
///
/// Raw when the file is under `max_uncompressed` or when
/// `compressed_size / raw_size > min_ratio`, compressed otherwise.
pub fn decide(
    raw_size: u64,
    compressed_size: u64,
    max_uncompressed: u64,
    min_ratio: f64,
) -> Encoding {
    if raw_size == 0 || raw_size < max_uncompressed {
        return Encoding::Raw;
    }
    let ratio = compressed_size as f64 / raw_size as f64;
    if ratio > min_ratio {
        Encoding::Raw
    } else {
        Encoding::Compressed
    }
}
