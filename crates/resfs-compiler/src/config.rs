//! Compiler configuration (resfs.toml)
//!
//! Every key is optional; a missing file means the defaults.
//!
//! ```toml
//! [compile]
//! dest = "generated"
//! match = ".+\\.(js|css|html|png)$"
//! exclude = "(^|/)\\.git(/|$)"
//! overwrite = true
//!
//! [compression]
//! max-uncompressed-k = 5
//! min-ratio = 0.5
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use resfs::CompressionPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// File name looked up in the source root.
pub const CONFIG_FILE: &str = "resfs.toml";

pub const DEFAULT_MATCH: &str = r".+\.(js|css|html|png)$";
pub const DEFAULT_EXCLUDE: &str = r"(^|/)\.git(/|$)";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub compile: CompileConfig,
    pub compression: CompressionConfig,
}

/// What to select and where the generated source goes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompileConfig {
    /// Output directory for `resources.rs` and the payload blobs
    pub dest: PathBuf,

    /// Files whose root-relative path matches are selected; empty selects all
    #[serde(rename = "match")]
    pub include: String,

    /// Selected files whose path matches are dropped again; empty drops none
    pub exclude: String,

    /// Regenerate even when the output is newer than every source
    pub overwrite: bool,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            dest: PathBuf::from("generated"),
            include: DEFAULT_MATCH.to_string(),
            exclude: DEFAULT_EXCLUDE.to_string(),
            overwrite: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CompressionConfig {
    /// Files smaller than this many KiB are stored raw
    pub max_uncompressed_k: u64,

    /// Compressed/raw ratio above which compression is not worth it
    pub min_ratio: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_uncompressed_k: resfs::policy::DEFAULT_MAX_UNCOMPRESSED >> 10,
            min_ratio: resfs::policy::DEFAULT_MIN_RATIO,
        }
    }
}

impl CompressionConfig {
    pub fn policy(&self) -> CompressionPolicy {
        CompressionPolicy::new(self.max_uncompressed_k << 10, self.min_ratio)
    }
}

impl Config {
    /// Parse a config from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(CompileError::io(path))?;
        content.parse()
    }

    /// Load `resfs.toml` from `dir`, or the defaults when there is none.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ratio = self.compression.min_ratio;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(CompileError::Invalid(format!(
                "min-ratio must be a positive number, got {}",
                ratio
            )));
        }
        if self.compression.max_uncompressed_k > (u64::MAX >> 10) {
            return Err(CompileError::Invalid(format!(
                "max-uncompressed-k is too large: {}",
                self.compression.max_uncompressed_k
            )));
        }
        for pattern in [&self.compile.include, &self.compile.exclude] {
            if !pattern.is_empty() {
                Regex::new(pattern)?;
            }
        }
        Ok(())
    }

    /// Render back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CompileError::Invalid(e.to_string()))
    }
}

impl std::str::FromStr for Config {
    type Err = CompileError;

    fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
